//! Compass API client library
//!
//! Async access to the compliance framework backend: framework listing and
//! creation, control item maintenance and template file handling.

pub mod error;
pub mod model;
pub mod services;
pub mod template;
pub mod transport;

mod client;

pub use client::*;
