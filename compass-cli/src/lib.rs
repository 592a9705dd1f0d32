//! Interactive front-end for browsing compliance frameworks.
//!
//! [`framework_manager`] and [`modal_manager`] compose the table and stepper
//! engines from `compass-ui` with the services from `compass-lib`;
//! [`shell`] drives them from text commands.

pub mod cli;
pub mod config;
pub mod framework_manager;
pub mod modal_manager;
pub mod paths;
pub mod settings;
pub mod shell;
