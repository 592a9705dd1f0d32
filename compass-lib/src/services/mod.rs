//! Domain services layered over [`ApiClient`](crate::ApiClient)

mod control_item;
mod framework;

pub use control_item::*;
pub use framework::*;
