pub mod messages;
pub mod tp_model;

pub use messages::*;
pub use tp_model::*;
