pub mod agent;
pub mod macros;

pub use agent::*;
