mod config;
mod engine;
pub mod resources;

pub use config::*;
pub use engine::*;
pub use resources::*;
