pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, StreamSettings};
pub use error::NeoRadarError;
pub use types::*;
