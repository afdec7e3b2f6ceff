use thiserror::Error;

#[derive(Error, Debug)]
pub enum NeoRadarError {
    #[error("Configuration error: {0}")]
    Config(String),
}
