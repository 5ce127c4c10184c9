use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("Config: {}", .0)]
    Config(#[from] vital_core::ConfigError),

    #[error("Provider: {}", .0)]
    Provider(#[from] vital_core::ProviderError),

    /// Shown to the user as-is; provider detail was already logged.
    #[error("{}", .0.public_message())]
    Relay(#[from] vital_core::RelayError),
}
