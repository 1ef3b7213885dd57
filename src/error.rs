use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("ADC error: {0}")]
    Adc(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Interrupt attach failed: {0}")]
    Interrupt(String),

    #[error("Timer error: {0}")]
    Timer(String),

    #[error("Arithmetic fault: {0}")]
    Arithmetic(String),

    #[error("Insufficient data: need {needed} samples, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: expected {expected}, was {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
