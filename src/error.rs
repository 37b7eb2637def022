//! Error types and handling for the Paradecast service

use thiserror::Error;

/// Main error type for the Paradecast application
#[derive(Error, Debug)]
pub enum ParadecastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream data-source errors
    #[error("Source error: {message}")]
    Source { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl ParadecastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new upstream-source error
    pub fn source<S: Into<String>>(message: S) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ParadecastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            ParadecastError::Source { .. } => {
                "Unable to reach upstream weather services. The estimate will degrade to available sources."
                    .to_string()
            }
            ParadecastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}
