// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the preprocessing host boundary
//!
//! Kernels are total functions and never fail. Everything here is raised
//! while validating configuration and buffers before a dispatch.

use std::fmt;

/// Result type alias using PreprocessError
pub type PreprocessResult<T> = Result<T, PreprocessError>;

/// Main error type
#[derive(Debug, Clone, PartialEq)]
pub enum PreprocessError {
    /// Configuration rejected by validation
    Config(ConfigError),
    /// Buffer does not match its declared layout
    Buffer(BufferError),
    /// Background task failed (panicked or was cancelled)
    Task(String),
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A width or height is zero or negative
    InvalidDimension { name: &'static str, value: i64 },
    /// 4:2:0 chroma needs even luma dimensions
    OddDimension { name: &'static str, value: u32 },
    /// Padding copies move 4 bytes at a time
    WidthNotMultipleOfFour(u32),
    /// Stride narrower than the row it holds
    StrideTooSmall { stride: u32, width: u32 },
    /// Scale factors must be strictly positive and finite
    InvalidScale { name: &'static str, value: f32 },
    /// Thresholds must satisfy 0 <= min < max
    InvalidThresholds { min: f32, max: f32 },
    /// Blur sigma must be positive and finite
    InvalidSigma(f32),
    /// Padded layout smaller than the active region
    PaddingTooSmall { padded: u32, active: u32 },
    /// JSON could not be parsed
    Parse(String),
}

/// Buffer layout errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Buffer holds fewer elements than the layout needs
    TooSmall {
        name: &'static str,
        needed: usize,
        actual: usize,
    },
    /// Buffer must hold exactly `expected` elements
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Two buffers that must describe the same image disagree
    DimensionMismatch {
        name: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessError::Config(e) => write!(f, "Configuration error: {}", e),
            PreprocessError::Buffer(e) => write!(f, "Buffer error: {}", e),
            PreprocessError::Task(msg) => write!(f, "Task error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDimension { name, value } => {
                write!(f, "{} must be positive, got {}", name, value)
            }
            ConfigError::OddDimension { name, value } => {
                write!(f, "{} must be even for 4:2:0 chroma, got {}", name, value)
            }
            ConfigError::WidthNotMultipleOfFour(width) => {
                write!(f, "Row width {} is not a multiple of 4", width)
            }
            ConfigError::StrideTooSmall { stride, width } => {
                write!(f, "Stride {} is smaller than width {}", stride, width)
            }
            ConfigError::InvalidScale { name, value } => {
                write!(f, "Scale factor {} must be positive, got {}", name, value)
            }
            ConfigError::InvalidThresholds { min, max } => {
                write!(f, "Thresholds must satisfy 0 <= min < max, got {}..{}", min, max)
            }
            ConfigError::InvalidSigma(sigma) => write!(f, "Invalid blur sigma: {}", sigma),
            ConfigError::PaddingTooSmall { padded, active } => write!(
                f,
                "Padded size {} is smaller than active size {}",
                padded, active
            ),
            ConfigError::Parse(msg) => write!(f, "Failed to parse configuration: {}", msg),
        }
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::TooSmall {
                name,
                needed,
                actual,
            } => write!(
                f,
                "{} buffer too small: {} elements, expected {}",
                name, actual, needed
            ),
            BufferError::LengthMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "{} buffer holds {} elements, expected exactly {}",
                name, actual, expected
            ),
            BufferError::DimensionMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "{} dimensions {}x{} do not match {}x{}",
                name, actual.0, actual.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for PreprocessError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for BufferError {}

impl From<ConfigError> for PreprocessError {
    fn from(err: ConfigError) -> Self {
        PreprocessError::Config(err)
    }
}

impl From<BufferError> for PreprocessError {
    fn from(err: BufferError) -> Self {
        PreprocessError::Buffer(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for PreprocessError {
    fn from(err: tokio::task::JoinError) -> Self {
        PreprocessError::Task(err.to_string())
    }
}

/// Check that a buffer holds at least `needed` elements
pub fn ensure_len<T>(name: &'static str, buffer: &[T], needed: usize) -> Result<(), BufferError> {
    if buffer.len() < needed {
        return Err(BufferError::TooSmall {
            name,
            needed,
            actual: buffer.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PreprocessError::from(ConfigError::InvalidThresholds { min: 0.7, max: 0.3 });
        assert!(err.to_string().starts_with("Configuration error"));

        let err = PreprocessError::from(BufferError::TooSmall {
            name: "mask",
            needed: 16,
            actual: 4,
        });
        assert_eq!(
            err.to_string(),
            "Buffer error: mask buffer too small: 4 elements, expected 16"
        );
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("y", &[0u8; 8], 8).is_ok());
        assert_eq!(
            ensure_len("y", &[0u8; 7], 8),
            Err(BufferError::TooSmall {
                name: "y",
                needed: 8,
                actual: 7
            })
        );
    }
}
