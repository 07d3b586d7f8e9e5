use thiserror::Error;

/// Failure of a single listing page fetch
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("listing request failed: {0}")]
    Network(String),

    #[error("listing API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode listing response: {0}")]
    Decode(String),
}

/// A FilterSet that cannot be projected onto the listing API
///
/// Never expected at runtime; the mapper logs and drops the offending field.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MappingError {
    #[error("bedroom count must be at least 1")]
    ZeroBedrooms,

    #[error("possession cutoff {years} years from now is out of range")]
    DateOutOfRange { years: u32 },
}

/// Failure of the AI chat search call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OverrideChannelError {
    #[error("chat request failed: {0}")]
    Network(String),

    #[error("chat API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode chat response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<reqwest::Error> for OverrideChannelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OverrideChannelError::Decode(err.to_string())
        } else {
            OverrideChannelError::Network(err.to_string())
        }
    }
}
