//! Error types for moments-relay

use thiserror::Error;

/// Errors produced by the relay core and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// No usable credentials for the record API
    #[error("authentication error: {0}")]
    Auth(String),

    /// GitHub API call failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Error surfaced by octocrab
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Chat transport rejected a request
    #[error("Telegram API error: {0}")]
    Telegram(String),

    /// Content is over the character ceiling
    #[error("content is {len} characters, limit is {limit}")]
    ContentTooLong {
        /// Length of the rejected content
        len: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// Media is over the byte ceiling
    #[error("media is {size} bytes, limit is {limit}")]
    MediaTooLarge {
        /// Size of the rejected media
        size: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// A record number argument could not be parsed
    #[error("invalid record number: {0}")]
    InvalidRecordNumber(String),

    /// A label is not one of the currently valid labels
    #[error("unknown label: {0}")]
    InvalidLabel(String),

    /// Remote record does not exist
    #[error("record #{0} not found")]
    RecordNotFound(u64),
}

impl Error {
    /// Whether this error was raised by local validation, before any remote call
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ContentTooLong { .. }
                | Self::MediaTooLarge { .. }
                | Self::InvalidRecordNumber(_)
                | Self::InvalidLabel(_)
        )
    }
}

/// Result alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(Error::ContentTooLong { len: 6, limit: 5 }.is_validation());
        assert!(Error::InvalidRecordNumber("abc".into()).is_validation());
        assert!(!Error::GitHubApi("boom".into()).is_validation());
        assert!(!Error::RecordNotFound(3).is_validation());
    }

    #[test]
    fn test_display_includes_limits() {
        let err = Error::ContentTooLong {
            len: 5001,
            limit: 5000,
        };
        assert_eq!(err.to_string(), "content is 5001 characters, limit is 5000");
    }
}
