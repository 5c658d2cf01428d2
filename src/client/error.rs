//! Errors surfaced to callers of the client.

use crate::transport::TransportError;

/// Errors that end a request or a result stream
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid search, offset or client settings; never retried
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    /// Every attempt at a page failed with a non-success status
    #[error("Page request failed with HTTP status {status} after {retry} retries ({url})")]
    Http { url: String, status: u16, retry: u32 },

    /// Every attempt at a page failed without a response
    #[error("Page request failed after {retry} retries ({url}): {message}")]
    Network {
        url: String,
        message: String,
        retry: u32,
    },

    /// Every attempt at a page returned a body that was not a feed
    #[error("Page feed could not be parsed after {retry} retries ({url}): {message}")]
    Feed {
        url: String,
        message: String,
        retry: u32,
    },
}

impl ClientError {
    /// Wrap the last failed attempt once retries are exhausted.
    pub(crate) fn exhausted(url: &url::Url, last: TransportError, retry: u32) -> Self {
        let url = url.to_string();
        match last {
            TransportError::Status(status) => ClientError::Http { url, status, retry },
            TransportError::Network(message) => ClientError::Network {
                url,
                message,
                retry,
            },
            TransportError::Feed(message) => ClientError::Feed {
                url,
                message,
                retry,
            },
        }
    }

    /// HTTP status of the last failed attempt, if there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Retries made before giving up, for request failures
    pub fn retry(&self) -> Option<u32> {
        match self {
            ClientError::Http { retry, .. }
            | ClientError::Network { retry, .. }
            | ClientError::Feed { retry, .. } => Some(*retry),
            ClientError::InvalidRequest(_) | ClientError::Setup(_) => None,
        }
    }
}

/// Convert a caller-supplied offset, rejecting negative values.
pub fn checked_offset(offset: i64) -> Result<usize, ClientError> {
    usize::try_from(offset)
        .map_err(|_| ClientError::InvalidRequest(format!("offset must be non-negative, got {offset}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_offset() {
        assert_eq!(checked_offset(0), Ok(0));
        assert_eq!(checked_offset(42), Ok(42));
        assert!(matches!(
            checked_offset(-1),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_exhausted_keeps_last_status() {
        let url = url::Url::parse("https://export.arxiv.org/api/query?start=0").unwrap();
        let err = ClientError::exhausted(&url, TransportError::Status(500), 3);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.retry(), Some(3));
        assert!(err.to_string().contains("500"));

        let err = ClientError::exhausted(&url, TransportError::Network("refused".into()), 1);
        assert_eq!(err.status(), None);
        assert_eq!(err.retry(), Some(1));
    }
}
