//! Typed errors for the persistence side of TrackForge.
//!
//! Store mutations never fail; only the gateways that persist them do. The
//! command layer and configuration loading use `anyhow` on top of these.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a persistence gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt document at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_read_carries_path() {
        let path = PathBuf::from("/data/tasks.json");
        let err = GatewayError::Read {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        match &err {
            GatewayError::Read { path: p, source } => {
                assert_eq!(p, &path);
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected Read"),
        }
        assert!(err.to_string().contains("/data/tasks.json"));
    }

    #[test]
    fn gateway_error_corrupt_exposes_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = GatewayError::Corrupt {
            path: PathBuf::from("tasks.json"),
            source: json_err,
        };
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn gateway_error_converts_from_anyhow() {
        let err: GatewayError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, GatewayError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn gateway_error_implements_std_error() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&GatewayError::LockPoisoned);
        assert_std_error(&GatewayError::Unavailable("offline".into()));
    }
}
