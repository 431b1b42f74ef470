//! Session file locations and collection/environment persistence

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::{Collection, Environment};
use crate::{GophermanError, Result};

/// Directory, relative to the home directory, where sessions are written
pub const SESSION_DIR: &str = ".op/gopherman";

/// Default session directory: `<home>/.op/gopherman`
///
/// # Errors
///
/// Returns error if the home directory cannot be determined
pub fn default_session_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(SESSION_DIR))
        .ok_or_else(|| GophermanError::ConfigError("Cannot determine home directory".to_string()))
}

/// File name for a session started at `started_at`
#[must_use]
pub fn session_file_name(started_at: DateTime<Utc>) -> String {
    format!("{}.json", started_at.format("%Y%m%dT%H%M%S%.9fZ"))
}

/// Path of the file a session started at `started_at` is persisted to
#[must_use]
pub fn session_file_path(dir: &Path, started_at: DateTime<Utc>) -> PathBuf {
    dir.join(session_file_name(started_at))
}

/// Write serialized session data, creating the directory on demand
///
/// # Errors
///
/// Returns `Io` error if the directory or file cannot be written
pub async fn write_session(dir: &Path, started_at: DateTime<Utc>, data: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = session_file_path(dir, started_at);
    tokio::fs::write(&path, data).await?;

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(path)
}

/// Load a collection file
///
/// # Errors
///
/// Returns `Io` error if unreadable, `Decode` error if malformed
pub fn load_collection(path: &Path) -> Result<Collection> {
    let data = std::fs::read(path)?;
    Collection::from_json(&data).map_err(|e| in_file(path, e))
}

/// Load an environment file
///
/// # Errors
///
/// Returns `Io` error if unreadable, `Decode` error if malformed
pub fn load_environment(path: &Path) -> Result<Environment> {
    let data = std::fs::read(path)?;
    Environment::from_json(&data).map_err(|e| in_file(path, e))
}

fn in_file(path: &Path, err: GophermanError) -> GophermanError {
    match err {
        GophermanError::Decode(msg) => GophermanError::Decode(format!("{}: {msg}", path.display())),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn started() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T10:20:30.000000042Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_session_file_name() {
        assert_eq!(
            session_file_name(started()),
            "20240501T102030.000000042Z.json"
        );
    }

    #[tokio::test]
    async fn test_write_session_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("sessions");

        let path = write_session(&dir, started(), b"{}").await.unwrap();

        assert_eq!(path, dir.join("20240501T102030.000000042Z.json"));
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_load_collection_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_collection(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(GophermanError::Io(_))));
    }

    #[test]
    fn test_load_environment_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("env.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let result = load_environment(&path);
        match result {
            Err(GophermanError::Decode(msg)) => assert!(msg.contains("env.json")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
