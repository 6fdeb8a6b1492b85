//! Folder Listing Implementation using the `rclone` CLI

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FolderEntry, FolderLister},
};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// `rclone lsjson`-backed folder lister
///
/// Runs `rclone lsjson --config <config> --recursive <remote>:` once per call
/// and parses the JSON array it prints. The child process is awaited without
/// a timeout.
#[derive(Debug, Clone)]
pub struct RcloneFolderLister {
    binary: PathBuf,
    config_path: PathBuf,
    remote: String,
}

impl RcloneFolderLister {
    /// Create a lister for `remote` using the given rclone binary and config file
    pub fn new(
        binary: impl Into<PathBuf>,
        config_path: impl Into<PathBuf>,
        remote: impl Into<String>,
    ) -> Self {
        Self {
            binary: binary.into(),
            config_path: config_path.into(),
            remote: remote.into(),
        }
    }

    /// Arguments passed to the rclone binary
    fn command_args(&self) -> Vec<String> {
        vec![
            "lsjson".to_string(),
            "--config".to_string(),
            self.config_path.display().to_string(),
            "--recursive".to_string(),
            format!("{}:", self.remote),
        ]
    }
}

#[async_trait]
impl FolderLister for RcloneFolderLister {
    #[instrument(skip(self), fields(remote = %self.remote))]
    async fn list_folders(&self) -> Result<Vec<FolderEntry>> {
        info!("Listing folders from remote");

        let args = self.command_args();
        debug!(binary = ?self.binary, ?args, "Spawning rclone");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                BridgeError::OperationFailed(format!(
                    "Failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BridgeError::OperationFailed(format!(
                "{} lsjson exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let entries: Vec<FolderEntry> = serde_json::from_slice(&output.stdout).map_err(|e| {
            BridgeError::OperationFailed(format!("Failed to parse rclone listing: {}", e))
        })?;

        info!(entries = entries.len(), "Fetched remote listing");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let lister = RcloneFolderLister::new("rclone", "./data/rclone.conf", "Musicals");

        assert_eq!(
            lister.command_args(),
            vec![
                "lsjson",
                "--config",
                "./data/rclone.conf",
                "--recursive",
                "Musicals:"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let lister = RcloneFolderLister::new(
            "/nonexistent/definitely-not-rclone",
            "rclone.conf",
            "Musicals",
        );

        let result = lister.list_folders().await;
        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        // `false` ignores its arguments and exits with status 1
        let lister = RcloneFolderLister::new("false", "rclone.conf", "Musicals");

        let err = lister.list_folders().await.unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unparsable_output_is_an_error() {
        // `echo` prints its arguments, which is not a JSON array
        let lister = RcloneFolderLister::new("echo", "rclone.conf", "Musicals");

        let err = lister.list_folders().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse rclone listing"));
    }
}
