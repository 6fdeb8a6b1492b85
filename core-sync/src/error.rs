use bridge_traits::error::BridgeError;
use core_library::LibraryError;
use provider_encora::EncoraError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Folder listing failed: {0}")]
    Listing(#[from] BridgeError),

    #[error("Collection fetch failed: {0}")]
    Fetch(#[from] EncoraError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("Invalid folder name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
