//! Upload collaborator port

use std::path::PathBuf;

use crate::error::Result;

/// A finished tarball plus the context it is uploaded under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub tarball: PathBuf,
    pub organization: String,
    /// Policy root the tarball was built from
    pub policy_dir: PathBuf,
}

/// Transfers a packaged tarball to the remote evaluation service
///
/// Transport, authentication and retries belong to the implementation.
pub trait PolicyUploader: Send + Sync {
    fn upload(&self, request: &UploadRequest) -> Result<()>;
}
