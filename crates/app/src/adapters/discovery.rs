use lopper_core::domain::Repository;
use lopper_core::ports::{DiscoverReq, DiscoveryPort, RepositoryClient};
use lopper_core::{CoreError, Result};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use walkdir::WalkDir;

/// File system discovery adapter that implements DiscoveryPort.
///
/// Only the root and its immediate subdirectories are considered; whether a
/// directory is a repository is decided by the RepositoryClient.
pub struct FsDiscoveryAdapter {
    client: Arc<dyn RepositoryClient>,
}

impl FsDiscoveryAdapter {
    pub fn new(client: Arc<dyn RepositoryClient>) -> Self {
        Self { client }
    }

    fn discovery_error(path: &Path, source: io::Error) -> CoreError {
        CoreError::Discovery {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The root itself is a repository: one entry named after it
    fn single_repo(&self, base: &Path) -> Result<Vec<Repository>> {
        let absolute = fs::canonicalize(base).map_err(|e| Self::discovery_error(base, e))?;
        let name = absolute
            .file_name()
            .unwrap_or_default()
            .to_str()
            .ok_or_else(|| {
                Self::discovery_error(
                    base,
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        "directory name is not valid UTF-8",
                    ),
                )
            })?
            .to_string();
        let root_path = absolute.parent().unwrap_or(&absolute).to_path_buf();
        Ok(vec![Repository::new(root_path, name)])
    }

    /// Immediate subdirectories that are repositories, sorted by file name
    fn child_repos(&self, base: &Path) -> Result<Vec<Repository>> {
        let metadata = fs::metadata(base).map_err(|e| Self::discovery_error(base, e))?;
        if !metadata.is_dir() {
            return Err(Self::discovery_error(
                base,
                io::Error::other("not a directory"),
            ));
        }

        let mut repositories = Vec::new();
        for entry in WalkDir::new(base)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Self::discovery_error(base, e.into()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if !self.client.is_repository(entry.path()) {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => repositories.push(Repository::new(base, name)),
                None => warn!(
                    "Skipping {}: directory name is not valid UTF-8",
                    entry.path().display()
                ),
            }
        }
        Ok(repositories)
    }
}

impl DiscoveryPort for FsDiscoveryAdapter {
    fn scan(&self, req: DiscoverReq) -> Result<Vec<Repository>> {
        if self.client.is_repository(&req.base) {
            self.single_repo(&req.base)
        } else {
            self.child_repos(&req.base)
        }
    }
}
