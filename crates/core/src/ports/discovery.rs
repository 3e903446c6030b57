use crate::domain::repo::Repository;
use crate::error::Result;
use std::path::PathBuf;

/// Request for repository discovery
#[derive(Clone, Debug)]
pub struct DiscoverReq {
    pub base: PathBuf,
}

/// Port for repository discovery
pub trait DiscoveryPort: Send + Sync {
    /// Find the repositories to process under `req.base`, in listing order.
    /// This is blocking - caller should run in spawn_blocking
    fn scan(&self, req: DiscoverReq) -> Result<Vec<Repository>>;
}
