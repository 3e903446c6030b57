//! Shared fixtures: real repositories built with git2, and a scripted client for engine tests
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use lopper_core::domain::Repository as Repo;
use lopper_core::ports::{DiscoverReq, DiscoveryPort, RepositoryClient};
use lopper_core::PullError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn signature() -> Result<Signature<'static>> {
    Ok(Signature::now("Test User", "test@example.com")?)
}

/// Init a repository whose unborn HEAD points at `main`
pub fn init_repo(path: &Path, bare: bool) -> Result<Repository> {
    std::fs::create_dir_all(path)?;
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main").bare(bare);
    Ok(Repository::init_opts(path, &opts)?)
}

/// Commit `file` with `contents` on top of `parent` and point `refs/heads/<branch>` at it.
///
/// Works on bare repositories and never touches the working tree.
pub fn commit_file(
    repo: &Repository,
    branch: &str,
    parent: Option<Oid>,
    file: &str,
    contents: &str,
) -> Result<Oid> {
    let parent = parent.map(|oid| repo.find_commit(oid)).transpose()?;
    let parent_tree = parent.as_ref().map(|c| c.tree()).transpose()?;

    let blob = repo.blob(contents.as_bytes())?;
    let mut builder = repo.treebuilder(parent_tree.as_ref())?;
    builder.insert(file, blob, 0o100644)?;
    let tree = repo.find_tree(builder.write()?)?;

    let sig = signature()?;
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    let oid = repo.commit(
        Some(&format!("refs/heads/{branch}")),
        &sig,
        &sig,
        &format!("update {file}"),
        &tree,
        &parents,
    )?;
    Ok(oid)
}

/// Create a local branch at `target`
pub fn create_branch(repo: &Repository, name: &str, target: Oid) -> Result<()> {
    let commit = repo.find_commit(target)?;
    repo.branch(name, &commit, false)?;
    Ok(())
}

pub fn local_branch_names(path: &Path) -> Result<Vec<String>> {
    let repo = Repository::open(path)?;
    let mut names = Vec::new();
    for entry in repo.branches(Some(git2::BranchType::Local))? {
        let (branch, _) = entry?;
        if let Some(name) = branch.name()? {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Bare upstream with `main` = c1 -> c2, cloned to `clone_path` so `git pull` has a remote.
///
/// Returns the clone and the two main commits.
pub fn cloned_repo(upstream_path: &Path, clone_path: &Path) -> Result<(Repository, Oid, Oid)> {
    let upstream = init_repo(upstream_path, true)?;
    let c1 = commit_file(&upstream, "main", None, "README.md", "hello\n")?;
    let c2 = commit_file(&upstream, "main", Some(c1), "README.md", "hello again\n")?;

    let url = upstream_path
        .to_str()
        .ok_or_else(|| anyhow!("temp path is not UTF-8"))?;
    let clone = Repository::clone(url, clone_path)?;
    Ok((clone, c1, c2))
}

/// Discovery that hands back a fixed list
pub struct StaticDiscovery(pub Vec<Repo>);

impl DiscoveryPort for StaticDiscovery {
    fn scan(&self, _req: DiscoverReq) -> lopper_core::Result<Vec<Repo>> {
        Ok(self.0.clone())
    }
}

/// Discovery that always fails like an unreadable root
pub struct FailingDiscovery;

impl DiscoveryPort for FailingDiscovery {
    fn scan(&self, req: DiscoverReq) -> lopper_core::Result<Vec<Repo>> {
        Err(lopper_core::CoreError::Discovery {
            path: req.base,
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        })
    }
}

pub fn repos(names: &[&str]) -> Vec<Repo> {
    names.iter().map(|n| Repo::new("/work", *n)).collect()
}

/// In-memory client scripted per repository name.
///
/// Every repository has `main` unless listed in `no_main`, and the merged
/// branches given in `merged` (default none). `pull` sleeps for `work` and
/// tracks how many repositories are inside it at once.
#[derive(Default)]
pub struct ScriptedClient {
    pub no_main: Vec<&'static str>,
    pub merged: HashMap<&'static str, Vec<&'static str>>,
    pub failing_deletes: Vec<&'static str>,
    pub work: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn with_work(work: Duration) -> Self {
        Self {
            work,
            ..Self::default()
        }
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// `repo/branch` for every delete call that went through
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl RepositoryClient for ScriptedClient {
    fn is_repository(&self, _path: &Path) -> bool {
        true
    }

    fn checkout(&self, path: &Path, branch: &str) -> Result<()> {
        let name = Self::name(path);
        if branch == "main" && !self.no_main.contains(&name.as_str()) {
            Ok(())
        } else {
            Err(anyhow!("failed to checkout branch {branch}"))
        }
    }

    fn pull(&self, _path: &Path) -> std::result::Result<(), PullError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.work);
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn list_merged_branches(&self, path: &Path, _main_branch: &str) -> Result<Vec<String>> {
        let name = Self::name(path);
        Ok(self
            .merged
            .get(name.as_str())
            .map(|branches| branches.iter().map(|b| b.to_string()).collect())
            .unwrap_or_default())
    }

    fn list_squash_merged_branches(
        &self,
        _path: &Path,
        _main_branch: &str,
        _already_merged: &[String],
    ) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn delete_branch(&self, path: &Path, branch: &str) -> Result<()> {
        if self.failing_deletes.contains(&branch) {
            return Err(anyhow!("branch is locked"));
        }
        self.deleted
            .lock()
            .unwrap()
            .push(format!("{}/{}", Self::name(path), branch));
        Ok(())
    }
}
