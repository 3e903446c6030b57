use anyhow::{bail, Context, Result};
use git2::{BranchType, ErrorCode, Oid, Repository as GitRepository, Tree};
use lopper_core::ports::RepositoryClient;
use lopper_core::PullError;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Git adapter that implements RepositoryClient.
///
/// Checkout and pull shell out to the `git` binary so the user's credentials,
/// hooks and config apply. Graph queries and branch deletion use git2.
pub struct GitAdapter;

impl GitAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Run `git -C <path> <args>` without a terminal to prompt on
    fn git(&self, path: &Path, args: &[&str]) -> std::io::Result<Output> {
        debug!("git -C {} {}", path.display(), args.join(" "));
        Command::new("git")
            .arg("-C")
            .arg(path)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
    }

    fn open_repo(&self, path: &Path) -> Result<GitRepository> {
        GitRepository::open(path)
            .with_context(|| format!("Failed to open git repository at {}", path.display()))
    }

    fn branch_tip(repo: &GitRepository, branch: &str) -> Result<Oid> {
        let reference = repo
            .find_branch(branch, BranchType::Local)
            .with_context(|| format!("branch {branch} not found"))?;
        let commit = reference
            .get()
            .peel_to_commit()
            .with_context(|| format!("branch {branch} does not point at a commit"))?;
        Ok(commit.id())
    }

    /// Local branches and their tips, sorted by name like `git branch`
    fn local_branches(repo: &GitRepository) -> Result<Vec<(String, Oid)>> {
        let mut branches = Vec::new();
        for entry in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            // non UTF-8 names cannot be passed back to git reliably
            let Some(name) = branch.name()?.map(str::to_string) else {
                continue;
            };
            let tip = branch.get().peel_to_commit()?.id();
            branches.push((name, tip));
        }
        branches.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(branches)
    }

    /// Patch id of the change from `old` to `new`, `None` for an empty change
    fn patch_id(repo: &GitRepository, old: &Tree<'_>, new: &Tree<'_>) -> Result<Option<Oid>> {
        let diff = repo.diff_tree_to_tree(Some(old), Some(new), None)?;
        if diff.deltas().len() == 0 {
            return Ok(None);
        }
        Ok(Some(diff.patchid(None)?))
    }

    /// `git cherry` style check for one branch.
    ///
    /// The branch's changes are taken as one synthetic commit: its tree on top of
    /// the merge base with main. The branch counts as squash-merged when a commit
    /// on main after the merge base carries the same patch.
    fn is_squash_merged(repo: &GitRepository, main_tip: Oid, branch_tip: Oid) -> Result<bool> {
        let base = match repo.merge_base(main_tip, branch_tip) {
            Ok(base) => base,
            // unrelated history, e.g. an orphan branch
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(false),
            Err(e) => return Err(e).context("failed to get ancestor hash"),
        };

        let base_tree = repo.find_commit(base)?.tree()?;
        let branch_tree = repo.find_commit(branch_tip)?.tree()?;
        let Some(branch_patch) = Self::patch_id(repo, &base_tree, &branch_tree)? else {
            return Ok(false);
        };

        let mut revwalk = repo.revwalk()?;
        revwalk.push(main_tip)?;
        revwalk.hide(base)?;
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            if commit.parent_count() != 1 {
                continue;
            }
            let parent_tree = commit.parent(0)?.tree()?;
            if Self::patch_id(repo, &parent_tree, &commit.tree()?)? == Some(branch_patch) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Last line git wrote to stderr, or the exit status when it wrote nothing
fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.lines().map(str::trim).filter(|l| !l.is_empty()).last() {
        Some(line) => format!("{}: {}", output.status, line),
        None => output.status.to_string(),
    }
}

impl RepositoryClient for GitAdapter {
    fn is_repository(&self, path: &Path) -> bool {
        GitRepository::open(path).is_ok()
    }

    fn checkout(&self, path: &Path, branch: &str) -> Result<()> {
        let output = self
            .git(path, &["checkout", branch])
            .context("failed to run git")?;
        if !output.status.success() {
            debug!("checkout of {branch} failed: {}", describe_failure(&output));
            bail!("failed to checkout branch {branch}");
        }
        Ok(())
    }

    fn pull(&self, path: &Path) -> std::result::Result<(), PullError> {
        let output = self
            .git(path, &["pull"])
            .map_err(|e| PullError::Other(e.to_string()))?;
        if output.status.success() {
            return Ok(());
        }
        debug!("pull in {} failed: {}", path.display(), describe_failure(&output));
        match output.status.code() {
            Some(1) => Err(PullError::RemoteNotFound),
            Some(128) => Err(PullError::Conflict),
            _ => Err(PullError::Other(describe_failure(&output))),
        }
    }

    fn list_merged_branches(&self, path: &Path, main_branch: &str) -> Result<Vec<String>> {
        let repo = self.open_repo(path)?;
        let main_tip = Self::branch_tip(&repo, main_branch)?;

        let mut merged = Vec::new();
        for (name, tip) in Self::local_branches(&repo)? {
            if name == main_branch {
                continue;
            }
            if tip == main_tip || repo.graph_descendant_of(main_tip, tip)? {
                merged.push(name);
            }
        }
        Ok(merged)
    }

    fn list_squash_merged_branches(
        &self,
        path: &Path,
        main_branch: &str,
        already_merged: &[String],
    ) -> Result<Vec<String>> {
        let repo = self.open_repo(path)?;
        let main_tip = Self::branch_tip(&repo, main_branch)?;

        let mut squashed = Vec::new();
        for (name, tip) in Self::local_branches(&repo)? {
            // directly merged branches have no commits of their own past the merge base
            if name == main_branch || already_merged.contains(&name) {
                continue;
            }
            if Self::is_squash_merged(&repo, main_tip, tip)
                .with_context(|| format!("while checking branch {name}"))?
            {
                squashed.push(name);
            }
        }
        Ok(squashed)
    }

    fn delete_branch(&self, path: &Path, branch: &str) -> Result<()> {
        let repo = self.open_repo(path)?;
        let mut local = repo
            .find_branch(branch, BranchType::Local)
            .with_context(|| format!("branch {branch} not found"))?;
        local.delete()?;
        Ok(())
    }
}

impl Default for GitAdapter {
    fn default() -> Self {
        Self::new()
    }
}
