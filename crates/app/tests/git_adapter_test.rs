//! GitAdapter against real repositories built with git2

mod common;

use anyhow::Result;
use common::{cloned_repo, commit_file, create_branch, init_repo, local_branch_names};
use lopper::adapters::git::GitAdapter;
use lopper_core::ports::RepositoryClient;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_is_repository() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let repo_path = temp_dir.path().join("repo");
    let plain_path = temp_dir.path().join("plain");
    init_repo(&repo_path, false)?;
    fs::create_dir_all(&plain_path)?;
    fs::create_dir_all(repo_path.join("sub"))?;

    let adapter = GitAdapter::new();
    assert!(adapter.is_repository(&repo_path));
    assert!(!adapter.is_repository(&plain_path));
    // no upward search: a directory inside a repository is not one itself
    assert!(!adapter.is_repository(&repo_path.join("sub")));
    Ok(())
}

#[test]
fn test_merged_branches_are_ancestors_of_main() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("proj");
    let repo = init_repo(&path, false)?;
    let c1 = commit_file(&repo, "main", None, "README.md", "hello\n")?;
    let c2 = commit_file(&repo, "main", Some(c1), "README.md", "hello again\n")?;

    create_branch(&repo, "feat-a", c1)?;
    create_branch(&repo, "feat-c", c2)?;
    commit_file(&repo, "feat-b", Some(c2), "b.txt", "unmerged\n")?;

    let merged = GitAdapter::new().list_merged_branches(&path, "main")?;

    assert_eq!(merged, vec!["feat-a", "feat-c"]);
    Ok(())
}

#[test]
fn test_merged_listing_fails_without_main() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("proj");
    let repo = init_repo(&path, false)?;
    commit_file(&repo, "trunk", None, "README.md", "hello\n")?;

    assert!(GitAdapter::new().list_merged_branches(&path, "main").is_err());
    Ok(())
}

#[test]
fn test_squash_merged_branch_is_detected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("proj");
    let repo = init_repo(&path, false)?;
    let c1 = commit_file(&repo, "main", None, "README.md", "hello\n")?;

    // two commits on the branch, squashed into one on main
    let s1 = commit_file(&repo, "feat-s", Some(c1), "s.txt", "one\n")?;
    commit_file(&repo, "feat-s", Some(s1), "s.txt", "two\n")?;
    commit_file(&repo, "main", Some(c1), "s.txt", "two\n")?;

    commit_file(&repo, "feat-u", Some(c1), "u.txt", "never merged\n")?;
    create_branch(&repo, "feat-a", c1)?;
    // unrelated history has no merge base and is simply not squash-merged
    commit_file(&repo, "orphan", None, "o.txt", "alone\n")?;

    let adapter = GitAdapter::new();
    let merged = adapter.list_merged_branches(&path, "main")?;
    let squashed = adapter.list_squash_merged_branches(&path, "main", &merged)?;

    assert_eq!(merged, vec!["feat-a"]);
    assert_eq!(squashed, vec!["feat-s"]);
    assert!(squashed.iter().all(|b| !merged.contains(b)));
    Ok(())
}

#[test]
fn test_partially_merged_branch_is_not_squash_merged() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("proj");
    let repo = init_repo(&path, false)?;
    let c1 = commit_file(&repo, "main", None, "README.md", "hello\n")?;

    let p1 = commit_file(&repo, "feat-p", Some(c1), "p.txt", "one\n")?;
    commit_file(&repo, "feat-p", Some(p1), "q.txt", "more\n")?;
    // main only picked up the first half
    commit_file(&repo, "main", Some(c1), "p.txt", "one\n")?;

    let squashed = GitAdapter::new().list_squash_merged_branches(&path, "main", &[])?;

    assert!(squashed.is_empty());
    Ok(())
}

#[test]
fn test_delete_branch() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("proj");
    let repo = init_repo(&path, false)?;
    let c1 = commit_file(&repo, "main", None, "README.md", "hello\n")?;
    create_branch(&repo, "feat-a", c1)?;

    let adapter = GitAdapter::new();
    adapter.delete_branch(&path, "feat-a")?;

    assert_eq!(local_branch_names(&path)?, vec!["main"]);
    assert!(adapter.delete_branch(&path, "feat-a").is_err());
    Ok(())
}

#[test]
fn test_checkout_resolves_only_existing_branches() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let clone_path = temp_dir.path().join("proj");
    cloned_repo(&temp_dir.path().join("upstream.git"), &clone_path)?;

    let adapter = GitAdapter::new();
    adapter.checkout(&clone_path, "main")?;

    let err = adapter.checkout(&clone_path, "master").unwrap_err();
    assert_eq!(err.to_string(), "failed to checkout branch master");
    Ok(())
}

#[test]
fn test_pull_fast_forwards_main() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let upstream_path = temp_dir.path().join("upstream.git");
    let clone_path = temp_dir.path().join("proj");

    let upstream = init_repo(&upstream_path, true)?;
    let c1 = commit_file(&upstream, "main", None, "README.md", "hello\n")?;
    let f1 = commit_file(&upstream, "feature", Some(c1), "f.txt", "feature\n")?;
    let clone = git2::Repository::clone(
        upstream_path.to_str().expect("utf-8 temp path"),
        &clone_path,
    )?;
    create_branch(&clone, "feature", f1)?;

    // the feature lands on main upstream after the clone
    upstream.reference("refs/heads/main", f1, true, "fast-forward")?;

    let adapter = GitAdapter::new();
    assert!(adapter.list_merged_branches(&clone_path, "main")?.is_empty());

    adapter.pull(&clone_path)?;

    assert_eq!(adapter.list_merged_branches(&clone_path, "main")?, vec!["feature"]);
    Ok(())
}

#[test]
fn test_pull_without_remote_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("proj");
    let repo = init_repo(&path, false)?;
    commit_file(&repo, "main", None, "README.md", "hello\n")?;

    assert!(GitAdapter::new().pull(&path).is_err());
    Ok(())
}
