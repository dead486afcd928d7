//! Git integration for branch discovery and branch file changes

use crate::change::FileChange;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepo,
    #[error("No default branch found")]
    NoDefaultBranch,
    #[error("Git command failed: {0}")]
    CommandFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Status of a file between two refs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
}

/// A file changed on a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: PathBuf,
    pub status: FileStatus,
    /// For renamed files, the original path
    pub old_path: Option<PathBuf>,
}

/// Source of branches and per-branch file changes
pub trait FileChangeProvider {
    /// Branches other than the default one; empty on failure
    fn branches(&self, root: &Path) -> Vec<String>;
    /// Files changed on `branch` relative to the default branch; empty on failure
    fn file_changes(&self, root: &Path, branch: &str) -> Vec<FileChange>;
}

/// [`FileChangeProvider`] backed by the `git` command line
#[derive(Debug, Clone, Copy, Default)]
pub struct GitProvider;

impl FileChangeProvider for GitProvider {
    fn branches(&self, root: &Path) -> Vec<String> {
        match branches_excluding_default(root) {
            Ok(branches) => branches,
            Err(err) => {
                warn!(root = %root.display(), %err, "listing branches failed");
                Vec::new()
            }
        }
    }

    fn file_changes(&self, root: &Path, branch: &str) -> Vec<FileChange> {
        match branch_file_changes(root, branch) {
            Ok(files) => files,
            Err(err) => {
                warn!(root = %root.display(), branch, %err, "loading branch changes failed");
                Vec::new()
            }
        }
    }
}

fn git(path: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(path);
    cmd
}

fn checked(output: Output) -> Result<Output, GitError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(GitError::CommandFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

/// Check if a directory is a git repository
pub fn is_git_repo(path: &Path) -> bool {
    git(path)
        .arg("rev-parse")
        .arg("--git-dir")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Get the root of the git repository
pub fn get_repo_root(path: &Path) -> Result<PathBuf, GitError> {
    let output = git(path).arg("rev-parse").arg("--show-toplevel").output()?;

    if !output.status.success() {
        return Err(GitError::NotARepo);
    }

    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(PathBuf::from(root))
}

fn ref_exists(path: &Path, name: &str) -> bool {
    git(path)
        .arg("rev-parse")
        .arg("--verify")
        .arg("--quiet")
        .arg(format!("refs/heads/{name}"))
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Detect the branch others are compared against.
///
/// Uses the remote's HEAD when one is configured, otherwise a local `main`
/// or `master`.
pub fn default_branch(path: &Path) -> Result<String, GitError> {
    let output = git(path)
        .arg("symbolic-ref")
        .arg("--short")
        .arg("refs/remotes/origin/HEAD")
        .output()?;

    if output.status.success() {
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let name = name.strip_prefix("origin/").unwrap_or(&name).to_string();
        if !name.is_empty() {
            return Ok(name);
        }
    }

    ["main", "master"]
        .into_iter()
        .find(|name| ref_exists(path, name))
        .map(str::to_string)
        .ok_or(GitError::NoDefaultBranch)
}

/// List local branches
pub fn list_branches(path: &Path) -> Result<Vec<String>, GitError> {
    let output = checked(git(path).arg("branch").arg("--list").output()?)?;
    Ok(parse_branch_list(&String::from_utf8_lossy(&output.stdout)))
}

fn branches_excluding_default(path: &Path) -> Result<Vec<String>, GitError> {
    let default = default_branch(path)?;
    let mut branches = list_branches(path)?;
    branches.retain(|b| *b != default);
    debug!(default = %default, count = branches.len(), "branches listed");
    Ok(branches)
}

/// Get files changed on `branch` since it forked from `base`
pub fn get_branch_changes(path: &Path, base: &str, branch: &str) -> Result<Vec<ChangedFile>, GitError> {
    let output = checked(
        git(path)
            .arg("diff")
            .arg("--name-status")
            .arg(format!("{base}...{branch}"))
            .output()?,
    )?;

    let mut changes = Vec::new();
    parse_name_status(&String::from_utf8_lossy(&output.stdout), &mut changes);
    Ok(changes)
}

/// Commit where `branch` forked from `base`
pub fn merge_base(path: &Path, base: &str, branch: &str) -> Result<String, GitError> {
    let output = checked(git(path).arg("merge-base").arg(base).arg(branch).output()?)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Get the content of a file at a specific commit
pub fn get_file_at_commit(path: &Path, commit: &str, file: &Path) -> Result<String, GitError> {
    let output = checked(
        git(path)
            .arg("show")
            .arg(format!("{}:{}", commit, file.display()))
            .output()?,
    )?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn branch_file_changes(path: &Path, branch: &str) -> Result<Vec<FileChange>, GitError> {
    let root = get_repo_root(path)?;
    let default = default_branch(&root)?;
    let base = merge_base(&root, &default, branch).unwrap_or_else(|_| default.clone());
    let changes = get_branch_changes(&root, &default, branch)?;
    debug!(branch, base = %base, count = changes.len(), "branch changes");

    let mut files = Vec::with_capacity(changes.len());
    for change in changes {
        let original_path = change.old_path.as_deref().unwrap_or(&change.path);
        let original = match change.status {
            FileStatus::Added => String::new(),
            _ => get_file_at_commit(&root, &base, original_path)?,
        };
        let modified = match change.status {
            FileStatus::Deleted => String::new(),
            _ => get_file_at_commit(&root, branch, &change.path)?,
        };
        files.push(FileChange::new(change.path, original, modified));
    }
    Ok(files)
}

fn parse_branch_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim_start_matches(['*', '+']).trim())
        .filter(|name| !name.is_empty() && !name.starts_with('('))
        .map(str::to_string)
        .collect()
}

fn parse_name_status(output: &str, changes: &mut Vec<ChangedFile>) {
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        let status = match parts[0].chars().next() {
            Some('M') => FileStatus::Modified,
            Some('A') => FileStatus::Added,
            Some('D') => FileStatus::Deleted,
            Some('R') => FileStatus::Renamed,
            _ => continue,
        };

        let Some(last) = parts.last().filter(|_| parts.len() >= 2) else {
            continue;
        };
        let old_path = if status == FileStatus::Renamed && parts.len() >= 3 {
            Some(PathBuf::from(parts[1]))
        } else {
            None
        };

        changes.push(ChangedFile {
            path: PathBuf::from(*last),
            status,
            old_path,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_name_status() {
        let output = "M\tsrc/main.rs\nA\tsrc/new.rs\nD\tsrc/old.rs\nR087\tsrc/a.rs\tsrc/b.rs\nX\tjunk\nM\n";
        let mut changes = Vec::new();
        parse_name_status(output, &mut changes);

        assert_eq!(changes.len(), 4);
        assert_eq!(changes[0].status, FileStatus::Modified);
        assert_eq!(changes[1].status, FileStatus::Added);
        assert_eq!(changes[2].status, FileStatus::Deleted);
        assert_eq!(changes[3].status, FileStatus::Renamed);
        assert_eq!(changes[3].path, PathBuf::from("src/b.rs"));
        assert_eq!(changes[3].old_path, Some(PathBuf::from("src/a.rs")));
    }

    #[test]
    fn test_parse_branch_list_strips_markers() {
        let output = "  feature/x\n* main\n+ worktree\n  (HEAD detached at 1234abc)\n\n";
        assert_eq!(parse_branch_list(output), vec!["feature/x", "main", "worktree"]);
    }

    #[test]
    fn test_provider_is_empty_outside_a_repo() {
        let missing = std::env::temp_dir().join("codereel-no-such-dir").join("nested");
        assert!(GitProvider.branches(&missing).is_empty());
        assert!(GitProvider.file_changes(&missing, "feature").is_empty());
        assert!(!is_git_repo(&missing));
    }

    fn run(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["-c", "user.name=reel", "-c", "user.email=reel@example.com", "-c", "commit.gpgsign=false"])
            .args(args)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_branch_changes_from_real_repo() {
        let dir = std::env::temp_dir().join(format!("codereel-git-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        if !run(&dir, &["init", "-q"]) {
            // git not available
            return;
        }
        assert!(run(&dir, &["symbolic-ref", "HEAD", "refs/heads/main"]));
        fs::write(dir.join("keep.txt"), "a\nb\nc").unwrap();
        fs::write(dir.join("gone.txt"), "bye").unwrap();
        assert!(run(&dir, &["add", "."]));
        assert!(run(&dir, &["commit", "-q", "-m", "base"]));

        assert!(run(&dir, &["checkout", "-q", "-b", "feature"]));
        fs::write(dir.join("keep.txt"), "a\nx\nc").unwrap();
        fs::write(dir.join("new.txt"), "hello").unwrap();
        fs::remove_file(dir.join("gone.txt")).unwrap();
        assert!(run(&dir, &["add", "-A"]));
        assert!(run(&dir, &["commit", "-q", "-m", "feature"]));

        assert_eq!(default_branch(&dir).unwrap(), "main");
        assert_eq!(GitProvider.branches(&dir), vec!["feature"]);

        let mut files = GitProvider.file_changes(&dir, "feature");
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let summary: Vec<(&str, &str, &str)> = files
            .iter()
            .map(|f| (f.path.to_str().unwrap(), f.original.as_str(), f.modified.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("gone.txt", "bye", ""),
                ("keep.txt", "a\nb\nc", "a\nx\nc"),
                ("new.txt", "", "hello"),
            ]
        );
        assert!(files.iter().all(|f| f.current == f.original));

        let _ = fs::remove_dir_all(&dir);
    }
}
