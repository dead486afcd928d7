use super::*;
use codereel_core::{FileChange, PlaybackState};
use std::path::Path;

/// In-memory branches and their file changes
pub(crate) struct FakeProvider {
    pub branches: Vec<(String, Vec<FileChange>)>,
}

impl FileChangeProvider for FakeProvider {
    fn branches(&self, _root: &Path) -> Vec<String> {
        self.branches.iter().map(|(name, _)| name.clone()).collect()
    }

    fn file_changes(&self, _root: &Path, branch: &str) -> Vec<FileChange> {
        self.branches
            .iter()
            .find(|(name, _)| name == branch)
            .map(|(_, files)| files.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn change(path: &str, original: &str, modified: &str) -> FileChange {
    FileChange::new(path, original.to_string(), modified.to_string())
}

pub(crate) fn make_app(autoplay: bool) -> App {
    let provider = FakeProvider {
        branches: vec![
            (
                "feature".to_string(),
                vec![
                    change("src/lib.rs", "a\nb\nc", "a\nx\nc"),
                    change("README.md", "", "hello"),
                ],
            ),
            ("empty".to_string(), Vec::new()),
        ],
    };
    App::new(Box::new(provider), Timings::default(), StyleContext::default(), autoplay)
}

fn state(app: &App) -> PlaybackState {
    app.scheduler.context().state()
}

#[test]
fn test_open_workspace_selects_first_branch_and_autoplays() {
    let mut app = make_app(true);
    app.open_workspace(PathBuf::from("/repo"), None);

    assert_eq!(app.branches, vec!["feature", "empty"]);
    assert_eq!(app.branch(), Some("feature"));
    assert_eq!(app.scheduler.context().files().len(), 2);
    assert_eq!(state(&app), PlaybackState::LocatingChunk);
}

#[test]
fn test_playback_runs_to_done_on_the_clock() {
    let mut app = make_app(true);
    app.open_workspace(PathBuf::from("/repo"), None);

    app.advance_to(Duration::from_millis(600));
    assert_eq!(state(&app), PlaybackState::LocatingChunk);

    app.advance_to(Duration::from_secs(60));
    assert_eq!(state(&app), PlaybackState::Done);
    let files = app.scheduler.context().files();
    assert!(files.iter().all(|f| f.current == f.modified));
    assert!(app.timers.is_empty());
}

#[test]
fn test_without_autoplay_waits_for_start() {
    let mut app = make_app(false);
    app.open_workspace(PathBuf::from("/repo"), None);
    assert_eq!(state(&app), PlaybackState::Idle);
    assert!(app.timers.is_empty());

    app.start_playback();
    assert_eq!(state(&app), PlaybackState::LocatingChunk);
    app.stop_playback();
    assert_eq!(state(&app), PlaybackState::Idle);
    assert!(app.timers.is_empty());
}

#[test]
fn test_restart_leaves_one_pending_tick() {
    let mut app = make_app(true);
    app.open_workspace(PathBuf::from("/repo"), None);
    app.advance_to(Duration::from_millis(1300));
    assert!(state(&app).is_running());

    app.start_playback();
    app.start_playback();
    assert_eq!(app.timers.len(), 1);
    assert_eq!(app.scheduler.outstanding(), 1);
    assert_eq!(app.scheduler.context().active_index(), 0);
    assert_eq!(app.scheduler.context().files()[0].current, "a\nb\nc");
}

#[test]
fn test_branch_navigation_wraps_and_reloads() {
    let mut app = make_app(true);
    app.open_workspace(PathBuf::from("/repo"), None);

    app.next_branch();
    assert_eq!(app.branch(), Some("empty"));
    assert!(app.scheduler.context().files().is_empty());
    assert_eq!(state(&app), PlaybackState::Done);

    app.next_branch();
    assert_eq!(app.branch(), Some("feature"));
    assert_eq!(app.scheduler.context().files().len(), 2);

    app.prev_branch();
    assert_eq!(app.branch(), Some("empty"));
}

#[test]
fn test_preferred_branch() {
    let mut app = make_app(false);
    app.open_workspace(PathBuf::from("/repo"), Some("empty"));
    assert_eq!(app.branch(), Some("empty"));

    app.open_workspace(PathBuf::from("/repo"), Some("missing"));
    assert_eq!(app.branch(), Some("feature"));
    assert_eq!(app.message(), Some("branch missing not found"));
}

#[test]
fn test_no_branches() {
    let mut app = App::new(
        Box::new(FakeProvider { branches: Vec::new() }),
        Timings::default(),
        StyleContext::default(),
        true,
    );
    app.open_workspace(PathBuf::from("/repo"), None);
    assert_eq!(app.branch(), None);
    assert_eq!(state(&app), PlaybackState::Done);
    app.next_branch();
    app.prev_branch();
    assert_eq!(app.branch(), None);
}

#[test]
fn test_context_action_message_expires() {
    let mut app = make_app(false);
    app.open_workspace(PathBuf::from("/repo"), None);
    app.context_action();
    assert_eq!(app.message(), Some("src/lib.rs (1/2) idle +1 -1"));

    app.start_playback();
    app.context_action();
    assert_eq!(app.message(), Some("src/lib.rs (1/2) locating +1 -1"));

    app.advance_to(Duration::from_secs(2));
    assert!(app.message().is_some());
    app.advance_to(Duration::from_secs(4));
    assert!(app.message().is_none());
}
