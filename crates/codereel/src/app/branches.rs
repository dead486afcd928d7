use super::App;
use std::path::PathBuf;
use tracing::debug;

impl App {
    /// Open a workspace and load `preferred`, or its first branch
    pub fn open_workspace(&mut self, workspace: PathBuf, preferred: Option<&str>) {
        self.branches = self.provider.branches(&workspace);
        self.workspace = workspace;
        debug!(workspace = %self.workspace.display(), branches = self.branches.len(), "workspace opened");

        let found = preferred.and_then(|name| self.branches.iter().position(|b| b == name));
        if let (Some(name), None) = (preferred, found) {
            self.set_message(format!("branch {name} not found"));
        }
        let index = found.or_else(|| (!self.branches.is_empty()).then_some(0));
        self.select_branch(index);
    }

    // Branch navigation wraps around
    pub fn next_branch(&mut self) {
        if self.branches.is_empty() {
            return;
        }
        let next = self.selected_branch.map_or(0, |idx| (idx + 1) % self.branches.len());
        self.select_branch(Some(next));
    }

    pub fn prev_branch(&mut self) {
        if self.branches.is_empty() {
            return;
        }
        let count = self.branches.len();
        let prev = self.selected_branch.map_or(count - 1, |idx| (idx + count - 1) % count);
        self.select_branch(Some(prev));
    }

    /// Load the file changes of branch `index`, cancelling playback in flight
    pub fn select_branch(&mut self, index: Option<usize>) {
        self.selected_branch = index.filter(|&idx| idx < self.branches.len());
        let files = match self.branch() {
            Some(branch) => self.provider.file_changes(&self.workspace, branch),
            None => Vec::new(),
        };
        debug!(branch = ?self.branch(), files = files.len(), "branch selected");

        self.scheduler.set_files(files, &mut self.viewport, &mut self.timers);
        if self.autoplay {
            self.start_playback();
        }
    }
}
