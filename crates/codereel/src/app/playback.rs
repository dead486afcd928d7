use super::App;
use std::time::Duration;
use tracing::info;

impl App {
    /// Start, or restart, playback from the first file
    pub fn start_playback(&mut self) {
        self.scheduler.start(&mut self.viewport, &mut self.timers);
    }

    pub fn stop_playback(&mut self) {
        self.scheduler.stop(&mut self.timers);
    }

    /// Move the playback clock to `elapsed` and run every tick that came due
    pub fn advance_to(&mut self, elapsed: Duration) {
        self.timers.advance_to(elapsed);
        while let Some(tick) = self.timers.pop_due() {
            self.scheduler.handle(tick, &mut self.viewport, &mut self.timers);
        }

        let now = self.clock();
        if self.message.as_ref().is_some_and(|(_, until)| *until <= now) {
            self.message = None;
        }
    }

    /// One-line summary: active file, playback state and line stats
    pub fn status_summary(&self) -> String {
        let ctx = self.scheduler.context();
        let state = ctx.state().label();
        match ctx.active_file() {
            Some(file) => {
                let stats = ctx.stats(ctx.active_index());
                format!(
                    "{} ({}/{}) {} +{} -{}",
                    file.path.display(),
                    ctx.active_index() + 1,
                    ctx.files().len(),
                    state,
                    stats.insertions,
                    stats.deletions
                )
            }
            None => format!("no files {state}"),
        }
    }

    /// Context action: surface the current status as a transient message
    pub fn context_action(&mut self) {
        let summary = self.status_summary();
        info!(summary = %summary, "context action");
        self.set_message(summary);
    }
}
