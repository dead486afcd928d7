//! Application state and logic

use codereel_core::{
    FileChangeProvider, FrameRenderer, PlaybackScheduler, PlaybackTick, StyleContext,
    TimerQueue, Timings, ViewportState,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod branches;
mod playback;

#[cfg(test)]
pub(crate) mod tests;

/// How long a status message stays visible
const MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The main application state
pub struct App {
    /// Repository being replayed
    pub workspace: PathBuf,
    /// Replayable branches, default branch excluded
    pub branches: Vec<String>,
    /// Index into `branches`
    pub selected_branch: Option<usize>,
    provider: Box<dyn FileChangeProvider>,
    pub scheduler: PlaybackScheduler,
    pub viewport: ViewportState,
    pub timers: TimerQueue<PlaybackTick>,
    pub renderer: FrameRenderer,
    /// Start playback as soon as a branch is loaded
    pub autoplay: bool,
    /// Transient message and the clock reading it expires at
    message: Option<(String, Duration)>,
    /// Whether to quit
    pub should_quit: bool,
    started: Instant,
}

impl App {
    pub fn new(
        provider: Box<dyn FileChangeProvider>,
        timings: Timings,
        style: StyleContext,
        autoplay: bool,
    ) -> Self {
        let mut renderer = FrameRenderer::new(style);
        // One terminal cell
        renderer.caret_width = 1.0;
        Self {
            workspace: PathBuf::from("."),
            branches: Vec::new(),
            selected_branch: None,
            provider,
            scheduler: PlaybackScheduler::new(Vec::new(), timings),
            viewport: ViewportState::default(),
            timers: TimerQueue::new(),
            renderer,
            autoplay,
            message: None,
            should_quit: false,
            started: Instant::now(),
        }
    }

    /// Name of the selected branch
    pub fn branch(&self) -> Option<&str> {
        self.selected_branch
            .and_then(|idx| self.branches.get(idx))
            .map(String::as_str)
    }

    /// Playback clock, also used for the caret blink phase
    pub fn clock(&self) -> Duration {
        self.timers.now()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), self.clock() + MESSAGE_TTL));
    }

    /// Advance to wall-clock time
    pub fn tick(&mut self) {
        let elapsed = self.started.elapsed();
        self.advance_to(elapsed);
    }
}
