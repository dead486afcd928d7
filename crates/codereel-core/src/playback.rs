//! Playback of edit scripts as a typed-out animation
//!
//! The scheduler walks each file's line diff chunk by chunk. A chunk with
//! removed lines is first selected one position per highlight tick, then
//! deleted in one edit; its added lines are then typed one character per
//! typing tick. Every step is its own scheduled task, and restarting
//! cancels all of them before anything new is scheduled.

use crate::change::FileChange;
use crate::diff::{diff_lines, next_chunk, DiffStats, LineNode, LineStatus};
use crate::timer::{TaskHandle, TaskScheduler};
use crate::viewport::{Cursor, ViewportState};
use std::ops::Range;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Delays between playback steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Per position of the growing removal selection
    pub highlight: Duration,
    /// Per typed character
    pub typing: Duration,
    /// Before locating the next chunk
    pub chunk_pause: Duration,
    /// Before a file starts and before moving on to the next one
    pub file_pause: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            highlight: Duration::from_millis(8),
            typing: Duration::from_millis(35),
            chunk_pause: Duration::from_millis(400),
            file_pause: Duration::from_millis(1200),
        }
    }
}

/// Where playback currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    LocatingChunk,
    /// Selection grows from `from` toward `end`
    RemovingHighlight { from: usize, end: usize },
    /// Selection `[from, end)` is deleted on the next tick
    Removing { from: usize, end: usize },
    /// `next` characters of the chunk text typed so far
    Typing { next: usize },
    AdvancingFile,
    Done,
}

impl PlaybackState {
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::LocatingChunk => "locating",
            PlaybackState::RemovingHighlight { .. } => "selecting",
            PlaybackState::Removing { .. } => "removing",
            PlaybackState::Typing { .. } => "typing",
            PlaybackState::AdvancingFile => "next file",
            PlaybackState::Done => "done",
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self, PlaybackState::Idle | PlaybackState::Done)
    }
}

/// Scheduled step, tagged with the run that scheduled it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTick {
    run: u64,
    seq: u64,
}

/// Edit plan for one chunk of the active script
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChunkPlan {
    nodes: Range<usize>,
    /// Deletion range in the live buffer
    from: usize,
    end: usize,
    /// Insertion point for the added lines
    at: usize,
    text: Vec<char>,
    removed: bool,
}

impl ChunkPlan {
    /// Work out the edits for `nodes` against the live buffer.
    ///
    /// Every chunk before this one is already applied, so the buffer holds
    /// the `same`/`added` lines before the chunk, then the chunk's removed
    /// lines, then the old side of everything after it.
    fn new(script: &[LineNode], nodes: Range<usize>) -> Self {
        let line_len = |n: &LineNode| n.text.chars().count() + 1;

        let before: Vec<&LineNode> = script[..nodes.start]
            .iter()
            .filter(|n| n.status != LineStatus::Removed)
            .collect();
        let prefix: usize = before.iter().map(|n| line_len(n)).sum();
        let has_prefix = !before.is_empty();
        let has_suffix = script[nodes.end..]
            .iter()
            .any(|n| n.status != LineStatus::Added);

        let chunk = &script[nodes.clone()];
        let removed: usize = chunk
            .iter()
            .filter(|n| n.status == LineStatus::Removed)
            .map(line_len)
            .sum();
        let added: Vec<&str> = chunk
            .iter()
            .filter(|n| n.status == LineStatus::Added)
            .map(|n| n.text.as_str())
            .collect();

        // With a line before the chunk, edits hang off its end and each line
        // carries its leading separator; otherwise they sit at offset 0 and
        // carry trailing separators, except at the very end of the buffer
        let (from, end, at, text) = if has_prefix {
            let anchor = prefix - 1;
            let text: String = added.iter().flat_map(|line| ['\n'].into_iter().chain(line.chars())).collect();
            (anchor, anchor + removed, anchor, text)
        } else {
            let end = if has_suffix || removed == 0 { removed } else { removed - 1 };
            let mut text = added.join("\n");
            if has_suffix && !added.is_empty() {
                text.push('\n');
            }
            (0, end, 0, text)
        };

        Self {
            nodes,
            from,
            end,
            at,
            text: text.chars().collect(),
            removed: from == end,
        }
    }
}

/// Files, script and progress shared by tick handlers and painting
#[derive(Debug, Clone)]
pub struct PlaybackContext {
    files: Vec<FileChange>,
    stats: Vec<DiffStats>,
    active: usize,
    state: PlaybackState,
    script: Vec<LineNode>,
    /// First script node not yet handled
    position: usize,
    plan: Option<ChunkPlan>,
}

impl PlaybackContext {
    pub fn new(files: Vec<FileChange>) -> Self {
        let stats = files
            .iter()
            .map(|f| DiffStats::from_script(&diff_lines(&f.original, &f.modified)))
            .collect();
        Self {
            files,
            stats,
            active: 0,
            state: PlaybackState::Idle,
            script: Vec::new(),
            position: 0,
            plan: None,
        }
    }

    pub fn files(&self) -> &[FileChange] {
        &self.files
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_file(&self) -> Option<&FileChange> {
        self.files.get(self.active)
    }

    /// Edit script of the active file (empty until playback starts)
    pub fn script(&self) -> &[LineNode] {
        &self.script
    }

    pub fn stats(&self, index: usize) -> DiffStats {
        self.stats.get(index).copied().unwrap_or_default()
    }

    pub fn total_stats(&self) -> DiffStats {
        self.stats.iter().fold(DiffStats::default(), |acc, s| DiffStats {
            insertions: acc.insertions + s.insertions,
            deletions: acc.deletions + s.deletions,
        })
    }

    fn active_file_mut(&mut self) -> Option<&mut FileChange> {
        self.files.get_mut(self.active)
    }

    /// Make file `index` active with its buffer back at the original text
    fn enter_file(&mut self, index: usize) {
        self.active = index;
        self.position = 0;
        self.plan = None;
        self.script = match self.files.get_mut(index) {
            Some(file) => {
                file.reset();
                diff_lines(&file.original, &file.modified)
            }
            None => Vec::new(),
        };
    }
}

/// Drives a [`PlaybackContext`] through scheduled ticks
#[derive(Debug)]
pub struct PlaybackScheduler {
    timings: Timings,
    context: PlaybackContext,
    run: u64,
    seq: u64,
    outstanding: Vec<(u64, TaskHandle)>,
}

impl PlaybackScheduler {
    pub fn new(files: Vec<FileChange>, timings: Timings) -> Self {
        Self {
            timings,
            context: PlaybackContext::new(files),
            run: 0,
            seq: 0,
            outstanding: Vec::new(),
        }
    }

    pub fn context(&self) -> &PlaybackContext {
        &self.context
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Number of ticks scheduled and not yet handled
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Replace the file list, cancelling any playback in flight
    pub fn set_files<S: TaskScheduler<PlaybackTick>>(
        &mut self,
        files: Vec<FileChange>,
        viewport: &mut ViewportState,
        timers: &mut S,
    ) {
        self.cancel_all(timers);
        self.context = PlaybackContext::new(files);
        viewport.reset();
    }

    /// Start playback from the first file, cancelling any run in flight
    pub fn start<S: TaskScheduler<PlaybackTick>>(
        &mut self,
        viewport: &mut ViewportState,
        timers: &mut S,
    ) {
        self.cancel_all(timers);
        self.run += 1;
        viewport.reset();
        debug!(run = self.run, files = self.context.files.len(), "playback start");

        if self.context.files.is_empty() {
            self.context.active = 0;
            self.transition(PlaybackState::Done);
            return;
        }

        self.context.enter_file(0);
        self.transition(PlaybackState::LocatingChunk);
        self.schedule(self.timings.file_pause, timers);
    }

    /// Cancel everything and go back to idle
    pub fn stop<S: TaskScheduler<PlaybackTick>>(&mut self, timers: &mut S) {
        self.cancel_all(timers);
        self.transition(PlaybackState::Idle);
    }

    fn cancel_all<S: TaskScheduler<PlaybackTick>>(&mut self, timers: &mut S) {
        for (_, handle) in self.outstanding.drain(..) {
            timers.cancel(handle);
        }
    }

    fn schedule<S: TaskScheduler<PlaybackTick>>(&mut self, delay: Duration, timers: &mut S) {
        self.seq += 1;
        let tick = PlaybackTick {
            run: self.run,
            seq: self.seq,
        };
        let handle = timers.schedule(delay, tick);
        self.outstanding.push((tick.seq, handle));
    }

    fn transition(&mut self, next: PlaybackState) {
        if std::mem::discriminant(&self.context.state) != std::mem::discriminant(&next) {
            debug!(from = self.context.state.label(), to = next.label(), file = self.context.active, "playback transition");
        }
        self.context.state = next;
    }

    /// Run one scheduled step
    pub fn handle<S: TaskScheduler<PlaybackTick>>(
        &mut self,
        tick: PlaybackTick,
        viewport: &mut ViewportState,
        timers: &mut S,
    ) {
        if tick.run != self.run {
            trace!(run = tick.run, current = self.run, "dropping tick from cancelled run");
            return;
        }
        let before = self.outstanding.len();
        self.outstanding.retain(|(seq, _)| *seq != tick.seq);
        if self.outstanding.len() == before {
            trace!(seq = tick.seq, "dropping cancelled tick");
            return;
        }
        trace!(seq = tick.seq, state = self.context.state.label(), "tick");

        match self.context.state {
            PlaybackState::Idle | PlaybackState::Done => {}
            PlaybackState::LocatingChunk => self.locate_chunk(viewport, timers),
            PlaybackState::RemovingHighlight { from, end } => {
                let grown = (viewport.cursor.end + 1).clamp(from, end);
                viewport.cursor = Cursor { start: from, end: grown };
                if grown >= end {
                    self.transition(PlaybackState::Removing { from, end });
                    self.schedule(self.timings.chunk_pause, timers);
                } else {
                    self.schedule(self.timings.highlight, timers);
                }
            }
            PlaybackState::Removing { from, end } => {
                if let Some(file) = self.context.active_file_mut() {
                    file.delete(from, end);
                }
                viewport.cursor = Cursor::collapsed(from);
                if let Some(plan) = self.context.plan.as_mut() {
                    plan.removed = true;
                }
                self.transition(PlaybackState::LocatingChunk);
                self.schedule(self.timings.typing, timers);
            }
            PlaybackState::Typing { next } => self.type_char(next, viewport, timers),
            PlaybackState::AdvancingFile => self.advance_file(viewport, timers),
        }
    }

    fn locate_chunk<S: TaskScheduler<PlaybackTick>>(
        &mut self,
        viewport: &mut ViewportState,
        timers: &mut S,
    ) {
        if let Some((at, nothing_to_type)) = self
            .context
            .plan
            .as_ref()
            .filter(|p| p.removed)
            .map(|p| (p.at, p.text.is_empty()))
        {
            // Removal of the current chunk is done; type its added lines
            if nothing_to_type {
                self.finish_chunk();
                return self.locate_chunk(viewport, timers);
            }
            viewport.cursor = Cursor::collapsed(at);
            self.transition(PlaybackState::Typing { next: 0 });
            self.schedule(self.timings.typing, timers);
            return;
        }

        let Some(nodes) = next_chunk(&self.context.script, self.context.position) else {
            self.transition(PlaybackState::AdvancingFile);
            self.schedule(self.timings.file_pause, timers);
            return;
        };

        let plan = ChunkPlan::new(&self.context.script, nodes);
        debug!(
            nodes = ?plan.nodes,
            from = plan.from,
            end = plan.end,
            typed = plan.text.len(),
            "chunk located"
        );
        let (from, end) = (plan.from, plan.end);
        self.context.plan = Some(plan);

        if from == end {
            self.locate_chunk(viewport, timers);
        } else {
            viewport.cursor = Cursor::collapsed(from);
            self.transition(PlaybackState::RemovingHighlight { from, end });
            self.schedule(self.timings.highlight, timers);
        }
    }

    fn type_char<S: TaskScheduler<PlaybackTick>>(
        &mut self,
        next: usize,
        viewport: &mut ViewportState,
        timers: &mut S,
    ) {
        let step = self
            .context
            .plan
            .as_ref()
            .and_then(|plan| Some((plan.at + next, *plan.text.get(next)?, plan.text.len())));
        let Some((at, ch, len)) = step else {
            warn!(next, "typing past the end of the chunk");
            self.finish_chunk();
            self.transition(PlaybackState::LocatingChunk);
            self.schedule(self.timings.chunk_pause, timers);
            return;
        };

        let mut buf = [0u8; 4];
        if let Some(file) = self.context.active_file_mut() {
            file.insert(at, ch.encode_utf8(&mut buf));
        }
        viewport.cursor = Cursor::collapsed(at + 1);

        if next + 1 >= len {
            self.finish_chunk();
            self.transition(PlaybackState::LocatingChunk);
            self.schedule(self.timings.chunk_pause, timers);
        } else {
            self.transition(PlaybackState::Typing { next: next + 1 });
            self.schedule(self.timings.typing, timers);
        }
    }

    fn finish_chunk(&mut self) {
        if let Some(plan) = self.context.plan.take() {
            self.context.position = plan.nodes.end;
        }
    }

    fn advance_file<S: TaskScheduler<PlaybackTick>>(
        &mut self,
        viewport: &mut ViewportState,
        timers: &mut S,
    ) {
        if let Some(file) = self.context.active_file() {
            if !file.is_complete() {
                warn!(path = %file.path.display(), "playback finished with buffer differing from modified text");
            }
        }
        viewport.reset();

        let next = self.context.active + 1;
        if next >= self.context.files.len() {
            self.transition(PlaybackState::Done);
            return;
        }

        self.context.enter_file(next);
        self.transition(PlaybackState::LocatingChunk);
        self.schedule(self.timings.file_pause, timers);
    }
}
