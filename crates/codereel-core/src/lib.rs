//! Codereel Core - Diff, layout and playback engine
//!
//! This library turns a before/after pair of source files into an ordered
//! line edit script, lays text out as positioned glyphs against a font
//! metrics oracle, and plays the edit script back as a typed-out animation.

pub mod change;
pub mod diff;
pub mod git;
pub mod layout;
pub mod playback;
pub mod render;
pub mod timer;
pub mod viewport;

pub use change::FileChange;
pub use diff::{diff_lines, split_lines, DiffStats, LineNode, LineStatus};
pub use git::{FileChangeProvider, GitProvider};
pub use layout::{
    layout, layout_code, FontMetrics, GlyphLayout, GlyphRecord, Rgba, StyleContext, Theme,
};
pub use playback::{PlaybackContext, PlaybackScheduler, PlaybackState, PlaybackTick, Timings};
pub use render::{FrameRenderer, Surface};
pub use timer::{TaskHandle, TaskScheduler, TimerQueue};
pub use viewport::{blink_intensity, Cursor, ScrollOffset, ViewportState};
