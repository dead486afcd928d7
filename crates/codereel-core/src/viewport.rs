//! Cursor and scroll state with the auto-scroll thresholds

use std::f64::consts::TAU;

/// Cursor into the live buffer, in codepoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub start: usize,
    pub end: usize,
}

impl Cursor {
    pub fn collapsed(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Restore `start <= end <= len`
    pub fn clamp(&mut self, len: usize) {
        self.end = self.end.min(len);
        self.start = self.start.min(self.end);
    }
}

/// Content scroll in pixels; `y` stays at or below zero
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

/// Cursor plus scroll for the active file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState {
    pub cursor: Cursor,
    pub scroll: ScrollOffset,
}

impl ViewportState {
    /// Back to the top-left with a caret at offset 0
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Keep the caret inside the code area.
    ///
    /// `caret_x`/`caret_y` are relative to the code area's top-left corner
    /// before scrolling; `width`/`height` are the visible code area.
    pub fn follow(&mut self, caret_x: f32, caret_y: f32, caret_height: f32, width: f32, height: f32) {
        if height > 0.0 {
            let on_screen = caret_y + self.scroll.y;
            if on_screen > height / 2.0 {
                self.scroll.y = (height / 4.0 - caret_y).min(0.0);
            } else if on_screen + caret_height <= 0.0 {
                // Caret moved above the visible top: bring it back to the
                // same quarter-height anchor used when scrolling down
                tracing::debug!(caret_y, scroll_y = self.scroll.y, "caret above viewport, scrolling up");
                self.scroll.y = (height / 4.0 - caret_y).min(0.0);
            }
        }

        if width > 0.0 {
            let midpoint = width / 2.0;
            let step = width / 4.0;
            if caret_x < midpoint {
                self.scroll.x = 0.0;
            } else if caret_x + self.scroll.x > midpoint {
                let overflow = caret_x + self.scroll.x - midpoint;
                let steps = (overflow / step).ceil();
                self.scroll.x -= steps * step;
            } else if caret_x + self.scroll.x < 0.0 {
                // Caret moved left of the visible edge: bring it back a
                // quarter width in
                tracing::debug!(caret_x, scroll_x = self.scroll.x, "caret left of viewport, scrolling back");
                self.scroll.x = (step - caret_x).min(0.0);
            }
        }
    }
}

/// Caret alpha for wall-clock time `now_millis`, cycling once per second
pub fn blink_intensity(now_millis: u64) -> f32 {
    let phase = TAU * (now_millis % 1000) as f64 / 1000.0;
    ((phase.sin() + 1.0) / 2.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_clamp_keeps_invariant() {
        let mut cursor = Cursor { start: 8, end: 12 };
        cursor.clamp(10);
        assert_eq!(cursor, Cursor { start: 8, end: 10 });
        cursor.clamp(5);
        assert_eq!(cursor, Cursor { start: 5, end: 5 });
        assert!(cursor.is_collapsed());
    }

    #[test]
    fn test_scrolls_when_caret_passes_half_height() {
        let mut vp = ViewportState::default();
        vp.follow(0.0, 40.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.y, 0.0);

        vp.follow(0.0, 60.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.y, -35.0);

        // Now at 25 on screen, under the threshold
        vp.follow(0.0, 74.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.y, -35.0);
    }

    #[test]
    fn test_scrolls_back_up_when_caret_leaves_top() {
        let mut vp = ViewportState::default();
        vp.scroll.y = -300.0;
        vp.follow(0.0, 100.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.y, -75.0);

        vp.follow(0.0, 5.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.y, 0.0);
    }

    #[test]
    fn test_horizontal_snap_and_shift() {
        let mut vp = ViewportState::default();
        vp.follow(70.0, 0.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.x, -25.0);

        vp.follow(74.0, 0.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.x, -25.0);

        vp.follow(130.0, 0.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.x, -100.0);

        vp.follow(10.0, 0.0, 10.0, 100.0, 100.0);
        assert_eq!(vp.scroll.x, 0.0);
    }

    #[test]
    fn test_scrolls_back_when_caret_leaves_left_edge() {
        let mut vp = ViewportState::default();
        vp.follow(200.0, 0.0, 1.0, 100.0, 100.0);
        assert_eq!(vp.scroll.x, -150.0);

        // Right of the midpoint in content space, left of the visible edge
        vp.follow(60.0, 1.0, 1.0, 100.0, 100.0);
        assert_eq!(vp.scroll.x, -35.0);
        let on_screen = 60.0 + vp.scroll.x;
        assert!((0.0..100.0).contains(&on_screen));
    }

    #[test]
    fn test_zero_sized_viewport_is_ignored() {
        let mut vp = ViewportState::default();
        vp.follow(500.0, 500.0, 10.0, 0.0, 0.0);
        assert_eq!(vp.scroll, ScrollOffset::default());
    }

    #[test]
    fn test_blink_intensity_cycle() {
        assert!((blink_intensity(0) - 0.5).abs() < 1e-6);
        assert!((blink_intensity(250) - 1.0).abs() < 1e-6);
        assert!((blink_intensity(750)).abs() < 1e-6);
        assert!((blink_intensity(1250) - 1.0).abs() < 1e-6);
    }
}
