//! Frame painting
//!
//! [`FrameRenderer::paint`] lays out the active file's live buffer, lets the
//! viewport follow the caret, then paints code, gutter and chrome onto a
//! [`Surface`]. Layout coordinates are logical pixels; the surface scale
//! maps them to device pixels.

use crate::layout::{layout, FontMetrics, GlyphRecord, Rgba, StyleContext};
use crate::playback::PlaybackContext;
use crate::viewport::{blink_intensity, ViewportState};

/// Something frames can be painted onto
pub trait Surface {
    /// Drawable size in device pixels
    fn size(&self) -> (f32, f32);

    /// Device pixels per logical pixel
    fn scale(&self) -> f32 {
        1.0
    }

    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);
    fn draw_char(&mut self, x: f32, y: f32, ch: char, color: Rgba);
}

/// Visible region in logical pixels
#[derive(Debug, Clone, Copy)]
struct Clip {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Clip {
    fn intersect(&self, x: f32, y: f32, width: f32, height: f32) -> Option<(f32, f32, f32, f32)> {
        let left = x.max(self.left);
        let top = y.max(self.top);
        let right = (x + width).min(self.right);
        let bottom = (y + height).min(self.bottom);
        (right > left && bottom > top).then_some((left, top, right - left, bottom - top))
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

struct Painter<'s, S: Surface + ?Sized> {
    surface: &'s mut S,
    scale: f32,
}

impl<S: Surface + ?Sized> Painter<'_, S> {
    fn fill(&mut self, clip: Clip, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        if color.is_transparent() {
            return;
        }
        if let Some((x, y, w, h)) = clip.intersect(x, y, width, height) {
            let s = self.scale;
            self.surface.fill_rect(x * s, y * s, w * s, h * s, color);
        }
    }

    /// Background then character of one glyph, shifted by `(dx, dy)`
    fn glyph(&mut self, clip: Clip, glyph: &GlyphRecord, dx: f32, dy: f32, background: Rgba) {
        if glyph.is_invisible() && background.is_transparent() {
            return;
        }
        let (x, y) = (glyph.x + dx, glyph.y + dy);
        self.fill(clip, x, y, glyph.width, glyph.height, background);
        if let Some(ch) = glyph.character {
            if !glyph.color.is_transparent() && clip.contains(x, y) {
                let s = self.scale;
                self.surface.draw_char(x * s, y * s, ch, glyph.color);
            }
        }
    }
}

/// Paints the active file of a playback context
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    /// Base style; tabs and the active tab are filled in per frame
    pub style: StyleContext,
    /// Caret width in logical pixels
    pub caret_width: f32,
}

impl FrameRenderer {
    pub fn new(style: StyleContext) -> Self {
        Self {
            style,
            caret_width: 2.0,
        }
    }

    /// Paint one frame and update the viewport scroll to follow the caret
    pub fn paint<M, S>(
        &self,
        ctx: &PlaybackContext,
        viewport: &mut ViewportState,
        metrics: &M,
        surface: &mut S,
        now_millis: u64,
    ) where
        M: FontMetrics + ?Sized,
        S: Surface + ?Sized,
    {
        let theme = self.style.theme;
        surface.clear(theme.background);

        let Some(file) = ctx.active_file() else {
            return;
        };

        let scale = if surface.scale() > 0.0 { surface.scale() } else { 1.0 };
        let (device_width, device_height) = surface.size();
        let (width, height) = (device_width / scale, device_height / scale);

        let style = StyleContext {
            tabs: ctx.files().iter().map(|f| f.display_name()).collect(),
            active_tab: ctx.active_index(),
            ..self.style.clone()
        };
        let laid = layout(&file.current, &style, metrics);

        viewport.cursor.clamp(laid.code.len());
        let cursor = viewport.cursor;
        let (caret_x, caret_y, caret_height) = laid.caret(cursor.end);
        viewport.follow(
            caret_x - laid.code_left,
            caret_y - laid.code_top,
            caret_height,
            width - laid.code_left,
            height - laid.code_top,
        );
        let scroll = viewport.scroll;

        let code_area = Clip {
            left: laid.code_left,
            top: laid.code_top,
            right: width,
            bottom: height,
        };
        let gutter_area = Clip {
            left: 0.0,
            right: laid.code_left,
            ..code_area
        };
        let screen = Clip {
            left: 0.0,
            top: 0.0,
            right: width,
            bottom: height,
        };

        let mut painter = Painter { surface, scale };

        for (idx, glyph) in laid.code.iter().enumerate() {
            let background = if (cursor.start..cursor.end).contains(&idx) {
                theme.highlight
            } else {
                glyph.background
            };
            painter.glyph(code_area, glyph, scroll.x, scroll.y, background);
        }

        for glyph in &laid.gutter {
            painter.glyph(gutter_area, glyph, 0.0, scroll.y, glyph.background);
        }

        for glyph in &laid.chrome {
            painter.glyph(screen, glyph, 0.0, 0.0, glyph.background);
        }

        if cursor.is_collapsed() {
            let color = theme.cursor.with_alpha(blink_intensity(now_millis));
            painter.fill(
                code_area,
                caret_x + scroll.x,
                caret_y + scroll.y,
                self.caret_width,
                caret_height,
                color,
            );
        }
    }
}
