//! Terminal cells as a paint surface
//!
//! One logical pixel is one cell: glyph widths come from the Unicode width
//! of each character and every line is one row tall.

use crate::color::{blend, from_color, to_color};
use codereel_core::{FontMetrics, Rgba, Surface};
use ratatui::{buffer::Buffer, layout::Rect};
use unicode_width::UnicodeWidthChar;

/// Monospace metrics measured in terminal cells
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMetrics;

impl FontMetrics for CellMetrics {
    fn char_width(&self, ch: char) -> f32 {
        ch.width().unwrap_or(1).max(1) as f32
    }

    fn line_height(&self) -> f32 {
        1.0
    }
}

/// [`Surface`] over a rectangle of a ratatui buffer
pub struct TerminalSurface<'b> {
    buf: &'b mut Buffer,
    area: Rect,
    background: Rgba,
}

impl<'b> TerminalSurface<'b> {
    pub fn new(buf: &'b mut Buffer, area: Rect) -> Self {
        let area = area.intersection(buf.area);
        Self {
            buf,
            area,
            background: Rgba::TRANSPARENT,
        }
    }

    /// Buffer position of the cell covering logical `(x, y)`
    fn cell_at(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x.floor() as u32, y.floor() as u32);
        if x >= self.area.width as u32 || y >= self.area.height as u32 {
            return None;
        }
        Some((self.area.x + x as u16, self.area.y + y as u16))
    }
}

impl Surface for TerminalSurface<'_> {
    fn size(&self) -> (f32, f32) {
        (self.area.width as f32, self.area.height as f32)
    }

    fn clear(&mut self, color: Rgba) {
        self.background = color;
        for y in self.area.top()..self.area.bottom() {
            for x in self.area.left()..self.area.right() {
                if let Some(cell) = self.buf.cell_mut((x, y)) {
                    cell.reset();
                    cell.set_bg(to_color(color));
                }
            }
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        if color.is_transparent() || width <= 0.0 || height <= 0.0 {
            return;
        }
        let left = x.max(0.0).floor() as u32;
        let top = y.max(0.0).floor() as u32;
        let right = ((x + width).ceil().max(0.0) as u32).min(self.area.width as u32);
        let bottom = ((y + height).ceil().max(0.0) as u32).min(self.area.height as u32);
        for row in top..bottom {
            for col in left..right {
                let pos = (self.area.x + col as u16, self.area.y + row as u16);
                let background = self.background;
                if let Some(cell) = self.buf.cell_mut(pos) {
                    let under = from_color(cell.bg, background);
                    cell.set_bg(to_color(blend(color, under)));
                }
            }
        }
    }

    fn draw_char(&mut self, x: f32, y: f32, ch: char, color: Rgba) {
        if ch.is_control() {
            return;
        }
        let Some(pos) = self.cell_at(x, y) else {
            return;
        };
        if let Some(cell) = self.buf.cell_mut(pos) {
            cell.set_char(ch).set_fg(to_color(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_cell_metrics_use_unicode_width() {
        assert_eq!(CellMetrics.char_width('a'), 1.0);
        assert_eq!(CellMetrics.char_width('世'), 2.0);
        assert_eq!(CellMetrics.char_width('\u{0301}'), 1.0);
        assert_eq!(CellMetrics.line_height(), 1.0);
    }

    #[test]
    fn test_surface_paints_inside_its_area() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 3));
        let area = Rect::new(1, 1, 4, 2);
        let mut surface = TerminalSurface::new(&mut buf, area);
        assert_eq!(surface.size(), (4.0, 2.0));

        surface.clear(Rgba::rgb(0, 0, 0));
        surface.draw_char(0.0, 0.0, 'x', Rgba::rgb(255, 255, 255));
        surface.draw_char(4.0, 0.0, 'y', Rgba::rgb(255, 255, 255));
        surface.draw_char(1.0, 1.0, '\t', Rgba::rgb(255, 255, 255));
        surface.fill_rect(2.0, 1.0, 5.0, 1.0, Rgba::rgb(200, 0, 0));

        assert_eq!(buf[(1, 1)].symbol(), "x");
        assert_eq!(buf[(1, 1)].fg, Color::Rgb(255, 255, 255));
        assert_eq!(buf[(0, 0)].bg, Color::Reset);
        assert_eq!(buf[(2, 2)].symbol(), " ");
        assert_eq!(buf[(3, 2)].bg, Color::Rgb(200, 0, 0));
        assert_eq!(buf[(4, 2)].bg, Color::Rgb(200, 0, 0));
        assert_eq!(buf[(5, 2)].bg, Color::Reset);
        assert!((0..6).all(|x| buf[(x, 0)].symbol() == " "));
    }

    #[test]
    fn test_translucent_fill_blends_with_background() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 1));
        let mut surface = TerminalSurface::new(&mut buf, Rect::new(0, 0, 2, 1));
        surface.clear(Rgba::rgb(0, 0, 0));
        surface.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::rgb(255, 255, 255).with_alpha(0.5));
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(128, 128, 128));
        assert_eq!(buf[(1, 0)].bg, Color::Rgb(0, 0, 0));
    }
}
