//! Glyph layout
//!
//! Turns a code string into absolutely positioned glyph records measured
//! against a [`FontMetrics`] oracle. Layout is a pure function of its
//! inputs; every frame recomputes it from the live buffer.
//!
//! Output is split three ways:
//! - `code`: exactly one glyph per buffer codepoint, in buffer order, so a
//!   cursor offset indexes straight into it
//! - `gutter`: line-number digits
//! - `chrome`: file tabs and the rules separating tabs and gutter from code

use serde::{Deserialize, Serialize};

/// Font measurements for the active face and size
pub trait FontMetrics {
    /// Advance width of `ch`, in pixels
    fn char_width(&self, ch: char) -> f32;
    /// Height of one line, in pixels
    fn line_height(&self) -> f32;
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha scaled by `factor` (0.0 to 1.0)
    pub fn with_alpha(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// Colors used by layout and painting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub text: Rgba,
    pub muted: Rgba,
    pub line_number: Rgba,
    pub background: Rgba,
    pub tab_active: Rgba,
    pub rule: Rgba,
    pub cursor: Rgba,
    pub highlight: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Rgba::rgb(0xd8, 0xde, 0xe9),
            muted: Rgba::rgb(0x6c, 0x76, 0x86),
            line_number: Rgba::rgb(0x4c, 0x56, 0x6a),
            background: Rgba::rgb(0x1e, 0x22, 0x2a),
            tab_active: Rgba::rgb(0x88, 0xc0, 0xd0),
            rule: Rgba::rgb(0x3b, 0x42, 0x52),
            cursor: Rgba::rgb(0xec, 0xef, 0xf4),
            highlight: Rgba::rgb(0xbf, 0x61, 0x6a),
        }
    }
}

/// Style inputs for a layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct StyleContext {
    pub theme: Theme,
    /// Draw file tabs, rules and line numbers
    pub chrome: bool,
    /// Labels of the file tabs, in file order
    pub tabs: Vec<String>,
    /// Index of the highlighted tab
    pub active_tab: usize,
    /// Horizontal padding around tab labels and the gutter rule
    pub padding: f32,
    /// Thickness of the rule lines
    pub rule: f32,
    /// Digits reserved for line numbers
    pub gutter_digits: usize,
    /// Width of `\t` in spaces
    pub tab_width: usize,
}

impl Default for StyleContext {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            chrome: true,
            tabs: Vec::new(),
            active_tab: 0,
            padding: 1.0,
            rule: 1.0,
            gutter_digits: 4,
            tab_width: 4,
        }
    }
}

/// One positioned drawable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRecord {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// `None` for background-only rectangles
    pub character: Option<char>,
    pub color: Rgba,
    pub background: Rgba,
    pub padding: f32,
}

impl GlyphRecord {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True if this glyph paints nothing
    pub fn is_invisible(&self) -> bool {
        self.color.is_transparent() && self.background.is_transparent()
    }
}

/// Result of a layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphLayout {
    pub code: Vec<GlyphRecord>,
    pub gutter: Vec<GlyphRecord>,
    pub chrome: Vec<GlyphRecord>,
    /// Left edge of the code area
    pub code_left: f32,
    /// Top edge of the code area
    pub code_top: f32,
    pub line_height: f32,
}

impl GlyphLayout {
    /// Maximum right and bottom edge over every glyph
    pub fn extent(&self) -> (f32, f32) {
        self.all().fold((0.0f32, 0.0f32), |(w, h), g| {
            (w.max(g.right()), h.max(g.bottom()))
        })
    }

    pub fn all(&self) -> impl Iterator<Item = &GlyphRecord> {
        self.chrome.iter().chain(&self.gutter).chain(&self.code)
    }

    /// Caret rectangle `(x, y, height)` for a buffer offset, in unscrolled space
    pub fn caret(&self, offset: usize) -> (f32, f32, f32) {
        if let Some(glyph) = self.code.get(offset) {
            return (glyph.x, glyph.y, glyph.height);
        }
        match self.code.last() {
            Some(last) if last.character == Some('\n') => {
                (self.code_left, last.y + self.line_height, self.line_height)
            }
            Some(last) => (last.right(), last.y, last.height),
            None => (self.code_left, self.code_top, self.line_height),
        }
    }
}

fn is_layout_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\n' || ch == '\r'
}

/// Alternating whitespace and token runs of a single left-to-right scan
struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Runs<'a> {
    /// `(is_whitespace, run)`
    type Item = (bool, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let whitespace = is_layout_whitespace(first);
        let split = self
            .rest
            .char_indices()
            .find(|&(_, ch)| is_layout_whitespace(ch) != whitespace)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(split);
        self.rest = rest;
        Some((whitespace, run))
    }
}

struct Pen<'m, M: FontMetrics + ?Sized> {
    metrics: &'m M,
    style: &'m StyleContext,
    x: f32,
    y: f32,
    left: f32,
    line: usize,
    line_height: f32,
    digit_width: f32,
}

impl<M: FontMetrics + ?Sized> Pen<'_, M> {
    fn advance(&self, ch: char) -> f32 {
        match ch {
            '\t' => self.metrics.char_width(' ') * self.style.tab_width as f32,
            '\n' => self.metrics.char_width(' '),
            _ => self.metrics.char_width(ch),
        }
    }

    fn glyph(&mut self, ch: char, color: Rgba) -> GlyphRecord {
        let width = self.advance(ch);
        let glyph = GlyphRecord {
            x: self.x,
            y: self.y,
            width,
            height: self.line_height,
            character: Some(ch),
            color,
            background: Rgba::TRANSPARENT,
            padding: 0.0,
        };
        self.x += width;
        glyph
    }

    fn newline(&mut self) {
        self.x = self.left;
        self.y += self.line_height;
        self.line += 1;
    }

    /// Right-aligned line number digits for the current line
    fn line_number(&self, out: &mut Vec<GlyphRecord>) {
        if !self.style.chrome {
            return;
        }
        let label = self.line.to_string();
        let digits = label.chars().count().max(self.style.gutter_digits);
        let mut x = (digits - label.chars().count()) as f32 * self.digit_width;
        for ch in label.chars() {
            out.push(GlyphRecord {
                x,
                y: self.y,
                width: self.digit_width,
                height: self.line_height,
                character: Some(ch),
                color: self.style.theme.line_number,
                background: Rgba::TRANSPARENT,
                padding: 0.0,
            });
            x += self.digit_width;
        }
    }
}

/// Lay out file tabs in a row at the top; returns the row height
fn layout_tabs<M: FontMetrics + ?Sized>(
    style: &StyleContext,
    metrics: &M,
    out: &mut Vec<GlyphRecord>,
) -> f32 {
    let height = metrics.line_height();
    let mut x = 0.0;
    for (idx, label) in style.tabs.iter().enumerate() {
        let active = idx == style.active_tab;
        let (color, background) = if active {
            (style.theme.background, style.theme.tab_active)
        } else {
            (style.theme.muted, Rgba::TRANSPARENT)
        };
        let label_width: f32 = label.chars().map(|ch| metrics.char_width(ch)).sum();
        out.push(GlyphRecord {
            x,
            y: 0.0,
            width: label_width + style.padding * 2.0,
            height,
            character: None,
            color,
            background,
            padding: style.padding,
        });
        let mut cx = x + style.padding;
        for ch in label.chars() {
            let width = metrics.char_width(ch);
            out.push(GlyphRecord {
                x: cx,
                y: 0.0,
                width,
                height,
                character: Some(ch),
                color,
                background,
                padding: 0.0,
            });
            cx += width;
        }
        x = cx + style.padding;
    }
    height
}

fn rule(x: f32, y: f32, width: f32, height: f32, color: Rgba) -> GlyphRecord {
    GlyphRecord {
        x,
        y,
        width,
        height,
        character: None,
        color: Rgba::TRANSPARENT,
        background: color,
        padding: 0.0,
    }
}

/// Lay out `text` with chrome as configured by `style`
pub fn layout<M: FontMetrics + ?Sized>(
    text: &str,
    style: &StyleContext,
    metrics: &M,
) -> GlyphLayout {
    let line_height = metrics.line_height();
    let digit_width = metrics.char_width('0');

    let mut chrome = Vec::new();
    let (code_left, code_top, gutter_rule_x) = if style.chrome {
        let tab_height = layout_tabs(style, metrics, &mut chrome);
        let numbers = style.gutter_digits as f32 * digit_width;
        let rule_x = numbers + style.padding;
        (rule_x + style.rule + style.padding, tab_height + style.rule, rule_x)
    } else {
        (0.0, 0.0, 0.0)
    };

    let mut pen = Pen {
        metrics,
        style,
        x: code_left,
        y: code_top,
        left: code_left,
        line: 1,
        line_height,
        digit_width,
    };

    let mut code = Vec::with_capacity(text.len());
    let mut gutter = Vec::new();
    pen.line_number(&mut gutter);

    for (whitespace, run) in (Runs { rest: text }) {
        if whitespace {
            for ch in run.chars() {
                let glyph = pen.glyph(ch, Rgba::TRANSPARENT);
                code.push(glyph);
                if ch == '\n' {
                    pen.newline();
                    pen.line_number(&mut gutter);
                }
            }
        } else {
            for ch in run.chars() {
                let glyph = pen.glyph(ch, style.theme.text);
                code.push(glyph);
            }
        }
    }

    let mut laid = GlyphLayout {
        code,
        gutter,
        chrome,
        code_left,
        code_top,
        line_height,
    };

    if style.chrome {
        let (width, height) = laid.extent();
        let bottom = height.max(code_top + line_height);
        laid.chrome.push(rule(0.0, code_top - style.rule, width.max(code_left), style.rule, style.theme.rule));
        laid.chrome.push(rule(gutter_rule_x, code_top, style.rule, bottom - code_top, style.theme.rule));
    }

    laid
}

/// Code glyphs only, without chrome
pub fn layout_code<M: FontMetrics + ?Sized>(text: &str, metrics: &M) -> Vec<GlyphRecord> {
    let style = StyleContext {
        chrome: false,
        ..StyleContext::default()
    };
    layout(text, &style, metrics).code
}
