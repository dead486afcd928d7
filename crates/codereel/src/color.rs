//! Color parsing and terminal color conversion

use codereel_core::Rgba;
use ratatui::style::Color;

/// Parse hex color string (e.g., "#2ecc71" or "2ecc71")
pub fn parse_hex(s: &str) -> Result<Rgba, String> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return Err(format!(
            "invalid hex color: expected 6 characters, got {}",
            s.len()
        ));
    }

    let r = u8::from_str_radix(&s[0..2], 16)
        .map_err(|_| format!("invalid hex color: bad red component in '{}'", s))?;
    let g = u8::from_str_radix(&s[2..4], 16)
        .map_err(|_| format!("invalid hex color: bad green component in '{}'", s))?;
    let b = u8::from_str_radix(&s[4..6], 16)
        .map_err(|_| format!("invalid hex color: bad blue component in '{}'", s))?;

    Ok(Rgba::rgb(r, g, b))
}

/// Composite `fg` over an opaque `bg`
pub fn blend(fg: Rgba, bg: Rgba) -> Rgba {
    let t = fg.a as f32 / 255.0;
    let mix = |a: u8, b: u8| (a as f32 * t + b as f32 * (1.0 - t)).round() as u8;
    Rgba::rgb(mix(fg.r, bg.r), mix(fg.g, bg.g), mix(fg.b, bg.b))
}

pub fn to_color(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

pub fn from_color(c: Color, fallback: Rgba) -> Rgba {
    match c {
        Color::Rgb(r, g, b) => Rgba::rgb(r, g, b),
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#2ecc71"), Ok(Rgba::rgb(0x2e, 0xcc, 0x71)));
        assert_eq!(parse_hex(" BF616A "), Ok(Rgba::rgb(0xbf, 0x61, 0x6a)));
        assert!(parse_hex("#abc").is_err());
        assert!(parse_hex("#zz0000").is_err());
        assert!(parse_hex("#ééé").is_err());
    }

    #[test]
    fn test_blend() {
        let white = Rgba::rgb(255, 255, 255);
        let black = Rgba::rgb(0, 0, 0);
        assert_eq!(blend(white, black), white);
        assert_eq!(blend(white.with_alpha(0.0), black), black);
        assert_eq!(blend(white.with_alpha(0.5), black), Rgba::rgb(128, 128, 128));
    }
}
