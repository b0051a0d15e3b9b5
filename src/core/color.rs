//! Floating point RGBA colours used by the console and the overlay widgets.
//!
//! Colours travel by value everywhere: paragraphs, segments and draw calls all
//! copy them. Conversion to terminal colours lives in [`crate::utils::color`].

use std::fmt;
use std::str::FromStr;

/// An RGBA colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);
    pub const CYAN: Rgba = Rgba::new(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Rgba = Rgba::new(1.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Rgba = Rgba::new(1.0, 1.0, 0.0, 1.0);
    pub const ORANGE: Rgba = Rgba::new(1.0, 0.5, 0.0, 1.0);
    pub const PURPLE: Rgba = Rgba::new(0.6, 0.2, 0.8, 1.0);
    pub const PINK: Rgba = Rgba::new(1.0, 0.5, 0.8, 1.0);
    pub const GREY: Rgba = Rgba::new(0.5, 0.5, 0.5, 1.0);
    pub const DARK_GREEN: Rgba = Rgba::new(0.0, 0.5, 0.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// Same colour with the alpha channel replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Same colour with the alpha channel multiplied by `factor`.
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor.clamp(0.0, 1.0))
    }

    /// Channels as 8-bit values, ignoring alpha.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        fn channel(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        (channel(self.r), channel(self.g), channel(self.b))
    }

    /// Alpha-composite `self` over `below`, returning an opaque colour.
    pub fn over(self, below: Rgba) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        Rgba::new(
            self.r * a + below.r * (1.0 - a),
            self.g * a + below.g * (1.0 - a),
            self.b * a + below.b * (1.0 - a),
            1.0,
        )
    }

    /// Parse a colour description.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)`, `rgba(r,g,b,a)`
    /// (alpha in `[0, 1]`) and a handful of names.
    pub fn parse(input: &str) -> Option<Rgba> {
        let lower = input.trim().to_ascii_lowercase();
        if let Some(c) = parse_hex_color(&lower) {
            return Some(c);
        }
        if let Some(c) = parse_rgb_func(&lower) {
            return Some(c);
        }
        match lower.as_str() {
            "black" => Some(Rgba::BLACK),
            "white" => Some(Rgba::WHITE),
            "gray" | "grey" => Some(Rgba::GREY),
            "red" => Some(Rgba::RED),
            "green" => Some(Rgba::GREEN),
            "dark_green" | "dark-green" => Some(Rgba::DARK_GREEN),
            "blue" => Some(Rgba::BLUE),
            "cyan" => Some(Rgba::CYAN),
            "magenta" => Some(Rgba::MAGENTA),
            "yellow" => Some(Rgba::YELLOW),
            "orange" => Some(Rgba::ORANGE),
            "purple" => Some(Rgba::PURPLE),
            "pink" => Some(Rgba::PINK),
            "transparent" => Some(Rgba::TRANSPARENT),
            _ => None,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Error returned by [`Rgba::from_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid colour: {}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::parse(s).ok_or_else(|| ParseColorError(s.to_string()))
    }
}

fn parse_hex_color(s: &str) -> Option<Rgba> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Rgba::from_rgb8(r, g, b))
        }
        6 => Some(Rgba::from_rgb8(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
        8 => {
            let a = byte(6..8)?;
            Some(Rgba::from_rgb8(byte(0..2)?, byte(2..4)?, byte(4..6)?).with_alpha(f32::from(a) / 255.0))
        }
        _ => None,
    }
}

fn parse_rgb_func(s: &str) -> Option<Rgba> {
    let (content, with_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = s.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<_> = content
        .split([',', ' '])
        .filter(|t| !t.is_empty())
        .collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let r = parts[0].parse::<u16>().ok()?;
    let g = parts[1].parse::<u16>().ok()?;
    let b = parts[2].parse::<u16>().ok()?;
    let color = Rgba::from_rgb8(r.min(255) as u8, g.min(255) as u8, b.min(255) as u8);
    if with_alpha {
        let a = parts[3].parse::<f32>().ok()?;
        Some(color.with_alpha(a))
    } else {
        Some(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Rgba::parse("#fff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::parse("#FF0000"), Some(Rgba::RED));
        let translucent = Rgba::parse("#00000080").expect("hex with alpha");
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(Rgba::parse("#12345"), None);
    }

    #[test]
    fn parses_functional_forms_and_names() {
        assert_eq!(Rgba::parse("rgb(0, 255, 0)"), Some(Rgba::GREEN));
        assert_eq!(Rgba::parse("rgb(300,0,0)"), Some(Rgba::RED));
        let c = Rgba::parse("rgba(0,0,0,0.5)").expect("rgba");
        assert_eq!(c.a, 0.5);
        assert_eq!(Rgba::parse(" Cyan "), Some(Rgba::CYAN));
        assert_eq!(Rgba::parse("chartreuse-ish"), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        let c = Rgba::from_rgb8(10, 20, 30).with_alpha(0.5);
        let reparsed: Rgba = c.to_string().parse().expect("parse display output");
        assert_eq!(reparsed.to_rgb8(), (10, 20, 30));
        assert!((reparsed.a - 0.5).abs() < 0.01);
    }

    #[test]
    fn fade_scales_alpha_only() {
        let c = Rgba::RED.with_alpha(0.8).fade(0.5);
        assert_eq!(c.to_rgb8(), (255, 0, 0));
        assert!((c.a - 0.4).abs() < 1e-6);
    }

    #[test]
    fn over_blends_against_background() {
        let half_white = Rgba::WHITE.with_alpha(0.5);
        let blended = half_white.over(Rgba::BLACK);
        assert_eq!(blended.to_rgb8(), (128, 128, 128));
        assert_eq!(blended.a, 1.0);
    }
}
