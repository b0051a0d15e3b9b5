//! Mapping overlay colours onto what the terminal can show.

use ratatui::style::Color;

use crate::core::color::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Truecolor,
    X256,
    X16,
}

/// Environment variable that forces a colour depth.
pub const COLOR_OVERRIDE_VAR: &str = "VIEWER_DEBUG_COLOR";

/// Detect terminal color depth from environment.
/// Priority: override var -> COLORTERM truecolor/24bit -> TERM *256color -> 16.
pub fn detect_color_depth() -> ColorDepth {
    let var = |name: &str| std::env::var(name).ok();
    depth_from_env(
        var(COLOR_OVERRIDE_VAR).as_deref(),
        var("COLORTERM").as_deref(),
        var("TERM").as_deref(),
    )
}

fn depth_from_env(force: Option<&str>, colorterm: Option<&str>, term: Option<&str>) -> ColorDepth {
    if let Some(force) = force {
        match force.trim().to_ascii_lowercase().as_str() {
            "truecolor" | "24bit" | "24-bit" => return ColorDepth::Truecolor,
            "256" | "x256" | "256color" => return ColorDepth::X256,
            "16" | "ansi" | "x16" => return ColorDepth::X16,
            _ => {}
        }
    }
    if let Some(colorterm) = colorterm {
        let s = colorterm.to_ascii_lowercase();
        if s.contains("truecolor") || s.contains("24bit") || s.contains("24-bit") {
            return ColorDepth::Truecolor;
        }
    }
    if term.is_some_and(|t| t.to_ascii_lowercase().contains("256color")) {
        return ColorDepth::X256;
    }
    ColorDepth::X16
}

/// Terminal colour for `color` blended over `backdrop`, reduced to `depth`.
pub fn terminal_color(color: Rgba, backdrop: Rgba, depth: ColorDepth) -> Color {
    let (r, g, b) = color.over(backdrop).to_rgb8();
    quantize_rgb([r, g, b], depth)
}

pub fn quantize_rgb(rgb: [u8; 3], depth: ColorDepth) -> Color {
    match depth {
        ColorDepth::Truecolor => Color::Rgb(rgb[0], rgb[1], rgb[2]),
        ColorDepth::X256 => Color::Indexed(nearest_xterm256(rgb)),
        ColorDepth::X16 => nearest_ansi16(rgb),
    }
}

const ANSI16: [([u8; 3], Color); 16] = [
    ([0, 0, 0], Color::Black),
    ([205, 0, 0], Color::Red),
    ([0, 205, 0], Color::Green),
    ([205, 205, 0], Color::Yellow),
    ([0, 0, 205], Color::Blue),
    ([205, 0, 205], Color::Magenta),
    ([0, 205, 205], Color::Cyan),
    ([192, 192, 192], Color::Gray),
    ([128, 128, 128], Color::DarkGray),
    ([255, 0, 0], Color::LightRed),
    ([0, 255, 0], Color::LightGreen),
    ([255, 255, 0], Color::LightYellow),
    ([92, 92, 255], Color::LightBlue),
    ([255, 0, 255], Color::LightMagenta),
    ([0, 255, 255], Color::LightCyan),
    ([255, 255, 255], Color::White),
];

/// Channel values of the 6x6x6 xterm cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn distance_sq(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u32
        })
        .sum()
}

fn nearest_ansi16(rgb: [u8; 3]) -> Color {
    ANSI16
        .iter()
        .min_by_key(|(entry, _)| distance_sq(*entry, rgb))
        .map(|(_, color)| *color)
        .unwrap_or(Color::White)
}

fn nearest_level(channel: u8) -> u8 {
    let mut best = 0u8;
    for (i, level) in CUBE_LEVELS.iter().enumerate() {
        if channel.abs_diff(*level) < channel.abs_diff(CUBE_LEVELS[best as usize]) {
            best = i as u8;
        }
    }
    best
}

/// Nearest xterm-256 index, choosing between the colour cube and the grey ramp.
pub fn nearest_xterm256(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb.map(nearest_level);
    let cube = 16 + 36 * r + 6 * g + b;

    let avg = (u16::from(rgb[0]) + u16::from(rgb[1]) + u16::from(rgb[2])) / 3;
    let step = (avg.saturating_sub(3) / 10).min(23) as u8;
    let grey = 232 + step;

    if distance_sq(xterm256_to_rgb(grey), rgb) < distance_sq(xterm256_to_rgb(cube), rgb) {
        grey
    } else {
        cube
    }
}

pub fn xterm256_to_rgb(index: u8) -> [u8; 3] {
    match index {
        0..=15 => ANSI16[index as usize].0,
        16..=231 => {
            let n = index - 16;
            [
                CUBE_LEVELS[(n / 36) as usize],
                CUBE_LEVELS[((n / 6) % 6) as usize],
                CUBE_LEVELS[(n % 6) as usize],
            ]
        }
        232..=255 => {
            let v = 8 + 10 * (index - 232);
            [v, v, v]
        }
    }
}
