// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Color utilities.
//!
//! Level colors are written from the fixed ANSI codes of [`colored::Color`] instead of going
//! through `colored`'s global tty detection. Source colors are always written as 24-bit
//! escapes, never downgraded by terminal capability probing, so a target configured with
//! colors renders the same bytes whatever the environment.

use colored::Color;
use serde::Deserialize;

use crate::Error;
use crate::Level;

const RESET: &str = "\x1b[0m";
const REVERSED: &str = "7";

/// Wrap `text` in the foreground escape for a fixed palette `color`.
pub(crate) fn paint(color: Color, text: &str) -> String {
    format!("\x1b[{}m{text}{RESET}", color.to_fg_str())
}

/// A user-supplied source color, validated by [`resolve`].
///
/// Deserializes from a string (`"#ff8800"`), an integer (`16746496`) or a triple (`[255, 136, 0]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SourceColor {
    /// Six hex digits with an optional leading `#`.
    Hex(String),
    /// A packed `0xRRGGBB` integer.
    Packed(i64),
    /// Red, green and blue components.
    Rgb(Vec<i64>),
}

impl From<&str> for SourceColor {
    fn from(s: &str) -> Self {
        SourceColor::Hex(s.to_string())
    }
}

impl From<String> for SourceColor {
    fn from(s: String) -> Self {
        SourceColor::Hex(s)
    }
}

impl From<u32> for SourceColor {
    fn from(n: u32) -> Self {
        SourceColor::Packed(n as i64)
    }
}

impl From<i64> for SourceColor {
    fn from(n: i64) -> Self {
        SourceColor::Packed(n)
    }
}

impl From<[u8; 3]> for SourceColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        SourceColor::Rgb(vec![r as i64, g as i64, b as i64])
    }
}

impl From<Vec<i64>> for SourceColor {
    fn from(rgb: Vec<i64>) -> Self {
        SourceColor::Rgb(rgb)
    }
}

/// A compiled styling function: `paint(text) -> styled text`.
///
/// Holds no mutable state and can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorFn {
    rgb: Option<(u8, u8, u8)>,
}

impl ColorFn {
    /// The identity style.
    pub const IDENTITY: ColorFn = ColorFn { rgb: None };

    /// Style `text`. The identity style returns it unchanged.
    pub fn paint(&self, text: &str) -> String {
        match self.rgb {
            Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}{RESET}"),
            None => text.to_string(),
        }
    }

    /// The resolved `(r, g, b)` triple, if any.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        self.rgb
    }
}

/// Validate and compile a source color. `None` yields [`ColorFn::IDENTITY`].
///
/// # Errors
///
/// Return an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error naming the received
/// value if the color is out of range or malformed.
pub fn resolve(color: Option<&SourceColor>) -> Result<ColorFn, Error> {
    let Some(color) = color else {
        return Ok(ColorFn::IDENTITY);
    };

    let hex = match color {
        SourceColor::Hex(s) => s.strip_prefix('#').unwrap_or(s).to_string(),
        SourceColor::Packed(n) => packed_to_hex(*n)?,
        SourceColor::Rgb(rgb) => packed_to_hex(pack_rgb(rgb)?)?,
    };

    let valid = hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit());
    if !valid {
        return Err(Error::invalid(format!(
            "invalid color: expected 6 hex digits, received {color:?}"
        )));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|err| Error::invalid(format!("invalid color: {color:?}")).with_source(err))
    };
    Ok(ColorFn {
        rgb: Some((channel(0)?, channel(2)?, channel(4)?)),
    })
}

fn pack_rgb(rgb: &[i64]) -> Result<i64, Error> {
    let [r, g, b] = rgb else {
        return Err(Error::invalid(format!(
            "invalid color: expected 3 components, received {rgb:?}"
        )));
    };
    for c in [r, g, b] {
        if !(0..=255).contains(c) {
            return Err(Error::invalid(format!(
                "invalid color: component out of range [0, 255], received {rgb:?}"
            )));
        }
    }
    Ok((r << 16) | (g << 8) | b)
}

fn packed_to_hex(n: i64) -> Result<String, Error> {
    if !(0..(1 << 24)).contains(&n) {
        return Err(Error::invalid(format!(
            "invalid color: expected an integer in [0, 16777216), received {n}"
        )));
    }
    Ok(format!("{n:06x}"))
}

/// Colors for different log levels.
#[derive(Debug, Clone)]
pub(crate) struct LevelColor {
    fatal: Color,
    error: Color,
    warn: Color,
    info: Color,
    debug: Color,
    trace: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            fatal: Color::BrightRed,
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Blue,
            trace: Color::Magenta,
        }
    }
}

impl LevelColor {
    /// Colorize `text` with the level's color. Fatal is also reversed.
    pub(crate) fn colorize(&self, no_color: bool, level: Level, text: &str) -> String {
        if no_color {
            return text.to_string();
        }

        let color = match level {
            Level::Fatal => self.fatal,
            Level::Error => self.error,
            Level::Warn => self.warn,
            Level::Info => self.info,
            Level::Debug => self.debug,
            Level::Trace => self.trace,
        };
        match level {
            Level::Fatal => format!("\x1b[{REVERSED};{}m{text}{RESET}", color.to_fg_str()),
            _ => paint(color, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalent_forms_resolve_identically() {
        let forms = [
            SourceColor::from("#ff8800"),
            SourceColor::from("FF8800"),
            SourceColor::from(0xff8800u32),
            SourceColor::from([255, 136, 0]),
        ];
        let resolved: Vec<_> = forms.iter().map(|c| resolve(Some(c)).unwrap()).collect();
        for c in &resolved {
            assert_eq!(c.rgb(), Some((255, 136, 0)));
            assert_eq!(c.paint("svc"), resolved[0].paint("svc"));
        }
        assert_eq!(resolved[0].paint("svc"), "\x1b[38;2;255;136;0msvc\x1b[0m");
    }

    #[test]
    fn test_near_colors_stay_distinct() {
        let orange = resolve(Some(&SourceColor::from("#ff8800"))).unwrap();
        let amber = resolve(Some(&SourceColor::from("#fa8200"))).unwrap();
        assert_eq!(amber.paint("svc"), "\x1b[38;2;250;130;0msvc\x1b[0m");
        assert_ne!(orange.paint("svc"), amber.paint("svc"));
    }

    #[test]
    fn test_absent_color_is_identity() {
        let c = resolve(None).unwrap();
        assert_eq!(c, ColorFn::IDENTITY);
        assert_eq!(c.paint("plain"), "plain");
    }

    #[test]
    fn test_invalid_colors_are_rejected() {
        let invalid = [
            SourceColor::Packed(1 << 24),
            SourceColor::Packed(-1),
            SourceColor::Rgb(vec![0, 256, 0]),
            SourceColor::Rgb(vec![0, 0]),
            SourceColor::Rgb(vec![0, 0, 0, 0]),
            SourceColor::from("#12345"),
            SourceColor::from("1234567"),
            SourceColor::from("gggggg"),
        ];
        for c in invalid {
            let err = resolve(Some(&c)).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument, "{c:?}");
        }
    }

    #[test]
    fn test_packed_integer_is_zero_padded() {
        let c = resolve(Some(&SourceColor::Packed(0x0000ff))).unwrap();
        assert_eq!(c.rgb(), Some((0, 0, 255)));
    }

    #[test]
    fn test_deserialize_every_form() {
        let forms: Vec<SourceColor> =
            serde_json::from_str(r##"["#00ff00", 65280, [0, 255, 0]]"##).unwrap();
        for c in &forms {
            assert_eq!(resolve(Some(c)).unwrap().rgb(), Some((0, 255, 0)));
        }
    }

    #[test]
    fn test_fatal_is_reversed() {
        let colors = LevelColor::default();
        assert_eq!(
            colors.colorize(false, Level::Fatal, "FATAL"),
            "\x1b[7;91mFATAL\x1b[0m"
        );
        assert_eq!(colors.colorize(false, Level::Info, "INFO"), "\x1b[32mINFO\x1b[0m");
        assert_eq!(colors.colorize(true, Level::Info, "INFO"), "INFO");
    }
}
