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

//! Layouts for formatting log events.
//!
//! A layout is a pure function of the event, the logger's [`ColorFn`] and the target's
//! [`LayoutOptions`]. It never reads the clock; the event carries the captured time.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::color::ColorFn;
use crate::record::Event;

mod inspect;
mod json;
mod text;

pub use self::inspect::inspect;
pub use self::json::JsonLayout;
pub use self::text::TextLayout;

/// A layout for formatting log events.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Render one event into a single payload, without a trailing newline.
    fn format(
        &self,
        event: &Event,
        color: &ColorFn,
        options: &LayoutOptions,
    ) -> Result<String, Error>;
}

/// The render style of a target.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Style {
    /// One JSON object per record.
    Json,
    /// One human-readable line per record.
    #[default]
    Text,
}

impl Style {
    /// Return the string representation of the `Style`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Json => "JSON",
            Style::Text => "TEXT",
        }
    }

    pub(crate) fn layout(&self) -> &'static dyn Layout {
        match self {
            Style::Json => &JsonLayout,
            Style::Text => &TextLayout,
        }
    }
}

impl FromStr for Style {
    type Err = Error;
    fn from_str(s: &str) -> Result<Style, Self::Err> {
        for style in [Style::Json, Style::Text] {
            if s.eq_ignore_ascii_case(style.as_str()) {
                return Ok(style);
            }
        }

        Err(Error::invalid(format!(
            "malformed style: {s:?}, expected one of JSON, TEXT"
        )))
    }
}

/// Per-target display options, plus the factory's running maximum name length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct LayoutOptions {
    /// Pad level names and display names to common widths.
    pub uniform_length: bool,
    /// Emit ANSI colors.
    pub color: bool,
    /// Full ISO-8601 timestamps instead of `HH:MM:SS.mmm`.
    pub full_timestamps: bool,
    /// The longest display name among all loggers of the factory.
    pub max_name_len: usize,
}

/// `2024-08-11T22:44:57.172Z`
pub(crate) fn iso8601(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC)
        .strftime("%Y-%m-%dT%H:%M:%S.%3fZ")
        .to_string()
}

/// `22:44:57.172`
pub(crate) fn clock_time(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC)
        .strftime("%H:%M:%S.%3f")
        .to_string()
}
