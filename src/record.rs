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

//! Log levels and the per-call log event.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;

use crate::Error;
use crate::value::Value;

/// An enum representing the available severity levels.
///
/// Levels are ordered by severity: [`Level::Fatal`] is the smallest and the most severe,
/// [`Level::Trace`] is the largest and the least severe.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Designates errors the process cannot recover from.
    Fatal = 1,
    /// Designates very serious errors.
    Error = 2,
    /// Designates hazardous situations.
    Warn = 3,
    /// Designates useful information.
    Info = 4,
    /// Designates lower priority information.
    Debug = 5,
    /// Designates very low priority, often extremely verbose, information.
    Trace = 6,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 6] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    /// The width of the longest level name.
    pub const MAX_NAME_LEN: usize = 5;

    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    /// The numeric rank; smaller is more severe.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Look up a level by its numeric rank.
    pub fn from_rank(rank: u8) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.rank() == rank)
    }

    /// Whether an event at this level passes an inclusive minimum threshold.
    ///
    /// ```
    /// use logfan::Level;
    ///
    /// assert!(Level::Error.passes(Level::Warn));
    /// assert!(Level::Warn.passes(Level::Warn));
    /// assert!(!Level::Info.passes(Level::Warn));
    /// ```
    pub fn passes(&self, threshold: Level) -> bool {
        *self <= threshold
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for level in Level::ALL {
            if s.eq_ignore_ascii_case(level.as_str()) {
                return Ok(level);
            }
        }

        Err(Error::invalid(format!("malformed level: {s:?}")))
    }
}

/// A single log call: one level, one captured timestamp, one ordered list of messages.
#[derive(Clone, Debug)]
pub struct Event<'a> {
    level: Level,
    time: Timestamp,
    component: &'a str,
    source: Option<&'a str>,
    messages: &'a [Value],
}

impl<'a> Event<'a> {
    pub(crate) fn new(
        level: Level,
        time: Timestamp,
        component: &'a str,
        source: Option<&'a str>,
        messages: &'a [Value],
    ) -> Self {
        Self {
            level,
            time,
            component,
            source,
            messages,
        }
    }

    /// The severity of the event.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The time captured when the log call was made.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The logger's component name.
    pub fn component(&self) -> &'a str {
        self.component
    }

    /// The logger's sub-source name, if any.
    pub fn source(&self) -> Option<&'a str> {
        self.source
    }

    /// The message values in call order.
    pub fn messages(&self) -> &'a [Value] {
        self.messages
    }

    /// `component` or `component/source`.
    pub fn display_name(&self) -> String {
        display_name(self.component, self.source)
    }
}

pub(crate) fn display_name(component: &str, source: Option<&str>) -> String {
    match source {
        Some(source) => format!("{component}/{source}"),
        None => component.to_string(),
    }
}

pub(crate) fn display_name_len(component: &str, source: Option<&str>) -> usize {
    let len = component.chars().count();
    match source {
        Some(source) => len + 1 + source.chars().count(),
        None => len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_round_trips_every_level() {
        for (i, level) in Level::ALL.into_iter().enumerate() {
            assert_eq!(level.rank() as usize, i + 1);
            assert_eq!(Level::from_rank(level.rank()), Some(level));
        }
        assert_eq!(Level::from_rank(0), None);
        assert_eq!(Level::from_rank(7), None);
    }

    #[test]
    fn test_parse_level_ignores_case() {
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("FATAL".parse::<Level>().unwrap(), Level::Fatal);
        let err = "loud".parse::<Level>().unwrap_err();
        assert!(err.to_string().contains("\"loud\""));
    }

    #[test]
    fn test_level_pads_with_format_width() {
        assert_eq!(format!("{:<5}|", Level::Info), "INFO |");
        assert_eq!(format!("{:<5}|", Level::Error), "ERROR|");
    }

    #[test]
    fn test_display_name_len_counts_separator() {
        assert_eq!(display_name_len("svc", None), 3);
        assert_eq!(display_name_len("svc", Some("db")), 6);
        assert_eq!(display_name("svc", Some("db")), "svc/db");
    }
}
