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

//! Target descriptors and their normalized, immutable form.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::Error;
use crate::Level;
use crate::append::Callback;
use crate::append::FileSink;
use crate::append::PostOptions;
use crate::append::Poster;
use crate::append::Sink;
use crate::append::endpoint;
use crate::append::normalize_path;
use crate::append::stdout_callback;
use crate::layout::Style;
use crate::trap::FatalTrap;
use crate::trap::Trap;

/// What happens when delivery to a target fails.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ErrorPolicy {
    /// Return the failure to the caller of the log call.
    Throw,
    /// Report the failure as an ERROR event to the other targets.
    #[default]
    Log,
    /// Swallow the failure.
    Ignore,
}

impl ErrorPolicy {
    /// Return the string representation of the `ErrorPolicy`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Throw => "THROW",
            ErrorPolicy::Log => "LOG",
            ErrorPolicy::Ignore => "IGNORE",
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = Error;
    fn from_str(s: &str) -> Result<ErrorPolicy, Self::Err> {
        for policy in [ErrorPolicy::Throw, ErrorPolicy::Log, ErrorPolicy::Ignore] {
            if s.eq_ignore_ascii_case(policy.as_str()) {
                return Ok(policy);
            }
        }

        Err(Error::invalid(format!(
            "malformed error policy: {s:?}, expected one of THROW, LOG, IGNORE"
        )))
    }
}

/// Options shared by every target kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TargetOptions {
    /// The least severe level the target accepts.
    pub level: Level,
    /// How records are rendered.
    pub style: Style,
    /// Pad level and display names to common widths.
    pub uniform_length: bool,
    /// Emit ANSI colors.
    pub color: bool,
    /// Full ISO-8601 timestamps.
    pub full_timestamps: bool,
    /// What happens when delivery fails.
    pub error_policy: ErrorPolicy,
}

impl Default for TargetOptions {
    fn default() -> Self {
        TargetOptions {
            level: Level::Trace,
            style: Style::Text,
            uniform_length: false,
            color: false,
            full_timestamps: false,
            error_policy: ErrorPolicy::Log,
        }
    }
}

enum DescriptorKind {
    File {
        path: String,
        fail_if_exists: bool,
        error_listener: Option<Arc<dyn Trap>>,
    },
    Stream(Arc<dyn Sink>),
    Stdout,
    Function(Arc<dyn Callback>),
    Post {
        url: String,
        https: bool,
        options: PostOptions,
    },
}

impl DescriptorKind {
    fn name(&self) -> &'static str {
        match self {
            DescriptorKind::File { .. } => "FILE",
            DescriptorKind::Stream(_) => "STREAM",
            DescriptorKind::Stdout => "STDOUT",
            DescriptorKind::Function(_) => "FUNCTION",
            DescriptorKind::Post { .. } => "POST",
        }
    }
}

/// A user-supplied description of one target.
///
/// Kind-specific setters are ignored by other kinds.
///
/// # Examples
///
/// ```
/// use logfan::Descriptor;
/// use logfan::ErrorPolicy;
/// use logfan::Level;
/// use logfan::layout::Style;
///
/// let descriptor = Descriptor::file("~/logs/app.log")
///     .log_level(Level::Info)
///     .style(Style::Json)
///     .error_policy(ErrorPolicy::Ignore);
/// ```
#[must_use = "descriptors do nothing until passed to a factory"]
pub struct Descriptor {
    kind: DescriptorKind,
    options: TargetOptions,
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("kind", &self.kind.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Descriptor {
    fn new(kind: DescriptorKind) -> Self {
        Descriptor {
            kind,
            options: TargetOptions::default(),
        }
    }

    /// A file opened in append mode and owned by the factory.
    ///
    /// A leading `~/` expands to the home directory and backslashes become slashes.
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(DescriptorKind::File {
            path: path.into(),
            fail_if_exists: false,
            error_listener: None,
        })
    }

    /// A caller-supplied sink. The factory never closes it.
    pub fn stream(sink: Arc<dyn Sink>) -> Self {
        Self::new(DescriptorKind::Stream(sink))
    }

    /// Standard output, one record per line.
    pub fn stdout() -> Self {
        Self::new(DescriptorKind::Stdout)
    }

    /// A callback invoked with every rendered record.
    pub fn function(callback: impl Callback) -> Self {
        Self::new(DescriptorKind::Function(Arc::new(callback)))
    }

    /// An HTTP endpoint that receives every rendered record as a POST body.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(DescriptorKind::Post {
            url: url.into(),
            https: true,
            options: PostOptions::default(),
        })
    }

    /// The least severe level the target accepts.
    ///
    /// Default to [`Level::Trace`].
    pub fn log_level(mut self, level: Level) -> Self {
        self.options.level = level;
        self
    }

    /// Default to [`Style::Text`].
    pub fn style(mut self, style: Style) -> Self {
        self.options.style = style;
        self
    }

    /// Pad level and display names so message columns align.
    pub fn uniform_length(mut self, uniform_length: bool) -> Self {
        self.options.uniform_length = uniform_length;
        self
    }

    /// Emit ANSI colors.
    pub fn color(mut self, color: bool) -> Self {
        self.options.color = color;
        self
    }

    /// Use full ISO-8601 timestamps instead of `HH:MM:SS.mmm`.
    pub fn full_timestamps(mut self, full_timestamps: bool) -> Self {
        self.options.full_timestamps = full_timestamps;
        self
    }

    /// Default to [`ErrorPolicy::Log`].
    pub fn error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.options.error_policy = error_policy;
        self
    }

    /// FILE only: fail to open if the path already exists.
    pub fn fail_if_exists(mut self, fail: bool) -> Self {
        if let DescriptorKind::File { fail_if_exists, .. } = &mut self.kind {
            *fail_if_exists = fail;
        }
        self
    }

    /// FILE only: receive the open failure instead of panicking.
    ///
    /// A target whose file failed to open is skipped.
    pub fn error_listener(mut self, trap: impl Trap) -> Self {
        if let DescriptorKind::File { error_listener, .. } = &mut self.kind {
            *error_listener = Some(Arc::new(trap));
        }
        self
    }

    /// POST only: use HTTPS. Default to `true`.
    pub fn https(mut self, enabled: bool) -> Self {
        if let DescriptorKind::Post { https, .. } = &mut self.kind {
            *https = enabled;
        }
        self
    }

    /// POST only: request headers and timeout.
    pub fn options(mut self, post_options: PostOptions) -> Self {
        if let DescriptorKind::Post { options, .. } = &mut self.kind {
            *options = post_options;
        }
        self
    }
}

impl IntoIterator for Descriptor {
    type Item = Descriptor;
    type IntoIter = std::iter::Once<Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self)
    }
}

pub(crate) enum TargetKind {
    Sink { sink: Arc<dyn Sink>, owned: bool },
    Callback(Arc<dyn Callback>),
    HttpPost(Poster),
}

/// A validated target. Immutable once created.
pub struct Target {
    kind: TargetKind,
    options: TargetOptions,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            TargetKind::Sink { sink, owned } => format!("Sink({sink:?}, owned: {owned})"),
            TargetKind::Callback(_) => "Callback".to_string(),
            TargetKind::HttpPost(poster) => format!("HttpPost({})", poster.url()),
        };
        f.debug_struct("Target")
            .field("kind", &kind)
            .field("options", &self.options)
            .finish()
    }
}

impl Target {
    /// The target's shared options.
    pub fn options(&self) -> &TargetOptions {
        &self.options
    }

    /// Whether the factory owns, and eventually closes, the target's sink.
    pub fn is_owned(&self) -> bool {
        matches!(self.kind, TargetKind::Sink { owned: true, .. })
    }

    /// Deliver one rendered record, returning once it is acknowledged.
    pub(crate) fn deliver(&self, payload: &str) -> Result<(), Error> {
        match &self.kind {
            TargetKind::Sink { sink, .. } => {
                let mut line = String::with_capacity(payload.len() + 1);
                line.push_str(payload);
                line.push('\n');
                sink.write(line.as_bytes())
            }
            TargetKind::Callback(callback) => callback.call(payload),
            TargetKind::HttpPost(poster) => {
                let content_type = match self.options.style {
                    Style::Json => "application/json",
                    Style::Text => "text/plain; charset=utf-8",
                };
                poster.post(payload.as_bytes(), content_type)
            }
        }
    }

    /// Release the sink if the factory owns it.
    pub(crate) fn close(&self) -> Result<(), Error> {
        match &self.kind {
            TargetKind::Sink { sink, owned: true } => sink.close(),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
impl Target {
    pub(crate) fn owned_sink(sink: Arc<dyn Sink>) -> Target {
        Target {
            kind: TargetKind::Sink { sink, owned: true },
            options: TargetOptions::default(),
        }
    }
}

/// Validate a descriptor into a target.
///
/// Return `Ok(None)` when a file failed to open and the failure went to the descriptor's
/// error listener. Without a listener, the failure is fatal.
pub fn normalize(descriptor: Descriptor) -> Result<Option<Target>, Error> {
    let Descriptor { kind, options } = descriptor;
    let kind = match kind {
        DescriptorKind::File {
            path,
            fail_if_exists,
            error_listener,
        } => {
            let path = normalize_path(&path);
            match FileSink::open(&path, fail_if_exists) {
                Ok(sink) => TargetKind::Sink {
                    sink: Arc::new(sink),
                    owned: true,
                },
                Err(err) => {
                    return match error_listener {
                        Some(listener) => {
                            listener.trap(&err);
                            Ok(None)
                        }
                        None => {
                            FatalTrap::default().trap(&err);
                            Err(err)
                        }
                    };
                }
            }
        }
        DescriptorKind::Stream(sink) => TargetKind::Sink { sink, owned: false },
        DescriptorKind::Stdout => TargetKind::Callback(stdout_callback()),
        DescriptorKind::Function(callback) => TargetKind::Callback(callback),
        DescriptorKind::Post {
            url,
            https,
            options,
        } => TargetKind::HttpPost(Poster::new(endpoint(&url, https)?, options)),
    };
    Ok(Some(Target { kind, options }))
}
