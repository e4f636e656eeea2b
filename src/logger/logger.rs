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

use std::fmt;
use std::sync::Weak;

use crate::Error;
use crate::Level;
use crate::color::ColorFn;
use crate::logger::dispatch::Dispatch;
use crate::logger::factory::FactoryInner;
use crate::record::Event;
use crate::record::display_name;
use crate::value::Value;

/// A per-component logger created by a [`Factory`](crate::Factory).
///
/// Every level method returns once all eligible targets have settled, with the failure of
/// the first `Throw` target if any.
#[derive(Clone)]
pub struct Logger {
    component: String,
    source: Option<String>,
    color: ColorFn,
    factory: Weak<FactoryInner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &display_name(&self.component, self.source.as_deref()))
            .field("color", &self.color)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl Logger {
    pub(crate) fn new(
        component: String,
        source: Option<String>,
        color: ColorFn,
        factory: Weak<FactoryInner>,
    ) -> Self {
        Logger {
            component,
            source,
            color,
            factory,
        }
    }

    /// The component name.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// The sub-source name, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether the owning factory is destroyed or gone.
    pub fn is_destroyed(&self) -> bool {
        self.factory
            .upgrade()
            .is_none_or(|factory| factory.is_destroyed())
    }

    /// Log `messages` at `level`.
    pub fn log(&self, level: Level, messages: &[Value]) -> Result<(), Error> {
        let factory = self.factory.upgrade().ok_or_else(Error::destroyed)?;
        let targets = factory.targets()?;

        let event = Event::new(
            level,
            factory.now(),
            &self.component,
            self.source.as_deref(),
            messages,
        );
        Dispatch::new(&factory, &targets, self.color).run(&event)
    }

    /// Log at [`Level::Fatal`].
    pub fn fatal(&self, messages: &[Value]) -> Result<(), Error> {
        self.log(Level::Fatal, messages)
    }

    /// Log at [`Level::Error`].
    pub fn error(&self, messages: &[Value]) -> Result<(), Error> {
        self.log(Level::Error, messages)
    }

    /// Log at [`Level::Warn`].
    pub fn warn(&self, messages: &[Value]) -> Result<(), Error> {
        self.log(Level::Warn, messages)
    }

    /// Log at [`Level::Info`].
    pub fn info(&self, messages: &[Value]) -> Result<(), Error> {
        self.log(Level::Info, messages)
    }

    /// Log at [`Level::Debug`].
    pub fn debug(&self, messages: &[Value]) -> Result<(), Error> {
        self.log(Level::Debug, messages)
    }

    /// Log at [`Level::Trace`].
    pub fn trace(&self, messages: &[Value]) -> Result<(), Error> {
        self.log(Level::Trace, messages)
    }
}
