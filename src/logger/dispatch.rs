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

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::thread;

use crate::Error;
use crate::ErrorPolicy;
use crate::Level;
use crate::color::ColorFn;
use crate::layout::LayoutOptions;
use crate::logger::factory::FactoryInner;
use crate::record::Event;
use crate::target::Target;
use crate::value::Value;

/// Executes one event against a snapshot of the factory's targets.
pub(crate) struct Dispatch<'a> {
    factory: &'a FactoryInner,
    targets: &'a [Target],
    color: ColorFn,
    // forced policy, set for recovery events
    overlay: Option<ErrorPolicy>,
}

impl<'a> Dispatch<'a> {
    pub(crate) fn new(factory: &'a FactoryInner, targets: &'a [Target], color: ColorFn) -> Self {
        Dispatch {
            factory,
            targets,
            color,
            overlay: None,
        }
    }

    fn policy(&self, target: &Target) -> ErrorPolicy {
        self.overlay.unwrap_or(target.options().error_policy)
    }

    /// Deliver `event` to every eligible target and wait until all of them settled.
    ///
    /// Return the failure of the first `Throw` target, in target order, if any.
    pub(crate) fn run(&self, event: &Event) -> Result<(), Error> {
        let eligible = self
            .targets
            .iter()
            .enumerate()
            .filter(|(_, target)| event.level().passes(target.options().level))
            .collect::<Vec<_>>();

        let outcomes = match eligible.as_slice() {
            [] => return Ok(()),
            [(index, target)] => vec![self.settle(*index, target, event)],
            _ => thread::scope(|scope| {
                let handles = eligible
                    .iter()
                    .map(|&(index, target)| scope.spawn(move || self.settle(index, target, event)))
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or_else(|panic| Err(panicked(panic))))
                    .collect::<Vec<_>>()
            }),
        };

        outcomes.into_iter().collect()
    }

    fn settle(&self, index: usize, target: &Target, event: &Event) -> Result<(), Error> {
        let delivered =
            std::panic::catch_unwind(AssertUnwindSafe(|| self.deliver(target, event)))
                .unwrap_or_else(|panic| Err(panicked(panic)));

        let Err(err) = delivered else {
            return Ok(());
        };
        let err = Error::delivery(format!("failed to log to target {index}"))
            .with_context("target", index)
            .with_source(err);

        match self.policy(target) {
            ErrorPolicy::Throw => Err(err),
            ErrorPolicy::Ignore => Ok(()),
            ErrorPolicy::Log => {
                self.recover(index, event, &err);
                Ok(())
            }
        }
    }

    fn deliver(&self, target: &Target, event: &Event) -> Result<(), Error> {
        let options = target.options();
        let layout_options = LayoutOptions {
            uniform_length: options.uniform_length,
            color: options.color,
            full_timestamps: options.full_timestamps,
            max_name_len: self.factory.max_name_len(),
        };
        let payload = options
            .style
            .layout()
            .format(event, &self.color, &layout_options)?;
        target.deliver(&payload)
    }

    /// Report a failed delivery as a new event to the same targets, with every policy
    /// forced to `Ignore` so failures while reporting are muted.
    fn recover(&self, index: usize, event: &Event, err: &Error) {
        if self.factory.is_destroyed() {
            return;
        }

        let diagnostic = Value::Object(vec![
            (
                "timestamp".to_string(),
                Value::Int(event.time().as_millisecond()),
            ),
            ("level".to_string(), Value::from(event.level().as_str())),
            (
                "messages".to_string(),
                Value::Array(event.messages().to_vec()),
            ),
            ("error".to_string(), Value::from(err)),
        ]);
        let messages = vec![
            Value::from(format!("Failed to log to target {index}:")),
            diagnostic,
        ];
        let recovery = Event::new(
            event.level().min(Level::Error),
            self.factory.now(),
            event.component(),
            event.source(),
            &messages,
        );

        let muted = Dispatch {
            overlay: Some(ErrorPolicy::Ignore),
            ..*self
        };
        let _ = muted.run(&recovery);
    }
}

fn panicked(panic: Box<dyn Any + Send>) -> Error {
    let message = if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    Error::new("target panicked").with_context("panic", message)
}
