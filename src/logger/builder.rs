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

use crate::Descriptor;
use crate::Error;
use crate::Factory;
use crate::clock::Clock;
use crate::logger::factory::FactoryInner;
use crate::logger::factory::release;
use crate::target::normalize;
use crate::trap::StderrTrap;
use crate::trap::Trap;

/// A builder for configuring a [`Factory`].
///
/// ## Examples
///
/// ```
/// use logfan::Descriptor;
/// use logfan::Factory;
/// use logfan::clock::ManualClock;
/// use logfan::trap::StderrTrap;
///
/// let clock = ManualClock::new("2024-08-11T22:44:57.172Z".parse().unwrap());
/// let factory = Factory::builder()
///     .target(Descriptor::stdout())
///     .clock(clock)
///     .trap(StderrTrap::default())
///     .build()
///     .unwrap();
/// ```
#[must_use = "call `build` to create the factory"]
#[derive(Debug, Default)]
pub struct FactoryBuilder {
    descriptors: Vec<Descriptor>,
    clock: Clock,
    trap: Option<Box<dyn Trap>>,
}

impl FactoryBuilder {
    /// Add a target. Targets are dispatched to in the order they are added.
    pub fn target(mut self, descriptor: Descriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Add several targets.
    pub fn targets(mut self, descriptors: impl IntoIterator<Item = Descriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// Set the clock events are stamped from.
    ///
    /// Default to the system clock.
    pub fn clock(mut self, clock: impl Into<Clock>) -> Self {
        self.clock = clock.into();
        self
    }

    /// Set the trap for errors raised while releasing sinks.
    ///
    /// Default to [`StderrTrap`].
    pub fn trap(mut self, trap: impl Trap) -> Self {
        self.trap = Some(Box::new(trap));
        self
    }

    /// Normalize every descriptor and create the factory.
    ///
    /// On failure, sinks opened for earlier descriptors are released and their close errors
    /// go to the trap.
    pub fn build(self) -> Result<Factory, Error> {
        let trap = self
            .trap
            .unwrap_or_else(|| Box::new(StderrTrap::default()));

        let mut targets = Vec::with_capacity(self.descriptors.len());
        for descriptor in self.descriptors {
            match normalize(descriptor) {
                Ok(Some(target)) => targets.push(target),
                Ok(None) => {}
                Err(err) => {
                    release(&targets, trap.as_ref());
                    return Err(err);
                }
            }
        }

        Ok(Factory::from_inner(FactoryInner::new(
            targets, self.clock, trap,
        )))
    }
}
