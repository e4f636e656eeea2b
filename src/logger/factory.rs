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
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use jiff::Timestamp;

use crate::Descriptor;
use crate::Error;
use crate::Logger;
use crate::clock::Clock;
use crate::color::SourceColor;
use crate::color::resolve;
use crate::config::FactoryConfig;
use crate::logger::FactoryBuilder;
use crate::record::display_name_len;
use crate::target::Target;
use crate::trap::Trap;

pub(crate) struct FactoryInner {
    targets: RwLock<Arc<[Target]>>,
    destroyed: AtomicBool,
    max_name_len: AtomicUsize,
    clock: Clock,
    trap: Box<dyn Trap>,
}

impl FactoryInner {
    pub(crate) fn new(targets: Vec<Target>, clock: Clock, trap: Box<dyn Trap>) -> Self {
        FactoryInner {
            targets: RwLock::new(targets.into()),
            destroyed: AtomicBool::new(false),
            max_name_len: AtomicUsize::new(0),
            clock,
            trap,
        }
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub(crate) fn max_name_len(&self) -> usize {
        self.max_name_len.load(Ordering::Acquire)
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// The current target list, or the destroyed error.
    pub(crate) fn targets(&self) -> Result<Arc<[Target]>, Error> {
        let targets = self.targets.read().unwrap_or_else(|e| e.into_inner());
        if self.is_destroyed() {
            return Err(Error::destroyed());
        }
        Ok(targets.clone())
    }

    fn destroy(&self) {
        let targets = {
            let mut targets = self.targets.write().unwrap_or_else(|e| e.into_inner());
            if self.destroyed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::replace(&mut *targets, Arc::from(Vec::new()))
        };

        release(&targets, self.trap.as_ref());
    }
}

/// Close every owned sink in `targets`, sending failures to `trap`.
pub(crate) fn release(targets: &[Target], trap: &dyn Trap) {
    for target in targets {
        if let Err(err) = target.close() {
            trap.trap(&err);
        }
    }
}

/// A shared logger factory bound to a list of targets.
///
/// Cloning the factory clones the handle. Loggers created from it never keep it alive.
///
/// # Examples
///
/// ```
/// use logfan::Descriptor;
/// use logfan::Factory;
/// use logfan::Level;
/// use logfan::values;
///
/// let factory = Factory::new(Descriptor::stdout().log_level(Level::Info)).unwrap();
/// let logger = factory.create_logger("svc", None, None).unwrap();
/// logger.info(&values!["listening on", 8080]).unwrap();
/// factory.destroy();
/// assert!(logger.info(&values!["late"]).is_err());
/// ```
#[derive(Clone)]
pub struct Factory {
    inner: Arc<FactoryInner>,
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("destroyed", &self.inner.is_destroyed())
            .field("max_name_len", &self.inner.max_name_len())
            .finish_non_exhaustive()
    }
}

impl Factory {
    /// Create a factory from one descriptor or many.
    ///
    /// Fail without keeping any target if one descriptor is invalid.
    pub fn new(descriptors: impl IntoIterator<Item = Descriptor>) -> Result<Factory, Error> {
        Factory::builder().targets(descriptors).build()
    }

    /// Create a factory builder to configure the clock or trap.
    pub fn builder() -> FactoryBuilder {
        FactoryBuilder::default()
    }

    /// Create a factory from its configuration.
    pub fn from_config(config: &FactoryConfig) -> Result<Factory, Error> {
        Factory::new(config.descriptors()?)
    }

    pub(crate) fn from_inner(inner: FactoryInner) -> Factory {
        Factory {
            inner: Arc::new(inner),
        }
    }

    /// Create a logger for `component`, optionally narrowed to `source`.
    ///
    /// `color` styles the display name on colored targets.
    pub fn create_logger(
        &self,
        component: impl Into<String>,
        source: Option<&str>,
        color: Option<SourceColor>,
    ) -> Result<Logger, Error> {
        if self.inner.is_destroyed() {
            return Err(Error::destroyed());
        }

        let color = resolve(color.as_ref())?;
        let component = component.into();
        let name_len = display_name_len(&component, source);
        self.inner.max_name_len.fetch_max(name_len, Ordering::AcqRel);

        Ok(Logger::new(
            component,
            source.map(str::to_string),
            color,
            Arc::downgrade(&self.inner),
        ))
    }

    /// Release every owned sink and reject every later log call.
    ///
    /// Calling this more than once has no further effect.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    /// Whether [`Factory::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }

    /// The longest display name among the loggers created so far.
    pub fn max_name_len(&self) -> usize {
        self.inner.max_name_len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::append::Sink;
    use crate::trap::FnTrap;

    #[derive(Debug)]
    struct Stuck;

    impl Sink for Stuck {
        fn write(&self, _: &[u8]) -> Result<(), Error> {
            Ok(())
        }

        fn close(&self) -> Result<(), Error> {
            Err(Error::new("stuck"))
        }
    }

    #[test]
    fn test_release_traps_every_close_error() {
        let trapped = Arc::new(Mutex::new(vec![]));
        let trap = FnTrap::new({
            let trapped = trapped.clone();
            move |err: &Error| trapped.lock().unwrap().push(err.to_string())
        });
        let targets = [
            Target::owned_sink(Arc::new(Stuck)),
            Target::owned_sink(Arc::new(Stuck)),
        ];

        release(&targets, &trap);

        let trapped = trapped.lock().unwrap();
        assert_eq!(trapped.len(), 2);
        assert!(trapped.iter().all(|msg| msg.contains("stuck")));
    }
}
