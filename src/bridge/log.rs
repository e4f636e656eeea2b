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

use crate::ErrorKind;
use crate::Level;
use crate::Logger;
use crate::trap::StderrTrap;
use crate::trap::Trap;
use crate::value::Value;

/// Forwards records of the `log` crate to a [`Logger`].
///
/// Each record becomes a single string message. Delivery failures are written to standard
/// error since [`log::Log`] cannot return them. Records logged after the factory is
/// destroyed are dropped.
#[derive(Debug)]
pub struct LogBridge {
    logger: Logger,
}

impl LogBridge {
    /// Wrap a logger.
    pub fn new(logger: Logger) -> Self {
        LogBridge { logger }
    }
}

fn level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Trace,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, _: &log::Metadata) -> bool {
        !self.logger.is_destroyed()
    }

    fn log(&self, record: &log::Record) {
        let messages = [Value::from(record.args().to_string())];
        if let Err(err) = self.logger.log(level(record.level()), &messages) {
            if err.kind() != ErrorKind::Destroyed {
                StderrTrap::default().trap(&err);
            }
        }
    }

    fn flush(&self) {}
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_boxed_logger`] with a [`LogBridge`] and all logs from log
/// crate will be forwarded to `logger`.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
pub fn try_setup_log_crate(logger: Logger) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(LogBridge::new(logger)))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// use logfan::Descriptor;
/// use logfan::Factory;
///
/// let factory = Factory::new(Descriptor::stdout()).unwrap();
/// logfan::bridge::setup_log_crate(factory.create_logger("app", None, None).unwrap());
/// log::info!("forwarded");
/// ```
pub fn setup_log_crate(logger: Logger) {
    try_setup_log_crate(logger).expect(
        "logfan::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
