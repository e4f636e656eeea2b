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

//! Logfan is a structured logging facility that fans every log call out to many targets.
//!
//! # Overview
//!
//! A [`Factory`] is bound to a list of targets: standard output, files, caller-supplied sinks,
//! callbacks and HTTP endpoints. Each target has its own minimum level, render style (text or
//! JSON) and error policy. Loggers derived from the factory emit leveled messages that are
//! delivered to every eligible target concurrently; a log call returns once all of them have
//! settled.
//!
//! A failed delivery is handled by the target's [`ErrorPolicy`]: returned to the caller,
//! ignored, or reported as a new ERROR event to the targets while failures of that report are
//! muted.
//!
//! # Examples
//!
//! ```
//! use logfan::Descriptor;
//! use logfan::ErrorPolicy;
//! use logfan::Factory;
//! use logfan::Level;
//! use logfan::layout::Style;
//! use logfan::values;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let factory = Factory::new([
//!     Descriptor::stdout().uniform_length(true).color(true),
//!     Descriptor::file(dir.path().join("app.log").to_string_lossy())
//!         .style(Style::Json)
//!         .log_level(Level::Error)
//!         .error_policy(ErrorPolicy::Throw),
//! ])
//! .unwrap();
//!
//! let http = factory.create_logger("http", None, Some("#00ff00".into())).unwrap();
//! let pool = factory.create_logger("db", Some("pool"), None).unwrap();
//!
//! http.info(&values!["listening on", 8080]).unwrap();
//! pool.error(&values!["connection lost", true]).unwrap();
//!
//! factory.destroy();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
#[cfg(feature = "bridge-log")]
pub mod bridge;
pub mod clock;
pub mod color;
pub mod config;
pub mod layout;
pub mod record;
pub mod target;
pub mod trap;
pub mod value;

mod error;
pub use self::error::Error;
pub use self::error::ErrorKind;

mod logger;
pub use self::logger::Factory;
pub use self::logger::FactoryBuilder;
pub use self::logger::Logger;

pub use self::layout::Style;
pub use self::record::Level;
pub use self::target::Descriptor;
pub use self::target::ErrorPolicy;
