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

//! Destinations that accept rendered log payloads.

use std::fmt;

use crate::Error;

mod file;
mod post;
mod stdout;
mod stream;

pub use self::file::FileSink;
pub(crate) use self::file::normalize_path;
pub use self::post::PostOptions;
pub(crate) use self::post::Poster;
pub(crate) use self::post::endpoint;
pub(crate) use self::stdout::stdout_callback;
pub use self::stream::StreamSink;

/// A writable sink: accepts bytes and acknowledges the write once it is complete.
///
/// Implementations serialize concurrent writes so a record is never torn.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Write all bytes, returning once the write is acknowledged.
    fn write(&self, bytes: &[u8]) -> Result<(), Error>;

    /// Flush any buffered bytes.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Release the underlying resource. Only called for sinks the factory owns.
    ///
    /// Default to a flush.
    fn close(&self) -> Result<(), Error> {
        self.flush()
    }
}

/// A function target: invoked with every rendered payload.
pub trait Callback: Send + Sync + 'static {
    /// Deliver one payload.
    fn call(&self, payload: &str) -> Result<(), Error>;
}

impl<F> Callback for F
where
    F: Fn(&str) -> Result<(), Error> + Send + Sync + 'static,
{
    fn call(&self, payload: &str) -> Result<(), Error> {
        self(payload)
    }
}
