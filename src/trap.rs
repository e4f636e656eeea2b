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

//! Listeners for errors that cannot be returned to a caller.

use std::fmt;
use std::io;
use std::io::Write;

use crate::Error;

/// A trap receives errors raised where no caller can handle them, such as a file target
/// whose path could not be opened.
pub trait Trap: fmt::Debug + Send + Sync + 'static {
    /// Handle an error.
    fn trap(&self, err: &Error);
}

/// A trap that panics, making the error fatal to the process.
///
/// Used for file targets that have no error listener.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct FatalTrap {}

impl Trap for FatalTrap {
    fn trap(&self, err: &Error) {
        panic!("fatal logger error: {err}");
    }
}

/// A trap that writes the error to standard error.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct StderrTrap {}

impl Trap for StderrTrap {
    fn trap(&self, err: &Error) {
        let _ = writeln!(io::stderr(), "{err}");
    }
}

/// A trap backed by a closure.
pub struct FnTrap<F>(F);

impl<F> FnTrap<F>
where
    F: Fn(&Error) + Send + Sync + 'static,
{
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        FnTrap(f)
    }
}

impl<F> fmt::Debug for FnTrap<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTrap").finish_non_exhaustive()
    }
}

impl<F> Trap for FnTrap<F>
where
    F: Fn(&Error) + Send + Sync + 'static,
{
    fn trap(&self, err: &Error) {
        (self.0)(err)
    }
}
