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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::ErrorKind;
use crate::append::Sink;

/// An append-mode file sink opened and owned by a factory.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Mutex<Option<File>>,
}

impl FileSink {
    /// Open `path` for appending, creating it and its parent directory if missing.
    ///
    /// With `fail_if_exists`, an existing file is an error instead.
    pub fn open(path: impl AsRef<Path>, fail_if_exists: bool) -> Result<FileSink, Error> {
        let path = path.as_ref();
        let with_path = |err: std::io::Error, message: &str| {
            Error::with_kind(ErrorKind::Io, message)
                .with_context("path", path.display())
                .with_source(err)
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|err| with_path(err, "failed to create log directory"))?;
        }

        let mut options = OpenOptions::new();
        options.append(true);
        if fail_if_exists {
            options.create_new(true);
        } else {
            options.create(true);
        }
        let file = options
            .open(path)
            .map_err(|err| with_path(err, "failed to open log file"))?;

        Ok(FileSink {
            path: path.to_path_buf(),
            writer: Mutex::new(Some(file)),
        })
    }

    /// The path the sink was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&self) -> MutexGuard<'_, Option<File>> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn closed(&self) -> Error {
        Error::with_kind(ErrorKind::Io, "log file is closed").with_context("path", self.path.display())
    }
}

impl Sink for FileSink {
    fn write(&self, bytes: &[u8]) -> Result<(), Error> {
        let mut writer = self.writer();
        let file = writer.as_mut().ok_or_else(|| self.closed())?;
        file.write_all(bytes).map_err(Error::from_io_error)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        let mut writer = self.writer();
        match writer.as_mut() {
            Some(file) => file.flush().map_err(Error::from_io_error),
            None => Ok(()),
        }
    }

    fn close(&self) -> Result<(), Error> {
        let mut writer = self.writer();
        match writer.take() {
            Some(mut file) => file.flush().map_err(Error::from_io_error),
            None => Ok(()),
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(file) = writer.as_mut() {
            let _ = file.flush();
        }
    }
}

/// Expand a leading `~/` to the home directory and turn backslashes into slashes.
pub(crate) fn normalize_path(path: &str) -> PathBuf {
    let path = path.replace('\\', "/");
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
