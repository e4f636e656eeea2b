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

//! Factory configuration read from JSON.
//!
//! ```
//! use logfan::config::FactoryConfig;
//!
//! let config = FactoryConfig::from_json_str(
//!     r#"{"targets": [{"kind": "STDOUT", "logLevel": "INFO", "uniformLength": true}]}"#,
//! )
//! .unwrap();
//! assert_eq!(config.targets.len(), 1);
//! ```
//!
//! `STREAM` and `FUNCTION` targets carry runtime values and can only be built in code.

use serde::Deserialize;

use crate::Descriptor;
use crate::Error;
use crate::ErrorPolicy;
use crate::Level;
use crate::append::PostOptions;
use crate::layout::Style;

/// A list of target configurations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryConfig {
    /// Targets in dispatch order.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

impl FactoryConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<FactoryConfig, Error> {
        serde_json::from_str(json)
            .map_err(|err| Error::invalid("failed to parse factory config").with_source(err))
    }

    /// Convert every target configuration into a descriptor.
    pub fn descriptors(&self) -> Result<Vec<Descriptor>, Error> {
        self.targets.iter().map(TargetConfig::to_descriptor).collect()
    }
}

/// One target. Names and defaults follow the descriptor builder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    /// One of `FILE`, `STDOUT`, `POST`.
    pub kind: String,
    /// A level name, default to `TRACE`.
    pub log_level: Option<String>,
    /// `JSON` or `TEXT`, default to `TEXT`.
    pub style: Option<String>,
    #[serde(default)]
    pub uniform_length: bool,
    #[serde(default)]
    pub color: bool,
    #[serde(default)]
    pub full_timestamps: bool,
    /// `THROW`, `LOG` or `IGNORE`, default to `LOG`.
    pub error_policy: Option<String>,
    /// FILE
    pub path: Option<String>,
    /// FILE
    #[serde(default)]
    pub fail_if_exists: bool,
    /// POST
    pub url: Option<String>,
    /// POST, default to `true`.
    pub https: Option<bool>,
    /// POST
    pub options: Option<PostOptions>,
}

impl TargetConfig {
    /// Validate names and build the descriptor.
    pub fn to_descriptor(&self) -> Result<Descriptor, Error> {
        let missing = |field: &str| {
            Error::invalid(format!("missing field {field:?} for {} target", self.kind))
        };

        let descriptor = match self.kind.to_ascii_uppercase().as_str() {
            "FILE" => {
                let path = self.path.as_deref().ok_or_else(|| missing("path"))?;
                Descriptor::file(path).fail_if_exists(self.fail_if_exists)
            }
            "STDOUT" => Descriptor::stdout(),
            "POST" => {
                let url = self.url.as_deref().ok_or_else(|| missing("url"))?;
                let mut descriptor = Descriptor::post(url).https(self.https.unwrap_or(true));
                if let Some(options) = &self.options {
                    descriptor = descriptor.options(options.clone());
                }
                descriptor
            }
            "STREAM" | "FUNCTION" => {
                return Err(Error::invalid(format!(
                    "{} targets cannot be configured from a file",
                    self.kind
                )));
            }
            _ => {
                return Err(Error::invalid(format!(
                    "invalid target kind: {:?}",
                    self.kind
                )));
            }
        };

        let mut descriptor = descriptor
            .uniform_length(self.uniform_length)
            .color(self.color)
            .full_timestamps(self.full_timestamps);
        if let Some(level) = &self.log_level {
            descriptor = descriptor.log_level(level.parse::<Level>()?);
        }
        if let Some(style) = &self.style {
            descriptor = descriptor.style(style.parse::<Style>()?);
        }
        if let Some(policy) = &self.error_policy {
            descriptor = descriptor.error_policy(policy.parse::<ErrorPolicy>()?);
        }
        Ok(descriptor)
    }
}
