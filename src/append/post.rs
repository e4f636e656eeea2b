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

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::Error;
use crate::ErrorKind;

/// Request options for a POST target.
///
/// The method is always POST and cannot be overridden.
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl PostOptions {
    /// Add a request header. A `Content-Type` header replaces the style's default.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Fail the request if it has not completed within `timeout`.
    ///
    /// Default to no timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured headers, in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    fn has_content_type(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPostOptions {
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

impl<'de> Deserialize<'de> for PostOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawPostOptions::deserialize(deserializer)?;
        Ok(PostOptions {
            headers: raw.headers.into_iter().collect(),
            timeout: raw.timeout_ms.map(Duration::from_millis),
        })
    }
}

/// Issues POST requests to one endpoint.
pub(crate) struct Poster {
    agent: ureq::Agent,
    url: Url,
    options: PostOptions,
}

impl std::fmt::Debug for Poster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poster")
            .field("url", &self.url.as_str())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Poster {
    pub(crate) fn new(url: Url, options: PostOptions) -> Poster {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(options.timeout)
            .build()
            .into();
        Poster {
            agent,
            url,
            options,
        }
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    /// Send `body` and wait for the complete response. The status is not interpreted.
    pub(crate) fn post(&self, body: &[u8], content_type: &str) -> Result<(), Error> {
        let failed = |err: ureq::Error, message: &str| {
            Error::with_kind(ErrorKind::Delivery, message)
                .with_context("url", self.url.as_str())
                .with_source(err)
        };

        let mut request = self.agent.post(self.url.as_str());
        if !self.options.has_content_type() {
            request = request.header("Content-Type", content_type);
        }
        for (name, value) in &self.options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send(body)
            .map_err(|err| failed(err, "failed to send request"))?;

        response
            .into_body()
            .read_to_vec()
            .map_err(|err| failed(err, "failed to receive response"))?;
        Ok(())
    }
}

/// Validate `url` and set its scheme from the transport flag.
pub(crate) fn endpoint(url: &str, https: bool) -> Result<Url, Error> {
    let invalid = || Error::invalid(format!("invalid url: {url:?}"));
    let mut parsed = Url::parse(url).map_err(|err| invalid().with_source(err))?;
    if parsed.host_str().is_none() {
        return Err(invalid());
    }
    let scheme = if https { "https" } else { "http" };
    if parsed.scheme() != scheme {
        parsed
            .set_scheme(scheme)
            .map_err(|()| invalid().with_context("scheme", scheme))?;
    }
    Ok(parsed)
}
