//! Feed retrieval over HTTP and via local commands.

use crate::error::{Error, Result};
use crate::parse::parse_feed;
use feedspool_core::{FetchFeed, FetchOutcome, Validators};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, warn};

/// Url scheme selecting command execution instead of HTTP retrieval.
const EXEC_SCHEME: &str = "exec:";

/// Blocking feed fetcher: conditional GET for `http(s):` urls, local
/// command execution for `exec:` urls.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the given User-Agent and a 30 second
    /// request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str, validators: Option<&Validators>) -> Result<FetchOutcome> {
        let mut request = self.client.get(url);
        if let Some(validators) = validators {
            if let Some(etag) = &validators.etag {
                request = request.header(header::IF_NONE_MATCH, etag);
            }
            if let Some(modified) = &validators.modified {
                request = request.header(header::IF_MODIFIED_SINCE, modified);
            }
        }

        let response = request.send()?;
        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            debug!(url, "not modified");
            return Ok(FetchOutcome::default());
        }
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let new_validators = Validators {
            etag: header_value(&response, header::ETAG),
            modified: header_value(&response, header::LAST_MODIFIED),
        };

        let bytes = response.bytes()?;
        let mut outcome = parse_feed(&bytes)?;
        outcome.validators = new_validators;
        debug!(url, entries = outcome.entries.len(), "fetched");
        Ok(outcome)
    }

    fn fetch_exec(command: &str) -> Result<FetchOutcome> {
        debug!(command, "running feed command");
        let output = Command::new("sh").arg("-c").arg(command).output()?;
        if !output.status.success() {
            return Err(Error::ExecStatus {
                command: command.to_string(),
                status: output.status,
            });
        }
        if !output.stderr.is_empty() {
            warn!(command, "feed command wrote to stderr");
        }
        parse_feed(&output.stdout)
    }
}

impl FetchFeed for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        validators: Option<&Validators>,
    ) -> feedspool_core::Result<FetchOutcome> {
        let outcome = match url.strip_prefix(EXEC_SCHEME) {
            Some(command) => Self::fetch_exec(command),
            None => self.fetch_http(url, validators),
        };
        outcome.map_err(|e| feedspool_core::Error::Fetch(e.to_string()))
    }
}

fn header_value(response: &reqwest::blocking::Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
