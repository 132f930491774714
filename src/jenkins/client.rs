//! HTTP plumbing for the Jenkins REST API: one reused client, basic auth on
//! every request, typed JSON payloads for the two status endpoints.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;

use super::{subpath, BuildHandle, Credentials, QueueLocation, TriggerError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct JenkinsClient {
    http: Client,
    base: Url,
    credentials: Credentials,
}

/// `GET {queue}/api/json` — `executable` stays null until a build slot is
/// assigned; `number` is nullable even then.
#[derive(Debug, Deserialize)]
pub struct QueueItemState {
    pub executable: Option<QueueExecutable>,
}

#[derive(Debug, Deserialize)]
pub struct QueueExecutable {
    pub number: Option<u64>,
}

/// `GET {base}/job/{job}/{n}/api/json` — `result` is null while the build is
/// still running.
#[derive(Debug, Deserialize)]
pub struct BuildState {
    pub result: Option<String>,
}

impl JenkinsClient {
    pub fn new(base: Url, credentials: Credentials) -> Result<Self, TriggerError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub(super) fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.credentials.user, Some(&self.credentials.token))
    }

    pub(super) fn post(&self, url: Url) -> RequestBuilder {
        self.authed(self.http.post(url))
    }

    pub(super) fn endpoint(&self, segments: &[&str]) -> Url {
        subpath(&self.base, segments)
    }

    /// Fetches the queue entry's status representation.
    pub async fn queue_item(&self, location: &QueueLocation) -> Result<QueueItemState, TriggerError> {
        let url = subpath(&location.url, &["api", "json"]);
        let resp = self.authed(self.http.get(url)).send().await?;
        Ok(resp.error_for_status()?.json().await?)
    }

    /// Fetches the build's status representation.
    pub async fn build_state(&self, build: &BuildHandle) -> Result<BuildState, TriggerError> {
        let url = self.endpoint(&[
            "job",
            &build.job,
            &build.number.to_string(),
            "api",
            "json",
        ]);
        let resp = self.authed(self.http.get(url)).send().await?;
        Ok(resp.error_for_status()?.json().await?)
    }
}
