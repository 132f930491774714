//! jobgate -- trigger a Jenkins job and block until it finishes.
//!
//! One linear operation per invocation: post the trigger request, wait for
//! the queue entry to become a concrete build, wait for that build to reach
//! a terminal result. Every outcome other than SUCCESS is surfaced as a
//! specific error; there are no retries.

pub mod config;
pub mod jenkins;
pub mod poll;

use reqwest::Url;

use config::Config;
use jenkins::client::JenkinsClient;
use jenkins::{submit, watch, BuildHandle, TerminalStatus, TriggerError};

/// What a successful run hands back to the caller.
#[derive(Debug)]
pub struct RunReport {
    pub status: TerminalStatus,
    pub build: BuildHandle,
    pub console_url: Url,
}

/// Runs the full trigger-and-wait sequence: submit, queue-wait, build-wait.
/// The two watch phases run strictly sequentially, each under its own poll
/// policy.
pub async fn run(config: &Config) -> Result<RunReport, TriggerError> {
    let client = JenkinsClient::new(config.base.clone(), config.credentials.clone())?;

    tracing::info!(
        job = %config.request.job,
        server = %config.base,
        parameters = ?config.request.parameters,
        "starting job"
    );

    let queue = submit::submit(&client, &config.request).await?;
    tracing::info!(location = %queue.url, queue_id = ?queue.id, "request queued");

    let build = watch::await_start(&client, &config.request.job, &queue, config.queue_poll).await?;
    let status = watch::await_completion(&client, &build, config.build_poll).await?;

    let console_url = build.console_url(client.base());
    Ok(RunReport {
        status,
        build,
        console_url,
    })
}
