//! The two watch phases, each a thin probe handed to `poll::poll_until`.

use tracing::{debug, info};

use crate::poll::{poll_until, PollError, PollOutcome, PollPolicy};

use super::client::JenkinsClient;
use super::{BuildHandle, Phase, QueueLocation, TerminalStatus, TriggerError};

/// Polls the queue entry until the server assigns it a build number.
///
/// A queue item whose `executable` is null has not been scheduled yet; one
/// with an executable but no number is malformed and fails immediately
/// rather than being re-polled.
pub async fn await_start(
    client: &JenkinsClient,
    job: &str,
    queue: &QueueLocation,
    policy: PollPolicy,
) -> Result<BuildHandle, TriggerError> {
    debug!(queue = %queue.url, queue_id = ?queue.id, "waiting for queued job to start");

    let result = poll_until(policy, || async move {
        let state = client.queue_item(queue).await?;
        match state.executable {
            None => {
                debug!(queue = %queue.url, "job has not started yet");
                Ok(PollOutcome::Pending)
            }
            Some(executable) => match executable.number {
                Some(number) => Ok(PollOutcome::Complete(number)),
                None => Err(TriggerError::MissingBuildNumber),
            },
        }
    })
    .await;

    match result {
        Ok(number) => {
            info!(job, number, "job started");
            Ok(BuildHandle {
                job: job.to_string(),
                number,
            })
        }
        Err(PollError::DeadlineElapsed) => Err(TriggerError::Timeout {
            phase: Phase::QueueWait,
        }),
        Err(PollError::Probe(err)) => Err(err),
    }
}

/// Polls the running build until its `result` turns terminal.
///
/// Only SUCCESS, FAILURE, and ABORTED are terminal; null and any other
/// string count as still in progress. On any terminal result the console-log
/// URI is reported before returning.
pub async fn await_completion(
    client: &JenkinsClient,
    build: &BuildHandle,
    policy: PollPolicy,
) -> Result<TerminalStatus, TriggerError> {
    debug!(job = %build.job, number = build.number, "waiting for running job to finish");

    let result = poll_until(policy, || async move {
        let state = client.build_state(build).await?;
        match state.result.as_deref() {
            Some("SUCCESS") => Ok(PollOutcome::Complete(TerminalStatus::Success)),
            Some("FAILURE") => Ok(PollOutcome::Complete(TerminalStatus::Failure)),
            Some("ABORTED") => Ok(PollOutcome::Complete(TerminalStatus::Aborted)),
            other => {
                debug!(job = %build.job, number = build.number, result = ?other, "job still in progress");
                Ok(PollOutcome::Pending)
            }
        }
    })
    .await;

    match result {
        Ok(status) => {
            info!(console = %build.console_url(client.base()), "remote job logs");
            match status {
                TerminalStatus::Success => Ok(TerminalStatus::Success),
                status => Err(TriggerError::JobFailed {
                    job: build.job.clone(),
                    number: build.number,
                    status,
                }),
            }
        }
        Err(PollError::DeadlineElapsed) => Err(TriggerError::Timeout {
            phase: Phase::BuildWait,
        }),
        Err(PollError::Probe(err)) => Err(err),
    }
}
