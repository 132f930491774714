//! Poll-until primitive shared by the queue and build watchers: a two-armed
//! race between a periodic tick and a one-shot deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

/// Cadence and budget for one watch phase. The timeout is measured from the
/// start of the phase, not from process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

/// What a single probe observed.
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// Transient state; wait for the next tick.
    Pending,
    /// Terminal state; stop polling and yield the value.
    Complete(T),
}

#[derive(Debug, PartialEq, Eq)]
pub enum PollError<E> {
    /// The phase deadline fired before the probe completed.
    DeadlineElapsed,
    /// The probe itself failed; polling stops immediately.
    Probe(E),
}

/// Runs `probe` once per `policy.interval` until it completes, fails, or the
/// overall `policy.timeout` elapses. The first probe fires one full interval
/// after the call, and at most one probe is in flight at a time. The select
/// is biased toward the deadline, so a tick that fires after the deadline has
/// elapsed can never produce a late success.
pub async fn poll_until<T, E, F, Fut>(policy: PollPolicy, mut probe: F) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollOutcome<T>, E>>,
{
    let start = Instant::now();
    let deadline = time::sleep_until(start + policy.timeout);
    tokio::pin!(deadline);

    let mut tick = time::interval_at(start + policy.interval, policy.interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut deadline => return Err(PollError::DeadlineElapsed),
            _ = tick.tick() => match probe().await {
                Ok(PollOutcome::Complete(value)) => return Ok(value),
                Ok(PollOutcome::Pending) => {}
                Err(err) => return Err(PollError::Probe(err)),
            },
        }
    }
}
