//! Jenkins REST surface: trigger a job, then follow it through the queue
//! and the running build until a terminal result.

pub mod client;
pub mod submit;
pub mod watch;

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use url::Url;

/// A single trigger request: the job to run plus its build parameters.
/// Keys are unique; encoding order is stable.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job: String,
    pub parameters: BTreeMap<String, String>,
}

impl JobRequest {
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }
}

/// Basic-auth material attached to every outbound request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub token: String,
}

/// Where the server parked the accepted trigger request. The numeric id is
/// parsed from the trailing path segment and used only for diagnostics.
#[derive(Debug, Clone)]
pub struct QueueLocation {
    pub url: Url,
    pub id: Option<u64>,
}

/// A build that has left the queue: job name plus build number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildHandle {
    pub job: String,
    pub number: u64,
}

impl BuildHandle {
    /// Console-log URI for this build, derived from the server base.
    pub fn console_url(&self, base: &Url) -> Url {
        subpath(base, &["job", &self.job, &self.number.to_string(), "consoleText"])
    }
}

/// Final outcome of a watch phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Success,
    Failure,
    Aborted,
    TimedOut,
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminalStatus::Success => "SUCCESS",
            TerminalStatus::Failure => "FAILURE",
            TerminalStatus::Aborted => "ABORTED",
            TerminalStatus::TimedOut => "TIMED_OUT",
        })
    }
}

/// The two wait stages; each gets its own poll policy and deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    QueueWait,
    BuildWait,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::QueueWait => "waiting for job to start",
            Phase::BuildWait => "waiting for job to finish",
        })
    }
}

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("trigger request returned HTTP {status}")]
    Rejected { status: u16 },

    #[error("trigger request accepted but no Location header returned")]
    MissingLocation,

    #[error("trigger request returned a non-queue location: {location}")]
    NotAQueueLocation { location: String },

    #[error("queue entry resolved to a build but carried no build number")]
    MissingBuildNumber,

    #[error("timeout elapsed while {phase}")]
    Timeout { phase: Phase },

    #[error("job {job} build {number} finished {status}")]
    JobFailed {
        job: String,
        number: u64,
        status: TerminalStatus,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Appends path segments to a copy of `base`, tolerating a trailing slash.
pub(crate) fn subpath(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.path_segments_mut()
        .expect("http(s) URLs are always a base")
        .pop_if_empty()
        .extend(segments);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_url_from_handle() {
        let base = Url::parse("https://ci.example.com").unwrap();
        let handle = BuildHandle {
            job: "deploy".into(),
            number: 17,
        };
        assert_eq!(
            handle.console_url(&base).as_str(),
            "https://ci.example.com/job/deploy/17/consoleText"
        );
    }

    #[test]
    fn subpath_ignores_trailing_slash() {
        let base = Url::parse("https://ci.example.com/jenkins/").unwrap();
        let url = subpath(&base, &["job", "deploy", "build"]);
        assert_eq!(url.as_str(), "https://ci.example.com/jenkins/job/deploy/build");
    }

    #[test]
    fn phase_names_match_reported_messages() {
        let err = TriggerError::Timeout {
            phase: Phase::QueueWait,
        };
        assert_eq!(err.to_string(), "timeout elapsed while waiting for job to start");
    }
}
