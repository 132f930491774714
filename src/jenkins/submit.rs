//! Submitter: issues the trigger request and extracts the queue location.

use reqwest::{header::LOCATION, StatusCode, Url};
use tracing::debug;

use super::client::JenkinsClient;
use super::{JobRequest, QueueLocation, TriggerError};

/// Posts the trigger request and returns where the server queued it.
///
/// Jobs with parameters go to `buildWithParameters` with a form-encoded
/// body; parameterless jobs go to the plain `build` endpoint. Anything other
/// than HTTP 201 plus a queue-shaped `Location` header is a terminal error.
pub async fn submit(
    client: &JenkinsClient,
    request: &JobRequest,
) -> Result<QueueLocation, TriggerError> {
    let endpoint = if request.has_parameters() {
        client.endpoint(&["job", &request.job, "buildWithParameters"])
    } else {
        client.endpoint(&["job", &request.job, "build"])
    };
    debug!(%endpoint, "posting trigger request");

    let mut req = client.post(endpoint);
    if request.has_parameters() {
        req = req.form(&request.parameters);
    }
    let resp = req.send().await?;

    let status = resp.status();
    if status != StatusCode::CREATED {
        return Err(TriggerError::Rejected {
            status: status.as_u16(),
        });
    }

    let raw = resp
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(TriggerError::MissingLocation)?;
    debug!(location = raw, "trigger request accepted");

    parse_queue_location(raw)
}

/// Accepts only http(s) URLs with a `queue` path segment. The trailing
/// numeric segment, when present, is the queue item id (diagnostics only).
fn parse_queue_location(raw: &str) -> Result<QueueLocation, TriggerError> {
    let not_queue = || TriggerError::NotAQueueLocation {
        location: raw.to_string(),
    };

    let url = Url::parse(raw).map_err(|_| not_queue())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(not_queue());
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    if !segments.contains(&"queue") {
        return Err(not_queue());
    }

    let id = segments.last().and_then(|seg| seg.parse().ok());
    Ok(QueueLocation { url, id })
}
