//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries, validates signatures, and runs the
//! override handler inline before answering.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::clients::{GitHubClient, JobClient, PresubmitLookup};
use crate::overrides::{OverrideError, OverrideOutcome};
use crate::webhooks::{GitHubEvent, ParseError, parse_webhook};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// An override wrote some state and then failed.
    #[error("override failed: {0}")]
    Override(#[from] OverrideError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Override(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Response
///
/// - 200 OK: event processed, or ignored
/// - 400 Bad Request: missing header or malformed payload
/// - 401 Unauthorized: invalid signature
/// - 500 Internal Server Error: an override failed partway
pub async fn webhook_handler<G, J, P>(
    State(app_state): State<AppState<G, J, P>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError>
where
    G: GitHubClient + Send + Sync + 'static,
    J: JobClient + Send + Sync + 'static,
    P: PresubmitLookup + Send + Sync + 'static,
{
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = get_header(&headers, HEADER_DELIVERY)?;
    let signature_header = get_header(&headers, HEADER_SIGNATURE)?;

    debug!(delivery_id = %delivery_id, event_type = %event_type, "Received webhook");

    // Nothing in the body is trusted until the signature checks out.
    if !app_state.webhook_secret().verify(&body, &signature_header) {
        warn!(delivery_id = %delivery_id, "Invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let event = match parse_webhook(&event_type, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring unhandled event type");
            return Ok((StatusCode::OK, "Ignored"));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Malformed webhook payload");
            return Err(e.into());
        }
    };

    debug!(delivery_id = %delivery_id, repo = %event.repo_id(), "Parsed webhook event");

    let GitHubEvent::IssueComment(comment) = event;
    let outcome = app_state.handler().handle(&comment).await?;

    match outcome {
        OverrideOutcome::Ignored(_) => Ok((StatusCode::OK, "Ignored")),
        outcome => {
            info!(
                delivery_id = %delivery_id,
                repo = %comment.repo,
                pr = %comment.number,
                outcome = ?outcome,
                "Handled /override"
            );
            Ok((StatusCode::OK, "OK"))
        }
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_header_present() {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", "issue_comment".parse().unwrap());

        let result = get_header(&headers, "x-github-event").unwrap();
        assert_eq!(result, "issue_comment");
    }

    #[test]
    fn get_header_missing() {
        let headers = HeaderMap::new();

        let result = get_header(&headers, "x-github-event");
        assert!(matches!(result, Err(WebhookError::MissingHeader(_))));
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (WebhookError::MissingHeader(HEADER_EVENT), StatusCode::BAD_REQUEST),
            (WebhookError::InvalidSignature, StatusCode::UNAUTHORIZED),
            (
                WebhookError::InvalidPayload(ParseError::InvalidField {
                    field: "action",
                    value: "exploded".to_string(),
                }),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
