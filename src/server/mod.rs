//! HTTP server for the override bot.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries and handles `/override` comments
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

use crate::clients::{GitHubClient, JobClient, PresubmitLookup};
use crate::overrides::OverrideHandler;
use crate::webhooks::WebhookSecret;

/// Shared application state, passed to handlers via Axum's `State` extractor.
pub struct AppState<G, J, P> {
    inner: Arc<AppStateInner<G, J, P>>,
}

struct AppStateInner<G, J, P> {
    handler: OverrideHandler<G, J, P>,

    /// Secret for HMAC-SHA256 signature verification.
    webhook_secret: WebhookSecret,
}

impl<G, J, P> Clone for AppState<G, J, P> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G, J, P> AppState<G, J, P> {
    pub fn new(handler: OverrideHandler<G, J, P>, webhook_secret: WebhookSecret) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                handler,
                webhook_secret,
            }),
        }
    }

    pub fn handler(&self) -> &OverrideHandler<G, J, P> {
        &self.inner.handler
    }

    pub fn webhook_secret(&self) -> &WebhookSecret {
        &self.inner.webhook_secret
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<G, J, P>(app_state: AppState<G, J, P>) -> Router
where
    G: GitHubClient + Send + Sync + 'static,
    J: JobClient + Send + Sync + 'static,
    P: PresubmitLookup + Send + Sync + 'static,
{
    Router::new()
        .route("/webhook", post(webhook_handler::<G, J, P>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
