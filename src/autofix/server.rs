use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::api::{self, AppState};
use super::classifier::ErrorClassifier;
use super::store::IssueStore;
use crate::config::{AutofixConfig, DEFAULT_HOST};

/// Configuration for the webhook server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dev_mode: bool,
    /// How long shutdown waits for in-flight classifications.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 5000,
            dev_mode: false,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl From<&AutofixConfig> for ServerConfig {
    fn from(config: &AutofixConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            dev_mode: config.server.dev_mode,
            shutdown_grace: Duration::from_secs(config.worker.shutdown_grace_secs),
        }
    }
}

impl ServerConfig {
    /// Dev mode widens the default loopback host to all interfaces. An
    /// explicitly configured host is always used as given.
    pub fn bind_addr(&self) -> String {
        let host = if self.dev_mode && self.host == DEFAULT_HOST {
            "0.0.0.0"
        } else {
            self.host.as_str()
        };
        format!("{}:{}", host, self.port)
    }
}

/// Build the full application router.
pub fn build_router(state: Arc<AppState>, dev_mode: bool) -> Router {
    let app = api::api_router().with_state(state);
    if dev_mode {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Start the webhook server and block until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(IssueStore::new(), ErrorClassifier::default()));
    let app = build_router(Arc::clone(&state), config.dev_mode);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, dev_mode = config.dev_mode, "sentry-autofix listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let pending = state.intake.drain(config.shutdown_grace).await;
    let issues = state.store.len().unwrap_or_default();
    tracing::info!(issues, abandoned = pending, "Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router(dev_mode: bool) -> Router {
        let state = Arc::new(AppState::new(IssueStore::new(), ErrorClassifier::default()));
        build_router(state, dev_mode)
    }

    #[tokio::test]
    async fn test_health_via_full_router() {
        let app = test_router(false);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = test_router(false);
        let req = Request::builder()
            .uri("/orders")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dev_mode_adds_cors_headers() {
        let app = test_router(true);
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_webhook_via_full_router() {
        let app = test_router(false);
        let req = Request::builder()
            .method("POST")
            .uri("/webhook/sentry")
            .body(Body::from(r#"{"action":"created","data":{"error":{"type":"KeyError"}}}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let ack: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ack["issue_id"], "issue-1");
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "127.0.0.1");
        assert!(!config.dev_mode);
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_dev_mode_binds_all_interfaces() {
        let config = ServerConfig {
            dev_mode: true,
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_dev_mode_keeps_explicit_host() {
        let config = ServerConfig {
            host: "10.1.2.3".to_string(),
            dev_mode: true,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_addr(), "10.1.2.3:5000");
    }
}
