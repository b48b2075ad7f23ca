//! Sentry autofix — webhook intake, classification and fix drafting.
//!
//! ## Overview
//!
//! Sentry posts an alert to `/webhook/sentry`. The alert is stored as an
//! `Issue`, acknowledged right away, and classified on a background task
//! against a fixed table of known failure signatures. The classification
//! carries an explanation, a suggested fix and a patch template; a PR
//! descriptor (branch, title, markdown body) can be rendered from it.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Sentry  │ ───────> │  server.rs  (axum Router, ServerConfig)          │
//! │  / curl  │ <─────── │    └─ api.rs  (route handlers, AppState)         │
//! └──────────┘          │         │                    │                   │
//!                       │         │ receive()          │ list/get/classify │
//!                       │         v                    v                   │
//!                       │  intake.rs (WebhookIntake)  query.rs             │
//!                       │         │                    │                   │
//!                       │         │ spawn ──> classifier.rs ──> pr.rs      │
//!                       │         v              │                         │
//!                       │  store.rs  <── update ─┘  (IssueStore)           │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module      | Responsibility                                          |
//! |-------------|---------------------------------------------------------|
//! | `models`    | Shared types: `Issue`, `ClassificationResult`, `PrDescriptor` |
//! | `knowledge` | Ordered signature table, first match wins               |
//!
//! ## Typical Request Flow
//!
//! 1. `POST /webhook/sentry` → `api::receive_sentry_webhook()`
//! 2. `WebhookIntake::receive()` parses the body (falling back to
//!    `{"raw": ...}`), reads `data.error.type`, appends an `Issue` with
//!    status `received`, and spawns classification on its `TaskTracker`.
//! 3. The handler returns `{status, issue_id}` without waiting.
//! 4. The background task runs `ErrorClassifier::classify()`, writes the
//!    result through `IssueStore::update()` (status `analyzed`) and
//!    broadcasts `IssueEvent::IssueAnalyzed`.
//! 5. `GET /issues/{id}` and `GET /fix/{id}` read the stored result.

pub mod api;
pub mod classifier;
pub mod intake;
pub mod knowledge;
pub mod models;
pub mod pr;
pub mod query;
pub mod server;
pub mod store;
