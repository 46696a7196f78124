//! HTTP server for the task form
//!
//! `GET /` shows the form, `POST /run` submits it, `POST /api/run` is the same
//! operation as JSON.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::agent::BrowserOperator;
use crate::core::config::UiConfig;
use crate::core::{OperatorError, Result};
use crate::ui::page::render_page;

/// Owns the operator and its browser session for the lifetime of the server
///
/// Every activation takes the operator lock, so tasks run one at a time; a
/// submission made while a task is running waits for it to finish.
pub struct OperatorContext {
    operator: Mutex<BrowserOperator>,
}

impl OperatorContext {
    pub fn new(operator: BrowserOperator) -> Self {
        Self {
            operator: Mutex::new(operator),
        }
    }

    /// Run a task to completion and return its report
    pub async fn run(&self, task: &str, headless: bool) -> String {
        let operator = self.operator.lock().await;
        operator.run_task(task, headless).await
    }

    /// Whether the operator's browser session has been closed
    pub async fn session_closed(&self) -> bool {
        self.operator.lock().await.browser().is_closed()
    }
}

/// Submitted form fields; an unchecked checkbox is absent
#[derive(Debug, Deserialize)]
struct RunForm {
    #[serde(default)]
    task: String,
    #[serde(default)]
    headless: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunRequest {
    task: String,
    #[serde(default)]
    headless: bool,
}

#[derive(Debug, Serialize)]
struct RunResponse {
    output: String,
}

/// Build the UI router
pub fn router(context: Arc<OperatorContext>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/run", post(run_form))
        .route("/api/run", post(run_api))
        .with_state(context)
}

async fn index() -> Html<String> {
    Html(render_page("", false, ""))
}

async fn run_form(
    State(context): State<Arc<OperatorContext>>,
    Form(form): Form<RunForm>,
) -> Html<String> {
    let headless = form.headless.is_some();
    info!(task = %form.task, headless, "task submitted");

    let output = context.run(&form.task, headless).await;
    Html(render_page(&form.task, headless, &output))
}

async fn run_api(
    State(context): State<Arc<OperatorContext>>,
    Json(request): Json<RunRequest>,
) -> Json<RunResponse> {
    info!(task = %request.task, headless = request.headless, "task submitted via API");

    let output = context.run(&request.task, request.headless).await;
    Json(RunResponse { output })
}

/// Bind the UI listener; `host` may be a name such as `localhost`
pub async fn bind(config: &UiConfig) -> Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| {
            OperatorError::config(format!("Cannot bind UI to {}: {}", config.addr(), e))
        })
}

/// Bind and serve the UI until the process is stopped
pub async fn serve(config: &UiConfig, context: Arc<OperatorContext>) -> Result<()> {
    let listener = bind(config).await?;
    let url = format!("http://{}", listener.local_addr()?);
    info!(%url, "browser operator UI running");
    println!("Running on local URL:  {}", url);

    if config.open_browser {
        if let Err(e) = webbrowser::open(&url) {
            warn!(error = %e, "could not open the UI in a browser");
        }
    }

    axum::serve(listener, router(context)).await?;
    Ok(())
}
