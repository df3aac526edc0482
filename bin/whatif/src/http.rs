// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info};
use whatif_engine::contracts::AnalyzeResponse;
use whatif_engine::{ConfigStore, ScenarioEngine};

#[derive(Clone)]
pub struct AppState {
    config: ConfigStore,
}

impl AppState {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub scenario: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(error = %message, "Request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/health", get(health))
        .route("/api/config/reload", post(reload_config))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(address = %listener.local_addr()?, "What-if API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let scenario = request.scenario.trim();
    if scenario.is_empty() {
        return Err(ApiError::bad_request("Please enter a scenario"));
    }

    let config = state.config.snapshot().await;
    let engine = ScenarioEngine::from_config(&config).map_err(|e| ApiError::internal(e.to_string()))?;
    let result = engine
        .run_workflow(scenario)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(AnalyzeResponse::from(result)))
}

/// Always 200 while the server is up. In model mode the body also says
/// whether the configured backend answers.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let config = state.config.snapshot().await;
    let mut body = json!({ "status": "ok", "engine": config.engine.mode });

    let model = match ScenarioEngine::from_config(&config) {
        Ok(engine) => engine.model_health().await.map(|(backend, status)| match status {
            Ok(()) => json!({ "backend": backend, "reachable": true }),
            Err(e) => json!({ "backend": backend, "reachable": false, "error": e.to_string() }),
        }),
        Err(e) => Some(json!({ "reachable": false, "error": e.to_string() })),
    };
    if let Some(model) = model {
        body["model"] = model;
    }
    Json(body)
}

async fn reload_config(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let config = state
        .config
        .reload()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    info!(engine = %config.engine.mode, "Configuration reloaded");
    Ok(Json(json!({ "status": "reloaded", "engine": config.engine.mode })))
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("content-type"),
    );
}
