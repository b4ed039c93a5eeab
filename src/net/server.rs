//! Scoring server
//!
//! Accepts a fully materialized contest as a JSON body, validates it, runs
//! the cumulative scorer or the live status query and answers with JSON.
//! Nothing is kept between requests apart from metrics.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Request, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hashbrown::HashSet;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::game::cumulative::{score_total, TeamScores};
use crate::game::model::{Contest, ContestId, ContestStatus, ScoringMode};
use crate::game::snapshot::{zone_status, ZoneStatus};
use crate::game::strategy::ScoringStrategy;
use crate::metrics::Metrics;
use crate::util::time::{unix_seconds, Timestamp};

pub const CONTENT_TYPE_PROMETHEUS: &str = "text/plain; version=0.0.4";

/// Request failures, each mapped to an HTTP status
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("No route for {0}")]
    NotFound(String),
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Map a JSON extractor rejection; oversized bodies keep their 413
    fn from_rejection(rejection: JsonRejection, body_limit: usize) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::PayloadTooLarge(body_limit)
        } else {
            ServiceError::BadRequest(format!("Invalid contest payload: {}", rejection.body_text()))
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub contest_id: ContestId,
    pub scoring_mode: ScoringMode,
    pub settlement_time: Timestamp,
    pub scores: TeamScores,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub contest_id: ContestId,
    pub status: ContestStatus,
    /// Whether pings taken at `query_time` still count
    pub accepting_pings: bool,
    pub scoring_mode: ScoringMode,
    pub query_time: Timestamp,
    pub zones: Vec<ZoneStatus>,
}

/// Check a contest payload before it reaches the engine
pub fn validate_contest(contest: &Contest) -> Result<(), ServiceError> {
    let bad = |msg: String| Err(ServiceError::BadRequest(msg));

    if !contest.start_time.is_finite() || !contest.end_time.is_finite() {
        return bad("Contest start and end times must be finite".to_string());
    }
    if contest.end_time < contest.start_time {
        return bad(format!(
            "Contest end time {} is before its start time {}",
            contest.end_time, contest.start_time
        ));
    }
    if let Some(rate) = contest.decay_rate {
        if !rate.is_finite() || rate < 0.0 {
            return bad(format!("Decay rate must be finite and non-negative, got {}", rate));
        }
    }

    let mut zone_ids = HashSet::with_capacity(contest.zones.len());
    for zone in &contest.zones {
        if !zone_ids.insert(zone.id) {
            return bad(format!("Duplicate zone id {}", zone.id));
        }
        if !zone.center.is_valid() {
            return bad(format!("Zone {} has invalid coordinates", zone.id));
        }
        if !(zone.radius.is_finite() && zone.radius > 0.0) {
            return bad(format!("Zone {} radius must be > 0", zone.id));
        }
    }

    let mut team_ids = HashSet::with_capacity(contest.teams.len());
    for team in &contest.teams {
        if !team_ids.insert(team.id) {
            return bad(format!("Duplicate team id {}", team.id));
        }
        for player in &team.players {
            for ping in &player.pings {
                if !ping.position.is_valid() {
                    return bad(format!("Player {} has a ping with invalid coordinates", player.id));
                }
                if !ping.timestamp.is_finite() {
                    return bad(format!("Player {} has a ping with an invalid timestamp", player.id));
                }
                if ping.altitude.is_some_and(|alt| !alt.is_finite()) {
                    return bad(format!("Player {} has a ping with an invalid altitude", player.id));
                }
            }
        }
    }

    Ok(())
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: ServerConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            config: Arc::new(config),
            metrics,
        }
    }

    /// Count and log a failed request
    fn reject(&self, error: ServiceError) -> ServiceError {
        self.metrics.record_error();
        warn!("Request failed: {}", error);
        error
    }

    fn accept(&self, payload: Result<Json<Contest>, JsonRejection>) -> Result<Contest, ServiceError> {
        let contest = payload
            .map(|Json(contest)| contest)
            .map_err(|rejection| ServiceError::from_rejection(rejection, self.config.max_body_bytes))
            .and_then(|contest| validate_contest(&contest).map(|()| contest));

        contest.map_err(|e| self.reject(e))
    }

    /// Score a validated contest as of `now`
    pub fn score(&self, contest: &Contest, now: Timestamp) -> ScoreResponse {
        let strategy = ScoringStrategy::for_contest(contest, self.config.default_decay_rate);

        let started = Instant::now();
        let report = score_total(contest, &strategy, now);
        self.metrics.record_score(&report, started.elapsed());

        info!(
            "Scored contest {} ({}): {} teams, {} pings, leader {:?}",
            contest.id,
            strategy.mode(),
            report.scores.len(),
            report.pings_replayed,
            report.scores.leader().map(|(team, _)| team)
        );

        ScoreResponse {
            contest_id: contest.id,
            scoring_mode: strategy.mode(),
            settlement_time: report.settlement_time,
            scores: report.scores,
        }
    }

    /// Current zone ownership of a validated contest at `now`
    pub fn status(&self, contest: &Contest, now: Timestamp) -> StatusResponse {
        let strategy = ScoringStrategy::for_contest(contest, self.config.default_decay_rate);

        let started = Instant::now();
        let zones = zone_status(contest, &strategy, now);
        self.metrics.record_status(zones.len(), started.elapsed());

        debug!(
            "Status for contest {} ({}): {}/{} zones held",
            contest.id,
            strategy.mode(),
            zones.iter().filter(|z| z.holder_team_id.is_some()).count(),
            zones.len()
        );

        StatusResponse {
            contest_id: contest.id,
            status: contest.status_at(now),
            accepting_pings: contest.accepts_pings_at(now),
            scoring_mode: strategy.mode(),
            query_time: now,
            zones,
        }
    }
}

/// Build the scoring router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_handler).fallback(method_not_allowed))
        .route("/metrics", get(prometheus_handler).fallback(method_not_allowed))
        .route("/metrics/json", get(metrics_json_handler).fallback(method_not_allowed))
        .route("/contests/score", post(score_handler).fallback(method_not_allowed))
        .route("/contests/status", post(status_handler).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method(),
                path = %request.uri().path()
            )
        }))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn prometheus_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, CONTENT_TYPE_PROMETHEUS)],
        state.metrics.to_prometheus(),
    )
}

async fn metrics_json_handler(State(state): State<AppState>) -> Json<Value> {
    Json(state.metrics.to_json())
}

async fn score_handler(
    State(state): State<AppState>,
    payload: Result<Json<Contest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, ServiceError> {
    let contest = state.accept(payload)?;
    Ok(Json(state.score(&contest, unix_seconds())))
}

async fn status_handler(
    State(state): State<AppState>,
    payload: Result<Json<Contest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ServiceError> {
    let contest = state.accept(payload)?;
    Ok(Json(state.status(&contest, unix_seconds())))
}

async fn method_not_allowed(State(state): State<AppState>, method: Method) -> ServiceError {
    state.reject(ServiceError::MethodNotAllowed(method.to_string()))
}

async fn not_found(State(state): State<AppState>, uri: Uri) -> ServiceError {
    state.reject(ServiceError::NotFound(uri.path().to_string()))
}

pub struct ScoringServer {
    state: AppState,
}

impl ScoringServer {
    pub fn new(config: ServerConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            state: AppState::new(config, metrics),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.state.config.socket_addr()
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Serve until the listener fails
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.bind_addr();
        let listener = TcpListener::bind(addr).await?;

        info!("Scoring server listening on http://{}", addr);
        info!("Health check: http://{}/health", addr);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
