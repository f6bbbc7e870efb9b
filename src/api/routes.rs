use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::error::AppError;
use crate::state::board_store::NewPosition;
use crate::state::BoardStore;
use crate::types::{AlertKind, AlertRecord, ControlMsg, GameRow, Position, PositionView, Sport};

const DEFAULT_ALERT_LIMIT: usize = 100;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<BoardStore>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
    pub control_tx: mpsc::Sender<ControlMsg>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/games", get(get_games))
        .route("/alerts", get(get_alerts))
        .route("/positions", get(get_positions).post(open_position))
        .route("/positions/:id", delete(close_position))
        .route("/session/reset", post(reset_session))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct GamesQuery {
    pub sport: Option<String>,
}

#[derive(Deserialize)]
pub struct AlertsQuery {
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub last_cycle_at_ns: u64,
    pub cycles_completed: u64,
    pub upstream_failures: u64,
    pub games_tracked: u64,
    pub alerts_published: usize,
}

#[derive(Serialize, Deserialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_ms: Option<u64>,
    pub p95_ms: Option<u64>,
    pub p99_ms: Option<u64>,
    pub max_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_games(
    State(state): State<ApiState>,
    Query(params): Query<GamesQuery>,
) -> Result<Json<Vec<GameRow>>, AppError> {
    let sport = match params.sport.as_deref() {
        Some(raw) => Some(
            Sport::parse(raw).ok_or_else(|| AppError::BadRequest(format!("unknown sport: {raw}")))?,
        ),
        None => None,
    };
    Ok(Json(state.store.games(sport)))
}

async fn get_alerts(
    State(state): State<ApiState>,
    Query(params): Query<AlertsQuery>,
) -> Result<Json<Vec<AlertRecord>>, AppError> {
    let kind = match params.kind.as_deref() {
        Some(raw) => Some(
            AlertKind::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown alert kind: {raw}")))?,
        ),
        None => None,
    };
    let limit = params.limit.unwrap_or(DEFAULT_ALERT_LIMIT);
    Ok(Json(state.store.alerts(kind, limit)))
}

async fn get_positions(State(state): State<ApiState>) -> Json<Vec<PositionView>> {
    Json(state.store.positions())
}

async fn open_position(
    State(state): State<ApiState>,
    Json(req): Json<NewPosition>,
) -> Result<(StatusCode, Json<Position>), AppError> {
    let position = state.store.open_position(req)?;
    Ok((StatusCode::CREATED, Json(position)))
}

async fn close_position(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> Result<Json<Position>, AppError> {
    Ok(Json(state.store.close_position(id)?))
}

async fn reset_session(State(state): State<ApiState>) -> Result<StatusCode, AppError> {
    state
        .control_tx
        .send(ControlMsg::ResetSession)
        .await
        .map_err(|e| AppError::ChannelSend(e.to_string()))?;
    Ok(StatusCode::ACCEPTED)
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let h = &state.health;
    let status = if h.cycles_completed() == 0 { "starting" } else { "ok" };
    Json(HealthResponse {
        status: status.to_string(),
        last_cycle_at_ns: h.last_cycle_at_ns(),
        cycles_completed: h.cycles_completed(),
        upstream_failures: h.upstream_failures(),
        games_tracked: h.games_tracked(),
        alerts_published: state.store.alert_count(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let p = state.latency.percentiles();
    Json(LatencyResponse {
        samples: state.latency.len(),
        p50_ms: p.map(|p| p.0),
        p95_ms: p.map(|p| p.1),
        p99_ms: p.map(|p| p.2),
        max_ms: p.map(|p| p.3),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::game;
    use crate::types::{ContractSide, TeamSide};

    fn state() -> (ApiState, mpsc::Receiver<ControlMsg>) {
        let (control_tx, control_rx) = mpsc::channel(4);
        let state = ApiState {
            store: BoardStore::new(),
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::new()),
            control_tx,
        };
        (state, control_rx)
    }

    #[tokio::test]
    async fn games_filter_by_sport_and_reject_unknown() {
        let (s, _rx) = state();
        s.store.publish_games(
            Sport::Nba,
            vec![GameRow {
                snapshot: game(),
                favorite: TeamSide::Home,
                edge: None,
                projection: None,
                winner_quotes: Vec::new(),
                spread_quotes: Vec::new(),
            }],
        );

        let Json(rows) = get_games(State(s.clone()), Query(GamesQuery { sport: Some("nba".into()) }))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let Json(rows) = get_games(State(s.clone()), Query(GamesQuery { sport: Some("wnba".into()) }))
            .await
            .unwrap();
        assert!(rows.is_empty());

        let err = get_games(State(s), Query(GamesQuery { sport: Some("nfl".into()) })).await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn alerts_reject_unknown_kind() {
        let (s, _rx) = state();
        let ok = get_alerts(State(s.clone()), Query(AlertsQuery { kind: Some("sniper".into()), limit: None })).await;
        assert!(ok.is_ok());
        let err = get_alerts(State(s), Query(AlertsQuery { kind: Some("bogus".into()), limit: None })).await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn position_lifecycle() {
        let (s, _rx) = state();
        let (code, Json(p)) = open_position(
            State(s.clone()),
            Json(NewPosition {
                ticker: "KXNBAGAME-X-BOS".into(),
                side: ContractSide::Yes,
                contracts: 3,
                entry_price: 44,
            }),
        )
        .await
        .unwrap();
        assert_eq!(code, StatusCode::CREATED);

        let Json(views) = get_positions(State(s.clone())).await;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].mark, None);

        assert!(close_position(State(s.clone()), Path(p.id)).await.is_ok());
        let err = close_position(State(s), Path(p.id)).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn reset_forwards_control_message() {
        let (s, mut rx) = state();
        let code = reset_session(State(s.clone())).await.unwrap();
        assert_eq!(code, StatusCode::ACCEPTED);
        assert!(matches!(rx.recv().await, Some(ControlMsg::ResetSession)));

        drop(rx);
        let err = reset_session(State(s)).await;
        assert!(matches!(err, Err(AppError::ChannelSend(_))));
    }

    #[tokio::test]
    async fn health_and_latency_report_counters() {
        let (s, _rx) = state();
        let Json(h) = get_health(State(s.clone())).await;
        assert_eq!(h.status, "starting");

        s.health.record_cycle(1, 3);
        s.latency.record_ms(250);
        let Json(h) = get_health(State(s.clone())).await;
        assert_eq!((h.status.as_str(), h.games_tracked), ("ok", 3));
        let Json(l) = get_stats_latency(State(s)).await;
        assert_eq!(l.samples, 1);
        assert!(l.p50_ms.is_some());
    }
}
