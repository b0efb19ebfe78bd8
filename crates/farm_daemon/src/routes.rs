use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use farm_control::{status_report, CommandOutcome, CommandReply, StatusReport};
use farm_core::EventEnvelope;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, HeaderValue::from_static("http://localhost:5173"))
}

pub fn make_router_with_cors(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/status", get(status_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/command", post(command_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/pause", post(pause_handler))
        .route("/api/v1/resume", post(resume_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let sim = app_state.sim.lock();
    let meta = &sim.fortress.meta;
    Json(serde_json::json!({
        "frame": meta.frame_counter,
        "year": meta.year,
        "season": meta.season,
        "season_tick": meta.season_tick,
        "seed": meta.seed,
        "content_version": meta.content_version,
        "frames_per_sec": app_state.frames_per_sec,
        "paused": app_state.paused.load(Ordering::Relaxed),
        "enabled": sim.controller.state().is_enabled(),
    }))
}

pub async fn status_handler(State(app_state): State<AppState>) -> Json<StatusReport> {
    let sim = app_state.sim.lock();
    Json(status_report(sim.controller.state(), &sim.fortress))
}

pub async fn snapshot_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let sim = app_state.sim.lock();
    match serde_json::to_string(&sim.fortress) {
        Ok(json) => {
            drop(sim);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
        }
        Err(err) => {
            tracing::error!("snapshot serialization failed: {err}");
            drop(sim);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

#[derive(Deserialize)]
pub struct CommandRequest {
    /// Words following `autofarm`; empty means `status`.
    #[serde(default)]
    pub args: Vec<String>,
}

pub async fn command_handler(
    State(app_state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> (StatusCode, Json<CommandReply>) {
    let mut guard = app_state.sim.lock();
    let sim = &mut *guard;
    let reply = sim.controller.execute(&request.args, &mut sim.fortress);
    drop(guard);

    let status = match reply.outcome {
        CommandOutcome::Success => StatusCode::OK,
        CommandOutcome::UsageError => StatusCode::BAD_REQUEST,
        CommandOutcome::Failure => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::info!(args = ?request.args, outcome = ?reply.outcome, "autofarm command");
    (status, Json(reply))
}

pub async fn pause_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    app_state.paused.store(true, Ordering::Relaxed);
    Json(serde_json::json!({"paused": true}))
}

pub async fn resume_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    app_state.paused.store(false, Ordering::Relaxed);
    Json(serde_json::json!({"paused": false}))
}

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let sim = app_state.sim.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_millis(500));
        heartbeat.tick().await; // discard the immediate first tick
        let mut flush = tokio::time::interval(Duration::from_millis(50));
        flush.tick().await; // discard the immediate first tick
        let mut pending: Vec<EventEnvelope> = Vec::new();
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(events) => pending.extend(events),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = flush.tick() => {
                    if !pending.is_empty() {
                        let data = serde_json::to_string(&pending).unwrap_or_default();
                        pending.clear();
                        yield Ok(Event::default().data(data));
                    }
                }
                _ = heartbeat.tick() => {
                    let frame = sim.lock().fortress.meta.frame_counter;
                    let hb = serde_json::json!({"heartbeat": true, "frame": frame});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SimState;
    use axum::{body::Body, http::Request};
    use farm_control::AutofarmController;
    use farm_core::test_fixtures::{base_state, harvested, plot, seeds, PIG_TAIL, PLUMP_HELMET};
    use farm_core::{Constants, PlantId};
    use http_body_util::BodyExt;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_test_state() -> AppState {
        let mut fortress = base_state();
        fortress.plots = vec![plot(1, None, 10), plot(2, None, 10)];
        fortress.items = vec![
            seeds(1, PLUMP_HELMET, 5),
            seeds(2, PIG_TAIL, 5),
            harvested(3, PIG_TAIL, 80),
        ];
        let controller = AutofarmController::register(&fortress, Constants::default()).unwrap();
        let (event_tx, _) = tokio::sync::broadcast::channel(64);
        AppState {
            sim: Arc::new(Mutex::new(SimState {
                fortress,
                controller,
            })),
            event_tx,
            frames_per_sec: 0.0,
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_command(app: Router, args: &[&str]) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({ "args": args }).to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/command")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_meta_reports_clock() {
        let (status, json) = get_json(make_router(make_test_state()), "/api/v1/meta").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["frame"], 0);
        assert_eq!(json["season"], "spring");
        assert_eq!(json["enabled"], false);
    }

    #[tokio::test]
    async fn test_snapshot_is_valid_fortress_json() {
        let (status, json) = get_json(make_router(make_test_state()), "/api/v1/snapshot").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["plots"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_status_before_any_run() {
        let (status, json) = get_json(make_router(make_test_state()), "/api/v1/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["enabled"], false);
        assert_eq!(json["default_threshold"], 50);
        assert_eq!(json["plants"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_command_runonce_plants_cavern_plots() {
        let state = make_test_state();
        let (status, json) = post_command(make_router(state.clone()), &["runonce"]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "success");
        assert_eq!(
            json["output"],
            serde_json::json!([
                "autofarm: changing farm #1 from NONE to mushroom helmet plump",
                "autofarm: changing farm #2 from NONE to mushroom helmet plump",
            ])
        );
        let sim = state.sim.lock();
        assert!(sim
            .fortress
            .plots
            .iter()
            .all(|p| p.crops[0] == Some(PLUMP_HELMET)));
        assert_eq!(
            sim.controller.state().last_counts().get(&PIG_TAIL),
            Some(&80)
        );
    }

    #[tokio::test]
    async fn test_command_enable_then_status() {
        let state = make_test_state();
        let (status, _) = post_command(make_router(state.clone()), &["enable"]).await;
        assert_eq!(status, StatusCode::OK);
        let (_, json) = post_command(make_router(state), &[]).await;
        assert_eq!(json["output"][0], "Autofarm is Active.");
    }

    #[tokio::test]
    async fn test_command_usage_error_is_bad_request() {
        let (status, json) = post_command(make_router(make_test_state()), &["sideways"]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["outcome"], "usage_error");
        assert_eq!(json["output"][0], farm_control::USAGE);
    }

    #[tokio::test]
    async fn test_command_unknown_plant_is_bad_request() {
        let state = make_test_state();
        let (status, json) =
            post_command(make_router(state.clone()), &["threshold", "10", "NOT_A_PLANT"]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["output"][0], "Cannot find plant with id NOT_A_PLANT");
        assert_eq!(
            state.sim.lock().controller.state().threshold(PlantId(0)),
            50
        );
    }

    #[tokio::test]
    async fn test_pause_and_resume_toggle_flag() {
        let state = make_test_state();
        let response = make_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/pause")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.paused.load(Ordering::Relaxed));

        let (_, json) = get_json(make_router(state.clone()), "/api/v1/meta").await;
        assert_eq!(json["paused"], true);

        make_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/resume")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(!state.paused.load(Ordering::Relaxed));
    }
}
