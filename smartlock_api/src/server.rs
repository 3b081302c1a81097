//! Router, handlers and server loop.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use smartlock_common::hal::config::ServoConfig;
use smartlock_control::{ActionResult, ConfirmSource, Confirmation, LockCoordinator, LockError, LockSnapshot};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Servo angle presets [deg].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Angles {
    /// Resting angle.
    pub neutral: f64,
    /// Lock target.
    pub lock: f64,
    /// Unlock target.
    pub unlock: f64,
}

/// Servo timing [s].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Times {
    /// Travel time.
    #[serde(rename = "move")]
    pub move_time: f64,
    /// Hold time.
    pub hold: f64,
}

/// Pulse width bounds [s].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PulseWidth {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

/// Static servo settings echoed in every response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServoEcho {
    /// Momentary actuator, always idle between requests.
    pub status: &'static str,
    /// Actuator only simulates movement.
    pub dry_run: bool,
    /// Actuator driver name.
    pub driver: &'static str,
    /// PWM output pin.
    pub pin: u8,
    /// Angle presets.
    pub angles: Angles,
    /// Sweep timing.
    pub times: Times,
    /// Pulse width bounds.
    pub pulse_width: PulseWidth,
}

impl ServoEcho {
    /// Build from the servo section and the constructed actuator's identity.
    pub fn new(config: &ServoConfig, driver: &'static str, dry_run: bool) -> Self {
        Self {
            status: "idle",
            dry_run,
            driver,
            pin: config.pin,
            angles: Angles {
                neutral: config.neutral_angle,
                lock: config.lock_angle,
                unlock: config.unlock_angle,
            },
            times: Times {
                move_time: config.move_time,
                hold: config.hold_time,
            },
            pulse_width: PulseWidth {
                min: config.min_pulse_width,
                max: config.max_pulse_width,
            },
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<LockCoordinator>,
    servo: Arc<ServoEcho>,
}

impl AppState {
    /// Wrap a coordinator and its servo settings.
    pub fn new(coordinator: Arc<LockCoordinator>, servo: ServoEcho) -> Self {
        Self {
            coordinator,
            servo: Arc::new(servo),
        }
    }

    fn status(&self) -> StatusResponse {
        StatusResponse {
            snapshot: self.coordinator.snapshot(),
            servo: (*self.servo).clone(),
            last_action: None,
            action_confirm: None,
            warning: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    #[serde(flatten)]
    snapshot: LockSnapshot,
    #[serde(flatten)]
    servo: ServoEcho,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_confirm: Option<Confirmation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl StatusResponse {
    fn with_action(mut self, result: ActionResult) -> Self {
        self.last_action = Some(result.action.as_str());
        self.action_confirm = result.confirmation;
        self.warning = result
            .confirmation
            .filter(|c| !c.confirmed)
            .map(|c| unconfirmed_warning(result.action.as_str(), c.source));
        self
    }
}

fn unconfirmed_warning(action: &str, source: ConfirmSource) -> String {
    match source {
        ConfirmSource::NoSensor => {
            format!("no lock sensor available; '{action}' state is assumed")
        }
        _ => format!("lock sensor did not confirm '{action}' before the timeout"),
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(status))
        .route("/api/lock", post(lock))
        .route("/api/unlock", post(unlock))
        .route("/api/toggle", post(toggle))
        .route("/api/autolock", post(set_auto_lock))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router(state)` on `listener` until `shutdown` resolves.
///
/// # Errors
/// Forwards listener I/O errors.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.status())
}

async fn lock(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    run_action(state, LockCoordinator::lock).await
}

async fn unlock(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    run_action(state, LockCoordinator::unlock).await
}

async fn toggle(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    run_action(state, LockCoordinator::toggle).await
}

/// Run a blocking coordinator operation off the async workers.
async fn run_action(
    state: AppState,
    op: fn(&LockCoordinator) -> Result<ActionResult, LockError>,
) -> Result<Json<StatusResponse>, ApiError> {
    let coordinator = Arc::clone(&state.coordinator);
    let result = tokio::task::spawn_blocking(move || op(&coordinator))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(state.status().with_action(result)))
}

async fn set_auto_lock(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let seconds = parse_seconds(&body)?;
    state.coordinator.set_auto_lock_seconds(seconds);
    let mut response = state.status();
    response.last_action = Some("autolock_updated");
    Ok(Json(response))
}

/// Extract `seconds` from `{"seconds": 30}` or `{"seconds": "30"}`.
fn parse_seconds(body: &[u8]) -> Result<f64, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidSeconds(format!("body is not JSON: {e}")))?;
    let seconds = match value.get("seconds") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    seconds
        .filter(|s| s.is_finite())
        .ok_or_else(|| ApiError::InvalidSeconds("'seconds' must be a finite number".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds(br#"{"seconds": 30}"#).unwrap(), 30.0);
        assert_eq!(parse_seconds(br#"{"seconds": 2.5}"#).unwrap(), 2.5);
        assert_eq!(parse_seconds(br#"{"seconds": " 15 "}"#).unwrap(), 15.0);
        assert_eq!(parse_seconds(br#"{"seconds": -4}"#).unwrap(), -4.0);
    }

    #[test]
    fn test_parse_seconds_rejects() {
        let bodies: [&[u8]; 7] = [
            b"not json",
            br#"{}"#,
            br#"{"seconds": null}"#,
            br#"{"seconds": "soon"}"#,
            br#"{"seconds": "NaN"}"#,
            br#"{"seconds": "inf"}"#,
            br#"{"seconds": [1]}"#,
        ];
        for body in bodies {
            assert!(
                matches!(parse_seconds(body), Err(ApiError::InvalidSeconds(_))),
                "accepted {}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_servo_echo_json() {
        let echo = ServoEcho::new(&ServoConfig::default(), "simulation", true);
        let json = serde_json::to_value(echo).unwrap();
        assert_eq!(json["dryRun"], true);
        assert_eq!(json["pin"], 12);
        assert_eq!(json["angles"]["lock"], -85.0);
        assert_eq!(json["times"]["move"], 0.5);
        assert_eq!(json["pulseWidth"]["min"], 0.0005);
    }
}
