use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed one-second window shared by every submission route.
/// Each submission costs two model calls, so the window protects the API quota.
#[derive(Clone, Debug)]
pub struct SubmitThrottle {
    rps: u32,
    window: Arc<Mutex<WindowState>>,
}

impl SubmitThrottle {
    pub fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            window: Arc::new(Mutex::new(WindowState {
                start: Instant::now(),
                count: 0,
            })),
        }
    }

    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    fn allow_at(&self, now: Instant) -> bool {
        let mut guard = self.window.lock().unwrap_or_else(|p| p.into_inner());
        if now.duration_since(guard.start) >= Duration::from_secs(1) {
            guard.start = now;
            guard.count = 0;
        }
        if guard.count < self.rps {
            guard.count += 1;
            true
        } else {
            false
        }
    }
}

pub async fn throttle_middleware(
    State(throttle): State<SubmitThrottle>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !throttle.allow() {
        tracing::warn!(path = %req.uri().path(), "submission throttled");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": "Too many submissions. Please wait a moment and try again."})),
        )
            .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_rps_within_one_window() {
        let throttle = SubmitThrottle::new(2);
        let now = Instant::now();

        assert!(throttle.allow_at(now));
        assert!(throttle.allow_at(now));
        assert!(!throttle.allow_at(now + Duration::from_millis(500)));
    }

    #[test]
    fn window_resets_after_one_second() {
        let throttle = SubmitThrottle::new(1);
        let now = Instant::now();

        assert!(throttle.allow_at(now));
        assert!(!throttle.allow_at(now));
        assert!(throttle.allow_at(now + Duration::from_secs(1)));
    }

    #[test]
    fn zero_rps_still_admits_one() {
        let throttle = SubmitThrottle::new(0);
        assert!(throttle.allow());
    }
}
