//!
//! # Request Rate Limiting
//!
//! An in-memory sliding-window rate limiter, applied per client and per
//! endpoint. Authentication endpoints get deliberately tight budgets to slow
//! down credential stuffing; everything else falls back to a generous
//! default. `/health` is exempt.
//!
//! Limits are enforced by a middleware in the same `Transform`/`Service`
//! shape as `AuthMiddleware`; a breached budget surfaces as
//! `AppError::RateLimited` (HTTP 429).

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A request budget: at most `requests` per `window`.
#[derive(Debug, Clone, Copy)]
pub struct Limit {
    pub requests: usize,
    pub window: Duration,
}

impl Limit {
    pub const fn per_minute(requests: usize) -> Self {
        Self {
            requests,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Default)]
struct Windows {
    // Timestamps of recent requests, keyed by "client|path".
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl Windows {
    /// Drops every window whose newest hit lies outside `horizon`. Keys
    /// embed the request path, so one-shot clients would otherwise leave a
    /// permanent entry each.
    fn sweep(&mut self, now: Instant, horizon: Duration) {
        self.hits.retain(|_, window| {
            window
                .back()
                .map_or(false, |&newest| now.duration_since(newest) < horizon)
        });
        self.last_sweep = Some(now);
    }

    /// Records a hit and reports whether it stays within the budget.
    /// Returns `Err(retry_after)` when the budget is exhausted.
    fn check(&mut self, key: &str, limit: Limit, now: Instant) -> Result<(), Duration> {
        let window = self.hits.entry(key.to_string()).or_default();

        while let Some(&front) = window.front() {
            if now.duration_since(front) >= limit.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= limit.requests {
            let retry_after = match window.front() {
                Some(&oldest) => limit.window - now.duration_since(oldest),
                None => limit.window,
            };
            return Err(retry_after);
        }

        window.push_back(now);
        Ok(())
    }
}

/// Rate limiting middleware with per-endpoint budgets.
#[derive(Clone)]
pub struct RateLimiter {
    endpoint_limits: Arc<Vec<(&'static str, Limit)>>,
    default_limit: Limit,
    // Longest configured window; entries idle past it are reclaimable.
    max_window: Duration,
    state: Arc<Mutex<Windows>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        let endpoint_limits = vec![
            ("/api/auth/login", Limit::per_minute(5)),
            ("/api/auth/register", Limit::per_minute(3)),
        ];
        let default_limit = Limit::per_minute(100);
        let max_window = endpoint_limits
            .iter()
            .map(|(_, limit)| limit.window)
            .fold(default_limit.window, Duration::max);

        Self {
            endpoint_limits: Arc::new(endpoint_limits),
            default_limit,
            max_window,
            state: Arc::new(Mutex::new(Windows::default())),
        }
    }

    fn limit_for(&self, path: &str) -> Limit {
        self.endpoint_limits
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix))
            .map(|(_, limit)| *limit)
            .unwrap_or(self.default_limit)
    }

    fn check(&self, client: &str, path: &str) -> Result<(), Duration> {
        let limit = self.limit_for(path);
        let key = format!("{}|{}", client, path);
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Instant::now();
        // Keys embed client and path, so the map grows with traffic variety.
        // Reclaim idle entries at most once per max window.
        let due = state
            .last_sweep
            .map_or(true, |last| now.duration_since(last) >= self.max_window);
        if due {
            state.sweep(now, self.max_window);
        }

        state.check(&key, limit, now)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimiterService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterService {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterService<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.path() == "/health" {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let client = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        match self.limiter.check(&client, req.path()) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(retry_after) => {
                log::warn!(
                    "Rate limit exceeded for {} on {} (retry in {}s)",
                    client,
                    req.path(),
                    retry_after.as_secs()
                );
                let app_err = crate::error::AppError::RateLimited(format!(
                    "Rate limit exceeded, retry in {} seconds",
                    retry_after.as_secs().max(1)
                ));
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
