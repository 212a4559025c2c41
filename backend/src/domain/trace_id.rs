//! Per-request correlation identifier.
//!
//! The `Trace` middleware runs each request inside [`TraceId::scope`], so
//! error constructors pick the identifier up without it being threaded
//! through service signatures. Work moved onto another task with
//! `tokio::spawn` loses the scope unless it is wrapped again.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Header echoing the identifier on every response.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// UUID correlating one request's logs, response header and error body.
///
/// # Examples
/// ```
/// use institute::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let trace_id = TraceId::generate();
/// let seen = TraceId::scope(trace_id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(trace_id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Accept a client-supplied identifier.
    ///
    /// Only hyphenated, non-nil UUIDs are reused; anything else yields
    /// `None` so the caller generates its own.
    #[must_use]
    pub fn from_client(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != uuid::fmt::Hyphenated::LENGTH {
            return None;
        }
        Uuid::parse_str(raw)
            .ok()
            .filter(|uuid| !uuid.is_nil())
            .map(Self)
    }

    /// Identifier of the request being handled on this task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current identifier.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
