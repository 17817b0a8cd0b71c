//! Correlation identifier for one request.
//!
//! The trace middleware puts a [`TraceId`] in task-local storage for the life
//! of a request. Domain errors copy it into their `traceId` field, so an
//! agent's failed submission can be matched to the service's log lines
//! without threading the id through every port signature.
//!
//! Task-locals do not follow `tokio::spawn` or `spawn_blocking`; wrap such
//! work in [`TraceId::scope`] when the id must survive the hop.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// UUID identifying one request across logs, error bodies and the
/// `trace-id` response header.
///
/// # Examples
/// ```
/// use inventory_backend::domain::TraceId;
///
/// let supplied = TraceId::parse_or_generate(Some("6f1c1a52-7f8e-4a53-9a31-54f0b1e1d9a0"));
/// assert_eq!(supplied.to_string(), "6f1c1a52-7f8e-4a53-9a31-54f0b1e1d9a0");
///
/// let fresh = TraceId::parse_or_generate(Some("not-a-uuid"));
/// assert_ne!(fresh.to_string(), "not-a-uuid");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// A fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a caller-supplied identifier when it is a UUID, otherwise
    /// generate one.
    #[must_use]
    pub fn parse_or_generate(supplied: Option<&str>) -> Self {
        supplied
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// The identifier in scope for the running task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Drive `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }

    /// Run `f` with `trace_id` in scope.
    ///
    /// Middleware needs this because the inner service's `call` runs before
    /// the returned future is first polled.
    pub fn sync_scope<R>(trace_id: Self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(trace_id, f)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("WS-001"))]
    fn unusable_input_yields_a_fresh_identifier(#[case] supplied: Option<&str>) {
        let id = TraceId::parse_or_generate(supplied);
        assert_eq!(id.0.get_version_num(), 4);
    }

    #[rstest]
    fn supplied_uuid_is_kept_after_trimming() {
        let id = TraceId::parse_or_generate(Some(" 00000000-0000-0000-0000-000000000001 "));
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000001");
    }

    #[tokio::test]
    async fn scope_exposes_the_identifier_to_the_future() {
        let expected = TraceId::generate();
        let observed = TraceId::scope(expected, async { TraceId::current() }).await;
        assert_eq!(observed, Some(expected));
        assert!(TraceId::current().is_none());
    }

    #[rstest]
    fn sync_scope_exposes_the_identifier() {
        let expected = TraceId::generate();
        assert_eq!(TraceId::sync_scope(expected, TraceId::current), Some(expected));
        assert!(TraceId::current().is_none());
    }
}
