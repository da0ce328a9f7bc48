//! Per-call request context.
//!
//! The [`RequestContext`] is threaded through the authorizer, the rule
//! resolver and every storage lookup. The RBAC core never inspects the
//! deadline itself; it exists so that storage backends doing real I/O can
//! give up once the caller has stopped waiting.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each authorization call, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy
/// to correlate.
///
/// # Example
///
/// ```
/// use praetor_rbac::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Context passed to every RBAC operation and storage lookup.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use praetor_rbac::RequestContext;
///
/// let ctx = RequestContext::new().with_timeout(Duration::from_millis(250));
/// assert!(!ctx.is_expired());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Creates a context with a fresh request ID and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            deadline: None,
        }
    }

    /// Creates a context for an existing request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            deadline: None,
        }
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The request ID.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
