//! Live anomaly aggregation: the deduplicating buffer, scoring, snapshot synthesis and
//! the session state machine over a [`crate::stream::StreamChannel`].

mod anomaly;
mod buffer;
mod handle;
mod live_session;
mod snapshot;

pub use anomaly::{AnomalyEvent, Classification, GeoLocation, Severity};
pub use buffer::AnomalyBuffer;
pub use handle::{SessionError, SessionEvent, SessionHandle};
pub use live_session::{ConnectionState, LiveSession};
pub use snapshot::{AlertBucket, BucketGranularity, CoverageEntry, DashboardSnapshot, HeaderMetrics, SnapshotPatch};
