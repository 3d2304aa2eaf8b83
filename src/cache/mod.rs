//! Choplink query cache.
//!
//! Holds query results keyed by segment tuples, collapses concurrent fetches
//! of the same key into one request, and lets writes invalidate every query
//! under a key prefix.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `choplink.toml`:
//!
//! ```toml
//! [cache]
//! stale_seconds = 30
//! retry = 1
//! retry_delay_ms = 1000
//! max_entries = 500
//! ```

mod clock;
mod config;
mod keys;
mod lock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::{EntityChange, KeySegment, QueryKey};
pub use store::{QueryCache, QueryState};
