//! # Gatecheck Testing
//!
//! Testing utilities and helpers for the gatecheck workspace.
//!
//! This crate provides:
//! - A fixed clock for deterministic admission timestamps
//! - In-memory ticket stores (table-backed and scripted)
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use gatecheck_testing::{stored_ticket, test_clock, InMemoryTicketStore};
//!
//! #[tokio::test]
//! async fn admits_fresh_ticket() {
//!     let store = InMemoryTicketStore::new(25)
//!         .with_row(stored_ticket("T-1", "EVT-1", "fan@example.com"));
//!     let engine = ValidationEngine::new(Arc::new(store), ValidationConfig::default());
//!
//!     let decision = engine.validate("EVT-1", "T-1", None).await;
//!     assert!(decision.is_admit());
//! }
//! ```

use chrono::{DateTime, Utc};
use gatecheck_core::environment::Clock;

pub mod reducer_test;
pub mod store_mocks;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, so admission timestamps are predictable.
    ///
    /// # Example
    ///
    /// ```
    /// use gatecheck_testing::mocks::FixedClock;
    /// use gatecheck_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};
pub use store_mocks::{stored_ticket, InMemoryTicketStore, ListCall, ScriptedTicketStore};
