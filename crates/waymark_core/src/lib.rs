//! Waymark Core
//!
//! A viewport-relative checkpoint tracker. It watches a scrollable surface,
//! keeps a set of registered checkpoints (a target element plus a trigger
//! rule), and calls a direction-aware handler whenever the scroll offset
//! crosses a checkpoint's threshold.
//!
//! - **Measurement Cache**: viewport and content heights, refreshed on demand
//! - **Trigger Resolvers**: top/bottom/center anchors turned into thresholds
//! - **Registry**: checkpoints in registration order
//! - **Listener**: throttled scroll and debounced resize handling
//! - **Evaluator**: fires `Down`/`Up` crossings on state transitions
//!
//! # Example
//!
//! ```ignore
//! use std::time::Instant;
//! use waymark_core::testing::MockHost;
//! use waymark_core::{CheckpointSpec, Offset, Tracker, TrackerConfig};
//! use waymark_platform::{Geometry, ViewportEvent};
//!
//! let mut page = MockHost::new(800.0, 3000.0);
//! let hero = page.add_element(Geometry::new(1000.0, 200.0));
//!
//! let mut tracker = Tracker::new(TrackerConfig::testing());
//! tracker.init(&page);
//! tracker
//!     .register(
//!         &page,
//!         CheckpointSpec::new(|cx| {
//!             println!("crossed {}", cx.direction());
//!             Ok(())
//!         })
//!         .target(hero)
//!         .offset(Offset::Fraction(0.5)),
//!     )
//!     .unwrap();
//!
//! page.scroll_to(600.0);
//! tracker.handle_event(&page, ViewportEvent::Scrolled, Instant::now());
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod listener;
pub mod measure;
pub mod offset;
pub mod rate_limit;
pub mod registry;
pub mod tracker;
pub mod trigger;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use checkpoint::{
    Checkpoint, CheckpointId, CheckpointSpec, CrossContext, CrossHandler, Direction, Registration,
};
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use listener::ListenerState;
pub use measure::Measurements;
pub use offset::Offset;
pub use tracker::Tracker;
pub use trigger::Alignment;

// Re-export host types so consumers need only one import
pub use waymark_platform::{Geometry, ScrollHost, TargetId, ViewportEvent};
