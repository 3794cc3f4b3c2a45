//! Waymark Host Abstraction Layer
//!
//! This crate describes everything the checkpoint tracker needs from the
//! view layer that hosts it, without depending on any particular one.
//!
//! # Architecture
//!
//! The host abstraction is built around one trait and one event type:
//!
//! - [`ScrollHost`] - Supplies viewport size, content size, scroll offset,
//!   and per-element geometry in page coordinates
//! - [`ViewportEvent`] - Change notifications the host forwards to the tracker
//!
//! Elements are owned by the host and referred to through [`TargetId`]
//! handles. A handle whose element is gone simply stops resolving, which is
//! how the tracker learns that a watched element was removed.
//!
//! # Example
//!
//! ```ignore
//! use waymark_platform::*;
//!
//! struct Page { /* ... */ }
//!
//! impl ScrollHost for Page {
//!     fn viewport_height(&self) -> f32 { 800.0 }
//!     fn content_height(&self) -> f32 { 3000.0 }
//!     fn scroll_offset(&self) -> f32 { 0.0 }
//!     fn geometry(&self, target: TargetId) -> Option<Geometry> { None }
//! }
//! ```

mod event;
mod host;

// Re-export all public types
pub use event::ViewportEvent;
pub use host::{Geometry, ScrollHost, TargetId};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::event::ViewportEvent;
    pub use crate::host::{Geometry, ScrollHost, TargetId};
}
