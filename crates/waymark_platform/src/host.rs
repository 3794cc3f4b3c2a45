//! Host trait and element geometry

use slotmap::new_key_type;

new_key_type! {
    /// Handle to an element owned by the host
    ///
    /// The tracker stores handles, never elements. Once the host drops the
    /// element its handle stops resolving in [`ScrollHost::geometry`].
    pub struct TargetId;
}

/// Vertical geometry of an element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Geometry {
    /// Top edge in page coordinates (viewport coordinates when `pinned`)
    pub top: f32,
    /// Height in pixels
    pub height: f32,
    /// Whether the element is fixed relative to the viewport
    ///
    /// Pinned elements report `top` relative to the viewport, so the current
    /// scroll offset has to be added back to get a page coordinate.
    pub pinned: bool,
}

impl Geometry {
    /// Create geometry for an element laid out in the page
    pub fn new(top: f32, height: f32) -> Self {
        Self {
            top,
            height,
            pinned: false,
        }
    }

    /// Mark the element as pinned to the viewport
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Vertical center
    pub fn center(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// The view layer a tracker observes
///
/// Implemented by whatever owns the scrollable surface. All reads are
/// expected to be cheap and infallible; a missing element is reported by
/// returning `None` from [`geometry`](ScrollHost::geometry).
pub trait ScrollHost {
    /// Current viewport height
    fn viewport_height(&self) -> f32;

    /// Maximal scrollable content height
    fn content_height(&self) -> f32;

    /// Current scroll offset along the tracked axis
    fn scroll_offset(&self) -> f32;

    /// Current geometry of an element, or `None` if it no longer exists
    fn geometry(&self, target: TargetId) -> Option<Geometry>;
}

impl<T: ScrollHost + ?Sized> ScrollHost for &T {
    fn viewport_height(&self) -> f32 {
        (**self).viewport_height()
    }

    fn content_height(&self) -> f32 {
        (**self).content_height()
    }

    fn scroll_offset(&self) -> f32 {
        (**self).scroll_offset()
    }

    fn geometry(&self, target: TargetId) -> Option<Geometry> {
        (**self).geometry(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_edges() {
        let g = Geometry::new(1000.0, 200.0);
        assert_eq!(g.bottom(), 1200.0);
        assert_eq!(g.center(), 1100.0);
        assert!(!g.pinned);
        assert!(g.pinned().pinned);
    }
}
