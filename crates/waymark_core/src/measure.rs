//! Cached viewport and content measurements

use waymark_platform::ScrollHost;

use crate::offset::Offset;

/// Viewport and content heights as of the last refresh
///
/// Values are stale until [`Measurements::measure`] runs again; the tracker
/// re-measures on `init`, `refresh`, and settled resize events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Measurements {
    pub viewport_height: f32,
    pub content_height: f32,
}

impl Measurements {
    pub fn new(viewport_height: f32, content_height: f32) -> Self {
        Self {
            viewport_height,
            content_height,
        }
    }

    /// Read fresh measurements from the host
    pub fn measure<H: ScrollHost + ?Sized>(host: &H) -> Self {
        Self::new(host.viewport_height(), host.content_height())
    }

    /// Distance from the viewport top at which `offset` triggers
    pub fn convert_offset(&self, offset: Offset) -> f32 {
        offset.resolve(self.viewport_height)
    }

    /// Clamp a page coordinate into `[0, content_height]`
    ///
    /// Applied as max-then-min, so a negative content height yields it.
    pub fn within_page_bounds(&self, value: f32) -> f32 {
        value.max(0.0).min(self.content_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_page_bounds() {
        let m = Measurements::new(800.0, 3000.0);
        assert_eq!(m.within_page_bounds(-50.0), 0.0);
        assert_eq!(m.within_page_bounds(1200.0), 1200.0);
        assert_eq!(m.within_page_bounds(5000.0), 3000.0);
    }

    #[test]
    fn test_convert_offset_uses_viewport() {
        let m = Measurements::new(800.0, 3000.0);
        assert_eq!(m.convert_offset(Offset::Fraction(0.25)), 200.0);
        assert_eq!(m.convert_offset(Offset::PixelsFromBottom(100)), 700.0);
    }
}
