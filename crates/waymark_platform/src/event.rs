//! Viewport change notifications

/// Notifications a host forwards to the tracker
///
/// Events carry no payload. The tracker always reads the live values back
/// from the [`ScrollHost`](crate::ScrollHost) when it handles one, so a
/// coalesced burst of events still observes the latest state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
    /// The scroll position along the tracked axis changed
    Scrolled,
    /// The viewport or the scrollable content changed size
    Resized,
}

impl ViewportEvent {
    /// Short lowercase name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ViewportEvent::Scrolled => "scroll",
            ViewportEvent::Resized => "resize",
        }
    }
}
