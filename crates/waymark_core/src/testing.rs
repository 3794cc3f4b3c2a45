//! In-memory host and crossing recorder for tests

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::SlotMap;
use waymark_platform::{Geometry, ScrollHost, TargetId};

use crate::checkpoint::{CrossContext, Direction};

/// A scrollable page held entirely in memory
#[derive(Clone, Debug)]
pub struct MockHost {
    viewport_height: f32,
    content_height: f32,
    scroll_offset: f32,
    elements: SlotMap<TargetId, Geometry>,
}

impl MockHost {
    pub fn new(viewport_height: f32, content_height: f32) -> Self {
        Self {
            viewport_height,
            content_height,
            scroll_offset: 0.0,
            elements: SlotMap::with_key(),
        }
    }

    pub fn add_element(&mut self, geometry: Geometry) -> TargetId {
        self.elements.insert(geometry)
    }

    pub fn move_element(&mut self, target: TargetId, geometry: Geometry) {
        if let Some(slot) = self.elements.get_mut(target) {
            *slot = geometry;
        }
    }

    pub fn remove_element(&mut self, target: TargetId) -> Option<Geometry> {
        self.elements.remove(target)
    }

    pub fn scroll_to(&mut self, offset: f32) {
        self.scroll_offset = offset;
    }

    pub fn resize(&mut self, viewport_height: f32, content_height: f32) {
        self.viewport_height = viewport_height;
        self.content_height = content_height;
    }
}

impl ScrollHost for MockHost {
    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn content_height(&self) -> f32 {
        self.content_height
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    fn geometry(&self, target: TargetId) -> Option<Geometry> {
        self.elements.get(target).copied()
    }
}

/// Shared log of `(direction, target)` crossings
#[derive(Clone, Debug, Default)]
pub struct CrossingLog(Rc<RefCell<Vec<(Direction, TargetId)>>>);

impl CrossingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A checkpoint handler that appends to this log
    pub fn handler(&self) -> impl Fn(&mut CrossContext<'_>) -> anyhow::Result<()> + 'static {
        let entries = self.0.clone();
        move |cx: &mut CrossContext<'_>| {
            entries.borrow_mut().push((cx.direction(), cx.target()));
            Ok(())
        }
    }

    /// Drain everything recorded so far
    pub fn take(&self) -> Vec<(Direction, TargetId)> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
