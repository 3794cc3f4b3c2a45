//! Infinite scroll pager
//!
//! Shows a growing prefix of a data set. The pager registers a checkpoint
//! on its container's bottom edge; scrolling down past it reveals the next
//! page. While a page is loading (the host is laying out and animating the
//! new items) further crossings are ignored, and once every item is visible
//! the pager stops growing.
//!
//! ```text
//! Down crossing -> load_more() -> host lays out -> finish_loading() -> tracker.refresh()
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;
use waymark_core::{
    Alignment, CheckpointId, CheckpointSpec, CrossContext, Direction, Offset, ScrollHost,
    TargetId, Tracker,
};

use crate::error::Result;

/// Pagination settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagerOptions {
    /// Leading items always shown, outside pagination
    pub skip: usize,
    /// Items added per page; zero shows everything
    pub paginate: usize,
    /// Pages shown initially
    pub default_pagination: usize,
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self {
            skip: 0,
            paginate: 6,
            default_pagination: 1,
        }
    }
}

impl PagerOptions {
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_paginate(mut self, paginate: usize) -> Self {
        self.paginate = paginate;
        self
    }

    pub fn with_default_pagination(mut self, pages: usize) -> Self {
        self.default_pagination = pages;
        self
    }
}

/// The skipped prefix plus `page` pages after it
pub fn paginate<T: Clone>(data: &[T], options: &PagerOptions, page: usize) -> Vec<T> {
    if options.paginate == 0 {
        return data.to_vec();
    }
    let end = options
        .skip
        .saturating_add(options.paginate.saturating_mul(page))
        .min(data.len());
    data[..end].to_vec()
}

/// Offset of the load trigger: a tenth of a viewport past its bottom
const LOAD_OFFSET: Offset = Offset::Fraction(1.1);

struct PagerState<T> {
    options: PagerOptions,
    data: Vec<T>,
    page: usize,
    visible: Vec<T>,
    loading: bool,
}

impl<T: Clone> PagerState<T> {
    fn new(data: Vec<T>, options: PagerOptions) -> Self {
        let mut state = Self {
            options,
            data,
            page: 0,
            visible: Vec::new(),
            loading: false,
        };
        state.reset();
        state
    }

    fn reset(&mut self) {
        self.page = self.options.default_pagination;
        self.visible = paginate(&self.data, &self.options, self.page);
        self.loading = false;
    }

    fn is_complete(&self) -> bool {
        self.visible.len() == self.data.len()
    }

    fn load_more(&mut self) -> bool {
        if self.loading || self.is_complete() {
            return false;
        }
        self.loading = true;
        self.page += 1;
        self.visible = paginate(&self.data, &self.options, self.page);
        debug!(page = self.page, visible = self.visible.len(), "loaded next page");
        true
    }
}

/// Custom data equality: `(current, next) -> same`
pub type DataComparator<T> = Rc<dyn Fn(&[T], &[T]) -> bool>;

/// Checkpoint-driven pager over a data set
pub struct InfiniteScroll<T> {
    state: Rc<RefCell<PagerState<T>>>,
    container: Option<TargetId>,
    checkpoint: Option<CheckpointId>,
    comparator: Option<DataComparator<T>>,
}

impl<T: Clone + PartialEq + 'static> InfiniteScroll<T> {
    pub fn new(data: Vec<T>, options: PagerOptions) -> Self {
        Self {
            state: Rc::new(RefCell::new(PagerState::new(data, options))),
            container: None,
            checkpoint: None,
            comparator: None,
        }
    }

    /// Decide whether new data is the same as the current data with
    /// `comparator` instead of item-by-item equality
    pub fn with_data_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&[T], &[T]) -> bool + 'static,
    {
        self.comparator = Some(Rc::new(comparator));
        self
    }

    /// Snapshot of the items currently shown
    ///
    /// The pager state is never left borrowed, so a crossing can always
    /// load the next page.
    pub fn visible(&self) -> Vec<T> {
        self.state.borrow().visible.clone()
    }

    pub fn page(&self) -> usize {
        self.state.borrow().page
    }

    pub fn options(&self) -> PagerOptions {
        self.state.borrow().options
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Every item is visible
    pub fn is_complete(&self) -> bool {
        self.state.borrow().is_complete()
    }

    pub fn checkpoint(&self) -> Option<CheckpointId> {
        self.checkpoint
    }

    /// Reveal the next page now, as a downward crossing would
    pub fn load_more(&self) -> bool {
        self.state.borrow_mut().load_more()
    }

    /// Watch `container` and load pages as its bottom comes into view
    ///
    /// Nothing is registered when all data is already visible.
    pub fn attach<H: ScrollHost + ?Sized>(
        &mut self,
        tracker: &mut Tracker,
        host: &H,
        container: TargetId,
    ) -> Result<Option<CheckpointId>> {
        self.detach(tracker);
        self.container = Some(container);
        self.sync(tracker, host)?;
        Ok(self.checkpoint)
    }

    /// Stop watching the container
    pub fn detach(&mut self, tracker: &mut Tracker) {
        if let Some(container) = self.container.take() {
            tracker.unregister(container);
        }
        self.checkpoint = None;
    }

    /// The host finished laying out the newly loaded page
    pub fn finish_loading<H: ScrollHost + ?Sized>(&self, tracker: &mut Tracker, host: &H) {
        self.state.borrow_mut().loading = false;
        tracker.refresh(host);
    }

    /// Replace the data; pagination restarts if it differs
    ///
    /// Data is compared with the comparator when one is set, item by item
    /// otherwise.
    pub fn set_data<H: ScrollHost + ?Sized>(
        &mut self,
        data: Vec<T>,
        tracker: &mut Tracker,
        host: &H,
    ) -> Result<bool> {
        {
            let mut state = self.state.borrow_mut();
            let same = match &self.comparator {
                Some(same) => same(&state.data, &data),
                None => state.data == data,
            };
            if same {
                return Ok(false);
            }
            state.data = data;
            state.reset();
        }
        self.sync(tracker, host)?;
        Ok(true)
    }

    /// Replace the options; pagination restarts if any value changed
    pub fn set_options<H: ScrollHost + ?Sized>(
        &mut self,
        options: PagerOptions,
        tracker: &mut Tracker,
        host: &H,
    ) -> Result<bool> {
        {
            let mut state = self.state.borrow_mut();
            if state.options == options {
                return Ok(false);
            }
            state.options = options;
            state.reset();
        }
        self.sync(tracker, host)?;
        Ok(true)
    }

    /// Register the load checkpoint if needed, otherwise refresh thresholds
    fn sync<H: ScrollHost + ?Sized>(&mut self, tracker: &mut Tracker, host: &H) -> Result<()> {
        let Some(container) = self.container else {
            return Ok(());
        };
        let registered = self
            .checkpoint
            .is_some_and(|id| tracker.checkpoint(id).is_some());

        if registered || self.is_complete() {
            tracker.refresh(host);
            return Ok(());
        }

        let spec = CheckpointSpec::new(load_handler(Rc::downgrade(&self.state)))
            .target(container)
            .alignment(Alignment::Bottom)
            .offset(LOAD_OFFSET);
        self.checkpoint = tracker.register(host, spec)?.single();
        Ok(())
    }
}

fn load_handler<T: Clone + 'static>(
    state: Weak<RefCell<PagerState<T>>>,
) -> impl Fn(&mut CrossContext<'_>) -> anyhow::Result<()> + 'static {
    move |cx: &mut CrossContext<'_>| {
        if cx.direction() != Direction::Down {
            return Ok(());
        }
        let Some(state) = state.upgrade() else {
            // Pager dropped without detaching
            cx.unregister(cx.target());
            return Ok(());
        };
        let mut state = state
            .try_borrow_mut()
            .map_err(|_| anyhow::anyhow!("pager state is borrowed during a crossing"))?;
        state.load_more();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use waymark_core::testing::MockHost;
    use waymark_core::{Geometry, TrackerConfig, ViewportEvent};

    use super::*;

    fn options(skip: usize, paginate: usize, pages: usize) -> PagerOptions {
        PagerOptions::default()
            .with_skip(skip)
            .with_paginate(paginate)
            .with_default_pagination(pages)
    }

    fn data() -> Vec<u32> {
        (1..=10).collect()
    }

    #[test]
    fn test_paginate_without_skip() {
        assert_eq!(paginate(&data(), &options(0, 2, 1), 1).len(), 2);
        assert_eq!(paginate(&data(), &options(0, 2, 2), 2).len(), 4);
    }

    #[test]
    fn test_paginate_with_skip() {
        assert_eq!(paginate(&data(), &options(3, 2, 1), 1), vec![1, 2, 3, 4, 5]);
        assert_eq!(paginate(&data(), &options(3, 2, 2), 2).len(), 7);
    }

    #[test]
    fn test_paginate_stops_at_data_end() {
        assert_eq!(paginate(&data(), &options(0, 20, 1), 1).len(), 10);
        assert_eq!(paginate(&data(), &options(0, 7, 2), 2).len(), 10);
        assert_eq!(paginate(&data(), &options(0, 0, 1), 1).len(), 10);
    }

    /// Viewport 800, container 0..1000 on a 1000px page
    fn setup(pager_options: PagerOptions) -> (MockHost, TargetId, Tracker, InfiniteScroll<u32>) {
        let mut host = MockHost::new(800.0, 1000.0);
        let container = host.add_element(Geometry::new(0.0, 1000.0));
        let mut tracker = Tracker::new(TrackerConfig::testing());
        tracker.init(&host);
        let pager = InfiniteScroll::new(data(), pager_options);
        (host, container, tracker, pager)
    }

    fn scroll(tracker: &mut Tracker, host: &mut MockHost, offset: f32) {
        host.scroll_to(offset);
        tracker.handle_event(&*host, ViewportEvent::Scrolled, std::time::Instant::now());
    }

    #[test]
    fn test_scrolling_down_loads_next_page() {
        let (mut host, container, mut tracker, mut pager) = setup(options(0, 2, 1));
        let id = pager
            .attach(&mut tracker, &host, container)
            .unwrap()
            .unwrap();
        // bottom 1000 minus 1.1 viewports
        let threshold = tracker.checkpoint(id).unwrap().threshold();
        assert!((threshold - 120.0).abs() < 0.01);
        assert_eq!(pager.visible().len(), 2);

        scroll(&mut tracker, &mut host, 200.0);
        assert_eq!(pager.page(), 2);
        assert_eq!(pager.visible().len(), 4);
        assert!(pager.is_loading());
    }

    #[test]
    fn test_crossings_ignored_while_loading_or_scrolling_up() {
        let (mut host, container, mut tracker, mut pager) = setup(options(0, 2, 1));
        pager.attach(&mut tracker, &host, container).unwrap();

        scroll(&mut tracker, &mut host, 200.0);
        scroll(&mut tracker, &mut host, 0.0);
        scroll(&mut tracker, &mut host, 300.0);
        assert_eq!(pager.page(), 2);

        host.move_element(container, Geometry::new(0.0, 1000.0));
        pager.finish_loading(&mut tracker, &host);
        assert!(!pager.is_loading());
        scroll(&mut tracker, &mut host, 0.0);
        scroll(&mut tracker, &mut host, 300.0);
        assert_eq!(pager.page(), 3);
    }

    #[test]
    fn test_stops_when_complete() {
        let (mut host, container, mut tracker, mut pager) = setup(options(0, 7, 1));
        pager.attach(&mut tracker, &host, container).unwrap();
        scroll(&mut tracker, &mut host, 200.0);
        assert!(pager.is_complete());
        pager.finish_loading(&mut tracker, &host);

        scroll(&mut tracker, &mut host, 0.0);
        scroll(&mut tracker, &mut host, 300.0);
        assert_eq!(pager.page(), 2);
        assert_eq!(pager.visible().len(), 10);
    }

    #[test]
    fn test_attach_skipped_when_everything_visible() {
        let (host, container, mut tracker, mut pager) = setup(options(0, 20, 1));
        assert_eq!(pager.attach(&mut tracker, &host, container).unwrap(), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_new_data_resets_pagination() {
        let (mut host, container, mut tracker, mut pager) = setup(options(0, 2, 1));
        pager.attach(&mut tracker, &host, container).unwrap();
        scroll(&mut tracker, &mut host, 200.0);
        assert_eq!(pager.visible().len(), 4);

        assert!(!pager.set_data(data(), &mut tracker, &host).unwrap());
        assert!(pager.set_data(vec![5, 6, 7, 8], &mut tracker, &host).unwrap());
        assert_eq!(pager.visible(), vec![5, 6]);
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_new_options_reset_pagination() {
        let (host, container, mut tracker, mut pager) = setup(options(0, 20, 1));
        pager.attach(&mut tracker, &host, container).unwrap();
        assert!(tracker.is_empty());

        assert!(pager
            .set_options(options(3, 2, 1), &mut tracker, &host)
            .unwrap());
        assert_eq!(pager.visible().len(), 5);
        // More data to show now, so the load checkpoint gets registered
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_detach_unregisters() {
        let (host, container, mut tracker, mut pager) = setup(options(0, 2, 1));
        pager.attach(&mut tracker, &host, container).unwrap();
        assert_eq!(tracker.len(), 1);
        pager.detach(&mut tracker);
        assert!(tracker.is_empty());
        assert_eq!(pager.checkpoint(), None);
    }

    #[test]
    fn test_dropped_pager_unregisters_itself() {
        let (mut host, container, mut tracker, mut pager) = setup(options(0, 2, 1));
        pager.attach(&mut tracker, &host, container).unwrap();
        drop(pager);
        scroll(&mut tracker, &mut host, 200.0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_data_comparator_decides_reset() {
        let (mut host, container, mut tracker, pager) = setup(options(0, 2, 1));
        // same when lengths match
        let mut pager = pager.with_data_comparator(|a: &[u32], b: &[u32]| a.len() == b.len());
        pager.attach(&mut tracker, &host, container).unwrap();
        scroll(&mut tracker, &mut host, 200.0);
        assert_eq!(pager.page(), 2);

        let shuffled: Vec<u32> = (11..=20).collect();
        assert!(!pager.set_data(shuffled, &mut tracker, &host).unwrap());
        assert_eq!(pager.page(), 2);

        assert!(pager.set_data(vec![1, 2, 3], &mut tracker, &host).unwrap());
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.visible(), vec![1, 2]);
    }

    #[test]
    fn test_held_snapshot_does_not_block_loading() {
        let (mut host, container, mut tracker, mut pager) = setup(options(0, 2, 1));
        pager.attach(&mut tracker, &host, container).unwrap();

        let shown = pager.visible();
        scroll(&mut tracker, &mut host, 200.0);

        assert_eq!(shown, vec![1, 2]);
        assert_eq!(pager.page(), 2);
        assert_eq!(pager.visible().len(), 4);
    }
}
