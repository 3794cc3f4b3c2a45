//! Scenario replay
//!
//! Builds an in-memory page from a [`Scenario`], registers its checkpoints,
//! and walks the step timeline on a simulated clock. Rate-limited calls
//! that fall due between steps are flushed at their exact deadline.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use tracing::{debug, info};
use waymark_core::{
    Alignment, CheckpointId, CheckpointSpec, CrossContext, Direction, Geometry, Offset,
    ScrollHost, TargetId, Tracker, ViewportEvent,
};

use crate::scenario::{CheckpointConfig, Scenario, Step};

/// Page described by a scenario, with elements addressed by name
#[derive(Debug, Default)]
pub struct SimHost {
    viewport_height: f32,
    content_height: f32,
    scroll_offset: f32,
    elements: SlotMap<TargetId, Geometry>,
    by_name: FxHashMap<String, TargetId>,
    names: FxHashMap<TargetId, String>,
}

impl SimHost {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut host = Self {
            viewport_height: scenario.page.viewport_height,
            content_height: scenario.page.content_height,
            scroll_offset: scenario.page.scroll_offset,
            ..Default::default()
        };
        for element in &scenario.elements {
            let mut geometry = Geometry::new(element.top, element.height);
            geometry.pinned = element.pinned;
            let id = host.elements.insert(geometry);
            host.by_name.insert(element.name.clone(), id);
            host.names.insert(id, element.name.clone());
        }
        host
    }

    pub fn target(&self, name: &str) -> Option<TargetId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, target: TargetId) -> &str {
        self.names.get(&target).map(String::as_str).unwrap_or("?")
    }

    fn apply_layout(&mut self, step: &Step) {
        if let Some(mv) = &step.move_element {
            if let Some(slot) = self.target(&mv.name).and_then(|id| self.elements.get_mut(id)) {
                slot.top = mv.top;
                if let Some(height) = mv.height {
                    slot.height = height;
                }
            }
        }
        if let Some(name) = &step.remove_element {
            if let Some(id) = self.target(name) {
                self.elements.remove(id);
            }
        }
    }
}

impl ScrollHost for SimHost {
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

/// One fired crossing
#[derive(Clone, Debug, PartialEq)]
pub struct CrossingRecord {
    pub at_ms: u64,
    pub direction: Direction,
    pub element: String,
    pub checkpoint: CheckpointId,
}

impl fmt::Display for CrossingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={} {} {} (checkpoint {})",
            self.at_ms, self.direction, self.element, self.checkpoint
        )
    }
}

/// Outcome of a replay
#[derive(Debug)]
pub struct ReplayReport {
    pub records: Vec<CrossingRecord>,
    /// Checkpoints still registered at the end
    pub remaining: usize,
    /// Whether the tracker was still listening at the end
    pub listening: bool,
}

/// Resolved threshold of one configured checkpoint
#[derive(Debug)]
pub struct ThresholdRow {
    pub element: String,
    pub alignment: Alignment,
    pub offset: Offset,
    /// `None` when a once-only checkpoint fired at registration
    pub checkpoint: Option<CheckpointId>,
    pub threshold: Option<f32>,
}

impl fmt::Display for ThresholdRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.checkpoint, self.threshold) {
            (Some(id), Some(threshold)) => write!(
                f,
                "{} {} {} offset={} threshold={}",
                id, self.element, self.alignment, self.offset, threshold
            ),
            _ => write!(
                f,
                "-- {} {} offset={} fired at registration",
                self.element, self.alignment, self.offset
            ),
        }
    }
}

type Fired = Rc<RefCell<Vec<(u64, Direction, TargetId, CheckpointId)>>>;

/// Simulated clock shared with the recording handler
struct Clock {
    base: Instant,
    now_ms: Rc<Cell<u64>>,
}

impl Clock {
    fn new() -> Self {
        Self {
            base: Instant::now(),
            now_ms: Rc::new(Cell::new(0)),
        }
    }

    fn set(&self, ms: u64) -> Instant {
        self.now_ms.set(ms);
        self.base + Duration::from_millis(ms)
    }

    fn millis(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.base).as_millis() as u64
    }
}

fn spec_for(
    host: &SimHost,
    config: &CheckpointConfig,
    spec: CheckpointSpec,
) -> Result<CheckpointSpec> {
    let target = host
        .target(&config.element)
        .with_context(|| format!("Unknown element '{}'", config.element))?;
    let mut spec = spec.target(target).fire_once(config.once);
    if let Some(name) = &config.alignment {
        spec = spec.alignment_name(name);
    }
    if let Some(offset) = config.offset {
        spec = spec.offset(offset);
    }
    Ok(spec)
}

/// Replay the scenario and collect every crossing in firing order
pub fn replay(scenario: &Scenario) -> Result<ReplayReport> {
    let mut host = SimHost::from_scenario(scenario);
    let mut tracker = Tracker::new(scenario.tracker.clone());
    let clock = Clock::new();
    let fired: Fired = Rc::default();

    tracker.init(&host);

    for config in &scenario.checkpoints {
        let log = fired.clone();
        let now_ms = clock.now_ms.clone();
        let handler = move |cx: &mut CrossContext<'_>| -> anyhow::Result<()> {
            log.borrow_mut()
                .push((now_ms.get(), cx.direction(), cx.target(), cx.checkpoint()));
            Ok(())
        };
        tracker.register(&host, spec_for(&host, config, CheckpointSpec::new(handler))?)?;
    }
    if scenario.finalize {
        tracker.finalize();
    }
    debug!(checkpoints = tracker.len(), "scenario registered");

    for step in &scenario.steps {
        flush(&mut tracker, &host, &clock, Some(step.at_ms));
        let now = clock.set(step.at_ms);

        host.apply_layout(step);
        if step.refresh {
            tracker.refresh(&host);
        }
        if let Some(offset) = step.scroll {
            host.scroll_offset = offset;
            tracker.handle_event(&host, ViewportEvent::Scrolled, now);
        }
        if let Some(resize) = &step.resize {
            host.viewport_height = resize.viewport_height;
            host.content_height = resize.content_height;
            tracker.handle_event(&host, ViewportEvent::Resized, now);
        }
    }
    flush(&mut tracker, &host, &clock, None);

    let records = fired
        .borrow()
        .iter()
        .map(|&(at_ms, direction, target, checkpoint)| CrossingRecord {
            at_ms,
            direction,
            element: host.name(target).to_string(),
            checkpoint,
        })
        .collect::<Vec<_>>();
    info!(
        crossings = records.len(),
        remaining = tracker.len(),
        "replay finished"
    );

    Ok(ReplayReport {
        records,
        remaining: tracker.len(),
        listening: tracker.is_enabled(),
    })
}

/// Tick at every deadline up to and including `until`
fn flush(tracker: &mut Tracker, host: &SimHost, clock: &Clock, until: Option<u64>) {
    let mut last = None;
    while let Some(deadline) = tracker.next_deadline() {
        let ms = clock.millis(deadline);
        if until.is_some_and(|until| ms > until) || last == Some(deadline) {
            break;
        }
        last = Some(deadline);
        let now = clock.set(ms);
        tracker.tick(host, now);
    }
}

/// Resolve every configured checkpoint at the page's initial state
pub fn thresholds(scenario: &Scenario) -> Result<Vec<ThresholdRow>> {
    let host = SimHost::from_scenario(scenario);
    let mut tracker = Tracker::new(scenario.tracker.clone());
    tracker.init(&host);

    let mut rows = Vec::with_capacity(scenario.checkpoints.len());
    for config in &scenario.checkpoints {
        let spec = spec_for(&host, config, CheckpointSpec::new(|_| Ok(())))?;
        let id = tracker.register(&host, spec)?.single();
        let point = id.and_then(|id| tracker.checkpoint(id));
        rows.push(ThresholdRow {
            element: config.element.clone(),
            alignment: point
                .map(|p| p.alignment())
                .unwrap_or_else(|| resolve_alignment(config, &tracker)),
            offset: point
                .map(|p| p.offset())
                .unwrap_or_else(|| config.offset.unwrap_or(tracker.config().default_offset)),
            checkpoint: id,
            threshold: point.map(|p| p.threshold()),
        });
    }
    Ok(rows)
}

fn resolve_alignment(config: &CheckpointConfig, tracker: &Tracker) -> Alignment {
    config
        .alignment
        .as_deref()
        .map(Alignment::parse_or_default)
        .unwrap_or(tracker.config().default_alignment)
}
