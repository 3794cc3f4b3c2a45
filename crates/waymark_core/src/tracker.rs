//! Checkpoint tracker
//!
//! Owns the measurement cache, the checkpoint registry, and the listener,
//! and drives evaluation from viewport events.
//!
//! # Event flow
//!
//! ```text
//! ViewportEvent::Scrolled --throttle--> read offset -> evaluate
//! ViewportEvent::Resized  --debounce--> read offset -> measure -> refresh thresholds -> evaluate
//! ```
//!
//! Rate limiting is driven by the caller's clock: every event carries an
//! [`Instant`], and [`Tracker::tick`] flushes calls that became due since.
//! [`Tracker::next_deadline`] says when to tick next.
//!
//! # Example
//!
//! ```ignore
//! let mut tracker = Tracker::new(TrackerConfig::standard());
//! tracker.init(&page);
//! tracker.register(&page, CheckpointSpec::new(|cx| {
//!     println!("{} {:?}", cx.direction(), cx.target());
//!     Ok(())
//! }).target(hero))?;
//!
//! // from the host's event loop
//! tracker.handle_event(&page, ViewportEvent::Scrolled, Instant::now());
//! ```

use std::time::Instant;

use tracing::{debug, trace, warn};
use waymark_platform::{ScrollHost, TargetId, ViewportEvent};

use crate::checkpoint::{
    Checkpoint, CheckpointId, CheckpointSpec, Command, CommandQueue, CrossContext, CrossHandler,
    Direction, Registration,
};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::listener::{Listener, ListenerState};
use crate::measure::Measurements;
use crate::offset::Offset;
use crate::registry::Registry;
use crate::trigger::{self, Alignment};

/// Watches a scrollable surface and fires checkpoint crossings
pub struct Tracker {
    config: TrackerConfig,
    listener: Listener,
    measurements: Measurements,
    current_offset: f32,
    finalized: bool,
    destroyed: bool,
    registry: Registry,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            listener: Listener::new(&config),
            config,
            measurements: Measurements::default(),
            current_offset: 0.0,
            finalized: false,
            destroyed: false,
            registry: Registry::new(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Measure the host, then start listening
    pub fn init<H: ScrollHost + ?Sized>(&mut self, host: &H) {
        if self.destroyed {
            return;
        }
        self.refresh_measurements(host);
        self.enable();
    }

    /// Start listening for viewport events; no-op if already listening
    pub fn enable(&mut self) {
        if self.destroyed {
            return;
        }
        if self.listener.enable() {
            debug!("checkpoint tracker enabled");
        }
    }

    /// Stop listening and drop pending rate-limited calls
    pub fn disable(&mut self) {
        if self.destroyed {
            return;
        }
        if self.listener.disable() {
            debug!("checkpoint tracker disabled");
        }
    }

    /// Tear everything down; the tracker stays inert afterwards
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.disable();
        self.registry.clear();
        self.measurements = Measurements::default();
        self.current_offset = 0.0;
        self.finalized = false;
        self.destroyed = true;
        debug!("checkpoint tracker destroyed");
    }

    /// Declare that no further checkpoints will be registered
    ///
    /// Once finalized, the tracker stops listening when a removal leaves the
    /// registry empty. Finalizing an empty tracker keeps it listening, so
    /// checkpoints registered afterwards still fire.
    pub fn finalize(&mut self) {
        if self.destroyed {
            return;
        }
        self.finalized = true;
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register one checkpoint per target in `spec`
    ///
    /// Each threshold is resolved immediately. A checkpoint already crossed
    /// at registration fires `Down` right away; a once-only one is then not
    /// kept, and its position in the result is `None`.
    pub fn register<H: ScrollHost + ?Sized>(
        &mut self,
        host: &H,
        spec: CheckpointSpec,
    ) -> Result<Registration> {
        let CheckpointSpec {
            targets,
            many,
            alignment,
            offset,
            fire_once,
            handler,
        } = spec;

        if self.destroyed {
            debug!("register called on a destroyed tracker");
            let ids = vec![None; targets.len()];
            return Ok(if many {
                Registration::Many(ids)
            } else {
                Registration::Single(None)
            });
        }

        if targets.is_empty() {
            return Err(TrackerError::InvalidInput(
                "checkpoint registration requires at least one target".to_string(),
            ));
        }

        let alignment = alignment.unwrap_or(self.config.default_alignment);
        let offset = offset.unwrap_or(self.config.default_offset);
        self.current_offset = host.scroll_offset();

        let mut commands = CommandQueue::new();
        let ids: Vec<Option<CheckpointId>> = targets
            .into_iter()
            .map(|target| {
                self.register_target(
                    host,
                    target,
                    alignment,
                    offset,
                    fire_once,
                    &handler,
                    &mut commands,
                )
            })
            .collect();

        self.apply(host, commands);

        Ok(if many {
            Registration::Many(ids)
        } else {
            Registration::Single(ids.into_iter().next().flatten())
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn register_target<H: ScrollHost + ?Sized>(
        &mut self,
        host: &H,
        target: TargetId,
        alignment: Alignment,
        offset: Offset,
        fire_once: bool,
        handler: &CrossHandler,
        commands: &mut CommandQueue,
    ) -> Option<CheckpointId> {
        let Some(geometry) = host.geometry(target) else {
            warn!(?target, "checkpoint target has no geometry, skipping");
            return None;
        };

        let threshold = trigger::resolve(
            alignment,
            &geometry,
            offset,
            &self.measurements,
            self.current_offset,
        );
        let id = self.registry.allocate_id();
        let has_crossed = self.current_offset >= threshold;

        if has_crossed {
            let mut cx = CrossContext::new(
                Direction::Down,
                target,
                id,
                threshold,
                self.current_offset,
                commands,
            );
            dispatch(handler, &mut cx);
            if fire_once {
                debug!(checkpoint = %id, threshold, "once-only checkpoint fired at registration");
                return None;
            }
        }

        debug!(checkpoint = %id, %alignment, %offset, threshold, "checkpoint registered");
        self.registry.insert(Checkpoint {
            id,
            target,
            alignment,
            offset,
            threshold,
            has_crossed,
            fire_once,
            handler: handler.clone(),
        });
        Some(id)
    }

    /// Remove every checkpoint watching `target`, returning how many went
    pub fn unregister(&mut self, target: TargetId) -> usize {
        if self.destroyed {
            return 0;
        }
        let removed = self.registry.remove_target(target);
        if removed > 0 {
            debug!(?target, removed, "checkpoints unregistered");
        }
        self.disable_if_drained();
        removed
    }

    /// Remove a single checkpoint
    pub fn remove(&mut self, id: CheckpointId) -> bool {
        if self.destroyed {
            return false;
        }
        let removed = self.registry.remove(id).is_some();
        if removed {
            debug!(checkpoint = %id, "checkpoint removed");
        }
        self.disable_if_drained();
        removed
    }

    fn disable_if_drained(&mut self) {
        if self.finalized && self.registry.is_empty() && self.listener.is_enabled() {
            debug!("finalized tracker drained, disabling");
            self.disable();
        }
    }

    // ========================================================================
    // Measurement and thresholds
    // ========================================================================

    /// Re-read viewport and content heights from the host
    pub fn refresh_measurements<H: ScrollHost + ?Sized>(&mut self, host: &H) {
        if self.destroyed {
            return;
        }
        self.measurements = Measurements::measure(host);
        trace!(
            viewport = self.measurements.viewport_height,
            content = self.measurements.content_height,
            "measured"
        );
    }

    /// Re-measure and recompute every threshold without waiting for a resize
    pub fn refresh<H: ScrollHost + ?Sized>(&mut self, host: &H) {
        if self.destroyed {
            return;
        }
        self.refresh_measurements(host);
        self.refresh_all(host);
    }

    /// Recompute every threshold from current geometry
    ///
    /// Crossing state is left alone. Checkpoints whose target no longer
    /// resolves are unregistered.
    pub fn refresh_all<H: ScrollHost + ?Sized>(&mut self, host: &H) {
        if self.destroyed {
            return;
        }
        let measurements = self.measurements;
        let current_offset = self.current_offset;
        let mut missing = Vec::new();

        for point in self.registry.iter_mut() {
            match host.geometry(point.target) {
                Some(geometry) => {
                    point.threshold = trigger::resolve(
                        point.alignment,
                        &geometry,
                        point.offset,
                        &measurements,
                        current_offset,
                    );
                }
                None => missing.push(point.target),
            }
        }

        for target in missing {
            debug!(?target, "checkpoint target disappeared");
            self.unregister(target);
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Compare the current offset against every checkpoint and fire crossings
    pub fn evaluate<H: ScrollHost + ?Sized>(&mut self, host: &H) {
        if self.destroyed {
            return;
        }
        let mut commands = CommandQueue::new();

        for id in self.registry.ids() {
            let Some(point) = self.registry.get(id) else {
                continue;
            };

            let direction = if self.current_offset >= point.threshold && !point.has_crossed {
                Direction::Down
            } else if self.current_offset <= point.threshold && point.has_crossed {
                Direction::Up
            } else {
                continue;
            };

            let handler = point.handler.clone();
            let target = point.target;
            let threshold = point.threshold;
            let fire_once = point.fire_once;

            trace!(checkpoint = %id, %direction, threshold, "crossing");
            let mut cx = CrossContext::new(
                direction,
                target,
                id,
                threshold,
                self.current_offset,
                &mut commands,
            );
            dispatch(&handler, &mut cx);

            if let Some(point) = self.registry.get_mut(id) {
                point.has_crossed = direction == Direction::Down;
            }
            if direction == Direction::Down && fire_once {
                self.remove(id);
            }
        }

        self.apply(host, commands);
    }

    fn apply<H: ScrollHost + ?Sized>(&mut self, host: &H, commands: CommandQueue) {
        for command in commands {
            if self.destroyed {
                break;
            }
            match command {
                Command::Register(spec) => {
                    if let Err(err) = self.register(host, spec) {
                        warn!("deferred registration failed: {}", err);
                    }
                }
                Command::Unregister(target) => {
                    self.unregister(target);
                }
                Command::Remove(id) => {
                    self.remove(id);
                }
                Command::Refresh => self.refresh(host),
                Command::Finalize => self.finalize(),
                Command::Disable => self.disable(),
            }
        }
    }

    // ========================================================================
    // Event handling
    // ========================================================================

    /// Feed a viewport notification from the host
    pub fn handle_event<H: ScrollHost + ?Sized>(
        &mut self,
        host: &H,
        event: ViewportEvent,
        now: Instant,
    ) {
        if self.destroyed || !self.listener.is_enabled() {
            trace!(event = event.name(), "ignored, not listening");
            return;
        }
        match event {
            ViewportEvent::Scrolled => {
                if self.listener.scrolled(now) {
                    self.on_scroll(host);
                }
            }
            ViewportEvent::Resized => self.listener.resized(now),
        }
        self.tick(host, now);
    }

    /// Run rate-limited handlers that are due at `now`
    pub fn tick<H: ScrollHost + ?Sized>(&mut self, host: &H, now: Instant) {
        if self.destroyed {
            return;
        }
        let due = self.listener.poll(now);
        if due.scroll {
            self.on_scroll(host);
        }
        if due.resize && self.listener.is_enabled() {
            self.on_resize(host);
        }
    }

    /// When the host should call [`tick`](Self::tick) next
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.destroyed {
            return None;
        }
        self.listener.next_deadline()
    }

    fn on_scroll<H: ScrollHost + ?Sized>(&mut self, host: &H) {
        self.current_offset = host.scroll_offset();
        self.evaluate(host);
    }

    fn on_resize<H: ScrollHost + ?Sized>(&mut self, host: &H) {
        self.current_offset = host.scroll_offset();
        self.refresh_measurements(host);
        self.refresh_all(host);
        self.evaluate(host);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.listener.is_enabled()
    }

    pub fn listener_state(&self) -> ListenerState {
        self.listener.state()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn measurements(&self) -> Measurements {
        self.measurements
    }

    /// Scroll offset as of the last handled event or registration
    pub fn current_offset(&self) -> f32 {
        self.current_offset
    }

    pub fn checkpoint(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.registry.get(id)
    }

    /// Live checkpoints in registration order
    pub fn checkpoints(&self) -> impl Iterator<Item = &Checkpoint> {
        self.registry.iter()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

fn dispatch(handler: &CrossHandler, cx: &mut CrossContext<'_>) {
    let (checkpoint, direction) = (cx.checkpoint(), cx.direction());
    if let Err(err) = handler(cx) {
        warn!(
            checkpoint = %checkpoint,
            direction = %direction,
            "checkpoint handler failed: {:#}",
            err
        );
    }
}
