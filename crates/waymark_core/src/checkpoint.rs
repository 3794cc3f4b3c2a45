//! Checkpoints, registration specs, and handler context

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use waymark_platform::TargetId;

use crate::offset::Offset;
use crate::trigger::Alignment;

/// Direction of a crossing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Scrolled onto or past the threshold
    Down,
    /// Scrolled back before the threshold
    Up,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a registered checkpoint, unique within one tracker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckpointId(pub(crate) u64);

impl CheckpointId {
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Crossing callback
///
/// Errors are logged by the tracker and never stop other checkpoints from
/// being evaluated.
pub type CrossHandler = Rc<dyn Fn(&mut CrossContext<'_>) -> anyhow::Result<()>>;

/// Tracker operations a handler can request mid-pass
pub(crate) enum Command {
    Register(CheckpointSpec),
    Unregister(TargetId),
    Remove(CheckpointId),
    Refresh,
    Finalize,
    Disable,
}

pub(crate) type CommandQueue = SmallVec<[Command; 4]>;

/// What a handler sees when its checkpoint is crossed
///
/// Requests made through the context are queued and applied, in order,
/// once the current evaluation pass (or registration) has finished.
pub struct CrossContext<'a> {
    direction: Direction,
    target: TargetId,
    checkpoint: CheckpointId,
    threshold: f32,
    current_offset: f32,
    commands: &'a mut CommandQueue,
}

impl<'a> CrossContext<'a> {
    pub(crate) fn new(
        direction: Direction,
        target: TargetId,
        checkpoint: CheckpointId,
        threshold: f32,
        current_offset: f32,
        commands: &'a mut CommandQueue,
    ) -> Self {
        Self {
            direction,
            target,
            checkpoint,
            threshold,
            current_offset,
            commands,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn checkpoint(&self) -> CheckpointId {
        self.checkpoint
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn current_offset(&self) -> f32 {
        self.current_offset
    }

    /// Register another checkpoint
    pub fn register(&mut self, spec: CheckpointSpec) {
        self.commands.push(Command::Register(spec));
    }

    /// Remove every checkpoint watching `target`
    pub fn unregister(&mut self, target: TargetId) {
        self.commands.push(Command::Unregister(target));
    }

    /// Remove one checkpoint
    pub fn remove(&mut self, id: CheckpointId) {
        self.commands.push(Command::Remove(id));
    }

    /// Re-measure and recompute all thresholds
    pub fn refresh(&mut self) {
        self.commands.push(Command::Refresh);
    }

    /// Declare that no further checkpoints will be registered
    pub fn finalize(&mut self) {
        self.commands.push(Command::Finalize);
    }

    /// Stop listening for viewport events
    pub fn disable(&mut self) {
        self.commands.push(Command::Disable);
    }
}

/// Everything needed to register one or more checkpoints
///
/// ```ignore
/// let spec = CheckpointSpec::new(|cx| {
///     println!("{} at {}", cx.direction(), cx.threshold());
///     Ok(())
/// })
/// .target(hero)
/// .alignment(Alignment::Center)
/// .offset(Offset::Fraction(0.5));
/// tracker.register(&host, spec)?;
/// ```
pub struct CheckpointSpec {
    pub(crate) targets: Vec<TargetId>,
    pub(crate) many: bool,
    pub(crate) alignment: Option<Alignment>,
    pub(crate) offset: Option<Offset>,
    pub(crate) fire_once: bool,
    pub(crate) handler: CrossHandler,
}

impl CheckpointSpec {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&mut CrossContext<'_>) -> anyhow::Result<()> + 'static,
    {
        Self::with_handler(Rc::new(handler))
    }

    /// Build from an already shared handler
    pub fn with_handler(handler: CrossHandler) -> Self {
        Self {
            targets: Vec::new(),
            many: false,
            alignment: None,
            offset: None,
            fire_once: false,
            handler,
        }
    }

    /// Watch a single element
    pub fn target(mut self, target: TargetId) -> Self {
        self.targets = vec![target];
        self.many = false;
        self
    }

    /// Watch each element independently, one checkpoint per element
    pub fn targets(mut self, targets: impl IntoIterator<Item = TargetId>) -> Self {
        self.targets = targets.into_iter().collect();
        self.many = true;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Set the alignment by name; unknown names fall back to top
    pub fn alignment_name(self, name: &str) -> Self {
        self.alignment(Alignment::parse_or_default(name))
    }

    pub fn offset(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Remove the checkpoint after its first downward crossing
    pub fn fire_once(mut self, fire_once: bool) -> Self {
        self.fire_once = fire_once;
        self
    }
}

impl fmt::Debug for CheckpointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointSpec")
            .field("targets", &self.targets)
            .field("many", &self.many)
            .field("alignment", &self.alignment)
            .field("offset", &self.offset)
            .field("fire_once", &self.fire_once)
            .finish_non_exhaustive()
    }
}

/// Outcome of a registration
///
/// Positions hold `None` where no checkpoint was kept: a once-only
/// checkpoint that fired during registration, or a target the host could
/// not resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Registration {
    Single(Option<CheckpointId>),
    Many(Vec<Option<CheckpointId>>),
}

impl Registration {
    /// The checkpoint of a single-target registration
    pub fn single(&self) -> Option<CheckpointId> {
        match self {
            Registration::Single(id) => *id,
            Registration::Many(ids) => ids.first().copied().flatten(),
        }
    }

    /// Every kept checkpoint
    pub fn ids(&self) -> impl Iterator<Item = CheckpointId> + '_ {
        let slice: &[Option<CheckpointId>] = match self {
            Registration::Single(id) => std::slice::from_ref(id),
            Registration::Many(ids) => ids.as_slice(),
        };
        slice.iter().flatten().copied()
    }
}

/// A registered checkpoint
pub struct Checkpoint {
    pub(crate) id: CheckpointId,
    pub(crate) target: TargetId,
    pub(crate) alignment: Alignment,
    pub(crate) offset: Offset,
    pub(crate) threshold: f32,
    pub(crate) has_crossed: bool,
    pub(crate) fire_once: bool,
    pub(crate) handler: CrossHandler,
}

impl Checkpoint {
    pub fn id(&self) -> CheckpointId {
        self.id
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Absolute scroll offset at which the crossing state flips
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether the scroll offset is at or past the threshold
    pub fn has_crossed(&self) -> bool {
        self.has_crossed
    }

    pub fn fire_once(&self) -> bool {
        self.fire_once
    }
}

impl fmt::Debug for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkpoint")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("alignment", &self.alignment)
            .field("offset", &self.offset)
            .field("threshold", &self.threshold)
            .field("has_crossed", &self.has_crossed)
            .field("fire_once", &self.fire_once)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_ids_skip_absent() {
        let reg = Registration::Many(vec![
            Some(CheckpointId(1)),
            None,
            Some(CheckpointId(3)),
        ]);
        let ids: Vec<_> = reg.ids().collect();
        assert_eq!(ids, vec![CheckpointId(1), CheckpointId(3)]);
        assert_eq!(reg.single(), Some(CheckpointId(1)));

        assert_eq!(Registration::Single(None).ids().count(), 0);
    }

    #[test]
    fn test_context_queues_commands() {
        let mut queue = CommandQueue::new();
        let mut cx = CrossContext::new(
            Direction::Down,
            TargetId::default(),
            CheckpointId(7),
            600.0,
            650.0,
            &mut queue,
        );
        assert_eq!(cx.direction(), Direction::Down);
        assert_eq!(cx.checkpoint(), CheckpointId(7));
        cx.finalize();
        cx.remove(CheckpointId(7));
        assert_eq!(queue.len(), 2);
        assert!(matches!(queue[0], Command::Finalize));
    }

    #[test]
    fn test_spec_builder() {
        let spec = CheckpointSpec::new(|_| Ok(()))
            .alignment_name("nowhere")
            .offset(Offset::PixelsFromBottom(-20))
            .fire_once(true);
        assert_eq!(spec.alignment, Some(Alignment::Top));
        assert_eq!(spec.offset, Some(Offset::PixelsFromBottom(-20)));
        assert!(spec.fire_once);
        assert!(spec.targets.is_empty());
    }
}
