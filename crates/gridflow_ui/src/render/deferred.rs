//! Deferred tasks: work scheduled for a later phase boundary.
//!
//! A task returns `Ok(true)` when it is finished and `Ok(false)` to stay
//! queued. Tasks are sorted so that, iterating from the back of the list,
//! the lowest phase distance runs first and equal distances run oldest
//! first.

use std::cmp::Ordering;
use std::fmt;

use crate::error::UiResult;
use crate::render::UiTree;

/// A deferred task body.
pub type DeferredTask = Box<dyn FnMut(&mut UiTree) -> UiResult<bool>>;

/// Phase boundary a task is queued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredPhase {
    /// After the next layout pass.
    Layout,
    /// After the next update pass.
    Update,
    /// After the next render pass.
    Render,
}

/// A scheduled task.
pub struct DeferredRunnable {
    priority: f32,
    seq: u64,
    remaining: f32,
    task: DeferredTask,
}

impl DeferredRunnable {
    /// Creates a task that waits `phase_distance` processing passes before it
    /// first runs. `seq` orders tasks of equal distance (lower is older).
    #[must_use]
    pub fn new(seq: u64, phase_distance: f32, task: DeferredTask) -> Self {
        let phase_distance = phase_distance.max(0.0);
        Self {
            priority: phase_distance,
            seq,
            remaining: phase_distance,
            task,
        }
    }

    /// Phase distance the task was scheduled with.
    #[must_use]
    pub const fn priority(&self) -> f32 {
        self.priority
    }

    /// Insertion sequence number.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Visits the task: counts down the remaining distance or runs it.
    pub(crate) fn run(&mut self, tree: &mut UiTree) -> UiResult<bool> {
        if self.remaining > 0.0 {
            self.remaining -= 1.0;
            return Ok(false);
        }
        (self.task)(tree)
    }
}

impl fmt::Debug for DeferredRunnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRunnable")
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl PartialEq for DeferredRunnable {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DeferredRunnable {}

impl PartialOrd for DeferredRunnable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeferredRunnable {
    /// Larger distances sort first; among equal distances the older task
    /// sorts last.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// One of the root's three task lists.
#[derive(Debug, Default)]
pub struct DeferredList {
    tasks: Vec<DeferredRunnable>,
    sort_required: bool,
}

impl DeferredList {
    /// Moves every task out of `incoming` and flags the list for sorting.
    pub fn transfer(&mut self, incoming: &mut Vec<DeferredRunnable>) {
        if incoming.is_empty() {
            return;
        }
        self.sort_required = true;
        self.tasks.append(incoming);
    }

    /// Moves every task of `other` into this list.
    pub(crate) fn merge(&mut self, mut other: Self) {
        self.transfer(&mut other.tasks);
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Visits every task from the back, dropping the finished ones.
    ///
    /// The list must already be detached from `tree` so that tasks may
    /// schedule more work while this runs.
    pub(crate) fn process(&mut self, tree: &mut UiTree, phase: DeferredPhase) {
        if self.sort_required {
            self.tasks.sort();
            self.sort_required = false;
        }
        let mut i = self.tasks.len();
        while i > 0 {
            i -= 1;
            let finished = match self.tasks[i].run(tree) {
                Ok(finished) => finished,
                Err(e) => {
                    tracing::error!("Deferred {:?} task {} failed, dropping it: {}", phase, self.tasks[i].seq, e);
                    true
                }
            };
            if finished {
                self.tasks.remove(i);
            }
        }
    }
}

/// Tasks queued on a node, waiting to be handed to the root.
#[derive(Debug, Default)]
pub(crate) struct PendingDeferred {
    pub layout: Vec<DeferredRunnable>,
    pub update: Vec<DeferredRunnable>,
    pub render: Vec<DeferredRunnable>,
}

impl PendingDeferred {
    pub fn list_mut(&mut self, phase: DeferredPhase) -> &mut Vec<DeferredRunnable> {
        match phase {
            DeferredPhase::Layout => &mut self.layout,
            DeferredPhase::Update => &mut self.update,
            DeferredPhase::Render => &mut self.render,
        }
    }

    pub fn len(&self) -> usize {
        self.layout.len() + self.update.len() + self.render.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runnable(seq: u64, distance: f32) -> DeferredRunnable {
        DeferredRunnable::new(seq, distance, Box::new(|_| Ok(true)))
    }

    #[test]
    fn test_compare_equal_priority_older_is_greater() {
        let first = runnable(1, 1.0);
        let second = runnable(2, 1.0);
        assert_eq!(first.cmp(&second), Ordering::Greater);
        assert_eq!(second.cmp(&first), Ordering::Less);
    }

    #[test]
    fn test_compare_larger_distance_sorts_first() {
        let far = runnable(3, 2.0);
        let near = runnable(4, 1.0);
        assert_eq!(far.cmp(&near), Ordering::Less);
        assert_eq!(near.cmp(&far), Ordering::Greater);

        let near_older = runnable(5, 1.0);
        let far_newer = runnable(6, 2.0);
        assert_eq!(near_older.cmp(&far_newer), Ordering::Greater);
        assert_eq!(far_newer.cmp(&near_older), Ordering::Less);
    }

    #[test]
    fn test_sorted_back_to_front_order() {
        let mut tasks = vec![runnable(0, 2.0), runnable(1, 1.0), runnable(2, 1.0)];
        tasks.sort();
        let visit: Vec<u64> = tasks.iter().rev().map(DeferredRunnable::seq).collect();
        assert_eq!(visit, vec![1, 2, 0]);
    }

    #[test]
    fn test_negative_distance_clamped() {
        assert_eq!(runnable(0, -3.0).priority(), 0.0);
    }
}
