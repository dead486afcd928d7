//! Delayed, cancellable tasks on a caller-driven clock

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies a scheduled task so it can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Delayed-callback scheduler
pub trait TaskScheduler<T> {
    /// Run `task` once `delay` has elapsed
    fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle;
    /// Drop a pending task; returns false if it already ran or was cancelled
    fn cancel(&mut self, handle: TaskHandle) -> bool;
}

/// Deterministic timer queue.
///
/// Time only moves when the owner calls [`TimerQueue::advance_to`]; due
/// tasks are then drained in due order with [`TimerQueue::pop_due`]. While a
/// task is being handed out the clock reads its due time, so follow-up tasks
/// scheduled from it chain without drift even when the owner polls late.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    horizon: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, u64), T>,
    due_by_id: FxHashMap<u64, Duration>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
            due_by_id: FxHashMap::default(),
        }
    }

    /// Current clock reading
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward to `to`; earlier readings are ignored
    pub fn advance_to(&mut self, to: Duration) {
        self.horizon = self.horizon.max(to);
    }

    /// Move the clock forward by `by`
    pub fn advance_by(&mut self, by: Duration) {
        self.horizon += by;
    }

    /// Next task due at or before the clock horizon
    pub fn pop_due(&mut self) -> Option<T> {
        let due = match self.pending.first_key_value() {
            Some((&(due, _), _)) if due <= self.horizon => due,
            _ => {
                self.now = self.horizon;
                return None;
            }
        };
        let ((_, id), task) = self.pending.pop_first()?;
        self.due_by_id.remove(&id);
        self.now = self.now.max(due);
        Some(task)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> TaskScheduler<T> for TimerQueue<T> {
    fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now + delay;
        self.pending.insert((due, id), task);
        self.due_by_id.insert(id, due);
        TaskHandle(id)
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.due_by_id.remove(&handle.0) {
            Some(due) => self.pending.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(30), "c");
        timers.schedule(ms(10), "a");
        timers.schedule(ms(10), "b");

        timers.advance_to(ms(5));
        assert_eq!(timers.pop_due(), None);

        timers.advance_to(ms(30));
        assert_eq!(timers.pop_due(), Some("a"));
        assert_eq!(timers.now(), ms(10));
        assert_eq!(timers.pop_due(), Some("b"));
        assert_eq!(timers.pop_due(), Some("c"));
        assert_eq!(timers.pop_due(), None);
        assert_eq!(timers.now(), ms(30));
    }

    #[test]
    fn test_follow_up_chains_from_due_time() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(10), 1);
        timers.advance_to(ms(100));
        assert_eq!(timers.pop_due(), Some(1));
        timers.schedule(ms(10), 2);
        assert_eq!(timers.pop_due(), Some(2));
        assert_eq!(timers.now(), ms(20));
    }

    #[test]
    fn test_cancel_removes_pending_task() {
        let mut timers = TimerQueue::new();
        let first = timers.schedule(ms(10), 1);
        timers.schedule(ms(20), 2);
        assert!(timers.cancel(first));
        assert!(!timers.cancel(first));
        assert_eq!(timers.len(), 1);

        timers.advance_by(ms(50));
        assert_eq!(timers.pop_due(), Some(2));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut timers: TimerQueue<()> = TimerQueue::new();
        timers.advance_to(ms(50));
        timers.advance_to(ms(20));
        assert_eq!(timers.pop_due(), None);
        assert_eq!(timers.now(), ms(50));
    }
}
