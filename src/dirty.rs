//! Pending-damage accumulator shared by writers and the flushing context.

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::rect::Rect;

/// Accumulates damage as the bounding box of every mark since the last
/// snapshot, and tracks whether a flush is running.
///
/// The lock only guards the O(1) union / swap, never any bus I/O.
#[derive(Debug)]
pub struct DirtyTracker {
    clip: Mutex<Rect>,
    in_flight: AtomicBool,
    retrigger: AtomicBool,
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyTracker {
    /// A tracker with nothing pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clip: Mutex::new(Rect::EMPTY),
            in_flight: AtomicBool::new(false),
            retrigger: AtomicBool::new(false),
        }
    }

    /// Merge `rect` into the pending region. Empty rects are ignored.
    pub fn mark_dirty(&self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut clip = self.clip.lock();
        *clip = clip.union(rect);
    }

    /// Return the pending region and reset it to empty, atomically with
    /// respect to [`DirtyTracker::mark_dirty`].
    pub fn take_snapshot_and_reset(&self) -> Rect {
        core::mem::take(&mut *self.clip.lock())
    }

    /// The pending region, left in place.
    pub fn peek(&self) -> Rect {
        *self.clip.lock()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.clip.lock().is_empty()
    }

    /// Put back a snapshot whose flush was abandoned.
    pub fn restore(&self, rect: Rect) {
        self.mark_dirty(rect);
    }

    /// Claim the flush. Returns `false` if one is already running, in which
    /// case that flush is asked to run once more when it is done.
    ///
    /// The request flag is raised before the claim, so a flush that is just
    /// releasing either sees it in [`DirtyTracker::end_flush`] or has already
    /// released, letting this claim succeed.
    pub fn try_begin_flush(&self) -> bool {
        self.retrigger.store(true, Ordering::SeqCst);
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // damage marked before this point is covered by our own snapshot
            self.retrigger.store(false, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    /// Release the flush. Returns `true` if a trigger arrived while it ran,
    /// damage is still pending and the flush was claimed again for the
    /// caller, who must run another pass and call this again.
    pub fn end_flush(&self) -> bool {
        self.in_flight.store(false, Ordering::SeqCst);
        if !self.retrigger.swap(false, Ordering::SeqCst) || self.is_empty() {
            return false;
        }
        // a losing claim means the winner owns the pending damage
        self.try_begin_flush()
    }

    /// Returns `true` while a flush is running.
    pub fn is_flushing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    use super::*;

    #[test]
    fn test_union_of_marks() {
        let tracker = DirtyTracker::new();
        assert!(tracker.is_empty());
        tracker.mark_dirty(Rect::new(10, 20, 5, 5));
        tracker.mark_dirty(Rect::new(0, 4, 100, 110));
        tracker.mark_dirty(Rect::EMPTY);
        assert_eq!(tracker.peek(), Rect::new(0, 20, 5, 110));
        assert_eq!(tracker.take_snapshot_and_reset(), Rect::new(0, 20, 5, 110));
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let tracker = DirtyTracker::new();
        tracker.mark_dirty(Rect::new(1, 2, 3, 4));
        assert!(!tracker.take_snapshot_and_reset().is_empty());
        assert!(tracker.take_snapshot_and_reset().is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_restore() {
        let tracker = DirtyTracker::new();
        tracker.mark_dirty(Rect::new(0, 9, 0, 9));
        let snapshot = tracker.take_snapshot_and_reset();
        tracker.mark_dirty(Rect::new(50, 60, 50, 60));
        tracker.restore(snapshot);
        assert_eq!(tracker.peek(), Rect::new(0, 60, 0, 60));
    }

    #[test]
    fn test_flush_flags() {
        let tracker = DirtyTracker::new();
        assert!(tracker.try_begin_flush());
        assert!(tracker.is_flushing());
        // a second trigger is folded into the running flush
        assert!(!tracker.try_begin_flush());
        assert!(!tracker.try_begin_flush());
        tracker.mark_dirty(Rect::new(0, 0, 0, 0));
        // released and claimed again for the extra pass
        assert!(tracker.end_flush());
        assert!(tracker.is_flushing());
        tracker.take_snapshot_and_reset();
        assert!(!tracker.end_flush());
        assert!(!tracker.is_flushing());

        // retrigger without pending damage does not ask for another pass
        assert!(tracker.try_begin_flush());
        assert!(!tracker.try_begin_flush());
        tracker.take_snapshot_and_reset();
        assert!(!tracker.end_flush());
        assert!(!tracker.is_flushing());
        assert!(!tracker.end_flush());
    }

    #[test]
    fn test_trigger_during_release_is_not_lost() {
        let tracker = DirtyTracker::new();
        assert!(tracker.try_begin_flush());
        tracker.take_snapshot_and_reset();

        // another context marks and triggers while the pass is finishing
        tracker.mark_dirty(Rect::new(3, 3, 3, 3));
        assert!(!tracker.try_begin_flush());

        assert!(tracker.end_flush());
        assert_eq!(tracker.take_snapshot_and_reset(), Rect::new(3, 3, 3, 3));
        assert!(!tracker.end_flush());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_concurrent_triggers_leave_nothing_pending() {
        let tracker = Arc::new(DirtyTracker::new());
        let flushed = Arc::new(Mutex::new(Rect::EMPTY));

        let triggers: Vec<_> = (0..4u16)
            .map(|n| {
                let tracker = tracker.clone();
                let flushed = flushed.clone();
                thread::spawn(move || {
                    for i in 0..500u16 {
                        let x = n * 500 + i;
                        tracker.mark_dirty(Rect::new(x, x, i, i));
                        if !tracker.try_begin_flush() {
                            continue;
                        }
                        loop {
                            let snapshot = tracker.take_snapshot_and_reset();
                            {
                                let mut flushed = flushed.lock();
                                *flushed = flushed.union(snapshot);
                            }
                            if !tracker.end_flush() {
                                break;
                            }
                        }
                    }
                })
            })
            .collect();

        for trigger in triggers {
            trigger.join().unwrap();
        }

        // every trigger was either flushed by its caller or by the running flush
        assert!(tracker.is_empty());
        assert!(!tracker.is_flushing());
        assert_eq!(*flushed.lock(), Rect::new(0, 1999, 0, 499));
    }

    #[test]
    fn test_concurrent_marks_are_not_lost() {
        let tracker = Arc::new(DirtyTracker::new());
        let snapshots = Arc::new(Mutex::new(Vec::new()));

        let writers: Vec<_> = (0..4u16)
            .map(|n| {
                let tracker = tracker.clone();
                thread::spawn(move || {
                    for i in 0..500u16 {
                        let x = n * 500 + i;
                        tracker.mark_dirty(Rect::new(x, x, i, i));
                    }
                })
            })
            .collect();

        let drainer = {
            let tracker = tracker.clone();
            let snapshots = snapshots.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = tracker.take_snapshot_and_reset();
                    if !snapshot.is_empty() {
                        snapshots.lock().push(snapshot);
                    }
                    thread::yield_now();
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        drainer.join().unwrap();

        let total = snapshots
            .lock()
            .iter()
            .fold(tracker.take_snapshot_and_reset(), |acc, r| acc.union(*r));
        assert_eq!(total, Rect::new(0, 1999, 0, 499));
    }
}
