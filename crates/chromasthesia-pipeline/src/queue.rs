//! Bounded completion queue.
//!
//! Admission-control primitive bounding how many resolution/download
//! round-trips are in flight at once, and tracking how many have completed
//! toward a target count.
//!
//! ```text
//! Orchestrator          CompletionQueue           Item tasks
//!     |                      |                        |
//!     |--new(target, items)->|                        |
//!     |--poll()------------->|---item---------------->| (resolve+download)
//!     |--poll()------------->|---item---------------->|
//!     |                      |<------complete_with----+  (success only)
//!     |                      |<------release----------+  (every terminal outcome)
//!     |                      |---newly admitted------>|
//!     |                 on_complete fires once
//! ```
//!
//! # Accounting contract
//!
//! - `cap = min(target, initial backlog)`; at no point are more than `cap`
//!   items admitted-but-not-terminal.
//! - Every terminal outcome of an admitted item (success, benign skip,
//!   failure, cancellation notice) releases exactly one permit.
//! - Only successes advance `completed`. Admission additionally honors
//!   `completed + in_flight < target`, so successes never over-dispatch
//!   past the target.
//! - The completion callback fires exactly once: when `completed == target`,
//!   or with a partial result set when nothing is in flight and the backlog
//!   is exhausted first.
//!
//! This is the only shared-mutable-state boundary in the pipeline; all
//! mutation happens under one internal lock.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::error::QueueError;

/// Completion callback; fired exactly once with the accumulated results.
pub type CompletionCallback<R> = Box<dyn FnOnce(Vec<R>) + Send>;

struct QueueState<T, R> {
    backlog: VecDeque<T>,
    cap: usize,
    permits: usize,
    in_flight: usize,
    target: usize,
    completed: usize,
    results: Vec<R>,
    on_complete: Option<CompletionCallback<R>>,
    cancelled: bool,
}

impl<T, R> QueueState<T, R> {
    fn try_admit(&mut self) -> Option<T> {
        if self.cancelled
            || self.permits == 0
            || self.completed + self.in_flight >= self.target
        {
            return None;
        }
        let item = self.backlog.pop_front()?;
        self.permits -= 1;
        self.in_flight += 1;
        Some(item)
    }
}

/// Bounded completion queue over backlog items `T` accumulating results `R`.
///
/// Created per submission; discarded once the completion callback has fired
/// or the owning submission was cancelled.
pub struct CompletionQueue<T, R> {
    state: Mutex<QueueState<T, R>>,
}

impl<T, R> CompletionQueue<T, R> {
    /// Build a queue for `target` completions over `backlog`.
    ///
    /// `target == 0` or an empty backlog fires the completion callback
    /// immediately with an empty result set; no work can ever be admitted
    /// from such a queue.
    pub fn new(target: usize, backlog: Vec<T>, on_complete: CompletionCallback<R>) -> Self {
        let cap = target.min(backlog.len());
        let queue = Self {
            state: Mutex::new(QueueState {
                backlog: backlog.into(),
                cap,
                permits: cap,
                in_flight: 0,
                target,
                completed: 0,
                results: Vec::new(),
                on_complete: Some(on_complete),
                cancelled: false,
            }),
        };
        if cap == 0 {
            let callback = queue.state.lock().on_complete.take();
            if let Some(callback) = callback {
                callback(Vec::new());
            }
        }
        queue
    }

    /// Admit one backlog item if a permit is available and the remaining-
    /// needed bound holds. `None` is not an error; the caller simply stops
    /// dispatching for now.
    pub fn poll(&self) -> Option<T> {
        self.state.lock().try_admit()
    }

    /// Push an item onto the backlog (for paged upstreams that deliver
    /// results in batches). Dropped silently after cancellation.
    pub fn add(&self, item: T) {
        let mut state = self.state.lock();
        if !state.cancelled {
            state.backlog.push_back(item);
        }
    }

    /// Return one permit after a terminal outcome and drain every newly
    /// admissible backlog item; the caller dispatches the returned batch.
    ///
    /// When the release leaves nothing in flight and nothing admissible,
    /// the completion callback fires with the partial result set.
    pub fn release(&self) -> Vec<T> {
        let mut admitted = Vec::new();
        let finished = {
            let mut state = self.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.permits = (state.permits + 1).min(state.cap);
            while let Some(item) = state.try_admit() {
                admitted.push(item);
            }
            if admitted.is_empty()
                && state.in_flight == 0
                && state.backlog.is_empty()
                && state.on_complete.is_some()
            {
                let callback = state.on_complete.take();
                let results = std::mem::take(&mut state.results);
                callback.map(|cb| (cb, results))
            } else {
                None
            }
        };
        if let Some((callback, results)) = finished {
            callback(results);
        }
        admitted
    }

    /// Record one successful completion.
    ///
    /// Fires the completion callback when `completed` reaches the target.
    /// A no-op after cancellation.
    ///
    /// # Errors
    ///
    /// `QueueError::Exceeded` when the increment would drive `completed`
    /// past the target. The admission bound makes this unreachable in
    /// correct usage; hitting it is a programming error.
    pub fn complete_with(&self, result: R) -> Result<(), QueueError> {
        let finished = {
            let mut state = self.state.lock();
            if state.cancelled {
                return Ok(());
            }
            if state.completed + 1 > state.target {
                return Err(QueueError::Exceeded {
                    completed: state.completed + 1,
                    target: state.target,
                });
            }
            state.results.push(result);
            state.completed += 1;
            if state.completed == state.target {
                let callback = state.on_complete.take();
                let results = std::mem::take(&mut state.results);
                callback.map(|cb| (cb, results))
            } else {
                None
            }
        };
        if let Some((callback, results)) = finished {
            callback(results);
        }
        Ok(())
    }

    /// Drop the backlog and the completion callback. Subsequent `poll` and
    /// `release` admit nothing; `complete_with` becomes a no-op.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.cancelled = true;
        state.backlog.clear();
        state.on_complete = None;
        state.results.clear();
    }

    /// Admitted items not yet terminal.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Available admission permits.
    #[must_use]
    pub fn permits(&self) -> usize {
        self.state.lock().permits
    }

    /// Successful completions so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.state.lock().completed
    }

    /// Items not yet dispatched.
    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.state.lock().backlog.len()
    }

    /// Whether the completion callback has already fired (or was dropped by
    /// cancellation).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.lock().on_complete.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_queue(
        target: usize,
        backlog: Vec<u32>,
    ) -> (Arc<CompletionQueue<u32, u32>>, Arc<Mutex<Option<Vec<u32>>>>) {
        let fired = Arc::new(Mutex::new(None));
        let fired_cb = fired.clone();
        let queue = Arc::new(CompletionQueue::new(
            target,
            backlog,
            Box::new(move |results| {
                *fired_cb.lock() = Some(results);
            }),
        ));
        (queue, fired)
    }

    #[test]
    fn test_cap_is_min_of_target_and_backlog() {
        let (queue, _) = counting_queue(3, vec![1, 2, 3, 4, 5]);
        assert_eq!(queue.permits(), 3);

        let (queue, _) = counting_queue(5, vec![1, 2]);
        assert_eq!(queue.permits(), 2);
    }

    #[test]
    fn test_poll_respects_permits() {
        let (queue, _) = counting_queue(2, vec![1, 2, 3, 4]);
        assert!(queue.poll().is_some());
        assert!(queue.poll().is_some());
        assert!(queue.poll().is_none());
        assert_eq!(queue.in_flight(), 2);
        assert_eq!(queue.backlog_len(), 2);
    }

    #[test]
    fn test_target_reached_fires_once_with_results() {
        let (queue, fired) = counting_queue(2, vec![1, 2, 3]);
        let a = queue.poll().unwrap();
        let b = queue.poll().unwrap();

        queue.complete_with(a * 10).unwrap();
        assert!(fired.lock().is_none());
        queue.release();

        queue.complete_with(b * 10).unwrap();
        assert_eq!(fired.lock().as_deref(), Some(&[10, 20][..]));
        queue.release();

        // Firing happened exactly once; the third backlog item was never
        // admitted.
        assert_eq!(queue.backlog_len(), 1);
        assert!(queue.is_finished());
    }

    #[test]
    fn test_remaining_needed_bound_blocks_over_dispatch() {
        // target 3, 3 in flight: after one success only 2 more can ever
        // matter, so no fourth item is admitted.
        let (queue, _) = counting_queue(3, vec![1, 2, 3, 4, 5]);
        for _ in 0..3 {
            queue.poll().unwrap();
        }
        queue.complete_with(1).unwrap();
        let admitted = queue.release();
        assert!(admitted.is_empty());
        assert_eq!(queue.backlog_len(), 2);
    }

    #[test]
    fn test_failure_release_readmits_from_backlog() {
        let (queue, _) = counting_queue(2, vec![1, 2, 3, 4]);
        queue.poll().unwrap();
        queue.poll().unwrap();

        // Both fail; their releases hand back replacement items.
        assert_eq!(queue.release().len(), 1);
        assert_eq!(queue.release().len(), 1);
        assert_eq!(queue.in_flight(), 2);
        assert_eq!(queue.backlog_len(), 0);
    }

    #[test]
    fn test_backlog_exhaustion_fires_partial_completion() {
        let (queue, fired) = counting_queue(3, vec![1, 2]);
        queue.poll().unwrap();
        queue.poll().unwrap();

        queue.complete_with(10).unwrap();
        assert!(queue.release().is_empty());
        assert!(fired.lock().is_none());

        // Second item fails; nothing left in flight or in backlog, so
        // completion fires with the single accumulated result.
        assert!(queue.release().is_empty());
        assert_eq!(fired.lock().as_deref(), Some(&[10][..]));
    }

    #[test]
    fn test_all_failures_fire_empty_completion() {
        let (queue, fired) = counting_queue(2, vec![1, 2]);
        queue.poll().unwrap();
        queue.poll().unwrap();
        queue.release();
        assert!(fired.lock().is_none());
        queue.release();
        assert_eq!(fired.lock().as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_zero_target_fires_immediately() {
        let (queue, fired) = counting_queue(0, vec![1, 2, 3]);
        assert_eq!(fired.lock().as_deref(), Some(&[][..]));
        assert!(queue.poll().is_none());
    }

    #[test]
    fn test_empty_backlog_fires_immediately() {
        let (queue, fired) = counting_queue(3, vec![]);
        assert_eq!(fired.lock().as_deref(), Some(&[][..]));
        assert!(queue.poll().is_none());
    }

    #[test]
    fn test_exceeded_is_invariant_violation() {
        let (queue, _) = counting_queue(1, vec![1, 2]);
        queue.poll().unwrap();
        queue.complete_with(1).unwrap();
        let err = queue.complete_with(2).unwrap_err();
        assert_eq!(
            err,
            QueueError::Exceeded {
                completed: 2,
                target: 1
            }
        );
    }

    #[test]
    fn test_cancel_drops_backlog_and_callback() {
        let (queue, fired) = counting_queue(2, vec![1, 2, 3]);
        queue.poll().unwrap();
        queue.cancel();

        assert!(queue.poll().is_none());
        assert_eq!(queue.backlog_len(), 0);
        // Terminal outcomes of in-flight items still release quietly.
        queue.complete_with(1).unwrap();
        assert!(queue.release().is_empty());
        assert!(fired.lock().is_none());
    }

    #[test]
    fn test_add_grows_backlog() {
        let (queue, _) = counting_queue(4, vec![1, 2, 3, 4]);
        queue.poll().unwrap();
        queue.add(9);
        assert_eq!(queue.backlog_len(), 4);
        queue.cancel();
        queue.add(10);
        assert_eq!(queue.backlog_len(), 0);
    }

    #[test]
    fn test_admission_bound_under_churn() {
        // Admitted-but-not-terminal never exceeds min(target, backlog).
        let (queue, _) = counting_queue(3, (0..10).collect());
        let max_seen = AtomicUsize::new(0);
        let mut live = Vec::new();
        while let Some(item) = queue.poll() {
            live.push(item);
        }
        max_seen.fetch_max(queue.in_flight(), Ordering::SeqCst);
        // Fail items one at a time, dispatching replacements.
        for _ in 0..7 {
            let mut admitted = queue.release();
            live.extend(admitted.drain(..));
            max_seen.fetch_max(queue.in_flight(), Ordering::SeqCst);
        }
        assert!(max_seen.load(Ordering::SeqCst) <= 3);
    }
}
