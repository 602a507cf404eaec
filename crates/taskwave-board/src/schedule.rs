//! Frame Scheduling
//!
//! Drag-over fires on every pointer tick, far more often than the board
//! can re-render. [`FrameCoalescer`] keeps only the latest pending value
//! and hands it to its sink at most once per animation frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Source of "next frame" callbacks
pub trait FrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>);
}

/// Runs callbacks synchronously. Useful off-browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl FrameScheduler for ImmediateScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        callback();
    }
}

/// Queues callbacks until [`ManualScheduler::run_frame`] is called
#[derive(Default, Clone)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run everything queued so far; callbacks queued meanwhile wait for the next frame
    pub fn run_frame(&self) -> usize {
        let callbacks: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push(callback);
    }
}

struct CoalescerInner<T> {
    pending: RefCell<Option<T>>,
    scheduled: Cell<bool>,
    sink: Rc<dyn Fn(T)>,
}

/// Latest-wins buffer flushed once per frame
pub struct FrameCoalescer<T> {
    inner: Rc<CoalescerInner<T>>,
    scheduler: Rc<dyn FrameScheduler>,
}

impl<T> Clone for FrameCoalescer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            scheduler: Rc::clone(&self.scheduler),
        }
    }
}

impl<T: 'static> FrameCoalescer<T> {
    pub fn new(scheduler: Rc<dyn FrameScheduler>, sink: impl Fn(T) + 'static) -> Self {
        Self {
            inner: Rc::new(CoalescerInner {
                pending: RefCell::new(None),
                scheduled: Cell::new(false),
                sink: Rc::new(sink),
            }),
            scheduler,
        }
    }

    /// Replace the pending value, requesting a frame if none is outstanding
    pub fn push(&self, value: T) {
        self.inner.pending.replace(Some(value));
        if self.inner.scheduled.replace(true) {
            return;
        }
        let inner = Rc::clone(&self.inner);
        self.scheduler.request_frame(Box::new(move || {
            inner.scheduled.set(false);
            let value = inner.pending.borrow_mut().take();
            if let Some(value) = value {
                (inner.sink)(value);
            }
        }));
    }

    /// Drop the pending value; an outstanding frame then dispatches nothing
    pub fn clear(&self) {
        self.inner.pending.replace(None);
    }

    pub fn has_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_coalescer(scheduler: Rc<dyn FrameScheduler>) -> (FrameCoalescer<u32>, Rc<RefCell<Vec<u32>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let coalescer = FrameCoalescer::new(scheduler, move |value| sink.borrow_mut().push(value));
        (coalescer, seen)
    }

    #[test]
    fn test_latest_value_wins_within_frame() {
        let scheduler = ManualScheduler::new();
        let (coalescer, seen) = make_coalescer(Rc::new(scheduler.clone()));

        coalescer.push(1);
        coalescer.push(2);
        coalescer.push(3);
        assert_eq!(scheduler.pending(), 1);
        assert!(seen.borrow().is_empty());

        scheduler.run_frame();
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_one_dispatch_per_frame() {
        let scheduler = ManualScheduler::new();
        let (coalescer, seen) = make_coalescer(Rc::new(scheduler.clone()));

        coalescer.push(1);
        scheduler.run_frame();
        coalescer.push(2);
        coalescer.push(4);
        scheduler.run_frame();
        assert_eq!(scheduler.run_frame(), 0);

        assert_eq!(*seen.borrow(), vec![1, 4]);
    }

    #[test]
    fn test_clear_drops_pending() {
        let scheduler = ManualScheduler::new();
        let (coalescer, seen) = make_coalescer(Rc::new(scheduler.clone()));

        coalescer.push(7);
        coalescer.clear();
        assert!(!coalescer.has_pending());
        scheduler.run_frame();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_immediate_scheduler_dispatches_synchronously() {
        let (coalescer, seen) = make_coalescer(Rc::new(ImmediateScheduler));
        coalescer.push(1);
        coalescer.push(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
