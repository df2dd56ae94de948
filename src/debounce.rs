/// Single-slot debounce over a cancellable timer source
use crate::error::Result;
use std::cell::RefCell;
use std::rc::Rc;

/// A timer source such as `setTimeout`/`clearTimeout`
pub trait Timers {
    /// Dropping a handle releases whatever the scheduled callback holds
    type Handle: 'static;

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<Self::Handle>;

    /// Clearing a timer that already fired must be harmless
    fn clear_timeout(&self, handle: Self::Handle);
}

/// Runs only the last of a burst of triggers, `delay_ms` after it arrived
///
/// Each trigger cancels the pending timer and schedules a new one, so a
/// burst of tab removals produces one snapshot.
pub struct Debouncer<T: Timers> {
    timers: T,
    delay_ms: u32,
    pending: Rc<RefCell<Option<T::Handle>>>,
}

impl<T: Timers> Debouncer<T> {
    pub fn new(timers: T, delay_ms: u32) -> Self {
        Debouncer {
            timers,
            delay_ms,
            pending: Rc::new(RefCell::new(None)),
        }
    }

    pub fn trigger<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce() + 'static,
    {
        self.cancel();

        let slot = Rc::clone(&self.pending);
        let handle = self.timers.set_timeout(
            self.delay_ms,
            Box::new(move || {
                slot.borrow_mut().take();
                callback();
            }),
        )?;
        *self.pending.borrow_mut() = Some(handle);
        Ok(())
    }

    pub fn cancel(&self) {
        let previous = self.pending.borrow_mut().take();
        if let Some(handle) = previous {
            self.timers.clear_timeout(handle);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}
