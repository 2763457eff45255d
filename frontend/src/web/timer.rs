//! 定时器封装模块
//!
//! Trailing-edge debounce on top of `gloo-timers`. Dropping a pending
//! `Timeout` cancels it, so replacing the slot is enough to restart.

use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;

/// Runs the latest scheduled callback once input has been quiet for
/// `millis`.
#[derive(Clone)]
pub struct Debouncer {
    millis: u32,
    pending: Rc<RefCell<Option<Timeout>>>,
}

impl Debouncer {
    pub fn new(millis: u32) -> Self {
        Self {
            millis,
            pending: Rc::new(RefCell::new(None)),
        }
    }

    pub fn schedule(&self, callback: impl FnOnce() + 'static) {
        let timeout = Timeout::new(self.millis, callback);
        // A fired timeout stays in the slot until the next schedule; dropping
        // it then is a no-op clear.
        *self.pending.borrow_mut() = Some(timeout);
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}

/// Fire-and-forget delay (toast auto-dismiss).
pub fn after(millis: u32, callback: impl FnOnce() + 'static) {
    Timeout::new(millis, callback).forget();
}
