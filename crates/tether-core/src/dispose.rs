use std::cell::RefCell;
use std::rc::Rc;

/// A cleanup callback shared between clones.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.0.borrow().is_none()
    }
}

/// Detaches a listener when dropped or when [`unsubscribe`](Self::unsubscribe)
/// is called, whichever comes first.
#[must_use = "dropping a Subscription detaches its listener immediately"]
pub struct Subscription(Option<Dispose>);

impl Subscription {
    pub(crate) fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Some(Dispose::new(f)))
    }

    pub fn unsubscribe(mut self) {
        if let Some(d) = self.0.take() {
            d.run();
        }
    }

    /// Keeps the listener attached for the lifetime of its provider.
    pub fn detach(mut self) {
        self.0 = None;
    }

    /// Hands the detach callback over, e.g. to [`Scope::add_dispose`](crate::Scope::add_dispose).
    pub fn into_dispose(mut self) -> Dispose {
        self.0.take().unwrap_or_else(|| Dispose::new(|| {}))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(d) = self.0.take() {
            d.run();
        }
    }
}
