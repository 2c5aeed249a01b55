use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{Error, Result};

/// A cloneable handle to a notification callback.
///
/// Two `Listener`s are the same listener when they share the same
/// allocation; clones of one handle can be used to detach it later.
pub struct Listener<A: 'static>(Rc<dyn Fn(&A) -> anyhow::Result<()>>);

impl<A: 'static> Listener<A> {
    pub fn new(f: impl Fn(&A) + 'static) -> Self {
        Self(Rc::new(move |args: &A| {
            f(args);
            Ok(())
        }))
    }

    /// A listener whose errors surface through the dispatching call.
    pub fn fallible(f: impl Fn(&A) -> anyhow::Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, args: &A) -> anyhow::Result<()> {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl<A: 'static> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: 'static> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// What a dispatch does when a listener returns an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing listener and return its error to the caller.
    #[default]
    Propagate,
    /// Log the failure and keep notifying the remaining listeners.
    LogAndContinue,
}

/// Payload of a cell's value-with-previous notification.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Change<T> {
    pub previous: T,
    pub current: T,
}

/// Broadcast channel: synchronous fan-out in registration order.
pub struct Channel<A: 'static>(Rc<RefCell<ChannelInner<A>>>);

struct ChannelInner<A: 'static> {
    listeners: Vec<Listener<A>>,
    policy: FailurePolicy,
}

impl<A: 'static> Channel<A> {
    pub fn new() -> Self {
        Self::with_policy(FailurePolicy::default())
    }

    pub fn with_policy(policy: FailurePolicy) -> Self {
        Self(Rc::new(RefCell::new(ChannelInner {
            listeners: Vec::new(),
            policy,
        })))
    }

    pub fn policy(&self) -> FailurePolicy {
        self.0.borrow().policy
    }

    /// Attaches `listener`. A handle that is already attached is not added twice.
    pub fn add_listener(&self, listener: &Listener<A>) {
        let mut inner = self.0.borrow_mut();
        if inner.listeners.iter().any(|l| l.ptr_eq(listener)) {
            log::debug!("channel: {listener:?} already attached");
            return;
        }
        inner.listeners.push(listener.clone());
    }

    /// Returns whether the listener was attached.
    pub fn remove_listener(&self, listener: &Listener<A>) -> bool {
        let mut inner = self.0.borrow_mut();
        match inner.listeners.iter().position(|l| l.ptr_eq(listener)) {
            Some(i) => {
                inner.listeners.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, listener: &Listener<A>) -> bool {
        self.0.borrow().listeners.iter().any(|l| l.ptr_eq(listener))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.0.borrow_mut().listeners.clear();
    }

    /// Calls every attached listener with `args`.
    ///
    /// The listener list is captured before the first call, so listeners
    /// attached or removed while this runs take effect on the next invoke.
    pub fn invoke(&self, args: &A) -> Result<()> {
        let (snapshot, policy) = {
            let inner = self.0.borrow();
            let snapshot: SmallVec<[Listener<A>; 4]> = inner.listeners.iter().cloned().collect();
            (snapshot, inner.policy)
        };
        dispatch(&snapshot, args, policy)
    }

    pub fn downgrade(&self) -> WeakChannel<A> {
        WeakChannel(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A: 'static> Default for Channel<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> Clone for Channel<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: 'static> fmt::Debug for Channel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Channel")
            .field("listeners", &inner.listeners.len())
            .field("policy", &inner.policy)
            .finish()
    }
}

/// Non-owning handle to a [`Channel`].
pub struct WeakChannel<A: 'static>(Weak<RefCell<ChannelInner<A>>>);

impl<A: 'static> WeakChannel<A> {
    pub fn upgrade(&self) -> Option<Channel<A>> {
        self.0.upgrade().map(Channel)
    }
}

impl<A: 'static> Clone for WeakChannel<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: 'static> fmt::Debug for WeakChannel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakChannel")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

pub(crate) fn dispatch<A>(listeners: &[Listener<A>], args: &A, policy: FailurePolicy) -> Result<()> {
    for listener in listeners {
        if let Err(err) = listener.call(args) {
            match policy {
                FailurePolicy::Propagate => return Err(Error::ListenerFailure(err)),
                FailurePolicy::LogAndContinue => {
                    log::error!("{listener:?} failed: {err:#}");
                }
            }
        }
    }
    Ok(())
}
