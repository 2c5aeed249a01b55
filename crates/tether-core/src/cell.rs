//! # Reactive cells
//!
//! A [`ReactiveCell<T>`] is a cloneable handle to a typed value that
//! remembers the value it replaced and broadcasts every write:
//!
//! ```rust
//! use tether_core::*;
//!
//! let health = ReactiveCell::new(100);
//! health.activate(RuntimeMode::Live);
//!
//! health.on_change_with_history(|c: &Change<i32>| {
//!     log::info!("health {} -> {}", c.previous, c.current);
//! });
//!
//! health.set_value(80).unwrap();
//! assert_eq!(health.get_value(), 80);
//! assert_eq!(health.previous_value(), 100);
//! ```
//!
//! Two relations are available and they are not the same thing:
//!
//! - `a == b` compares the *current values*. Two distinct cells holding
//!   equal values are equal.
//! - [`ReactiveCell::ptr_eq`] asks whether both handles point at the same
//!   cell.
//!
//! `Hash` follows `==`, which makes a cell a poor hash key: once its value
//! changes it hashes differently. Do not keep a cell inside a `HashSet` or as
//! a `HashMap` key across a write.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::{Change, Channel, DeepCopy, Error, FailurePolicy, Listener, Result};

/// Deepest allowed nesting of writes issued from inside change listeners.
pub const MAX_NOTIFY_DEPTH: usize = 64;

/// Whether the owning graph is being edited or actually running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Values are being authored; activation leaves them untouched.
    #[default]
    Authoring,
    Live,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
}

pub struct ReactiveCell<T: 'static>(Rc<CellInner<T>>);

struct CellInner<T: 'static> {
    state: RefCell<CellState<T>>,
    changed: Channel<T>,
    changed_with_history: Channel<Change<T>>,
    depth: Cell<usize>,
}

struct CellState<T> {
    description: String,
    initial: T,
    value: T,
    previous: T,
    phase: Phase,
}

impl<T: Default + 'static> ReactiveCell<T> {
    /// Creates an uninitialized cell. Until the first [`reset`](Self::reset)
    /// or write, both the current and previous value are `T::default()`.
    pub fn new(initial: T) -> Self {
        Self::with_policy(initial, FailurePolicy::default())
    }

    pub fn with_policy(initial: T, policy: FailurePolicy) -> Self {
        Self(Rc::new(CellInner {
            state: RefCell::new(CellState {
                description: String::new(),
                initial,
                value: T::default(),
                previous: T::default(),
                phase: Phase::Uninitialized,
            }),
            changed: Channel::with_policy(policy),
            changed_with_history: Channel::with_policy(policy),
            depth: Cell::new(0),
        }))
    }
}

impl<T: 'static> ReactiveCell<T> {
    pub fn described(self, description: impl Into<String>) -> Self {
        self.0.state.borrow_mut().description = description.into();
        self
    }

    pub fn description(&self) -> String {
        self.0.state.borrow().description.clone()
    }

    pub fn phase(&self) -> Phase {
        self.0.state.borrow().phase
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.0.changed.policy()
    }

    /// Borrows the current value without cloning it.
    ///
    /// `f` must not write to this cell.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.state.borrow().value)
    }

    pub fn add_listener(&self, listener: &Listener<T>) {
        self.0.changed.add_listener(listener);
    }

    pub fn remove_listener(&self, listener: &Listener<T>) -> bool {
        self.0.changed.remove_listener(listener)
    }

    pub fn add_history_listener(&self, listener: &Listener<Change<T>>) {
        self.0.changed_with_history.add_listener(listener);
    }

    pub fn remove_history_listener(&self, listener: &Listener<Change<T>>) -> bool {
        self.0.changed_with_history.remove_listener(listener)
    }

    /// Attaches `f` to the value-only channel and returns its handle.
    pub fn on_change(&self, f: impl Fn(&T) + 'static) -> Listener<T> {
        let listener = Listener::new(f);
        self.add_listener(&listener);
        listener
    }

    pub fn on_change_with_history(&self, f: impl Fn(&Change<T>) + 'static) -> Listener<Change<T>> {
        let listener = Listener::new(f);
        self.add_history_listener(&listener);
        listener
    }

    pub fn listener_count(&self) -> usize {
        self.0.changed.len() + self.0.changed_with_history.len()
    }

    /// Whether both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakCell<T> {
        WeakCell(Rc::downgrade(&self.0))
    }

    fn enter(&self) -> Result<DepthGuard<'_>> {
        let depth = self.0.depth.get();
        if depth >= MAX_NOTIFY_DEPTH {
            return Err(Error::RecursionLimit {
                limit: MAX_NOTIFY_DEPTH,
            });
        }
        self.0.depth.set(depth + 1);
        Ok(DepthGuard(&self.0.depth))
    }
}

impl<T: Clone + 'static> ReactiveCell<T> {
    /// Returns a copy of the current value.
    ///
    /// Before the first reset or write this is `T::default()`; use
    /// [`try_get_value`](Self::try_get_value) to treat that as an error.
    pub fn get_value(&self) -> T {
        let state = self.0.state.borrow();
        if state.phase == Phase::Uninitialized {
            log::debug!("cell '{}' read before reset", state.description);
        }
        state.value.clone()
    }

    pub fn try_get_value(&self) -> Result<T> {
        let state = self.0.state.borrow();
        match state.phase {
            Phase::Uninitialized => Err(Error::UninitializedRead),
            Phase::Initialized => Ok(state.value.clone()),
        }
    }

    pub fn previous_value(&self) -> T {
        self.0.state.borrow().previous.clone()
    }

    pub fn initial_value(&self) -> T {
        self.0.state.borrow().initial.clone()
    }

    /// Stores `value`, keeps the replaced value as the previous one, then
    /// notifies value listeners followed by history listeners.
    ///
    /// The write is kept even when a listener fails. A listener that writes
    /// back into this cell is served immediately, before the remaining
    /// listeners of this write.
    pub fn set_value(&self, value: T) -> Result<()> {
        let _depth = self.enter()?;
        let change = {
            let mut state = self.0.state.borrow_mut();
            state.previous = std::mem::replace(&mut state.value, value);
            state.phase = Phase::Initialized;
            Change {
                previous: state.previous.clone(),
                current: state.value.clone(),
            }
        };
        self.notify(change)
    }

    /// Mutates the current value in place, with the same history and
    /// notifications as [`set_value`](Self::set_value).
    ///
    /// `f` runs while the cell is borrowed and must not touch this cell.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<()> {
        let _depth = self.enter()?;
        let change = {
            let mut state = self.0.state.borrow_mut();
            let before = state.value.clone();
            f(&mut state.value);
            state.previous = before;
            state.phase = Phase::Initialized;
            Change {
                previous: state.previous.clone(),
                current: state.value.clone(),
            }
        };
        self.notify(change)
    }

    fn notify(&self, change: Change<T>) -> Result<()> {
        self.0.changed.invoke(&change.current)?;
        self.0.changed_with_history.invoke(&change)
    }
}

impl<T: DeepCopy + 'static> ReactiveCell<T> {
    /// Re-derives both the current and previous value from independent deep
    /// copies of the initial value. No listener is notified.
    pub fn reset(&self) {
        let mut state = self.0.state.borrow_mut();
        state.value = state.initial.deep_copy();
        state.previous = state.initial.deep_copy();
        state.phase = Phase::Initialized;
        log::trace!("cell '{}' reset", state.description);
    }

    /// Runs the per-activation reset, which only happens in [`RuntimeMode::Live`].
    pub fn activate(&self, mode: RuntimeMode) {
        match mode {
            RuntimeMode::Live => self.reset(),
            RuntimeMode::Authoring => {}
        }
    }
}

struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl<T: 'static> Clone for ReactiveCell<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: PartialEq + 'static> PartialEq for ReactiveCell<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.state.borrow().value == other.0.state.borrow().value
    }
}

impl<T: Eq + 'static> Eq for ReactiveCell<T> {}

impl<T: PartialEq + 'static> PartialEq<Reference<T>> for ReactiveCell<T> {
    fn eq(&self, other: &Reference<T>) -> bool {
        let state = self.0.state.borrow();
        other.with_value(|v| state.value == *v)
    }
}

/// Hashes the current value only. See the module docs before using a cell
/// as a key.
impl<T: Hash + 'static> Hash for ReactiveCell<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.state.borrow().value.hash(state);
    }
}

impl<T: fmt::Display + 'static> fmt::Display for ReactiveCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell{{{}}}", self.0.state.borrow().value)
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.state.borrow();
        f.debug_struct("ReactiveCell")
            .field("description", &state.description)
            .field("value", &state.value)
            .field("previous", &state.previous)
            .field("phase", &state.phase)
            .finish()
    }
}

/// Non-owning handle to a [`ReactiveCell`].
pub struct WeakCell<T: 'static>(Weak<CellInner<T>>);

impl<T: 'static> WeakCell<T> {
    pub fn upgrade(&self) -> Option<ReactiveCell<T>> {
        self.0.upgrade().map(ReactiveCell)
    }
}

impl<T: 'static> Clone for WeakCell<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: 'static> fmt::Debug for WeakCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakCell")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

/// Either a constant or a cell, read the same way.
#[derive(Clone, Debug)]
pub enum Reference<T: 'static> {
    Constant(T),
    Cell(ReactiveCell<T>),
}

impl<T: 'static> Reference<T> {
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self {
            Reference::Constant(v) => f(v),
            Reference::Cell(cell) => cell.with_value(f),
        }
    }
}

impl<T: Clone + 'static> Reference<T> {
    pub fn get_value(&self) -> T {
        self.with_value(T::clone)
    }
}

impl<T: 'static> From<ReactiveCell<T>> for Reference<T> {
    fn from(cell: ReactiveCell<T>) -> Self {
        Reference::Cell(cell)
    }
}

/// Value equality where either side may be absent; an absent left-hand cell
/// equals only an absent right-hand one.
pub fn cells_equal<T: PartialEq + 'static>(
    lhs: Option<&ReactiveCell<T>>,
    rhs: Option<&ReactiveCell<T>>,
) -> bool {
    match (lhs, rhs) {
        (None, rhs) => rhs.is_none(),
        (Some(l), Some(r)) => l == r,
        (Some(_), None) => false,
    }
}

pub fn cell_equals_reference<T: PartialEq + 'static>(
    lhs: Option<&ReactiveCell<T>>,
    rhs: Option<&Reference<T>>,
) -> bool {
    match (lhs, rhs) {
        (None, rhs) => rhs.is_none(),
        (Some(l), Some(r)) => l == r,
        (Some(_), None) => false,
    }
}
