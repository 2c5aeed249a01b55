use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use crate::{DeepCopy, Dispose, ReactiveCell, RuntimeMode};

new_key_type! {
    /// Slot of a cell adopted by a [`Scope`].
    pub struct CellKey;
}

/// Anything that takes part in a scope's activation cycle.
pub trait Activate {
    fn activate(&self, mode: RuntimeMode);
}

impl<T: DeepCopy + 'static> Activate for ReactiveCell<T> {
    fn activate(&self, mode: RuntimeMode) {
        ReactiveCell::activate(self, mode);
    }
}

/// Owner of a group of cells and the cleanups that go with them.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    cells: RefCell<SlotMap<CellKey, Box<dyn Activate>>>,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                cells: RefCell::new(SlotMap::with_key()),
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Takes a handle to `cell`; it lives at least as long as the scope.
    pub fn adopt(&self, cell: impl Activate + 'static) -> CellKey {
        self.inner.cells.borrow_mut().insert(Box::new(cell))
    }

    pub fn release(&self, key: CellKey) -> bool {
        self.inner.cells.borrow_mut().remove(key).is_some()
    }

    pub fn cell_count(&self) -> usize {
        self.inner.cells.borrow().len()
    }

    /// Starts an activation cycle: every adopted cell, then every child scope.
    pub fn activate(&self, mode: RuntimeMode) {
        log::debug!(
            "scope: activating {} cell(s) in {mode:?} mode",
            self.cell_count()
        );
        // Activation must not adopt into or release from this scope.
        for cell in self.inner.cells.borrow().values() {
            cell.activate(mode);
        }
        let children = self.inner.children.borrow().clone();
        for child in children {
            child.activate(mode);
        }
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn add_dispose(&self, dispose: Dispose) {
        self.add_disposer(move || dispose.run());
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    pub fn dispose(self) {
        // Dispose children first
        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
        self.inner.cells.borrow_mut().clear();
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            drop(child);
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}
