//! Deep copies for cell resets.
//!
//! `Clone` is not enough for reset: a value holding `Rc<RefCell<_>>` clones
//! into a second handle to the *same* interior, so writing through the cell's
//! current value would show up in its previous value. `DeepCopy` always
//! produces storage that shares nothing mutable with the source.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;

pub trait DeepCopy {
    fn deep_copy(&self) -> Self;
}

macro_rules! deep_copy_via_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepCopy for $ty {
                #[inline]
                fn deep_copy(&self) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

deep_copy_via_clone!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy(&self) -> Self {
        self.as_ref().map(DeepCopy::deep_copy)
    }
}

impl<T: DeepCopy> DeepCopy for Box<T> {
    fn deep_copy(&self) -> Self {
        Box::new((**self).deep_copy())
    }
}

impl<T: DeepCopy> DeepCopy for Vec<T> {
    fn deep_copy(&self) -> Self {
        self.iter().map(DeepCopy::deep_copy).collect()
    }
}

impl<T: DeepCopy> DeepCopy for VecDeque<T> {
    fn deep_copy(&self) -> Self {
        self.iter().map(DeepCopy::deep_copy).collect()
    }
}

impl<K, V, S> DeepCopy for HashMap<K, V, S>
where
    K: DeepCopy + Eq + Hash,
    V: DeepCopy,
    S: BuildHasher + Clone,
{
    fn deep_copy(&self) -> Self {
        let mut out = HashMap::with_capacity_and_hasher(self.len(), self.hasher().clone());
        for (k, v) in self {
            out.insert(k.deep_copy(), v.deep_copy());
        }
        out
    }
}

impl<K: DeepCopy + Ord, V: DeepCopy> DeepCopy for BTreeMap<K, V> {
    fn deep_copy(&self) -> Self {
        self.iter()
            .map(|(k, v)| (k.deep_copy(), v.deep_copy()))
            .collect()
    }
}

/// A fresh allocation, not another strong count on the same one.
impl<T: DeepCopy> DeepCopy for Rc<T> {
    fn deep_copy(&self) -> Self {
        Rc::new((**self).deep_copy())
    }
}

impl<T: DeepCopy> DeepCopy for RefCell<T> {
    fn deep_copy(&self) -> Self {
        RefCell::new(self.borrow().deep_copy())
    }
}

macro_rules! deep_copy_tuple {
    ($($name:ident),+) => {
        impl<$($name: DeepCopy),+> DeepCopy for ($($name,)+) {
            #[allow(non_snake_case)]
            fn deep_copy(&self) -> Self {
                let ($($name,)+) = self;
                ($($name.deep_copy(),)+)
            }
        }
    };
}

deep_copy_tuple!(A);
deep_copy_tuple!(A, B);
deep_copy_tuple!(A, B, C);
deep_copy_tuple!(A, B, C, D);
