//! # Cells, Channels, and Event Sources
//!
//! Tether is a small, single-threaded observer core. There are three main
//! pieces:
//!
//! - `ReactiveCell<T>`: a typed value that remembers what it replaced and
//!   broadcasts every write.
//! - `Channel<A>`: a plain broadcast list of listeners.
//! - `EventSource<T>`: one attach/detach contract routed to either of the
//!   two above.
//!
//! ## Cells
//!
//! ```rust
//! use tether_core::*;
//!
//! let ammo = ReactiveCell::new(30u32).described("Ammo");
//! ammo.activate(RuntimeMode::Live);
//!
//! ammo.on_change(|v| log::info!("ammo = {v}"));
//! ammo.set_value(29)?;
//! assert_eq!((ammo.previous_value(), ammo.get_value()), (30, 29));
//! # Ok::<(), tether_core::Error>(())
//! ```
//!
//! Every write notifies the value-only listeners first and the history
//! listeners (`Change { previous, current }`) second, synchronously and in
//! attachment order. A listener that writes back into the cell is served
//! right away, nested inside the outer write.
//!
//! ## Event sources
//!
//! Consumers that only want "tell me when it changes" take an
//! `EventSource<T>` and never learn whether it is backed by a channel or a
//! cell:
//!
//! ```rust
//! use tether_core::*;
//!
//! let level = ReactiveCell::new(1);
//! level.activate(RuntimeMode::Live);
//!
//! let source = EventSource::from_cell(&level, true);
//! let sub = source.subscribe(Listener::new(|v: &i32| log::info!("level {v}")))?;
//! level.set_value(2)?;
//! sub.unsubscribe();
//! # Ok::<(), tether_core::Error>(())
//! ```
//!
//! ## Activation
//!
//! Cells start `Uninitialized` and read as `T::default()` until reset.
//! `activate(RuntimeMode::Live)` resets them from deep copies of their
//! initial value; `RuntimeMode::Authoring` leaves them alone. A `Scope`
//! activates every cell it adopted in one call.

pub mod cell;
pub mod channel;
pub mod config;
pub mod copy;
pub mod dispose;
pub mod error;
pub mod inspect;
pub mod prelude;
pub mod scope;
pub mod source;

pub use cell::*;
pub use channel::{Change, Channel, FailurePolicy, Listener, WeakChannel};
pub use config::*;
pub use copy::*;
pub use dispose::*;
pub use error::*;
pub use inspect::*;
pub use scope::*;
pub use source::*;
