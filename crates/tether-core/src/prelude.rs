pub use crate::cell::{
    MAX_NOTIFY_DEPTH, Phase, ReactiveCell, Reference, RuntimeMode, WeakCell,
    cell_equals_reference, cells_equal,
};
pub use crate::channel::{Change, Channel, FailurePolicy, Listener, WeakChannel};
pub use crate::config::{CellConfig, EventSourceConfig, ModeTag, Registry};
pub use crate::copy::DeepCopy;
pub use crate::dispose::{Dispose, Subscription};
pub use crate::error::{Error, Result};
pub use crate::inspect::Inspect;
pub use crate::scope::{Activate, CellKey, Scope};
pub use crate::source::{EventSource, SourceMode};
