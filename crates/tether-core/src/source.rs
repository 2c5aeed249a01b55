//! # Event sources
//!
//! An [`EventSource<T>`] lets consuming code attach a `Listener<T>` without
//! caring where the notifications come from. It is configured once with a
//! [`SourceMode`]:
//!
//! - `DirectChannel` routes to a [`Channel<T>`] that somebody else invokes.
//! - `FromCell` routes to a [`ReactiveCell<T>`]'s value-only channel, and can
//!   replay the cell's current value to each new listener.
//!
//! The source never owns its providers and keeps no listener list of its
//! own. A provider that was never set, or has since been dropped, turns every
//! call into a no-op.

use std::fmt;
use std::str::FromStr;

use crate::channel::dispatch;
use crate::{Channel, Error, Listener, ReactiveCell, Result, Subscription, WeakCell, WeakChannel};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SourceMode {
    #[default]
    DirectChannel,
    FromCell,
}

impl SourceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceMode::DirectChannel => "direct_channel",
            SourceMode::FromCell => "from_cell",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SourceMode::DirectChannel => SourceMode::FromCell,
            SourceMode::FromCell => SourceMode::DirectChannel,
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceMode {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "direct_channel" => Ok(SourceMode::DirectChannel),
            "from_cell" => Ok(SourceMode::FromCell),
            other => Err(Error::InvalidConfiguration {
                tag: other.to_string(),
            }),
        }
    }
}

/// Numeric tags as stored by older configuration files.
impl TryFrom<u8> for SourceMode {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(SourceMode::DirectChannel),
            1 => Ok(SourceMode::FromCell),
            other => Err(Error::InvalidConfiguration {
                tag: other.to_string(),
            }),
        }
    }
}

pub struct EventSource<T: 'static> {
    mode: SourceMode,
    channel: Option<WeakChannel<T>>,
    cell: Option<WeakCell<T>>,
    replay_current_on_subscribe: bool,
}

impl<T: 'static> EventSource<T> {
    /// An unconnected source; attach providers with [`with_channel`](Self::with_channel)
    /// and [`with_cell`](Self::with_cell).
    pub fn new(mode: SourceMode) -> Self {
        Self {
            mode,
            channel: None,
            cell: None,
            replay_current_on_subscribe: false,
        }
    }

    pub fn direct(channel: &Channel<T>) -> Self {
        Self::new(SourceMode::DirectChannel).with_channel(channel)
    }

    pub fn from_cell(cell: &ReactiveCell<T>, replay_current_on_subscribe: bool) -> Self {
        Self::new(SourceMode::FromCell)
            .with_cell(cell)
            .replay_current(replay_current_on_subscribe)
    }

    pub fn with_channel(mut self, channel: &Channel<T>) -> Self {
        self.channel = Some(channel.downgrade());
        self
    }

    pub fn with_cell(mut self, cell: &ReactiveCell<T>) -> Self {
        self.cell = Some(cell.downgrade());
        self
    }

    /// Only consulted in [`SourceMode::FromCell`].
    pub fn replay_current(mut self, replay: bool) -> Self {
        self.replay_current_on_subscribe = replay;
        self
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn replays_current(&self) -> bool {
        self.replay_current_on_subscribe
    }

    pub fn channel(&self) -> Option<Channel<T>> {
        self.channel.as_ref().and_then(WeakChannel::upgrade)
    }

    pub fn cell(&self) -> Option<ReactiveCell<T>> {
        self.cell.as_ref().and_then(WeakCell::upgrade)
    }

    /// Whether the provider selected by the mode is present.
    pub fn is_connected(&self) -> bool {
        match self.mode {
            SourceMode::DirectChannel => self.channel().is_some(),
            SourceMode::FromCell => self.cell().is_some(),
        }
    }

    /// Detaches `listener` from the active provider. Returns whether it was
    /// attached there; an unset provider detaches nothing.
    pub fn remove_listener(&self, listener: &Listener<T>) -> bool {
        match self.mode {
            SourceMode::DirectChannel => self
                .channel()
                .is_some_and(|channel| channel.remove_listener(listener)),
            SourceMode::FromCell => self
                .cell()
                .is_some_and(|cell| cell.remove_listener(listener)),
        }
    }
}

impl<T: Clone + 'static> EventSource<T> {
    /// Routes `listener` to the active provider.
    ///
    /// In [`SourceMode::FromCell`] with replay enabled the listener is first
    /// attached and then called once with the cell's current value; a failure
    /// of that call is reported under the cell's failure policy.
    pub fn add_listener(&self, listener: &Listener<T>) -> Result<()> {
        match self.mode {
            SourceMode::DirectChannel => {
                let Some(channel) = self.channel() else {
                    log::trace!("event source: no channel, {listener:?} not attached");
                    return Ok(());
                };
                channel.add_listener(listener);
                Ok(())
            }
            SourceMode::FromCell => {
                let Some(cell) = self.cell() else {
                    log::trace!("event source: no cell, {listener:?} not attached");
                    return Ok(());
                };
                cell.add_listener(listener);
                if self.replay_current_on_subscribe {
                    let current = cell.get_value();
                    dispatch(std::slice::from_ref(listener), &current, cell.failure_policy())?;
                }
                Ok(())
            }
        }
    }

    /// Like [`add_listener`](Self::add_listener), returning a guard that
    /// removes the listener again.
    pub fn subscribe(&self, listener: Listener<T>) -> Result<Subscription> {
        self.add_listener(&listener)?;
        let source = self.clone();
        Ok(Subscription::new(move || {
            source.remove_listener(&listener);
        }))
    }
}

impl<T: 'static> Clone for EventSource<T> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            channel: self.channel.clone(),
            cell: self.cell.clone(),
            replay_current_on_subscribe: self.replay_current_on_subscribe,
        }
    }
}

impl<T: 'static> fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("mode", &self.mode)
            .field("channel", &self.channel)
            .field("cell", &self.cell)
            .field("replay_current_on_subscribe", &self.replay_current_on_subscribe)
            .finish()
    }
}
