use std::fmt::Debug;

use crate::{EventSource, ReactiveCell, SourceMode};

pub const UNSET: &str = "<unset>";

/// What an authoring tool shows for one field.
pub trait Inspect {
    fn label(&self) -> String;

    /// The value a reader would currently observe, formatted for display.
    fn effective_value(&self) -> String;
}

impl<T: Debug + 'static> Inspect for ReactiveCell<T> {
    fn label(&self) -> String {
        let description = self.description();
        if description.is_empty() {
            "Cell".to_string()
        } else {
            description
        }
    }

    fn effective_value(&self) -> String {
        self.with_value(|v| format!("{v:?}"))
    }
}

impl<T: Debug + 'static> Inspect for EventSource<T> {
    fn label(&self) -> String {
        match self.mode() {
            SourceMode::DirectChannel => "Event".to_string(),
            SourceMode::FromCell if self.replays_current() => "Cell (replays current)".to_string(),
            SourceMode::FromCell => "Cell".to_string(),
        }
    }

    fn effective_value(&self) -> String {
        match self.mode() {
            SourceMode::DirectChannel => match self.channel() {
                Some(channel) => format!("{} listener(s)", channel.len()),
                None => UNSET.to_string(),
            },
            SourceMode::FromCell => match self.cell() {
                Some(cell) => cell.effective_value(),
                None => UNSET.to_string(),
            },
        }
    }
}
