use tether_core::{EventSourceConfig, Inspect, Result, SourceMode};

/// One inspected field, ready to be drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub label: String,
    pub value: String,
}

impl Row {
    pub fn line(&self) -> String {
        format!("{} [{}] = {}", self.name, self.label, self.value)
    }
}

/// Watches cells and event sources and formats their current state.
pub struct Inspector {
    pub enabled: bool,
    entries: Vec<(String, Box<dyn Inspect>)>,
    frame_count: u64,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            enabled: false,
            entries: Vec::new(),
            frame_count: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn watch(&mut self, name: impl Into<String>, entry: impl Inspect + 'static) {
        self.entries.push((name.into(), Box::new(entry)));
    }

    pub fn unwatch(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() != before
    }

    pub fn rows(&self) -> Vec<Row> {
        self.entries
            .iter()
            .map(|(name, entry)| Row {
                name: name.clone(),
                label: entry.label(),
                value: entry.effective_value(),
            })
            .collect()
    }

    /// A single status line for the current frame, or `None` while disabled.
    pub fn overlay(&mut self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        self.frame_count += 1;
        let mut lines = vec![format!("frame: {}", self.frame_count)];
        lines.extend(self.rows().iter().map(Row::line));
        Some(lines.join("  |  "))
    }

    /// The mode switch an authoring tool shows next to an event source field.
    pub fn toggle_mode(&self, config: &mut EventSourceConfig) -> Result<SourceMode> {
        let mode = config.toggle_mode()?;
        log::debug!("inspector: event source switched to {mode}");
        Ok(mode)
    }
}

/// Caption for the mode switch: what the field currently listens to.
pub fn mode_button_label(mode: SourceMode) -> &'static str {
    match mode {
        SourceMode::DirectChannel => "Event",
        SourceMode::FromCell => "Cell",
    }
}
