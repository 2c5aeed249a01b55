//! # Configuration
//!
//! Cells and event sources are usually described by data rather than built
//! by hand. Both have a serde-friendly config type, and event sources name
//! their providers, which are looked up in a [`Registry`]:
//!
//! ```rust
//! use tether_core::*;
//!
//! let score = ReactiveCell::from_config(CellConfig::<i32>::from_json(
//!     r#"{ "description": "Score", "initial_value": 10 }"#,
//! )?);
//!
//! let mut registry = Registry::default();
//! registry.insert_cell("score", &score);
//!
//! let config = EventSourceConfig::from_json(
//!     r#"{ "mode": "from_cell", "cell": "score", "notify_current_value": true }"#,
//! )?;
//! let source: EventSource<i32> = EventSource::from_config(&config, &registry)?;
//! assert_eq!(source.mode(), SourceMode::FromCell);
//! # Ok::<(), tether_core::Error>(())
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Channel, Error, EventSource, FailurePolicy, ReactiveCell, Result, SourceMode};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellConfig<T> {
    #[serde(default)]
    pub description: String,
    pub initial_value: T,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl<T> CellConfig<T> {
    pub fn new(initial_value: T) -> Self {
        Self {
            description: String::new(),
            initial_value,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl<T: DeserializeOwned> CellConfig<T> {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<T: Serialize> CellConfig<T> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<T: Default + 'static> ReactiveCell<T> {
    /// Builds an uninitialized cell; activate it to load the initial value.
    pub fn from_config(config: CellConfig<T>) -> Self {
        ReactiveCell::with_policy(config.initial_value, config.failure_policy)
            .described(config.description)
    }
}

/// A mode tag as written in configuration: a name or a legacy index.
///
/// Any other JSON value is kept as [`ModeTag::Other`] so that resolving it
/// reports the offending tag instead of failing to parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeTag {
    Index(i64),
    Name(String),
    Other(serde_json::Value),
}

impl ModeTag {
    pub fn resolve(&self) -> Result<SourceMode> {
        match self {
            ModeTag::Index(i) => u8::try_from(*i)
                .map_err(|_| Error::InvalidConfiguration { tag: i.to_string() })
                .and_then(SourceMode::try_from),
            ModeTag::Name(name) => name.parse(),
            ModeTag::Other(value) => Err(Error::InvalidConfiguration {
                tag: value.to_string(),
            }),
        }
    }
}

impl Default for ModeTag {
    fn default() -> Self {
        SourceMode::default().into()
    }
}

impl From<SourceMode> for ModeTag {
    fn from(mode: SourceMode) -> Self {
        ModeTag::Name(mode.as_str().to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSourceConfig {
    #[serde(default)]
    pub mode: ModeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(default)]
    pub notify_current_value: bool,
}

impl EventSourceConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn source_mode(&self) -> Result<SourceMode> {
        self.mode.resolve()
    }

    /// Switches between the two modes, keeping both provider names.
    pub fn toggle_mode(&mut self) -> Result<SourceMode> {
        let next = self.source_mode()?.toggled();
        self.mode = next.into();
        Ok(next)
    }
}

impl<T: 'static> EventSource<T> {
    /// Resolves the providers named by `config`.
    ///
    /// Only the provider of the configured mode has to exist; a name given
    /// for the other mode is ignored.
    pub fn from_config(config: &EventSourceConfig, registry: &Registry) -> Result<Self> {
        let mode = config.source_mode()?;
        let mut source = EventSource::new(mode).replay_current(config.notify_current_value);
        match mode {
            SourceMode::DirectChannel => {
                if let Some(name) = &config.channel {
                    source = source.with_channel(&registry.channel::<T>(name)?);
                }
            }
            SourceMode::FromCell => {
                if let Some(name) = &config.cell {
                    source = source.with_cell(&registry.cell::<T>(name)?);
                }
            }
        }
        Ok(source)
    }
}

/// Named providers of any value type.
///
/// The registry holds strong handles, so it keeps registered providers alive
/// for event sources built from it.
#[derive(Default)]
pub struct Registry {
    cells: HashMap<String, Box<dyn Any>>,
    channels: HashMap<String, Box<dyn Any>>,
}

impl Registry {
    pub fn insert_cell<T: 'static>(&mut self, name: impl Into<String>, cell: &ReactiveCell<T>) {
        insert(&mut self.cells, name.into(), Box::new(cell.clone()));
    }

    pub fn insert_channel<T: 'static>(&mut self, name: impl Into<String>, channel: &Channel<T>) {
        insert(&mut self.channels, name.into(), Box::new(channel.clone()));
    }

    pub fn cell<T: 'static>(&self, name: &str) -> Result<ReactiveCell<T>> {
        lookup(&self.cells, name)
    }

    pub fn channel<T: 'static>(&self, name: &str) -> Result<Channel<T>> {
        lookup(&self.channels, name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let cell = self.cells.remove(name).is_some();
        let channel = self.channels.remove(name).is_some();
        cell || channel
    }

    pub fn len(&self) -> usize {
        self.cells.len() + self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert(map: &mut HashMap<String, Box<dyn Any>>, name: String, entry: Box<dyn Any>) {
    if let Some(old) = map.get(&name)
        && (**old).type_id() != (*entry).type_id()
    {
        log::warn!("registry: '{name}' re-registered with a different type; replacing.");
    }
    map.insert(name, entry);
}

fn lookup<P: Clone + 'static>(map: &HashMap<String, Box<dyn Any>>, name: &str) -> Result<P> {
    let entry = map.get(name).ok_or_else(|| Error::MissingProvider {
        name: name.to_string(),
    })?;
    entry
        .downcast_ref::<P>()
        .cloned()
        .ok_or_else(|| Error::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<P>(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_accepts_names_and_legacy_indices() {
        let by_name = EventSourceConfig::from_json(r#"{ "mode": "from_cell" }"#).unwrap();
        let by_index = EventSourceConfig::from_json(r#"{ "mode": 1 }"#).unwrap();
        let missing = EventSourceConfig::from_json("{}").unwrap();

        assert_eq!(by_name.source_mode().unwrap(), SourceMode::FromCell);
        assert_eq!(by_index.source_mode().unwrap(), SourceMode::FromCell);
        assert_eq!(missing.source_mode().unwrap(), SourceMode::DirectChannel);
    }

    #[test]
    fn unknown_mode_names_the_tag() {
        let config = EventSourceConfig::from_json(r#"{ "mode": "telepathy" }"#).unwrap();
        let err = EventSource::<i32>::from_config(&config, &Registry::default()).unwrap_err();
        match err {
            Error::InvalidConfiguration { tag } => assert_eq!(tag, "telepathy"),
            other => panic!("unexpected error: {other}"),
        }

        for (json, expected) in [
            (r#"{ "mode": 7 }"#, "7"),
            (r#"{ "mode": 300 }"#, "300"),
            (r#"{ "mode": -1 }"#, "-1"),
            (r#"{ "mode": true }"#, "true"),
            (r#"{ "mode": 1.5 }"#, "1.5"),
        ] {
            let config = EventSourceConfig::from_json(json).unwrap();
            assert!(
                matches!(
                    EventSource::<i32>::from_config(&config, &Registry::default()),
                    Err(Error::InvalidConfiguration { ref tag }) if tag == expected
                ),
                "{json}"
            );
        }
    }

    #[test]
    fn toggle_keeps_provider_names() {
        let mut config = EventSourceConfig {
            channel: Some("ch".into()),
            cell: Some("hp".into()),
            ..Default::default()
        };
        assert_eq!(config.toggle_mode().unwrap(), SourceMode::FromCell);
        assert_eq!(config.toggle_mode().unwrap(), SourceMode::DirectChannel);
        assert_eq!(config.channel.as_deref(), Some("ch"));
        assert_eq!(config.cell.as_deref(), Some("hp"));
    }

    #[test]
    fn registry_checks_names_and_types() {
        let mut registry = Registry::default();
        registry.insert_cell("hp", &ReactiveCell::new(5i32));

        assert!(registry.cell::<i32>("hp").is_ok());
        assert!(matches!(
            registry.cell::<String>("hp"),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            registry.cell::<i32>("mp"),
            Err(Error::MissingProvider { name }) if name == "mp"
        ));
        assert!(matches!(
            registry.channel::<i32>("hp"),
            Err(Error::MissingProvider { .. })
        ));
    }

    #[test]
    fn only_the_active_provider_must_resolve() {
        let mut registry = Registry::default();
        registry.insert_channel("hits", &Channel::<i32>::new());

        let config = EventSourceConfig {
            mode: SourceMode::DirectChannel.into(),
            channel: Some("hits".into()),
            cell: Some("not-registered".into()),
            notify_current_value: false,
        };
        let source = EventSource::<i32>::from_config(&config, &registry).unwrap();
        assert!(source.is_connected());

        let config = EventSourceConfig {
            mode: SourceMode::FromCell.into(),
            ..config
        };
        assert!(matches!(
            EventSource::<i32>::from_config(&config, &registry),
            Err(Error::MissingProvider { name }) if name == "not-registered"
        ));
    }

    #[test]
    fn cell_config_round_trips_through_json() {
        let config = CellConfig {
            description: "Ammo".to_string(),
            initial_value: vec![1u32, 2],
            failure_policy: FailurePolicy::LogAndContinue,
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("log_and_continue"));
        assert_eq!(CellConfig::<Vec<u32>>::from_json(&json).unwrap(), config);

        let cell = ReactiveCell::from_config(config);
        assert_eq!(cell.description(), "Ammo");
        assert_eq!(cell.failure_policy(), FailurePolicy::LogAndContinue);
        assert!(cell.get_value().is_empty());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            CellConfig::<i32>::from_json("{ initial_value: }"),
            Err(Error::Config(_))
        ));
    }
}
