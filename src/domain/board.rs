use crate::domain::sorting::SortSpec;
use crate::error::{FlightboardError, Result};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{collections::BTreeMap, fmt, path::Path};
use tokio::fs;

/// State key used by a field rule that declares no `states`
pub const DEFAULT_STATE: &str = "default";

/// Field name reserved for overdue tickets
pub const DEFAULT_DELAYED_FIELD: &str = "delayed";

/// A configuration value that may be written as a scalar or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

/// Classification and display rules for one board field (lane)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Tracker statuses that map to this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<OneOrMany<String>>,
    /// Resolutions that disambiguate this field among others sharing a state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    /// Require the ticket to be resolved (`true`) or unresolved (`false`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<bool>,
    /// Drop tickets not updated within this many days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_days: Option<i64>,
    /// Flag tickets due within this many days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_soon_days: Option<i64>,
    /// Only show tickets owned by these teams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
}

impl FieldRule {
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = Some(OneOrMany::Many(states.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_resolutions<I, S>(mut self, resolutions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolution = Some(OneOrMany::Many(
            resolutions.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// State keys this rule applies to, defaulting to [`DEFAULT_STATE`]
    pub fn state_keys(&self) -> Vec<&str> {
        match &self.states {
            Some(states) => states.as_slice().iter().map(String::as_str).collect(),
            None => vec![DEFAULT_STATE],
        }
    }

    /// Resolutions this rule is constrained to, if any
    pub fn resolutions(&self) -> Option<&[String]> {
        self.resolution.as_ref().map(OneOrMany::as_slice)
    }
}

/// Field rules in declaration order
///
/// Declaration order decides both the compile order of the state index and
/// the order of lanes on the board, so it survives (de)serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet(Vec<(String, FieldRule)>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing the rule in place if the name is already declared
    pub fn insert(&mut self, name: impl Into<String>, rule: FieldRule) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = rule,
            None => self.0.push((name, rule)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, rule)| rule)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.0.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, FieldRule)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (S, FieldRule)>>(iter: I) -> Self {
        let mut fields = FieldSet::new();
        for (name, rule) in iter {
            fields.insert(name, rule);
        }
        fields
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, rule) in &self.0 {
            map.serialize_entry(name, rule)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FieldSetVisitor;

        impl<'de> Visitor<'de> for FieldSetVisitor {
            type Value = FieldSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to field rules")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<FieldSet, A::Error> {
                let mut fields = FieldSet::new();
                while let Some((name, rule)) = access.next_entry::<String, FieldRule>()? {
                    fields.insert(name, rule);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldSetVisitor)
    }
}

fn default_delayed_field() -> String {
    DEFAULT_DELAYED_FIELD.to_string()
}

/// Epic board section of the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicsConfig {
    /// Tracker project to query
    pub project: String,
    /// Base list of tracker statuses to query
    #[serde(default)]
    pub status: Vec<String>,
    #[serde(default = "default_delayed_field")]
    pub delayed: String,
    /// Board-wide ordering inside a lane, overridable per field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub fields: FieldSet,
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Team identifier to display name
    #[serde(default)]
    pub teams: BTreeMap<String, String>,
    pub epics: EpicsConfig,
}

impl BoardConfig {
    /// Parses and validates a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FlightboardError::ConfigError(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).await.map_err(|e| {
            FlightboardError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    /// Checks that the configuration can produce a usable state index
    pub fn validate(&self) -> Result<()> {
        if self.epics.project.trim().is_empty() {
            return Err(FlightboardError::ConfigError(
                "epics.project must not be empty".to_string(),
            ));
        }

        if self.classifiable_fields().next().is_none() {
            return Err(FlightboardError::ConfigError(
                "epics.fields declares no classifiable fields".to_string(),
            ));
        }

        Ok(())
    }

    /// Gets the rule for a field
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.epics.fields.get(name)
    }

    /// Fields that issues can be classified into (everything but the delayed field)
    pub fn classifiable_fields(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        let delayed = self.epics.delayed.as_str();
        self.epics
            .fields
            .iter()
            .filter(move |(name, _)| *name != delayed)
    }

    /// Whether the board shows overdue tickets in a lane of their own
    pub fn has_delayed_lane(&self) -> bool {
        self.epics.fields.contains(&self.epics.delayed)
    }
}
