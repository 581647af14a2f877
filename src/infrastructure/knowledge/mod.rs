//! Agronomy knowledge base
//!
//! Crops, states, pest/disease guidance and government schemes. A copy of
//! `data/knowledge.yaml` is compiled in; deployments may point at their own file.
//! Entries keep the order they have in the file.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use crate::application::errors::AppError;
use crate::domain::entities::{CropInfo, Scheme, StateInfo};

const BUILTIN_KNOWLEDGE: &str = include_str!("../../../data/knowledge.yaml");

/// String-keyed entries in document order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lowercase_keys(mut self) -> Self {
        for (key, _) in &mut self.entries {
            *key = key.to_lowercase();
        }
        self
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(OrderedMap { entries })
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KnowledgeBase {
    crops: OrderedMap<CropInfo>,
    states: OrderedMap<StateInfo>,
    #[serde(default)]
    pest_disease: OrderedMap<serde_json::Value>,
    #[serde(default)]
    schemes: OrderedMap<Scheme>,
}

impl KnowledgeBase {
    /// Parse the knowledge base shipped with the binary
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_yaml(BUILTIN_KNOWLEDGE)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Knowledge(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, AppError> {
        let mut kb: KnowledgeBase = serde_yaml::from_str(content)
            .map_err(|e| AppError::Knowledge(format!("Failed to parse knowledge base: {}", e)))?;

        // Lookups are done on lowercase keys
        kb.crops = kb.crops.lowercase_keys();
        kb.states = kb.states.lowercase_keys();
        Ok(kb)
    }

    pub fn crop(&self, name: &str) -> Option<&CropInfo> {
        self.crops.get(&name.trim().to_lowercase())
    }

    pub fn state(&self, name: &str) -> Option<&StateInfo> {
        self.states.get(&name.trim().to_lowercase())
    }

    pub fn pest_disease(&self, issue: &str) -> Option<&serde_json::Value> {
        self.pest_disease.get(&issue.trim().to_lowercase())
    }

    pub fn crops(&self) -> impl Iterator<Item = (&str, &CropInfo)> {
        self.crops.iter()
    }

    pub fn states(&self) -> impl Iterator<Item = (&str, &StateInfo)> {
        self.states.iter()
    }

    pub fn schemes(&self) -> &OrderedMap<Scheme> {
        &self.schemes
    }

    pub fn crop_names(&self) -> Vec<String> {
        self.crops.keys().map(str::to_string).collect()
    }

    pub fn state_names(&self) -> Vec<String> {
        self.states.keys().map(str::to_string).collect()
    }
}

/// Capitalize the first letter of every word, lowercase the rest.
///
/// Word boundaries are any non-alphabetic character, so `sandy-loam`
/// becomes `Sandy-Loam`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
