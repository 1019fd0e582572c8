use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use std::fmt;
use std::str::FromStr;

/// Stable identity of a domain entity: the provider (type tag) plus the
/// identifier within that provider.
///
/// String form is `"<provider>::<identifier>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    provider_name: String,
    identifier: String,
}

impl EntityId {
    pub fn new(provider_name: impl Into<String>, identifier: impl ToString) -> Self {
        Self {
            provider_name: provider_name.into(),
            identifier: identifier.to_string(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.provider_name, self.identifier)
    }
}

impl FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("::") {
            Some((provider, id)) if !provider.is_empty() && !id.is_empty() => {
                Ok(Self::new(provider, id))
            }
            _ => Err(format!("invalid entity id: '{s}'")),
        }
    }
}

/// A domain entity driven through a workflow.
///
/// The engine treats the payload as an opaque property map; actions mutate it
/// and the entity repository persists it after a successful transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Entity {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            properties: Map::new(),
        }
    }

    pub fn with_properties(id: EntityId, properties: Map<String, Value>) -> Self {
        Self { id, properties }
    }

    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_display_and_parse() {
        let id = EntityId::new("article", 5);
        assert_eq!(id.to_string(), "article::5");

        let parsed: EntityId = "article::5".parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.provider_name(), "article");
        assert_eq!(parsed.identifier(), "5");
    }

    #[test]
    fn test_entity_id_rejects_malformed_strings() {
        assert!("article".parse::<EntityId>().is_err());
        assert!("::5".parse::<EntityId>().is_err());
        assert!("article::".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_entity_properties() {
        let mut entity = Entity::new(EntityId::new("article", 1));
        assert!(!entity.has_property("title"));

        entity.set_property("title", json!("Hello"));
        assert_eq!(entity.get_property("title"), Some(&json!("Hello")));
    }
}
