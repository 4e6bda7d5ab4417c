//! Case-insensitive, insertion-ordered rule maps

use crate::log_warning;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;

/// Occurrence bounds for one name; `max == 0` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OccurrenceBound {
    pub min: u32,
    pub max: u32,
}

impl OccurrenceBound {
    pub const UNCONSTRAINED: OccurrenceBound = OccurrenceBound { min: 0, max: 0 };

    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Exactly `count` occurrences
    pub fn exactly(count: u32) -> Self {
        Self::new(count, count)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    pub fn is_bounded(&self) -> bool {
        self.max > 0
    }

    pub(crate) fn to_value(self) -> Value {
        if self.is_unconstrained() {
            Value::Null
        } else {
            json!({ "min": self.min, "max": self.max })
        }
    }

    /// Count suffix in the text grammar, empty when unconstrained
    pub(crate) fn text_suffix(&self) -> String {
        match (self.min, self.max) {
            (0, 0) => String::new(),
            (min, max) if min == max => format!(":{}", min),
            (min, 0) => format!(":{},", min),
            (0, max) => format!(":,{}", max),
            (min, max) => format!(":{},{}", min, max),
        }
    }
}

impl fmt::Display for OccurrenceBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            0 => write!(f, "{}..", self.min),
            max => write!(f, "{}..{}", self.min, max),
        }
    }
}

impl Serialize for OccurrenceBound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

/// JSON form `{ "min": n, "max": n }`; keys match case-insensitively and
/// either may be absent or null
impl<'de> Deserialize<'de> for OccurrenceBound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BoundVisitor;

        impl<'de> Visitor<'de> for BoundVisitor {
            type Value = OccurrenceBound;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with optional non-negative 'min' and 'max' counts")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut bound = OccurrenceBound::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("min") {
                        bound.min = map.next_value::<Option<u32>>()?.unwrap_or(0);
                    } else if key.eq_ignore_ascii_case("max") {
                        bound.max = map.next_value::<Option<u32>>()?.unwrap_or(0);
                    } else {
                        log_warning!("Ignoring unknown field in occurrence bound", "field" => &key);
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(bound)
            }
        }

        deserializer.deserialize_map(BoundVisitor)
    }
}

/// Rule names to occurrence bounds.
///
/// Lookups ignore case; iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    entries: Vec<(String, OccurrenceBound)>,
    index: HashMap<String, usize>,
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&OccurrenceBound> {
        self.index
            .get(&name.to_lowercase())
            .map(|&position| &self.entries[position].1)
    }

    /// Declared name and bound for `name`, ignoring case
    pub fn get_entry(&self, name: &str) -> Option<(&str, &OccurrenceBound)> {
        self.index.get(&name.to_lowercase()).map(|&position| {
            let (declared, bound) = &self.entries[position];
            (declared.as_str(), bound)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// Insert or replace; a replaced entry keeps its position and takes the
    /// new spelling. Returns the previous bound.
    pub fn insert(&mut self, name: impl Into<String>, bound: OccurrenceBound) -> Option<OccurrenceBound> {
        let name = name.into();
        match self.index.get(&name.to_lowercase()) {
            Some(&position) => {
                let previous = std::mem::replace(&mut self.entries[position], (name, bound));
                Some(previous.1)
            }
            None => {
                self.index.insert(name.to_lowercase(), self.entries.len());
                self.entries.push((name, bound));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OccurrenceBound)> {
        self.entries.iter().map(|(name, bound)| (name.as_str(), bound))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(name, bound)| (name.clone(), bound.to_value()))
                .collect(),
        )
    }
}

/// Equal when both hold the same names with the same bounds, in any order
impl PartialEq for RuleMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, bound)| other.get_entry(name) == Some((name, bound)))
    }
}

impl Eq for RuleMap {}

impl<'a> FromIterator<(&'a str, OccurrenceBound)> for RuleMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, OccurrenceBound)>>(iter: I) -> Self {
        let mut map = RuleMap::new();
        for (name, bound) in iter {
            map.insert(name, bound);
        }
        map
    }
}

/// JSON object of name to bound (or null). Names differing only by case
/// collapse to the last one.
impl<'de> Deserialize<'de> for RuleMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleMapVisitor;

        impl<'de> Visitor<'de> for RuleMapVisitor {
            type Value = RuleMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping rule names to occurrence bounds")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = RuleMap::new();
                while let Some(name) = access.next_key::<String>()? {
                    let bound = access.next_value::<Option<OccurrenceBound>>()?;
                    if name.trim().is_empty() {
                        return Err(de::Error::custom("rule name must not be empty"));
                    }
                    if let Some((previous, _)) = map.get_entry(&name) {
                        log_warning!("Rule names differ only by case; the last one wins",
                            "previous" => previous,
                            "name" => &name
                        );
                    }
                    map.insert(name, bound.unwrap_or_default());
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(RuleMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut map = RuleMap::new();
        map.insert("startsWith", OccurrenceBound::exactly(1));

        assert_eq!(map.get("STARTSWITH"), Some(&OccurrenceBound::exactly(1)));
        assert_eq!(map.get_entry("startswith").map(|(n, _)| n), Some("startsWith"));
        assert!(!map.contains("endsWith"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map: RuleMap = [
            ("eq", OccurrenceBound::UNCONSTRAINED),
            ("and", OccurrenceBound::new(2, 0)),
        ]
        .into_iter()
        .collect();

        let previous = map.insert("EQ", OccurrenceBound::new(1, 3));
        assert_eq!(previous, Some(OccurrenceBound::UNCONSTRAINED));
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["EQ", "and"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: RuleMap = [("eq", OccurrenceBound::UNCONSTRAINED), ("ne", OccurrenceBound::exactly(1))]
            .into_iter()
            .collect();
        let b: RuleMap = [("ne", OccurrenceBound::exactly(1)), ("eq", OccurrenceBound::UNCONSTRAINED)]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bound_json() {
        let bound: OccurrenceBound = serde_json::from_str(r#"{"MIN": 2}"#).unwrap();
        assert_eq!(bound, OccurrenceBound::new(2, 0));
        assert!(serde_json::from_str::<OccurrenceBound>(r#"{"min": -1}"#).is_err());
        assert!(serde_json::from_str::<OccurrenceBound>(r#"{"min": 1.5}"#).is_err());
        assert_eq!(OccurrenceBound::UNCONSTRAINED.to_value(), Value::Null);
    }

    #[test]
    fn test_text_suffix() {
        assert_eq!(OccurrenceBound::UNCONSTRAINED.text_suffix(), "");
        assert_eq!(OccurrenceBound::exactly(2).text_suffix(), ":2");
        assert_eq!(OccurrenceBound::new(2, 0).text_suffix(), ":2,");
        assert_eq!(OccurrenceBound::new(0, 5).text_suffix(), ":,5");
        assert_eq!(OccurrenceBound::new(1, 2).text_suffix(), ":1,2");
    }

    #[test]
    fn test_map_json_last_case_duplicate_wins() {
        let map: RuleMap = serde_json::from_str(r#"{"eq": null, "EQ": {"min": 1}}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_entry("eq"), Some(("EQ", &OccurrenceBound::new(1, 0))));
    }
}
