//! Filter rules
//!
//! A rule set lists the operators and properties a filter may (or must)
//! use, each with occurrence bounds. Rules are read from JSON
//! (`{"Operators": {...}, "Properties": {...}}`) or from the pipe-delimited
//! text grammar `{o:|p:}name{:min,max}|...`.

mod classifier;
mod error;
mod map;

pub use classifier::{classify, ClassifiedName, NameKind, KNOWN_OPERATORS};
pub use error::RuleError;
pub use map::{OccurrenceBound, RuleMap};

use crate::config::compile_time::rules::{MAX_RULE_COUNT, MAX_RULE_TEXT_LENGTH};
use crate::logging::codes;
use crate::{log_error, log_success, log_warning};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const OPERATORS_FIELD: &str = "Operators";
const PROPERTIES_FIELD: &str = "Properties";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    operators: RuleMap,
    properties: RuleMap,
}

impl RuleSet {
    /// Empty rule set; every name is permitted
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_maps(operators: RuleMap, properties: RuleMap) -> Self {
        Self {
            operators,
            properties,
        }
    }

    /// Parse rules from JSON or the text grammar. Blank input gives an empty set.
    pub fn deserialize(input: &str) -> Result<Self, RuleError> {
        let result = Self::parse_input(input);

        match &result {
            Ok(rules) => {
                log_success!(codes::success::RULES_PARSED, "Filter rules parsed",
                    "operators" => rules.operators.len(),
                    "properties" => rules.properties.len()
                );
            }
            Err(error) => {
                log_error!(error.error_code(), "Cannot parse filter rules",
                    "error" => error.root_cause()
                );
            }
        }

        result
    }

    fn parse_input(input: &str) -> Result<Self, RuleError> {
        if input.len() > MAX_RULE_TEXT_LENGTH {
            return Err(RuleError::LimitExceeded {
                what: "rule text length",
                actual: input.len(),
                limit: MAX_RULE_TEXT_LENGTH,
            });
        }

        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::new());
        }

        let rules = if input.starts_with('{') {
            serde_json::from_str::<RuleSet>(input).map_err(|source| RuleError::Json {
                input: input.to_string(),
                source,
            })?
        } else {
            Self::parse_text(input).map_err(|source| match source {
                RuleError::LimitExceeded { .. } => source,
                source => RuleError::Text {
                    input: input.to_string(),
                    source: Box::new(source),
                },
            })?
        };

        rules.check_limits()?;
        rules.warn_inverted_bounds();
        Ok(rules)
    }

    fn parse_text(input: &str) -> Result<Self, RuleError> {
        let mut rules = Self::new();
        for segment in input.split('|').filter(|s| !s.trim().is_empty()) {
            let classified = classify(segment)?;
            let bound = OccurrenceBound::new(classified.min, classified.max);
            match classified.kind {
                NameKind::Operator => rules.add_operator(classified.name, bound)?,
                NameKind::Property => rules.add_property(classified.name, bound)?,
            }
            rules.check_limits()?;
        }
        Ok(rules)
    }

    fn check_limits(&self) -> Result<(), RuleError> {
        let count = self.operators.len() + self.properties.len();
        if count > MAX_RULE_COUNT {
            return Err(RuleError::LimitExceeded {
                what: "rule count",
                actual: count,
                limit: MAX_RULE_COUNT,
            });
        }
        Ok(())
    }

    fn warn_inverted_bounds(&self) {
        let all = self
            .operators
            .iter()
            .map(|(name, bound)| (NameKind::Operator, name, bound))
            .chain(
                self.properties
                    .iter()
                    .map(|(name, bound)| (NameKind::Property, name, bound)),
            );
        for (kind, name, bound) in all {
            if bound.is_bounded() && bound.min > bound.max {
                log_warning!("Rule minimum exceeds its maximum and can never pass",
                    "kind" => kind,
                    "name" => name,
                    "min" => bound.min,
                    "max" => bound.max
                );
            }
        }
    }

    pub fn add_operator(
        &mut self,
        name: impl Into<String>,
        bound: OccurrenceBound,
    ) -> Result<(), RuleError> {
        Self::add(&mut self.operators, NameKind::Operator, name.into(), bound)
    }

    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        bound: OccurrenceBound,
    ) -> Result<(), RuleError> {
        Self::add(&mut self.properties, NameKind::Property, name.into(), bound)
    }

    fn add(
        map: &mut RuleMap,
        kind: NameKind,
        name: String,
        bound: OccurrenceBound,
    ) -> Result<(), RuleError> {
        if name.trim().is_empty() {
            return Err(RuleError::EmptyName { rule: name });
        }
        if map.contains(&name) {
            return Err(RuleError::Duplicate { name, kind });
        }
        map.insert(name, bound);
        Ok(())
    }

    pub fn operators(&self) -> &RuleMap {
        &self.operators
    }

    pub fn properties(&self) -> &RuleMap {
        &self.properties
    }

    pub fn rules(&self, kind: NameKind) -> &RuleMap {
        match kind {
            NameKind::Operator => &self.operators,
            NameKind::Property => &self.properties,
        }
    }

    pub fn operator(&self, name: &str) -> Option<&OccurrenceBound> {
        self.operators.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&OccurrenceBound> {
        self.properties.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty() && self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operators.len() + self.properties.len()
    }

    pub fn to_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        object.insert(OPERATORS_FIELD.to_string(), self.operators.to_value());
        object.insert(PROPERTIES_FIELD.to_string(), self.properties.to_value());
        Value::Object(object)
    }

    /// JSON wire format; unconstrained bounds are written as `null`
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Text grammar with explicit `o:`/`p:` prefixes
    pub fn to_text(&self) -> Result<String, RuleError> {
        let mut segments = Vec::with_capacity(self.len());
        for kind in [NameKind::Operator, NameKind::Property] {
            for (name, bound) in self.rules(kind).iter() {
                if name.contains(['|', ':']) || name.trim() != name {
                    return Err(RuleError::UnrepresentableName {
                        name: name.to_string(),
                        kind,
                    });
                }
                let mut suffix = bound.text_suffix();
                // `p:123` would read back as name `p` with count 123
                if suffix.is_empty() && classifier::looks_like_counts(name) {
                    suffix.push(':');
                }
                segments.push(format!("{}:{}{}", kind.prefix(), name, suffix));
            }
        }
        Ok(segments.join("|"))
    }
}

impl FromStr for RuleSet {
    type Err = RuleError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        RuleSet::deserialize(input)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl Serialize for RuleSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

/// `Operators`/`Properties` matched case-insensitively; a null or absent
/// mapping is empty and unknown fields are skipped
impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with 'Operators' and 'Properties' rule mappings")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut operators: Option<RuleMap> = None;
                let mut properties: Option<RuleMap> = None;

                while let Some(key) = access.next_key::<String>()? {
                    if key.eq_ignore_ascii_case(OPERATORS_FIELD) {
                        if operators.is_some() {
                            return Err(de::Error::duplicate_field(OPERATORS_FIELD));
                        }
                        operators = Some(access.next_value::<Option<RuleMap>>()?.unwrap_or_default());
                    } else if key.eq_ignore_ascii_case(PROPERTIES_FIELD) {
                        if properties.is_some() {
                            return Err(de::Error::duplicate_field(PROPERTIES_FIELD));
                        }
                        properties = Some(access.next_value::<Option<RuleMap>>()?.unwrap_or_default());
                    } else {
                        log_warning!("Ignoring unknown field in filter rules", "field" => &key);
                        access.next_value::<IgnoredAny>()?;
                    }
                }

                Ok(RuleSet::from_maps(
                    operators.unwrap_or_default(),
                    properties.unwrap_or_default(),
                ))
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}
