//! Resolved entity model with case-insensitive lookups

use super::definition::{default_namespace, ModelDefinition, TypeRef};
use super::error::ModelError;
use std::collections::{BTreeMap, HashMap};

const PRIMITIVE_PREFIX: &str = "Edm.";

/// Target of a property, after resolving type names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyTarget {
    /// `Edm.*` primitive
    Primitive(String),
    /// Declared structured (entity or complex) type, by canonical name
    Structured(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyType {
    pub target: PropertyTarget,
    pub is_collection: bool,
}

impl PropertyType {
    pub fn is_structured(&self) -> bool {
        matches!(self.target, PropertyTarget::Structured(_))
    }

    pub fn structured_name(&self) -> Option<&str> {
        match &self.target {
            PropertyTarget::Structured(name) => Some(name),
            PropertyTarget::Primitive(_) => None,
        }
    }

    pub fn type_name(&self) -> &str {
        match &self.target {
            PropertyTarget::Primitive(name) | PropertyTarget::Structured(name) => name,
        }
    }
}

/// Entity or complex type with its declared properties
#[derive(Debug, Clone)]
pub struct StructuredType {
    name: String,
    properties: BTreeMap<String, PropertyType>,
    index: HashMap<String, String>,
}

impl StructuredType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyType)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Case-insensitive property lookup returning the declared name
    pub fn property(&self, name: &str) -> Option<(&str, &PropertyType)> {
        let canonical = self.index.get(&name.to_lowercase())?;
        self.properties
            .get_key_value(canonical)
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Schema element summary for printing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaElement {
    pub full_name: String,
    pub kind: &'static str,
}

/// Explicit description of the types a filter may reference.
///
/// An untyped model has no root entity and accepts any property path as
/// written.
#[derive(Debug, Clone)]
pub struct EntityModel {
    namespace: String,
    entity: Option<String>,
    types: BTreeMap<String, StructuredType>,
    type_index: HashMap<String, String>,
}

impl EntityModel {
    /// Model that accepts any property path
    pub fn untyped() -> Self {
        Self {
            namespace: default_namespace(),
            entity: None,
            types: BTreeMap::new(),
            type_index: HashMap::new(),
        }
    }

    pub fn builder(entity: impl Into<String>) -> EntityModelBuilder {
        EntityModelBuilder::new(entity)
    }

    /// Resolve and validate a serialized model definition
    pub fn from_definition(definition: ModelDefinition) -> Result<Self, ModelError> {
        let mut type_index = HashMap::new();
        for name in definition.types.keys() {
            if name.trim().is_empty() {
                return Err(ModelError::invalid("type name must not be empty"));
            }
            if let Some(previous) = type_index.insert(name.to_lowercase(), name.clone()) {
                return Err(ModelError::invalid(format!(
                    "types '{}' and '{}' differ only by case",
                    previous, name
                )));
            }
        }

        let mut types = BTreeMap::new();
        for (type_name, declared) in &definition.types {
            let mut properties = BTreeMap::new();
            let mut index = HashMap::new();

            for (property_name, type_ref) in declared {
                if property_name.trim().is_empty() || property_name.contains('/') {
                    return Err(ModelError::invalid(format!(
                        "invalid property name '{}' on type '{}'",
                        property_name, type_name
                    )));
                }
                if let Some(previous) =
                    index.insert(property_name.to_lowercase(), property_name.clone())
                {
                    return Err(ModelError::invalid(format!(
                        "properties '{}' and '{}' on type '{}' differ only by case",
                        previous, property_name, type_name
                    )));
                }

                let property_type = resolve_type_ref(type_ref, &type_index).map_err(|e| {
                    ModelError::invalid(format!("property '{}.{}': {}", type_name, property_name, e))
                })?;
                properties.insert(property_name.clone(), property_type);
            }

            types.insert(
                type_name.clone(),
                StructuredType {
                    name: type_name.clone(),
                    properties,
                    index,
                },
            );
        }

        let entity = type_index
            .get(&definition.entity.to_lowercase())
            .cloned()
            .ok_or_else(|| ModelError::UnknownEntityType {
                name: definition.entity.clone(),
            })?;

        Ok(Self {
            namespace: definition.namespace,
            entity: Some(entity),
            types,
            type_index,
        })
    }

    pub fn is_untyped(&self) -> bool {
        self.entity.is_none()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Root entity type name, `None` for an untyped model
    pub fn entity_type(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn types(&self) -> impl Iterator<Item = &StructuredType> {
        self.types.values()
    }

    /// Case-insensitive type lookup
    pub fn structured_type(&self, name: &str) -> Option<&StructuredType> {
        let canonical = self.type_index.get(&name.to_lowercase())?;
        self.types.get(canonical)
    }

    /// Root entity as a property type, the starting point of path resolution
    pub fn root_type(&self) -> Option<PropertyType> {
        self.entity.as_ref().map(|name| PropertyType {
            target: PropertyTarget::Structured(name.clone()),
            is_collection: false,
        })
    }

    /// Schema elements in the style of an EDM schema listing
    pub fn schema_elements(&self) -> Vec<SchemaElement> {
        let mut elements: Vec<SchemaElement> = self
            .types
            .keys()
            .map(|name| SchemaElement {
                full_name: format!("{}.{}", self.namespace, name),
                kind: if Some(name) == self.entity.as_ref() {
                    "EntityType"
                } else {
                    "ComplexType"
                },
            })
            .collect();
        elements.push(SchemaElement {
            full_name: "Default.Container".to_string(),
            kind: "EntityContainer",
        });
        elements
    }

    /// Convert back to the serialized layout
    pub fn to_definition(&self) -> Option<ModelDefinition> {
        let entity = self.entity.clone()?;
        let types = self
            .types
            .values()
            .map(|t| {
                let properties = t
                    .properties
                    .iter()
                    .map(|(name, ty)| {
                        let type_name = ty.type_name().to_string();
                        let type_ref = if ty.is_collection {
                            TypeRef::Collection(vec![type_name])
                        } else {
                            TypeRef::Single(type_name)
                        };
                        (name.clone(), type_ref)
                    })
                    .collect();
                (t.name.clone(), properties)
            })
            .collect();
        Some(ModelDefinition {
            entity,
            namespace: self.namespace.clone(),
            types,
        })
    }
}

fn resolve_type_ref(
    type_ref: &TypeRef,
    type_index: &HashMap<String, String>,
) -> Result<PropertyType, String> {
    let (name, is_collection) = match type_ref {
        TypeRef::Single(name) => (name, false),
        TypeRef::Collection(names) => match names.as_slice() {
            [name] => (name, true),
            _ => return Err("collection types must name exactly one element type".to_string()),
        },
    };

    let name = name.trim();
    let is_primitive = name.len() > PRIMITIVE_PREFIX.len()
        && name
            .get(..PRIMITIVE_PREFIX.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(PRIMITIVE_PREFIX))
            .unwrap_or(false);
    let target = if is_primitive {
        PropertyTarget::Primitive(name.to_string())
    } else {
        let canonical = type_index
            .get(&name.to_lowercase())
            .ok_or_else(|| format!("unknown type '{}'", name))?;
        PropertyTarget::Structured(canonical.clone())
    };

    Ok(PropertyType {
        target,
        is_collection,
    })
}

/// Builds a model in code
#[derive(Debug, Clone)]
pub struct EntityModelBuilder {
    definition: ModelDefinition,
}

impl EntityModelBuilder {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            definition: ModelDefinition {
                entity: entity.into(),
                namespace: default_namespace(),
                types: BTreeMap::new(),
            },
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.definition.namespace = namespace.into();
        self
    }

    /// Declare a structured type; `configure` adds its properties
    pub fn structured<F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(TypeBuilder) -> TypeBuilder,
    {
        let properties = configure(TypeBuilder::default()).properties;
        self.definition.types.insert(name.into(), properties);
        self
    }

    pub fn build(self) -> Result<EntityModel, ModelError> {
        EntityModel::from_definition(self.definition)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeBuilder {
    properties: BTreeMap<String, TypeRef>,
}

impl TypeBuilder {
    pub fn property(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.properties
            .insert(name.into(), TypeRef::single(type_name));
        self
    }

    pub fn collection(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.properties
            .insert(name.into(), TypeRef::collection(type_name));
        self
    }
}
