//! Entity model
//!
//! Describes which properties a filter may reference. Models are built in
//! code, loaded from JSON or TOML files, or supplied by a type implementing
//! [`ODataEntity`].

pub mod definition;
pub mod error;
pub mod schema;

pub use definition::{ModelDefinition, TypeRef};
pub use error::ModelError;
pub use schema::{
    EntityModel, EntityModelBuilder, PropertyTarget, PropertyType, SchemaElement,
    StructuredType, TypeBuilder,
};

use crate::logging::codes;
use crate::{log_error, log_success};
use std::path::Path;

/// Types that can describe themselves as an entity model
pub trait ODataEntity {
    fn entity_model() -> Result<EntityModel, ModelError>;
}

impl EntityModel {
    pub fn from_json(source: &str) -> Result<Self, ModelError> {
        let definition: ModelDefinition =
            serde_json::from_str(source).map_err(|source| ModelError::Json { source })?;
        Self::from_definition(definition)
    }

    pub fn from_toml(source: &str) -> Result<Self, ModelError> {
        let definition: ModelDefinition =
            toml::from_str(source).map_err(|source| ModelError::Toml { source })?;
        Self::from_definition(definition)
    }

    /// Load a model file; `.toml` files are read as TOML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let result = if is_toml {
            Self::from_toml(&source)
        } else {
            Self::from_json(&source)
        };

        match &result {
            Ok(model) => {
                log_success!(codes::success::MODEL_LOADED, "Entity model loaded",
                    "path" => path.display(),
                    "entity" => model.entity_type().unwrap_or("-"),
                    "types" => model.types().count()
                );
            }
            Err(error) => {
                log_error!(error.error_code(), "Cannot load entity model",
                    "path" => path.display(),
                    "error" => error
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const USER_JSON: &str = r#"{
        "entity": "User",
        "namespace": "Sample",
        "types": {
            "User": {
                "id": "Edm.Int32",
                "email": "Edm.String",
                "sponsor": "User",
                "phoneNumbers": ["Edm.String"]
            }
        }
    }"#;

    #[test]
    fn test_from_json() {
        let model = EntityModel::from_json(USER_JSON).unwrap();
        assert_eq!(model.entity_type(), Some("User"));
        assert_eq!(model.namespace(), "Sample");
    }

    #[test]
    fn test_from_json_malformed() {
        let err = EntityModel::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ModelError::Json { .. }));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "entity = \"User\"\n\n[types.User]\nid = \"Edm.Int32\"\ntags = [\"Edm.String\"]"
        )
        .unwrap();

        let model = EntityModel::from_file(file.path()).unwrap();
        let user = model.structured_type("User").unwrap();
        assert!(user.property("TAGS").unwrap().1.is_collection);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(USER_JSON.as_bytes()).unwrap();

        let model = EntityModel::from_file(file.path()).unwrap();
        assert_eq!(model.types().count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EntityModel::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
        assert_eq!(err.error_code(), codes::model::MODEL_IO_ERROR);
    }

    struct Widget;

    impl ODataEntity for Widget {
        fn entity_model() -> Result<EntityModel, ModelError> {
            EntityModel::builder("Widget")
                .structured("Widget", |t| t.property("size", "Edm.Int32"))
                .build()
        }
    }

    #[test]
    fn test_odata_entity_trait() {
        let model = Widget::entity_model().unwrap();
        assert_eq!(model.entity_type(), Some("Widget"));
    }
}
