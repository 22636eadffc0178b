use crate::error::SchemaError;
use crate::model::{
    view_of, Composition, FunctionSet, MemberView, Runtime, SchemaDocument, StructDef,
};
use indexmap::IndexMap;
use std::path::Path;

/// The loaded, immutable schema model.
///
/// Built in one pass from a [`SchemaDocument`]; there is no mutation path
/// afterwards, so a `Schema` can be shared freely between threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    document: SchemaDocument,
}

impl Schema {
    pub fn from_document(document: SchemaDocument) -> Self {
        Schema { document }
    }

    /// Parses a JSON schema document. `name` labels diagnostics.
    ///
    /// # Errors
    /// Returns [`SchemaError::Malformed`] if the text is not a valid schema document.
    pub fn from_json_str(source: &str, name: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(source)
            .map(Self::from_document)
            .map_err(|err| SchemaError::from_json(&err, name, source))
    }

    /// Parses a YAML schema document. `name` labels diagnostics.
    ///
    /// # Errors
    /// Returns [`SchemaError::Malformed`] if the text is not a valid schema document.
    pub fn from_yaml_str(source: &str, name: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(source)
            .map(Self::from_document)
            .map_err(|err| SchemaError::from_yaml(&err, name, source))
    }

    /// Reads a schema file, choosing the format from its extension.
    ///
    /// # Errors
    /// Fails if the file cannot be read, has an unknown extension, or is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let name = path.to_string_lossy().to_string();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str, &str) -> Result<Schema, SchemaError> = match extension.as_deref() {
            Some("json") => Self::from_json_str,
            Some("yaml" | "yml") => Self::from_yaml_str,
            _ => return Err(SchemaError::UnsupportedFormat { path: name }),
        };

        let source = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: name.clone(),
            source,
        })?;
        parse(&source, &name)
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn structs(&self) -> &IndexMap<String, StructDef> {
        &self.document.structs
    }

    pub fn function_sets(&self) -> &IndexMap<String, FunctionSet> {
        &self.document.function_sets
    }

    pub fn runtimes(&self) -> &IndexMap<String, Runtime> {
        &self.document.runtimes
    }

    pub fn compositions(&self) -> &IndexMap<String, Composition> {
        &self.document.compositions
    }

    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.document.structs.keys().map(String::as_str)
    }

    pub fn runtime_names(&self) -> impl Iterator<Item = &str> {
        self.document.runtimes.keys().map(String::as_str)
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.document.structs.get(name)
    }

    /// The stored key for a struct name, so callers can hold it for the
    /// schema's lifetime.
    pub fn struct_key(&self, name: &str) -> Option<&str> {
        self.document
            .structs
            .get_key_value(name)
            .map(|(key, _)| key.as_str())
    }

    pub fn function_set(&self, name: &str) -> Option<&FunctionSet> {
        self.document.function_sets.get(name)
    }

    pub fn runtime(&self, id: &str) -> Option<&Runtime> {
        self.document.runtimes.get(id)
    }

    /// The stored key for a runtime id.
    pub fn runtime_key(&self, id: &str) -> Option<&str> {
        self.document
            .runtimes
            .get_key_value(id)
            .map(|(key, _)| key.as_str())
    }

    pub fn composition(&self, struct_name: &str) -> Option<&Composition> {
        self.document.compositions.get(struct_name)
    }

    /// Members declared directly on a struct, without compositions.
    pub fn struct_functions(&self, name: &str) -> MemberView<'_> {
        self.struct_def(name)
            .map(|def| view_of(&def.functions))
            .unwrap_or_default()
    }

    pub fn function_set_functions(&self, name: &str) -> MemberView<'_> {
        self.function_set(name)
            .map(|set| view_of(&set.functions))
            .unwrap_or_default()
    }

    pub fn runtime_query_variables(&self, id: &str) -> MemberView<'_> {
        self.runtime(id)
            .map(|runtime| view_of(&runtime.query))
            .unwrap_or_default()
    }

    pub fn composition_registries(&self, struct_name: &str) -> &[String] {
        self.composition(struct_name)
            .map(|composition| composition.registries.as_slice())
            .unwrap_or(&[])
    }
}
