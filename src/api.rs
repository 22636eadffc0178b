use crate::aggregate::MemberAggregator;
use crate::config::SchemaConfig;
use crate::error::SchemaError;
use crate::inference::RuntimeInference;
use crate::model::{FunctionEntry, MemberView, Runtime, SchemaDocument};
use crate::resolver::{ChainResolution, ChainResolver};
use crate::store::Schema;
use log::{debug, error, info};
use std::path::Path;

/// Query façade consumed by completion, hover and definition providers.
///
/// A service starts unloaded. The first successful `load*` call binds it to a
/// schema for good: later loads are ignored, even with a different document.
/// Every query is total; before loading, and for unknown names, the answer is
/// an empty table or `None`.
#[derive(Debug, Default)]
pub struct SchemaService {
    schema: Option<Schema>,
    config: SchemaConfig,
}

impl SchemaService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchemaConfig) -> Self {
        SchemaService {
            schema: None,
            config,
        }
    }

    /// Loads a JSON schema document.
    ///
    /// # Errors
    /// Returns the diagnostic when the document is malformed; the service then
    /// stays unloaded. A service that is already loaded returns `Ok(())`
    /// without looking at `source`.
    pub fn load(&mut self, source: &str) -> Result<(), SchemaError> {
        self.install(|| Schema::from_json_str(source, "molang-schema.json"))
    }

    /// Loads a YAML schema document.
    ///
    /// # Errors
    /// See [`SchemaService::load`].
    pub fn load_yaml(&mut self, source: &str) -> Result<(), SchemaError> {
        self.install(|| Schema::from_yaml_str(source, "molang-schema.yaml"))
    }

    /// Loads a schema file, JSON or YAML by extension.
    ///
    /// # Errors
    /// See [`SchemaService::load`]; unreadable files are reported too.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        self.install(|| Schema::from_path(path))
    }

    /// Loads an already parsed document.
    pub fn load_document(&mut self, document: SchemaDocument) {
        if !self.ignores_reload() {
            self.accept(Schema::from_document(document));
        }
    }

    fn install(
        &mut self,
        build: impl FnOnce() -> Result<Schema, SchemaError>,
    ) -> Result<(), SchemaError> {
        if self.ignores_reload() {
            return Ok(());
        }
        match build() {
            Ok(schema) => {
                self.accept(schema);
                Ok(())
            }
            Err(err) => {
                error!("Failed to load MoLang schema: {err}");
                Err(err)
            }
        }
    }

    fn ignores_reload(&self) -> bool {
        if self.schema.is_some() {
            debug!("MoLang schema already loaded; ignoring reload");
        }
        self.schema.is_some()
    }

    fn accept(&mut self, schema: Schema) {
        info!(
            "MoLang schema loaded: {} runtimes, {} structs",
            schema.runtimes().len(),
            schema.structs().len()
        );
        self.schema = Some(schema);
    }

    pub fn is_loaded(&self) -> bool {
        self.schema.is_some()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn resolver(&self) -> Option<ChainResolver<'_>> {
        self.schema
            .as_ref()
            .map(|schema| ChainResolver::new(schema, &self.config))
    }

    pub fn inference(&self) -> Option<RuntimeInference<'_>> {
        self.schema
            .as_ref()
            .map(|schema| RuntimeInference::new(schema, &self.config))
    }

    fn aggregator(&self) -> Option<MemberAggregator<'_>> {
        self.schema.as_ref().map(MemberAggregator::new)
    }

    // === Runtimes ===

    pub fn runtime_names(&self) -> Vec<&str> {
        self.schema
            .as_ref()
            .map(|schema| schema.runtime_names().collect())
            .unwrap_or_default()
    }

    pub fn runtime(&self, id: &str) -> Option<&Runtime> {
        self.schema.as_ref()?.runtime(id)
    }

    pub fn runtime_query_variables(&self, id: &str) -> MemberView<'_> {
        self.schema
            .as_ref()
            .map(|schema| schema.runtime_query_variables(id))
            .unwrap_or_default()
    }

    /// Query variables for `runtime`, or the union over all runtimes.
    pub fn query_variables(&self, runtime: Option<&str>) -> MemberView<'_> {
        self.resolver()
            .map(|resolver| resolver.query_variables(runtime))
            .unwrap_or_default()
    }

    pub fn infer_runtime_from_content(&self, text: &str) -> Option<&str> {
        self.inference()?.from_content(text)
    }

    pub fn infer_runtime_from_path(&self, path: &str) -> Option<&str> {
        self.inference()?.from_path(path)
    }

    /// Annotation first, path as fallback.
    pub fn infer_runtime(&self, text: &str, path: Option<&str>) -> Option<&str> {
        self.inference()?.infer(text, path)
    }

    // === Structs and function sets ===

    pub fn struct_names(&self) -> Vec<&str> {
        self.schema
            .as_ref()
            .map(|schema| schema.struct_names().collect())
            .unwrap_or_default()
    }

    pub fn struct_functions(&self, name: &str) -> MemberView<'_> {
        self.schema
            .as_ref()
            .map(|schema| schema.struct_functions(name))
            .unwrap_or_default()
    }

    pub fn composition_registries(&self, struct_name: &str) -> &[String] {
        self.schema
            .as_ref()
            .map(|schema| schema.composition_registries(struct_name))
            .unwrap_or(&[])
    }

    pub fn function_set_functions(&self, name: &str) -> MemberView<'_> {
        self.schema
            .as_ref()
            .map(|schema| schema.function_set_functions(name))
            .unwrap_or_default()
    }

    pub fn math_functions(&self) -> MemberView<'_> {
        self.struct_functions(&self.config.math_namespace)
    }

    /// Functions available everywhere, regardless of runtime.
    pub fn general_functions(&self) -> MemberView<'_> {
        self.function_set_functions(&self.config.general_function_set)
    }

    /// Composed members of a struct; `None` has no members.
    pub fn all_members_of(&self, struct_type: Option<&str>) -> MemberView<'_> {
        match (self.aggregator(), struct_type) {
            (Some(aggregator), Some(name)) => aggregator.all_members_of(name),
            _ => MemberView::new(),
        }
    }

    // === Chains ===

    pub fn resolve_chain<S: AsRef<str>>(
        &self,
        runtime: Option<&str>,
        chain: &[S],
    ) -> Option<ChainResolution<'_>> {
        self.resolver()?.resolve_chain(runtime, chain)
    }

    pub fn resolve_entry<S: AsRef<str>>(
        &self,
        runtime: Option<&str>,
        chain: &[S],
    ) -> Option<&FunctionEntry> {
        self.resolver()?.resolve_entry(runtime, chain)
    }
}
