use crate::aggregate::MemberAggregator;
use crate::config::SchemaConfig;
use crate::model::{view_of, EntryKind, FunctionEntry, MemberView};
use crate::store::Schema;
use log::trace;
use serde::Serialize;

/// Outcome of walking a chain: the last resolved entry and the members
/// reachable from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainResolution<'s> {
    /// `None` when the chain is a bare struct name.
    pub entry: Option<&'s FunctionEntry>,
    /// Empty for leaf entries.
    pub members: MemberView<'s>,
}

/// Walks dotted member chains such as `target.name` against a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct ChainResolver<'s> {
    schema: &'s Schema,
    aggregator: MemberAggregator<'s>,
    config: &'s SchemaConfig,
}

/// State carried between steps of a walk.
struct Walk<'s> {
    entry: Option<&'s FunctionEntry>,
    struct_type: Option<&'s str>,
    // consulted by the next step only
    pending: Option<MemberView<'s>>,
}

impl<'s> ChainResolver<'s> {
    pub fn new(schema: &'s Schema, config: &'s SchemaConfig) -> Self {
        ChainResolver {
            schema,
            aggregator: MemberAggregator::new(schema),
            config,
        }
    }

    pub fn aggregator(&self) -> MemberAggregator<'s> {
        self.aggregator
    }

    /// Query variables of `runtime`, or the union of every runtime's query
    /// variables when no runtime is known. In the union a later runtime
    /// replaces an earlier one on name collisions.
    pub fn query_variables(&self, runtime: Option<&str>) -> MemberView<'s> {
        match runtime {
            Some(id) => self.schema.runtime_query_variables(id),
            None => self
                .schema
                .runtimes()
                .values()
                .flat_map(|runtime| view_of(&runtime.query))
                .collect(),
        }
    }

    /// Resolves `chain` and returns what it denotes together with the members
    /// available for the next step. `None` means the chain is invalid.
    pub fn resolve_chain<S: AsRef<str>>(
        &self,
        runtime: Option<&str>,
        chain: &[S],
    ) -> Option<ChainResolution<'s>> {
        let (first, rest) = chain.split_first()?;
        let mut walk = self.start(runtime, first.as_ref())?;

        for (index, ident) in rest.iter().enumerate() {
            let ident = ident.as_ref();
            let is_last = index + 1 == rest.len();

            let members = match walk.pending.take() {
                Some(members) => members,
                None => self.members_of(walk.struct_type),
            };
            let Some(&entry) = members.get(ident) else {
                trace!("chain {:?}: no member '{ident}'", joined(chain));
                return None;
            };
            walk.entry = Some(entry);

            match &entry.kind {
                EntryKind::Struct => {
                    walk.struct_type = entry.struct_type();
                    if entry.has_inline_functions() {
                        walk.pending = Some(self.aggregator.inline_members_of(entry));
                    }
                    if walk.struct_type.is_none() && walk.pending.is_none() && !is_last {
                        trace!("chain {:?}: '{ident}' is a dead end", joined(chain));
                        return None;
                    }
                }
                EntryKind::Value(_) | EntryKind::Untyped => {
                    if !is_last {
                        trace!("chain {:?}: '{ident}' is not navigable", joined(chain));
                        return None;
                    }
                    return Some(ChainResolution {
                        entry: Some(entry),
                        members: MemberView::new(),
                    });
                }
            }
        }

        let members = match (walk.pending, walk.entry) {
            (Some(members), _) => members,
            (None, Some(entry)) if entry.has_inline_functions() => {
                self.aggregator.inline_members_of(entry)
            }
            (None, _) => self.members_of(walk.struct_type),
        };
        Some(ChainResolution {
            entry: walk.entry,
            members,
        })
    }

    /// Resolves a chain down to the single member it names, for documentation
    /// lookups. The bare math namespace is not a member.
    pub fn resolve_entry<S: AsRef<str>>(
        &self,
        runtime: Option<&str>,
        chain: &[S],
    ) -> Option<&'s FunctionEntry> {
        let (last, parent) = chain.split_last()?;
        let last = last.as_ref();
        if parent.is_empty() && last == self.config.math_namespace {
            return None;
        }

        match self.resolve_chain(runtime, parent) {
            Some(resolution) => resolution.members.get(last).copied(),
            None if parent.is_empty() => {
                let runtime = self.schema.runtime(runtime?)?;
                runtime.query.get(last)
            }
            None => None,
        }
    }

    /// The first identifier is either a query variable or a struct name.
    fn start(&self, runtime: Option<&str>, first: &str) -> Option<Walk<'s>> {
        let query = self.query_variables(runtime);
        if let Some((&name, &entry)) = query.get_key_value(first) {
            // a query variable without struct_type names a struct of the same name
            return Some(Walk {
                entry: Some(entry),
                struct_type: Some(entry.struct_type().unwrap_or(name)),
                pending: None,
            });
        }
        if let Some(name) = self.schema.struct_key(first) {
            return Some(Walk {
                entry: None,
                struct_type: Some(name),
                pending: None,
            });
        }
        trace!("'{first}' is neither a query variable nor a struct");
        None
    }

    fn members_of(&self, struct_type: Option<&str>) -> MemberView<'s> {
        struct_type
            .map(|name| self.aggregator.all_members_of(name))
            .unwrap_or_default()
    }
}

fn joined<S: AsRef<str>>(chain: &[S]) -> String {
    chain
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"{
        "structs": {
            "entity": { "functions": { "name": { "type": "Number" } } },
            "pokemon": {
                "functions": {
                    "level": { "type": "Number" },
                    "owner": { "type": "Struct", "struct_type": "entity" },
                    "stats": {
                        "type": "Struct",
                        "functions": { "hp": { "type": "Number" }, "speed": { "type": "Number" } }
                    }
                }
            },
            "math": { "functions": { "abs": { "type": "Number" } } }
        },
        "function_sets": { "baseFns": { "functions": { "name": { "type": "String" } } } },
        "runtimes": {
            "event:ENTITY": {
                "query": { "target": { "type": "Struct", "struct_type": "entity" } }
            },
            "event:BATTLE": {
                "query": {
                    "pokemon": { "type": "Struct" },
                    "turn": { "type": "Number" }
                }
            }
        },
        "structCompositions": {
            "entity": {
                "registries": ["baseFns"],
                "custom_functions": { "name": { "type": "Struct" } }
            }
        }
    }"#;

    fn schema() -> Schema {
        Schema::from_json_str(SOURCE, "resolver.json").unwrap()
    }

    #[test]
    fn test_query_variable_entry_point() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        let resolution = resolver
            .resolve_chain(Some("event:ENTITY"), &["target"])
            .unwrap();
        assert_eq!(resolution.entry.unwrap().struct_type(), Some("entity"));
        assert_eq!(resolution.members.len(), 1);
        assert!(resolution.members["name"].is_struct());
    }

    #[test]
    fn test_dead_end_stops_navigation() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        assert!(resolver
            .resolve_chain(Some("event:ENTITY"), &["target", "name", "x"])
            .is_none());

        let resolution = resolver
            .resolve_chain(Some("event:ENTITY"), &["target", "name"])
            .unwrap();
        assert!(resolution.entry.unwrap().is_struct());
        assert!(resolution.members.is_empty());
    }

    #[test]
    fn test_query_variable_without_struct_type_names_struct() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        let resolution = resolver
            .resolve_chain(Some("event:BATTLE"), &["pokemon", "owner"])
            .unwrap();
        assert_eq!(resolution.entry.unwrap().struct_type(), Some("entity"));
        assert!(resolution.members.contains_key("name"));
    }

    #[test]
    fn test_struct_name_entry_point() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        // event:ENTITY has no `pokemon` query variable, so the struct is used directly
        let resolution = resolver
            .resolve_chain(Some("event:ENTITY"), &["pokemon"])
            .unwrap();
        assert!(resolution.entry.is_none());
        assert_eq!(
            resolution.members.keys().copied().collect::<Vec<_>>(),
            vec!["level", "owner", "stats"]
        );
    }

    #[test]
    fn test_unknown_first_identifier() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        for runtime in [None, Some("event:ENTITY"), Some("event:MISSING")] {
            assert!(resolver.resolve_chain(runtime, &["nope"]).is_none());
            assert!(resolver.resolve_chain(runtime, &["nope", "level"]).is_none());
        }
        assert!(resolver.resolve_chain::<&str>(None, &[]).is_none());
    }

    #[test]
    fn test_leaf_must_be_last() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        let resolution = resolver.resolve_chain(None, &["pokemon", "level"]).unwrap();
        assert_eq!(resolution.entry.unwrap().kind_name(), Some("Number"));
        assert!(resolution.members.is_empty());

        assert!(resolver
            .resolve_chain(None, &["pokemon", "level", "more"])
            .is_none());
    }

    #[test]
    fn test_inline_members_consulted_once() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        let stats = resolver.resolve_chain(None, &["pokemon", "stats"]).unwrap();
        assert_eq!(
            stats.members.keys().copied().collect::<Vec<_>>(),
            vec!["hp", "speed"]
        );

        let hp = resolver
            .resolve_chain(None, &["pokemon", "stats", "hp"])
            .unwrap();
        assert_eq!(hp.entry.unwrap().kind_name(), Some("Number"));
    }

    #[test]
    fn test_unscoped_query_variables_merge_all_runtimes() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        let names: Vec<_> = resolver.query_variables(None).into_keys().collect();
        assert_eq!(names, vec!["target", "pokemon", "turn"]);
        assert!(resolver.query_variables(Some("event:MISSING")).is_empty());

        assert!(resolver.resolve_chain(None, &["target", "name"]).is_some());
        assert!(resolver
            .resolve_chain(Some("event:BATTLE"), &["target"])
            .is_none());
    }

    #[test]
    fn test_resolve_entry() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        let owner = resolver
            .resolve_entry(None, &["pokemon", "owner"])
            .unwrap();
        assert_eq!(owner.struct_type(), Some("entity"));

        let abs = resolver.resolve_entry(None, &["math", "abs"]).unwrap();
        assert_eq!(abs.kind_name(), Some("Number"));
        assert!(resolver.resolve_entry(None, &["math"]).is_none());

        assert!(resolver.resolve_entry(None, &["pokemon", "nope"]).is_none());
        assert!(resolver.resolve_entry(None, &["nope", "level"]).is_none());
        assert!(resolver.resolve_entry::<&str>(None, &[]).is_none());
    }

    #[test]
    fn test_resolve_entry_single_identifier_uses_runtime() {
        let schema = schema();
        let config = SchemaConfig::default();
        let resolver = ChainResolver::new(&schema, &config);

        let turn = resolver.resolve_entry(Some("event:BATTLE"), &["turn"]).unwrap();
        assert_eq!(turn.kind_name(), Some("Number"));
        assert!(resolver.resolve_entry(None, &["turn"]).is_none());
        assert!(resolver.resolve_entry(Some("event:ENTITY"), &["turn"]).is_none());
    }
}
