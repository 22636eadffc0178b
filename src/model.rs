use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Kind tag marking a member as navigable.
pub const STRUCT_KIND: &str = "Struct";

/// Owned member table, keyed by member name in declaration order.
pub type Members = IndexMap<String, FunctionEntry>;

/// Borrowed member table produced by merges and lookups.
pub type MemberView<'s> = IndexMap<&'s str, &'s FunctionEntry>;

/// Borrows every entry of `members` into a [`MemberView`], keeping order.
pub fn view_of(members: &Members) -> MemberView<'_> {
    members.iter().map(|(name, entry)| (name.as_str(), entry)).collect()
}

/// Root of a schema document.
///
/// Every table preserves declaration order; later layers override earlier ones
/// and fuzzy runtime matching breaks ties by that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub structs: IndexMap<String, StructDef>,
    #[serde(
        default,
        rename = "function_sets",
        alias = "functionSets",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub function_sets: IndexMap<String, FunctionSet>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub runtimes: IndexMap<String, Runtime>,
    #[serde(
        default,
        rename = "structCompositions",
        alias = "struct_compositions",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub compositions: IndexMap<String, Composition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub functions: Members,
}

/// A reusable bundle of members mixed into structs through compositions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub functions: Members,
}

/// An execution context such as an event callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Query variables exposed while executing in this context.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query: Members,
}

/// Mixin wiring for one struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Function sets applied in order; later sets win on collisions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registries: Vec<String>,
    /// Highest-priority overrides for this struct.
    #[serde(
        default,
        rename = "custom_functions",
        alias = "customFunctions",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub custom_functions: Members,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// What a member produces, and whether a chain may continue through it.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    /// A navigable member. Its members come from the named struct, from the
    /// inline table, or from both.
    Struct,
    /// A terminal value of the named kind (`Number`, `String`, `Unit`, ...).
    Value(String),
    /// No kind was declared.
    Untyped,
}

/// The atomic schema unit: one member of a struct, function set, runtime or
/// composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct FunctionEntry {
    pub kind: EntryKind,
    pub returns: Option<String>,
    pub params: Vec<Param>,
    pub description: Option<String>,
    pub source: Option<String>,
    /// The struct this member leads into. Read for any kind: a query variable
    /// typed `Entity` may still name its struct here.
    pub struct_type: Option<String>,
    /// Inline members declared directly on this entry.
    pub functions: Members,
}

impl FunctionEntry {
    /// A terminal member of the given kind.
    pub fn value(kind: impl Into<String>) -> Self {
        Self::with_kind(EntryKind::Value(kind.into()))
    }

    /// A navigable member backed by `struct_type`, if any.
    pub fn structure(struct_type: Option<&str>) -> Self {
        Self::inline(struct_type, Members::new())
    }

    /// A navigable member with its own inline member table.
    pub fn inline(struct_type: Option<&str>, functions: Members) -> Self {
        FunctionEntry {
            struct_type: struct_type.map(str::to_string),
            functions,
            ..Self::with_kind(EntryKind::Struct)
        }
    }

    fn with_kind(kind: EntryKind) -> Self {
        FunctionEntry {
            kind,
            returns: None,
            params: Vec::new(),
            description: None,
            source: None,
            struct_type: None,
            functions: Members::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = params;
        self
    }

    pub fn is_struct(&self) -> bool {
        self.kind == EntryKind::Struct
    }

    /// The declared kind name, `None` when untyped.
    pub fn kind_name(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Struct => Some(STRUCT_KIND),
            EntryKind::Value(kind) => Some(kind),
            EntryKind::Untyped => None,
        }
    }

    /// The struct this member leads into, whatever its kind.
    pub fn struct_type(&self) -> Option<&str> {
        self.struct_type.as_deref()
    }

    /// Inline members declared directly on this entry. An empty table counts
    /// as absent.
    pub fn inline_functions(&self) -> Option<&Members> {
        (!self.functions.is_empty()).then_some(&self.functions)
    }

    pub fn has_inline_functions(&self) -> bool {
        self.inline_functions().is_some()
    }

    /// Display return type, falling back to the kind name.
    pub fn return_type(&self) -> Option<&str> {
        self.returns.as_deref().or_else(|| self.kind_name())
    }

    /// Renders the parameter list as `name: Type, other?`.
    pub fn param_signature(&self) -> String {
        self.params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders `label(params) → Return`, or `label → Return` without params.
    pub fn signature(&self, label: &str) -> String {
        let returns = self.return_type().unwrap_or("Unknown");
        if self.params.is_empty() {
            format!("{label} → {returns}")
        } else {
            format!("{label}({}) → {returns}", self.param_signature())
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name.as_deref().unwrap_or("?"))?;
        if let Some(param_type) = &self.param_type {
            write!(f, ": {param_type}")?;
        }
        if self.optional {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// On-disk shape of a [`FunctionEntry`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawEntry {
    #[serde(default, rename = "type", alias = "kind", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    returns: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(
        default,
        rename = "struct_type",
        alias = "structType",
        skip_serializing_if = "Option::is_none"
    )]
    struct_type: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    functions: Members,
}

impl From<RawEntry> for FunctionEntry {
    fn from(raw: RawEntry) -> Self {
        let kind = match raw.kind {
            Some(kind) if kind == STRUCT_KIND => EntryKind::Struct,
            Some(kind) => EntryKind::Value(kind),
            None => EntryKind::Untyped,
        };
        FunctionEntry {
            kind,
            returns: raw.returns,
            params: raw.params,
            description: raw.description,
            source: raw.source,
            struct_type: raw.struct_type,
            functions: raw.functions,
        }
    }
}

impl From<FunctionEntry> for RawEntry {
    fn from(entry: FunctionEntry) -> Self {
        let kind = match entry.kind {
            EntryKind::Struct => Some(STRUCT_KIND.to_string()),
            EntryKind::Value(kind) => Some(kind),
            EntryKind::Untyped => None,
        };
        RawEntry {
            kind,
            returns: entry.returns,
            params: entry.params,
            description: entry.description,
            source: entry.source,
            struct_type: entry.struct_type,
            functions: entry.functions,
        }
    }
}
