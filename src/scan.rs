//! Text scanning helpers for editor integrations.
//!
//! These work on raw document text and do not know about comments or string
//! literals, so a `q.foo` inside a comment is reported like any other usage.

use crate::utils::get_line_and_column;
use indexmap::IndexSet;
use regex::Regex;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

const PREFIXES: &str = "q|query|v|variable|t|temp|f|function|c|context|math";

static CHAIN_BEFORE_CURSOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:^|[^a-zA-Z0-9_])({PREFIXES})((?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\.$"
    ))
    .expect("valid chain pattern")
});

static FULL_CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({PREFIXES})((?:\.[a-zA-Z_][a-zA-Z0-9_]*)+)$"))
        .expect("valid chain pattern")
});

static CONTEXT_ANNOTATION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//\s*@context\s+(\S*)$").expect("valid annotation pattern"));

static FUNCTION_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fn\s*\(\s*'([^']+)'").expect("valid definition pattern"));

static IMPORT_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"import\s*\(\s*'([^']+)'\s*\)").expect("valid import pattern"));

/// The MoLang namespaces a chain can start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Query,
    Variable,
    Temp,
    Function,
    Context,
    Math,
}

impl Prefix {
    pub const ALL: [Prefix; 6] = [
        Prefix::Query,
        Prefix::Variable,
        Prefix::Temp,
        Prefix::Function,
        Prefix::Context,
        Prefix::Math,
    ];

    pub fn short(self) -> &'static str {
        match self {
            Prefix::Query => "q",
            Prefix::Variable => "v",
            Prefix::Temp => "t",
            Prefix::Function => "f",
            Prefix::Context => "c",
            Prefix::Math => "math",
        }
    }

    pub fn long(self) -> &'static str {
        match self {
            Prefix::Query => "query",
            Prefix::Variable => "variable",
            Prefix::Temp => "temp",
            Prefix::Function => "function",
            Prefix::Context => "context",
            Prefix::Math => "math",
        }
    }
}

impl FromStr for Prefix {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prefix::ALL
            .into_iter()
            .find(|prefix| prefix.short() == s || prefix.long() == s)
            .ok_or(())
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// A chain split into its namespace prefix and member identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedChain {
    pub prefix: Prefix,
    pub members: Vec<String>,
}

impl PrefixedChain {
    fn from_captures(prefix: &str, dotted: &str) -> Option<Self> {
        let prefix = prefix.parse().ok()?;
        let members = dotted
            .split('.')
            .filter(|ident| !ident.is_empty())
            .map(str::to_string)
            .collect();
        Some(PrefixedChain { prefix, members })
    }
}

/// Where a `fn('name', ...)` definition starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionSite {
    pub offset: usize,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
}

/// Recognises a completion trigger: text ending in `prefix(.ident)*.`.
///
/// `"x = q.target."` gives `Query` with members `["target"]`.
pub fn chain_before_cursor(text_before: &str) -> Option<PrefixedChain> {
    let captures = CHAIN_BEFORE_CURSOR.captures(text_before)?;
    let dotted = captures.get(2).map_or("", |m| m.as_str());
    PrefixedChain::from_captures(&captures[1], dotted)
}

/// Splits a full token like `q.target.name`. At least one member is required.
pub fn split_chain(token: &str) -> Option<PrefixedChain> {
    let captures = FULL_CHAIN.captures(token)?;
    PrefixedChain::from_captures(&captures[1], &captures[2])
}

/// The dotted token surrounding `offset`: identifier characters and dots
/// before it, identifier characters after it. Tokens without a dot are not
/// chains.
pub fn chain_at(text: &str, offset: usize) -> Option<&str> {
    if offset > text.len() || !text.is_char_boundary(offset) {
        return None;
    }
    let bytes = text.as_bytes();
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    let mut start = offset;
    while start > 0 && (is_ident(bytes[start - 1]) || bytes[start - 1] == b'.') {
        start -= 1;
    }
    let mut end = offset;
    while end < bytes.len() && is_ident(bytes[end]) {
        end += 1;
    }

    let chain = &text[start..end];
    (start < end && chain.contains('.')).then_some(chain)
}

/// Whether the cursor sits where a runtime id of a `// @context` annotation goes.
pub fn is_context_annotation(text_before: &str) -> bool {
    CONTEXT_ANNOTATION_PREFIX.is_match(text_before)
}

/// Distinct identifiers accessed through `prefix`, in first-seen order.
pub fn prefix_usages(text: &str, prefix: Prefix) -> Vec<String> {
    let pattern = format!(
        r"(?:{}|{})\.([a-zA-Z_][a-zA-Z0-9_]*)",
        prefix.short(),
        prefix.long()
    );
    let Ok(regex) = Regex::new(&pattern) else {
        return Vec::new();
    };
    let names: IndexSet<&str> = regex
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str())
        .collect();
    names.into_iter().map(str::to_string).collect()
}

/// Distinct names declared with `fn('name', ...)`, in first-seen order.
pub fn function_definitions(text: &str) -> Vec<String> {
    let names: IndexSet<&str> = FUNCTION_DEFINITION
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str())
        .collect();
    names.into_iter().map(str::to_string).collect()
}

/// Every `fn('name', ...)` definition of `name` in `text`.
pub fn function_definition_sites(text: &str, name: &str) -> Vec<DefinitionSite> {
    let pattern = format!(r"fn\s*\(\s*'{}'", regex::escape(name));
    let Ok(regex) = Regex::new(&pattern) else {
        return Vec::new();
    };
    regex
        .find_iter(text)
        .map(|found| {
            let (line, column) = get_line_and_column(text, found.start());
            DefinitionSite {
                offset: found.start(),
                line,
                column,
            }
        })
        .collect()
}

/// The `namespace:path` argument of an `import('...')` call on `line` that
/// spans the 0-based byte `column`.
pub fn import_at(line: &str, column: usize) -> Option<&str> {
    IMPORT_CALL
        .captures_iter(line)
        .find(|captures| {
            let call = captures.get(0).map_or(0..0, |m| m.range());
            call.start <= column && column <= call.end
        })
        .and_then(|captures| captures.get(1))
        .map(|target| target.as_str())
}

/// Maps an import target `namespace:path` to `data/{namespace}/molang/{path}.molang`.
pub fn import_file_path(target: &str) -> Option<PathBuf> {
    let (namespace, path) = target.split_once(':')?;
    if namespace.is_empty() || path.is_empty() {
        return None;
    }
    let file = format!("{path}.molang");
    Some(["data", namespace, "molang", file.as_str()].into_iter().collect())
}
