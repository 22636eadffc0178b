use crate::config::SchemaConfig;
use crate::store::Schema;
use log::trace;
use regex::Regex;
use std::sync::LazyLock;

static CONTEXT_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//\s*@context\s+(\S+)").expect("valid annotation pattern"));

/// Maps a source document to the runtime it executes in.
///
/// Two independent heuristics are available: a `// @context event:NAME`
/// annotation near the top of the document, and the document's path.
/// [`RuntimeInference::infer`] applies them in that order.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeInference<'s> {
    schema: &'s Schema,
    config: &'s SchemaConfig,
}

impl<'s> RuntimeInference<'s> {
    pub fn new(schema: &'s Schema, config: &'s SchemaConfig) -> Self {
        RuntimeInference { schema, config }
    }

    /// Annotation wins outright; the path is only a fallback.
    pub fn infer(&self, content: &str, path: Option<&str>) -> Option<&'s str> {
        self.from_content(content)
            .or_else(|| path.and_then(|path| self.from_path(path)))
    }

    /// Scans the leading lines for `// @context <id>` naming a known runtime.
    /// Annotations naming unknown runtimes are skipped.
    pub fn from_content(&self, content: &str) -> Option<&'s str> {
        content
            .split('\n')
            .take(self.config.annotation_line_limit)
            .filter_map(|line| CONTEXT_ANNOTATION.captures(line.trim()))
            .filter_map(|captures| captures.get(1))
            .find_map(|token| self.schema.runtime_key(token.as_str()))
    }

    /// Infers the runtime from a file path.
    ///
    /// First looks for a directory marker (`callbacks/`, `molang/`) followed by
    /// a folder, turning `callbacks/battle_victory/x.molang` into
    /// `event:BATTLE_VICTORY`. Failing that, returns the first runtime, in
    /// declaration order, whose id without prefix and underscores occurs in
    /// the lower-cased path. A runtime id that is nothing but the prefix
    /// (`event:`) would match every path, so it never takes part in this
    /// fuzzy pass.
    pub fn from_path(&self, path: &str) -> Option<&'s str> {
        let normalized = path.replace('\\', "/").to_lowercase();
        self.from_marker(&normalized)
            .or_else(|| self.from_fuzzy_match(&normalized))
    }

    fn from_marker(&self, normalized: &str) -> Option<&'s str> {
        for marker in &self.config.path_markers {
            let Some(index) = normalized.find(marker.as_str()) else {
                continue;
            };
            let after = &normalized[index + marker.len()..];
            let folder = match after.find('/') {
                Some(slash) if slash > 0 => &after[..slash],
                _ => continue,
            };
            let id = format!("{}{}", self.config.runtime_prefix, folder.to_uppercase());
            if let Some(runtime) = self.schema.runtime_key(&id) {
                trace!("runtime {runtime} inferred from folder '{folder}'");
                return Some(runtime);
            }
        }
        None
    }

    fn from_fuzzy_match(&self, normalized: &str) -> Option<&'s str> {
        let prefix = self.config.runtime_prefix.as_str();
        let found = self.schema.runtime_names().find(|id| {
            let stripped = id
                .replacen(prefix, "", 1)
                .to_lowercase()
                .replace('_', "");
            !stripped.is_empty() && normalized.contains(&stripped)
        });
        if let Some(runtime) = found {
            trace!("runtime {runtime} fuzzy-matched from path");
        }
        found
    }
}
