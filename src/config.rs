use serde::{Deserialize, Serialize};

/// Reserved names and inference knobs shared by the resolver and the
/// runtime heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Struct holding the `math.*` functions. A chain made of this token alone
    /// names the namespace, not a member.
    pub math_namespace: String,
    /// Function set available everywhere.
    pub general_function_set: String,
    /// Namespace prefix of runtime ids (`event:BATTLE_VICTORY`).
    pub runtime_prefix: String,
    /// Directory markers whose next path segment names the runtime, tried in order.
    pub path_markers: Vec<String>,
    /// How many leading lines are scanned for a `// @context` annotation.
    pub annotation_line_limit: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        SchemaConfig {
            math_namespace: "math".to_string(),
            general_function_set: "generalFunctions".to_string(),
            runtime_prefix: "event:".to_string(),
            path_markers: vec!["callbacks/".to_string(), "molang/".to_string()],
            annotation_line_limit: 10,
        }
    }
}
