use molang_schema::{EntryKind, SchemaService};

const FIXTURE: &str = include_str!("fixtures/molang-schema.json");

fn service() -> SchemaService {
    let mut service = SchemaService::new();
    if let Err(err) = service.load(FIXTURE) {
        panic!("{:?}", miette::Report::new(err));
    }
    service
}

fn member_names(service: &SchemaService, runtime: Option<&str>, chain: &[&str]) -> Vec<String> {
    service
        .resolve_chain(runtime, chain)
        .unwrap_or_else(|| panic!("Expected {chain:?} to resolve"))
        .members
        .keys()
        .map(|name| name.to_string())
        .collect()
}

#[test]
fn test_documented_entity_scenario() {
    let mut service = SchemaService::new();
    service
        .load(
            r#"{
                "structs": { "entity": { "functions": { "name": { "kind": "Number" } } } },
                "function_sets": { "baseFns": { "functions": { "name": { "kind": "String" } } } },
                "runtimes": {
                    "event:ENTITY": {
                        "query": { "target": { "kind": "Struct", "structType": "entity" } }
                    }
                },
                "structCompositions": {
                    "entity": {
                        "registries": ["baseFns"],
                        "customFunctions": { "name": { "kind": "Struct" } }
                    }
                }
            }"#,
        )
        .unwrap();

    let resolution = service
        .resolve_chain(Some("event:ENTITY"), &["target"])
        .unwrap();
    assert_eq!(resolution.entry.unwrap().struct_type(), Some("entity"));
    assert_eq!(resolution.members.len(), 1);
    assert!(resolution.members["name"].is_struct());

    assert!(service
        .resolve_chain(Some("event:ENTITY"), &["target", "name", "x"])
        .is_none());
}

#[test]
fn test_runtime_scoped_query_variable() {
    let service = service();
    assert_eq!(
        member_names(&service, Some("event:BATTLE_VICTORY"), &["winner"]),
        vec!["username", "party", "uuid", "name"]
    );
}

#[test]
fn test_later_registry_overrides_earlier() {
    let service = service();
    let name = service
        .resolve_entry(Some("event:BATTLE_VICTORY"), &["winner", "name"])
        .unwrap();
    assert_eq!(name.description.as_deref(), Some("Display name"));
}

#[test]
fn test_custom_functions_override_registries() {
    let service = service();
    let members = service.all_members_of(Some("vec3"));
    assert_eq!(members["x"].kind, EntryKind::Value("Number".into()));
    assert!(members.contains_key("length"));
    assert!(members.contains_key("z"));
}

#[test]
fn test_query_variable_without_struct_type_uses_its_name() {
    let service = service();
    let members = member_names(&service, Some("event:BATTLE_VICTORY"), &["pokemon"]);
    assert!(members.contains(&"level".to_string()));

    // `player` has no struct_type either; it is navigated as the `player` struct
    let username = service
        .resolve_entry(Some("event:POKEMON_CAPTURED"), &["player", "username"])
        .unwrap();
    assert_eq!(username.kind_name(), Some("String"));
}

#[test]
fn test_deep_chain_through_struct_types() {
    let service = service();
    let resolution = service
        .resolve_chain(
            Some("event:POKEMON_CAPTURED"),
            &["pokemon", "species", "identifier"],
        )
        .unwrap();
    assert_eq!(resolution.entry.unwrap().kind_name(), Some("String"));
    assert!(resolution.members.is_empty());
}

#[test]
fn test_inline_members_with_struct_type() {
    let service = service();
    let members = member_names(&service, None, &["player", "party"]);
    assert_eq!(members, vec!["first", "size", "contains"]);

    let size = service.resolve_entry(None, &["player", "party", "size"]).unwrap();
    assert_eq!(size.description.as_deref(), Some("Inline party size"));

    // inline members apply to the step right after `party` only
    let level = service
        .resolve_chain(None, &["player", "party", "first", "level"])
        .unwrap();
    assert_eq!(level.entry.unwrap().kind_name(), Some("Number"));
}

#[test]
fn test_inline_members_without_struct_type() {
    let service = service();
    assert_eq!(
        member_names(&service, None, &["pokemon", "species", "base_stats"]),
        vec!["hp", "attack"]
    );
    assert!(service
        .resolve_chain(None, &["pokemon", "species", "base_stats", "speed"])
        .is_none());
}

#[test]
fn test_leaf_terminates_chain() {
    let service = service();
    let resolution = service.resolve_chain(None, &["pokemon", "level"]).unwrap();
    assert!(resolution.members.is_empty());
    assert!(service
        .resolve_chain(None, &["pokemon", "level", "x"])
        .is_none());
}

#[test]
fn test_invalid_first_identifier() {
    let service = service();
    for runtime in [None, Some("event:BATTLE_VICTORY"), Some("event:NOPE")] {
        assert!(service.resolve_chain(runtime, &["missing"]).is_none());
        assert!(service.resolve_chain(runtime, &["missing", "level"]).is_none());
    }
}

#[test]
fn test_unscoped_query_variables_later_runtime_wins() {
    let service = service();
    let turns = service.query_variables(None)["turns"];
    assert_eq!(turns.kind_name(), Some("String"));

    let scoped = service.query_variables(Some("event:BATTLE_VICTORY"))["turns"];
    assert_eq!(scoped.kind_name(), Some("Number"));
}

#[test]
fn test_resolve_entry_rules() {
    let service = service();

    assert!(service.resolve_entry(None, &["math"]).is_none());
    let random = service.resolve_entry(None, &["math", "random"]).unwrap();
    assert_eq!(random.signature("math.random"), "math.random(low: Number, high: Number) → Number");

    let winner = service
        .resolve_entry(Some("event:BATTLE_VICTORY"), &["winner"])
        .unwrap();
    assert_eq!(winner.struct_type(), Some("player"));
    assert!(service.resolve_entry(None, &["winner"]).is_none());

    let heal = service.resolve_entry(None, &["pokemon", "heal"]).unwrap();
    assert_eq!(
        heal.signature("q.pokemon.heal"),
        "q.pokemon.heal(amount: Number, cure_status: Boolean?) → Void"
    );
}

#[test]
fn test_query_variables_of_any_kind_follow_struct_type() {
    let mut service = SchemaService::new();
    service
        .load(
            r#"{
                "structs": { "entity": { "functions": { "name": { "type": "String" } } } },
                "runtimes": {
                    "event:A": {
                        "query": {
                            "target": { "struct_type": "entity" },
                            "victim": { "type": "Entity", "struct_type": "entity" },
                            "stats": { "type": "Stats", "functions": { "hp": { "type": "Number" } } }
                        }
                    }
                }
            }"#,
        )
        .unwrap();

    for variable in ["target", "victim"] {
        let name = service
            .resolve_entry(Some("event:A"), &[variable, "name"])
            .unwrap_or_else(|| panic!("Expected {variable}.name to resolve"));
        assert_eq!(name.kind_name(), Some("String"));
    }
    assert_eq!(
        member_names(&service, Some("event:A"), &["victim"]),
        vec!["name"]
    );
    // inline members of a non-struct query variable are listed as well
    assert_eq!(
        member_names(&service, Some("event:A"), &["stats"]),
        vec!["hp"]
    );
}
