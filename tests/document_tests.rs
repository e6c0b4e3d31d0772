//! Document assembly tests over the fixture application

mod common;

use serde_json::{json, Value};
use std::sync::Arc;

use common::{assembler_for, some_app};
use routedoc::cache::{DOCUMENT_KEY, OPERATIONS_KEY};
use routedoc::node::{SecurityRequirement, SecurityScheme};
use routedoc::objects::Info;
use routedoc::{
    DocumentAssembler, HolderRef, MemoryCache, MetadataCatalog, NodeKind, ResolutionCache,
    RouteDefinition, RoutedocError,
};

fn component_names(document: &Value, category: &str) -> Vec<String> {
    document["components"][category]
        .as_object()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

// ============================================================================
// Document shape
// ============================================================================

#[test]
fn test_paths_group_routes_by_plain_path() {
    let document = some_app().to_document().unwrap();

    assert_eq!(document["openapi"], "3.0.2");
    assert_eq!(document["info"], json!({"title": "Some App", "version": "1.0.0"}));

    let paths: Vec<_> = document["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/users", "/users/{id}"]);

    let users: Vec<_> = document["paths"]["/users"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(users, vec!["get", "post"]);

    let user: Vec<_> = document["paths"]["/users/{id}"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(user, vec!["get", "patch", "delete"]);
}

#[test]
fn test_list_operation_rendering() {
    let document = some_app().to_document().unwrap();
    let list = &document["paths"]["/users"]["get"];

    assert_eq!(list["operationId"], "users.list");
    assert_eq!(list["summary"], "A list of users");
    assert_eq!(list["description"], "Returns a list of user models");
    assert_eq!(list["tags"], json!(["foo", "bar"]));
    assert_eq!(
        list["parameters"],
        json!([
            {"name": "limit", "in": "cookie", "schema": {"$ref": "#/components/schemas/UserController.limit"}},
            {"name": "X-Limit", "in": "header", "schema": {"$ref": "#/components/schemas/UserController.limit"}},
            {"name": "limit", "in": "query", "schema": {"$ref": "#/components/schemas/UserController.limit"}}
        ])
    );
    assert_eq!(
        list["responses"],
        json!({
            "200": {"$ref": "#/components/responses/UserListResponse"},
            "default": {"$ref": "#/components/responses/ErrorResponse"}
        })
    );
}

#[test]
fn test_path_parameters_are_synthesized_first() {
    let document = some_app().to_document().unwrap();
    let update = &document["paths"]["/users/{id}"]["patch"];

    assert_eq!(
        update["parameters"],
        json!([
            {"name": "id", "in": "path", "required": true, "schema": {"type": "string", "pattern": "\\d+"}},
            {"$ref": "#/components/parameters/UserController.fn_getKey"}
        ])
    );
    assert_eq!(
        update["requestBody"],
        json!({"$ref": "#/components/requestBodies/UserUpdateRequest"})
    );
}

#[test]
fn test_routes_without_operations_are_skipped() {
    let document = some_app().to_document().unwrap();
    assert!(document["paths"].get("/").is_none());

    let mut assembler = some_app();
    assembler.include_undescribed_operations(true);
    let document = assembler.to_document().unwrap();
    assert_eq!(document["paths"]["/"]["get"], json!({"operationId": "home", "responses": {}}));
}

#[test]
fn test_operation_ids() {
    let ids = some_app().operation_ids().unwrap();
    assert_eq!(
        ids,
        vec!["users.list", "users.read", "users.create", "users.update", "users.delete"]
    );
}

// ============================================================================
// Components
// ============================================================================

#[test]
fn test_components_hold_the_full_closure() {
    let document = some_app().to_document().unwrap();

    assert_eq!(
        component_names(&document, "schemas"),
        vec![
            "UserController.limit",
            "User",
            "User.email",
            "User.password",
            "Error",
            "Error.code",
            "Error.message",
            "UserController.key",
        ]
    );
    assert_eq!(
        component_names(&document, "responses"),
        vec!["UserListResponse", "ErrorResponse", "UserResponse", "EmptyResponse"]
    );
    assert_eq!(component_names(&document, "parameters"), vec!["UserController.fn_getKey"]);
    assert_eq!(
        component_names(&document, "requestBodies"),
        vec!["UserCreateRequest", "UserUpdateRequest"]
    );
}

#[test]
fn test_component_bodies() {
    let document = some_app().to_document().unwrap();
    let components = &document["components"];

    assert_eq!(
        components["schemas"]["User"],
        json!({
            "type": "object",
            "properties": {
                "email": {"$ref": "#/components/schemas/User.email"},
                "password": {"$ref": "#/components/schemas/User.password"}
            }
        })
    );
    assert_eq!(
        components["schemas"]["UserController.limit"],
        json!({"type": "integer", "nullable": true})
    );
    assert_eq!(
        components["parameters"]["UserController.fn_getKey"],
        json!({
            "name": "x-key",
            "in": "header",
            "required": true,
            "schema": {"$ref": "#/components/schemas/UserController.key"}
        })
    );
    assert_eq!(
        components["responses"]["EmptyResponse"],
        json!({"description": "Returns an empty response"})
    );
    assert_eq!(
        components["requestBodies"]["UserCreateRequest"],
        json!({
            "content": {
                "application/json": {"schema": {"$ref": "#/components/schemas/User"}}
            },
            "required": true
        })
    );
}

#[test]
fn test_same_target_resolves_to_one_instance() {
    let assembler = some_app();
    let registry = assembler.component_registry().unwrap();

    let registered = registry.get("schemas", "User.email").unwrap();
    let via_property = assembler
        .resolver()
        .resolve(".email", NodeKind::Schema, Some(&HolderRef::of_type("some_app::dto::User")))
        .unwrap();
    let via_sibling = assembler
        .resolver()
        .resolve(
            "User.email",
            NodeKind::Schema,
            Some(&HolderRef::of_type("some_app::dto::UserUpdateRequest")),
        )
        .unwrap();

    assert!(Arc::ptr_eq(registered, &via_property.node));
    assert!(Arc::ptr_eq(&via_property.node, &via_sibling.node));
}

#[test]
fn test_strict_names_accept_the_fixture() {
    let mut assembler = some_app();
    assembler.strict_component_names(true);
    assert!(assembler.to_document().is_ok());
}

#[test]
fn test_direct_components_and_security() {
    let mut assembler = some_app();
    assembler
        .add_component(SecurityScheme::bearer("jwt", Some("JWT".to_string())))
        .add_security(SecurityRequirement::new("jwt", Vec::new()));

    let document = assembler.to_document().unwrap();
    assert_eq!(document["security"], json!([{"jwt": []}]));
    assert_eq!(document["components"]["securitySchemes"]["jwt"]["scheme"], "bearer");
}

// ============================================================================
// Name collisions
// ============================================================================

const CLASHING: &str = r#"
routes:
  - name: clash
    path: /clash
    holder: app::Clash@show
types:
  app::Clash:
    methods:
      show:
        - operation:
            responses:
              "200":
                description: Two schemas under one name
                content:
                  application/json:
                    schema:
                      type: object
                      properties:
                        a: { $ref: A }
                        b: { $ref: B }
  app::A:
    metadata:
      - schema: { refName: Shared, type: string }
  app::B:
    metadata:
      - schema: { refName: Shared, type: integer }
"#;

#[test]
fn test_lenient_names_keep_the_last_claim() {
    let assembler = assembler_for(MetadataCatalog::from_yaml_str(CLASHING).unwrap());
    let document = assembler.to_document().unwrap();
    assert_eq!(document["components"]["schemas"], json!({"Shared": {"type": "integer"}}));
}

#[test]
fn test_strict_names_reject_collisions() {
    let mut assembler = assembler_for(MetadataCatalog::from_yaml_str(CLASHING).unwrap());
    assembler.strict_component_names(true);
    match assembler.to_document() {
        Err(RoutedocError::DuplicateComponentName { category, name }) => {
            assert_eq!(category, "schemas");
            assert_eq!(name, "Shared");
        }
        other => panic!("expected a name collision, got {other:?}"),
    }
}

// ============================================================================
// Cycles
// ============================================================================

const TREE: &str = r#"
routes:
  - name: tree
    path: /tree
    holder: app::TreeController@show
types:
  app::TreeController:
    methods:
      show:
        - operation:
            responses:
              "200": { $ref: NodeResponse }
  app::NodeResponse:
    metadata:
      - response:
          description: A tree
          content:
            application/json:
              schema: { $ref: Node }
  app::Node:
    metadata:
      - schema:
          type: object
          required: [label]
          properties:
            label: { type: string }
            children:
              type: array
              items: { $ref: Node }
"#;

#[test]
fn test_self_referencing_schema_is_emitted_once() {
    let assembler = assembler_for(MetadataCatalog::from_yaml_str(TREE).unwrap());
    let document = assembler.to_document().unwrap();

    assert_eq!(component_names(&document, "schemas"), vec!["Node"]);
    assert_eq!(
        document["components"]["schemas"]["Node"]["properties"]["children"]["items"],
        json!({"$ref": "#/components/schemas/Node"})
    );
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_document_and_operations_are_cached() {
    let cache = Arc::new(MemoryCache::new());

    let mut first = some_app();
    first.set_cache(cache.clone());
    let document = first.to_document().unwrap();
    assert!(cache.contains(OPERATIONS_KEY));
    assert!(cache.contains(DOCUMENT_KEY));

    // No routes and an empty store: everything comes from the cache
    let mut second = DocumentAssembler::new(Info::new("Other", "2.0.0"), Arc::new(MetadataCatalog::new()));
    second.set_cache(cache.clone());
    assert_eq!(second.to_document().unwrap(), document);
    assert_eq!(second.operation_ids().unwrap().len(), 5);
    assert!(second.request_query_json_schema("users.list").unwrap().is_some());
}

#[test]
fn test_shared_resolution_cache() {
    let shared = ResolutionCache::new();

    let mut first = some_app();
    first.set_resolution_cache(shared.clone());
    first.to_document().unwrap();
    let resolved = shared.len();
    assert!(resolved > 0);

    let mut second = some_app();
    second.set_resolution_cache(shared.clone());
    second.to_document().unwrap();
    assert_eq!(shared.len(), resolved);

    let a = first.component_registry().unwrap();
    let b = second.component_registry().unwrap();
    assert!(Arc::ptr_eq(
        a.get("schemas", "User").unwrap(),
        b.get("schemas", "User").unwrap()
    ));
}

// ============================================================================
// Broken references
// ============================================================================

fn invalid_assembler(method: &str) -> DocumentAssembler {
    let catalog = MetadataCatalog::from_yaml_str(include_str!("fixtures/invalid.yaml")).unwrap();
    let mut assembler = assembler_for(catalog);
    assembler.add_route(
        RouteDefinition::new(method, "/invalid")
            .with_holder(HolderRef::method("some_app::controller::InvalidController", method)),
    );
    assembler
}

#[test]
fn test_references_to_missing_targets() {
    for method in [
        "refersToUndefinedClass",
        "refersToUndefinedClassMethod",
        "refersToUndefinedClassProperty",
    ] {
        match invalid_assembler(method).to_document() {
            Err(RoutedocError::UnresolvedTarget { .. }) => {}
            other => panic!("{method}: expected an unresolved target, got {other:?}"),
        }
    }
}

#[test]
fn test_references_to_targets_without_metadata() {
    for method in [
        "refersToClassWithoutTarget",
        "refersToClassMethodWithoutTarget",
        "refersToClassPropertyWithoutTarget",
    ] {
        match invalid_assembler(method).to_document() {
            Err(RoutedocError::MissingAnnotation { kind, .. }) => {
                assert_eq!(kind, NodeKind::Response, "{method}");
            }
            other => panic!("{method}: expected a missing annotation, got {other:?}"),
        }
    }
}

#[test]
fn test_unresolved_target_message_names_the_target() {
    let err = invalid_assembler("refersToUndefinedClassProperty").to_document().unwrap_err();
    let message = err.to_string();
    assert!(message.contains(".undefinedProperty"), "{message}");
    assert!(message.contains("InvalidController.undefinedProperty"), "{message}");
}

// ============================================================================
// Output formats
// ============================================================================

#[test]
fn test_json_and_yaml_output_round_trip() {
    let assembler = some_app();
    let document = assembler.to_document().unwrap();

    let pretty: Value = serde_json::from_str(&assembler.to_json().unwrap()).unwrap();
    let compact: Value = serde_json::from_str(&assembler.to_json_compact().unwrap()).unwrap();
    let yaml: Value = serde_yaml::from_str(&assembler.to_yaml().unwrap()).unwrap();

    assert_eq!(pretty, document);
    assert_eq!(compact, document);
    assert_eq!(yaml, document);
    assert!(!assembler.to_json_compact().unwrap().contains('\n'));
}

#[test]
fn test_catalog_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("app.yaml"), include_str!("fixtures/catalog.yaml")).unwrap();
    std::fs::write(dir.path().join("invalid.yml"), include_str!("fixtures/invalid.yaml")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a catalog").unwrap();

    let mut catalog = MetadataCatalog::new();
    catalog.load_dir(dir.path()).unwrap();
    assert!(catalog
        .type_names()
        .any(|t| t == "some_app::controller::InvalidController"));

    let document = assembler_for(catalog).to_document().unwrap();
    assert_eq!(document, some_app().to_document().unwrap());
}
