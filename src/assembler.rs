//! Document assembly
//!
//! Merges routes with the operation metadata of their holders, resolves each
//! operation's reference graph, registers the reachable components and
//! renders the OpenAPI document. The same prepared operations back the
//! per-operation schema fragment lookups.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, DocumentCache, OperationTable, PreparedOperation, DOCUMENT_KEY, OPERATIONS_KEY};
use crate::collector::ReferenceCollector;
use crate::config::RoutedocConfig;
use crate::error::Result;
use crate::fragment::SchemaFragmentBuilder;
use crate::holder::HolderRef;
use crate::node::{MetadataNode, NodeKind, Operation, Parameter, ParameterLocation, Schema, SecurityRequirement};
use crate::objects::{ExternalDocumentation, Info, Server, Tag};
use crate::reference::Slot;
use crate::registry::ComponentRegistry;
use crate::resolver::{ResolutionCache, Resolver};
use crate::route::Route;
use crate::store::MetadataStore;

/// OpenAPI version written to every document
pub const OPENAPI_VERSION: &str = "3.0.2";

/// Builds OpenAPI documents and schema fragments from routes and metadata
pub struct DocumentAssembler {
    info: Info,
    servers: Vec<Server>,
    security: Vec<SecurityRequirement>,
    tags: Vec<Tag>,
    external_docs: Option<ExternalDocumentation>,
    routes: Vec<Box<dyn Route>>,
    components: Vec<Arc<MetadataNode>>,
    store: Arc<dyn MetadataStore>,
    resolver: Resolver,
    fragments: SchemaFragmentBuilder,
    cache: Option<Arc<dyn DocumentCache>>,
    /// Prepared operations of the current route set
    operations: Mutex<Option<Arc<OperationTable>>>,
    include_undescribed_operations: bool,
    strict_component_names: bool,
}

impl DocumentAssembler {
    pub fn new(info: Info, store: Arc<dyn MetadataStore>) -> Self {
        Self {
            info,
            servers: Vec::new(),
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
            routes: Vec::new(),
            components: Vec::new(),
            resolver: Resolver::new(store.clone()),
            store,
            fragments: SchemaFragmentBuilder::new(),
            cache: None,
            operations: Mutex::new(None),
            include_undescribed_operations: false,
            strict_component_names: false,
        }
    }

    /// Assembler configured from the `[document]`, `[assembly]` and
    /// `[fragment]` sections
    pub fn from_config(config: &RoutedocConfig, store: Arc<dyn MetadataStore>) -> Self {
        let mut assembler = Self::new(config.document.info(), store);
        assembler.servers = config.document.servers();
        assembler.include_undescribed_operations = config.assembly.include_undescribed_operations;
        assembler.strict_component_names = config.assembly.strict_component_names;
        assembler.fragments = SchemaFragmentBuilder::with_dialect(&config.fragment.json_schema_dialect);
        assembler
    }

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn add_server(&mut self, server: Server) -> &mut Self {
        self.servers.push(server);
        self
    }

    pub fn add_tag(&mut self, tag: Tag) -> &mut Self {
        self.tags.push(tag);
        self
    }

    pub fn add_security(&mut self, requirement: SecurityRequirement) -> &mut Self {
        self.security.push(requirement);
        self
    }

    pub fn set_external_docs(&mut self, docs: ExternalDocumentation) -> &mut Self {
        self.external_docs = Some(docs);
        self
    }

    pub fn add_route(&mut self, route: impl Route + 'static) -> &mut Self {
        self.routes.push(Box::new(route));
        self.invalidate();
        self
    }

    pub fn add_routes<R, I>(&mut self, routes: I) -> &mut Self
    where
        R: Route + 'static,
        I: IntoIterator<Item = R>,
    {
        for route in routes {
            self.routes.push(Box::new(route));
        }
        self.invalidate();
        self
    }

    /// Register a component directly, e.g. a security scheme
    pub fn add_component(&mut self, component: impl Into<MetadataNode>) -> &mut Self {
        self.components.push(Arc::new(component.into()));
        self.invalidate();
        self
    }

    pub fn set_cache(&mut self, cache: Arc<dyn DocumentCache>) -> &mut Self {
        self.cache = Some(cache);
        self.invalidate();
        self
    }

    /// Share a resolution cache with other assemblers
    pub fn set_resolution_cache(&mut self, cache: ResolutionCache) -> &mut Self {
        self.resolver = Resolver::with_cache(self.store.clone(), cache);
        self.invalidate();
        self
    }

    pub fn include_undescribed_operations(&mut self, include: bool) -> &mut Self {
        self.include_undescribed_operations = include;
        self.invalidate();
        self
    }

    pub fn strict_component_names(&mut self, strict: bool) -> &mut Self {
        self.strict_component_names = strict;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    fn invalidate(&mut self) {
        *self.operations.get_mut() = None;
    }

    /// Prepared operations keyed by route name.
    ///
    /// Served from the in-process memo, then the external cache, and built
    /// otherwise.
    pub fn operations(&self) -> Result<Arc<OperationTable>> {
        let mut memo = self.operations.lock();
        if let Some(table) = memo.as_ref() {
            return Ok(table.clone());
        }

        if let Some(cache) = &self.cache {
            if let Some(CacheEntry::Operations(table)) = cache.load(OPERATIONS_KEY)? {
                debug!(operations = table.len(), "Operations served from cache");
                *memo = Some(table.clone());
                return Ok(table);
            }
        }

        let table = Arc::new(self.prepare_operations()?);
        if let Some(cache) = &self.cache {
            cache.store(OPERATIONS_KEY, CacheEntry::Operations(table.clone()))?;
        }
        *memo = Some(table.clone());
        Ok(table)
    }

    /// Operation ids of all prepared operations, in route order
    pub fn operation_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .operations()?
            .values()
            .filter_map(|p| p.operation.operation_id.clone())
            .collect())
    }

    fn fetch_operation(&self, holder: &HolderRef) -> Option<Operation> {
        let node = match holder {
            HolderRef::Type(type_name) => self.store.class_metadata(type_name, NodeKind::Operation),
            HolderRef::Method { type_name, method } => {
                self.store.method_metadata(type_name, method, NodeKind::Operation)
            }
            HolderRef::Property { .. } => None,
        };
        node.and_then(MetadataNode::into_operation)
    }

    fn prepare_operations(&self) -> Result<OperationTable> {
        let collector = ReferenceCollector::new(&self.resolver);
        let mut table = OperationTable::new();

        for route in &self.routes {
            let holder = route.holder();
            let operation = holder.and_then(|h| self.fetch_operation(h));
            let mut operation = match operation {
                Some(operation) => operation,
                None if self.include_undescribed_operations => Operation::default(),
                None => {
                    warn!(route = route.name(), "Route has no operation metadata, skipping");
                    continue;
                }
            };

            // Referenced path parameters must be resolved before they can
            // shadow synthesized ones
            collector.collect(&operation, holder)?;
            merge_route_facts(&mut operation, &**route);

            debug!(
                route = route.name(),
                path = %route.plain_path(),
                parameters = operation.parameters.len(),
                "Prepared operation"
            );
            table.insert(
                route.name().to_string(),
                PreparedOperation {
                    path: route.plain_path(),
                    methods: route.methods().to_vec(),
                    operation,
                },
            );
        }
        Ok(table)
    }

    fn build_registry(&self, table: &OperationTable) -> Result<ComponentRegistry> {
        let mut registry = if self.strict_component_names {
            ComponentRegistry::strict()
        } else {
            ComponentRegistry::new()
        };

        let collector = ReferenceCollector::new(&self.resolver);
        registry.register(self.components.iter().cloned())?;
        for component in &self.components {
            registry.register(collector.collect(component.as_ref(), None)?)?;
        }

        let resolved_only = ReferenceCollector::resolved_only();
        for prepared in table.values() {
            registry.register(resolved_only.collect(&prepared.operation, None)?)?;
        }
        Ok(registry)
    }

    /// Components reachable from the current routes plus directly added ones
    pub fn component_registry(&self) -> Result<ComponentRegistry> {
        let table = self.operations()?;
        self.build_registry(&table)
    }

    /// Render the full document
    pub fn to_document(&self) -> Result<Value> {
        if let Some(cache) = &self.cache {
            if let Some(CacheEntry::Document(document)) = cache.load(DOCUMENT_KEY)? {
                debug!("Document served from cache");
                return Ok(document.as_ref().clone());
            }
        }

        let table = self.operations()?;
        let registry = self.build_registry(&table)?;

        let mut paths: IndexMap<String, Map<String, Value>> = IndexMap::new();
        for prepared in table.values() {
            let rendered = serde_json::to_value(&prepared.operation)?;
            let item = paths.entry(prepared.path.clone()).or_default();
            for method in &prepared.methods {
                item.insert(method.to_lowercase(), rendered.clone());
            }
        }

        let mut document = Map::new();
        document.insert("openapi".to_string(), Value::from(OPENAPI_VERSION));
        document.insert("info".to_string(), serde_json::to_value(&self.info)?);
        if !self.servers.is_empty() {
            document.insert("servers".to_string(), serde_json::to_value(&self.servers)?);
        }
        document.insert("paths".to_string(), serde_json::to_value(&paths)?);
        if !registry.is_empty() {
            document.insert("components".to_string(), serde_json::to_value(registry.render_all()?)?);
        }
        if !self.security.is_empty() {
            document.insert("security".to_string(), serde_json::to_value(&self.security)?);
        }
        if !self.tags.is_empty() {
            document.insert("tags".to_string(), serde_json::to_value(&self.tags)?);
        }
        if let Some(docs) = &self.external_docs {
            document.insert("externalDocs".to_string(), serde_json::to_value(docs)?);
        }

        info!(
            paths = paths.len(),
            components = registry.len(),
            "Built OpenAPI document"
        );

        let document = Value::Object(document);
        if let Some(cache) = &self.cache {
            cache.store(DOCUMENT_KEY, CacheEntry::Document(Arc::new(document.clone())))?;
        }
        Ok(document)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document()?)?)
    }

    pub fn to_json_compact(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_document()?)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_document()?)?)
    }

    fn with_operation<F>(&self, operation_id: &str, build: F) -> Result<Option<Value>>
    where
        F: FnOnce(&SchemaFragmentBuilder, &Operation) -> Result<Option<Value>>,
    {
        let table = self.operations()?;
        let found = table
            .values()
            .find(|p| p.operation.operation_id.as_deref() == Some(operation_id));
        match found {
            Some(prepared) => build(&self.fragments, &prepared.operation),
            None => {
                debug!(operation_id, "Unknown operation");
                Ok(None)
            }
        }
    }

    pub fn request_cookie_json_schema(&self, operation_id: &str) -> Result<Option<Value>> {
        self.with_operation(operation_id, |fragments, op| {
            fragments.for_request_part(op, ParameterLocation::Cookie)
        })
    }

    pub fn request_header_json_schema(&self, operation_id: &str) -> Result<Option<Value>> {
        self.with_operation(operation_id, |fragments, op| {
            fragments.for_request_part(op, ParameterLocation::Header)
        })
    }

    pub fn request_query_json_schema(&self, operation_id: &str) -> Result<Option<Value>> {
        self.with_operation(operation_id, |fragments, op| {
            fragments.for_request_part(op, ParameterLocation::Query)
        })
    }

    pub fn request_body_json_schema(
        &self,
        operation_id: &str,
        content_type: &str,
    ) -> Result<Option<Value>> {
        self.with_operation(operation_id, |fragments, op| {
            fragments.for_request_body(op, content_type)
        })
    }

    pub fn response_body_json_schema(
        &self,
        operation_id: &str,
        status: &str,
        content_type: &str,
    ) -> Result<Option<Value>> {
        self.with_operation(operation_id, |fragments, op| {
            fragments.for_response_body(op, status, content_type)
        })
    }
}

/// Seed the operation from its route and synthesize path parameters
fn merge_route_facts(operation: &mut Operation, route: &dyn Route) {
    if operation.operation_id.is_none() {
        operation.operation_id = Some(route.name().to_string());
    }
    if operation.summary.is_none() {
        operation.summary = route.summary().map(str::to_string);
    }
    if operation.description.is_none() {
        operation.description = route.description().map(str::to_string);
    }
    if operation.tags.is_empty() {
        operation.tags = route.tags().to_vec();
    }

    let declared: HashSet<&str> = operation
        .parameters
        .iter()
        .filter_map(Slot::get)
        .filter(|p| p.location == ParameterLocation::Path)
        .map(|p| p.name.as_str())
        .collect();

    let synthesized: Vec<Slot<Parameter>> = route
        .path_attributes()
        .into_iter()
        .filter(|attr| !declared.contains(attr.name.as_str()))
        .map(|attr| {
            let mut parameter = Parameter::new(attr.name, ParameterLocation::Path);
            parameter.required = Some(!attr.is_optional);
            if let Some(pattern) = attr.pattern {
                parameter.schema = Some(Schema::of_type("string").with_pattern(pattern).into());
            }
            Slot::Inline(parameter)
        })
        .collect();

    operation.parameters.splice(0..0, synthesized);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoutedocError;
    use crate::route::RouteDefinition;
    use crate::store::MetadataCatalog;
    use serde_json::json;

    fn assembler(catalog: MetadataCatalog) -> DocumentAssembler {
        DocumentAssembler::new(Info::new("Test", "1.0.0"), Arc::new(catalog))
    }

    #[test]
    fn test_route_facts_seed_operation() {
        let mut catalog = MetadataCatalog::new();
        catalog.add_method_metadata(
            "app::Users",
            "show",
            Operation {
                summary: Some("Explicit".to_string()),
                ..Default::default()
            },
        );

        let mut assembler = assembler(catalog);
        assembler.add_route(
            RouteDefinition::new("users_show", r"/users/{id<\d+>}(/{tab})")
                .with_holder(HolderRef::method("app::Users", "show"))
                .with_summary("From route"),
        );

        let document = assembler.to_document().unwrap();
        let operation = &document["paths"]["/users/{id}/{tab}"]["get"];
        assert_eq!(operation["operationId"], "users_show");
        assert_eq!(operation["summary"], "Explicit");
        assert_eq!(
            operation["parameters"],
            json!([
                {"name": "id", "in": "path", "required": true, "schema": {"type": "string", "pattern": "\\d+"}},
                {"name": "tab", "in": "path", "required": false}
            ])
        );
    }

    #[test]
    fn test_declared_path_parameter_is_not_duplicated() {
        let mut catalog = MetadataCatalog::new();
        let declared = Parameter::new("id", ParameterLocation::Path)
            .required()
            .with_schema(Schema::of_type("integer").into());
        catalog.add_class_metadata(
            "app::ShowUser",
            Operation::default().with_parameter(declared.into()),
        );

        let mut assembler = assembler(catalog);
        assembler.add_route(
            RouteDefinition::new("user", "/users/{id}").with_holder(HolderRef::of_type("app::ShowUser")),
        );

        let document = assembler.to_document().unwrap();
        let parameters = &document["paths"]["/users/{id}"]["get"]["parameters"];
        assert_eq!(parameters.as_array().map(Vec::len), Some(1));
        assert_eq!(parameters[0]["schema"]["type"], "integer");
    }

    #[test]
    fn test_referenced_path_parameter_is_not_duplicated() {
        let mut catalog = MetadataCatalog::new();
        catalog.add_method_metadata(
            "app::Users",
            "idParam",
            Parameter::new("id", ParameterLocation::Path).required(),
        );
        catalog.add_method_metadata(
            "app::Users",
            "show",
            Operation::default().with_parameter(Slot::reference("@idParam")),
        );

        let mut assembler = assembler(catalog);
        assembler.add_route(
            RouteDefinition::new("user", "/users/{id}")
                .with_holder(HolderRef::method("app::Users", "show")),
        );

        let document = assembler.to_document().unwrap();
        let parameters = &document["paths"]["/users/{id}"]["get"]["parameters"];
        assert_eq!(parameters.as_array().map(Vec::len), Some(1));
        let pointer = parameters[0]["$ref"].as_str().unwrap();
        assert!(pointer.starts_with("#/components/parameters/"), "{pointer}");
        assert_eq!(document["components"]["parameters"].as_object().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_cache_failures_propagate() {
        struct FailingCache;

        impl DocumentCache for FailingCache {
            fn load(&self, _key: &str) -> Result<Option<CacheEntry>> {
                Err(RoutedocError::Cache("unavailable".to_string()))
            }

            fn store(&self, _key: &str, _entry: CacheEntry) -> Result<()> {
                Ok(())
            }

            fn remove(&self, _key: &str) -> Result<()> {
                Ok(())
            }
        }

        let mut assembler = assembler(MetadataCatalog::new());
        assembler.set_cache(Arc::new(FailingCache));
        let err = assembler.to_document().unwrap_err();
        assert!(matches!(err, RoutedocError::Cache(ref message) if message == "unavailable"));
    }

    #[test]
    fn test_undescribed_routes() {
        let mut assembler = assembler(MetadataCatalog::new());
        assembler.add_route(RouteDefinition::new("health", "/health"));
        let document = assembler.to_document().unwrap();
        assert_eq!(document["paths"], json!({}));

        assembler.include_undescribed_operations(true);
        let document = assembler.to_document().unwrap();
        assert_eq!(
            document["paths"]["/health"]["get"],
            json!({"operationId": "health", "responses": {}})
        );
    }

    #[test]
    fn test_document_field_order() {
        let mut assembler = assembler(MetadataCatalog::new());
        assembler
            .add_server(Server::new("https://api.example.com"))
            .add_tag(Tag {
                name: "users".to_string(),
                ..Default::default()
            });
        let document = assembler.to_document().unwrap();
        let keys: Vec<_> = document.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["openapi", "info", "servers", "paths", "tags"]);
    }
}
