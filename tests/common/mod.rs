//! Shared fixture loading for integration tests

use std::sync::Arc;

use routedoc::objects::Info;
use routedoc::{DocumentAssembler, MetadataCatalog};

pub fn fixture_catalog() -> MetadataCatalog {
    MetadataCatalog::from_yaml_str(include_str!("../fixtures/catalog.yaml")).unwrap()
}

/// Assembler over the fixture app with all of its routes
pub fn some_app() -> DocumentAssembler {
    assembler_for(fixture_catalog())
}

pub fn assembler_for(catalog: MetadataCatalog) -> DocumentAssembler {
    let routes = catalog.routes().to_vec();
    let mut assembler = DocumentAssembler::new(Info::new("Some App", "1.0.0"), Arc::new(catalog));
    assembler.add_routes(routes);
    assembler
}
