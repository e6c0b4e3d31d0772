//! routedoc
//!
//! Derives an OpenAPI 3.0 document and scoped JSON-Schema fragments from
//! declarative metadata attached to the types and methods implementing HTTP
//! routes.
//!
//! ## Features
//!
//! - **Shorthand References**: `{"$ref": "User.email"}` resolves against the
//!   holder of the declaring node
//! - **Resolve Once**: each distinct target is fetched, cached and rendered
//!   exactly once, cycles included
//! - **Component Registry**: the transitive closure of every operation lands
//!   under `#/components`, deduplicated by identity
//! - **Schema Fragments**: per request part (cookie, header, query), request
//!   body and response body, with local `definitions`
//! - **Validation**: draft 7 validation of live data against fragments
//!
//! ## Architecture
//!
//! ```text
//! routes ──► DocumentAssembler ──► MetadataStore (Operation per holder)
//!                 │
//!                 ├──► ReferenceCollector ──► Resolver ──► ResolutionCache
//!                 ├──► ComponentRegistry ──► components
//!                 └──► SchemaFragmentBuilder ──► JSON-Schema fragments
//! ```

pub mod assembler;
pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod fragment;
pub mod holder;
pub mod node;
pub mod objects;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod route;
pub mod store;
pub mod validation;

pub use assembler::DocumentAssembler;
pub use cache::{CacheEntry, DocumentCache, MemoryCache};
pub use collector::ReferenceCollector;
pub use config::RoutedocConfig;
pub use error::{Result, RoutedocError};
pub use fingerprint::Fingerprint;
pub use fragment::SchemaFragmentBuilder;
pub use holder::{Address, HolderRef};
pub use node::{Component, MetadataNode, NodeKind};
pub use reference::{Reference, Resolved, Slot};
pub use registry::ComponentRegistry;
pub use resolver::{ResolutionCache, Resolver};
pub use route::{PathAttribute, Route, RouteDefinition};
pub use store::{MetadataCatalog, MetadataStore};
pub use validation::{FragmentValidator, ValidationReport};
