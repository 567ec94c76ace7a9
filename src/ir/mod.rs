//! Intermediate representation between API descriptions and generated code.
//!
//! The IR is target-independent: it names records, contracts and
//! implementation units, but says nothing about how a language spells them.
//!
//! ## Module Structure
//!
//! - `types`: the recursive `DynamicType` shared with the input model
//! - `api`: IR artifacts (Record, ServiceContract, ServiceImplementationUnit, ...)
//! - `compile`: ApiDefinition -> IR, including provider registration and import resolution
//! - `utils`: naming and escaping helpers

pub mod api;
pub mod compile;
pub mod types;
pub mod utils;

pub use api::{CompiledApi, CompiledEntity, CompiledService};
pub use compile::{
    ArtifactKind, CompilerOptions, compile_api, compile_config, compile_entity, compile_service,
    provider_location, register_config_location, register_entity_locations,
};
pub use types::{DynamicType, TypeKind};
