//! Rendering of IR artifacts into target source text.
//!
//! The pipeline is:
//! 1. Compile: ApiDefinition -> CompiledApi (IR plus resolved imports)
//! 2. Render: CompiledApi artifacts -> source text, via a `Generator`
//!
//! A `Generator` only consumes IR and the `ImportSet`s already attached to it.
//! It never derives imports on its own.
//!
//! ## Module Structure
//!
//! - `angular`: TypeScript interfaces and Angular `HttpClient` services

pub mod angular;

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde_json::Value;

pub use angular::AngularGenerator;

use crate::error::{ImportError, RenderError};
use crate::imports::{GenericImport, ImportSet, PackageResolver};
use crate::ir::api::{
    CompiledEntity, CompiledService, Record, ServiceContract, ServiceImplementationUnit,
};
use crate::ir::compile::CompilerOptions;

/// A code generator for one target language/framework.
pub trait Generator {
    /// Names the compiler must use for this target.
    fn options(&self) -> CompilerOptions;

    /// Extension of generated files, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Types provided by the target's standard libraries.
    fn well_known_types(&self) -> &dyn PackageResolver;

    fn generate_import(&self, import: &GenericImport) -> String;

    fn generate_record(&self, record: &Record) -> Result<String, RenderError>;

    /// Default values of a record, e.g. a configuration constant.
    fn generate_initializer(
        &self,
        record: &Record,
        values: &BTreeMap<String, Value>,
    ) -> Result<String, RenderError>;

    fn generate_contract(&self, contract: &ServiceContract) -> Result<String, RenderError>;

    fn generate_implementation_unit(
        &self,
        unit: &ServiceImplementationUnit,
    ) -> Result<String, RenderError>;

    /// One import statement per provider, in provider order.
    fn generate_imports(&self, imports: &ImportSet) -> String {
        imports
            .iter()
            .map(|import| self.generate_import(import))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Full file contents of an entity (or configuration) artifact.
    fn generate_entity(&self, entity: &CompiledEntity) -> Result<String, RenderError> {
        let mut sections = vec![
            self.generate_imports(&entity.imports),
            self.generate_record(&entity.record)?,
        ];
        if !entity.initializer.is_empty() {
            sections.push(self.generate_initializer(&entity.record, &entity.initializer)?);
        }
        Ok(join_sections(sections))
    }

    /// Full file contents of a service artifact.
    fn generate_service(&self, service: &CompiledService) -> Result<String, RenderError> {
        let mut sections = vec![self.generate_imports(&service.imports)];
        for record in &service.input_records {
            sections.push(self.generate_record(record)?);
        }
        sections.push(self.generate_contract(&service.contract)?);
        sections.push(self.generate_implementation_unit(&service.implementation)?);
        Ok(join_sections(sections))
    }
}

/// Join non-empty sections with a blank line, ending with a newline.
fn join_sections(sections: Vec<String>) -> String {
    let mut contents = sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    contents.push('\n');
    contents
}

/// A fixed table of type names and their providers.
#[derive(Debug, Clone, Copy)]
pub struct StaticResolver {
    entries: &'static [(&'static str, &'static str)],
}

impl StaticResolver {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }
}

impl PackageResolver for StaticResolver {
    fn resolve(&self, type_name: &str) -> Result<String, ImportError> {
        self.entries
            .iter()
            .find(|(name, _)| *name == type_name)
            .map(|(_, provider)| provider.to_string())
            .ok_or_else(|| ImportError::UnresolvedType {
                type_name: type_name.to_string(),
            })
    }
}

/// Supported output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Target {
    /// Angular services on top of `HttpClient`
    #[default]
    Angular,
}

impl Target {
    /// Build the generator for this target. `base_url` prefixes every request URL.
    pub fn generator(&self, base_url: &str) -> Box<dyn Generator> {
        match self {
            Target::Angular => Box::new(AngularGenerator::new(base_url)),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Angular => f.write_str("angular"),
        }
    }
}
