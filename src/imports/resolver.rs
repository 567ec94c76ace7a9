//! Reference collection and provider resolution.
//!
//! `resolve_imports` turns the type references of an IR artifact into an
//! `ImportSet`. Where each name comes from is decided by a `PackageResolver`:
//! a closure, the per-run `ProviderRegistry`, or a `ResolverChain` trying
//! several of them in order.

use std::collections::BTreeSet;

use tracing::trace;

use super::ImportSet;
use crate::error::ImportError;
use crate::ir::api::{
    CompiledService, MethodImplementation, MethodSignature, Record, ServiceContract,
    ServiceImplementationUnit, VariableDecl,
};
use crate::ir::types::DynamicType;

/// An artifact whose type references can be enumerated.
pub trait ImportSource {
    /// Add every type name this artifact refers to.
    fn collect_type_references(&self, references: &mut BTreeSet<String>);

    fn type_references(&self) -> BTreeSet<String> {
        let mut references = BTreeSet::new();
        self.collect_type_references(&mut references);
        references
    }
}

impl ImportSource for DynamicType {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        self.collect_references_into(references);
    }
}

impl ImportSource for VariableDecl {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        self.ty().collect_references_into(references);
    }
}

impl ImportSource for Record {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        for variable in self.variables.values() {
            variable.collect_type_references(references);
        }
    }
}

impl ImportSource for MethodSignature {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        self.return_type.collect_type_references(references);
        for parameter in &self.parameters {
            parameter.collect_type_references(references);
        }
    }
}

impl ImportSource for MethodImplementation {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        self.signature.collect_type_references(references);
    }
}

impl ImportSource for ServiceContract {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        for method in &self.methods {
            method.collect_type_references(references);
        }
    }
}

impl ImportSource for ServiceImplementationUnit {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        for contract in &self.implemented_contracts {
            contract.collect_type_references(references);
        }
        for property in self
            .injected_properties
            .values()
            .chain(self.own_properties.values())
        {
            property.collect_type_references(references);
        }
        for method in &self.methods {
            method.collect_type_references(references);
        }
    }
}

impl ImportSource for CompiledService {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        self.input_records.collect_type_references(references);
        self.contract.collect_type_references(references);
        self.implementation.collect_type_references(references);
    }
}

impl<T: ImportSource> ImportSource for [T] {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        for item in self {
            item.collect_type_references(references);
        }
    }
}

impl<T: ImportSource> ImportSource for Vec<T> {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        self.as_slice().collect_type_references(references);
    }
}

impl<T: ImportSource + ?Sized> ImportSource for &T {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        (**self).collect_type_references(references);
    }
}

impl<A: ImportSource, B: ImportSource> ImportSource for (A, B) {
    fn collect_type_references(&self, references: &mut BTreeSet<String>) {
        self.0.collect_type_references(references);
        self.1.collect_type_references(references);
    }
}

/// Maps a type name to the provider (package or relative module) exporting it.
pub trait PackageResolver {
    fn resolve(&self, type_name: &str) -> Result<String, ImportError>;
}

impl<F> PackageResolver for F
where
    F: Fn(&str) -> Result<String, ImportError>,
{
    fn resolve(&self, type_name: &str) -> Result<String, ImportError> {
        self(type_name)
    }
}

/// Resolvers tried in order; the first success wins.
pub struct ResolverChain<'a> {
    resolvers: Vec<&'a dyn PackageResolver>,
}

impl std::fmt::Debug for ResolverChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

impl PackageResolver for ResolverChain<'_> {
    fn resolve(&self, type_name: &str) -> Result<String, ImportError> {
        for resolver in &self.resolvers {
            if let Ok(provider) = resolver.resolve(type_name) {
                return Ok(provider);
            }
        }
        // Individual failures are not aggregated, the caller only learns the name.
        Err(ImportError::UnresolvedType {
            type_name: type_name.to_string(),
        })
    }
}

/// Compose resolvers into one that tries each of them in order.
pub fn compose_package_resolvers<'a, I>(resolvers: I) -> ResolverChain<'a>
where
    I: IntoIterator<Item = &'a dyn PackageResolver>,
{
    ResolverChain {
        resolvers: resolvers.into_iter().collect(),
    }
}

/// Compute the imports an artifact needs.
///
/// Names rejected by `filter` are skipped. The remaining names are resolved in
/// sorted order and the first failure aborts the whole resolution.
pub fn resolve_imports<S, R, F>(
    artifact: &S,
    resolver: &R,
    filter: F,
) -> Result<ImportSet, ImportError>
where
    S: ImportSource + ?Sized,
    R: PackageResolver + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut imports = ImportSet::new();
    for reference in artifact.type_references() {
        if !filter(&reference) {
            continue;
        }

        let provider = resolver.resolve(&reference)?;
        trace!(type_name = %reference, provider = %provider, "Resolved type provider.");
        imports.add(&provider, reference);
    }
    Ok(imports)
}
