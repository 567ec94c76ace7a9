//! Import sets and their combination.
//!
//! ## Module Structure
//!
//! - `resolver`: collects type references of IR artifacts and resolves them to providers
//! - `registry`: per-run map from type name to the location that will provide it

pub mod registry;
pub mod resolver;

use std::collections::{BTreeMap, BTreeSet};

pub use registry::ProviderRegistry;
pub use resolver::{
    ImportSource, PackageResolver, ResolverChain, compose_package_resolvers, resolve_imports,
};

/// One import statement: a provider and the names taken from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericImport {
    pub provider: String,
    pub provided_entities: BTreeSet<String>,
}

impl GenericImport {
    pub fn new<I, S>(provider: impl Into<String>, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            provider: provider.into(),
            provided_entities: entities.into_iter().map(Into::into).collect(),
        }
    }
}

/// Imports of one artifact, at most one entry per provider, ordered by provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    imports: BTreeMap<String, GenericImport>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an import, merging it into an existing entry for the same provider.
    pub fn insert(&mut self, import: GenericImport) {
        match self.imports.get_mut(&import.provider) {
            Some(existing) => existing
                .provided_entities
                .extend(import.provided_entities),
            None => {
                self.imports.insert(import.provider.clone(), import);
            }
        }
    }

    /// Record that `entity` comes from `provider`.
    pub fn add(&mut self, provider: &str, entity: impl Into<String>) {
        self.imports
            .entry(provider.to_string())
            .or_insert_with(|| GenericImport::new(provider, Vec::<String>::new()))
            .provided_entities
            .insert(entity.into());
    }

    pub fn get(&self, provider: &str) -> Option<&GenericImport> {
        self.imports.get(provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenericImport> {
        self.imports.values()
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.imports.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

impl FromIterator<GenericImport> for ImportSet {
    fn from_iter<T: IntoIterator<Item = GenericImport>>(iter: T) -> Self {
        let mut set = ImportSet::new();
        for import in iter {
            set.insert(import);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ImportSet {
    type Item = &'a GenericImport;
    type IntoIter = std::collections::btree_map::Values<'a, String, GenericImport>;

    fn into_iter(self) -> Self::IntoIter {
        self.imports.values()
    }
}

/// Default combiner: union of the provided entities of a same-provider group.
pub fn combine_imports(group: &[GenericImport]) -> GenericImport {
    let provider = group
        .first()
        .map(|import| import.provider.clone())
        .unwrap_or_default();

    GenericImport {
        provider,
        provided_entities: group
            .iter()
            .flat_map(|import| import.provided_entities.iter().cloned())
            .collect(),
    }
}

/// Merge several import sets into one.
///
/// Imports are grouped by provider across all sets, and every group, including
/// groups with a single member, is reduced by `combiner`.
pub fn union_imports<'a, F, I>(combiner: F, sets: I) -> ImportSet
where
    F: Fn(&[GenericImport]) -> GenericImport,
    I: IntoIterator<Item = &'a ImportSet>,
{
    let mut groups: BTreeMap<&str, Vec<GenericImport>> = BTreeMap::new();
    for set in sets {
        for import in set {
            groups
                .entry(import.provider.as_str())
                .or_default()
                .push(import.clone());
        }
    }

    groups
        .into_values()
        .map(|group| combiner(&group))
        .collect()
}
