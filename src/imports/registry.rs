//! Per-run mapping from type names to the locations that provide them.
//!
//! The registry is filled during the registration phase of a compilation run
//! (through `&mut`) and is only read afterwards, when it serves as one of the
//! `PackageResolver`s of the resolver chain.

use std::collections::BTreeMap;

use tracing::debug;

use super::resolver::PackageResolver;
use crate::error::ImportError;

/// Type name -> provider location, filled before any artifact is compiled.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `type_name` as provided by `provider`.
    ///
    /// Returns `Ok(true)` for a new entry and `Ok(false)` when the exact same
    /// pair is already registered. A name may never move to another provider.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Result<bool, ImportError> {
        let type_name = type_name.into();
        let provider = provider.into();

        match self.providers.get(&type_name) {
            Some(existing) if *existing == provider => Ok(false),
            Some(existing) => Err(ImportError::ConflictingProvider {
                type_name,
                existing: existing.clone(),
                requested: provider,
            }),
            None => {
                debug!(type_name = %type_name, provider = %provider, "Registered type provider.");
                self.providers.insert(type_name, provider);
                Ok(true)
            }
        }
    }

    pub fn provider_of(&self, type_name: &str) -> Option<&str> {
        self.providers.get(type_name).map(String::as_str)
    }

    /// All names registered under `provider`, in sorted order.
    ///
    /// Used to detect two names competing for the same generated file.
    pub fn types_provided_by<'a>(&'a self, provider: &'a str) -> impl Iterator<Item = &'a str> {
        self.providers
            .iter()
            .filter(move |(_, p)| p.as_str() == provider)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl PackageResolver for ProviderRegistry {
    fn resolve(&self, type_name: &str) -> Result<String, ImportError> {
        self.provider_of(type_name)
            .map(str::to_string)
            .ok_or_else(|| ImportError::UnresolvedType {
                type_name: type_name.to_string(),
            })
    }
}
