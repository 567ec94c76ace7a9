//! API definition -> IR compilation.
//!
//! Compilation runs in two phases. The registration phase records, for every
//! entity and for the configuration, the location that will provide it. Only
//! then are the artifacts compiled, so that references between entities and
//! from services to entities resolve regardless of declaration order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use super::api::{
    CompiledApi, CompiledEntity, CompiledService, HttpCallDescriptor, MethodImplementation,
    MethodSignature, Record, ServiceContract, ServiceImplementationUnit, VariableDecl,
};
use super::types::DynamicType;
use super::utils::{to_kebab_case, to_pascal_case};
use crate::error::CompileError;
use crate::imports::{
    PackageResolver, ProviderRegistry, combine_imports, compose_package_resolvers,
    resolve_imports, union_imports,
};
use crate::spec::{
    API_CONFIG_ENTITY, ApiConfig, ApiDefinition, ApiEndpoint, EntitySpec, ServiceDefinition,
};

/// Target-specific names the compiler bakes into the IR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Generic wrapper of asynchronous results, e.g. `Observable`
    pub async_wrapper: String,
    /// Type of the injected HTTP transport, e.g. `HttpClient`
    pub transport_type: String,
    /// Property name of the injected transport
    pub transport_var: String,
    /// Parameter name of the endpoint input record
    pub input_var: String,
    /// Field of the input record holding the request body
    pub body_field: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            async_wrapper: "Observable".to_string(),
            transport_type: "HttpClient".to_string(),
            transport_var: "http".to_string(),
            input_var: "input".to_string(),
            body_field: "body".to_string(),
        }
    }
}

/// What a generated file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Service,
    Config,
}

impl ArtifactKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Service => "service",
            ArtifactKind::Config => "config",
        }
    }
}

/// Relative import path of the file that will hold `name`.
///
/// `provider_location("PetStore", ArtifactKind::Model)` is `./pet-store.model.gen`.
pub fn provider_location(name: &str, kind: ArtifactKind) -> String {
    format!("./{}.{}.gen", to_kebab_case(name), kind.tag())
}

/// Register the future location of every entity.
///
/// Returns the number of new registrations. Two entities whose names map to
/// the same file are rejected.
pub fn register_entity_locations(
    registry: &mut ProviderRegistry,
    entities: &[EntitySpec],
) -> Result<usize, CompileError> {
    let mut registered = 0;
    for entity in entities {
        let location = provider_location(&entity.name, ArtifactKind::Model);
        let occupant = registry
            .types_provided_by(&location)
            .find(|name| *name != entity.name)
            .map(str::to_string);
        if let Some(existing) = occupant {
            return Err(CompileError::LocationTaken {
                name: entity.name.clone(),
                location,
                existing,
            });
        }

        if registry
            .register(entity.name.as_str(), location)
            .map_err(|source| CompileError::Registration { source })?
        {
            registered += 1;
        }
    }
    Ok(registered)
}

/// Register the future location of the configuration record.
pub fn register_config_location(registry: &mut ProviderRegistry) -> Result<bool, CompileError> {
    registry
        .register(
            API_CONFIG_ENTITY,
            provider_location(API_CONFIG_ENTITY, ArtifactKind::Config),
        )
        .map_err(|source| CompileError::Registration { source })
}

fn validate_type(ty: &DynamicType, context: impl FnOnce() -> String) -> Result<(), CompileError> {
    ty.validate().map_err(|source| CompileError::MalformedType {
        context: context(),
        source,
    })
}

/// Compile an entity into a record and resolve the record's imports.
pub fn compile_entity<R>(entity: &EntitySpec, resolver: &R) -> Result<CompiledEntity, CompileError>
where
    R: PackageResolver + ?Sized,
{
    if !entity.is_valid() {
        warn!(entity = %entity.name, "Entity declares no properties, generating an empty record.");
    }

    let mut record = Record::new(entity.name.as_str());
    for (name, property) in &entity.properties {
        validate_type(&property.ty, || {
            format!("property '{name}' of entity '{}'", entity.name)
        })?;
        record.insert(VariableDecl::new(
            name.as_str(),
            property.ty.clone(),
            property.required,
        ));
    }

    let imports = resolve_imports(&record, resolver, |name: &str| {
        !name.is_empty() && name != entity.name
    })
    .map_err(|source| CompileError::Imports {
        artifact: format!("entity '{}'", entity.name),
        source,
    })?;

    debug!(
        entity = %entity.name,
        variables = record.variables.len(),
        imports = imports.len(),
        "Compiled entity."
    );

    Ok(CompiledEntity {
        record,
        initializer: BTreeMap::new(),
        imports,
    })
}

/// Compile the configuration record together with its default values.
pub fn compile_config<R>(config: &ApiConfig, resolver: &R) -> Result<CompiledEntity, CompileError>
where
    R: PackageResolver + ?Sized,
{
    let mut compiled = compile_entity(&config.as_entity(), resolver)?;
    compiled.initializer = config.initializer();
    Ok(compiled)
}

fn validate_endpoint(service: &str, endpoint: &ApiEndpoint) -> Result<(), CompileError> {
    let context = |location: String| {
        format!(
            "endpoint '{}' of service '{service}' ({location})",
            endpoint.name
        )
    };

    for (name, value) in &endpoint.path_variables {
        validate_type(&value.ty, || context(format!("path variable '{name}'")))?;
    }
    for (name, value) in &endpoint.query_variables {
        validate_type(&value.ty, || context(format!("query variable '{name}'")))?;
    }
    validate_type(&endpoint.request_body.ty, || context("request body".to_string()))?;
    validate_type(&endpoint.response_body.ty, || context("response body".to_string()))?;
    Ok(())
}

/// Input record of an endpoint, or `None` when the endpoint takes no input.
fn input_record(endpoint: &ApiEndpoint, options: &CompilerOptions) -> Option<Record> {
    let mut record = Record::new(format!("{}Input", to_pascal_case(&endpoint.name)));
    for (name, value) in &endpoint.path_variables {
        record.insert(VariableDecl::new(
            name.as_str(),
            value.ty.clone(),
            value.required,
        ));
    }
    if !endpoint.request_body.is_void() {
        record.insert(VariableDecl::new(
            options.body_field.as_str(),
            endpoint.request_body.ty.clone(),
            endpoint.request_body.required,
        ));
    }

    (!record.is_empty()).then_some(record)
}

/// Compile a service into its input records, contract and implementation unit.
pub fn compile_service<R>(
    service: &ServiceDefinition,
    resolver: &R,
    options: &CompilerOptions,
) -> Result<CompiledService, CompileError>
where
    R: PackageResolver + ?Sized,
{
    let implementation_name = to_pascal_case(&service.name);
    let contract_name = format!("I{implementation_name}");

    let mut contract = ServiceContract {
        name: contract_name.clone(),
        methods: Vec::with_capacity(service.endpoints.len()),
    };
    let mut implementation = ServiceImplementationUnit {
        name: implementation_name.clone(),
        implemented_contracts: vec![DynamicType::user(contract_name.as_str())],
        own_properties: BTreeMap::new(),
        injected_properties: BTreeMap::from([(
            options.transport_var.clone(),
            VariableDecl::new(
                options.transport_var.as_str(),
                DynamicType::user(options.transport_type.as_str()),
                true,
            ),
        )]),
        methods: Vec::with_capacity(service.endpoints.len()),
    };
    let mut input_records = Vec::new();

    for endpoint in &service.endpoints {
        validate_endpoint(&service.name, endpoint)?;

        let record = input_record(endpoint, options);
        let parameters = record
            .as_ref()
            .map(|record| {
                vec![VariableDecl::new(
                    options.input_var.as_str(),
                    DynamicType::user(record.name.as_str()),
                    true,
                )]
            })
            .unwrap_or_default();

        let return_type = if endpoint.response_body.is_void() {
            DynamicType::void()
        } else {
            DynamicType::generic(
                options.async_wrapper.as_str(),
                vec![endpoint.response_body.ty.clone()],
            )
        };

        let signature = MethodSignature {
            name: endpoint.name.clone(),
            return_type,
            parameters,
        };
        let call = HttpCallDescriptor {
            method: endpoint.method,
            url_template: endpoint.uri_template.clone(),
            client_var_name: options.transport_var.clone(),
            input_var_name: record.as_ref().map(|_| options.input_var.clone()),
            request_body_type: endpoint.request_body.ty.clone(),
            response_body_type: endpoint.response_body.ty.clone(),
        };

        contract.methods.push(signature.clone());
        implementation
            .methods
            .push(MethodImplementation { signature, call });
        if let Some(record) = record {
            input_records.push(record);
        }
    }

    let mut local_names: BTreeSet<&str> = input_records
        .iter()
        .map(|record| record.name.as_str())
        .collect();
    local_names.insert(contract_name.as_str());
    local_names.insert(implementation_name.as_str());

    // Local declarations must not shadow an importable type.
    for &name in &local_names {
        if let Ok(provider) = resolver.resolve(name) {
            return Err(CompileError::NameCollision {
                artifact: format!("service '{}'", service.name),
                name: name.to_string(),
                provider,
            });
        }
    }

    let filter = |name: &str| !name.is_empty() && !local_names.contains(name);

    let imports = resolve_imports(&input_records, resolver, filter)
        .and_then(|record_imports| {
            let unit_imports = resolve_imports(&(&contract, &implementation), resolver, filter)?;
            Ok(union_imports(
                combine_imports,
                [&record_imports, &unit_imports],
            ))
        })
        .map_err(|source| CompileError::Imports {
            artifact: format!("service '{}'", service.name),
            source,
        })?;

    debug!(
        service = %service.name,
        methods = contract.methods.len(),
        input_records = input_records.len(),
        imports = imports.len(),
        "Compiled service."
    );

    Ok(CompiledService {
        input_records,
        contract,
        implementation,
        imports,
    })
}

/// Reject services whose names map to the same file.
fn check_service_locations(services: &[ServiceDefinition]) -> Result<(), CompileError> {
    let mut taken: BTreeMap<String, &str> = BTreeMap::new();
    for service in services {
        let location = provider_location(&to_pascal_case(&service.name), ArtifactKind::Service);
        if let Some(existing) = taken.insert(location.clone(), service.name.as_str()) {
            return Err(CompileError::LocationTaken {
                name: service.name.clone(),
                location,
                existing: existing.to_string(),
            });
        }
    }
    Ok(())
}

/// Compile a whole API definition.
///
/// Locations are registered in `registry` first. Afterwards names resolve
/// through `well_known` first and the registry second. The first error aborts
/// the run.
pub fn compile_api(
    api: &ApiDefinition,
    registry: &mut ProviderRegistry,
    well_known: &dyn PackageResolver,
    options: &CompilerOptions,
) -> Result<CompiledApi, CompileError> {
    register_config_location(registry)?;
    let registered = register_entity_locations(registry, &api.entities)?;
    debug!(
        api = %api.name,
        entities = registered,
        "Registered provider locations."
    );

    check_service_locations(&api.services)?;

    let registry: &ProviderRegistry = registry;
    let resolver = compose_package_resolvers([well_known, registry as &dyn PackageResolver]);

    let config = compile_config(&api.config, &resolver)?;
    let entities = api
        .entities
        .iter()
        .map(|entity| compile_entity(entity, &resolver))
        .collect::<Result<Vec<_>, _>>()?;
    let services = api
        .services
        .iter()
        .map(|service| compile_service(service, &resolver, options))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        api = %api.name,
        entities = entities.len(),
        services = services.len(),
        "Compiled API definition."
    );

    Ok(CompiledApi {
        name: api.name.clone(),
        config,
        entities,
        services,
    })
}
