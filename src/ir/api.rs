//! Target-independent IR of the generated source artifacts.
//!
//! This module defines what the compiler produces and the emitters consume:
//! - Record: a plain data record (entities, endpoint inputs, configuration)
//! - MethodSignature / MethodImplementation: service methods and their HTTP calls
//! - ServiceContract / ServiceImplementationUnit: the two halves of a service
//! - CompiledService / CompiledEntity / CompiledApi: artifacts plus resolved imports

use std::collections::BTreeMap;

use serde_json::Value;

use super::types::DynamicType;
use crate::imports::ImportSet;
use crate::spec::HttpMethod;

/// A type together with its optionality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub ty: DynamicType,
    pub required: bool,
}

/// A named, typed variable (record field, parameter or class property).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub name: String,
    pub type_decl: TypeDecl,
}

impl VariableDecl {
    pub fn new(name: impl Into<String>, ty: DynamicType, required: bool) -> Self {
        Self {
            name: name.into(),
            type_decl: TypeDecl { ty, required },
        }
    }

    pub fn ty(&self) -> &DynamicType {
        &self.type_decl.ty
    }

    pub fn required(&self) -> bool {
        self.type_decl.required
    }
}

/// A named data record. Variable names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub variables: BTreeMap<String, VariableDecl>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Add a variable, replacing any previous variable of the same name.
    pub fn insert(&mut self, variable: VariableDecl) {
        self.variables.insert(variable.name.clone(), variable);
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Name, parameters and return type of a service method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub return_type: DynamicType,
    pub parameters: Vec<VariableDecl>,
}

/// Everything an emitter needs to render one HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCallDescriptor {
    pub method: HttpMethod,
    /// Raw, unexpanded URI template
    pub url_template: String,
    /// Name of the injected transport variable
    pub client_var_name: String,
    /// Name of the method parameter holding the input record, if the method takes one
    pub input_var_name: Option<String>,
    pub request_body_type: DynamicType,
    pub response_body_type: DynamicType,
}

/// A method body: one HTTP call behind a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodImplementation {
    pub signature: MethodSignature,
    pub call: HttpCallDescriptor,
}

/// Abstract interface of a service: ordered method signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceContract {
    pub name: String,
    pub methods: Vec<MethodSignature>,
}

/// Concrete service unit implementing one or more contracts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceImplementationUnit {
    pub name: String,
    pub implemented_contracts: Vec<DynamicType>,
    pub own_properties: BTreeMap<String, VariableDecl>,
    /// Dependencies supplied from outside (constructor injection)
    pub injected_properties: BTreeMap<String, VariableDecl>,
    pub methods: Vec<MethodImplementation>,
}

/// Everything generated for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledService {
    /// Input records in endpoint declaration order
    pub input_records: Vec<Record>,
    pub contract: ServiceContract,
    pub implementation: ServiceImplementationUnit,
    pub imports: ImportSet,
}

/// A compiled entity: its record, default values and imports.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEntity {
    pub record: Record,
    /// Default values by variable name; empty for plain entities
    pub initializer: BTreeMap<String, Value>,
    pub imports: ImportSet,
}

/// Every artifact of an API definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledApi {
    pub name: String,
    pub config: CompiledEntity,
    pub entities: Vec<CompiledEntity>,
    pub services: Vec<CompiledService>,
}
