//! Declarative API description, deserialized from the JSON input file.
//!
//! The definition is immutable once parsed; the compiler only borrows it.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::ir::types::{DynamicType, TypeKind};

/// Name of the configuration record in generated code.
pub const API_CONFIG_ENTITY: &str = "ApiConfig";

/// Property of the configuration record holding the base URL.
pub const BASE_URL_PROPERTY: &str = "baseUrl";

/// Root of an API description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiDefinition {
    pub name: String,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
    #[serde(default)]
    pub config: ApiConfig,
}

/// API-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    #[serde(rename = "baseURL", alias = "baseUrl", default)]
    pub base_url: String,
}

impl ApiConfig {
    /// The configuration described as an entity so it compiles like any other record.
    pub fn as_entity(&self) -> EntitySpec {
        EntitySpec {
            name: API_CONFIG_ENTITY.to_string(),
            properties: BTreeMap::from([(
                BASE_URL_PROPERTY.to_string(),
                PropertySpec {
                    ty: DynamicType::primitive(TypeKind::String),
                    required: true,
                },
            )]),
        }
    }

    /// Default values of the configuration record.
    pub fn initializer(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([(
            BASE_URL_PROPERTY.to_string(),
            Value::String(self.base_url.clone()),
        )])
    }
}

/// A user-defined data entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,
}

impl EntitySpec {
    /// An entity is only meaningful with at least one property.
    pub fn is_valid(&self) -> bool {
        !self.properties.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub ty: DynamicType,
    #[serde(default)]
    pub required: bool,
}

/// A typed value flowing into or out of an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RequestValue {
    #[serde(rename = "type", default)]
    pub ty: DynamicType,
    #[serde(default)]
    pub required: bool,
}

impl RequestValue {
    pub fn new(ty: DynamicType, required: bool) -> Self {
        Self { ty, required }
    }

    pub fn is_void(&self) -> bool {
        self.ty.is_void()
    }
}

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lowercase name, as used by most HTTP client APIs.
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single callable operation of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    pub name: String,
    /// Path containing `{{ name }}` placeholders
    #[serde(rename = "endpoint", alias = "uriTemplate")]
    pub uri_template: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub path_variables: BTreeMap<String, RequestValue>,
    #[serde(default)]
    pub request_body: RequestValue,
    #[serde(default)]
    pub response_body: RequestValue,
    #[serde(default)]
    pub query_variables: BTreeMap<String, RequestValue>,
}

/// A named group of endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<ApiEndpoint>,
}
