//! Angular/TypeScript generator.
//!
//! Records become `export interface`s, contracts become interfaces prefixed
//! with `I`, and implementation units become classes that receive their
//! `HttpClient` through constructor injection:
//!
//! ```text
//! export class Pets implements IPets {
//!   constructor(private readonly http: HttpClient) {}
//!
//!   getPet(input: GetPetInput): Observable<Pet> {
//!     return this.http.get<Pet>(`https://api.example.com/pets/${input.id}`);
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use super::{Generator, StaticResolver};
use crate::error::{RenderError, TypeError};
use crate::imports::{GenericImport, PackageResolver};
use crate::ir::api::{
    HttpCallDescriptor, MethodImplementation, MethodSignature, Record, ServiceContract,
    ServiceImplementationUnit, VariableDecl,
};
use crate::ir::compile::CompilerOptions;
use crate::ir::types::{DynamicType, TypeKind};
use crate::ir::utils::{escape_ts_string, quote_if_needed, to_screaming_snake_case};
use crate::spec::HttpMethod;
use crate::uri::expand_template;

const INDENT: &str = "  ";

/// Types shipped with Angular and RxJS.
const WELL_KNOWN_TYPES: StaticResolver = StaticResolver::new(&[
    ("Observable", "rxjs"),
    ("HttpClient", "@angular/common/http"),
]);

/// Renders IR as TypeScript for Angular projects. Request URLs are prefixed
/// with `base_url`.
#[derive(Debug, Clone)]
pub struct AngularGenerator {
    base_url: String,
    options: CompilerOptions,
    well_known: StaticResolver,
}

impl AngularGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            options: CompilerOptions::default(),
            well_known: WELL_KNOWN_TYPES,
        }
    }

    /// TypeScript spelling of a type.
    pub fn type_name(&self, ty: &DynamicType) -> Result<String, TypeError> {
        match ty.kind {
            TypeKind::Void => Ok("void".to_string()),
            TypeKind::String => Ok("string".to_string()),
            TypeKind::Integer | TypeKind::Float => Ok("number".to_string()),
            TypeKind::Boolean => Ok("boolean".to_string()),
            TypeKind::Timestamp => Ok("Date".to_string()),
            TypeKind::Any => Ok("any".to_string()),
            TypeKind::User => {
                if ty.reference.is_empty() {
                    return Err(TypeError::UserWithoutReference);
                }
                Ok(ty.reference.clone())
            }
            TypeKind::Array => Ok(format!("{}[]", self.type_name(ty.array_element()?)?)),
            TypeKind::Generic => {
                let name = ty.generic_name()?;
                if ty.inner.is_empty() {
                    return Ok(name.to_string());
                }
                let args = ty
                    .inner
                    .iter()
                    .map(|arg| self.type_name(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{name}<{}>", args.join(", ")))
            }
        }
    }

    /// TypeScript literal for a JSON value.
    pub fn value_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!("'{}'", escape_ts_string(s)),
            Value::Array(items) => {
                let items: Vec<_> = items.iter().map(|item| self.value_literal(item)).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Object(fields) => {
                if fields.is_empty() {
                    return "{}".to_string();
                }
                let fields: Vec<_> = fields
                    .iter()
                    .map(|(key, value)| {
                        format!("{}: {}", quote_if_needed(key), self.value_literal(value))
                    })
                    .collect();
                format!("{{ {} }}", fields.join(", "))
            }
        }
    }

    fn type_in(
        &self,
        ty: &DynamicType,
        context: impl FnOnce() -> String,
    ) -> Result<String, RenderError> {
        self.type_name(ty).map_err(|source| RenderError::Type {
            context: context(),
            source,
        })
    }

    fn parameter(&self, parameter: &VariableDecl, method: &str) -> Result<String, RenderError> {
        let optional = if parameter.required() { "" } else { "?" };
        let ty = self.type_in(parameter.ty(), || {
            format!("parameter '{}' of method '{method}'", parameter.name)
        })?;
        Ok(format!("{}{optional}: {ty}", parameter.name))
    }

    /// `name(params): ReturnType`
    fn signature(&self, signature: &MethodSignature) -> Result<String, RenderError> {
        let parameters = signature
            .parameters
            .iter()
            .map(|parameter| self.parameter(parameter, &signature.name))
            .collect::<Result<Vec<_>, _>>()?;
        let return_type = self.type_in(&signature.return_type, || {
            format!("return type of method '{}'", signature.name)
        })?;
        Ok(format!(
            "{}({}): {return_type}",
            signature.name,
            parameters.join(", ")
        ))
    }

    /// Request URL as a template literal body.
    fn request_url(&self, call: &HttpCallDescriptor) -> Result<String, RenderError> {
        expand_template(
            &call.url_template,
            |name: &str| match &call.input_var_name {
                Some(input) => Ok(format!("${{{input}.{name}}}")),
                None => Err(format!(
                    "placeholder '{name}' needs an input, but the method takes none"
                )),
            },
            &self.base_url,
        )
        .map_err(|reason| RenderError::Template {
            template: call.url_template.clone(),
            reason,
        })
    }

    /// Expression performing the HTTP call.
    fn call_expression(&self, call: &HttpCallDescriptor) -> Result<String, RenderError> {
        let response = self.type_in(&call.response_body_type, || {
            format!("response of {} {}", call.method, call.url_template)
        })?;
        let url = self.request_url(call)?;

        let body = match &call.input_var_name {
            Some(input) if !call.request_body_type.is_void() => {
                Some(format!("{input}.{}", self.options.body_field))
            }
            _ => None,
        };
        let body_argument = match (call.method, body) {
            (HttpMethod::Get, _) | (HttpMethod::Delete, None) => String::new(),
            (HttpMethod::Delete, Some(body)) => format!(", {{ body: {body} }}"),
            (_, Some(body)) => format!(", {body}"),
            (_, None) => ", null".to_string(),
        };

        Ok(format!(
            "this.{}.{}<{response}>(`{url}`{body_argument})",
            call.client_var_name,
            call.method.as_lower()
        ))
    }

    fn method(&self, method: &MethodImplementation) -> Result<String, RenderError> {
        let signature = self.signature(&method.signature)?;
        let call = self.call_expression(&method.call)?;
        let statement = if method.signature.return_type.is_void() {
            format!("{call}.subscribe();")
        } else {
            format!("return {call};")
        };
        Ok(format!(
            "{INDENT}{signature} {{\n{INDENT}{INDENT}{statement}\n{INDENT}}}"
        ))
    }
}

impl Generator for AngularGenerator {
    fn options(&self) -> CompilerOptions {
        self.options.clone()
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn well_known_types(&self) -> &dyn PackageResolver {
        &self.well_known
    }

    fn generate_import(&self, import: &GenericImport) -> String {
        let names: Vec<&str> = import
            .provided_entities
            .iter()
            .map(String::as_str)
            .collect();
        format!(
            "import {{ {} }} from '{}';",
            names.join(", "),
            escape_ts_string(&import.provider)
        )
    }

    fn generate_record(&self, record: &Record) -> Result<String, RenderError> {
        if record.is_empty() {
            return Ok(format!("export interface {} {{}}", record.name));
        }

        let mut out = format!("export interface {} {{\n", record.name);
        for variable in record.variables.values() {
            let optional = if variable.required() { "" } else { "?" };
            let ty = self.type_in(variable.ty(), || {
                format!("variable '{}' of record '{}'", variable.name, record.name)
            })?;
            out.push_str(&format!(
                "{INDENT}{}{optional}: {ty};\n",
                quote_if_needed(&variable.name)
            ));
        }
        out.push('}');
        Ok(out)
    }

    fn generate_initializer(
        &self,
        record: &Record,
        values: &BTreeMap<String, Value>,
    ) -> Result<String, RenderError> {
        let context = || format!("initializer of '{}'", record.name);

        if let Some(unknown) = values.keys().find(|key| !record.variables.contains_key(*key)) {
            return Err(RenderError::Value {
                context: context(),
                reason: format!("'{unknown}' is not a variable of the record"),
            });
        }
        if let Some(missing) = record
            .variables
            .values()
            .find(|variable| variable.required() && !values.contains_key(&variable.name))
        {
            return Err(RenderError::Value {
                context: context(),
                reason: format!("required variable '{}' has no value", missing.name),
            });
        }

        let mut out = format!(
            "export const {}: {} = {{\n",
            to_screaming_snake_case(&record.name),
            record.name
        );
        for (name, value) in values {
            out.push_str(&format!(
                "{INDENT}{}: {},\n",
                quote_if_needed(name),
                self.value_literal(value)
            ));
        }
        out.push_str("};");
        Ok(out)
    }

    fn generate_contract(&self, contract: &ServiceContract) -> Result<String, RenderError> {
        if contract.methods.is_empty() {
            return Ok(format!("export interface {} {{}}", contract.name));
        }

        let mut out = format!("export interface {} {{\n", contract.name);
        for method in &contract.methods {
            out.push_str(&format!("{INDENT}{};\n", self.signature(method)?));
        }
        out.push('}');
        Ok(out)
    }

    fn generate_implementation_unit(
        &self,
        unit: &ServiceImplementationUnit,
    ) -> Result<String, RenderError> {
        let contracts = unit
            .implemented_contracts
            .iter()
            .map(|contract| {
                self.type_in(contract, || format!("contract implemented by '{}'", unit.name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let implements = if contracts.is_empty() {
            String::new()
        } else {
            format!(" implements {}", contracts.join(", "))
        };

        let mut members = Vec::new();

        if !unit.own_properties.is_empty() {
            let mut properties = String::new();
            for property in unit.own_properties.values() {
                let optional = if property.required() { "" } else { "?" };
                let ty = self.type_in(property.ty(), || {
                    format!("property '{}' of '{}'", property.name, unit.name)
                })?;
                properties.push_str(&format!(
                    "{INDENT}private {}{optional}: {ty};\n",
                    property.name
                ));
            }
            members.push(properties.trim_end().to_string());
        }

        let injected = unit
            .injected_properties
            .values()
            .map(|property| {
                self.type_in(property.ty(), || {
                    format!("injected property '{}' of '{}'", property.name, unit.name)
                })
                .map(|ty| format!("private readonly {}: {ty}", property.name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        members.push(format!("{INDENT}constructor({}) {{}}", injected.join(", ")));

        for method in &unit.methods {
            members.push(self.method(method)?);
        }

        Ok(format!(
            "export class {}{implements} {{\n{}\n}}",
            unit.name,
            members.join("\n\n")
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::imports::ImportSet;
    use crate::ir::api::{CompiledEntity, CompiledService};
    use serde_json::json;

    fn generator() -> AngularGenerator {
        AngularGenerator::new("https://api.example.com")
    }

    fn call(
        method: HttpMethod,
        url: &str,
        input: Option<&str>,
        request: DynamicType,
        response: DynamicType,
    ) -> HttpCallDescriptor {
        HttpCallDescriptor {
            method,
            url_template: url.to_string(),
            client_var_name: "http".to_string(),
            input_var_name: input.map(str::to_string),
            request_body_type: request,
            response_body_type: response,
        }
    }

    fn get_pet_service() -> CompiledService {
        let mut input = Record::new("GetPetInput");
        input.insert(VariableDecl::new(
            "id",
            DynamicType::primitive(TypeKind::Integer),
            true,
        ));

        let signature = MethodSignature {
            name: "getPet".into(),
            return_type: DynamicType::generic("Observable", vec![DynamicType::user("Pet")]),
            parameters: vec![VariableDecl::new(
                "input",
                DynamicType::user("GetPetInput"),
                true,
            )],
        };
        let implementation = ServiceImplementationUnit {
            name: "Pets".into(),
            implemented_contracts: vec![DynamicType::user("IPets")],
            own_properties: BTreeMap::new(),
            injected_properties: BTreeMap::from([(
                "http".to_string(),
                VariableDecl::new("http", DynamicType::user("HttpClient"), true),
            )]),
            methods: vec![MethodImplementation {
                signature: signature.clone(),
                call: call(
                    HttpMethod::Get,
                    "/pets/{{ id }}",
                    Some("input"),
                    DynamicType::void(),
                    DynamicType::user("Pet"),
                ),
            }],
        };

        let mut imports = ImportSet::new();
        imports.add("rxjs", "Observable");
        imports.add("@angular/common/http", "HttpClient");
        imports.add("./pet.model.gen", "Pet");

        CompiledService {
            input_records: vec![input],
            contract: ServiceContract {
                name: "IPets".into(),
                methods: vec![signature],
            },
            implementation,
            imports,
        }
    }

    #[test]
    fn test_type_names() {
        let g = generator();
        let cases = [
            (DynamicType::void(), "void"),
            (DynamicType::primitive(TypeKind::String), "string"),
            (DynamicType::primitive(TypeKind::Integer), "number"),
            (DynamicType::primitive(TypeKind::Float), "number"),
            (DynamicType::primitive(TypeKind::Boolean), "boolean"),
            (DynamicType::primitive(TypeKind::Timestamp), "Date"),
            (DynamicType::primitive(TypeKind::Any), "any"),
            (DynamicType::user("Pet"), "Pet"),
            (
                DynamicType::array(DynamicType::array(DynamicType::primitive(TypeKind::String))),
                "string[][]",
            ),
            (
                DynamicType::generic(
                    "Map",
                    vec![
                        DynamicType::primitive(TypeKind::String),
                        DynamicType::array(DynamicType::user("Pet")),
                    ],
                ),
                "Map<string, Pet[]>",
            ),
            (DynamicType::generic("Marker", vec![]), "Marker"),
        ];

        for (ty, expected) in cases {
            assert_eq!(g.type_name(&ty).unwrap(), expected);
        }
    }

    #[test]
    fn test_malformed_types_fail() {
        let g = generator();
        assert_eq!(
            g.type_name(&DynamicType::primitive(TypeKind::Array)),
            Err(TypeError::ArrayWithoutElement)
        );
        assert_eq!(
            g.type_name(&DynamicType::user("")),
            Err(TypeError::UserWithoutReference)
        );
        assert_eq!(
            g.type_name(&DynamicType::generic("", vec![])),
            Err(TypeError::GenericWithoutName)
        );
    }

    #[test]
    fn test_value_literals() {
        let g = generator();
        assert_eq!(g.value_literal(&json!("it's")), "'it\\'s'");
        assert_eq!(g.value_literal(&json!(42)), "42");
        assert_eq!(g.value_literal(&json!(1.5)), "1.5");
        assert_eq!(g.value_literal(&json!(true)), "true");
        assert_eq!(g.value_literal(&json!(null)), "null");
        assert_eq!(g.value_literal(&json!(["a", 1])), "['a', 1]");
        assert_eq!(g.value_literal(&json!({})), "{}");
        assert_eq!(
            g.value_literal(&json!({ "retries": 3, "content-type": "json" })),
            "{ 'content-type': 'json', retries: 3 }"
        );
    }

    #[test]
    fn test_generate_import() {
        let import = GenericImport::new("./pet.model.gen", ["Tag", "Pet"]);
        assert_eq!(
            generator().generate_import(&import),
            "import { Pet, Tag } from './pet.model.gen';"
        );
    }

    #[test]
    fn test_generate_record() {
        let mut record = Record::new("Pet");
        record.insert(VariableDecl::new(
            "name",
            DynamicType::primitive(TypeKind::String),
            true,
        ));
        record.insert(VariableDecl::new(
            "tags",
            DynamicType::array(DynamicType::primitive(TypeKind::String)),
            false,
        ));

        assert_eq!(
            generator().generate_record(&record).unwrap(),
            "export interface Pet {\n  name: string;\n  tags?: string[];\n}"
        );
    }

    #[test]
    fn test_generate_empty_record() {
        assert_eq!(
            generator().generate_record(&Record::new("Empty")).unwrap(),
            "export interface Empty {}"
        );
    }

    #[test]
    fn test_record_type_error_names_variable() {
        let mut record = Record::new("Broken");
        record.insert(VariableDecl::new(
            "items",
            DynamicType::primitive(TypeKind::Array),
            true,
        ));
        let err = generator().generate_record(&record).unwrap_err();
        assert!(err.to_string().contains("variable 'items' of record 'Broken'"));
    }

    #[test]
    fn test_generate_service() {
        let rendered = generator().generate_service(&get_pet_service()).unwrap();
        let expected = "\
import { Pet } from './pet.model.gen';
import { HttpClient } from '@angular/common/http';
import { Observable } from 'rxjs';

export interface GetPetInput {
  id: number;
}

export interface IPets {
  getPet(input: GetPetInput): Observable<Pet>;
}

export class Pets implements IPets {
  constructor(private readonly http: HttpClient) {}

  getPet(input: GetPetInput): Observable<Pet> {
    return this.http.get<Pet>(`https://api.example.com/pets/${input.id}`);
  }
}
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_call_with_body() {
        let g = generator();
        let post = call(
            HttpMethod::Post,
            "/pets",
            Some("input"),
            DynamicType::user("Pet"),
            DynamicType::user("Pet"),
        );
        assert_eq!(
            g.call_expression(&post).unwrap(),
            "this.http.post<Pet>(`https://api.example.com/pets`, input.body)"
        );

        let delete = call(
            HttpMethod::Delete,
            "/pets",
            Some("input"),
            DynamicType::user("Filter"),
            DynamicType::void(),
        );
        assert_eq!(
            g.call_expression(&delete).unwrap(),
            "this.http.delete<void>(`https://api.example.com/pets`, { body: input.body })"
        );
    }

    #[test]
    fn test_call_without_body() {
        let g = AngularGenerator::new("");
        let put = call(
            HttpMethod::Put,
            "/ping",
            None,
            DynamicType::void(),
            DynamicType::void(),
        );
        assert_eq!(
            g.call_expression(&put).unwrap(),
            "this.http.put<void>(`/ping`, null)"
        );
    }

    #[test]
    fn test_void_method_subscribes() {
        let method = MethodImplementation {
            signature: MethodSignature {
                name: "ping".into(),
                return_type: DynamicType::void(),
                parameters: vec![],
            },
            call: call(
                HttpMethod::Get,
                "/ping",
                None,
                DynamicType::void(),
                DynamicType::void(),
            ),
        };
        assert_eq!(
            generator().method(&method).unwrap(),
            "  ping(): void {\n    this.http.get<void>(`https://api.example.com/ping`).subscribe();\n  }"
        );
    }

    #[test]
    fn test_placeholder_without_input_fails() {
        let bad = call(
            HttpMethod::Get,
            "/pets/{{ id }}",
            None,
            DynamicType::void(),
            DynamicType::user("Pet"),
        );
        let err = generator().call_expression(&bad).unwrap_err();
        match err {
            RenderError::Template { template, reason } => {
                assert_eq!(template, "/pets/{{ id }}");
                assert!(reason.contains("'id'"));
            }
            other => unreachable!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_generate_config_entity() {
        let config = crate::spec::ApiConfig {
            base_url: "https://api.example.com".into(),
        };
        let entity_spec = config.as_entity();
        let mut record = Record::new(entity_spec.name.as_str());
        for (name, property) in &entity_spec.properties {
            record.insert(VariableDecl::new(
                name.as_str(),
                property.ty.clone(),
                property.required,
            ));
        }
        let entity = CompiledEntity {
            record,
            initializer: config.initializer(),
            imports: ImportSet::new(),
        };

        let rendered = generator().generate_entity(&entity).unwrap();
        assert_eq!(
            rendered,
            "export interface ApiConfig {\n  baseUrl: string;\n}\n\n\
             export const API_CONFIG: ApiConfig = {\n  baseUrl: 'https://api.example.com',\n};\n"
        );
    }

    #[test]
    fn test_initializer_rejects_unknown_and_missing_values() {
        let mut record = Record::new("ApiConfig");
        record.insert(VariableDecl::new(
            "baseUrl",
            DynamicType::primitive(TypeKind::String),
            true,
        ));
        let g = generator();

        let unknown = BTreeMap::from([
            ("baseUrl".to_string(), json!("x")),
            ("timeout".to_string(), json!(3)),
        ]);
        let err = g.generate_initializer(&record, &unknown).unwrap_err();
        assert!(err.to_string().contains("'timeout'"));

        let err = g.generate_initializer(&record, &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("'baseUrl'"));
    }

    #[test]
    fn test_implementation_with_own_properties() {
        let unit = ServiceImplementationUnit {
            name: "Cache".into(),
            implemented_contracts: vec![],
            own_properties: BTreeMap::from([(
                "hits".to_string(),
                VariableDecl::new("hits", DynamicType::primitive(TypeKind::Integer), false),
            )]),
            injected_properties: BTreeMap::new(),
            methods: vec![],
        };
        assert_eq!(
            generator().generate_implementation_unit(&unit).unwrap(),
            "export class Cache {\n  private hits?: number;\n\n  constructor() {}\n}"
        );
    }

    #[test]
    fn test_well_known_types() {
        let g = generator();
        let resolver = g.well_known_types();
        assert_eq!(resolver.resolve("Observable").unwrap(), "rxjs");
        assert_eq!(
            resolver.resolve("HttpClient").unwrap(),
            "@angular/common/http"
        );
        assert!(resolver.resolve("Pet").is_err());
    }
}
