use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::emitter::{Generator, Target};
use crate::error::{GenerateError, RenderError};
use crate::imports::ProviderRegistry;
use crate::ir::api::CompiledApi;
use crate::ir::compile::{ArtifactKind, compile_api};
use crate::output::OutputDirectory;
use crate::spec::ApiDefinition;

/// One rendered file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub contents: String,
}

/// Result of a successful generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub api: String,
    /// Written files, configuration first, then entities, then services
    pub files: Vec<PathBuf>,
}

/// Result of a successful check: what would be generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub api: String,
    pub entities: usize,
    pub services: usize,
    pub file_names: Vec<String>,
}

pub fn load_definition(input: &Path) -> Result<ApiDefinition, GenerateError> {
    let contents = fs::read_to_string(input).map_err(|source| GenerateError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let api: ApiDefinition =
        serde_json::from_str(&contents).map_err(|source| GenerateError::Parse {
            path: input.to_path_buf(),
            source,
        })?;

    debug!(
        input = %input.display(),
        api = %api.name,
        entities = api.entities.len(),
        services = api.services.len(),
        "Loaded API definition."
    );
    Ok(api)
}

/// Compile a definition with the names and well-known types of `generator`.
pub fn compile_definition(
    api: &ApiDefinition,
    generator: &dyn Generator,
) -> Result<CompiledApi, GenerateError> {
    let mut registry = ProviderRegistry::new();
    let compiled = compile_api(
        api,
        &mut registry,
        generator.well_known_types(),
        &generator.options(),
    )?;
    Ok(compiled)
}

/// Render every artifact of a compiled API.
pub fn render_api(
    api: &CompiledApi,
    generator: &dyn Generator,
) -> Result<Vec<RenderedArtifact>, GenerateError> {
    let mut artifacts = Vec::with_capacity(1 + api.entities.len() + api.services.len());

    artifacts.push(RenderedArtifact {
        name: api.config.record.name.clone(),
        kind: ArtifactKind::Config,
        contents: generator
            .generate_entity(&api.config)
            .map_err(render_error(&api.config.record.name))?,
    });

    for entity in &api.entities {
        artifacts.push(RenderedArtifact {
            name: entity.record.name.clone(),
            kind: ArtifactKind::Model,
            contents: generator
                .generate_entity(entity)
                .map_err(render_error(&entity.record.name))?,
        });
    }

    for service in &api.services {
        let name = &service.implementation.name;
        artifacts.push(RenderedArtifact {
            name: name.clone(),
            kind: ArtifactKind::Service,
            contents: generator
                .generate_service(service)
                .map_err(render_error(name))?,
        });
    }

    Ok(artifacts)
}

fn render_error(artifact: &str) -> impl FnOnce(RenderError) -> GenerateError {
    let artifact = artifact.to_string();
    move |source| GenerateError::Render { artifact, source }
}

/// Read `input`, compile it for `target` and write the client into `output_dir`.
pub fn generate_client(
    input: &Path,
    output_dir: &Path,
    target: Target,
) -> Result<GenerateSummary, GenerateError> {
    let api = load_definition(input)?;
    let generator = target.generator(&api.config.base_url);

    let compiled = compile_definition(&api, generator.as_ref())?;
    let artifacts = render_api(&compiled, generator.as_ref())?;

    let output = OutputDirectory::new(output_dir);
    output.prepare()?;

    let extension = generator.file_extension();
    let files = artifacts
        .iter()
        .map(|artifact| output.write(&artifact.name, artifact.kind, extension, &artifact.contents))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        api = %compiled.name,
        target = %target,
        output_dir = %output_dir.display(),
        files = files.len(),
        "Generated API client."
    );

    Ok(GenerateSummary {
        api: compiled.name,
        files,
    })
}

/// Compile and render `input` for `target` without writing anything.
pub fn check_definition(input: &Path, target: Target) -> Result<CheckSummary, GenerateError> {
    let api = load_definition(input)?;
    let generator = target.generator(&api.config.base_url);

    let compiled = compile_definition(&api, generator.as_ref())?;
    let artifacts = render_api(&compiled, generator.as_ref())?;

    let extension = generator.file_extension();
    Ok(CheckSummary {
        api: compiled.name,
        entities: compiled.entities.len(),
        services: compiled.services.len(),
        file_names: artifacts
            .iter()
            .map(|artifact| OutputDirectory::file_name(&artifact.name, artifact.kind, extension))
            .collect(),
    })
}
