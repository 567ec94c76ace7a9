//! Output directory management: naming and writing generated files.
//!
//! Every artifact lands in a single flat directory as
//! `<kebab-case name>.<model|service|config>.gen.<ext>`, which is exactly the
//! file that `provider_location` points imports at.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::GenerateError;
use crate::ir::compile::ArtifactKind;
use crate::ir::utils::to_kebab_case;

/// The flat directory receiving every generated file of a run.
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    base: PathBuf,
}

impl OutputDirectory {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Create the directory if needed.
    ///
    /// Fails if the path exists but is not a directory.
    pub fn prepare(&self) -> Result<(), GenerateError> {
        if self.base.exists() && !self.base.is_dir() {
            return Err(GenerateError::Output {
                path: self.base.clone(),
                reason: "path exists but is not a directory".to_string(),
            });
        }

        fs::create_dir_all(&self.base).map_err(|err| GenerateError::Output {
            path: self.base.clone(),
            reason: format!("failed to create directory: {err}"),
        })?;
        debug!(output_dir = %self.base.display(), "Prepared output directory.");
        Ok(())
    }

    /// `pet-store.model.gen.ts` for (`PetStore`, `Model`, `ts`).
    pub fn file_name(name: &str, kind: ArtifactKind, extension: &str) -> String {
        format!("{}.{}.gen.{extension}", to_kebab_case(name), kind.tag())
    }

    pub fn location(&self, name: &str, kind: ArtifactKind, extension: &str) -> PathBuf {
        self.base.join(Self::file_name(name, kind, extension))
    }

    /// Write one artifact, replacing any previous version. Returns the written path.
    pub fn write(
        &self,
        name: &str,
        kind: ArtifactKind,
        extension: &str,
        contents: &str,
    ) -> Result<PathBuf, GenerateError> {
        let path = self.location(name, kind, extension);
        fs::write(&path, contents).map_err(|err| GenerateError::Output {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        debug!(
            path = %path.display(),
            bytes = contents.len(),
            "Wrote generated file."
        );
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::compile::provider_location;

    #[test]
    fn test_file_name() {
        assert_eq!(
            OutputDirectory::file_name("PetStore", ArtifactKind::Model, "ts"),
            "pet-store.model.gen.ts"
        );
        assert_eq!(
            OutputDirectory::file_name("pets", ArtifactKind::Service, "ts"),
            "pets.service.gen.ts"
        );
    }

    #[test]
    fn test_file_name_matches_provider_location() {
        let provider = provider_location("ApiConfig", ArtifactKind::Config);
        let file = OutputDirectory::file_name("ApiConfig", ArtifactKind::Config, "ts");
        assert_eq!(format!("./{file}"), format!("{provider}.ts"));
    }

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path().join("a").join("b");
        let output = OutputDirectory::new(&base);
        output.prepare().unwrap();
        assert!(base.is_dir());
        // idempotent
        output.prepare().unwrap();
    }

    #[test]
    fn test_prepare_rejects_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("occupied");
        fs::write(&file, "x").unwrap();

        let err = OutputDirectory::new(&file).prepare().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_write_replaces_contents() {
        let temp = tempfile::tempdir().unwrap();
        let output = OutputDirectory::new(temp.path());

        output
            .write("Pet", ArtifactKind::Model, "ts", "old")
            .unwrap();
        let path = output
            .write("Pet", ArtifactKind::Model, "ts", "new")
            .unwrap();

        assert_eq!(path, temp.path().join("pet.model.gen.ts"));
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }
}
