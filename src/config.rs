//! Configuration Module for the Entry Point Generator
//!
//! Reads `entry_points.json`, resolves every input path relative to the
//! configuration file and loads the registry models and lookup tables a run
//! needs. Registries can be named one by one or discovered under a
//! `registryDir`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{GeneratorError, Result};
use crate::model::CommandModel;
use crate::registry::{Api, LabeledObjectTable, PackedEnumTable, RegistryModel, Tables};

pub const DEFAULT_CONFIG_FILE: &str = "entry_points.json";

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION FILE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryPaths {
    pub gles: Option<PathBuf>,
    pub egl: Option<PathBuf>,
    pub cl: Option<PathBuf>,
}

impl RegistryPaths {
    fn get(&self, api: Api) -> Option<&PathBuf> {
        match api {
            Api::Gles => self.gles.as_ref(),
            Api::Egl => self.egl.as_ref(),
            Api::Cl => self.cl.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackedEnumPaths {
    pub gles: Option<PathBuf>,
    pub egl: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Name cited in every "Generated by" line.
    pub script_name: String,
    pub output_root: PathBuf,
    pub registries: RegistryPaths,
    /// Searched for `gl.json`, `egl.json` and `cl.json` when a registry is
    /// not named in `registries`.
    pub registry_dir: Option<PathBuf>,
    pub packed_enums: PackedEnumPaths,
    pub egl_labeled_objects: Option<PathBuf>,
    pub hash_manifest: Option<PathBuf>,
    #[serde(skip)]
    base_dir: PathBuf,
    #[serde(skip)]
    source: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            script_name: "generate_entry_points.py".to_string(),
            output_root: PathBuf::from(".."),
            registries: RegistryPaths::default(),
            registry_dir: None,
            packed_enums: PackedEnumPaths::default(),
            egl_labeled_objects: None,
            hash_manifest: Some(PathBuf::from("entry_points_hashes.json")),
            base_dir: PathBuf::from("."),
            source: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

fn registry_file_name(api: Api) -> &'static str {
    match api {
        Api::Gles => "gl.json",
        Api::Egl => "egl.json",
        Api::Cl => "cl.json",
    }
}

/// First file named `file_name` under `dir`, in file-name order.
fn discover(dir: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(|entry| entry.into_path())
}

impl GeneratorConfig {
    pub fn from_json(path: &Path, source: &str) -> Result<Self> {
        let mut config: GeneratorConfig =
            serde_json::from_str(source).map_err(|source| GeneratorError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        config.source = path.to_path_buf();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        Self::from_json(path, &source)
    }

    /// The configuration file itself.
    pub fn source(&self) -> &Path {
        &self.source
    }

    fn relative(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn output_root(&self) -> PathBuf {
        self.relative(&self.output_root)
    }

    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.hash_manifest.as_deref().map(|p| self.relative(p))
    }

    fn existing(&self, path: &Path, what: &str) -> Result<PathBuf> {
        let resolved = self.relative(path);
        if resolved.is_file() {
            Ok(resolved)
        } else {
            Err(GeneratorError::invalid(
                &self.source,
                format!("{} `{}` does not exist", what, resolved.display()),
            ))
        }
    }

    fn registry(&self, api: Api) -> Result<PathBuf> {
        if let Some(path) = self.registries.get(api) {
            return self.existing(path, &format!("{} registry", api));
        }
        let file_name = registry_file_name(api);
        let found = self
            .registry_dir
            .as_deref()
            .and_then(|dir| discover(&self.relative(dir), file_name));
        match found {
            Some(path) => {
                debug!(api = %api, path = %path.display(), "registry discovered");
                Ok(path)
            }
            None => Err(GeneratorError::invalid(
                &self.source,
                format!(
                    "no {} registry: set registries.{} or put {} under registryDir",
                    api,
                    api.key(),
                    file_name
                ),
            )),
        }
    }

    /// Resolves every input path, failing when a registry is missing.
    pub fn resolve(&self) -> Result<ResolvedInputs> {
        let optional = |path: &Option<PathBuf>, what: &str| -> Result<Option<PathBuf>> {
            path.as_deref().map(|p| self.existing(p, what)).transpose()
        };
        Ok(ResolvedInputs {
            gles: self.registry(Api::Gles)?,
            egl: self.registry(Api::Egl)?,
            cl: self.registry(Api::Cl)?,
            gles_packed: optional(&self.packed_enums.gles, "GLES packed enum table")?,
            egl_packed: optional(&self.packed_enums.egl, "EGL packed enum table")?,
            egl_objects: optional(&self.egl_labeled_objects, "EGL labeled object table")?,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVED INPUTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInputs {
    pub gles: PathBuf,
    pub egl: PathBuf,
    pub cl: PathBuf,
    pub gles_packed: Option<PathBuf>,
    pub egl_packed: Option<PathBuf>,
    pub egl_objects: Option<PathBuf>,
}

/// Command models and tables of one run.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub gles: CommandModel,
    pub egl: CommandModel,
    pub cl: CommandModel,
    pub tables: Tables,
}

impl ResolvedInputs {
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.gles.clone(), self.egl.clone(), self.cl.clone()];
        paths.extend(
            [&self.gles_packed, &self.egl_packed, &self.egl_objects]
                .into_iter()
                .flatten()
                .cloned(),
        );
        paths
    }

    pub fn load(&self) -> Result<LoadedInputs> {
        let gles = CommandModel::build(&RegistryModel::load(&self.gles)?)?;
        let egl = CommandModel::build(&RegistryModel::load(&self.egl)?)?;
        let cl = CommandModel::build(&RegistryModel::load(&self.cl)?)?;

        let packed = |path: &Option<PathBuf>| -> Result<PackedEnumTable> {
            path.as_deref()
                .map(PackedEnumTable::load)
                .transpose()
                .map(Option::unwrap_or_default)
        };
        let gles_packed = packed(&self.gles_packed)?;
        let egl_packed = packed(&self.egl_packed)?;
        let egl_objects = self
            .egl_objects
            .as_deref()
            .map(LabeledObjectTable::load)
            .transpose()?
            .unwrap_or_default();
        info!(
            gles_packed = gles_packed.len(),
            egl_packed = egl_packed.len(),
            egl_objects = egl_objects.len(),
            "tables loaded"
        );

        Ok(LoadedInputs {
            gles,
            egl,
            cl,
            tables: Tables::new(gles_packed, egl_packed, egl_objects),
        })
    }
}
