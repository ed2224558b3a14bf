//! Registry Module for the Entry Point Generator
//!
//! Read-only input model: the already-parsed command registry for each API
//! plus the packed-enum and EGL owning-object tables. Everything here is
//! loaded once per run and then only borrowed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{GeneratorError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// API FAMILIES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Api {
    Gles,
    Egl,
    Cl,
}

impl Api {
    pub const ALL: [Api; 3] = [Api::Gles, Api::Egl, Api::Cl];

    /// Lower-case command prefix (`gl`, `egl`, `cl`).
    pub fn command_prefix(self) -> &'static str {
        match self {
            Api::Gles => "gl",
            Api::Egl => "egl",
            Api::Cl => "cl",
        }
    }

    /// Prefix used for `angle::EntryPoint` enumerators.
    pub fn enum_prefix(self) -> &'static str {
        match self {
            Api::Gles => "GL",
            Api::Egl => "EGL",
            Api::Cl => "CL",
        }
    }

    /// Vendor suffixes folded away when canonicalizing a name. Order matters:
    /// the first match wins and at most one suffix is stripped.
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            Api::Gles => &["ANGLE", "EXT", "KHR", "OES", "CHROMIUM", "OVR"],
            Api::Egl => &["ANGLE", "EXT", "KHR"],
            Api::Cl => &["KHR", "EXT"],
        }
    }

    /// Namespace of the generated enum group tables.
    pub fn enum_namespace(self) -> &'static str {
        match self {
            Api::Gles => "GLESEnum",
            Api::Egl => "EGLEnum",
            Api::Cl => "CLEnum",
        }
    }

    /// C++ namespace that owns the API's capture and validation functions.
    pub fn cpp_namespace(self) -> &'static str {
        match self {
            Api::Gles => "gl",
            Api::Egl => "egl",
            Api::Cl => "cl",
        }
    }

    /// Strips the API command prefix, e.g. `glClear` → `Clear`.
    pub fn strip_prefix<'a>(self, name: &'a str) -> &'a str {
        name.strip_prefix(self.command_prefix()).unwrap_or(name)
    }

    pub fn key(self) -> &'static str {
        match self {
            Api::Gles => "gles",
            Api::Egl => "egl",
            Api::Cl => "cl",
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Api::Gles => "GLES",
            Api::Egl => "EGL",
            Api::Cl => "CL",
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY MODEL
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Return type followed by the command name, e.g. `void glActiveTexture`.
    pub proto: String,
    #[serde(default)]
    pub params: Vec<String>,
    /// Parameter name → enum group.
    #[serde(default)]
    pub groups: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionFamily {
    Gles1,
    Gles2,
    Angle,
}

impl ExtensionFamily {
    pub fn title(self) -> &'static str {
        match self {
            ExtensionFamily::Gles1 => "GLES1 Extensions",
            ExtensionFamily::Gles2 => "GLES2+ Extensions",
            ExtensionFamily::Angle => "ANGLE Extensions",
        }
    }
}

/// A version or an extension: a named list of commands it introduces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSpec {
    pub name: String,
    #[serde(default)]
    pub family: Option<ExtensionFamily>,
    #[serde(default)]
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryModel {
    pub api: Api,
    pub data_source: String,
    pub commands: Vec<CommandSpec>,
    #[serde(default)]
    pub versions: Vec<FeatureSpec>,
    #[serde(default)]
    pub extensions: Vec<FeatureSpec>,
}

impl RegistryModel {
    pub fn from_json(path: &Path, source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|source| GeneratorError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        Self::from_json(path, &source)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PACKED ENUM TABLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Suffix-stripped command name → parameter name → packed type.
#[derive(Debug, Clone, Default)]
pub struct PackedEnumTable {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl PackedEnumTable {
    pub fn from_json(path: &Path, source: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(source).map_err(|source| GeneratorError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let object = value
            .as_object()
            .ok_or_else(|| GeneratorError::invalid(path, "packed enum table must be an object"))?;

        let mut entries = BTreeMap::new();
        for (command, params) in object {
            // Non-object members are annotations such as "description".
            let Some(params) = params.as_object() else {
                continue;
            };
            let mut packed = BTreeMap::new();
            for (param, ty) in params {
                let ty = ty.as_str().ok_or_else(|| {
                    GeneratorError::invalid(
                        path,
                        format!("packed type for {}.{} must be a string", command, param),
                    )
                })?;
                packed.insert(param.clone(), ty.to_string());
            }
            entries.insert(command.clone(), packed);
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        Self::from_json(path, &source)
    }

    pub fn get(&self, command: &str) -> Option<&BTreeMap<String, String>> {
        self.entries.get(command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EGL OWNING OBJECTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectCategory {
    Display,
    Context,
    Device,
    Surface,
    Image,
    Sync,
    Stream,
    Thread,
    LabeledObject,
}

impl ObjectCategory {
    pub fn name(self) -> &'static str {
        match self {
            ObjectCategory::Display => "Display",
            ObjectCategory::Context => "Context",
            ObjectCategory::Device => "Device",
            ObjectCategory::Surface => "Surface",
            ObjectCategory::Image => "Image",
            ObjectCategory::Sync => "Sync",
            ObjectCategory::Stream => "Stream",
            ObjectCategory::Thread => "Thread",
            ObjectCategory::LabeledObject => "LabeledObject",
        }
    }
}

impl FromStr for ObjectCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "Display" => ObjectCategory::Display,
            "Context" => ObjectCategory::Context,
            "Device" => ObjectCategory::Device,
            "Surface" => ObjectCategory::Surface,
            "Image" => ObjectCategory::Image,
            "Sync" => ObjectCategory::Sync,
            "Stream" => ObjectCategory::Stream,
            "Thread" => ObjectCategory::Thread,
            "LabeledObject" => ObjectCategory::LabeledObject,
            other => return Err(format!("unknown owning-object category `{}`", other)),
        })
    }
}

fn first_entry_point(entry_points: &serde_json::Value) -> Option<&str> {
    entry_points.as_array()?.first()?.as_str()
}

/// Entry point → declared owning-object category.
#[derive(Debug, Clone, Default)]
pub struct LabeledObjectTable {
    by_entry_point: BTreeMap<String, ObjectCategory>,
}

impl LabeledObjectTable {
    pub fn from_json(path: &Path, source: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(source).map_err(|source| GeneratorError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let mut by_entry_point = BTreeMap::new();
        for (category, entry_points) in raw {
            if category == "description" {
                continue;
            }
            let parsed: ObjectCategory =
                category.parse().map_err(|_: String| GeneratorError::PolicyConflict {
                    command: first_entry_point(&entry_points).unwrap_or(&category).to_string(),
                    first: format!("owning-object {}", category),
                    second: "unknown category".to_string(),
                })?;
            let entry_points = entry_points.as_array().ok_or_else(|| {
                GeneratorError::invalid(path, format!("category `{}` must be a list", category))
            })?;
            for ep in entry_points {
                let ep = ep.as_str().ok_or_else(|| {
                    GeneratorError::invalid(path, format!("`{}` lists a non-string", category))
                })?;
                if let Some(previous) = by_entry_point.insert(ep.to_string(), parsed) {
                    return Err(GeneratorError::PolicyConflict {
                        command: ep.to_string(),
                        first: format!("owning-object {}", previous.name()),
                        second: format!("owning-object {}", parsed.name()),
                    });
                }
            }
        }
        Ok(Self { by_entry_point })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        Self::from_json(path, &source)
    }

    pub fn category(&self, entry_point: &str) -> Option<ObjectCategory> {
        self.by_entry_point.get(entry_point).copied()
    }

    pub fn len(&self) -> usize {
        self.by_entry_point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entry_point.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUN TABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Read-only lookup tables constructed once per run and threaded through
/// every component by reference.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub gles_packed: PackedEnumTable,
    pub egl_packed: PackedEnumTable,
    pub egl_objects: LabeledObjectTable,
    cl_packed: PackedEnumTable,
}

impl Tables {
    pub fn new(
        gles_packed: PackedEnumTable,
        egl_packed: PackedEnumTable,
        egl_objects: LabeledObjectTable,
    ) -> Self {
        Self {
            gles_packed,
            egl_packed,
            egl_objects,
            cl_packed: PackedEnumTable::default(),
        }
    }

    pub fn packed_enums(&self, api: Api) -> &PackedEnumTable {
        match api {
            Api::Gles => &self.gles_packed,
            Api::Egl => &self.egl_packed,
            Api::Cl => &self.cl_packed,
        }
    }
}
