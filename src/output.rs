//! Output Module for the Entry Point Generator
//!
//! Writes a rendered [`OutputSet`] under the output root. Every file goes to
//! a temporary sibling first and is then persisted over its destination, so
//! an interrupted run never leaves a half-written artifact behind. A SHA-256
//! manifest of inputs and outputs lets an unchanged run skip generation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{GeneratorError, Result};

/// First line of every generated file, per comment leader.
pub const GENERATED_MARKERS: &[&str] = &[
    "// GENERATED FILE - DO NOT EDIT.",
    "; GENERATED FILE - DO NOT EDIT.",
];

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Rendered files keyed by their path relative to the output root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSet {
    files: BTreeMap<PathBuf, String>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf, contents: String) {
        if self.files.insert(path.clone(), contents).is_some() {
            warn!(path = %path.display(), "output rendered twice; keeping the last rendering");
        }
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains_key(path.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Manifest key of a path: forward slashes on every platform.
fn manifest_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATOMIC WRITES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

/// Replaces `path` with `contents` unless it already holds them. The temp
/// file lives in the destination directory so the final rename never crosses
/// a filesystem; dropping it on an error path deletes it.
pub fn write_atomic(path: &Path, contents: &str) -> Result<WriteOutcome> {
    match fs::read(path) {
        Ok(existing) if existing == contents.as_bytes() => return Ok(WriteOutcome::Unchanged),
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(GeneratorError::io(path, e)),
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| GeneratorError::io(dir, e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| GeneratorError::io(dir, e))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| GeneratorError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| GeneratorError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| GeneratorError::io(path, e.error))?;
    Ok(WriteOutcome::Written)
}

/// Writes every file of `outputs` under `root`.
pub fn write_all(root: &Path, outputs: &OutputSet) -> Result<WriteReport> {
    let mut report = WriteReport::default();
    for (relative, contents) in outputs.iter() {
        let path = root.join(relative);
        match write_atomic(&path, contents)? {
            WriteOutcome::Written => {
                debug!(path = %relative.display(), "written");
                report.written.push(relative.to_path_buf());
            }
            WriteOutcome::Unchanged => {
                debug!(path = %relative.display(), "unchanged");
                report.unchanged.push(relative.to_path_buf());
            }
        }
    }
    info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        "outputs written"
    );
    Ok(report)
}

/// Relative paths whose file under `root` is missing or differs from the
/// rendered contents.
pub fn out_of_date(root: &Path, outputs: &OutputSet) -> Result<Vec<PathBuf>> {
    let mut differing = Vec::new();
    for (relative, contents) in outputs.iter() {
        let path = root.join(relative);
        match fs::read(&path) {
            Ok(existing) if existing == contents.as_bytes() => {}
            Ok(_) => differing.push(relative.to_path_buf()),
            Err(e) if e.kind() == ErrorKind::NotFound => differing.push(relative.to_path_buf()),
            Err(e) => return Err(GeneratorError::io(path, e)),
        }
    }
    Ok(differing)
}

// ═══════════════════════════════════════════════════════════════════════════════
// STALE OUTPUTS
// ═══════════════════════════════════════════════════════════════════════════════

fn has_generated_marker(path: &Path) -> bool {
    let Ok(file) = fs::File::open(path) else {
        return false;
    };
    let mut first = String::new();
    if BufReader::new(file).read_line(&mut first).is_err() {
        return false;
    }
    let first = first.trim_end();
    GENERATED_MARKERS.iter().any(|marker| first == *marker)
}

/// Generated `*_autogen.*` files next to the catalog's outputs that the
/// catalog no longer names. Only the directories the catalog writes into are
/// scanned.
pub fn stale_outputs(root: &Path, outputs: &OutputSet) -> Vec<PathBuf> {
    let dirs: BTreeSet<&Path> = outputs.paths().filter_map(Path::parent).collect();
    let mut stale = Vec::new();
    for dir in dirs {
        let walker = WalkDir::new(root.join(dir))
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !name.contains("_autogen.") {
                continue;
            }
            let relative = dir.join(entry.file_name());
            if outputs.contains(&relative) || !has_generated_marker(entry.path()) {
                continue;
            }
            stale.push(relative);
        }
    }
    stale
}

pub fn report_stale(root: &Path, outputs: &OutputSet) -> Vec<PathBuf> {
    let stale = stale_outputs(root, outputs);
    for path in &stale {
        warn!(path = %path.display(), "generated file is no longer part of the output catalog");
    }
    stale
}

// ═══════════════════════════════════════════════════════════════════════════════
// HASH MANIFEST
// ═══════════════════════════════════════════════════════════════════════════════

/// Digests of the inputs and outputs of the last successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashManifest {
    pub inputs: BTreeMap<String, String>,
    /// Keyed by path relative to the output root.
    pub outputs: BTreeMap<String, String>,
}

impl HashManifest {
    pub fn new(inputs: BTreeMap<String, String>, outputs: &OutputSet) -> Self {
        let outputs = outputs
            .iter()
            .map(|(path, contents)| (manifest_key(path), compute_hash(contents.as_bytes())))
            .collect();
        Self { inputs, outputs }
    }

    pub fn hash_inputs(paths: &[PathBuf]) -> Result<BTreeMap<String, String>> {
        let mut hashes = BTreeMap::new();
        for path in paths {
            let bytes = fs::read(path).map_err(|e| GeneratorError::io(path, e))?;
            hashes.insert(manifest_key(path), compute_hash(&bytes));
        }
        Ok(hashes)
    }

    /// A missing or unreadable manifest means "regenerate", never an error.
    pub fn load(path: &Path) -> Option<Self> {
        let data = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring corrupt hash manifest");
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut data = serde_json::to_string_pretty(self).map_err(|source| GeneratorError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        data.push('\n');
        write_atomic(path, &data)?;
        Ok(())
    }

    /// True when the inputs hash the same as last time and every recorded
    /// output still holds what was written.
    pub fn is_fresh(&self, inputs: &BTreeMap<String, String>, root: &Path) -> bool {
        if self.outputs.is_empty() || self.inputs != *inputs {
            return false;
        }
        self.outputs.iter().all(|(relative, hash)| {
            fs::read(root.join(relative))
                .map(|bytes| compute_hash(&bytes) == *hash)
                .unwrap_or(false)
        })
    }
}
