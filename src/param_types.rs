//! Parameter Type Registry for the Entry Point Generator
//!
//! Global, deduplicated set of capture tags seen while emitting capture
//! methods for all three APIs. It drives the frame-capture utilities: the
//! `ParamType` enumeration, the `ParamValue` union and the resource-id tables.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GeneratorError, Result};
use crate::registry::Api;
use crate::types::TypeDescriptor;

/// Registered for every run; the replay interpreter reads 64-bit integers.
pub const ALWAYS_REGISTERED: &str = "GLint64";

#[derive(Debug, Clone)]
pub struct TagEntry {
    pub descriptor: TypeDescriptor,
    /// APIs whose capture methods reference the tag.
    pub apis: BTreeSet<Api>,
}

impl TagEntry {
    pub fn is_cl_only(&self) -> bool {
        self.apis.iter().all(|api| *api == Api::Cl)
    }
}

#[derive(Debug, Clone)]
pub struct ParamTypeRegistry {
    entries: BTreeMap<String, TagEntry>,
}

impl Default for ParamTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamTypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            entries: BTreeMap::new(),
        };
        registry.insert(Api::Gles, TypeDescriptor::parse(ALWAYS_REGISTERED));
        registry
    }

    fn insert(&mut self, api: Api, descriptor: TypeDescriptor) -> String {
        let tag = descriptor.tag();
        self.entries
            .entry(tag.clone())
            .or_insert_with(|| TagEntry {
                descriptor,
                apis: BTreeSet::new(),
            })
            .apis
            .insert(api);
        tag
    }

    /// Records the tag of `ty` and returns it. Two types rendering to the
    /// same tag with different union spellings are a collision.
    pub fn register(&mut self, api: Api, ty: &str) -> Result<String> {
        let descriptor = TypeDescriptor::parse(ty);
        let tag = descriptor.tag();
        if let Some(existing) = self.entries.get(&tag) {
            let (first, second) = (existing.descriptor.spelling(), descriptor.spelling());
            if first != second {
                return Err(GeneratorError::TagCollision { tag, first, second });
            }
        }
        Ok(self.insert(api, descriptor))
    }

    pub fn get(&self, tag: &str) -> Option<&TagEntry> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Sorted by tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagEntry)> + Clone {
        self.entries.iter().map(|(tag, entry)| (tag.as_str(), entry))
    }

    /// Tags used by GLES or EGL capture.
    pub fn gl_tags(&self) -> impl Iterator<Item = (&str, &TagEntry)> + Clone {
        self.iter().filter(|(_, e)| !e.is_cl_only())
    }

    /// Tags only OpenCL capture uses.
    pub fn cl_only_tags(&self) -> impl Iterator<Item = (&str, &TagEntry)> + Clone {
        self.iter().filter(|(_, e)| e.is_cl_only())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `ResourceIDType` per plain id tag, sorted.
    pub fn resource_ids(&self) -> Vec<String> {
        self.iter()
            .filter_map(|(_, e)| e.descriptor.resource_id())
            .collect()
    }
}

/// Resource category of a tag taken from an id or id-pointer tag.
pub fn resource_id_for(entry: &TagEntry) -> Option<String> {
    entry
        .descriptor
        .resource_id()
        .or_else(|| entry.descriptor.resource_id_of_pointee())
}
