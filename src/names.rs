//! Name Resolution for the Entry Point Generator
//!
//! Canonical names drop a single vendor suffix (`glBindVertexArrayOES` →
//! `glBindVertexArray`) unless the command is an alias exception, whose
//! extension behavior differs from the core command it would fold into.
//! The suffix set is chosen by the API passed in, never inferred from the name.

use std::collections::BTreeMap;

use crate::registry::Api;

// ═══════════════════════════════════════════════════════════════════════════════
// ALIAS EXCEPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Lower-camel names, prefix removed, that keep their suffix.
const ALIAS_EXCEPTIONS: &[&str] = &[
    // From GL_EXT_multisampled_render_to_texture, never promoted to core GLES.
    "renderbufferStorageMultisampleEXT",
    "drawArraysInstancedBaseInstanceANGLE",
    "drawElementsInstancedBaseVertexBaseInstanceANGLE",
    "logicOpANGLE",
];

#[derive(Debug, Clone, Copy)]
pub struct NameResolver {
    api: Api,
}

impl NameResolver {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    pub fn api(&self) -> Api {
        self.api
    }

    /// Accepts both `glLogicOpANGLE` and `LogicOpANGLE`.
    pub fn is_alias_exception(&self, name: &str) -> bool {
        if self.api != Api::Gles {
            return false;
        }
        let bare = name.strip_prefix("gl").unwrap_or(name);
        let mut chars = bare.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let lowered: String = first.to_lowercase().chain(chars).collect();
        ALIAS_EXCEPTIONS.contains(&lowered.as_str())
    }

    /// Removes at most one known suffix, ignoring alias exceptions. Used for
    /// packed-enum lookups, which are keyed by the fully stripped name.
    pub fn strip_suffix_always<'a>(&self, name: &'a str) -> &'a str {
        for suffix in self.api.suffixes() {
            if let Some(stripped) = name.strip_suffix(suffix) {
                if !stripped.is_empty() {
                    return stripped;
                }
            }
        }
        name
    }

    /// Canonical form of a full or prefix-less command name.
    pub fn canonical<'a>(&self, name: &'a str) -> &'a str {
        if self.is_alias_exception(name) {
            return name;
        }
        self.strip_suffix_always(name)
    }

    /// Canonical name without the API prefix, e.g. `glDrawBuffersEXT` → `DrawBuffers`.
    pub fn canonical_short<'a>(&self, name: &'a str) -> &'a str {
        self.canonical(self.api.strip_prefix(name))
    }

    /// `glIsEnabled` → `isEnabled`: the Context method name.
    pub fn context_method(&self, name: &str) -> String {
        let short = self.canonical_short(name);
        let mut chars = short.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DUPLICATE TRACKING
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occurrence {
    First,
    /// Canonical name already defined by an earlier extension.
    Duplicate { extension: String, original: String },
}

/// Records canonical extension command names in processing order so later
/// collisions reuse the earliest definition.
#[derive(Debug, Clone)]
pub struct DuplicateTracker {
    resolver: NameResolver,
    seen: BTreeMap<String, (String, String)>,
}

impl DuplicateTracker {
    pub fn new(resolver: NameResolver) -> Self {
        Self {
            resolver,
            seen: BTreeMap::new(),
        }
    }

    pub fn observe(&mut self, extension: &str, name: &str) -> Occurrence {
        let canonical = self.resolver.canonical(name).to_string();
        match self.seen.get(&canonical) {
            Some((first_extension, original)) if first_extension != extension => {
                Occurrence::Duplicate {
                    extension: first_extension.clone(),
                    original: original.clone(),
                }
            }
            Some(_) => Occurrence::First,
            None => {
                self.seen
                    .insert(canonical, (extension.to_string(), name.to_string()));
                Occurrence::First
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_one_suffix() {
        let r = NameResolver::new(Api::Gles);
        assert_eq!(r.canonical("glBindVertexArrayOES"), "glBindVertexArray");
        assert_eq!(r.canonical("glDrawBuffersEXT"), "glDrawBuffers");
        assert_eq!(r.canonical("glClear"), "glClear");
    }

    #[test]
    fn test_alias_exception_keeps_suffix() {
        let r = NameResolver::new(Api::Gles);
        assert!(r.is_alias_exception("glLogicOpANGLE"));
        assert!(r.is_alias_exception("RenderbufferStorageMultisampleEXT"));
        assert_eq!(r.canonical("glLogicOpANGLE"), "glLogicOpANGLE");
        assert_eq!(r.canonical_short("glLogicOpANGLE"), "LogicOpANGLE");
        // The suffix is still dropped for packed-enum lookups.
        assert_eq!(r.strip_suffix_always("glLogicOpANGLE"), "glLogicOp");
    }

    #[test]
    fn test_suffix_set_follows_api() {
        assert_eq!(NameResolver::new(Api::Gles).canonical("glFooCHROMIUM"), "glFoo");
        assert_eq!(NameResolver::new(Api::Egl).canonical("eglFooCHROMIUM"), "eglFooCHROMIUM");
        assert_eq!(NameResolver::new(Api::Egl).canonical("eglCreateImageKHR"), "eglCreateImage");
        // Alias exceptions are a GLES concept.
        assert!(!NameResolver::new(Api::Egl).is_alias_exception("glLogicOpANGLE"));
    }

    #[test]
    fn test_context_method_name() {
        let r = NameResolver::new(Api::Gles);
        assert_eq!(r.context_method("glIsEnabled"), "isEnabled");
        assert_eq!(r.context_method("glBindVertexArrayOES"), "bindVertexArray");
    }

    #[test]
    fn test_duplicate_tracker_earliest_wins() {
        let mut t = DuplicateTracker::new(NameResolver::new(Api::Gles));
        assert_eq!(t.observe("GL_EXT_a", "glFooEXT"), Occurrence::First);
        assert_eq!(
            t.observe("GL_OES_b", "glFooOES"),
            Occurrence::Duplicate {
                extension: "GL_EXT_a".to_string(),
                original: "glFooEXT".to_string()
            }
        );
        assert_eq!(t.observe("GL_OES_b", "glBarOES"), Occurrence::First);
    }

    #[test]
    fn test_alias_exception_does_not_collide_with_core_form() {
        let mut t = DuplicateTracker::new(NameResolver::new(Api::Gles));
        assert_eq!(t.observe("GL_EXT_a", "glLogicOpEXT"), Occurrence::First);
        assert_eq!(t.observe("GL_ANGLE_b", "glLogicOpANGLE"), Occurrence::First);
    }
}
