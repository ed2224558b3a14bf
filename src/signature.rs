//! Resolved Signatures for the Entry Point Generator
//!
//! One place where a command's parameters are bound to their packed types
//! and internal names. Every emitter renders parameter lists from a
//! `ResolvedCommand`, so declarations, definitions, validation, capture and
//! stubs cannot drift apart.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::{make_param, Command, Param};
use crate::names::NameResolver;
use crate::policy::{owning_object_expression, PolicyFlags};
use crate::registry::{Api, Tables};
use crate::types::packed_param_type;

/// Parameter name whose error is reported through thread-local state.
pub const ERRCODE_RET: &str = "errcode_ret";

/// Packed types forwarded to the scoped EGL context lock.
const CONTEXT_LOCK_TYPES: &[&str] = &["Thread *", "egl::Display *", "gl::ContextID"];
/// Parameter names forwarded to the scoped EGL context lock.
const CONTEXT_LOCK_NAMES: &[&str] = &["attribute", "flags"];

// ═══════════════════════════════════════════════════════════════════════════════
// PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParam {
    /// Type as declared by the registry.
    pub raw_type: String,
    pub raw_name: String,
    /// Substituted type when the parameter is packed.
    pub packed_type: Option<String>,
}

impl ResolvedParam {
    /// A parameter that is never packed, e.g. `Thread *thread`.
    pub fn fixed(ty: &str, name: &str) -> Self {
        Self {
            raw_type: ty.to_string(),
            raw_name: name.to_string(),
            packed_type: None,
        }
    }

    fn bind(param: &Param, packed: &BTreeMap<String, String>) -> Self {
        Self {
            raw_type: param.ty.clone(),
            raw_name: param.name.clone(),
            packed_type: packed.get(&param.name).cloned(),
        }
    }

    pub fn is_packed(&self) -> bool {
        self.packed_type.is_some()
    }

    pub fn internal_type(&self) -> &str {
        self.packed_type.as_deref().unwrap_or(&self.raw_type)
    }

    /// `buffer` → `bufferPacked` when packed.
    pub fn internal_name(&self) -> String {
        if self.is_packed() {
            format!("{}Packed", self.raw_name)
        } else {
            self.raw_name.clone()
        }
    }

    pub fn internal_decl(&self) -> String {
        make_param(self.internal_type(), &self.internal_name())
    }

    /// Validators take pointers as pointers-to-const.
    pub fn validation_type(&self) -> String {
        let ty = self.internal_type();
        if self.raw_name == ERRCODE_RET || ty == "ErrorSet *" || ty.contains('(') {
            ty.to_string()
        } else if ty.contains("**") && !ty.contains("const") {
            ty.replace("**", "* const *")
        } else if ty.contains('*') && !ty.contains("const") {
            if ty.contains("[]") {
                ty.replace('*', "*const ")
            } else {
                format!("const {}", ty)
            }
        } else {
            ty.to_string()
        }
    }

    pub fn validation_decl(&self) -> String {
        make_param(&self.validation_type(), &self.internal_name())
    }

    fn forwards_to_context_lock(&self) -> bool {
        CONTEXT_LOCK_TYPES.contains(&self.internal_type())
            || CONTEXT_LOCK_NAMES.contains(&self.internal_name().as_str())
    }
}

/// Packed type per parameter name: the command's table entry, keyed by the
/// fully suffix-stripped name, overlaid with API-wide substitutions.
pub fn packed_types(command: &Command, tables: &Tables) -> BTreeMap<String, String> {
    let resolver = NameResolver::new(command.api);
    let mut packed = tables
        .packed_enums(command.api)
        .get(resolver.strip_suffix_always(&command.name))
        .cloned()
        .unwrap_or_default();
    for param in &command.params {
        if let Some(ty) = packed_param_type(command.api, &param.ty) {
            packed.insert(param.name.clone(), ty.to_string());
        }
    }
    packed
}

fn join_decls<'a>(params: impl Iterator<Item = &'a ResolvedParam>) -> String {
    params.map(ResolvedParam::internal_decl).collect::<Vec<_>>().join(", ")
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ResolvedCommand<'a> {
    pub command: &'a Command,
    pub flags: &'a PolicyFlags,
    pub params: Vec<ResolvedParam>,
}

impl<'a> ResolvedCommand<'a> {
    pub fn resolve(command: &'a Command, flags: &'a PolicyFlags, tables: &Tables) -> Self {
        let packed = packed_types(command, tables);
        let params = command
            .params
            .iter()
            .map(|p| ResolvedParam::bind(p, &packed))
            .collect();
        Self {
            command,
            flags,
            params,
        }
    }

    pub fn api(&self) -> Api {
        self.command.api
    }

    pub fn name(&self) -> &str {
        &self.command.name
    }

    pub fn short_name(&self) -> &str {
        self.command.short_name()
    }

    pub fn return_type(&self) -> &str {
        &self.command.return_type
    }

    pub fn returns_void(&self) -> bool {
        self.command.returns_void()
    }

    /// Canonical name without prefix, e.g. `BindVertexArray`.
    pub fn canonical_short(&self) -> &str {
        NameResolver::new(self.api()).canonical_short(&self.command.name)
    }

    /// `angle::EntryPoint` enumerator, e.g. `GLDrawArrays`.
    pub fn entry_point_enum(&self) -> String {
        format!("{}{}", self.api().enum_prefix(), self.short_name())
    }

    pub fn has_errcode_ret(&self) -> bool {
        self.params.last().is_some_and(|p| p.raw_name == ERRCODE_RET)
    }

    /// Parameters as the implementation sees them: `errcode_ret` is dropped.
    fn internal_params(&self) -> &[ResolvedParam] {
        if self.has_errcode_ret() {
            &self.params[..self.params.len() - 1]
        } else {
            &self.params
        }
    }

    pub fn internal_names(&self) -> Vec<String> {
        self.internal_params().iter().map(ResolvedParam::internal_name).collect()
    }

    /// Raw declarations, as exported.
    pub fn raw_decls(&self) -> String {
        self.command.param_texts().join(", ")
    }

    pub fn raw_names(&self) -> String {
        self.params
            .iter()
            .map(|p| p.raw_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Internal declarations of every parameter, preceded by `extras`.
    pub fn internal_decls(&self, extras: &[ResolvedParam]) -> String {
        join_decls(extras.iter().chain(self.params.iter()))
    }

    /// Internal declarations without `errcode_ret`, preceded by `extras`.
    pub fn implementation_decls(&self, extras: &[ResolvedParam]) -> String {
        join_decls(extras.iter().chain(self.internal_params().iter()))
    }

    pub fn validation_decls(&self, extras: &[ResolvedParam]) -> String {
        extras
            .iter()
            .chain(self.internal_params().iter())
            .map(ResolvedParam::validation_decl)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn context_lock_names(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|p| p.forwards_to_context_lock())
            .map(ResolvedParam::internal_name)
            .collect()
    }

    /// `Thread *thread` plus the parameters the scoped context lock needs.
    pub fn context_lock_decls(&self) -> String {
        let thread = ResolvedParam::fixed("Thread *", "thread");
        join_decls(
            std::iter::once(&thread).chain(self.params.iter().filter(|p| p.forwards_to_context_lock())),
        )
    }

    /// `PackParam` conversions, each on its own indented line.
    pub fn packed_conversions(&self) -> String {
        self.params
            .iter()
            .filter_map(|p| {
                let ty = p.packed_type.as_deref()?;
                Some(format!(
                    "\n        {} {} = PackParam<{}>({});",
                    ty,
                    p.internal_name(),
                    ty,
                    p.raw_name
                ))
            })
            .collect()
    }

    /// Attribute maps skip their validating constructor when validation is off.
    pub fn attrib_map_init(&self) -> String {
        self.params
            .iter()
            .filter(|p| p.packed_type.as_deref().is_some_and(|t| t.contains("AttributeMap")))
            .map(|p| format!("{}.initializeWithoutValidation();", p.internal_name()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Validation's owning-object argument for EGL entry points.
    pub fn labeled_object(&self) -> Result<String> {
        let pairs: Vec<(String, String)> = self
            .params
            .iter()
            .map(|p| (p.internal_type().to_string(), p.internal_name()))
            .collect();
        let borrowed: Vec<(&str, &str)> =
            pairs.iter().map(|(t, n)| (t.as_str(), n.as_str())).collect();
        owning_object_expression(self.name(), self.flags.owning_object, &borrowed)
    }

    /// Raw parameter whose registry type is exactly `ty`.
    pub fn raw_param_of_type(&self, ty: &str) -> Option<&ResolvedParam> {
        self.params.iter().find(|p| p.raw_type == ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CommandSpec, PackedEnumTable};
    use std::path::Path;

    fn command(api: Api, proto: &str, params: &[&str]) -> Command {
        let spec = CommandSpec {
            proto: proto.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            groups: Default::default(),
        };
        Command::from_spec(api, &spec).unwrap()
    }

    fn gles_tables(json: &str) -> Tables {
        let packed = PackedEnumTable::from_json(Path::new("gl.json"), json).unwrap();
        Tables::new(packed, Default::default(), Default::default())
    }

    #[test]
    fn test_packed_lookup_strips_suffix() {
        let tables = gles_tables(r#"{ "glBindVertexArray": { "array": "VertexArrayID" } }"#);
        let cmd = command(Api::Gles, "void glBindVertexArrayOES", &["GLuint array"]);
        let flags = PolicyFlags::default();
        let resolved = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert_eq!(resolved.internal_names(), vec!["arrayPacked"]);
        assert_eq!(resolved.internal_decls(&[]), "VertexArrayID arrayPacked");
        assert_eq!(
            resolved.packed_conversions(),
            "\n        VertexArrayID arrayPacked = PackParam<VertexArrayID>(array);"
        );
    }

    #[test]
    fn test_api_wide_egl_packing() {
        let cmd = command(
            Api::Egl,
            "EGLBoolean eglQuerySurface",
            &["EGLDisplay dpy", "EGLSurface surface", "EGLint attribute", "EGLint *value"],
        );
        let flags = PolicyFlags::default();
        let tables = Tables::default();
        let resolved = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert_eq!(
            resolved.internal_decls(&[]),
            "egl::Display * dpyPacked, SurfaceID surfacePacked, EGLint attribute, EGLint * value"
        );
        assert_eq!(resolved.context_lock_names(), vec!["dpyPacked", "attribute"]);
        assert_eq!(
            resolved.context_lock_decls(),
            "Thread * thread, egl::Display * dpyPacked, EGLint attribute"
        );
        assert_eq!(resolved.labeled_object().unwrap(), "GetDisplayIfValid(dpyPacked)");
    }

    #[test]
    fn test_errcode_ret_dropped_from_internal_params() {
        let cmd = command(
            Api::Cl,
            "cl_mem clCreateBuffer",
            &["cl_context context", "cl_mem_flags flags", "size_t size", "void *host_ptr", "cl_int *errcode_ret"],
        );
        let flags = PolicyFlags::default();
        let tables = Tables::default();
        let resolved = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert!(resolved.has_errcode_ret());
        assert_eq!(resolved.internal_names(), vec!["context", "flagsPacked", "size", "host_ptr"]);
        assert_eq!(
            resolved.validation_decls(&[]),
            "cl_context context, MemFlags flagsPacked, size_t size, const void * host_ptr"
        );
        assert!(resolved.internal_decls(&[]).ends_with("cl_int * errcode_ret"));
    }

    #[test]
    fn test_validation_const_pointer_rules() {
        assert_eq!(ResolvedParam::fixed("GLuint *", "ids").validation_type(), "const GLuint *");
        assert_eq!(ResolvedParam::fixed("void **", "params").validation_type(), "void * const *");
        assert_eq!(ResolvedParam::fixed("const void *", "data").validation_type(), "const void *");
        assert_eq!(ResolvedParam::fixed("ErrorSet *", "errors").validation_type(), "ErrorSet *");
        assert_eq!(ResolvedParam::fixed("void *[]", "ptrs").validation_type(), "void *const []");
    }

    #[test]
    fn test_attribute_map_init() {
        let json = r#"{ "eglCreateImage": { "attrib_list": "const AttributeMap &" } }"#;
        let packed = PackedEnumTable::from_json(Path::new("egl.json"), json).unwrap();
        let tables = Tables::new(Default::default(), packed, Default::default());
        let cmd = command(
            Api::Egl,
            "EGLImage eglCreateImage",
            &["EGLDisplay dpy", "EGLContext ctx", "EGLenum target", "EGLClientBuffer buffer", "const EGLAttrib *attrib_list"],
        );
        let flags = PolicyFlags::default();
        let resolved = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert_eq!(resolved.attrib_map_init(), "attrib_listPacked.initializeWithoutValidation();");
        assert_eq!(resolved.context_lock_names(), vec!["dpyPacked", "ctxPacked"]);
    }
}
