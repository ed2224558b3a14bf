//! Validation and Context Prototypes for the Entry Point Generator
//!
//! Prototypes of the hand-written functions the generated definitions call:
//! validators, context-private calls, scoped EGL context locks and the
//! `Context` member declarations.

use std::collections::BTreeSet;

use crate::names::NameResolver;
use crate::registry::Api;
use crate::signature::{ResolvedCommand, ResolvedParam};
use crate::templates::{self, fill};

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOTYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Parameters every validator takes ahead of the command's own.
fn validation_extras(rc: &ResolvedCommand) -> Vec<ResolvedParam> {
    match rc.api() {
        Api::Gles => {
            let mut extras = if rc.flags.lock.is_context_private() {
                vec![
                    ResolvedParam::fixed("const PrivateState &", "state"),
                    ResolvedParam::fixed("ErrorSet *", "errors"),
                ]
            } else {
                vec![ResolvedParam::fixed("Context *", "context")]
            };
            extras.push(ResolvedParam::fixed("angle::EntryPoint", "entryPoint"));
            extras
        }
        Api::Egl => vec![ResolvedParam::fixed("ValidationContext *", "val")],
        Api::Cl => Vec::new(),
    }
}

/// `bool ValidateDrawArrays(const Context * context, ...);`
pub fn validation_proto(rc: &ResolvedCommand) -> String {
    let return_type = match rc.api() {
        Api::Cl => "cl_int",
        _ => "bool",
    };
    let params = rc.validation_decls(&validation_extras(rc));
    fill(
        templates::VALIDATION_PROTO,
        &[
            ("return_type", return_type),
            ("short_name", rc.short_name()),
            ("params", &params),
        ],
    )
}

/// Prototype of the free function a context-private command routes to,
/// keyed by its canonical name so suffixed aliases share one function.
pub fn context_private_proto(rc: &ResolvedCommand) -> (String, String) {
    let extras = [
        ResolvedParam::fixed("PrivateState *", "privateState"),
        ResolvedParam::fixed("PrivateStateCache *", "privateStateCache"),
    ];
    let params = rc.internal_decls(&extras);
    let name = rc.canonical_short().to_string();
    let proto = fill(
        templates::CONTEXT_PRIVATE_CALL_PROTO,
        &[
            ("return_type", rc.return_type()),
            ("short_name", &name),
            ("params", &params),
        ],
    );
    (proto, name)
}

pub fn context_lock_proto(rc: &ResolvedCommand) -> String {
    let params = rc.context_lock_decls();
    fill(
        templates::CONTEXT_LOCK_PROTO,
        &[("short_name", rc.short_name()), ("params", &params)],
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTEXT DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// `    void drawArrays(PrimitiveMode modePacked, ...); \`
pub fn context_decl(rc: &ResolvedCommand) -> String {
    let method = NameResolver::new(rc.api()).context_method(rc.name());
    let bytes = method.as_bytes();
    let maybe_const = if method.starts_with("is") && bytes.get(2).is_some_and(u8::is_ascii_uppercase) {
        " const"
    } else {
        ""
    };
    let params = rc.internal_decls(&[]);
    fill(
        templates::CONTEXT_DECL,
        &[
            ("return_type", rc.return_type()),
            ("context_method", &method),
            ("internal_params", &params),
            ("maybe_const", maybe_const),
        ],
    )
}

/// Tracks the canonical names already declared on `Context`. Core versions
/// each start from an empty set; extensions share one set seeded with every
/// core command.
#[derive(Debug, Clone, Default)]
pub struct ContextDecls {
    included: BTreeSet<String>,
}

impl ContextDecls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded<'a>(core_names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            included: core_names.into_iter().map(str::to_string).collect(),
        }
    }

    /// Declaration for `rc`, or `None` when it is already declared or the
    /// command bypasses `Context`.
    pub fn declare(&mut self, rc: &ResolvedCommand) -> Option<String> {
        let canonical = NameResolver::new(rc.api()).canonical(rc.name()).to_string();
        if self.included.contains(&canonical) || rc.flags.lock.is_context_private() {
            return None;
        }
        self.included.insert(canonical);
        Some(context_decl(rc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Command;
    use crate::policy::{LockClass, PolicyFlags};
    use crate::registry::{CommandSpec, PackedEnumTable, Tables};
    use std::path::Path;

    fn command(api: Api, proto: &str, params: &[&str]) -> Command {
        let spec = CommandSpec {
            proto: proto.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            groups: Default::default(),
        };
        Command::from_spec(api, &spec).unwrap()
    }

    #[test]
    fn test_gles_validation_proto() {
        let packed = PackedEnumTable::from_json(
            Path::new("gl.json"),
            r#"{ "glDrawArrays": { "mode": "PrimitiveMode" } }"#,
        )
        .unwrap();
        let tables = Tables::new(packed, Default::default(), Default::default());
        let flags = PolicyFlags::default();
        let cmd = command(Api::Gles, "void glDrawArrays", &["GLenum mode", "GLint first", "GLsizei count"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert_eq!(
            validation_proto(&rc),
            "bool ValidateDrawArrays(const Context * context, angle::EntryPoint entryPoint, PrimitiveMode modePacked, GLint first, GLsizei count);"
        );
        assert_eq!(
            context_decl(&rc),
            "    void drawArrays(PrimitiveMode modePacked, GLint first, GLsizei count); \\"
        );
    }

    #[test]
    fn test_private_validation_and_call_protos() {
        let tables = Tables::default();
        let flags = PolicyFlags {
            lock: LockClass::ContextPrivate,
            ..Default::default()
        };
        let cmd = command(Api::Gles, "void glBlendEquationOES", &["GLenum mode"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert_eq!(
            validation_proto(&rc),
            "bool ValidateBlendEquationOES(const PrivateState & state, ErrorSet * errors, angle::EntryPoint entryPoint, GLenum mode);"
        );
        let (proto, name) = context_private_proto(&rc);
        assert_eq!(name, "BlendEquation");
        assert_eq!(
            proto,
            "void ContextPrivateBlendEquation(PrivateState * privateState, PrivateStateCache * privateStateCache, GLenum mode);"
        );
    }

    #[test]
    fn test_egl_and_cl_validation_protos() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let egl = command(Api::Egl, "EGLBoolean eglTerminate", &["EGLDisplay dpy"]);
        let rc = ResolvedCommand::resolve(&egl, &flags, &tables);
        assert_eq!(
            validation_proto(&rc),
            "bool ValidateTerminate(const ValidationContext * val, const egl::Display * dpyPacked);"
        );
        assert_eq!(
            context_lock_proto(&rc),
            "ScopedContextMutexLock GetContextLock_Terminate(Thread * thread, egl::Display * dpyPacked);"
        );

        let cl = command(Api::Cl, "cl_int clFlush", &["cl_command_queue command_queue"]);
        let rc = ResolvedCommand::resolve(&cl, &flags, &tables);
        assert_eq!(validation_proto(&rc), "cl_int ValidateFlush(cl_command_queue command_queue);");
    }

    #[test]
    fn test_is_queries_are_const() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let cmd = command(Api::Gles, "GLboolean glIsBuffer", &["GLuint buffer"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert!(context_decl(&rc).contains("isBuffer(GLuint buffer) const;"));

        let cmd = command(Api::Gles, "void glInsertEventMarkerEXT", &["GLsizei length"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert!(!context_decl(&rc).contains(" const;"));
    }

    #[test]
    fn test_context_decls_dedupe() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let core = command(Api::Gles, "void glBindVertexArray", &["GLuint array"]);
        let ext = command(Api::Gles, "void glBindVertexArrayOES", &["GLuint array"]);
        let other = command(Api::Gles, "void glFooEXT", &[]);

        let mut decls = ContextDecls::seeded([core.name.as_str()]);
        let rc = ResolvedCommand::resolve(&ext, &flags, &tables);
        assert_eq!(decls.declare(&rc), None);
        let rc = ResolvedCommand::resolve(&other, &flags, &tables);
        assert!(decls.declare(&rc).is_some());
        assert_eq!(decls.declare(&rc), None);

        let private = PolicyFlags {
            lock: LockClass::ContextPrivate,
            ..Default::default()
        };
        let rc = ResolvedCommand::resolve(&core, &private, &tables);
        assert_eq!(ContextDecls::new().declare(&rc), None);
    }
}
