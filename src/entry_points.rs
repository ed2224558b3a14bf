//! Entry Point Emitter for the Entry Point Generator
//!
//! Renders the public declaration, the definition body, the exported shim
//! and the stub prototype of one command. The definition template is picked
//! from the API, the return kind and the command's lock class; every slot is
//! filled from the same `ResolvedCommand`.

use crate::error::{GeneratorError, Result};
use crate::policy::{LockClass, SwapPreamble};
use crate::registry::Api;
use crate::signature::{ResolvedCommand, ResolvedParam};
use crate::templates::{self, fill};
use crate::types::FormatDescriptor;

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATE SELECTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Picks the body template from (API, return kind, lock class).
pub fn definition_template(rc: &ResolvedCommand) -> &'static str {
    let lock = rc.flags.lock;
    let private = lock.is_context_private();
    match rc.api() {
        Api::Gles if rc.returns_void() && private => templates::GLES_CONTEXT_PRIVATE_NO_RETURN,
        Api::Gles if rc.returns_void() => templates::GLES_NO_RETURN,
        Api::Gles if private => templates::GLES_CONTEXT_PRIVATE_WITH_RETURN,
        Api::Gles => templates::GLES_WITH_RETURN,
        Api::Egl if rc.returns_void() && lock.is_lockless() => templates::EGL_NO_RETURN_NO_LOCKS,
        Api::Egl if rc.returns_void() => templates::EGL_NO_RETURN,
        Api::Egl if lock.is_lockless() => templates::EGL_WITH_RETURN_NO_LOCKS,
        Api::Egl => templates::EGL_WITH_RETURN,
        Api::Cl if rc.returns_void() => templates::CL_NO_RETURN,
        Api::Cl if rc.return_type() == "cl_int" => templates::CL_WITH_RETURN_ERROR,
        Api::Cl if rc.has_errcode_ret() => templates::CL_WITH_ERRCODE_RET,
        Api::Cl => templates::CL_WITH_RETURN_POINTER,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// `ANGLE_EXPORT void GL_APIENTRY GL_DrawArrays(GLenum mode, ...);`
pub fn declaration(rc: &ResolvedCommand) -> String {
    let (angle_export, export_def, prefix) = match rc.api() {
        Api::Gles => ("ANGLE_EXPORT ", "GL_APIENTRY", "GL_"),
        Api::Egl => ("ANGLE_EXPORT ", "EGLAPIENTRY", "EGL_"),
        Api::Cl => ("", "CL_API_CALL", "cl"),
    };
    let name = format!("{}{}", prefix, rc.short_name());
    let params = rc.raw_decls();
    fill(
        templates::ENTRY_POINT_DECL,
        &[
            ("angle_export", angle_export),
            ("return_type", rc.return_type()),
            ("export_def", export_def),
            ("name", &name),
            ("params", &params),
        ],
    )
}

/// Forwarding function exported by the shared library.
pub fn export_shim(rc: &ResolvedCommand) -> String {
    let template = match rc.api() {
        Api::Gles => templates::GL_EXPORT,
        Api::Egl => templates::EGL_EXPORT,
        Api::Cl => templates::CL_EXPORT,
    };
    let params = rc.raw_decls();
    let names = rc.raw_names();
    fill(
        template,
        &[
            ("return_type", rc.return_type()),
            ("name", rc.short_name()),
            ("params", &params),
            ("internal_params", &names),
        ],
    )
}

/// Prototype of the hand-written implementation the entry point calls.
pub fn stub(rc: &ResolvedCommand) -> String {
    let params = match rc.api() {
        Api::Egl => rc.implementation_decls(&[ResolvedParam::fixed("Thread *", "thread")]),
        _ => rc.implementation_decls(&[]),
    };
    fill(
        templates::STUB_PROTO,
        &[
            ("return_type", rc.return_type()),
            ("short_name", rc.short_name()),
            ("params", &params),
        ],
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Format specs and print arguments of the event-tracing line.
fn event_fields(rc: &ResolvedCommand) -> Result<(String, String)> {
    let descriptors = rc
        .command
        .params
        .iter()
        .map(|p| FormatDescriptor::for_param(rc.api(), rc.name(), p))
        .collect::<Result<Vec<_>>>()?;
    let formats: Vec<&str> = descriptors.iter().map(|d| d.format.as_str()).collect();
    let arguments: Vec<&str> = descriptors.iter().map(|d| d.argument.as_str()).collect();
    Ok((formats.join(", "), arguments.join(", ")))
}

/// Version check guarding a GLES validator, plus the suffix of the
/// `RecordVersionErrorES*` helper reporting an unsupported call. A command
/// comes either from extensions only or from one core version (or one of
/// the two known version pairs); any other mix has no defined check.
fn support_condition(command: &str, sources: &[String]) -> Result<(String, String)> {
    let versions: Vec<&str> = sources
        .iter()
        .map(String::as_str)
        .filter(|s| !s.starts_with("GL_"))
        .collect();

    if versions.is_empty() {
        let mut checks: Vec<String> = sources
            .iter()
            .map(|ext| format!("context->getExtensions().{}", extension_flag(ext)))
            .collect();
        checks.sort();
        return Ok((checks.join(" || "), "EXT".to_string()));
    }

    let unsupported = || GeneratorError::MalformedSpec {
        api: Api::Gles,
        command: command.to_string(),
        text: format!("no version check for sources [{}]", sources.join(", ")),
    };
    if versions.len() != sources.len() {
        return Err(unsupported());
    }

    let mut sorted = versions.clone();
    sorted.sort();
    let suffix = versions[0].replace('_', "");
    Ok(match sorted.as_slice() {
        ["1_0", "2_0"] => ("true".to_string(), suffix),
        ["1_0", "3_2"] => (
            "context->getClientVersion() < ES_2_0 || context->getClientVersion() >= ES_3_2".to_string(),
            "1Or32".to_string(),
        ),
        ["1_0"] => ("context->getClientVersion() < ES_2_0".to_string(), suffix),
        [version] => (format!("context->getClientVersion() >= ES_{}", version), suffix),
        _ => return Err(unsupported()),
    })
}

/// `GL_OES_texture_3D` → `texture3DOES`.
fn extension_flag(extension: &str) -> String {
    let words: Vec<&str> = extension.split('_').collect();
    if words.len() < 3 {
        return extension.to_string();
    }
    let mut flag = words[2].to_string();
    for word in &words[3..] {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            flag.extend(first.to_uppercase());
            flag.push_str(chars.as_str());
        }
    }
    flag.push_str(words[1]);
    flag
}

/// The `isCallValid` block of a GLES definition; other APIs validate
/// through their own macros.
pub fn validation_expression(rc: &ResolvedCommand) -> Result<String> {
    if rc.api() != Api::Gles {
        return Ok(String::new());
    }
    let entry_point = format!("angle::EntryPoint::{}", rc.entry_point_enum());
    let private = rc.flags.lock.is_context_private();

    let mut args: Vec<String> = if private {
        vec![
            "context->getPrivateState()".to_string(),
            "context->getMutableErrorSetForValidation()".to_string(),
        ]
    } else {
        vec!["context".to_string()]
    };
    args.push(entry_point.clone());
    args.extend(rc.internal_names());
    let call = format!("Validate{}({})", rc.short_name(), args.join(", "));

    let (condition, suffix) = support_condition(rc.name(), &rc.command.sources)?;
    let record_error = if condition == "true" {
        String::new()
    } else {
        format!("else {{RecordVersionErrorES{}(context, {});}}", suffix, entry_point)
    };
    let assertion = if private {
        "ASSERT(isCallValid || context->getPushedErrorCount() != errorCount);"
    } else {
        "ASSERT(context->getPushedErrorCount() - errorCount == (isCallValid ? 0 : 1));"
    };

    Ok(fill(
        templates::GLES_VALIDATION_BLOCK,
        &[
            ("support_condition", &condition),
            ("validation_call", &call),
            ("error_count_assertion", assertion),
            ("record_error", &record_error),
        ],
    ))
}

/// Swap-prepare statement run before EGL swap and buffer-age queries.
fn swap_preamble(rc: &ResolvedCommand) -> Result<String> {
    let Some(preamble) = rc.flags.swap_preamble else {
        return Ok(String::new());
    };
    let param = |ty: &str, category: &str| {
        rc.raw_param_of_type(ty)
            .map(|p| p.raw_name.clone())
            .ok_or_else(|| GeneratorError::MissingPolicyParameter {
                command: rc.name().to_string(),
                category: category.to_string(),
            })
    };
    let display = param("EGLDisplay", "Display")?;
    let surface = param("EGLSurface", "Surface")?;
    let prepare = format!(
        "ANGLE_EGLBOOLEAN_TRY(EGL_PrepareSwapBuffersANGLE({}, {}));",
        display, surface
    );
    Ok(match preamble {
        SwapPreamble::Always => prepare,
        SwapPreamble::BufferAge => {
            format!("if (attribute == EGL_BUFFER_AGE_EXT) {{{}}}", prepare)
        }
    })
}

fn with_leading(prefix: &str, names: &[String]) -> String {
    std::iter::once(prefix.to_string())
        .chain(names.iter().cloned())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full definition of the entry point.
pub fn definition(rc: &ResolvedCommand) -> Result<String> {
    let flags = rc.flags;
    let (format_params, pass_params) = event_fields(rc)?;
    let names = rc.internal_names();
    let internal_params = names.join(", ");
    let comma_if_needed = if rc.params.is_empty() { "" } else { ", " };
    let params = rc.raw_decls();
    let packed_conversions = rc.packed_conversions();
    let entry_point = format!("angle::EntryPoint::{}", rc.entry_point_enum());

    let mut bindings: Vec<(&str, String)> = vec![
        ("name", rc.short_name().to_string()),
        ("return_type", rc.return_type().to_string()),
        ("params", params),
        ("format_params", format_params),
        ("pass_params", pass_params),
        ("comma_if_needed", comma_if_needed.to_string()),
        ("internal_params", internal_params),
        ("packed_conversions", packed_conversions),
    ];

    match rc.api() {
        Api::Gles => {
            let event_comment = if flags.suppress_event {
                templates::EVENT_COMMENT
            } else {
                ""
            };
            let resolver = crate::names::NameResolver::new(Api::Gles);
            let private_params = with_leading(
                "context->getMutablePrivateState(), context->getMutablePrivateStateCache()",
                &names,
            );
            bindings.extend([
                ("context_getter", flags.context_getter().to_string()),
                ("event_comment", event_comment.to_string()),
                ("valid_context_check", "ANGLE_LIKELY(context != nullptr)".to_string()),
                ("context_lock", flags.lock.gles_statement().to_string()),
                ("implicit_pls_disable", flags.pls_statement().to_string()),
                ("validation_expression", validation_expression(rc)?),
                ("context_method", resolver.context_method(rc.name())),
                ("canonical_name", rc.canonical_short().to_string()),
                ("private_call_params", private_params),
                ("gl_capture_params", with_leading("context", &names)),
                ("context_lost_error", flags.lost_context_error(&entry_point)),
                ("epilog", flags.tail_call.statement().to_string()),
            ]);
        }
        Api::Egl => {
            let lock_names = rc.context_lock_names();
            let context_lock_comma = if lock_names.is_empty() { "" } else { ", " };
            let egl_lock = match flags.lock {
                LockClass::EglLockless => "",
                lock => lock.egl_statement(),
            };
            bindings.extend([
                ("preamble", swap_preamble(rc)?),
                ("egl_lock", egl_lock.to_string()),
                ("context_lock_comma", context_lock_comma.to_string()),
                ("context_lock_params", lock_names.join(", ")),
                ("labeled_object", rc.labeled_object()?),
                ("attrib_map_init", rc.attrib_map_init()),
                ("egl_capture_params", with_leading("thread", &names)),
                ("epilog", flags.tail_call.statement().to_string()),
            ]);
        }
        Api::Cl => {
            let initialization = match flags.init_backends {
                Some(icd) => format!("InitBackEnds({});\n", icd),
                None => String::new(),
            };
            bindings.push(("initialization", initialization));
        }
    }

    let borrowed: Vec<(&str, &str)> = bindings.iter().map(|(k, v)| (*k, v.as_str())).collect();
    Ok(fill(definition_template(rc), &borrowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Command;
    use crate::policy::{PolicyFlags, TailCall};
    use crate::registry::{CommandSpec, Tables};

    fn command(api: Api, proto: &str, params: &[&str], sources: &[&str]) -> Command {
        let spec = CommandSpec {
            proto: proto.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            groups: Default::default(),
        };
        let mut command = Command::from_spec(api, &spec).unwrap();
        command.sources = sources.iter().map(|s| s.to_string()).collect();
        command
    }

    #[test]
    fn test_decl_per_api() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let gl = command(Api::Gles, "void glFinish", &[], &["2_0"]);
        let rc = ResolvedCommand::resolve(&gl, &flags, &tables);
        assert_eq!(declaration(&rc), "ANGLE_EXPORT void GL_APIENTRY GL_Finish();");

        let cl = command(Api::Cl, "cl_int clFinish", &["cl_command_queue command_queue"], &["1_0"]);
        let rc = ResolvedCommand::resolve(&cl, &flags, &tables);
        assert_eq!(declaration(&rc), "cl_int CL_API_CALL clFinish(cl_command_queue command_queue);");
    }

    #[test]
    fn test_support_conditions() {
        let s = |v: &[&str]| {
            support_condition("glFoo", &v.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
        };
        assert_eq!(s(&["1_0", "2_0"]).0, "true");
        assert_eq!(s(&["1_0"]).0, "context->getClientVersion() < ES_2_0");
        assert_eq!(s(&["3_1"]), ("context->getClientVersion() >= ES_3_1".to_string(), "31".to_string()));
        assert_eq!(s(&["1_0", "3_2"]).1, "1Or32");
        assert_eq!(
            s(&["GL_OES_texture_3D", "GL_EXT_draw_buffers"]),
            (
                "context->getExtensions().drawBuffersEXT || context->getExtensions().texture3DOES"
                    .to_string(),
                "EXT".to_string()
            )
        );
    }

    #[test]
    fn test_mixed_sources_have_no_support_condition() {
        let s = |v: &[&str]| {
            support_condition("glFoo", &v.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        };
        for sources in [&["2_0", "GL_OES_texture_3D"][..], &["2_0", "3_0"][..]] {
            let err = s(sources).unwrap_err();
            assert!(matches!(err, GeneratorError::MalformedSpec { ref command, .. } if command == "glFoo"));
            assert_eq!(err.code(), crate::error::EPG_MALFORMED_SPEC);
        }
    }

    #[test]
    fn test_extension_flag_camel_case() {
        assert_eq!(extension_flag("GL_ANGLE_base_vertex_base_instance"), "baseVertexBaseInstanceANGLE");
        assert_eq!(extension_flag("GL_KHR_debug"), "debugKHR");
    }

    #[test]
    fn test_context_private_template_skips_lock() {
        let tables = Tables::default();
        let flags = PolicyFlags {
            lock: LockClass::ContextPrivate,
            ..Default::default()
        };
        let cmd = command(Api::Gles, "void glClearDepthf", &["GLfloat d"], &["2_0"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        let def = definition(&rc).unwrap();
        assert!(def.contains("ContextPrivateClearDepthf(context->getMutablePrivateState(), context->getMutablePrivateStateCache(), d);"));
        assert!(!def.contains("SCOPED_SHARE_CONTEXT_LOCK"));
        assert!(def.contains("ASSERT(isCallValid || context->getPushedErrorCount() != errorCount);"));
        assert!(def.contains("ValidateClearDepthf(context->getPrivateState(), context->getMutableErrorSetForValidation(), angle::EntryPoint::GLClearDepthf, d)"));
    }

    #[test]
    fn test_egl_lockless_template() {
        let tables = Tables::default();
        let flags = PolicyFlags {
            lock: LockClass::EglLockless,
            ..Default::default()
        };
        let cmd = command(Api::Egl, "EGLint eglGetError", &[], &["1_0"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        let def = definition(&rc).unwrap();
        assert!(def.starts_with("EGLint EGLAPIENTRY EGL_GetError()"));
        assert!(!def.contains("ANGLE_SCOPED_GLOBAL_LOCK"));
        assert!(!def.contains("ANGLE_EGL_SCOPED_CONTEXT_LOCK"));
        assert!(def.contains("ANGLE_EGL_VALIDATE(thread, GetError, nullptr, EGLint);"));
    }

    #[test]
    fn test_swap_preamble_requires_surface() {
        let tables = Tables::default();
        let flags = PolicyFlags {
            swap_preamble: Some(SwapPreamble::Always),
            tail_call: TailCall::RunDiscard,
            ..Default::default()
        };
        let cmd = command(Api::Egl, "EGLBoolean eglSwapBuffers", &["EGLDisplay dpy", "EGLSurface surface"], &["1_0"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        let def = definition(&rc).unwrap();
        assert!(def.contains("ANGLE_EGLBOOLEAN_TRY(EGL_PrepareSwapBuffersANGLE(dpy, surface));"));
        assert!(def.contains("GetCurrentThreadUnlockedTailCall()->run(nullptr);"));

        let broken = command(Api::Egl, "EGLBoolean eglSwapBuffers", &["EGLDisplay dpy"], &["1_0"]);
        let rc = ResolvedCommand::resolve(&broken, &flags, &tables);
        let err = definition(&rc).unwrap_err();
        assert!(matches!(err, GeneratorError::MissingPolicyParameter { ref category, .. } if category == "Surface"));
    }

    #[test]
    fn test_cl_errcode_ret_template() {
        let tables = Tables::default();
        let flags = PolicyFlags {
            init_backends: Some(false),
            ..Default::default()
        };
        let cmd = command(
            Api::Cl,
            "cl_context clCreateContext",
            &["const cl_context_properties *properties", "cl_uint num_devices", "cl_int *errcode_ret"],
            &["1_0"],
        );
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        let def = definition(&rc).unwrap();
        assert!(def.starts_with("cl_context CL_API_CALL clCreateContext("));
        assert!(def.contains("{InitBackEnds(false);\n\n    CL_EVENT(CreateContext"));
        assert!(def.contains("ANGLE_CL_VALIDATE_ERRCODE_RET(CreateContext, properties, num_devices);"));
        assert_eq!(stub(&rc), "cl_context CreateContext(const cl_context_properties * properties, cl_uint num_devices);");
    }

    #[test]
    fn test_unknown_type_fails_definition() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let cmd = command(Api::Gles, "void glFoo", &["GLmystery value"], &["2_0"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert!(matches!(definition(&rc), Err(GeneratorError::UnknownType { .. })));
    }
}
