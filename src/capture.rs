//! Capture Emitter for the Entry Point Generator
//!
//! Emits the capture prototype, the capture method body and the pointer
//! capture helpers of each command. Every tag a method references is
//! recorded in the `ParamTypeRegistry` as the method is rendered.

use crate::error::Result;
use crate::param_types::ParamTypeRegistry;
use crate::registry::Api;
use crate::signature::{ResolvedCommand, ResolvedParam};
use crate::templates::{self, fill};
use crate::types::{TypeDescriptor, DEFAULT_ENUM_GROUP};

/// Parameters every capture function takes ahead of the command's own.
fn capture_extras(api: Api) -> Vec<ResolvedParam> {
    let is_call_valid = ResolvedParam::fixed("bool", "isCallValid");
    match api {
        Api::Gles => vec![ResolvedParam::fixed("const State &", "glState"), is_call_valid],
        Api::Egl => vec![ResolvedParam::fixed("egl::Thread *", "thread"), is_call_valid],
        Api::Cl => vec![is_call_valid],
    }
}

fn api_upper(api: Api) -> &'static str {
    match api {
        Api::Gles => "GL",
        Api::Egl => "EGL",
        Api::Cl => "CL",
    }
}

/// `angle::CallCapture CaptureDrawArrays(const State & glState, ...);`
pub fn capture_proto(rc: &ResolvedCommand) -> String {
    let mut params = rc.internal_decls(&capture_extras(rc.api()));
    if !rc.returns_void() {
        params.push_str(&format!(", {} returnValue", rc.return_type()));
    }
    fill(
        templates::CAPTURE_PROTO,
        &[("short_name", rc.short_name()), ("params", &params)],
    )
}

/// A rendered capture method and the pointer helpers it calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureMethod {
    pub method: String,
    /// `void Capture<Short>_<param>(..., angle::ParamCapture *paramCapture);`
    pub pointer_funcs: Vec<String>,
}

/// Renders the capture method of `rc`, registering its tags.
pub fn capture_method(rc: &ResolvedCommand, registry: &mut ParamTypeRegistry) -> Result<CaptureMethod> {
    let api = rc.api();
    let extras = capture_extras(api);
    let mut params_with_type = rc.internal_decls(&extras);
    let params_just_name = extras
        .iter()
        .chain(rc.params.iter())
        .map(ResolvedParam::internal_name)
        .collect::<Vec<_>>()
        .join(", ");

    let blocklisted = rc.flags.capture_blocklisted;
    let mut captures = Vec::new();
    let mut pointer_funcs = Vec::new();

    if !blocklisted {
        for (resolved, raw) in rc.params.iter().zip(&rc.command.params) {
            let name = resolved.internal_name();
            let ty = resolved.internal_type();

            if ty.contains("AttributeMap") {
                captures.push(format!("paramBuffer.addParam(CaptureAttributeMap({}));", name));
                continue;
            }

            let tag = registry.register(api, ty)?;
            let capture = if ty.contains('*') {
                let capture_name = format!("Capture{}_{}", rc.short_name(), name);
                let cast_type = if tag == "voidPointerPointer" { "void **" } else { ty };
                pointer_funcs.push(fill(
                    templates::PARAMETER_CAPTURE_POINTER_FUNC,
                    &[
                        ("name", &capture_name),
                        ("params", &format!("{}, angle::ParamCapture *paramCapture", params_with_type)),
                    ],
                ));
                fill(
                    templates::PARAMETER_CAPTURE_POINTER,
                    &[
                        ("name", &name),
                        ("type", &tag),
                        ("capture_name", &capture_name),
                        ("params", &params_just_name),
                        ("cast_type", cast_type),
                    ],
                )
            } else if tag == "GLenum" || tag == "GLbitfield" {
                let group = raw.group.as_deref().unwrap_or(DEFAULT_ENUM_GROUP);
                fill(
                    templates::PARAMETER_CAPTURE_ENUM,
                    &[
                        ("name", &name),
                        ("api_enum", api.enum_namespace()),
                        ("group", group),
                        ("type", &tag),
                    ],
                )
            } else {
                fill(templates::PARAMETER_CAPTURE_VALUE, &[("name", &name), ("type", &tag)])
            };
            captures.push(capture);
        }
    }

    let returns_value = !TypeDescriptor::parse(rc.return_type()).is_void();
    let mut return_tag = String::new();
    if returns_value {
        if blocklisted {
            params_with_type.push_str(&format!(", {} returnValue", rc.return_type()));
        } else {
            return_tag = registry.register(api, rc.return_type())?;
        }
    }

    let parameter_captures = captures.join("\n    ");
    let bindings = [
        ("api_upper", api_upper(api)),
        ("short_name", rc.short_name()),
        ("params_with_type", params_with_type.as_str()),
        ("parameter_captures", parameter_captures.as_str()),
        ("return_value_type_original", rc.return_type()),
        ("return_value_type_custom", return_tag.as_str()),
    ];
    let template = if returns_value && !blocklisted {
        templates::CAPTURE_METHOD_WITH_RETURN_VALUE
    } else {
        templates::CAPTURE_METHOD_NO_RETURN_VALUE
    };

    Ok(CaptureMethod {
        method: fill(template, &bindings),
        pointer_funcs,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILES
// ═══════════════════════════════════════════════════════════════════════════════

/// Naming of one capture header/source pair.
#[derive(Debug, Clone)]
pub struct CaptureFile {
    pub api: Api,
    /// `gles_2_0`, `gles_ext`, `egl` or `cl`.
    pub annotation: String,
    /// Suffix of the validation header the source includes.
    pub validation_annotation: String,
    pub comment: String,
}

impl CaptureFile {
    fn copyright_year(&self) -> &'static str {
        if self.api == Api::Cl {
            "2025"
        } else {
            "2020"
        }
    }

    fn api_name(&self) -> &'static str {
        if self.api == Api::Cl {
            "OpenCL"
        } else {
            "OpenGL ES"
        }
    }

    fn namespace(&self) -> &'static str {
        self.api.cpp_namespace()
    }

    pub fn header(&self, script: &str, source: &str, protos: &[String], pointer_funcs: &[String]) -> String {
        let mut combined = vec!["\n// Method Captures\n".to_string()];
        combined.extend(protos.iter().cloned());
        if !pointer_funcs.is_empty() {
            combined.push("\n// Parameter Captures\n".to_string());
            combined.extend(pointer_funcs.iter().cloned());
        }
        let prototypes = combined.join("\n");
        fill(
            templates::CAPTURE_HEADER,
            &[
                ("script_name", script),
                ("data_source_name", source),
                ("copyright_year", self.copyright_year()),
                ("annotation_lower", &self.annotation.to_lowercase()),
                ("annotation_upper", &self.annotation.to_uppercase()),
                ("api", self.api_name()),
                ("comment", &self.comment),
                ("namespace", self.namespace()),
                ("prototypes", &prototypes),
            ],
        )
    }

    pub fn source(&self, script: &str, source: &str, methods: &[String]) -> String {
        let capture_methods = methods.join("\n");
        fill(
            templates::CAPTURE_SOURCE,
            &[
                ("script_name", script),
                ("data_source_name", source),
                ("copyright_year", self.copyright_year()),
                ("annotation_with_dash", &self.annotation),
                ("annotation_no_dash", &self.validation_annotation),
                ("api", self.api_name()),
                ("comment", &self.comment),
                ("namespace", self.namespace()),
                ("capture_methods", &capture_methods),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Command;
    use crate::policy::PolicyFlags;
    use crate::registry::{CommandSpec, Tables};

    fn command(api: Api, proto: &str, params: &[&str]) -> Command {
        let spec = CommandSpec {
            proto: proto.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            groups: [("target".to_string(), "BufferTargetARB".to_string())]
                .into_iter()
                .collect(),
        };
        Command::from_spec(api, &spec).unwrap()
    }

    #[test]
    fn test_enum_and_value_captures() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let cmd = command(Api::Gles, "void glBindBuffer", &["GLenum target", "GLuint buffer"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        let mut registry = ParamTypeRegistry::new();
        let captured = capture_method(&rc, &mut registry).unwrap();
        assert!(captured.method.contains(
            r#"paramBuffer.addEnumParam("target", GLESEnum::BufferTargetARB, ParamType::TGLenum, target);"#
        ));
        assert!(captured.method.contains(r#"paramBuffer.addValueParam("buffer", ParamType::TGLuint, buffer);"#));
        assert!(captured.method.contains("angle::EntryPoint::GLBindBuffer"));
        assert!(captured.pointer_funcs.is_empty());
        assert!(registry.contains("GLenum") && registry.contains("GLuint"));
    }

    #[test]
    fn test_pointer_capture_helper() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let cmd = command(Api::Gles, "void glGenBuffers", &["GLsizei n", "GLuint *buffers"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        let mut registry = ParamTypeRegistry::new();
        let captured = capture_method(&rc, &mut registry).unwrap();
        assert!(captured
            .method
            .contains("CaptureGenBuffers_buffers(glState, isCallValid, n, buffers, &buffersParam);"));
        assert!(captured.method.contains("static_cast<GLuint *>(nullptr)"));
        assert_eq!(
            captured.pointer_funcs,
            vec!["void CaptureGenBuffers_buffers(const State & glState, bool isCallValid, GLsizei n, GLuint * buffers, angle::ParamCapture *paramCapture);"]
        );
        assert!(registry.contains("GLuintPointer"));
    }

    #[test]
    fn test_blocklisted_method_has_no_captures() {
        let tables = Tables::default();
        let flags = PolicyFlags {
            capture_blocklisted: true,
            ..Default::default()
        };
        let cmd = command(
            Api::Egl,
            "__eglMustCastToProperFunctionPointerType eglGetProcAddress",
            &["const char *procname"],
        );
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        let mut registry = ParamTypeRegistry::new();
        let captured = capture_method(&rc, &mut registry).unwrap();
        assert!(!captured.method.contains("paramBuffer.add"));
        assert!(captured.method.starts_with(
            "CallCapture CaptureGetProcAddress(egl::Thread * thread, bool isCallValid, const char * procname, __eglMustCastToProperFunctionPointerType returnValue)"
        ));
        assert!(captured.pointer_funcs.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_return_value_tag_registered() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let cmd = command(Api::Gles, "GLboolean glIsBuffer", &["GLuint buffer"]);
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        assert_eq!(
            capture_proto(&rc),
            "angle::CallCapture CaptureIsBuffer(const State & glState, bool isCallValid, GLuint buffer, GLboolean returnValue);"
        );
        let mut registry = ParamTypeRegistry::new();
        let captured = capture_method(&rc, &mut registry).unwrap();
        assert!(captured.method.contains(r#"ParamCapture returnValueCapture("returnValue", ParamType::TGLboolean);"#));
        assert!(registry.contains("GLboolean"));
    }

    #[test]
    fn test_cl_capture_keeps_errcode_ret() {
        let tables = Tables::default();
        let flags = PolicyFlags::default();
        let cmd = command(
            Api::Cl,
            "cl_mem clCreateBuffer",
            &["cl_context context", "cl_mem_flags flags", "size_t size", "void *host_ptr", "cl_int *errcode_ret"],
        );
        let rc = ResolvedCommand::resolve(&cmd, &flags, &tables);
        let mut registry = ParamTypeRegistry::new();
        let captured = capture_method(&rc, &mut registry).unwrap();
        assert!(captured.method.contains("angle::EntryPoint::CLCreateBuffer"));
        assert_eq!(captured.pointer_funcs.len(), 2);
        assert!(registry.contains("MemFlags"));
        let cl_only: Vec<_> = registry.cl_only_tags().map(|(t, _)| t.to_string()).collect();
        assert!(cl_only.contains(&"cl_mem".to_string()));
    }

    #[test]
    fn test_capture_header_sections() {
        let file = CaptureFile {
            api: Api::Egl,
            annotation: "egl".to_string(),
            validation_annotation: "EGL".to_string(),
            comment: "EGL".to_string(),
        };
        let header = file.header("gen", "egl.xml", &["proto;".to_string()], &[]);
        assert!(header.contains("\n// Method Captures\n\nproto;"));
        assert!(!header.contains("Parameter Captures"));
        assert!(header.contains("namespace egl\n{"));
        assert!(header.contains("Copyright 2020"));
    }
}
