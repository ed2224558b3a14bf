//! Pipeline Scenario Tests for the Entry Point Generator
//!
//! End-to-end runs over the fixture registries, checking the rendered
//! catalog rather than individual emitters.

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use regex::Regex;
    use std::collections::BTreeSet;

    use crate::error::{GeneratorError, EPG_INVALID_INPUT, EPG_UNKNOWN_TYPE};
    use crate::model::CommandModel;
    use crate::output::GENERATED_MARKERS;
    use crate::registry::RegistryModel;
    use crate::test_fixtures::{definition, file, render, Fixture};
    use std::path::Path;

    const GLES_2_0_SOURCE: &str = "src/libGLESv2/entry_points_gles_2_0_autogen.cpp";
    const GLES_EXT_SOURCE: &str = "src/libGLESv2/entry_points_gles_ext_autogen.cpp";
    const UTILS_HEADER: &str = "src/common/frame_capture_utils_autogen.h";
    const REPLAY_SOURCE: &str = "util/capture/frame_capture_replay_autogen.cpp";

    // ═══════════════════════════════════════════════════════════════════════════════
    // CATALOG
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_catalog_names_every_artifact() {
        let outputs = render();
        for path in [
            "src/common/entry_points_enum_autogen.cpp",
            "src/common/entry_points_enum_autogen.h",
            "src/common/frame_capture_utils_autogen.cpp",
            "src/common/frame_capture_utils_autogen.h",
            "src/libANGLE/Context_gles_2_0_autogen.h",
            "src/libANGLE/Context_gles_ext_autogen.h",
            "src/libANGLE/capture/capture_cl_autogen.cpp",
            "src/libANGLE/capture/capture_egl_autogen.h",
            "src/libANGLE/capture/capture_gles_2_0_autogen.cpp",
            "src/libANGLE/capture/capture_gles_ext_autogen.h",
            "src/libANGLE/context_private_call_autogen.h",
            "src/libANGLE/validationCL_autogen.h",
            "src/libANGLE/validationEGL_autogen.h",
            "src/libANGLE/validationES2_autogen.h",
            "src/libANGLE/validationESEXT_autogen.h",
            "src/libEGL/libEGL_autogen.cpp",
            "src/libEGL/libEGL_autogen.def",
            "src/libEGL/libEGL_vulkan_secondaries_autogen.def",
            "src/libGLESv2/cl_stubs_autogen.h",
            "src/libGLESv2/egl_context_lock_autogen.h",
            "src/libGLESv2/egl_ext_stubs_autogen.h",
            "src/libGLESv2/egl_stubs_autogen.h",
            "src/libGLESv2/entry_points_cl_autogen.cpp",
            "src/libGLESv2/entry_points_egl_autogen.h",
            "src/libGLESv2/entry_points_egl_ext_autogen.cpp",
            "src/libGLESv2/entry_points_gles_2_0_autogen.h",
            "src/libGLESv2/libGLESv2_autogen.cpp",
            "src/libGLESv2/libGLESv2_autogen.def",
            "src/libGLESv2/libGLESv2_no_capture_autogen.def",
            "src/libGLESv2/libGLESv2_with_capture_autogen.def",
            "src/libGLESv2/libGLESv2_vulkan_secondaries_autogen.def",
            "src/libOpenCL/libOpenCL_autogen.cpp",
            REPLAY_SOURCE,
        ] {
            assert!(outputs.contains(path), "missing {}", path);
        }
    }

    #[test]
    fn test_every_output_starts_with_generated_marker() {
        let outputs = render();
        for (path, text) in outputs.iter() {
            assert!(
                GENERATED_MARKERS.iter().any(|marker| text.starts_with(marker)),
                "{} has no generated marker",
                path.display()
            );
            assert!(
                text.contains("generate_entry_points.py"),
                "{} does not cite the script",
                path.display()
            );
        }
    }

    #[test]
    fn test_no_template_placeholder_reaches_output() {
        let placeholder = Regex::new(r"\{[a-z_]+\}").unwrap();
        let outputs = render();
        for (path, text) in outputs.iter() {
            assert!(
                placeholder.find(text).is_none(),
                "{} keeps an unfilled placeholder {:?}",
                path.display(),
                placeholder.find(text).map(|m| m.as_str())
            );
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(render(), render());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DEFINITIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_standard_lock_definition() {
        let outputs = render();
        let text = file(&outputs, GLES_2_0_SOURCE);
        let def = definition(text, "void GL_APIENTRY GL_ReleaseShaderCompiler()");
        assert!(def.contains("Context *context = GetValidGlobalContext();"));
        assert!(def.contains("SCOPED_SHARE_CONTEXT_LOCK(context);"));
        assert!(def.contains("context->releaseShaderCompiler();"));
        assert!(def.contains(
            "GenerateContextLostErrorOnCurrentGlobalContext(angle::EntryPoint::GLReleaseShaderCompiler);"
        ));
        assert!(def.ends_with(
            "    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());\n}\n"
        ));
    }

    #[test]
    fn test_lock_classes_are_exclusive() {
        let outputs = render();
        let text = file(&outputs, GLES_2_0_SOURCE);

        let private = definition(text, "void GL_APIENTRY GL_ClearColor(");
        assert!(!private.contains("SCOPED_SHARE_CONTEXT_LOCK"));
        assert!(private.contains("ContextPrivateClearColor("));

        let skip_share_group = definition(text, "void GL_APIENTRY GL_BindBuffer(");
        assert!(!skip_share_group.contains("SCOPED_SHARE_CONTEXT_LOCK"));
        assert!(skip_share_group.contains("context->bindBuffer(targetPacked, bufferPacked);"));

        let private_calls = file(&outputs, "src/libANGLE/context_private_call_autogen.h");
        assert_eq!(private_calls.matches("ContextPrivateClearColor(").count(), 1);
        assert!(!private_calls.contains("ContextPrivateBindBuffer("));
    }

    #[test]
    fn test_lost_context_tolerant_getter() {
        let outputs = render();
        let text = file(&outputs, GLES_2_0_SOURCE);
        let def = definition(text, "GLenum GL_APIENTRY GL_GetError()");
        assert!(def.contains("Context *context = GetGlobalContext();"));
        assert!(!def.contains("GenerateContextLostErrorOnCurrentGlobalContext"));
    }

    #[test]
    fn test_egl_owning_object_from_table() {
        let outputs = render();
        let text = file(&outputs, "src/libGLESv2/entry_points_egl_ext_autogen.cpp");
        assert!(text.contains("GetSurfaceIfValid(dpyPacked, surfacePacked)"));

        let core = file(&outputs, "src/libGLESv2/entry_points_egl_autogen.cpp");
        assert!(core.contains("ANGLE_SCOPED_GLOBAL_EGL_AND_EGL_SYNC_LOCK();"));
        let get_error = definition(core, "EGLint EGLAPIENTRY EGL_GetError()");
        assert!(!get_error.contains("ANGLE_SCOPED_GLOBAL_LOCK"));
    }

    #[test]
    fn test_cl_back_end_initialization() {
        let outputs = render();
        let text = file(&outputs, "src/libGLESv2/entry_points_cl_autogen.cpp");
        assert!(text.contains("InitBackEnds(false);"));
        assert!(text.contains("InitBackEnds(true);"));
        assert!(text.contains("namespace cl\n{"));
        assert!(text.contains("\n// cl_khr_icd"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DUPLICATES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_duplicate_extension_command_is_marked_once() {
        let outputs = render();
        let defs = file(&outputs, GLES_EXT_SOURCE);
        assert!(defs.contains("GL_DrawBuffersEXT("));
        assert!(!defs.contains("GL_DrawBuffersNV("));
        assert_eq!(defs.matches("// DrawBuffersNV is already defined.").count(), 1);

        let decls = file(&outputs, "src/libGLESv2/entry_points_gles_ext_autogen.h");
        assert!(!decls.contains("DrawBuffersNV"));

        let def_file = file(&outputs, "src/libGLESv2/libGLESv2_autogen.def");
        assert!(def_file.contains("\n    ; GL_NV_draw_buffers"));
        assert!(def_file.contains("\n    glDrawBuffersEXT"));
        assert!(!def_file.contains("glDrawBuffersNV"));

        let enums = file(&outputs, "src/common/entry_points_enum_autogen.h");
        assert!(enums.contains("    GLDrawBuffersNV,"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CAPTURE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_pointer_parameter_helper_and_prototype() {
        let outputs = render();
        let header = file(&outputs, "src/libANGLE/capture/capture_gles_ext_autogen.h");
        let helper = header
            .lines()
            .find(|line| line.starts_with("void CaptureDrawBuffersEXT_bufs("))
            .unwrap_or_else(|| panic!("no pointer helper prototype"));
        assert!(helper.contains("bool isCallValid"));
        assert!(helper.ends_with("angle::ParamCapture *paramCapture);"));

        let source = file(&outputs, "src/libANGLE/capture/capture_gles_ext_autogen.cpp");
        assert!(source.contains("CaptureDrawBuffersEXT_bufs(glState, isCallValid, n, bufs, &bufsParam);"));
        assert!(source.contains("InitParamValue(ParamType::TGLenumConstPointer, static_cast<const GLenum *>(nullptr), &bufsParam.value);"));
    }

    #[test]
    fn test_blocklisted_command_captures_no_parameters() {
        let outputs = render();
        let source = file(&outputs, "src/libANGLE/capture/capture_egl_autogen.cpp");
        let method = definition(source, "CallCapture CaptureGetProcAddress(");
        assert!(!method.contains("paramBuffer.add"));
        assert!(method.contains("returnValue"));

        let terminate = definition(source, "CallCapture CaptureTerminate(");
        assert!(terminate.contains("paramBuffer.add"));
    }

    #[test]
    fn test_every_referenced_tag_is_registered() {
        let outputs = render();
        let header = file(&outputs, UTILS_HEADER);
        let tag = Regex::new(r"ParamType::T([A-Za-z0-9_]+)").unwrap();

        let mut referenced = BTreeSet::new();
        for (path, text) in outputs.iter() {
            if !path.starts_with("src/libANGLE/capture") {
                continue;
            }
            referenced.extend(tag.captures_iter(text).map(|c| c[1].to_string()));
        }
        assert!(referenced.contains("GLenumConstPointer"));
        assert!(referenced.contains("BufferID"));
        for tag in &referenced {
            assert!(header.contains(&format!("T{},", tag)), "tag {} not registered", tag);
        }
        assert!(header.contains("TGLint64,"));
    }

    #[test]
    fn test_resource_ids_and_replay_lookup() {
        let outputs = render();
        let header = file(&outputs, UTILS_HEADER);
        assert!(header.contains("    Buffer,"));
        assert!(header.contains("    VertexArray,"));
        assert!(header.contains("EnumCount"));

        let replay = file(&outputs, REPLAY_SOURCE);
        assert!(replay.contains(
            "glBindBuffer(captures[0].value.GLenumVal, gBufferMap[captures[1].value.GLuintVal]);"
        ));
        assert!(replay.contains("glBindVertexArrayOES(gVertexArrayMap[captures[0].value.GLuintVal]);"));
        assert!(replay.contains("case angle::EntryPoint::EGLTerminate:"));
        assert!(!replay.contains("clFinish"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // EXPORTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_def_files_carry_both_apis() {
        let outputs = render();
        let gles = file(&outputs, "src/libGLESv2/libGLESv2_autogen.def");
        assert!(gles.contains("LIBRARY libGLESv2\n"));
        assert!(gles.contains("\n    ; OpenGL ES 2.0\n    glBindBuffer\n    glClearColor"));
        assert!(gles.contains("\n    ; EGL 1.2\n    EGL_BindAPI"));
        assert!(gles.contains("Khronos and ANGLE XML files"));

        let variant = file(&outputs, "src/libGLESv2/libGLESv2_no_capture_autogen.def");
        assert!(variant.contains("LIBRARY libGLESv2_no_capture\n"));

        let egl = file(&outputs, "src/libEGL/libEGL_autogen.def");
        assert!(egl.contains("\n    ; EGL 1.0\n    eglGetError\n    eglGetProcAddress\n    eglTerminate"));
        assert!(!egl.contains("EGL_BindAPI"));
    }

    #[test]
    fn test_entry_point_enum_starts_with_invalid() {
        let outputs = render();
        let header = file(&outputs, "src/common/entry_points_enum_autogen.h");
        assert!(header.contains("    Invalid,\n    CLFinish,"));
        let source = file(&outputs, "src/common/entry_points_enum_autogen.cpp");
        assert!(source.contains("case EntryPoint::GLReleaseShaderCompiler:\n            return \"glReleaseShaderCompiler\";"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // FAILURES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_unknown_type_aborts_run() {
        let mut fixture = Fixture::load().unwrap();
        let registry = RegistryModel::from_json(
            Path::new("gl.json"),
            r#"{
                "api": "GLES",
                "dataSource": "gl.xml",
                "commands": [{ "proto": "void glMystery", "params": ["GLmystery value"] }],
                "versions": [{ "name": "2_0", "commands": ["glMystery"] }]
            }"#,
        )
        .unwrap();
        fixture.gles = CommandModel::build(&registry).unwrap();

        let err = fixture.generate().unwrap_err();
        assert_eq!(err.code(), EPG_UNKNOWN_TYPE);
        match err {
            GeneratorError::UnknownType { command, ty, .. } => {
                assert_eq!(command, "glMystery");
                assert_eq!(ty, "GLmystery");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_swapped_registries_are_rejected() {
        let fixture = Fixture::load().unwrap();
        let err = crate::pipeline::generate(
            "gen",
            &fixture.egl,
            &fixture.gles,
            &fixture.cl,
            &fixture.tables,
        )
        .unwrap_err();
        assert_eq!(err.code(), EPG_INVALID_INPUT);
    }
}
