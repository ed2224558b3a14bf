//! Registry Fixtures for the Entry Point Generator Tests
//!
//! Small GLES, EGL and CL registries covering each lock class the pipeline
//! renders differently, an extension duplicate, a capture-blocklisted
//! command, packed resource ids and an EGL owning-object declaration.

use std::path::Path;

use crate::error::Result;
use crate::model::CommandModel;
use crate::output::OutputSet;
use crate::pipeline::generate;
use crate::registry::{LabeledObjectTable, PackedEnumTable, RegistryModel, Tables};

pub const SCRIPT: &str = "generate_entry_points.py";

pub const GLES_REGISTRY: &str = r#"{
    "api": "GLES",
    "dataSource": "gl.xml and gl_angle_ext.xml",
    "commands": [
        { "proto": "void glBindBuffer", "params": ["GLenum target", "GLuint buffer"], "groups": { "target": "BufferTargetARB" } },
        { "proto": "void glBindVertexArrayOES", "params": ["GLuint array"] },
        { "proto": "void glClearColor", "params": ["GLfloat red", "GLfloat green", "GLfloat blue", "GLfloat alpha"] },
        { "proto": "void glDrawBuffersEXT", "params": ["GLsizei n", "const GLenum *bufs"] },
        { "proto": "void glDrawBuffersNV", "params": ["GLsizei n", "const GLenum *bufs"] },
        { "proto": "GLenum glGetError" },
        { "proto": "void glGetIntegerv", "params": ["GLenum pname", "GLint *data"], "groups": { "pname": "GetPName" } },
        { "proto": "void glReleaseShaderCompiler" }
    ],
    "versions": [
        {
            "name": "2_0",
            "commands": ["glBindBuffer", "glClearColor", "glGetError", "glGetIntegerv", "glReleaseShaderCompiler"]
        }
    ],
    "extensions": [
        { "name": "GL_NV_draw_buffers", "family": "gles2", "commands": ["glDrawBuffersNV"] },
        { "name": "GL_OES_vertex_array_object", "family": "gles2", "commands": ["glBindVertexArrayOES"] },
        { "name": "GL_EXT_draw_buffers", "family": "gles2", "commands": ["glDrawBuffersEXT"] }
    ]
}"#;

pub const EGL_REGISTRY: &str = r#"{
    "api": "EGL",
    "dataSource": "egl.xml and egl_angle_ext.xml",
    "commands": [
        { "proto": "EGLBoolean eglBindAPI", "params": ["EGLenum api"] },
        { "proto": "EGLint eglGetError" },
        { "proto": "__eglMustCastToProperFunctionPointerType eglGetProcAddress", "params": ["const char *procname"] },
        { "proto": "EGLBoolean eglPresentationTimeANDROID", "params": ["EGLDisplay dpy", "EGLSurface surface", "EGLnsecsANDROID time"] },
        { "proto": "EGLBoolean eglTerminate", "params": ["EGLDisplay dpy"] }
    ],
    "versions": [
        { "name": "1_0", "commands": ["eglGetError", "eglGetProcAddress", "eglTerminate"] },
        { "name": "1_2", "commands": ["eglBindAPI"] }
    ],
    "extensions": [
        { "name": "EGL_ANDROID_presentation_time", "commands": ["eglPresentationTimeANDROID"] }
    ]
}"#;

pub const CL_REGISTRY: &str = r#"{
    "api": "CL",
    "dataSource": "cl.xml",
    "commands": [
        { "proto": "cl_int clFinish", "params": ["cl_command_queue command_queue"] },
        { "proto": "cl_int clGetPlatformIDs", "params": ["cl_uint num_entries", "cl_platform_id *platforms", "cl_uint *num_platforms"] },
        { "proto": "cl_int clIcdGetPlatformIDsKHR", "params": ["cl_uint num_entries", "cl_platform_id *platforms", "cl_uint *num_platforms"] }
    ],
    "versions": [
        { "name": "1_0", "commands": ["clGetPlatformIDs", "clFinish"] }
    ],
    "extensions": [
        { "name": "cl_khr_icd", "commands": ["clIcdGetPlatformIDsKHR"] }
    ]
}"#;

pub const GLES_PACKED: &str = r#"{
    "description": "Packed enums and resource ids of the test registry.",
    "glBindBuffer": { "target": "BufferBinding", "buffer": "BufferID" },
    "glBindVertexArray": { "array": "VertexArrayID" }
}"#;

pub const EGL_OBJECTS: &str = r#"{
    "description": "Owning objects of the test registry.",
    "Surface": ["eglPresentationTimeANDROID"]
}"#;

pub struct Fixture {
    pub gles: CommandModel,
    pub egl: CommandModel,
    pub cl: CommandModel,
    pub tables: Tables,
}

fn model(file: &str, source: &str) -> Result<CommandModel> {
    CommandModel::build(&RegistryModel::from_json(Path::new(file), source)?)
}

impl Fixture {
    pub fn load() -> Result<Self> {
        let gles_packed = PackedEnumTable::from_json(Path::new("gl_packed.json"), GLES_PACKED)?;
        let egl_objects = LabeledObjectTable::from_json(Path::new("egl_objects.json"), EGL_OBJECTS)?;
        Ok(Self {
            gles: model("gl.json", GLES_REGISTRY)?,
            egl: model("egl.json", EGL_REGISTRY)?,
            cl: model("cl.json", CL_REGISTRY)?,
            tables: Tables::new(gles_packed, PackedEnumTable::default(), egl_objects),
        })
    }

    pub fn generate(&self) -> Result<OutputSet> {
        generate(SCRIPT, &self.gles, &self.egl, &self.cl, &self.tables)
    }
}

/// Renders the fixture registries, panicking on any error.
pub fn render() -> OutputSet {
    Fixture::load()
        .and_then(|fixture| fixture.generate())
        .unwrap_or_else(|err| panic!("fixture generation failed: {} [{}]", err, err.code()))
}

/// Text of `path` in `outputs`, panicking when it was not rendered.
pub fn file<'o>(outputs: &'o OutputSet, path: &str) -> &'o str {
    outputs
        .get(path)
        .unwrap_or_else(|| panic!("{} was not rendered", path))
}

/// The definition starting at `signature`, through its closing brace.
pub fn definition<'t>(text: &'t str, signature: &str) -> &'t str {
    let start = text
        .find(signature)
        .unwrap_or_else(|| panic!("no definition starting with {}", signature));
    let rest = &text[start..];
    let end = rest.find("\n}\n").map(|i| i + 3).unwrap_or(rest.len());
    &rest[..end]
}
