//! Type Classification for the Entry Point Generator
//!
//! A raw C type string is parsed once into a `TypeDescriptor` (base name,
//! namespace, pointer depth, const, signedness, callback shape). Capture
//! tags, union member types, replay spellings and resource-id categories are
//! all rendered from the descriptor on demand.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::error::{GeneratorError, Result};
use crate::model::Param;
use crate::registry::Api;

// ═══════════════════════════════════════════════════════════════════════════════
// PACKED TYPE TABLES
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref CL_PACKED_TYPES: HashMap<&'static str, &'static str> = [
        // Enums
        ("cl_platform_info", "PlatformInfo"),
        ("cl_device_info", "DeviceInfo"),
        ("cl_context_info", "ContextInfo"),
        ("cl_command_queue_info", "CommandQueueInfo"),
        ("cl_mem_object_type", "MemObjectType"),
        ("cl_mem_info", "MemInfo"),
        ("cl_image_info", "ImageInfo"),
        ("cl_pipe_info", "PipeInfo"),
        ("cl_addressing_mode", "AddressingMode"),
        ("cl_filter_mode", "FilterMode"),
        ("cl_sampler_info", "SamplerInfo"),
        ("cl_program_info", "ProgramInfo"),
        ("cl_program_build_info", "ProgramBuildInfo"),
        ("cl_kernel_info", "KernelInfo"),
        ("cl_kernel_arg_info", "KernelArgInfo"),
        ("cl_kernel_work_group_info", "KernelWorkGroupInfo"),
        ("cl_kernel_sub_group_info", "KernelSubGroupInfo"),
        ("cl_kernel_exec_info", "KernelExecInfo"),
        ("cl_event_info", "EventInfo"),
        ("cl_profiling_info", "ProfilingInfo"),
        // Bit fields
        ("cl_device_type", "DeviceType"),
        ("cl_device_fp_config", "DeviceFpConfig"),
        ("cl_device_exec_capabilities", "DeviceExecCapabilities"),
        ("cl_device_svm_capabilities", "DeviceSvmCapabilities"),
        ("cl_command_queue_properties", "CommandQueueProperties"),
        ("cl_device_affinity_domain", "DeviceAffinityDomain"),
        ("cl_mem_flags", "MemFlags"),
        ("cl_svm_mem_flags", "SVM_MemFlags"),
        ("cl_mem_migration_flags", "MemMigrationFlags"),
        ("cl_map_flags", "MapFlags"),
        ("cl_kernel_arg_type_qualifier", "KernelArgTypeQualifier"),
        ("cl_device_atomic_capabilities", "DeviceAtomicCapabilities"),
        ("cl_device_device_enqueue_capabilities", "DeviceEnqueueCapabilities"),
    ]
    .into_iter()
    .collect();

    static ref EGL_PACKED_TYPES: HashMap<&'static str, &'static str> = [
        ("EGLContext", "gl::ContextID"),
        ("EGLConfig", "egl::Config *"),
        ("EGLDeviceEXT", "egl::Device *"),
        ("EGLDisplay", "egl::Display *"),
        ("EGLImage", "ImageID"),
        ("EGLImageKHR", "ImageID"),
        ("EGLStreamKHR", "egl::Stream *"),
        ("EGLSurface", "SurfaceID"),
        ("EGLSync", "egl::SyncID"),
        ("EGLSyncKHR", "egl::SyncID"),
    ]
    .into_iter()
    .collect();

    /// Bare names rendered in the `egl` namespace.
    static ref EGL_NAMESPACE: Vec<&'static str> =
        vec!["CompositorTiming", "ObjectType", "Timestamp", "ImageID", "SurfaceID"];
}

/// API-wide raw type → packed type substitution.
pub fn packed_param_type(api: Api, raw: &str) -> Option<&'static str> {
    match api {
        Api::Gles => None,
        Api::Egl => EGL_PACKED_TYPES.get(raw).copied(),
        Api::Cl => CL_PACKED_TYPES.get(raw).copied(),
    }
}

/// Raw EGL handle types; replay reads them back as plain pointers.
pub fn is_egl_handle_type(raw: &str) -> bool {
    EGL_PACKED_TYPES.contains_key(raw)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TYPE DESCRIPTOR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    None,
    Gl,
    Egl,
    Cl,
}

impl Namespace {
    fn qualifier(self) -> &'static str {
        match self {
            Namespace::None => "",
            Namespace::Gl => "gl::",
            Namespace::Egl => "egl::",
            Namespace::Cl => "cl::",
        }
    }
}

/// Function-pointer shapes accepted by OpenCL entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackShape {
    ContextNotify,
    ProgramNotify,
    EventNotify,
    SvmFree,
    ContextDestructor,
    MemDestructor,
    Void,
}

impl CallbackShape {
    /// Picks the shape from distinguishing substrings of the declaration.
    fn detect(ty: &str) -> Self {
        if ty.contains("errinfo") {
            CallbackShape::ContextNotify
        } else if ty.contains("cl_program") {
            CallbackShape::ProgramNotify
        } else if ty.contains("cl_event") {
            CallbackShape::EventNotify
        } else if ty.contains("cl_command_queue") {
            CallbackShape::SvmFree
        } else if ty.contains("cl_context") {
            CallbackShape::ContextDestructor
        } else if ty.contains("cl_mem") {
            CallbackShape::MemDestructor
        } else {
            CallbackShape::Void
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            CallbackShape::ContextNotify => "cl_context_func_type",
            CallbackShape::ProgramNotify => "cl_program_func_type",
            CallbackShape::EventNotify => "cl_callback_func_type",
            CallbackShape::SvmFree => "cl_svm_free_callback_func_type",
            CallbackShape::ContextDestructor => "cl_context_destructor_func_type",
            CallbackShape::MemDestructor => "cl_mem_destructor_func_type",
            CallbackShape::Void => "cl_void_func_type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// Base name with qualifiers, pointer markers and namespace removed.
    pub base: String,
    pub namespace: Namespace,
    /// `egl::` pointer and sync types keep an `egl_` prefix in their tag.
    pub tag_qualified: bool,
    pub pointer_depth: usize,
    pub is_const: bool,
    pub is_unsigned: bool,
    pub callback: Option<CallbackShape>,
}

/// Look-alike suffixes that end in `ID` but are not resource ids.
const RESOURCE_ID_DENYLIST: &[&str] = &["ANDROID"];

fn is_id_name(name: &str) -> bool {
    name.ends_with("ID") && !RESOURCE_ID_DENYLIST.iter().any(|d| name.ends_with(d))
}

fn infer_namespace(base: &str) -> Namespace {
    if base.starts_with("GL")
        || base.starts_with("EGL")
        || base.starts_with("cl_")
        || base.starts_with("wl_")
        || base.starts_with("AHardwareBuffer")
        || base.contains("void")
        || base == "char"
        || base == "size_t"
        || base.ends_with("func_type")
    {
        Namespace::None
    } else if EGL_NAMESPACE.contains(&base) {
        Namespace::Egl
    } else if CL_PACKED_TYPES.values().any(|v| *v == base) {
        Namespace::Cl
    } else {
        Namespace::Gl
    }
}

impl TypeDescriptor {
    /// Classifies a type as spelled in a declaration, packed or raw.
    pub fn parse(ty: &str) -> Self {
        if ty.contains("CL_CALLBACK") {
            let shape = CallbackShape::detect(ty);
            return TypeDescriptor {
                base: shape.tag().to_string(),
                namespace: Namespace::None,
                tag_qualified: false,
                pointer_depth: 0,
                is_const: false,
                is_unsigned: false,
                callback: Some(shape),
            };
        }

        let pointer_depth = ty.matches('*').count() + ty.matches("[]").count();
        let stripped = ty.replace("[]", " ").replace(['*', '&'], " ");

        let mut is_const = false;
        let mut is_unsigned = false;
        let mut words = Vec::new();
        for word in stripped.split_whitespace() {
            match word {
                "const" => is_const = true,
                "unsigned" => is_unsigned = true,
                "struct" => {}
                other => words.push(other),
            }
        }
        let mut base = words.join(" ");

        let (namespace, tag_qualified) = if let Some(rest) = base.strip_prefix("egl::") {
            let qualified = pointer_depth > 0 || rest == "SyncID";
            base = rest.to_string();
            (Namespace::Egl, qualified)
        } else if let Some(rest) = base.strip_prefix("gl::") {
            base = rest.to_string();
            (Namespace::Gl, false)
        } else {
            (infer_namespace(&base), false)
        };

        TypeDescriptor {
            base,
            namespace,
            tag_qualified,
            pointer_depth,
            is_const,
            is_unsigned,
            callback: None,
        }
    }

    fn effective_const(&self) -> bool {
        self.is_const && self.base != "AttributeMap"
    }

    /// Tag without const or pointer decorations.
    pub fn tag_base(&self) -> String {
        if let Some(shape) = self.callback {
            return shape.tag().to_string();
        }
        let prefix = if self.tag_qualified { "egl_" } else { "" };
        let unsigned = if self.is_unsigned { "Unsigned" } else { "" };
        format!("{}{}{}", prefix, self.base, unsigned)
    }

    /// Canonical capture tag, e.g. `const GLchar *const*` → `GLcharConstPointerPointer`.
    pub fn tag(&self) -> String {
        let mut tag = self.tag_base();
        if self.callback.is_some() {
            return tag;
        }
        if self.effective_const() {
            tag.push_str("Const");
        }
        for _ in 0..self.pointer_depth {
            tag.push_str("Pointer");
        }
        tag
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }

    pub fn is_void(&self) -> bool {
        self.callback.is_none() && self.pointer_depth == 0 && self.base == "void"
    }

    fn render(&self, core: &str, is_const: bool) -> String {
        match (self.pointer_depth, is_const) {
            (0, false) => core.to_string(),
            (0, true) => format!("const {}", core),
            (1, false) => format!("{} *", core),
            (1, true) => format!("const {} *", core),
            (2, true) if self.base == "GLchar" => format!("const {} *const *", core),
            (depth, false) => format!("{} {}", core, "*".repeat(depth)),
            (depth, true) => format!("const {} {}", core, "*".repeat(depth)),
        }
    }

    /// C++ type of the union member carrying values of this tag.
    pub fn spelling(&self) -> String {
        if let Some(shape) = self.callback {
            return shape.tag().to_string();
        }
        let unsigned = if self.is_unsigned { "unsigned " } else { "" };
        let core = format!("{}{}{}", unsigned, self.namespace.qualifier(), self.base);
        self.render(&core, self.effective_const())
    }

    /// Type name reported by `ParamTypeToString`: packed enums read back as
    /// `GLenum`, resource ids as `GLuint`.
    pub fn replay_spelling(&self) -> String {
        let tag_base = self.tag_base();
        let is_packed_enum =
            !tag_base.starts_with("GL") && !tag_base.starts_with("EGL") && !tag_base.contains("void");
        if !is_packed_enum {
            return self.render_plain();
        }
        if is_id_name(&tag_base) {
            self.render("GLuint", self.effective_const())
        } else if tag_base.contains("size_t") {
            self.render("size_t", self.effective_const())
        } else if tag_base.starts_with("cl_") || tag_base.starts_with("char") {
            if self.callback.is_some() {
                return tag_base;
            }
            self.render_plain()
        } else {
            self.render("GLenum", self.effective_const())
        }
    }

    fn render_plain(&self) -> String {
        let unsigned = if self.is_unsigned { "unsigned " } else { "" };
        let prefix = if self.tag_qualified { "egl_" } else { "" };
        self.render(&format!("{}{}{}", unsigned, prefix, self.base), self.effective_const())
    }

    /// Resource category for plain id tags, e.g. `BufferID` → `Buffer`.
    pub fn resource_id(&self) -> Option<String> {
        if self.callback.is_some() || self.pointer_depth > 0 || self.effective_const() {
            return None;
        }
        let tag = self.tag_base();
        is_id_name(&tag).then(|| tag[..tag.len() - 2].to_string())
    }

    /// Resource category for id arrays, e.g. `const GLuint`-backed `BufferIDConstPointer`.
    pub fn resource_id_of_pointee(&self) -> Option<String> {
        if self.callback.is_some() || self.pointer_depth != 1 {
            return None;
        }
        let tag = self.tag_base();
        is_id_name(&tag).then(|| tag[..tag.len() - 2].to_string())
    }
}

/// Spelling of a resource id type as a C++ type, e.g. `Buffer` → `gl::BufferID`.
pub fn resource_id_type_spelling(resource: &str) -> String {
    TypeDescriptor::parse(&restore_tag_namespace(&format!("{}ID", resource))).spelling()
}

/// Inverse of the `egl_` tag prefix so a tag name parses back to its type.
fn restore_tag_namespace(tag: &str) -> String {
    match tag.strip_prefix("egl_") {
        Some(rest) => format!("egl::{}", rest),
        None => tag.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FORMAT DESCRIPTORS
// ═══════════════════════════════════════════════════════════════════════════════

pub const POINTER_FORMAT: &str = "0x%016\" PRIxPTR \"";
const UNSIGNED_LONG_LONG_FORMAT: &str = "%llu";
const HEX_LONG_LONG_FORMAT: &str = "0x%llX";

lazy_static! {
    static ref FORMAT_DICT: HashMap<&'static str, &'static str> = [
        ("GLbitfield", "%s"),
        ("GLboolean", "%s"),
        ("GLbyte", "%d"),
        ("GLclampx", "0x%X"),
        ("GLDEBUGPROC", POINTER_FORMAT),
        ("GLDEBUGPROCKHR", POINTER_FORMAT),
        ("GLdouble", "%f"),
        ("GLeglClientBufferEXT", POINTER_FORMAT),
        ("GLeglImageOES", POINTER_FORMAT),
        ("GLenum", "%s"),
        ("GLfixed", "0x%X"),
        ("GLfloat", "%f"),
        ("GLGETBLOBPROCANGLE", POINTER_FORMAT),
        ("GLint", "%d"),
        ("GLintptr", UNSIGNED_LONG_LONG_FORMAT),
        ("GLSETBLOBPROCANGLE", POINTER_FORMAT),
        ("GLMTLRasterizationRateMapANGLE", POINTER_FORMAT),
        ("GLshort", "%d"),
        ("GLsizei", "%d"),
        ("GLsizeiptr", UNSIGNED_LONG_LONG_FORMAT),
        ("GLsync", POINTER_FORMAT),
        ("GLubyte", "%d"),
        ("GLuint", "%u"),
        ("GLuint64", UNSIGNED_LONG_LONG_FORMAT),
        ("GLushort", "%u"),
        ("int", "%d"),
        // EGL
        ("EGLBoolean", "%u"),
        ("EGLConfig", POINTER_FORMAT),
        ("EGLContext", POINTER_FORMAT),
        ("EGLDisplay", POINTER_FORMAT),
        ("EGLSurface", POINTER_FORMAT),
        ("EGLSync", POINTER_FORMAT),
        ("EGLNativeDisplayType", POINTER_FORMAT),
        ("EGLNativePixmapType", POINTER_FORMAT),
        ("EGLNativeWindowType", POINTER_FORMAT),
        ("EGLClientBuffer", POINTER_FORMAT),
        ("EGLenum", "0x%X"),
        ("EGLint", "%d"),
        ("EGLImage", POINTER_FORMAT),
        ("EGLTime", UNSIGNED_LONG_LONG_FORMAT),
        ("EGLGetBlobFuncANDROID", POINTER_FORMAT),
        ("EGLSetBlobFuncANDROID", POINTER_FORMAT),
        ("EGLuint64KHR", UNSIGNED_LONG_LONG_FORMAT),
        ("EGLSyncKHR", POINTER_FORMAT),
        ("EGLnsecsANDROID", UNSIGNED_LONG_LONG_FORMAT),
        ("EGLDeviceEXT", POINTER_FORMAT),
        ("EGLDEBUGPROCKHR", POINTER_FORMAT),
        ("EGLObjectKHR", POINTER_FORMAT),
        ("EGLLabelKHR", POINTER_FORMAT),
        ("EGLTimeKHR", UNSIGNED_LONG_LONG_FORMAT),
        ("EGLImageKHR", POINTER_FORMAT),
        ("EGLStreamKHR", POINTER_FORMAT),
        // CL
        ("size_t", "%zu"),
        ("cl_char", "%hhd"),
        ("cl_uchar", "%hhu"),
        ("cl_short", "%hd"),
        ("cl_ushort", "%hu"),
        ("cl_int", "%d"),
        ("cl_uint", "%u"),
        ("cl_long", "%lld"),
        ("cl_ulong", "%llu"),
        ("cl_half", "%hu"),
        ("cl_float", "%f"),
        ("cl_double", "%f"),
        ("cl_platform_id", POINTER_FORMAT),
        ("cl_device_id", POINTER_FORMAT),
        ("cl_context", POINTER_FORMAT),
        ("cl_command_queue", POINTER_FORMAT),
        ("cl_mem", POINTER_FORMAT),
        ("cl_program", POINTER_FORMAT),
        ("cl_kernel", POINTER_FORMAT),
        ("cl_event", POINTER_FORMAT),
        ("cl_sampler", POINTER_FORMAT),
        ("cl_bool", "%u"),
        ("cl_bitfield", "%llu"),
        ("cl_properties", "%llu"),
        ("cl_device_type", "%llu"),
        ("cl_platform_info", "%u"),
        ("cl_device_info", "%u"),
        ("cl_device_fp_config", "%llu"),
        ("cl_device_mem_cache_type", "%u"),
        ("cl_device_local_mem_type", "%u"),
        ("cl_device_exec_capabilities", "%llu"),
        ("cl_device_svm_capabilities", "%llu"),
        ("cl_command_queue_properties", "%llu"),
        ("cl_device_partition_property", "%zu"),
        ("cl_device_affinity_domain", "%llu"),
        ("cl_context_properties", "%zu"),
        ("cl_context_info", "%u"),
        ("cl_queue_properties", "%llu"),
        ("cl_command_queue_info", "%u"),
        ("cl_channel_order", "%u"),
        ("cl_channel_type", "%u"),
        ("cl_mem_flags", "%llu"),
        ("cl_svm_mem_flags", "%llu"),
        ("cl_mem_object_type", "%u"),
        ("cl_mem_info", "%u"),
        ("cl_mem_migration_flags", "%llu"),
        ("cl_mem_properties", "%llu"),
        ("cl_image_info", "%u"),
        ("cl_buffer_create_type", "%u"),
        ("cl_addressing_mode", "%u"),
        ("cl_filter_mode", "%u"),
        ("cl_sampler_info", "%u"),
        ("cl_map_flags", "%llu"),
        ("cl_pipe_properties", "%zu"),
        ("cl_pipe_info", "%u"),
        ("cl_program_info", "%u"),
        ("cl_program_build_info", "%u"),
        ("cl_program_binary_type", "%u"),
        ("cl_build_status", "%d"),
        ("cl_kernel_info", "%u"),
        ("cl_kernel_arg_info", "%u"),
        ("cl_kernel_arg_address_qualifier", "%u"),
        ("cl_kernel_arg_access_qualifier", "%u"),
        ("cl_kernel_arg_type_qualifier", "%llu"),
        ("cl_kernel_work_group_info", "%u"),
        ("cl_kernel_sub_group_info", "%u"),
        ("cl_event_info", "%u"),
        ("cl_command_type", "%u"),
        ("cl_profiling_info", "%u"),
        ("cl_sampler_properties", "%llu"),
        ("cl_kernel_exec_info", "%u"),
        ("cl_device_atomic_capabilities", "%llu"),
        ("cl_khronos_vendor_id", "%u"),
        ("cl_version", "%u"),
        ("cl_device_device_enqueue_capabilities", "%llu"),
    ]
    .into_iter()
    .collect();
}

/// Default enum group for GLenum/GLbitfield parameters without one.
pub const DEFAULT_ENUM_GROUP: &str = "AllEnums";

/// How one parameter is printed by the event-tracing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// `name = <printf spec>`
    pub format: String,
    /// Expression passed for the printf spec.
    pub argument: String,
}

impl FormatDescriptor {
    pub fn for_param(api: Api, command: &str, param: &Param) -> Result<Self> {
        let name = &param.name;
        if param.is_pointer() {
            return Ok(FormatDescriptor {
                format: format!("{} = {}", name, POINTER_FORMAT),
                argument: format!("(uintptr_t){}", name),
            });
        }

        let fmt = *FORMAT_DICT
            .get(param.ty.as_str())
            .ok_or_else(|| GeneratorError::UnknownType {
                api,
                command: command.to_string(),
                ty: param.ty.clone(),
            })?;

        let group = || param.group.as_deref().unwrap_or(DEFAULT_ENUM_GROUP);
        let argument = if fmt == POINTER_FORMAT {
            format!("(uintptr_t){}", name)
        } else if fmt == UNSIGNED_LONG_LONG_FORMAT || fmt == HEX_LONG_LONG_FORMAT {
            format!("static_cast<unsigned long long>({})", name)
        } else if param.ty == "GLboolean" {
            format!("GLbooleanToString({})", name)
        } else if param.ty == "GLbitfield" {
            format!(
                "GLbitfieldToString({}::{}, {}).c_str()",
                api.enum_namespace(),
                group(),
                name
            )
        } else if param.ty == "GLenum" {
            format!("GLenumToString({}::{}, {})", api.enum_namespace(), group(), name)
        } else {
            name.clone()
        };

        Ok(FormatDescriptor {
            format: format!("{} = {}", name, fmt),
            argument,
        })
    }
}
