//! Output Templates for the Entry Point Generator
//!
//! Text of every generated artifact, with `{placeholder}` slots filled by
//! [`fill`]. Braces that do not enclose a lower-case placeholder name are
//! emitted verbatim, so C++ bodies need no escaping.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::error;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-z_]+)\}").unwrap();
}

/// Substitutes each `{key}` in a single pass; inserted values are never
/// rescanned. Every placeholder must have a binding.
pub fn fill(template: &str, bindings: &[(&str, &str)]) -> String {
    let lookup: HashMap<&str, &str> = bindings.iter().copied().collect();
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match lookup.get(&caps[1]) {
            Some(value) => (*value).to_string(),
            None => {
                error!(placeholder = &caps[1], "template placeholder has no binding");
                debug_assert!(false, "unbound template placeholder `{}`", &caps[0]);
                caps[0].to_string()
            }
        })
        .into_owned()
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ENTRY_POINT_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// entry_points_{annotation_lower}_autogen.h:
//   Defines the {comment} entry points.

#ifndef {lib}_ENTRY_POINTS_{annotation_upper}_AUTOGEN_H_
#define {lib}_ENTRY_POINTS_{annotation_upper}_AUTOGEN_H_

{includes}

{entry_points}

#endif  // {lib}_ENTRY_POINTS_{annotation_upper}_AUTOGEN_H_
"#;

pub const ENTRY_POINT_SOURCE: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// entry_points_{annotation_lower}_autogen.cpp:
//   Defines the {comment} entry points.

{includes}

{entry_points}
"#;

pub const ENTRY_POINTS_ENUM_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// entry_points_enum_autogen.h:
//   Defines the {lib} entry points enumeration.

#ifndef COMMON_ENTRYPOINTSENUM_AUTOGEN_H_
#define COMMON_ENTRYPOINTSENUM_AUTOGEN_H_

namespace angle
{
enum class EntryPoint
{
{entry_points_list}
};

const char *GetEntryPointName(EntryPoint ep);
}  // namespace angle
#endif  // COMMON_ENTRY_POINTS_ENUM_AUTOGEN_H_
"#;

pub const ENTRY_POINTS_NAME_CASE: &str = r#"        case EntryPoint::{enum}:
            return "{cmd}";"#;

pub const ENTRY_POINTS_ENUM_SOURCE: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// entry_points_enum_autogen.cpp:
//   Helper methods for the {lib} entry points enumeration.

#include "common/entry_points_enum_autogen.h"

#include "common/debug.h"

namespace angle
{
const char *GetEntryPointName(EntryPoint ep)
{
    switch (ep)
    {
{entry_points_name_cases}
        default:
            UNREACHABLE();
            return "error";
    }
}
}  // namespace angle
"#;

pub const LIB_ENTRY_POINT_SOURCE: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// {lib_name}_autogen.cpp: Implements the exported {lib_description} functions.

{includes}
extern "C" {
{entry_points}
} // extern "C"
"#;

pub const ENTRY_POINT_DECL: &str = r#"{angle_export}{return_type} {export_def} {name}({params});"#;

pub const GLES_NO_RETURN: &str = r#"void GL_APIENTRY GL_{name}({params})
{
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
    Context *context = {context_getter};
    {event_comment}EVENT(context, GL{name}, "context = %d{comma_if_needed}{format_params}", CID(context){comma_if_needed}{pass_params});

    if ({valid_context_check})
    {{packed_conversions}
        {context_lock}{implicit_pls_disable}
        {validation_expression}
        if (ANGLE_LIKELY(isCallValid))
        {
            context->{context_method}({internal_params});
        }
        ANGLE_CAPTURE_GL({name}, isCallValid, {gl_capture_params});
    }
    else
    {
        {context_lost_error}
    }
    {epilog}
}
"#;

pub const GLES_CONTEXT_PRIVATE_NO_RETURN: &str = r#"void GL_APIENTRY GL_{name}({params})
{
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
    Context *context = {context_getter};
    {event_comment}EVENT(context, GL{name}, "context = %d{comma_if_needed}{format_params}", CID(context){comma_if_needed}{pass_params});

    if ({valid_context_check})
    {{packed_conversions}
        {validation_expression}
        if (ANGLE_LIKELY(isCallValid))
        {
            ContextPrivate{canonical_name}({private_call_params});
        }
        ANGLE_CAPTURE_GL({name}, isCallValid, {gl_capture_params});
    }
    else
    {
        {context_lost_error}
    }
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
}
"#;

pub const GLES_WITH_RETURN: &str = r#"{return_type} GL_APIENTRY GL_{name}({params})
{
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
    Context *context = {context_getter};
    {event_comment}EVENT(context, GL{name}, "context = %d{comma_if_needed}{format_params}", CID(context){comma_if_needed}{pass_params});

    {return_type} returnValue;
    if ({valid_context_check})
    {{packed_conversions}
        {context_lock}{implicit_pls_disable}
        {validation_expression}
        if (ANGLE_LIKELY(isCallValid))
        {
            returnValue = context->{context_method}({internal_params});
        }
        else
        {
            returnValue = GetDefaultReturnValue<angle::EntryPoint::GL{name}, {return_type}>();
        }
        ANGLE_CAPTURE_GL({name}, isCallValid, {gl_capture_params}, returnValue);
    }
    else
    {
        {context_lost_error}
        returnValue = GetDefaultReturnValue<angle::EntryPoint::GL{name}, {return_type}>();
    }
    {epilog}
    return returnValue;
}
"#;

pub const GLES_CONTEXT_PRIVATE_WITH_RETURN: &str = r#"{return_type} GL_APIENTRY GL_{name}({params})
{
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
    Context *context = {context_getter};
    {event_comment}EVENT(context, GL{name}, "context = %d{comma_if_needed}{format_params}", CID(context){comma_if_needed}{pass_params});

    {return_type} returnValue;
    if ({valid_context_check})
    {{packed_conversions}
        {validation_expression}
        if (ANGLE_LIKELY(isCallValid))
        {
            returnValue = ContextPrivate{canonical_name}({private_call_params});
        }
        else
        {
            returnValue = GetDefaultReturnValue<angle::EntryPoint::GL{name}, {return_type}>();
        }
        ANGLE_CAPTURE_GL({name}, isCallValid, {gl_capture_params}, returnValue);
    }
    else
    {
        {context_lost_error}
        returnValue = GetDefaultReturnValue<angle::EntryPoint::GL{name}, {return_type}>();
    }
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
    return returnValue;
}
"#;

pub const EGL_NO_RETURN: &str = r#"void EGLAPIENTRY EGL_{name}({params})
{
    {preamble}
    Thread *thread = egl::GetCurrentThread();
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
    {
        {egl_lock}
        EGL_EVENT({name}, "{format_params}"{comma_if_needed}{pass_params});

        {packed_conversions}

        {
            ANGLE_EGL_SCOPED_CONTEXT_LOCK({name}, thread{context_lock_comma}{context_lock_params});
            if (IsEGLValidationEnabled())
            {
                ANGLE_EGL_VALIDATE_VOID(thread, {name}, {labeled_object}, {internal_params});
            }
            else
            {
                {attrib_map_init}
            }

            {name}(thread{comma_if_needed}{internal_params});
        }

        ANGLE_CAPTURE_EGL({name}, true, {egl_capture_params});
    }
    {epilog}
}
"#;

pub const EGL_NO_RETURN_NO_LOCKS: &str = r#"void EGLAPIENTRY EGL_{name}({params})
{
    {preamble}
    Thread *thread = egl::GetCurrentThread();
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());

    EGL_EVENT({name}, "{format_params}"{comma_if_needed}{pass_params});

    {packed_conversions}

    {
        if (IsEGLValidationEnabled())
        {
            ANGLE_EGL_VALIDATE_VOID(thread, {name}, {labeled_object}, {internal_params});
        }
        else
        {
            {attrib_map_init}
        }

        {name}(thread{comma_if_needed}{internal_params});
    }

    ANGLE_CAPTURE_EGL({name}, true, {egl_capture_params});
    {epilog}
}
"#;

pub const EGL_WITH_RETURN: &str = r#"{return_type} EGLAPIENTRY EGL_{name}({params})
{
    {preamble}
    Thread *thread = egl::GetCurrentThread();
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
    {return_type} returnValue;
    {
        {egl_lock}
        EGL_EVENT({name}, "{format_params}"{comma_if_needed}{pass_params});

        {packed_conversions}

        {
            ANGLE_EGL_SCOPED_CONTEXT_LOCK({name}, thread{context_lock_comma}{context_lock_params});
            if (IsEGLValidationEnabled())
            {
                ANGLE_EGL_VALIDATE(thread, {name}, {labeled_object}, {return_type}{comma_if_needed}{internal_params});
            }
            else
            {
                {attrib_map_init}
            }

            returnValue = {name}(thread{comma_if_needed}{internal_params});
        }

        ANGLE_CAPTURE_EGL({name}, true, {egl_capture_params}, returnValue);
    }
    {epilog}
    return returnValue;
}
"#;

pub const EGL_WITH_RETURN_NO_LOCKS: &str = r#"{return_type} EGLAPIENTRY EGL_{name}({params})
{
    {preamble}
    Thread *thread = egl::GetCurrentThread();
    ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());
    {return_type} returnValue;

    EGL_EVENT({name}, "{format_params}"{comma_if_needed}{pass_params});

    {packed_conversions}

    if (IsEGLValidationEnabled())
    {
        ANGLE_EGL_VALIDATE(thread, {name}, {labeled_object}, {return_type}{comma_if_needed}{internal_params});
    }
    else
    {
        {attrib_map_init}
    }

    returnValue = {name}(thread{comma_if_needed}{internal_params});

    ANGLE_CAPTURE_EGL({name}, true, {egl_capture_params}, returnValue);

    {epilog}
    return returnValue;
}
"#;

pub const CL_NO_RETURN: &str = r#"void CL_API_CALL cl{name}({params})
{
    CL_EVENT({name}, "{format_params}"{comma_if_needed}{pass_params});

    {packed_conversions}

    ANGLE_CL_VALIDATE_VOID({name}{comma_if_needed}{internal_params});

    cl::gClErrorTls = CL_SUCCESS;
    {name}({internal_params});
    ANGLE_CAPTURE_CL({name}, true, {internal_params});
}
"#;

pub const CL_WITH_RETURN_ERROR: &str = r#"cl_int CL_API_CALL cl{name}({params})
{{initialization}
    CL_EVENT({name}, "{format_params}"{comma_if_needed}{pass_params});

    {packed_conversions}

    ANGLE_CL_VALIDATE_ERROR({name}{comma_if_needed}{internal_params});

    cl::gClErrorTls = CL_SUCCESS;
    cl_int returnValue = {name}({internal_params});
    ANGLE_CAPTURE_CL({name}, true{comma_if_needed}{internal_params}, returnValue);
    return returnValue;
}
"#;

pub const CL_WITH_ERRCODE_RET: &str = r#"{return_type} CL_API_CALL cl{name}({params})
{{initialization}
    CL_EVENT({name}, "{format_params}"{comma_if_needed}{pass_params});

    {packed_conversions}

    ANGLE_CL_VALIDATE_ERRCODE_RET({name}{comma_if_needed}{internal_params});

    cl::gClErrorTls      = CL_SUCCESS;
    {return_type} object = {name}({internal_params});

    ASSERT((cl::gClErrorTls == CL_SUCCESS) == (object != nullptr));
    if (errcode_ret != nullptr)
    {
        *errcode_ret = cl::gClErrorTls;
    }
    ANGLE_CAPTURE_CL({name}, true, {internal_params}, errcode_ret, object);
    return object;
}
"#;

pub const CL_WITH_RETURN_POINTER: &str = r#"{return_type} CL_API_CALL cl{name}({params})
{{initialization}
    CL_EVENT({name}, "{format_params}"{comma_if_needed}{pass_params});

    {packed_conversions}

    cl::gClErrorTls = CL_SUCCESS;
    ANGLE_CL_VALIDATE_POINTER({name}{comma_if_needed}{internal_params});

    {return_type} returnValue = {name}({internal_params});
    ANGLE_CAPTURE_CL({name}, true, {internal_params}, returnValue);
    return returnValue;
}
"#;

pub const CL_STUBS_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2021 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// {annotation_lower}_stubs_autogen.h: Stubs for {title} entry points.

#ifndef LIBGLESV2_{annotation_upper}_STUBS_AUTOGEN_H_
#define LIBGLESV2_{annotation_upper}_STUBS_AUTOGEN_H_

#include "libANGLE/cl_types.h"

namespace cl
{
{stubs}
}  // namespace cl
#endif  // LIBGLESV2_{annotation_upper}_STUBS_AUTOGEN_H_
"#;

pub const EGL_STUBS_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// {annotation_lower}_stubs_autogen.h: Stubs for {title} entry points.

#ifndef LIBGLESV2_{annotation_upper}_STUBS_AUTOGEN_H_
#define LIBGLESV2_{annotation_upper}_STUBS_AUTOGEN_H_

#include <EGL/egl.h>
#include <EGL/eglext.h>

#include "common/PackedEnums.h"
#include "common/PackedEGLEnums_autogen.h"

namespace gl
{
class Context;
}  // namespace gl

namespace egl
{
class AttributeMap;
class Device;
class Display;
class Image;
class Stream;
class Surface;
class Sync;
class Thread;
struct Config;

{stubs}
}  // namespace egl
#endif  // LIBGLESV2_{annotation_upper}_STUBS_AUTOGEN_H_
"#;

pub const CONTEXT_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Context_{annotation_lower}_autogen.h: Creates a macro for interfaces in Context.

#ifndef ANGLE_CONTEXT_{annotation_upper}_AUTOGEN_H_
#define ANGLE_CONTEXT_{annotation_upper}_AUTOGEN_H_

#define ANGLE_{annotation_upper}_CONTEXT_API \
{interface}

#endif // ANGLE_CONTEXT_API_{version}_AUTOGEN_H_
"#;

pub const CONTEXT_DECL: &str = r#"    {return_type} {context_method}({internal_params}){maybe_const}; \"#;

pub const CL_EXPORT: &str = r#"{return_type} CL_API_CALL cl{name}({params})
{
    return cl::GetDispatch().cl{name}({internal_params});
}
"#;

pub const GL_EXPORT: &str = r#"{return_type} GL_APIENTRY gl{name}({params})
{
    return GL_{name}({internal_params});
}
"#;

pub const EGL_EXPORT: &str = r#"{return_type} EGLAPIENTRY egl{name}({params})
{
    EnsureEGLLoaded();
    return EGL_{name}({internal_params});
}
"#;

pub const GL_VALIDATION_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// validation{annotation}_autogen.h:
//   Validation functions for the OpenGL {comment} entry points.

#ifndef LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_
#define LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_

#include "common/entry_points_enum_autogen.h"
#include "common/PackedEnums.h"

namespace gl
{
class Context;
class PrivateState;
class ErrorSet;

{prototypes}
}  // namespace gl

#endif  // LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_
"#;

pub const CL_VALIDATION_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2021 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// validation{annotation}_autogen.h:
//   Validation functions for the {comment} entry points.

#ifndef LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_
#define LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_

#include "libANGLE/validationCL.h"

namespace cl
{
{prototypes}
}  // namespace cl

#endif  // LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_
"#;

pub const EGL_VALIDATION_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// validation{annotation}_autogen.h:
//   Validation functions for the {comment} entry points.

#ifndef LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_
#define LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_

#include "libANGLE/validationEGL.h"

namespace egl
{
{prototypes}
}  // namespace egl

#endif  // LIBANGLE_VALIDATION_{annotation}_AUTOGEN_H_
"#;

pub const CONTEXT_PRIVATE_CALL_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2023 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// context_private_call_autogen.h:
//   Helpers that set/get state that is entirely privately accessed by the context.

#ifndef LIBANGLE_CONTEXT_PRIVATE_CALL_AUTOGEN_H_
#define LIBANGLE_CONTEXT_PRIVATE_CALL_AUTOGEN_H_

#include "libANGLE/Context.h"

namespace gl
{
{prototypes}
}  // namespace gl

#endif  // LIBANGLE_CONTEXT_PRIVATE_CALL_AUTOGEN_H_
"#;

pub const EGL_CONTEXT_LOCK_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2023 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// {annotation_lower}_context_lock_autogen.h:
//   Context Lock functions for the {comment} entry points.

#ifndef LIBGLESV2_{annotation_upper}_CONTEXT_LOCK_AUTOGEN_H_
#define LIBGLESV2_{annotation_upper}_CONTEXT_LOCK_AUTOGEN_H_

#include "libGLESv2/global_state.h"

namespace egl
{
{prototypes}
}  // namespace egl

#endif  // LIBGLESV2_{annotation_upper}_CONTEXT_LOCK_AUTOGEN_H_
"#;

pub const CAPTURE_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright {copyright_year} The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// capture_{annotation_lower}_autogen.h:
//   Capture functions for the {api} {comment} entry points.

#ifndef LIBANGLE_CAPTURE_{annotation_upper}_AUTOGEN_H_
#define LIBANGLE_CAPTURE_{annotation_upper}_AUTOGEN_H_

#include "common/PackedEnums.h"
#include "libANGLE/capture/FrameCapture.h"
#ifdef ANGLE_ENABLE_CL
#include "common/PackedCLEnums_autogen.h"
#endif

namespace {namespace}
{
{prototypes}
}  // namespace {namespace}

#endif  // LIBANGLE_CAPTURE_{annotation_upper}_AUTOGEN_H_
"#;

pub const CAPTURE_SOURCE: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright {copyright_year} The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// capture_{annotation_with_dash}_autogen.cpp:
//   Capture functions for the {api} {comment} entry points.

#include "libANGLE/capture/capture_{annotation_with_dash}_autogen.h"

#include "common/gl_enum_utils.h"
#include "libANGLE/Context.h"
#include "libANGLE/capture/FrameCapture.h"
#include "libANGLE/validation{annotation_no_dash}.h"

using namespace angle;

namespace {namespace}
{
{capture_methods}
}  // namespace {namespace}
"#;

pub const CAPTURE_METHOD_WITH_RETURN_VALUE: &str = r#"CallCapture Capture{short_name}({params_with_type}, {return_value_type_original} returnValue)
{
    ParamBuffer paramBuffer;

    {parameter_captures}

    ParamCapture returnValueCapture("returnValue", ParamType::T{return_value_type_custom});
    InitParamValue(ParamType::T{return_value_type_custom}, returnValue, &returnValueCapture.value);
    paramBuffer.addReturnValue(std::move(returnValueCapture));

    return CallCapture(angle::EntryPoint::{api_upper}{short_name}, std::move(paramBuffer));
}
"#;

pub const CAPTURE_METHOD_NO_RETURN_VALUE: &str = r#"CallCapture Capture{short_name}({params_with_type})
{
    ParamBuffer paramBuffer;

    {parameter_captures}

    return CallCapture(angle::EntryPoint::{api_upper}{short_name}, std::move(paramBuffer));
}
"#;

pub const PARAMETER_CAPTURE_VALUE: &str = r#"paramBuffer.addValueParam("{name}", ParamType::T{type}, {name});"#;

pub const PARAMETER_CAPTURE_ENUM: &str = r#"paramBuffer.addEnumParam("{name}", {api_enum}::{group}, ParamType::T{type}, {name});"#;

pub const PARAMETER_CAPTURE_POINTER: &str = r#"
    if (isCallValid)
    {
        ParamCapture {name}Param("{name}", ParamType::T{type});
        InitParamValue(ParamType::T{type}, {name}, &{name}Param.value);
        {capture_name}({params}, &{name}Param);
        paramBuffer.addParam(std::move({name}Param));
    }
    else
    {
        ParamCapture {name}Param("{name}", ParamType::T{type});
        InitParamValue(ParamType::T{type}, static_cast<{cast_type}>(nullptr), &{name}Param.value);
        paramBuffer.addParam(std::move({name}Param));
    }
"#;

pub const PARAMETER_CAPTURE_POINTER_FUNC: &str = r#"void {name}({params});"#;

pub const CAPTURE_REPLAY_SOURCE: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// frame_capture_replay_autogen.cpp:
//   Replay captured GL calls.

#include "angle_trace_gl.h"
#include "common/debug.h"
#include "common/frame_capture_utils.h"
#include "frame_capture_test_utils.h"

namespace angle
{
void ReplayTraceFunctionCall(const CallCapture &call, const TraceFunctionMap &customFunctions)
{
    const ParamBuffer &params = call.params;
    const std::vector<ParamCapture> &captures = params.getParamCaptures();

    switch (call.entryPoint)
    {
{call_replay_cases}
        default:
            ASSERT(!call.customFunctionName.empty());
            ReplayCustomFunctionCall(call, customFunctions);
            break;
    }
}

}  // namespace angle

"#;

pub const REPLAY_CALL_CASE: &str = r#"        case angle::EntryPoint::{enum}:
            {call}({params});
            break;
"#;

pub const GLES_HEADER_INCLUDES: &str = r#"#include <GLES{major}/gl{major}{minor}.h>
#include <export.h>"#;

pub const GLES_SOURCE_INCLUDES: &str = r#"#include "libGLESv2/entry_points_{header_version}_autogen.h"

#include "common/entry_points_enum_autogen.h"
#include "common/gl_enum_utils.h"
#include "libANGLE/Context.h"
#include "libANGLE/Context.inl.h"
#include "libANGLE/context_private_call_autogen.h"
#include "libANGLE/context_private_call.inl.h"
#include "libANGLE/capture/capture_{header_version}_autogen.h"
#include "libANGLE/validation{validation_header_version}.h"
#include "libANGLE/entry_points_utils.h"
#include "libGLESv2/global_state.h"

using namespace gl;
"#;

pub const WINDOWS_DEF_FILE: &str = r#"; GENERATED FILE - DO NOT EDIT.
; Generated by {script_name} using data from {data_source_name}.
;
; Copyright 2020 The ANGLE Project Authors. All rights reserved.
; Use of this source code is governed by a BSD-style license that can be
; found in the LICENSE file.
LIBRARY {lib}
EXPORTS
{exports}
"#;

pub const FRAME_CAPTURE_UTILS_HEADER: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// frame_capture_utils_autogen.h:
//   ANGLE Frame capture types and helper functions.

#ifndef COMMON_FRAME_CAPTURE_UTILS_AUTOGEN_H_
#define COMMON_FRAME_CAPTURE_UTILS_AUTOGEN_H_

#include "common/PackedEnums.h"
#ifdef ANGLE_ENABLE_CL
#include "libANGLE/CLBitField.h"
#include "common/PackedCLEnums_autogen.h"
#endif

namespace angle
{

#ifdef ANGLE_ENABLE_CL
typedef void (CL_CALLBACK *cl_context_func_type)(const char *, const void *, size_t, void *);
typedef void (CL_CALLBACK *cl_program_func_type)(cl_program, void *);
typedef void (CL_CALLBACK *cl_void_func_type)(void *);
typedef void (CL_CALLBACK *cl_callback_func_type)(cl_event, cl_int, void *);
typedef void (CL_CALLBACK *cl_svm_free_callback_func_type)(cl_command_queue, cl_uint, void * [], void *);
typedef void (CL_CALLBACK *cl_context_destructor_func_type)(cl_context, void *);
typedef void (CL_CALLBACK *cl_mem_destructor_func_type)(cl_mem, void *);
#endif

enum class ParamType
{
    {param_types}
};

constexpr uint32_t kParamTypeCount = {param_type_count};

union ParamValue
{
    ParamValue() {}
    ~ParamValue() {}
    {param_union_values}
    #ifdef ANGLE_ENABLE_CL
    {param_union_opencl_values}
    #endif
};

template <ParamType PType, typename T>
T GetParamVal(const ParamValue &value);

{get_param_val_specializations}

#ifdef ANGLE_ENABLE_CL
{get_param_val_specializations_opencl}
#endif

template <ParamType PType, typename T>
T GetParamVal(const ParamValue &value)
{
    UNREACHABLE();
    return T();
}

template <typename T>
T AccessParamValue(ParamType paramType, const ParamValue &value)
{
    switch (paramType)
    {
{access_param_value_cases}
    }
    UNREACHABLE();
    return T();
}

template <ParamType PType, typename T>
void SetParamVal(T valueIn, ParamValue *valueOut);

{set_param_val_specializations}

#ifdef ANGLE_ENABLE_CL
{set_param_val_specializations_opencl}
#endif

template <ParamType PType, typename T>
void SetParamVal(T valueIn, ParamValue *valueOut)
{
    UNREACHABLE();
}

template <typename T>
void InitParamValue(ParamType paramType, T valueIn, ParamValue *valueOut)
{
    switch (paramType)
    {
{init_param_value_cases}
    }
}

struct CallCapture;
struct ParamCapture;

void WriteParamCaptureReplay(std::ostream &os, const CallCapture &call, const ParamCapture &param);
const char *ParamTypeToString(ParamType paramType);

enum class ResourceIDType
{
    {resource_id_types}
};

ResourceIDType GetResourceIDTypeFromParamType(ParamType paramType);
const char *GetResourceIDTypeName(ResourceIDType resourceIDType);

template <typename ResourceType>
struct GetResourceIDTypeFromType;

{type_to_resource_id_type_structs}
}  // namespace angle

#endif  // COMMON_FRAME_CAPTURE_UTILS_AUTOGEN_H_
"#;

pub const FRAME_CAPTURE_UTILS_SOURCE: &str = r#"// GENERATED FILE - DO NOT EDIT.
// Generated by {script_name} using data from {data_source_name}.
//
// Copyright 2020 The ANGLE Project Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// frame_capture_utils_autogen.cpp:
//   ANGLE Frame capture types and helper functions.

#include "common/frame_capture_utils_autogen.h"

#include "common/frame_capture_utils.h"

namespace angle
{
void WriteParamCaptureReplay(std::ostream &os, const CallCapture &call, const ParamCapture &param)
{
    switch (param.type)
    {
{write_param_type_to_stream_cases}
#ifdef ANGLE_ENABLE_CL
{write_param_type_to_stream_cases_cl}
#endif
        default:
            os << "unknown";
            break;
    }
}

const char *ParamTypeToString(ParamType paramType)
{
    switch (paramType)
    {
{param_type_to_string_cases}
{param_type_to_string_cases_cl}
        default:
            UNREACHABLE();
            return "unknown";
    }
}

ResourceIDType GetResourceIDTypeFromParamType(ParamType paramType)
{
    switch (paramType)
    {
{param_type_resource_id_cases}
{param_type_resource_id_cases_cl}
        default:
            return ResourceIDType::InvalidEnum;
    }
}

const char *GetResourceIDTypeName(ResourceIDType resourceIDType)
{
    switch (resourceIDType)
    {
{resource_id_type_name_cases}
{resource_id_type_name_cases_cl}
        default:
            UNREACHABLE();
            return "GetResourceIDTypeName error";
    }
}
}  // namespace angle
"#;

pub const GET_PARAM_VAL_SPECIALIZATION: &str = r#"template <>
inline {type} GetParamVal<ParamType::T{enum}, {type}>(const ParamValue &value)
{
    return value.{union_name};
}"#;

pub const ACCESS_PARAM_VALUE_CASE: &str = r#"        case ParamType::T{enum}:
            return GetParamVal<ParamType::T{enum}, T>(value);"#;

pub const SET_PARAM_VAL_SPECIALIZATION: &str = r#"template <>
inline void SetParamVal<ParamType::T{enum}>({type} valueIn, ParamValue *valueOut)
{
    valueOut->{union_name} = valueIn;
}"#;

pub const INIT_PARAM_VALUE_CASE: &str = r#"        case ParamType::T{enum}:
            SetParamVal<ParamType::T{enum}>(valueIn, valueOut);
            break;"#;

pub const WRITE_PARAM_TYPE_TO_STREAM_CASE: &str = r#"        case ParamType::T{enum_in}:
            WriteParamValueReplay<ParamType::T{enum_out}>(os, call, param.value.{union_name});
            break;"#;

pub const PARAM_TYPE_TO_STRING_CASE: &str = r#"        case ParamType::T{enum}:
            return "{type}";"#;

pub const PARAM_TYPE_TO_RESOURCE_ID_TYPE_CASE: &str = r#"        case ParamType::T{enum}:
            return ResourceIDType::{resource_id_type};"#;

pub const RESOURCE_ID_TYPE_NAME_CASE: &str = r#"        case ResourceIDType::{resource_id_type}:
            return "{resource_id_type}";"#;

pub const EGL_HEADER_INCLUDES: &str = r#"#include <EGL/egl.h>
#include <export.h>
"#;

pub const EGL_SOURCE_INCLUDES: &str = r#"#include "libGLESv2/entry_points_egl_autogen.h"
#include "libGLESv2/entry_points_egl_ext_autogen.h"

#include "libANGLE/capture/capture_egl_autogen.h"
#include "libANGLE/entry_points_utils.h"
#include "libANGLE/validationEGL_autogen.h"
#include "libGLESv2/egl_context_lock_impl.h"
#include "libGLESv2/egl_stubs_autogen.h"
#include "libGLESv2/egl_ext_stubs_autogen.h"
#include "libGLESv2/global_state.h"

using namespace egl;
"#;

pub const EGL_EXT_HEADER_INCLUDES: &str = r#"#include <EGL/egl.h>
#include <EGL/eglext.h>
#include <export.h>
"#;

pub const EGL_EXT_SOURCE_INCLUDES: &str = r#"#include "libGLESv2/entry_points_egl_ext_autogen.h"

#include "libANGLE/capture/capture_egl_autogen.h"
#include "libANGLE/entry_points_utils.h"
#include "libANGLE/validationEGL_autogen.h"
#include "libGLESv2/egl_context_lock_impl.h"
#include "libGLESv2/egl_ext_stubs_autogen.h"
#include "libGLESv2/global_state.h"

using namespace egl;
"#;

pub const LIBCL_EXPORT_INCLUDES: &str = r#"
#include "libOpenCL/dispatch.h"
"#;

pub const LIBGLESV2_EXPORT_INCLUDES: &str = r#"
#include "angle_gl.h"

#include "libGLESv2/entry_points_gles_1_0_autogen.h"
#include "libGLESv2/entry_points_gles_2_0_autogen.h"
#include "libGLESv2/entry_points_gles_3_0_autogen.h"
#include "libGLESv2/entry_points_gles_3_1_autogen.h"
#include "libGLESv2/entry_points_gles_3_2_autogen.h"
#include "libGLESv2/entry_points_gles_ext_autogen.h"

#include "common/event_tracer.h"
"#;

pub const LIBEGL_EXPORT_INCLUDES_AND_PREAMBLE: &str = r#"
#include "anglebase/no_destructor.h"
#include "common/system_utils.h"

#include <memory>

#if defined(ANGLE_USE_EGL_LOADER)
#    include "libEGL/egl_loader_autogen.h"
#else
#    include "libGLESv2/entry_points_egl_autogen.h"
#    include "libGLESv2/entry_points_egl_ext_autogen.h"
#endif  // defined(ANGLE_USE_EGL_LOADER)

namespace
{
#if defined(ANGLE_USE_EGL_LOADER)
bool gLoaded = false;
void *gEntryPointsLib = nullptr;

GenericProc KHRONOS_APIENTRY GlobalLoad(const char *symbol)
{
    return reinterpret_cast<GenericProc>(angle::GetLibrarySymbol(gEntryPointsLib, symbol));
}

void EnsureEGLLoaded()
{
    if (gLoaded)
    {
        return;
    }

    std::string errorOut;
    gEntryPointsLib = OpenSystemLibraryAndGetError(ANGLE_DISPATCH_LIBRARY, angle::SearchType::ModuleDir, &errorOut);
    if (gEntryPointsLib)
    {
        LoadLibEGL_EGL(GlobalLoad);
        gLoaded = true;
    }
    else
    {
        fprintf(stderr, "Error loading EGL entry points: %s\n", errorOut.c_str());
    }
}
#else
void EnsureEGLLoaded() {}
#endif  // defined(ANGLE_USE_EGL_LOADER)
}  // anonymous namespace
"#;

pub const CL_HEADER_INCLUDES: &str = r#"#include "angle_cl.h"
"#;

pub const CL_SOURCE_INCLUDES: &str = r#"#include "libGLESv2/entry_points_cl_autogen.h"

#include "libANGLE/validationCL_autogen.h"
#include "libGLESv2/cl_stubs_autogen.h"
#include "libGLESv2/entry_points_cl_utils.h"
#include "libANGLE/entry_points_utils.h"
#include "libANGLE/capture/capture_cl_autogen.h"
"#;

pub const EVENT_COMMENT: &str = r#"    // Don't run the EVENT() macro on the EXT_debug_marker entry points.
    // It can interfere with the debug events being set by the caller.
    // "#;

/// Extension header includes appended after the versionless GLES includes.
pub const GLES_EXT_HEADER_EXTRA_INCLUDES: &str = r#"
#include <GLES/glext.h>
#include <GLES2/gl2.h>
#include <GLES2/gl2ext.h>
#include <GLES3/gl32.h>
"#;

pub const GLES_EXT_SOURCE_EXTRA_INCLUDES: &str = r#"
#include "libANGLE/capture/capture_gles_1_0_autogen.h"
#include "libANGLE/capture/capture_gles_2_0_autogen.h"
#include "libANGLE/capture/capture_gles_3_0_autogen.h"
#include "libANGLE/capture/capture_gles_3_1_autogen.h"
#include "libANGLE/capture/capture_gles_3_2_autogen.h"
#include "libANGLE/validationES1.h"
#include "libANGLE/validationES2.h"
#include "libANGLE/validationES3.h"
#include "libANGLE/validationES31.h"
#include "libANGLE/validationES32.h"

using namespace gl;
"#;

pub const RESOURCE_ID_CONVERT_STRUCT: &str = r#"template <>
struct GetResourceIDTypeFromType<{type}>
{
    static constexpr ResourceIDType IDType = ResourceIDType::{resource_id_type};
};
"#;

pub const CAPTURE_PROTO: &str = "angle::CallCapture Capture{short_name}({params});";
pub const VALIDATION_PROTO: &str = "{return_type} Validate{short_name}({params});";
pub const CONTEXT_PRIVATE_CALL_PROTO: &str = "{return_type} ContextPrivate{short_name}({params});";
pub const CONTEXT_LOCK_PROTO: &str = "ScopedContextMutexLock GetContextLock_{short_name}({params});";
pub const STUB_PROTO: &str = "{return_type} {short_name}({params});";

pub const GLES_VALIDATION_BLOCK: &str = r#"bool isCallValid = context->skipValidation();
if (!isCallValid)
{
    if (ANGLE_LIKELY({support_condition}))
    {
        #if defined(ANGLE_ENABLE_ASSERTS)
    const uint32_t errorCount = context->getPushedErrorCount();
#endif
isCallValid = {validation_call};
#if defined(ANGLE_ENABLE_ASSERTS)
    {error_count_assertion}
#endif
    }
    {record_error}
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_is_single_pass() {
        let out = fill("a {x} b {y}", &[("x", "{y}"), ("y", "Y")]);
        assert_eq!(out, "a {y} b Y");
    }

    #[test]
    fn test_fill_keeps_code_braces() {
        let out = fill("void f()\n{\n    {body}\n}\n{Unknown} {}", &[("body", "return;")]);
        assert_eq!(out, "void f()\n{\n    return;\n}\n{Unknown} {}");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unbound template placeholder `{missing}`")]
    fn test_fill_rejects_unbound_placeholder() {
        fill("{missing}", &[]);
    }

    #[test]
    fn test_triple_brace_body_opening() {
        let out = fill("{\n{{initialization}", &[("initialization", "InitBackEnds(false);\n")]);
        assert_eq!(out, "{\n{InitBackEnds(false);\n");
    }

    #[test]
    fn test_generated_marker_leads_every_file_template() {
        for template in [
            ENTRY_POINT_HEADER,
            ENTRY_POINT_SOURCE,
            ENTRY_POINTS_ENUM_HEADER,
            ENTRY_POINTS_ENUM_SOURCE,
            LIB_ENTRY_POINT_SOURCE,
            CL_STUBS_HEADER,
            EGL_STUBS_HEADER,
            CONTEXT_HEADER,
            GL_VALIDATION_HEADER,
            CL_VALIDATION_HEADER,
            EGL_VALIDATION_HEADER,
            CONTEXT_PRIVATE_CALL_HEADER,
            EGL_CONTEXT_LOCK_HEADER,
            CAPTURE_HEADER,
            CAPTURE_SOURCE,
            CAPTURE_REPLAY_SOURCE,
            FRAME_CAPTURE_UTILS_HEADER,
            FRAME_CAPTURE_UTILS_SOURCE,
        ] {
            assert!(template.starts_with("// GENERATED FILE - DO NOT EDIT.\n"));
        }
        assert!(WINDOWS_DEF_FILE.starts_with("; GENERATED FILE - DO NOT EDIT.\n"));
    }
}
