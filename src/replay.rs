//! Replay Dispatch Emitter for the Entry Point Generator
//!
//! One `case` per replayable entry point. Each argument is read back from
//! the captured value union, or resolved through the replay-side map of the
//! resource its packed type names.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::Command;
use crate::names::NameResolver;
use crate::registry::{Api, Tables};
use crate::templates::{self, fill};
use crate::types::{is_egl_handle_type, TypeDescriptor};

/// Expression producing argument `index` of `param_name` during replay.
fn replay_argument(
    index: usize,
    raw_type: &str,
    packed: Option<&BTreeMap<String, String>>,
    param_name: &str,
    resource_ids: &BTreeSet<String>,
) -> String {
    let read_type = if is_egl_handle_type(raw_type) { "void *" } else { raw_type };
    let access = format!("captures[{}].value.{}Val", index, TypeDescriptor::parse(read_type).tag());

    let Some(packed_type) = packed.and_then(|p| p.get(param_name)) else {
        return access;
    };
    let resource = packed_type.strip_suffix("ID").unwrap_or(packed_type);
    match resource {
        "Sync" => format!("gSyncMap2[captures[{}].value.GLuintVal]", index),
        r if resource_ids.contains(r) => format!("g{}Map[{}]", r, access),
        "UniformLocation" => format!("gUniformLocations[gCurrentProgram][{}]", access),
        "egl::Image" => format!("gEGLImageMap2[captures[{}].value.GLuintVal]", index),
        "egl::Sync" => format!("gEGLSyncMap[captures[{}].value.egl_SyncIDVal]", index),
        _ => access,
    }
}

/// Comma-separated replay arguments of `command`.
pub fn replay_params(command: &Command, tables: &Tables, resource_ids: &BTreeSet<String>) -> String {
    let canonical = NameResolver::new(command.api).canonical(&command.name);
    let packed = tables.packed_enums(command.api).get(canonical);
    command
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| replay_argument(i, &p.ty, packed, &p.name, resource_ids))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cases for `commands`, sorted by command name and deduplicated.
pub fn replay_cases<'a>(
    commands: impl IntoIterator<Item = &'a Command>,
    tables: &Tables,
    resource_ids: &BTreeSet<String>,
) -> String {
    let sorted: BTreeMap<&str, &Command> = commands.into_iter().map(|c| (c.name.as_str(), c)).collect();
    sorted
        .values()
        .map(|command| {
            let prefix = if command.api == Api::Egl { "EGL" } else { "GL" };
            let entry_point = format!("{}{}", prefix, command.short_name());
            let params = replay_params(command, tables, resource_ids);
            fill(
                templates::REPLAY_CALL_CASE,
                &[
                    ("enum", &entry_point),
                    ("call", &command.name),
                    ("params", &params),
                ],
            )
        })
        .collect()
}

pub fn replay_source(script: &str, source: &str, cases: &str) -> String {
    fill(
        templates::CAPTURE_REPLAY_SOURCE,
        &[
            ("script_name", script),
            ("data_source_name", source),
            ("call_replay_cases", cases),
        ],
    )
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

    fn tables() -> Tables {
        let gl = PackedEnumTable::from_json(
            Path::new("gl.json"),
            r#"{
                "glBindBuffer": { "target": "BufferBinding", "buffer": "BufferID" },
                "glUniform1f": { "location": "UniformLocation" },
                "glWaitSync": { "sync": "SyncID" }
            }"#,
        )
        .unwrap();
        let egl = PackedEnumTable::from_json(
            Path::new("egl.json"),
            r#"{ "eglDestroyImage": { "image": "egl::ImageID" } }"#,
        )
        .unwrap();
        Tables::new(gl, egl, Default::default())
    }

    #[test]
    fn test_resource_map_lookup() {
        let ids: BTreeSet<String> = ["Buffer".to_string()].into_iter().collect();
        let cmd = command(Api::Gles, "void glBindBufferOES", &["GLenum target", "GLuint buffer"]);
        assert_eq!(
            replay_params(&cmd, &tables(), &ids),
            "captures[0].value.GLenumVal, gBufferMap[captures[1].value.GLuintVal]"
        );
    }

    #[test]
    fn test_special_maps() {
        let ids = BTreeSet::new();
        let t = tables();
        let uniform = command(Api::Gles, "void glUniform1f", &["GLint location", "GLfloat v0"]);
        assert_eq!(
            replay_params(&uniform, &t, &ids),
            "gUniformLocations[gCurrentProgram][captures[0].value.GLintVal], captures[1].value.GLfloatVal"
        );
        let sync = command(Api::Gles, "void glWaitSync", &["GLsync sync", "GLbitfield flags", "GLuint64 timeout"]);
        assert!(replay_params(&sync, &t, &ids).starts_with("gSyncMap2[captures[0].value.GLuintVal]"));

        let image = command(Api::Egl, "EGLBoolean eglDestroyImage", &["EGLDisplay dpy", "EGLImage image"]);
        assert_eq!(
            replay_params(&image, &t, &ids),
            "captures[0].value.voidPointerVal, gEGLImageMap2[captures[1].value.GLuintVal]"
        );
    }

    #[test]
    fn test_cases_sorted_by_name() {
        let ids = BTreeSet::new();
        let b = command(Api::Gles, "void glFlush", &[]);
        let a = command(Api::Gles, "void glFinish", &[]);
        let cases = replay_cases([&b, &a], &tables(), &ids);
        let finish = cases.find("GLFinish").unwrap();
        let flush = cases.find("GLFlush").unwrap();
        assert!(finish < flush);
        assert!(cases.contains("            glFinish();\n"));
    }
}
