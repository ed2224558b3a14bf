//! Frame Capture Utilities Emitter for the Entry Point Generator
//!
//! Renders `frame_capture_utils_autogen.{h,cpp}` from the finished
//! `ParamTypeRegistry`: the `ParamType` enumeration, the `ParamValue` union
//! with its accessors, and the resource-id tables.

use crate::param_types::{resource_id_for, ParamTypeRegistry, TagEntry};
use crate::templates::{self, fill};
use crate::types::resource_id_type_spelling;

fn union_name(tag: &str) -> String {
    format!("{}Val", tag)
}

/// Rendered text mentioning an OpenCL type goes under `ANGLE_ENABLE_CL`.
fn mentions_cl(text: &str) -> bool {
    text.contains("cl_") || text.contains("cl::")
}

/// Splits rendered items into (non-CL, CL) lists, keeping order.
fn split_cl(items: Vec<String>) -> (Vec<String>, Vec<String>) {
    items.into_iter().partition(|item| !mentions_cl(item))
}

fn per_tag<'a>(
    tags: impl Iterator<Item = (&'a str, &'a TagEntry)>,
    render: impl Fn(&str, &TagEntry) -> String,
) -> Vec<String> {
    tags.map(|(tag, entry)| render(tag, entry)).collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEADER
// ═══════════════════════════════════════════════════════════════════════════════

pub fn utils_header(registry: &ParamTypeRegistry, script: &str, source: &str) -> String {
    let param_types = per_tag(registry.iter(), |tag, _| format!("T{},", tag)).join("\n    ");
    let count = registry.len().to_string();

    let (union_values, union_cl_values) = split_cl(per_tag(registry.iter(), |tag, entry| {
        format!("{} {};", entry.descriptor.spelling(), union_name(tag))
    }));

    let specialization = |template: &'static str| {
        move |tag: &str, entry: &TagEntry| {
            fill(
                template,
                &[
                    ("type", &entry.descriptor.spelling()),
                    ("enum", tag),
                    ("union_name", &union_name(tag)),
                ],
            )
        }
    };
    let (get_specs, get_specs_cl) = split_cl(per_tag(
        registry.iter(),
        specialization(templates::GET_PARAM_VAL_SPECIALIZATION),
    ));
    let (set_specs, set_specs_cl) = split_cl(per_tag(
        registry.iter(),
        specialization(templates::SET_PARAM_VAL_SPECIALIZATION),
    ));

    let access_cases = per_tag(registry.iter(), |tag, _| {
        fill(templates::ACCESS_PARAM_VALUE_CASE, &[("enum", tag)])
    })
    .join("\n");
    let init_cases = per_tag(registry.iter(), |tag, _| {
        fill(templates::INIT_PARAM_VALUE_CASE, &[("enum", tag)])
    })
    .join("\n");

    let resource_ids = registry.resource_ids();
    let mut id_enumerators = resource_ids.clone();
    id_enumerators.push("EnumCount".to_string());
    id_enumerators.push("InvalidEnum = EnumCount".to_string());
    let convert_structs = resource_ids
        .iter()
        .map(|id| {
            fill(
                templates::RESOURCE_ID_CONVERT_STRUCT,
                &[("type", &resource_id_type_spelling(id)), ("resource_id_type", id)],
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    fill(
        templates::FRAME_CAPTURE_UTILS_HEADER,
        &[
            ("script_name", script),
            ("data_source_name", source),
            ("param_types", &param_types),
            ("param_type_count", &count),
            ("param_union_values", &union_values.join("\n    ")),
            ("param_union_opencl_values", &union_cl_values.join("\n    ")),
            ("get_param_val_specializations", &get_specs.join("\n\n")),
            ("get_param_val_specializations_opencl", &get_specs_cl.join("\n\n")),
            ("access_param_value_cases", &access_cases),
            ("set_param_val_specializations", &set_specs.join("\n\n")),
            ("set_param_val_specializations_opencl", &set_specs_cl.join("\n\n")),
            ("init_param_value_cases", &init_cases),
            ("resource_id_types", &id_enumerators.join(",\n    ")),
            ("type_to_resource_id_type_structs", &convert_structs),
        ],
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Switch cases of the source file for one partition of the tags.
struct SourceCases {
    write_to_stream: String,
    to_string: String,
    resource_id: String,
    resource_id_name: String,
}

impl SourceCases {
    fn render<'a>(tags: impl Iterator<Item = (&'a str, &'a TagEntry)> + Clone) -> Self {
        let write_to_stream = per_tag(tags.clone(), |tag, _| {
            fill(
                templates::WRITE_PARAM_TYPE_TO_STREAM_CASE,
                &[("enum_in", tag), ("enum_out", tag), ("union_name", &union_name(tag))],
            )
        })
        .join("\n");
        let to_string = per_tag(tags.clone(), |tag, entry| {
            fill(
                templates::PARAM_TYPE_TO_STRING_CASE,
                &[("enum", tag), ("type", &entry.descriptor.replay_spelling())],
            )
        })
        .join("\n");
        let resource_id = tags
            .clone()
            .filter_map(|(tag, entry)| {
                let id = resource_id_for(entry)?;
                Some(fill(
                    templates::PARAM_TYPE_TO_RESOURCE_ID_TYPE_CASE,
                    &[("enum", tag), ("resource_id_type", &id)],
                ))
            })
            .collect::<Vec<_>>()
            .join("\n");
        let resource_id_name = tags
            .filter_map(|(_, entry)| entry.descriptor.resource_id())
            .map(|id| fill(templates::RESOURCE_ID_TYPE_NAME_CASE, &[("resource_id_type", &id)]))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            write_to_stream,
            to_string,
            resource_id,
            resource_id_name,
        }
    }
}

pub fn utils_source(registry: &ParamTypeRegistry, script: &str, source: &str) -> String {
    let gl = SourceCases::render(registry.gl_tags());
    let cl = SourceCases::render(registry.cl_only_tags());
    fill(
        templates::FRAME_CAPTURE_UTILS_SOURCE,
        &[
            ("script_name", script),
            ("data_source_name", source),
            ("write_param_type_to_stream_cases", &gl.write_to_stream),
            ("write_param_type_to_stream_cases_cl", &cl.write_to_stream),
            ("param_type_to_string_cases", &gl.to_string),
            ("param_type_to_string_cases_cl", &cl.to_string),
            ("param_type_resource_id_cases", &gl.resource_id),
            ("param_type_resource_id_cases_cl", &cl.resource_id),
            ("resource_id_type_name_cases", &gl.resource_id_name),
            ("resource_id_type_name_cases_cl", &cl.resource_id_name),
        ],
    )
}
