//! Export Tables for the Entry Point Generator
//!
//! Windows `.def` export lists, the exported library shims and the global
//! `angle::EntryPoint` enumeration with its name table.

use std::collections::BTreeSet;

use crate::model::CommandModel;
use crate::templates::{self, fill};

// ═══════════════════════════════════════════════════════════════════════════════
// DEF FILES
// ═══════════════════════════════════════════════════════════════════════════════

/// Lines of a `.def` file's `EXPORTS` section.
#[derive(Debug, Clone, Default)]
pub struct DefExports {
    lines: Vec<String>,
}

impl DefExports {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `; comment` line followed by the sorted, renamed commands.
    pub fn section<'a>(
        &mut self,
        comment: &str,
        commands: impl IntoIterator<Item = &'a str>,
        rename: impl Fn(&str) -> String,
    ) {
        let mut names: Vec<&str> = commands.into_iter().collect();
        names.sort_unstable();
        self.lines.push(format!("\n    ; {}", comment));
        self.lines.extend(names.into_iter().map(|name| format!("    {}", rename(name))));
    }

    pub fn extend(&mut self, other: &DefExports) {
        self.lines.extend(other.lines.iter().cloned());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self, script: &str, source: &str, lib: &str) -> String {
        fill(
            templates::WINDOWS_DEF_FILE,
            &[
                ("script_name", script),
                ("data_source_name", source),
                ("lib", lib),
                ("exports", &self.lines.join("\n")),
            ],
        )
    }
}

/// `eglBindAPI` → `EGL_BindAPI`, the name libGLESv2 exports it under.
pub fn egl_export_name(name: &str) -> String {
    format!("EGL_{}", name.get(3..).unwrap_or_default())
}

/// `libGLESv2_autogen.cpp` and friends: `extern "C"` forwarding shims.
pub fn lib_export_source(
    script: &str,
    source: &str,
    lib_name: &str,
    lib_description: &str,
    includes: &str,
    entry_points: &str,
) -> String {
    fill(
        templates::LIB_ENTRY_POINT_SOURCE,
        &[
            ("script_name", script),
            ("data_source_name", source),
            ("lib_name", lib_name),
            ("lib_description", lib_description),
            ("includes", includes),
            ("entry_points", entry_points),
        ],
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT ENUMERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// `(enumerator, command)` pairs: `Invalid` first, then every introduced
/// command of every API, sorted and unique.
pub fn entry_point_enums(models: &[&CommandModel]) -> Vec<(String, String)> {
    let unique: BTreeSet<(String, String)> = models
        .iter()
        .flat_map(|model| model.introduced())
        .map(|command| {
            (
                format!("{}{}", command.api.enum_prefix(), command.short_name()),
                command.name.clone(),
            )
        })
        .collect();
    std::iter::once(("Invalid".to_string(), "Invalid".to_string()))
        .chain(unique)
        .collect()
}

pub fn enum_header(enums: &[(String, String)], script: &str, source: &str) -> String {
    let list = enums
        .iter()
        .map(|(enumerator, _)| format!("    {}", enumerator))
        .collect::<Vec<_>>()
        .join(",\n");
    fill(
        templates::ENTRY_POINTS_ENUM_HEADER,
        &[
            ("script_name", script),
            ("data_source_name", source),
            ("lib", "GL/GLES"),
            ("entry_points_list", &list),
        ],
    )
}

pub fn enum_source(enums: &[(String, String)], script: &str, source: &str) -> String {
    let cases = enums
        .iter()
        .map(|(enumerator, cmd)| {
            fill(templates::ENTRY_POINTS_NAME_CASE, &[("enum", enumerator), ("cmd", cmd)])
        })
        .collect::<Vec<_>>()
        .join("\n");
    fill(
        templates::ENTRY_POINTS_ENUM_SOURCE,
        &[
            ("script_name", script),
            ("data_source_name", source),
            ("lib", "GL/GLES"),
            ("entry_points_name_cases", &cases),
        ],
    )
}
