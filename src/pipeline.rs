//! Pipeline Module for the Entry Point Generator
//!
//! One generation run. The policy table is verified up front, then each API
//! is walked version by version and extension by extension, and the whole
//! output catalog is rendered into an [`OutputSet`] in memory. Nothing here
//! touches the filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::capture::{capture_method, capture_proto, CaptureFile};
use crate::capture_utils::{utils_header, utils_source};
use crate::entry_points::{declaration, definition, export_shim, stub};
use crate::error::{GeneratorError, Result};
use crate::exports::{self, egl_export_name, DefExports};
use crate::model::{Command, CommandModel, Feature};
use crate::names::{DuplicateTracker, NameResolver, Occurrence};
use crate::output::OutputSet;
use crate::param_types::ParamTypeRegistry;
use crate::policy::{PolicyEngine, PolicyFlags, PolicyTable};
use crate::registry::{Api, ExtensionFamily, Tables};
use crate::replay::{replay_cases, replay_source};
use crate::signature::ResolvedCommand;
use crate::templates::{self, fill};
use crate::validation::{context_lock_proto, context_private_proto, validation_proto, ContextDecls};

/// Data source cited by the `.def` files, which mix every registry.
pub const DEF_DATA_SOURCE: &str = "Khronos and ANGLE XML files";

/// GLES1 extensions listed in the Context header without declarations.
const NO_CONTEXT_DECL_EXTENSIONS: &[&str] = &["GL_OES_framebuffer_object"];

const LIBGLESV2_DEF_VARIANTS: &[&str] = &["", "_no_capture", "_with_capture", "_vulkan_secondaries"];
const LIBEGL_DEF_VARIANTS: &[&str] = &["", "_vulkan_secondaries"];

fn src_path(dir: &str, file: String) -> PathBuf {
    PathBuf::from("src").join(dir).join(file)
}

fn wrap(open: &str, body: &[String], close: &str) -> String {
    std::iter::once(open)
        .chain(body.iter().map(String::as_str))
        .chain(std::iter::once(close))
        .collect::<Vec<_>>()
        .join("\n")
}

fn extern_c(body: &[String]) -> String {
    wrap("extern \"C\" {", body, "} // extern \"C\"")
}

/// `3_1` → (`3`, `1`).
fn version_parts(version: &Feature) -> (&str, &str) {
    version.name.split_once('_').unwrap_or((version.name.as_str(), "0"))
}

fn flags_for<'p>(policies: &'p PolicyTable, command: &Command) -> Result<&'p PolicyFlags> {
    policies.get(&command.name).ok_or_else(|| GeneratorError::MalformedSpec {
        api: command.api,
        command: command.name.clone(),
        text: "command was not classified before emission".to_string(),
    })
}

fn expect_api(model: &CommandModel, api: Api) -> Result<()> {
    if model.api == api {
        Ok(())
    } else {
        Err(GeneratorError::invalid(
            &model.data_source,
            format!("expected the {} registry, found {}", api, model.api),
        ))
    }
}

/// Splits an extension's commands into the ones it defines and the
/// "already defined" markers for those an earlier extension defined.
fn extension_commands<'m>(
    model: &'m CommandModel,
    extension: &'m Feature,
    tracker: &mut DuplicateTracker,
) -> (Vec<&'m Command>, Vec<String>) {
    let mut kept = Vec::new();
    let mut markers = Vec::new();
    for command in model.feature_commands(extension) {
        match tracker.observe(&extension.name, &command.name) {
            Occurrence::First => kept.push(command),
            Occurrence::Duplicate { extension: first, original } => {
                debug!(
                    command = %command.name,
                    extension = %extension.name,
                    defined_by = %first,
                    original = %original,
                    "skipping duplicate entry point"
                );
                markers.push(format!("// {} is already defined.\n", command.short_name()));
            }
        }
    }
    (kept, markers)
}

fn names<'s, 'c>(commands: &'s [&'c Command]) -> impl Iterator<Item = &'c str> + 's {
    commands.iter().map(|c| c.name.as_str())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything emitted for the commands of one version or extension.
#[derive(Debug, Default)]
struct Section {
    decls: Vec<String>,
    defs: Vec<String>,
    export_defs: Vec<String>,
    validation_protos: Vec<String>,
    context_lock_protos: Vec<String>,
    /// (prototype, canonical short name)
    private_calls: Vec<(String, String)>,
    capture_protos: Vec<String>,
    capture_methods: Vec<String>,
    pointer_funcs: Vec<String>,
}

/// Which capture lists repeat the section comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureComments {
    None,
    Prototypes,
    All,
}

/// Section contents accumulated across a whole file, each section led by
/// its comment line.
#[derive(Debug, Default)]
struct Accumulated {
    decls: Vec<String>,
    defs: Vec<String>,
    validation_protos: Vec<String>,
    context_lock_protos: Vec<String>,
    capture_protos: Vec<String>,
    capture_methods: Vec<String>,
    pointer_funcs: Vec<String>,
}

impl Accumulated {
    fn push(&mut self, comment: &str, section: Section, captures: CaptureComments) {
        self.decls.push(comment.to_string());
        self.decls.extend(section.decls);
        self.defs.push(comment.to_string());
        self.defs.extend(section.defs);
        self.validation_protos.push(comment.to_string());
        self.validation_protos.extend(section.validation_protos);
        if !section.context_lock_protos.is_empty() {
            self.context_lock_protos.push(comment.to_string());
            self.context_lock_protos.extend(section.context_lock_protos);
        }
        if captures != CaptureComments::None {
            self.capture_protos.push(comment.to_string());
        }
        if captures == CaptureComments::All {
            self.capture_methods.push(comment.to_string());
            self.pointer_funcs.push(comment.to_string());
        }
        self.capture_protos.extend(section.capture_protos);
        self.capture_methods.extend(section.capture_methods);
        self.pointer_funcs.extend(section.pointer_funcs);
    }
}

/// Context-private call prototypes, first declaration of each function wins.
#[derive(Debug, Default)]
struct PrivateCalls {
    protos: Vec<String>,
    functions: BTreeSet<String>,
}

impl PrivateCalls {
    fn extend(&mut self, calls: Vec<(String, String)>) {
        for (proto, function) in calls {
            if self.functions.insert(function) {
                self.protos.push(proto);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR
// ═══════════════════════════════════════════════════════════════════════════════

struct Generator<'a> {
    script: &'a str,
    tables: &'a Tables,
    policies: PolicyTable,
    param_types: ParamTypeRegistry,
    outputs: OutputSet,
    /// Forwarding shims of `libGLESv2_autogen.cpp`.
    gles_lib_defs: Vec<String>,
    /// GLES exports of the libGLESv2 `.def` files.
    gles_exports: DefExports,
    /// Commands dispatched by the replay source.
    replay: Vec<&'a Command>,
}

impl<'a> Generator<'a> {
    fn emit(&mut self, commands: &[&'a Command]) -> Result<Section> {
        let mut section = Section::default();
        for &command in commands {
            let flags = flags_for(&self.policies, command)?;
            let rc = ResolvedCommand::resolve(command, flags, self.tables);

            section.decls.push(declaration(&rc));
            section.defs.push(definition(&rc)?);
            section.export_defs.push(export_shim(&rc));
            section.validation_protos.push(validation_proto(&rc));
            match rc.api() {
                Api::Gles if flags.lock.is_context_private() => {
                    section.private_calls.push(context_private_proto(&rc));
                }
                Api::Egl => section.context_lock_protos.push(context_lock_proto(&rc)),
                _ => {}
            }
            section.capture_protos.push(capture_proto(&rc));
            let capture = capture_method(&rc, &mut self.param_types)?;
            section.capture_methods.push(capture.method);
            section.pointer_funcs.extend(capture.pointer_funcs);
        }
        Ok(section)
    }

    /// Stub prototypes of `emitted`, in command table order.
    fn stubs(&self, model: &CommandModel, emitted: &BTreeSet<&str>) -> Result<String> {
        let mut stubs = Vec::new();
        for command in model.introduced() {
            if !emitted.contains(command.name.as_str()) {
                continue;
            }
            let flags = flags_for(&self.policies, command)?;
            stubs.push(stub(&ResolvedCommand::resolve(command, flags, self.tables)));
        }
        Ok(stubs.join("\n"))
    }

    // ───────────────────────────────────────────────────────────────────────────
    // File writers
    // ───────────────────────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn entry_point_files(
        &mut self,
        annotation: &str,
        comment: &str,
        source: &str,
        header_includes: &str,
        source_includes: &str,
        decls: String,
        defs: String,
    ) {
        let lower = annotation.to_lowercase();
        let upper = annotation.to_uppercase();
        for (template, extension, includes, body) in [
            (templates::ENTRY_POINT_HEADER, "h", header_includes, decls),
            (templates::ENTRY_POINT_SOURCE, "cpp", source_includes, defs),
        ] {
            let contents = fill(
                template,
                &[
                    ("script_name", self.script),
                    ("data_source_name", source),
                    ("annotation_lower", &lower),
                    ("annotation_upper", &upper),
                    ("comment", comment),
                    ("lib", "LIBGLESV2"),
                    ("includes", includes),
                    ("entry_points", &body),
                ],
            );
            self.outputs.insert(
                src_path("libGLESv2", format!("entry_points_{}_autogen.{}", lower, extension)),
                contents,
            );
        }
    }

    fn validation_header(
        &mut self,
        template: &str,
        annotation: &str,
        comment: &str,
        source: &str,
        protos: &[String],
    ) {
        let contents = fill(
            template,
            &[
                ("script_name", self.script),
                ("data_source_name", source),
                ("annotation", annotation),
                ("comment", comment),
                ("prototypes", &protos.join("\n")),
            ],
        );
        self.outputs.insert(
            src_path("libANGLE", format!("validation{}_autogen.h", annotation)),
            contents,
        );
    }

    fn capture_files(
        &mut self,
        header: &CaptureFile,
        source_file: &CaptureFile,
        source: &str,
        accumulated: &Accumulated,
    ) {
        let dir = PathBuf::from("src").join("libANGLE").join("capture");
        let contents = header.header(
            self.script,
            source,
            &accumulated.capture_protos,
            &accumulated.pointer_funcs,
        );
        self.outputs
            .insert(dir.join(format!("capture_{}_autogen.h", header.annotation)), contents);
        let contents = source_file.source(self.script, source, &accumulated.capture_methods);
        self.outputs
            .insert(dir.join(format!("capture_{}_autogen.cpp", source_file.annotation)), contents);
    }

    fn context_header(&mut self, annotation: &str, version: &str, source: &str, interface: &[String]) {
        let contents = fill(
            templates::CONTEXT_HEADER,
            &[
                ("script_name", self.script),
                ("data_source_name", source),
                ("annotation_lower", &annotation.to_lowercase()),
                ("annotation_upper", &annotation.to_uppercase()),
                ("version", version),
                ("interface", &interface.join("\n")),
            ],
        );
        self.outputs.insert(
            src_path("libANGLE", format!("Context_{}_autogen.h", annotation.to_lowercase())),
            contents,
        );
    }

    fn stubs_header(&mut self, template: &str, annotation: &str, title: &str, source: &str, stubs: &str) {
        let contents = fill(
            template,
            &[
                ("script_name", self.script),
                ("data_source_name", source),
                ("annotation_lower", &annotation.to_lowercase()),
                ("annotation_upper", &annotation.to_uppercase()),
                ("title", title),
                ("stubs", stubs),
            ],
        );
        self.outputs.insert(
            src_path("libGLESv2", format!("{}_stubs_autogen.h", annotation.to_lowercase())),
            contents,
        );
    }

    // ───────────────────────────────────────────────────────────────────────────
    // GLES
    // ───────────────────────────────────────────────────────────────────────────

    fn gles(&mut self, model: &'a CommandModel) -> Result<()> {
        let source = model.data_source.as_str();
        let mut private_calls = PrivateCalls::default();

        for version in &model.versions {
            let commands: Vec<&Command> = model.feature_commands(version).collect();
            let section = self.emit(&commands)?;
            let (major, minor) = version_parts(version);
            let dotted = version.dotted();
            let annotation = format!("gles_{}", version.name);
            let major_if_not_one = if major == "1" { "" } else { major };
            let minor_if_not_zero = if minor == "0" { "" } else { minor };
            let validation_annotation = format!("ES{}{}", major, minor_if_not_zero);

            self.gles_lib_defs.push(format!("\n// OpenGL ES {}", dotted));
            self.gles_lib_defs.extend(section.export_defs);
            self.gles_exports
                .section(&format!("OpenGL ES {}", dotted), names(&commands), str::to_string);

            let header_includes = fill(
                templates::GLES_HEADER_INCLUDES,
                &[("major", major_if_not_one), ("minor", minor_if_not_zero)],
            );
            let source_includes = fill(
                templates::GLES_SOURCE_INCLUDES,
                &[
                    ("header_version", &annotation),
                    ("validation_header_version", &validation_annotation),
                ],
            );
            self.entry_point_files(
                &annotation,
                &format!("GLES {}", dotted),
                source,
                &header_includes,
                &source_includes,
                extern_c(&section.decls),
                extern_c(&section.defs),
            );

            self.validation_header(
                templates::GL_VALIDATION_HEADER,
                &validation_annotation,
                &format!("ES {}", dotted),
                source,
                &section.validation_protos,
            );

            let capture = CaptureFile {
                api: Api::Gles,
                annotation: annotation.clone(),
                validation_annotation,
                comment: dotted,
            };
            let captures = Accumulated {
                capture_protos: section.capture_protos,
                capture_methods: section.capture_methods,
                pointer_funcs: section.pointer_funcs,
                ..Default::default()
            };
            self.capture_files(&capture, &capture, source, &captures);

            let mut context = ContextDecls::new();
            let mut interface = Vec::new();
            for &command in &commands {
                let flags = flags_for(&self.policies, command)?;
                let rc = ResolvedCommand::resolve(command, flags, self.tables);
                interface.extend(context.declare(&rc));
            }
            self.context_header(&annotation, &version.name, source, &interface);

            private_calls.extend(section.private_calls);
            info!(version = %version.name, commands = commands.len(), "GLES version emitted");
            self.replay.extend(commands);
        }

        self.gles_extensions(model, private_calls)
    }

    fn gles_extensions(&mut self, model: &'a CommandModel, mut private_calls: PrivateCalls) -> Result<()> {
        let source = model.data_source.as_str();
        let core_names: Vec<&str> = model
            .versions
            .iter()
            .flat_map(|v| v.commands.iter().map(String::as_str))
            .collect();
        let mut context = ContextDecls::seeded(core_names);
        let mut tracker = DuplicateTracker::new(NameResolver::new(Api::Gles));
        let mut accumulated = Accumulated::default();
        let mut families: BTreeMap<ExtensionFamily, Vec<String>> = BTreeMap::new();
        let mut emitted = 0;

        for extension in &model.extensions {
            let (commands, markers) = extension_commands(model, extension, &mut tracker);
            let mut section = self.emit(&commands)?;
            let comment = format!("\n// {}", extension.name);

            self.gles_lib_defs.push(comment.clone());
            self.gles_lib_defs.extend(std::mem::take(&mut section.export_defs));
            self.gles_exports
                .section(&extension.name, names(&commands), str::to_string);
            private_calls.extend(std::mem::take(&mut section.private_calls));
            accumulated.push(&comment, section, CaptureComments::Prototypes);
            accumulated.defs.extend(markers);

            if let Some(family) = extension.family {
                let lines = families.entry(family).or_default();
                lines.push(format!("    /* {} */ \\", extension.name));
                if !NO_CONTEXT_DECL_EXTENSIONS.contains(&extension.name.as_str()) {
                    for &command in &commands {
                        let flags = flags_for(&self.policies, command)?;
                        let rc = ResolvedCommand::resolve(command, flags, self.tables);
                        lines.extend(context.declare(&rc));
                    }
                }
            }

            emitted += commands.len();
            self.replay.extend(commands);
        }

        let header_includes = format!(
            "{}{}",
            fill(templates::GLES_HEADER_INCLUDES, &[("major", ""), ("minor", "")]),
            templates::GLES_EXT_HEADER_EXTRA_INCLUDES
        );
        let base_source_includes = fill(
            templates::GLES_SOURCE_INCLUDES,
            &[
                ("header_version", "gles_ext"),
                ("validation_header_version", "ESEXT"),
            ],
        );
        let source_includes = format!(
            "{}{}",
            base_source_includes
                .strip_suffix("\nusing namespace gl;\n")
                .unwrap_or(&base_source_includes),
            templates::GLES_EXT_SOURCE_EXTRA_INCLUDES
        );
        self.entry_point_files(
            "gles_ext",
            "GLES extension",
            source,
            &header_includes,
            &source_includes,
            extern_c(&accumulated.decls),
            extern_c(&accumulated.defs),
        );

        self.validation_header(
            templates::GL_VALIDATION_HEADER,
            "ESEXT",
            "ES extension",
            source,
            &accumulated.validation_protos,
        );

        let capture = CaptureFile {
            api: Api::Gles,
            annotation: "gles_ext".to_string(),
            validation_annotation: "ESEXT".to_string(),
            comment: "extension".to_string(),
        };
        self.capture_files(&capture, &capture, source, &accumulated);

        let mut interface = Vec::new();
        for (family, lines) in families {
            interface.push(format!("\\\n    /* {} */ \\\n\\", family.title()));
            interface.extend(lines);
        }
        self.context_header("gles_ext", "EXT", source, &interface);

        let contents = fill(
            templates::CONTEXT_PRIVATE_CALL_HEADER,
            &[
                ("script_name", self.script),
                ("data_source_name", source),
                ("prototypes", &private_calls.protos.join("\n")),
            ],
        );
        self.outputs
            .insert(src_path("libANGLE", "context_private_call_autogen.h".to_string()), contents);

        info!(
            extensions = model.extensions.len(),
            commands = emitted,
            private_calls = private_calls.protos.len(),
            "GLES extensions emitted"
        );
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // CL
    // ───────────────────────────────────────────────────────────────────────────

    fn cl(&mut self, model: &'a CommandModel) -> Result<()> {
        let source = model.data_source.as_str();
        let mut accumulated = Accumulated::default();
        let mut lib_defs = Vec::new();
        let mut emitted: BTreeSet<&str> = BTreeSet::new();
        let mut tracker = DuplicateTracker::new(NameResolver::new(Api::Cl));

        let mut features: Vec<(String, Vec<&'a Command>, Vec<String>)> = Vec::new();
        for version in &model.versions {
            let commands: Vec<&Command> = model.feature_commands(version).collect();
            features.push((format!("CL {}", version.dotted()), commands, Vec::new()));
        }
        for extension in &model.extensions {
            let (commands, markers) = extension_commands(model, extension, &mut tracker);
            features.push((extension.name.clone(), commands, markers));
        }

        for (title, commands, markers) in features {
            if commands.is_empty() {
                continue;
            }
            let section = self.emit(&commands)?;
            let comment = format!("\n// {}", title);
            lib_defs.push(comment.clone());
            lib_defs.extend(section.export_defs.iter().cloned());
            accumulated.push(&comment, section, CaptureComments::All);
            accumulated.defs.extend(markers);
            emitted.extend(names(&commands));
        }

        self.entry_point_files(
            "cl",
            "CL",
            source,
            templates::CL_HEADER_INCLUDES,
            templates::CL_SOURCE_INCLUDES,
            wrap("namespace cl\n{", &accumulated.decls, "}  // namespace cl"),
            wrap("namespace cl\n{", &accumulated.defs, "}  // namespace cl"),
        );
        self.validation_header(
            templates::CL_VALIDATION_HEADER,
            "CL",
            "CL",
            source,
            &accumulated.validation_protos,
        );
        let stubs = self.stubs(model, &emitted)?;
        self.stubs_header(templates::CL_STUBS_HEADER, "cl", "CL", source, &stubs);

        let capture = CaptureFile {
            api: Api::Cl,
            annotation: "cl".to_string(),
            validation_annotation: "CL_autogen".to_string(),
            comment: String::new(),
        };
        self.capture_files(&capture, &capture, source, &accumulated);

        let contents = exports::lib_export_source(
            self.script,
            source,
            "libOpenCL",
            "CL",
            templates::LIBCL_EXPORT_INCLUDES,
            &lib_defs.join("\n"),
        );
        self.outputs
            .insert(src_path("libOpenCL", "libOpenCL_autogen.cpp".to_string()), contents);

        info!(commands = emitted.len(), "CL emitted");
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // EGL
    // ───────────────────────────────────────────────────────────────────────────

    fn egl(&mut self, model: &'a CommandModel) -> Result<DefExports> {
        let source = model.data_source.as_str();
        let mut core = Accumulated::default();
        let mut ext = Accumulated::default();
        let mut lib_defs = Vec::new();
        let mut egl_exports = DefExports::new();
        let mut gles_exports = DefExports::new();
        let mut core_emitted: BTreeSet<&str> = BTreeSet::new();
        let mut ext_emitted: BTreeSet<&str> = BTreeSet::new();

        for version in &model.versions {
            let commands: Vec<&Command> = model.feature_commands(version).collect();
            if commands.is_empty() {
                continue;
            }
            let section = self.emit(&commands)?;
            let title = format!("EGL {}", version.dotted());
            let comment = format!("\n// {}", title);
            lib_defs.push(comment.clone());
            lib_defs.extend(section.export_defs.iter().cloned());
            egl_exports.section(&title, names(&commands), str::to_string);
            gles_exports.section(&title, names(&commands), egl_export_name);
            core.push(&comment, section, CaptureComments::None);
            core_emitted.extend(names(&commands));
            self.replay.extend(commands);
        }

        let mut tracker = DuplicateTracker::new(NameResolver::new(Api::Egl));
        for extension in &model.extensions {
            let (commands, markers) = extension_commands(model, extension, &mut tracker);
            if commands.is_empty() {
                continue;
            }
            let section = self.emit(&commands)?;
            let comment = format!("\n// {}", extension.name);
            lib_defs.push(comment.clone());
            lib_defs.extend(section.export_defs.iter().cloned());
            egl_exports.section(&extension.name, names(&commands), str::to_string);
            gles_exports.section(&extension.name, names(&commands), egl_export_name);
            ext.push(&comment, section, CaptureComments::None);
            ext.defs.extend(markers);
            ext_emitted.extend(names(&commands));
        }

        self.entry_point_files(
            "egl",
            "EGL",
            source,
            templates::EGL_HEADER_INCLUDES,
            templates::EGL_SOURCE_INCLUDES,
            extern_c(&core.decls),
            extern_c(&core.defs),
        );
        self.entry_point_files(
            "egl_ext",
            "EGL Extension",
            source,
            templates::EGL_EXT_HEADER_INCLUDES,
            templates::EGL_EXT_SOURCE_INCLUDES,
            extern_c(&ext.decls),
            extern_c(&ext.defs),
        );

        let stubs = self.stubs(model, &core_emitted)?;
        self.stubs_header(templates::EGL_STUBS_HEADER, "egl", "EGL", source, &stubs);
        let stubs = self.stubs(model, &ext_emitted)?;
        self.stubs_header(templates::EGL_STUBS_HEADER, "egl_ext", "EXT extension", source, &stubs);

        // Validation, context locks and captures cover core and extensions
        // in one file each.
        let mut all = core;
        all.validation_protos.extend(ext.validation_protos);
        all.context_lock_protos.extend(ext.context_lock_protos);
        all.capture_protos.extend(ext.capture_protos);
        all.capture_methods.extend(ext.capture_methods);
        all.pointer_funcs.extend(ext.pointer_funcs);

        self.validation_header(
            templates::EGL_VALIDATION_HEADER,
            "EGL",
            "EGL",
            source,
            &all.validation_protos,
        );
        let contents = fill(
            templates::EGL_CONTEXT_LOCK_HEADER,
            &[
                ("script_name", self.script),
                ("data_source_name", source),
                ("annotation_lower", "egl"),
                ("annotation_upper", "EGL"),
                ("comment", "EGL"),
                ("prototypes", &all.context_lock_protos.join("\n")),
            ],
        );
        self.outputs
            .insert(src_path("libGLESv2", "egl_context_lock_autogen.h".to_string()), contents);

        let header = CaptureFile {
            api: Api::Egl,
            annotation: "egl".to_string(),
            validation_annotation: "EGL".to_string(),
            comment: "EGL".to_string(),
        };
        let capture_source = CaptureFile {
            comment: "all".to_string(),
            ..header.clone()
        };
        self.capture_files(&header, &capture_source, source, &all);

        let contents = exports::lib_export_source(
            self.script,
            source,
            "libEGL",
            "EGL",
            templates::LIBEGL_EXPORT_INCLUDES_AND_PREAMBLE,
            &lib_defs.join("\n"),
        );
        self.outputs
            .insert(src_path("libEGL", "libEGL_autogen.cpp".to_string()), contents);

        for variant in LIBEGL_DEF_VARIANTS {
            let lib = format!("libEGL{}", variant);
            let contents = egl_exports.render(self.script, source, &lib);
            self.outputs
                .insert(src_path("libEGL", format!("{}_autogen.def", lib)), contents);
        }

        info!(
            core = core_emitted.len(),
            extensions = ext_emitted.len(),
            "EGL emitted"
        );
        Ok(gles_exports)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Global artifacts
    // ───────────────────────────────────────────────────────────────────────────

    fn globals(&mut self, models: &[&CommandModel], gles: &CommandModel, egl_exports: &DefExports) {
        let source = gles.data_source.as_str();

        let enums = exports::entry_point_enums(models);
        self.outputs.insert(
            src_path("common", "entry_points_enum_autogen.h".to_string()),
            exports::enum_header(&enums, self.script, source),
        );
        self.outputs.insert(
            src_path("common", "entry_points_enum_autogen.cpp".to_string()),
            exports::enum_source(&enums, self.script, source),
        );

        let contents = exports::lib_export_source(
            self.script,
            source,
            "libGLESv2",
            "OpenGL ES",
            templates::LIBGLESV2_EXPORT_INCLUDES,
            &self.gles_lib_defs.join("\n"),
        );
        self.outputs
            .insert(src_path("libGLESv2", "libGLESv2_autogen.cpp".to_string()), contents);

        let mut def = self.gles_exports.clone();
        def.extend(egl_exports);
        for variant in LIBGLESV2_DEF_VARIANTS {
            let lib = format!("libGLESv2{}", variant);
            let contents = def.render(self.script, DEF_DATA_SOURCE, &lib);
            self.outputs
                .insert(src_path("libGLESv2", format!("{}_autogen.def", lib)), contents);
        }

        self.outputs.insert(
            src_path("common", "frame_capture_utils_autogen.h".to_string()),
            utils_header(&self.param_types, self.script, source),
        );
        self.outputs.insert(
            src_path("common", "frame_capture_utils_autogen.cpp".to_string()),
            utils_source(&self.param_types, self.script, source),
        );

        let resource_ids: BTreeSet<String> = self.param_types.resource_ids().into_iter().collect();
        let cases = replay_cases(self.replay.iter().copied(), self.tables, &resource_ids);
        self.outputs.insert(
            PathBuf::from("util")
                .join("capture")
                .join("frame_capture_replay_autogen.cpp"),
            replay_source(self.script, source, &cases),
        );

        info!(
            entry_points = enums.len(),
            param_types = self.param_types.len(),
            resource_ids = resource_ids.len(),
            "global artifacts emitted"
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Renders the complete output catalog. Fails before producing anything when
/// any command is malformed, unclassifiable or missing a policy parameter.
pub fn generate(
    script: &str,
    gles: &CommandModel,
    egl: &CommandModel,
    cl: &CommandModel,
    tables: &Tables,
) -> Result<OutputSet> {
    expect_api(gles, Api::Gles)?;
    expect_api(egl, Api::Egl)?;
    expect_api(cl, Api::Cl)?;
    info!(
        gles = gles.len(),
        egl = egl.len(),
        cl = cl.len(),
        "command tables built"
    );

    let models = [gles, egl, cl];
    let policies = PolicyEngine::new()?.verify(&models, tables)?;

    let mut generator = Generator {
        script,
        tables,
        policies,
        param_types: ParamTypeRegistry::new(),
        outputs: OutputSet::new(),
        gles_lib_defs: Vec::new(),
        gles_exports: DefExports::new(),
        replay: Vec::new(),
    };
    generator.gles(gles)?;
    generator.cl(cl)?;
    let egl_exports = generator.egl(egl)?;
    generator.globals(&models, gles, &egl_exports);

    info!(files = generator.outputs.len(), "output catalog rendered");
    Ok(generator.outputs)
}
