//! Policy Engine for the Entry Point Generator
//!
//! Every per-command decision (locking, context-private routing, tail calls,
//! implicit pixel-local-storage disable, lost-context tolerance, capture
//! exemption, back-end initialization, swap preamble) comes from one declared
//! rule table. Rules are grouped into families; within a family at most one
//! rule may match a command, and the table is verified against every command
//! of the run before anything is emitted.

use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{GeneratorError, Result};
use crate::model::{Command, CommandModel};
use crate::names::NameResolver;
use crate::registry::{Api, ObjectCategory, Tables};

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARED NAME LISTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Commands that only touch state of the current context.
const CONTEXT_PRIVATE_NAMES: &[&str] = &[
    "glActiveTexture",
    "glBlendColor",
    "glBlobCacheCallbacksANGLE",
    "glClearColor",
    "glClearDepthf",
    "glClearStencil",
    "glClipControl",
    "glColorMask",
    "glColorMaski",
    "glCoverageModulation",
    "glCullFace",
    "glDepthFunc",
    "glDepthMask",
    "glDepthRangef",
    "glDisable",
    "glDisablei",
    "glEnable",
    "glEnablei",
    "glFrontFace",
    "glHint",
    "glIsEnabled",
    "glIsEnabledi",
    "glLineWidth",
    "glLogicOpANGLE",
    "glMinSampleShading",
    "glPatchParameteri",
    "glPixelStorei",
    "glPolygonMode",
    "glPolygonModeNV",
    "glPolygonOffset",
    "glPolygonOffsetClamp",
    "glPrimitiveBoundingBox",
    "glProvokingVertex",
    "glSampleCoverage",
    "glSampleMaski",
    "glScissor",
    "glShadingRate",
    "glShadingRateCombinerOps",
    "glStencilFunc",
    "glStencilFuncSeparate",
    "glStencilMask",
    "glStencilMaskSeparate",
    "glStencilOp",
    "glStencilOpSeparate",
    "glViewport",
    // GLES1
    "glAlphaFunc",
    "glAlphaFuncx",
    "glClearColorx",
    "glClearDepthx",
    "glColor4f",
    "glColor4ub",
    "glColor4x",
    "glDepthRangex",
    "glLineWidthx",
    "glLoadIdentity",
    "glLogicOp",
    "glMatrixMode",
    "glPointSize",
    "glPointSizex",
    "glPopMatrix",
    "glPolygonOffsetx",
    "glPushMatrix",
    "glSampleCoveragex",
    "glShadeModel",
];

const CONTEXT_PRIVATE_GLOBS: &[&str] = &[
    "glBlendFunc*",
    "glBlendEquation*",
    "glVertexAttrib[1-4]*",
    "glVertexAttribI[1-4]*",
    "glVertexAttribP[1-4]*",
    "glVertexAttribL[1-4]*",
    // GLES1
    "glClipPlane[fx]",
    "glGetClipPlane[fx]",
    "glFog[fx]*",
    "glFrustum[fx]",
    "glGetLight[fx]v",
    "glGetMaterial[fx]v",
    "glGetTexEnv[fix]v",
    "glLoadMatrix[fx]",
    "glLight[fx]*",
    "glLightModel[fx]*",
    "glMaterial[fx]*",
    "glMultMatrix[fx]",
    "glMultiTexCoord4[fx]",
    "glNormal3[fx]",
    "glOrtho[fx]",
    "glPointParameter[fx]*",
    "glRotate[fx]",
    "glScale[fx]",
    "glTexEnv[fix]*",
    "glTranslate[fx]",
];

const PLS_DISABLE_NAMES: &[&str] = &[
    "glBeginTransformFeedback",
    "glBindFramebuffer",
    "glBlitFramebuffer",
    "glCopyTexImage2D",
    "glDiscardFramebufferEXT",
    "glDrawBuffers",
    "glFramebufferMemorylessPixelLocalStorageANGLE",
    "glFramebufferRenderbuffer",
    "glInvalidateFramebuffer",
    "glInvalidateSubFramebuffer",
    "glReadPixels",
    "glStartTilingQCOM",
];

const PLS_DISABLE_GLOBS: &[&str] = &[
    "glCopyTexSubImage*",
    "glFramebufferParameter*",
    "glFramebufferTexture*",
];

/// Uniform setters that may touch samplers or notify observers stay locked.
const UNIFORM_KEEP_LOCKED: &[&str] = &["glUniform1i", "glUniform1iv", "glUniformBlockBinding"];

const LOST_CONTEXT_PREFIXES: &[&str] = &[
    "glGetError",
    "glGetSync",
    "glGetQueryObjecti",
    "glGetQueryObjectui",
    "glGetProgramiv",
    "glGetGraphicsResetStatus",
    "glGetShaderiv",
];

const EGL_LOCKLESS: &[&str] = &[
    "eglGetError",
    "eglGetCurrentContext",
    "eglGetCurrentSurface",
    "eglGetCurrentDisplay",
    "eglLockVulkanQueueANGLE",
    "eglUnlockVulkanQueueANGLE",
];

const EGL_SYNC: &[&str] = &[
    "eglClientWaitSync",
    "eglCreateSync",
    "eglDestroySync",
    "eglGetSyncAttrib",
    "eglWaitSync",
    "eglCreateSyncKHR",
    "eglClientWaitSyncKHR",
    "eglDupNativeFenceFDANDROID",
    "eglCopyMetalSharedEventANGLE",
    "eglDestroySyncKHR",
    "eglGetSyncAttribKHR",
    "eglSignalSyncKHR",
    "eglWaitSyncKHR",
];

/// Entry points writing state reachable from both sync and non-sync calls.
const EGL_DUAL: &[&str] = &["eglTerminate", "eglLabelObjectKHR", "eglReleaseThread", "eglInitialize"];

const TAIL_CALL_DISCARD_NAMES: &[&str] = &[
    "eglDestroySurface",
    "eglMakeCurrent",
    "eglReleaseThread",
    "eglCreateWindowSurface",
    "eglCreatePlatformWindowSurface",
    "eglCreatePlatformWindowSurfaceEXT",
    "eglPrepareSwapBuffersANGLE",
    "glFinishFenceNV",
    "glCompileShader",
    "glLinkProgram",
    "glShaderBinary",
    "glFlush",
    "glFinish",
];

/// Texture uploads may finish on the host after the lock is released.
const TAIL_CALL_DISCARD_PREFIXES: &[&str] = &[
    "glTexImage2D",
    "glTexImage3D",
    "glTexSubImage2D",
    "glTexSubImage3D",
    "glCompressedTexImage2D",
    "glCompressedTexImage3D",
    "glCompressedTexSubImage2D",
    "glCompressedTexSubImage3D",
];

const TAIL_CALL_RETURN_VALUE: &[&str] = &[
    "eglClientWaitSyncKHR",
    "eglClientWaitSync",
    "eglCreateImageKHR",
    "eglCreateImage",
    "eglCreateSyncKHR",
    "eglCreateSync",
    "eglDestroySyncKHR",
    "eglDestroySync",
    "eglGetCompositorTimingANDROID",
    "eglGetFrameTimestampsANDROID",
    "eglSwapBuffers",
    "eglSwapBuffersWithDamageKHR",
    "eglWaitSyncKHR",
    "eglWaitSync",
    "glClientWaitSync",
];

/// Debug-marker entry points must not emit a trace event themselves.
const NO_EVENT_MARKER: &[&str] = &["glInsertEventMarkerEXT", "glPopGroupMarkerEXT", "glPushGroupMarkerEXT"];

/// Parameter shapes that cannot be captured automatically.
const CAPTURE_BLOCKLIST: &[&str] = &["eglGetProcAddress"];

const INIT_BACKENDS: &[&str] = &[
    "clGetPlatformIDs",
    "clGetPlatformInfo",
    "clGetDeviceIDs",
    "clCreateContext",
    "clCreateContextFromType",
];
const INIT_BACKENDS_ICD: &[&str] = &["clIcdGetPlatformIDsKHR"];

const SWAP_PREPARE_ALWAYS: &[&str] = &["eglSwapBuffers", "eglSwapBuffersWithDamageKHR"];
const SWAP_PREPARE_BUFFER_AGE: &[&str] = &["eglQuerySurface", "eglQuerySurface64KHR"];

// ═══════════════════════════════════════════════════════════════════════════════
// POLICY CATEGORIES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockClass {
    /// Share-group lock for GLES, global lock for EGL. OpenCL templates
    /// carry no lock statement.
    #[default]
    Standard,
    ContextPrivate,
    EglImageShare,
    SkipShareGroup,
    EglLockless,
    EglSync,
    EglDual,
}

impl LockClass {
    /// Statement acquiring the GLES context lock; empty when none is taken.
    pub fn gles_statement(self) -> &'static str {
        match self {
            LockClass::EglImageShare => "SCOPED_EGL_IMAGE_SHARE_CONTEXT_LOCK(context, imagePacked);",
            LockClass::SkipShareGroup | LockClass::ContextPrivate => "",
            _ => "SCOPED_SHARE_CONTEXT_LOCK(context);",
        }
    }

    pub fn egl_statement(self) -> &'static str {
        match self {
            LockClass::EglSync => "ANGLE_SCOPED_GLOBAL_EGL_SYNC_LOCK();",
            LockClass::EglDual => "ANGLE_SCOPED_GLOBAL_EGL_AND_EGL_SYNC_LOCK();",
            LockClass::EglLockless => "",
            _ => "ANGLE_SCOPED_GLOBAL_LOCK();",
        }
    }

    pub fn is_context_private(self) -> bool {
        self == LockClass::ContextPrivate
    }

    pub fn is_lockless(self) -> bool {
        self == LockClass::EglLockless
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TailCall {
    #[default]
    AssertNone,
    RunDiscard,
    RunWithReturnValue,
}

impl TailCall {
    pub fn statement(self) -> &'static str {
        match self {
            TailCall::AssertNone => "ASSERT(!egl::Display::GetCurrentThreadUnlockedTailCall()->any());",
            TailCall::RunDiscard => "egl::Display::GetCurrentThreadUnlockedTailCall()->run(nullptr);",
            TailCall::RunWithReturnValue => {
                "egl::Display::GetCurrentThreadUnlockedTailCall()->run(&returnValue);"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapPreamble {
    Always,
    /// Only when querying `EGL_BUFFER_AGE_EXT`.
    BufferAge,
}

pub const PLS_DISABLE_STATEMENT: &str = "if (context->getState().getPixelLocalStorageActivePlanes() != 0)\
{context->endPixelLocalStorageImplicit();}";

/// Everything the emitters need to know about one command's behavior.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyFlags {
    pub lock: LockClass,
    pub tail_call: TailCall,
    pub implicit_pls_disable: bool,
    pub lost_context_ok: bool,
    pub suppress_event: bool,
    pub capture_blocklisted: bool,
    pub init_backends: Option<bool>,
    pub swap_preamble: Option<SwapPreamble>,
    /// Declared owning-object category (EGL only).
    pub owning_object: Option<ObjectCategory>,
}

impl PolicyFlags {
    pub fn context_getter(&self) -> &'static str {
        if self.lost_context_ok {
            "GetGlobalContext()"
        } else {
            "GetValidGlobalContext()"
        }
    }

    /// Error raised when no valid context is current.
    pub fn lost_context_error(&self, entry_point: &str) -> String {
        if self.lost_context_ok {
            String::new()
        } else {
            format!("GenerateContextLostErrorOnCurrentGlobalContext({});", entry_point)
        }
    }

    pub fn pls_statement(&self) -> &'static str {
        if self.implicit_pls_disable {
            PLS_DISABLE_STATEMENT
        } else {
            ""
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RULE TABLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Rules in one family are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    GlesLock,
    EglLock,
    TailCall,
    ImplicitPlsDisable,
    LostContext,
    NoEventMarker,
    CaptureBlocklist,
    BackendInit,
    SwapPreamble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Lock(LockClass),
    TailCall(TailCall),
    InitBackEnds(bool),
    Preamble(SwapPreamble),
    Flag,
}

/// Which form of the command name a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Name,
    /// Suffix-stripped name, alias exceptions kept verbatim.
    Canonical,
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Names(&'static [&'static str]),
    Prefixes(&'static [&'static str]),
    /// Shell-style wildcards (`*`, `?`, `[...]`).
    Globs(&'static [&'static str]),
    PrefixExcept {
        prefix: &'static str,
        except: &'static [&'static str],
    },
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: &'static str,
    pub family: Family,
    /// `None` applies to every API.
    pub api: Option<Api>,
    pub subject: Subject,
    pub matchers: Vec<Matcher>,
    pub outcome: Outcome,
}

impl Rule {
    fn new(name: &'static str, family: Family, api: Option<Api>, outcome: Outcome) -> Self {
        Self {
            name,
            family,
            api,
            subject: Subject::Name,
            matchers: Vec::new(),
            outcome,
        }
    }

    fn canonical(mut self) -> Self {
        self.subject = Subject::Canonical;
        self
    }

    fn matching(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }
}

/// The declared table, in precedence order.
pub fn default_rules() -> Vec<Rule> {
    use Matcher::*;
    let gles = Some(Api::Gles);
    let egl = Some(Api::Egl);

    vec![
        // Context-private is checked first: it bypasses locking entirely.
        Rule::new("context-private", Family::GlesLock, gles, Outcome::Lock(LockClass::ContextPrivate))
            .canonical()
            .matching(Names(CONTEXT_PRIVATE_NAMES))
            .matching(Globs(CONTEXT_PRIVATE_GLOBS)),
        Rule::new("egl-image-share-lock", Family::GlesLock, gles, Outcome::Lock(LockClass::EglImageShare))
            .matching(Prefixes(&["glEGLImage"])),
        Rule::new("skip-share-group-lock", Family::GlesLock, gles, Outcome::Lock(LockClass::SkipShareGroup))
            .matching(Names(&["glBindBuffer"]))
            .matching(PrefixExcept {
                prefix: "glUniform",
                except: UNIFORM_KEEP_LOCKED,
            }),
        Rule::new("egl-lockless", Family::EglLock, egl, Outcome::Lock(LockClass::EglLockless))
            .matching(Names(EGL_LOCKLESS)),
        Rule::new("egl-sync-lock", Family::EglLock, egl, Outcome::Lock(LockClass::EglSync))
            .matching(Names(EGL_SYNC)),
        Rule::new("egl-dual-lock", Family::EglLock, egl, Outcome::Lock(LockClass::EglDual))
            .matching(Names(EGL_DUAL)),
        Rule::new("tail-call-discard", Family::TailCall, None, Outcome::TailCall(TailCall::RunDiscard))
            .matching(Names(TAIL_CALL_DISCARD_NAMES))
            .matching(Prefixes(TAIL_CALL_DISCARD_PREFIXES)),
        Rule::new(
            "tail-call-return-value",
            Family::TailCall,
            None,
            Outcome::TailCall(TailCall::RunWithReturnValue),
        )
        .matching(Names(TAIL_CALL_RETURN_VALUE)),
        Rule::new("implicit-pls-disable", Family::ImplicitPlsDisable, gles, Outcome::Flag)
            .matching(Names(PLS_DISABLE_NAMES))
            .matching(Globs(PLS_DISABLE_GLOBS)),
        Rule::new("lost-context-tolerant", Family::LostContext, gles, Outcome::Flag)
            .matching(Prefixes(LOST_CONTEXT_PREFIXES)),
        Rule::new("no-event-marker", Family::NoEventMarker, gles, Outcome::Flag).matching(Names(NO_EVENT_MARKER)),
        Rule::new("capture-blocklist", Family::CaptureBlocklist, None, Outcome::Flag)
            .matching(Names(CAPTURE_BLOCKLIST)),
        Rule::new("init-backends", Family::BackendInit, Some(Api::Cl), Outcome::InitBackEnds(false))
            .matching(Names(INIT_BACKENDS)),
        Rule::new("init-backends-icd", Family::BackendInit, Some(Api::Cl), Outcome::InitBackEnds(true))
            .matching(Names(INIT_BACKENDS_ICD)),
        Rule::new("swap-prepare", Family::SwapPreamble, egl, Outcome::Preamble(SwapPreamble::Always))
            .matching(Names(SWAP_PREPARE_ALWAYS)),
        Rule::new(
            "swap-prepare-buffer-age",
            Family::SwapPreamble,
            egl,
            Outcome::Preamble(SwapPreamble::BufferAge),
        )
        .matching(Names(SWAP_PREPARE_BUFFER_AGE)),
    ]
}

/// `glVertexAttrib[1-4]*` → `^glVertexAttrib[1-4].*$`.
fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::from("^");
    let mut in_class = false;
    for c in glob.chars() {
        match c {
            '*' if !in_class => pattern.push_str(".*"),
            '?' if !in_class => pattern.push('.'),
            '[' if !in_class => {
                in_class = true;
                pattern.push('[');
            }
            ']' if in_class => {
                in_class = false;
                pattern.push(']');
            }
            c if in_class => pattern.push(c),
            c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');
    pattern
}

#[derive(Debug)]
struct CompiledRule {
    rule: Rule,
    globs: Vec<Regex>,
}

impl CompiledRule {
    fn compile(rule: Rule) -> Result<Self> {
        let mut globs = Vec::new();
        for matcher in &rule.matchers {
            if let Matcher::Globs(patterns) = matcher {
                for glob in patterns.iter() {
                    let re = Regex::new(&glob_to_regex(glob)).map_err(|e| {
                        GeneratorError::invalid(
                            format!("rule {}", rule.name),
                            format!("bad wildcard `{}`: {}", glob, e),
                        )
                    })?;
                    globs.push(re);
                }
            }
        }
        Ok(Self { rule, globs })
    }

    fn matches(&self, api: Api, name: &str, canonical: &str) -> bool {
        if self.rule.api.is_some_and(|a| a != api) {
            return false;
        }
        let subject = match self.rule.subject {
            Subject::Name => name,
            Subject::Canonical => canonical,
        };
        let listed = self.rule.matchers.iter().any(|m| match m {
            Matcher::Names(names) => names.contains(&subject),
            Matcher::Prefixes(prefixes) => prefixes.iter().any(|p| subject.starts_with(p)),
            Matcher::Globs(_) => false,
            Matcher::PrefixExcept { prefix, except } => {
                subject.starts_with(prefix) && !except.contains(&subject)
            }
        });
        listed || self.globs.iter().any(|re| re.is_match(subject))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct PolicyEngine {
    rules: Vec<CompiledRule>,
}

/// Verified flags for every command of a run, keyed by command name.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    flags: BTreeMap<String, PolicyFlags>,
}

impl PolicyTable {
    pub fn get(&self, name: &str) -> Option<&PolicyFlags> {
        self.flags.get(name)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl PolicyEngine {
    pub fn new() -> Result<Self> {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<Rule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Classifies one command, failing when two rules of a family match.
    pub fn classify(&self, command: &Command, tables: &Tables) -> Result<PolicyFlags> {
        let api = command.api;
        let name = command.name.as_str();
        let canonical = NameResolver::new(api).canonical(name);

        let mut matched: BTreeMap<Family, &Rule> = BTreeMap::new();
        let mut flags = PolicyFlags::default();

        for compiled in &self.rules {
            if !compiled.matches(api, name, canonical) {
                continue;
            }
            let rule = &compiled.rule;
            if let Some(first) = matched.get(&rule.family) {
                return Err(GeneratorError::PolicyConflict {
                    command: name.to_string(),
                    first: first.name.to_string(),
                    second: rule.name.to_string(),
                });
            }
            matched.insert(rule.family, rule);

            match (rule.family, rule.outcome) {
                (_, Outcome::Lock(lock)) => flags.lock = lock,
                (_, Outcome::TailCall(tail)) => flags.tail_call = tail,
                (_, Outcome::InitBackEnds(value)) => flags.init_backends = Some(value),
                (_, Outcome::Preamble(preamble)) => flags.swap_preamble = Some(preamble),
                (Family::ImplicitPlsDisable, Outcome::Flag) => flags.implicit_pls_disable = true,
                (Family::LostContext, Outcome::Flag) => flags.lost_context_ok = true,
                (Family::NoEventMarker, Outcome::Flag) => flags.suppress_event = true,
                (Family::CaptureBlocklist, Outcome::Flag) => flags.capture_blocklisted = true,
                (_, Outcome::Flag) => {}
            }
        }

        // Context-private templates have no lock to release before a tail
        // call and no slot for the implicit PLS disable.
        if let Some(private) = matched.get(&Family::GlesLock).filter(|r| {
            r.outcome == Outcome::Lock(LockClass::ContextPrivate)
        }) {
            for family in [Family::TailCall, Family::ImplicitPlsDisable] {
                if let Some(other) = matched.get(&family) {
                    return Err(GeneratorError::PolicyConflict {
                        command: name.to_string(),
                        first: private.name.to_string(),
                        second: other.name.to_string(),
                    });
                }
            }
        }

        if api == Api::Egl {
            flags.owning_object = tables.egl_objects.category(name);
        }
        Ok(flags)
    }

    /// Classifies every command of the run. Called once, before emission.
    pub fn verify(&self, models: &[&CommandModel], tables: &Tables) -> Result<PolicyTable> {
        let mut table = PolicyTable::default();
        for model in models {
            for command in model.introduced() {
                let flags = self.classify(command, tables)?;
                if flags != PolicyFlags::default() {
                    debug!(command = %command.name, ?flags, "classified");
                }
                table.flags.insert(command.name.clone(), flags);
            }
        }
        info!(commands = table.len(), rules = self.rules.len(), "policy rules verified");
        Ok(table)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OWNING OBJECT RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Packed type (first word) carrying each owning-object category.
fn category_param_type(category: ObjectCategory) -> Option<&'static str> {
    Some(match category {
        ObjectCategory::Display => "egl::Display",
        ObjectCategory::Context => "gl::ContextID",
        ObjectCategory::Device => "egl::Device",
        ObjectCategory::Surface => "SurfaceID",
        ObjectCategory::Image => "ImageID",
        ObjectCategory::Sync => "egl::SyncID",
        ObjectCategory::Stream => "egl::Stream",
        ObjectCategory::LabeledObject => "EGLObjectKHR",
        ObjectCategory::Thread => return None,
    })
}

/// `params` pairs each internal parameter name with its packed type.
fn find_param<'a>(params: &[(&'a str, &'a str)], type_name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(ty, _)| ty.split(' ').next() == Some(type_name))
        .map(|(_, name)| *name)
}

/// Expression handing validation the object it labels errors with.
pub fn owning_object_expression(
    command: &str,
    category: Option<ObjectCategory>,
    params: &[(&str, &str)],
) -> Result<String> {
    let display = find_param(params, "egl::Display");
    let missing = |category: &str| GeneratorError::MissingPolicyParameter {
        command: command.to_string(),
        category: category.to_string(),
    };

    let Some(category) = category else {
        return Ok(match display {
            Some(display) => format!("GetDisplayIfValid({})", display),
            None => "nullptr".to_string(),
        });
    };

    let Some(type_name) = category_param_type(category) else {
        return Ok("GetThreadIfValid(thread)".to_string());
    };
    let found = find_param(params, type_name);

    match (category, found) {
        (ObjectCategory::Context, None) => {
            Ok("GetContextIfValid(thread->getDisplay(), thread->getContext())".to_string())
        }
        (_, None) => Err(missing(category.name())),
        (ObjectCategory::Display, Some(p)) => Ok(format!("GetDisplayIfValid({})", p)),
        (ObjectCategory::Device, Some(p)) => Ok(format!("GetDeviceIfValid({})", p)),
        (ObjectCategory::LabeledObject, Some(p)) => {
            let display = display.ok_or_else(|| missing("Display"))?;
            let object_type = find_param(params, "ObjectType").ok_or_else(|| missing("ObjectType"))?;
            Ok(format!(
                "GetLabeledObjectIfValid(thread, {}, {}, {})",
                display, object_type, p
            ))
        }
        (_, Some(p)) => {
            let display = display.ok_or_else(|| missing("Display"))?;
            Ok(format!("Get{}IfValid({}, {})", category.name(), display, p))
        }
    }
}
