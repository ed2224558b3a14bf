//! Command Model for the Entry Point Generator
//!
//! Turns the registry model into immutable `Command` records: name, return
//! type, ordered parameters and the versions/extensions that introduce them.

use std::collections::BTreeMap;

use crate::error::{GeneratorError, Result};
use crate::registry::{Api, CommandSpec, ExtensionFamily, RegistryModel};

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATION PARSING
// ═══════════════════════════════════════════════════════════════════════════════

fn is_identifier_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Byte range of the declared identifier inside a C declaration.
///
/// For function-pointer declarations only the first parenthesized group is
/// searched, so `void (CL_CALLBACK *pfn)(cl_event, void *)` yields `pfn`.
pub fn find_name_range(decl: &str) -> Option<(usize, usize)> {
    let bytes = decl.as_bytes();
    let (min, mut end) = match decl.find('(') {
        Some(left) => (left + 1, left + 1 + decl[left + 1..].find(')')?),
        None => (0, bytes.len()),
    };

    while end > min && !is_identifier_char(bytes[end - 1]) {
        end -= 1;
    }
    if end == min {
        return None;
    }
    let mut start = end - 1;
    while start > min && is_identifier_char(bytes[start - 1]) {
        start -= 1;
    }
    Some((start, end))
}

/// Joins a type and an identifier back into a declaration, placing the name
/// inside a function-pointer group or before array brackets.
pub fn make_param(ty: &str, name: &str) -> String {
    let insert_at = |pos: usize| format!("{} {}{}", &ty[..pos], name, &ty[pos..]);

    if let Some(left) = ty.find('(') {
        if let Some(right) = ty[left..].find(')') {
            return insert_at(left + right);
        }
    }
    if let Some(brackets) = ty.find('[') {
        return insert_at(brackets);
    }
    format!("{} {}", ty, name)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARAMETERS & COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declaration exactly as the registry spells it.
    pub text: String,
    pub ty: String,
    pub name: String,
    /// Enum group for GLenum/GLbitfield parameters.
    pub group: Option<String>,
}

impl Param {
    pub fn parse(text: &str, group: Option<String>) -> Option<Self> {
        let (start, end) = find_name_range(text)?;
        let ty = format!("{}{}", text[..start].trim(), text[end..].trim());
        Some(Param {
            text: text.to_string(),
            ty,
            name: text[start..end].to_string(),
            group,
        })
    }

    pub fn is_pointer(&self) -> bool {
        self.text.contains('*')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub api: Api,
    pub name: String,
    pub return_type: String,
    pub params: Vec<Param>,
    /// Introducing versions and extensions, versions first, each listed once.
    pub sources: Vec<String>,
}

impl Command {
    pub fn from_spec(api: Api, spec: &CommandSpec) -> Result<Self> {
        let malformed = |text: &str, command: &str| GeneratorError::MalformedSpec {
            api,
            command: command.to_string(),
            text: text.to_string(),
        };

        let (start, end) = find_name_range(&spec.proto).ok_or_else(|| malformed(&spec.proto, ""))?;
        let name = spec.proto[start..end].to_string();
        let return_type = spec.proto[..start].trim().to_string();
        if return_type.is_empty() {
            return Err(malformed(&spec.proto, &name));
        }

        let mut params = Vec::with_capacity(spec.params.len());
        for text in &spec.params {
            let mut param = Param::parse(text, None).ok_or_else(|| malformed(text, &name))?;
            param.group = spec.groups.get(&param.name).cloned();
            params.push(param);
        }

        Ok(Command {
            api,
            name,
            return_type,
            params,
            sources: Vec::new(),
        })
    }

    pub fn returns_void(&self) -> bool {
        self.return_type == "void"
    }

    /// Name without the API prefix, e.g. `glDrawArrays` → `DrawArrays`.
    pub fn short_name(&self) -> &str {
        self.api.strip_prefix(&self.name)
    }

    pub fn param_texts(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.text.as_str()).collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND MODEL
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub family: Option<ExtensionFamily>,
    pub commands: Vec<String>,
}

impl Feature {
    /// `2_0` → `2.0`.
    pub fn dotted(&self) -> String {
        self.name.replace('_', ".")
    }
}

#[derive(Debug, Clone)]
pub struct CommandModel {
    pub api: Api,
    pub data_source: String,
    commands: Vec<Command>,
    index: BTreeMap<String, usize>,
    /// Ascending declared order.
    pub versions: Vec<Feature>,
    /// Lexicographic by extension name.
    pub extensions: Vec<Feature>,
}

impl CommandModel {
    pub fn build(model: &RegistryModel) -> Result<Self> {
        let api = model.api;
        let mut commands = Vec::with_capacity(model.commands.len());
        let mut index = BTreeMap::new();

        for spec in &model.commands {
            let command = Command::from_spec(api, spec)?;
            if index.insert(command.name.clone(), commands.len()).is_some() {
                return Err(GeneratorError::MalformedSpec {
                    api,
                    command: command.name.clone(),
                    text: "command declared twice in the command table".to_string(),
                });
            }
            commands.push(command);
        }

        let mut built = CommandModel {
            api,
            data_source: model.data_source.clone(),
            commands,
            index,
            versions: Vec::new(),
            extensions: Vec::new(),
        };

        for version in &model.versions {
            let feature = built.attach(&version.name, version.family, &version.commands)?;
            built.versions.push(feature);
        }

        let mut extensions: Vec<_> = model.extensions.iter().collect();
        extensions.sort_by(|a, b| a.name.cmp(&b.name));
        for extension in extensions {
            let feature = built.attach(&extension.name, extension.family, &extension.commands)?;
            built.extensions.push(feature);
        }

        Ok(built)
    }

    fn attach(
        &mut self,
        feature: &str,
        family: Option<ExtensionFamily>,
        names: &[String],
    ) -> Result<Feature> {
        let mut listed = Vec::with_capacity(names.len());
        for name in names {
            let Some(&i) = self.index.get(name) else {
                return Err(GeneratorError::MalformedSpec {
                    api: self.api,
                    command: name.clone(),
                    text: format!("{} lists a command missing from the command table", feature),
                });
            };
            if listed.contains(name) {
                continue;
            }
            let sources = &mut self.commands[i].sources;
            if !sources.iter().any(|s| s == feature) {
                sources.push(feature.to_string());
            }
            listed.push(name.clone());
        }
        listed.sort_by_key(|name| self.index.get(name).copied().unwrap_or(usize::MAX));
        Ok(Feature {
            name: feature.to_string(),
            family,
            commands: listed,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// Commands of a feature, in command table order.
    pub fn feature_commands<'a>(&'a self, feature: &'a Feature) -> impl Iterator<Item = &'a Command> {
        feature.commands.iter().filter_map(move |name| self.get(name))
    }

    /// Every command introduced by some version or extension, in command
    /// table order.
    pub fn introduced(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| !c.sources.is_empty())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
