use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::Value;

use crate::kernel::config::read_file;
use crate::kernel::error::{Error, Result};

/// The fixed set of component groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    Controllers,
    Modules,
    Services,
    Objects,
    Plugins,
    Widgets,
}

impl Group {
    /// Manifest order, also the order of the `priority` load strategy.
    pub const ALL: [Group; 6] = [
        Group::Controllers,
        Group::Modules,
        Group::Services,
        Group::Objects,
        Group::Plugins,
        Group::Widgets,
    ];

    /// Order used by `trigger_method_on_all`.
    pub const BROADCAST_ORDER: [Group; 6] = [
        Group::Controllers,
        Group::Modules,
        Group::Plugins,
        Group::Widgets,
        Group::Services,
        Group::Objects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Controllers => "controllers",
            Group::Modules => "modules",
            Group::Services => "services",
            Group::Objects => "objects",
            Group::Plugins => "plugins",
            Group::Widgets => "widgets",
        }
    }

    /// Whether the group sits under the manifest's `core` key.
    pub fn is_core(&self) -> bool {
        !matches!(self, Group::Plugins | Group::Widgets)
    }

    /// Path of the group inside a manifest, e.g. `core.modules`.
    pub fn manifest_path(&self) -> String {
        if self.is_core() {
            format!("core.{}", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Group::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| Error::UnknownSection {
                section: s.to_string(),
            })
    }
}

/// Opaque resolvable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        ModuleId::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        ModuleId(id)
    }
}

/// Validated manifest: per group, symbolic name → identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    sections: IndexMap<Group, IndexMap<String, ModuleId>>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; a repeated name replaces the earlier identifier.
    pub fn with(mut self, group: Group, name: impl Into<String>, id: impl Into<ModuleId>) -> Self {
        self.insert(group, name, id);
        self
    }

    pub fn insert(&mut self, group: Group, name: impl Into<String>, id: impl Into<ModuleId>) {
        self.sections
            .entry(group)
            .or_default()
            .insert(name.into(), id.into());
    }

    /// Entries of `group`, in manifest order.
    pub fn section(&self, group: Group) -> Option<&IndexMap<String, ModuleId>> {
        self.sections.get(&group)
    }

    /// Groups that have at least one entry, in [`Group::ALL`] order.
    pub fn groups(&self) -> Vec<Group> {
        Group::ALL
            .into_iter()
            .filter(|group| self.sections.get(group).is_some_and(|s| !s.is_empty()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate a raw manifest.
    pub fn from_value(value: &Value) -> Result<Self> {
        ManifestValidator::validate(value)
    }

    /// Read and validate a manifest file (JSON, YAML or TOML by extension).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let value: Value = read_file(path.as_ref())?;
        Self::from_value(&value)
    }
}

/// Checks raw manifest input.
///
/// Every group must be a flat mapping of string name → string identifier,
/// and only the known section keys may appear.
pub struct ManifestValidator;

impl ManifestValidator {
    pub fn validate(value: &Value) -> Result<Manifest> {
        let mut manifest = Manifest::new();
        let top = match value {
            Value::Null => return Ok(manifest),
            Value::Object(map) => map,
            other => {
                return Err(Error::ManifestValidation {
                    group: "manifest".to_string(),
                    entry: None,
                    message: format!("expected a mapping, found {}", type_name(other)),
                });
            }
        };

        for (key, section) in top {
            match key.as_str() {
                "core" => Self::validate_core(section, &mut manifest)?,
                "plugins" => Self::validate_group(Group::Plugins, section, &mut manifest)?,
                "widgets" => Self::validate_group(Group::Widgets, section, &mut manifest)?,
                other => {
                    return Err(Error::UnknownSection {
                        section: other.to_string(),
                    });
                }
            }
        }
        Ok(manifest)
    }

    fn validate_core(value: &Value, manifest: &mut Manifest) -> Result<()> {
        let core = match value {
            Value::Null => return Ok(()),
            Value::Object(map) => map,
            other => {
                return Err(Error::ManifestValidation {
                    group: "core".to_string(),
                    entry: None,
                    message: format!("expected a mapping, found {}", type_name(other)),
                });
            }
        };
        for (key, section) in core {
            let group = key.parse::<Group>()?;
            if !group.is_core() {
                return Err(Error::UnknownSection {
                    section: format!("core.{}", key),
                });
            }
            Self::validate_group(group, section, manifest)?;
        }
        Ok(())
    }

    fn validate_group(group: Group, value: &Value, manifest: &mut Manifest) -> Result<()> {
        let entries = match value {
            Value::Null => return Ok(()),
            Value::Object(map) => map,
            other => {
                return Err(Error::ManifestValidation {
                    group: group.manifest_path(),
                    entry: None,
                    message: format!("expected a mapping, found {}", type_name(other)),
                });
            }
        };
        for (name, id) in entries {
            match id {
                Value::String(id) => manifest.insert(group, name.clone(), id.as_str()),
                other => {
                    return Err(Error::ManifestValidation {
                        group: group.manifest_path(),
                        entry: Some(name.clone()),
                        message: format!("identifier must be a string, found {}", type_name(other)),
                    });
                }
            }
        }
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
