use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::loader::Group;

/// The two untrusted groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarbarianKind {
    Plugin,
    Widget,
}

impl BarbarianKind {
    pub fn group(&self) -> Group {
        match self {
            BarbarianKind::Plugin => Group::Plugins,
            BarbarianKind::Widget => Group::Widgets,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BarbarianKind::Plugin => "plugin",
            BarbarianKind::Widget => "widget",
        }
    }
}

impl fmt::Display for BarbarianKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `category:name` identifying one plugin or widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub kind: BarbarianKind,
    pub name: String,
}

impl QualifiedName {
    pub fn new(kind: BarbarianKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

impl FromStr for QualifiedName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, name) = s
            .split_once(':')
            .ok_or_else(|| format!("'{}' is not of the form category:name", s))?;
        let kind = match category {
            "plugin" => BarbarianKind::Plugin,
            "widget" => BarbarianKind::Widget,
            other => return Err(format!("unknown category '{}'", other)),
        };
        if name.is_empty() {
            return Err(format!("'{}' has an empty name", s));
        }
        Ok(QualifiedName::new(kind, name))
    }
}

/// Event-origin token → qualified name.
///
/// Entries are only ever added during a session.
#[derive(Debug, Clone, Default)]
pub struct BarbarianRegistry {
    entries: IndexMap<String, QualifiedName>,
}

impl BarbarianRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token`, returning the name it was previously mapped to.
    pub fn record(&mut self, token: impl Into<String>, name: QualifiedName) -> Option<QualifiedName> {
        self.entries.insert(token.into(), name)
    }

    pub fn qualified_name(&self, token: &str) -> Option<&QualifiedName> {
        self.entries.get(token)
    }

    /// Tokens recorded for `name`.
    pub fn tokens_for(&self, name: &QualifiedName) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, qualified)| *qualified == name)
            .map(|(token, _)| token.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QualifiedName)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
