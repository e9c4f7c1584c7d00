use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::{Result, SrtError};

const VERSION_PATTERN: &str = r"^v([0-9]+)\.([0-9]+)\.([0-9]+)$";
const COMPONENT_PATTERN: &str = r"^([a-z]+)([0-9]+)$";

/// One `-<name><number>` suffix of a tag, e.g. `rt134`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    pub name: String,
    pub value: u64,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.value)
    }
}

/// Parsed release tag such as `v4.4.144-cip13-rt134-rc1`.
///
/// The numeric triple is mandatory, the suffix components keep the order
/// they had in the tag string. Two tags are equal iff their canonical
/// strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    components: Vec<Component>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| SrtError::TagParse(format!("invalid pattern: {}", e)))
}

fn parse_number(digits: &str, segment: &str) -> Result<u64> {
    digits
        .parse::<u64>()
        .map_err(|_| SrtError::TagParse(segment.to_string()))
}

impl Tag {
    /// Parse a tag string, failing with [`SrtError::TagParse`] on the first
    /// segment that does not fit the grammar.
    pub fn parse(text: &str) -> Result<Self> {
        let version_re = compile(VERSION_PATTERN)?;
        let component_re = compile(COMPONENT_PATTERN)?;

        let mut parts = text.split('-');
        let head = parts.next().unwrap_or_default();
        let caps = version_re
            .captures(head)
            .ok_or_else(|| SrtError::TagParse(head.to_string()))?;

        let major = parse_number(&caps[1], head)?;
        let minor = parse_number(&caps[2], head)?;
        let patch = parse_number(&caps[3], head)?;

        let mut components = Vec::new();
        for part in parts {
            let caps = component_re
                .captures(part)
                .ok_or_else(|| SrtError::TagParse(part.to_string()))?;
            components.push(Component {
                name: caps[1].to_string(),
                value: parse_number(&caps[2], part)?,
            });
        }

        Ok(Tag {
            major,
            minor,
            patch,
            components,
        })
    }

    /// Suffix components in tag order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Value of a component, `None` when it was not part of the tag.
    /// A value of zero is still present.
    pub fn get(&self, name: &str) -> Option<u64> {
        match name {
            "major" => Some(self.major),
            "minor" => Some(self.minor),
            "patch" => Some(self.patch),
            _ => self
                .components
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.value),
        }
    }

    /// Value of a component, failing with [`SrtError::TagAttr`] when absent
    pub fn component(&self, name: &str) -> Result<u64> {
        self.get(name)
            .ok_or_else(|| SrtError::TagAttr(name.to_string()))
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }

    pub fn is_release_candidate(&self) -> bool {
        self.has_component("rc")
    }

    pub fn last_component_name(&self) -> Option<&str> {
        self.components.last().map(|c| c.name.as_str())
    }

    /// Name of the component right before `name`, `None` if `name` is the
    /// first component or absent.
    pub fn predecessor_of(&self, name: &str) -> Option<&str> {
        let index = self.position(name)?;
        index
            .checked_sub(1)
            .map(|i| self.components[i].name.as_str())
    }

    /// Tag string up to (excluding) the `rt` component
    pub fn base(&self) -> Result<String> {
        let end = self
            .position("rt")
            .ok_or_else(|| SrtError::TagBase(self.to_string()))?;
        Ok(self.build(end))
    }

    pub fn rebase_form(&self) -> String {
        format!("{}-rebase", self)
    }

    /// Tag string without the leading `v`, e.g. `4.4.144-rt134`
    pub fn short(&self) -> String {
        let full = self.to_string();
        full[1..].to_string()
    }

    fn build(&self, count: usize) -> String {
        let mut tag = format!("v{}.{}.{}", self.major, self.minor, self.patch);
        for component in &self.components[..count] {
            tag.push('-');
            tag.push_str(&component.to_string());
        }
        tag
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build(self.components.len()))
    }
}

impl FromStr for Tag {
    type Err = SrtError;

    fn from_str(s: &str) -> Result<Self> {
        Tag::parse(s)
    }
}
