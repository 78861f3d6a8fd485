//! Skill bundle snapshot types.

use serde_yaml::Value;
use skillgate_common::{Error, Result, DESCRIPTOR_FILE, DRAFT_FILE};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use tracing::{trace, warn};

const FRONTMATTER_FENCE: &str = "---";

/// Why a descriptor's frontmatter block could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    /// The descriptor does not open with a `---` line.
    Missing,
    /// The opening `---` line has no closing partner.
    Unterminated,
    /// The block is not a YAML mapping with unique string keys.
    Invalid(String),
    /// The descriptor bytes are not UTF-8, so nothing in it can be read.
    NotUtf8,
}

impl fmt::Display for FrontmatterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontmatterError::Missing => write!(f, "missing frontmatter block"),
            FrontmatterError::Unterminated => write!(f, "unterminated frontmatter block"),
            FrontmatterError::Invalid(reason) => write!(f, "invalid frontmatter: {}", reason),
            FrontmatterError::NotUtf8 => write!(f, "descriptor is not valid UTF-8"),
        }
    }
}

/// Read-only snapshot of one skill directory.
///
/// Built per validation and discarded afterwards. Nothing in the engine
/// mutates a bundle, so a snapshot can be handed to a worker thread as is.
#[derive(Debug, Clone)]
pub struct SkillBundle {
    identifier: String,
    has_descriptor: bool,
    has_draft: bool,
    frontmatter: BTreeMap<String, Value>,
    frontmatter_error: Option<FrontmatterError>,
    body: String,
    resources: BTreeSet<String>,
}

impl SkillBundle {
    /// Read a bundle snapshot from a skill directory.
    pub fn read(dir: &Path) -> Result<Self> {
        let identifier = identifier_of(dir);
        if !dir.is_dir() {
            return Err(Error::BundleNotFound {
                name: identifier,
                path: dir.to_path_buf(),
            });
        }

        let descriptor_path = dir.join(DESCRIPTOR_FILE);
        let has_descriptor = descriptor_path.is_file();
        let has_draft = dir.join(DRAFT_FILE).is_file();

        let mut bundle = if has_descriptor {
            match String::from_utf8(std::fs::read(&descriptor_path)?) {
                Ok(text) => Self::from_descriptor(identifier, &text),
                Err(_) => {
                    warn!("{} is not valid UTF-8", descriptor_path.display());
                    let mut bundle = Self::empty(identifier);
                    bundle.has_descriptor = true;
                    bundle.frontmatter_error = Some(FrontmatterError::NotUtf8);
                    bundle
                }
            }
        } else {
            Self::empty(identifier)
        };
        bundle.has_draft = has_draft;

        let mut resources = BTreeSet::new();
        collect_resources(dir, dir, &mut resources)?;
        bundle.resources = resources;

        trace!(
            "Read bundle {} ({} resources)",
            bundle.identifier,
            bundle.resources.len()
        );
        Ok(bundle)
    }

    /// Build a snapshot from descriptor text alone.
    pub fn from_descriptor(identifier: impl Into<String>, text: &str) -> Self {
        let parsed = parse_descriptor(text);
        Self {
            identifier: identifier.into(),
            has_descriptor: true,
            has_draft: false,
            frontmatter: parsed.frontmatter,
            frontmatter_error: parsed.error,
            body: parsed.body,
            resources: BTreeSet::new(),
        }
    }

    fn empty(identifier: String) -> Self {
        Self {
            identifier,
            has_descriptor: false,
            has_draft: false,
            frontmatter: BTreeMap::new(),
            frontmatter_error: None,
            body: String::new(),
            resources: BTreeSet::new(),
        }
    }

    /// Replace the set of files known to exist in the bundle.
    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn has_descriptor(&self) -> bool {
        self.has_descriptor
    }

    pub fn has_draft(&self) -> bool {
        self.has_draft
    }

    pub fn frontmatter(&self) -> &BTreeMap<String, Value> {
        &self.frontmatter
    }

    pub fn frontmatter_error(&self) -> Option<&FrontmatterError> {
        self.frontmatter_error.as_ref()
    }

    /// A frontmatter value, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.frontmatter.get(key).and_then(Value::as_str)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Number of lines in the body.
    pub fn body_line_count(&self) -> usize {
        self.body.lines().count()
    }

    /// Relative paths (with `/` separators) of every file in the bundle.
    pub fn resources(&self) -> &BTreeSet<String> {
        &self.resources
    }

    pub fn has_resource(&self, relative: &str) -> bool {
        self.resources.contains(relative)
    }
}

fn identifier_of(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| dir.display().to_string())
}

fn collect_resources(root: &Path, dir: &Path, out: &mut BTreeSet<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_resources(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            out.insert(parts.join("/"));
        }
    }
    Ok(())
}

struct ParsedDescriptor {
    frontmatter: BTreeMap<String, Value>,
    error: Option<FrontmatterError>,
    body: String,
}

fn parse_descriptor(text: &str) -> ParsedDescriptor {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    let opens_with_fence = lines
        .next()
        .is_some_and(|first| first.trim_end() == FRONTMATTER_FENCE);
    if !opens_with_fence {
        return ParsedDescriptor {
            frontmatter: BTreeMap::new(),
            error: Some(FrontmatterError::Missing),
            body: text.to_string(),
        };
    }

    let mut yaml = String::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim_end() == FRONTMATTER_FENCE {
            closed = true;
            break;
        }
        yaml.push_str(line);
    }
    let rest: String = lines.collect();

    if !closed {
        return ParsedDescriptor {
            frontmatter: BTreeMap::new(),
            error: Some(FrontmatterError::Unterminated),
            body: yaml,
        };
    }

    match parse_frontmatter(&yaml) {
        Ok(frontmatter) => ParsedDescriptor {
            frontmatter,
            error: None,
            body: rest,
        },
        Err(reason) => ParsedDescriptor {
            frontmatter: BTreeMap::new(),
            error: Some(FrontmatterError::Invalid(reason)),
            body: rest,
        },
    }
}

fn parse_frontmatter(yaml: &str) -> std::result::Result<BTreeMap<String, Value>, String> {
    if yaml.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: Value = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    match value {
        Value::Null => Ok(BTreeMap::new()),
        Value::Mapping(mapping) => {
            let mut fields = BTreeMap::new();
            for (key, value) in mapping {
                let key = match key {
                    Value::String(key) => key,
                    other => return Err(format!("non-string key {:?}", other)),
                };
                fields.insert(key, value);
            }
            Ok(fields)
        }
        _ => Err("frontmatter must be a mapping".to_string()),
    }
}
