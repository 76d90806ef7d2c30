//! Detector tables: technology fingerprints and component class patterns
//!
//! The tables are data. The built-in set ships as `data/detectors.toml` and
//! is parsed by the same loader that reads user-supplied replacements, so new
//! technologies or component families never require code changes.

use crate::extraction::types::StackCategory;
use crate::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

const BUILTIN_TABLE: &str = include_str!("../../data/detectors.toml");

static BUILTIN: LazyLock<DetectorTables> = LazyLock::new(|| {
    DetectorTables::parse(BUILTIN_TABLE).expect("Failed to compile built-in detector table")
});

/// One piece of technology evidence
#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub pattern: Regex,
    pub weight: f64,
    pub description: String,
}

/// A technology and the fingerprints that reveal it
#[derive(Debug, Clone)]
pub struct StackDetector {
    pub name: String,
    pub category: StackCategory,
    pub fingerprints: Vec<Fingerprint>,
}

/// A component family and the class-selector patterns that reveal it
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    pub kind: String,
    pub patterns: Vec<Regex>,
}

/// Compiled detector tables, in table order
#[derive(Debug, Clone)]
pub struct DetectorTables {
    pub stack: Vec<StackDetector>,
    pub components: Vec<ComponentDefinition>,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    stack: Vec<StackDetectorDef>,
    #[serde(default, rename = "component")]
    components: Vec<ComponentDef>,
}

#[derive(Debug, Deserialize)]
struct StackDetectorDef {
    name: String,
    category: StackCategory,
    fingerprints: Vec<FingerprintDef>,
}

#[derive(Debug, Deserialize)]
struct FingerprintDef {
    pattern: String,
    weight: f64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ComponentDef {
    kind: String,
    patterns: Vec<String>,
}

impl DetectorTables {
    /// The built-in tables
    pub fn builtin() -> &'static DetectorTables {
        &BUILTIN
    }

    /// Parses and compiles a TOML table
    ///
    /// Sections missing from the document are left empty.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: TableFile = toml::from_str(content)?;

        let stack = file
            .stack
            .into_iter()
            .map(compile_stack_detector)
            .collect::<Result<Vec<_>, _>>()?;

        let components = file
            .components
            .into_iter()
            .map(compile_component)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { stack, components })
    }

    /// Loads a replacement table from disk
    ///
    /// A section the file does not define falls back to the built-in one.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut tables = Self::parse(&content)?;

        if tables.stack.is_empty() {
            tables.stack = Self::builtin().stack.clone();
        }
        if tables.components.is_empty() {
            tables.components = Self::builtin().components.clone();
        }

        tracing::info!(
            "Loaded detector table from {} ({} technologies, {} component kinds)",
            path.display(),
            tables.stack.len(),
            tables.components.len()
        );
        Ok(tables)
    }
}

fn compile_pattern(pattern: &str, owner: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("{}: '{}': {}", owner, pattern, e)))
}

fn compile_stack_detector(def: StackDetectorDef) -> Result<StackDetector, ConfigError> {
    if def.fingerprints.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "{}: at least one fingerprint is required",
            def.name
        )));
    }

    let fingerprints = def
        .fingerprints
        .into_iter()
        .map(|fp| {
            if !(0.0..=1.0).contains(&fp.weight) {
                return Err(ConfigError::InvalidPattern(format!(
                    "{}: weight {} for '{}' is outside [0, 1]",
                    def.name, fp.weight, fp.description
                )));
            }
            Ok(Fingerprint {
                pattern: compile_pattern(&fp.pattern, &def.name)?,
                weight: fp.weight,
                description: fp.description,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StackDetector {
        name: def.name,
        category: def.category,
        fingerprints,
    })
}

fn compile_component(def: ComponentDef) -> Result<ComponentDefinition, ConfigError> {
    if def.patterns.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "{}: at least one pattern is required",
            def.kind
        )));
    }

    let patterns = def
        .patterns
        .iter()
        .map(|p| compile_pattern(p, &def.kind))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ComponentDefinition {
        kind: def.kind,
        patterns,
    })
}
