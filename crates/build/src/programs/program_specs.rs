//! Program Manifest Parser
//!
//! This module provides parsing and validation for the YAML manifest that lists
//! the operation programs of a shader library.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

/// File holding the shared vertex entry points
pub const DEFAULT_VERTEX_FILE: &str = "vertex.wgsl";

/// Program ids become Rust constant names in generated code
static PROGRAM_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// Returns the vertex entry point used when a program does not name one
///
/// Two-input programs use `two_input_vertex`; every other input count falls
/// back to `one_input_vertex`.
pub fn default_vertex_entry(inputs: u32) -> &'static str {
    match inputs {
        2 => "two_input_vertex",
        _ => "one_input_vertex",
    }
}

/// A WGSL file and an optional entry point within it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StageSpec {
    /// WGSL file, relative to the manifest directory
    pub file: String,
    /// Entry point name
    #[serde(default)]
    pub entry: Option<String>,
}

/// A single program entry of the manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgramSpec {
    /// Identifier, also the generated constant name
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Number of input textures (1 or 2)
    #[serde(default = "default_inputs")]
    pub inputs: u32,
    /// Vertex stage, defaults to the shared vertex file
    #[serde(default)]
    pub vertex: Option<StageSpec>,
    /// Fragment stage, entry point required
    pub fragment: StageSpec,
    /// Initial uniform values by name, splatted over all components
    #[serde(default)]
    pub uniform_defaults: BTreeMap<String, f32>,
}

fn default_inputs() -> u32 {
    1
}

impl ProgramSpec {
    /// File holding the vertex entry point
    pub fn vertex_file(&self) -> &str {
        self.vertex.as_ref().map_or(DEFAULT_VERTEX_FILE, |vertex| vertex.file.as_str())
    }

    /// Vertex entry point, falling back to the default for the input count
    pub fn vertex_entry(&self) -> &str {
        self.vertex
            .as_ref()
            .and_then(|vertex| vertex.entry.as_deref())
            .unwrap_or_else(|| default_vertex_entry(self.inputs))
    }
}

/// The whole manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgramManifest {
    /// Programs in declaration order
    pub programs: Vec<ProgramSpec>,
}

/// Error types for manifest validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramValidationError {
    /// Id is not an upper-case identifier
    InvalidId(String),
    /// Two programs share the same id
    DuplicateId(String),
    /// Input count has no interchange record
    UnsupportedInputCount(String, u32),
    /// Fragment stage does not name an entry point
    MissingFragmentEntry(String),
    /// Program declares textures but not one per input
    TextureCountMismatch { id: String, inputs: u32, textures: usize },
    /// Program samples textures without exactly one sampler
    SamplerCountMismatch { id: String, samplers: usize },
    /// Default given for a uniform the program does not declare
    UnknownUniformDefault { id: String, name: String },
}

impl fmt::Display for ProgramValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "Program id '{id}' must match [A-Z][A-Z0-9_]*"),
            Self::DuplicateId(id) => write!(f, "Program id '{id}' is declared more than once"),
            Self::UnsupportedInputCount(id, inputs) => write!(f, "Program '{id}' has {inputs} inputs, only 1 or 2 are supported"),
            Self::MissingFragmentEntry(id) => write!(f, "Program '{id}' does not name a fragment entry point"),
            Self::TextureCountMismatch { id, inputs, textures } => {
                write!(f, "Program '{id}' has {inputs} inputs but binds {textures} textures")
            }
            Self::SamplerCountMismatch { id, samplers } => {
                write!(f, "Program '{id}' samples textures with {samplers} samplers, expected exactly one")
            }
            Self::UnknownUniformDefault { id, name } => write!(f, "Program '{id}' sets a default for unknown uniform '{name}'"),
        }
    }
}

impl std::error::Error for ProgramValidationError {}

impl ProgramManifest {
    /// Validates the manifest structure
    ///
    /// Checks identifiers, duplicate ids, input counts and fragment entry points.
    /// Linkage is checked later, when each program is compiled.
    pub fn validate(&self) -> Result<(), ProgramValidationError> {
        let mut seen = HashSet::new();
        for program in &self.programs {
            if !PROGRAM_ID.is_match(&program.id) {
                return Err(ProgramValidationError::InvalidId(program.id.clone()));
            }
            if !seen.insert(program.id.as_str()) {
                return Err(ProgramValidationError::DuplicateId(program.id.clone()));
            }
            if !matches!(program.inputs, 1 | 2) {
                return Err(ProgramValidationError::UnsupportedInputCount(program.id.clone(), program.inputs));
            }
            if program.fragment.entry.is_none() {
                return Err(ProgramValidationError::MissingFragmentEntry(program.id.clone()));
            }
        }
        Ok(())
    }

    /// Parses a program manifest from YAML content
    ///
    /// # Arguments
    /// * `yaml_content` - YAML string containing the manifest
    pub fn from_yaml(yaml_content: &str) -> Result<Self, serde_norway::Error> {
        serde_norway::from_str(yaml_content)
    }

    /// Parses a program manifest from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML manifest file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }
}
