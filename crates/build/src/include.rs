//! Textual `#include` resolution for WGSL sources
//!
//! WGSL has no module system, so shared declarations such as the vertex
//! interchange header are spliced in textually. A file is included at most
//! once per resolved program, which behaves like an include guard and makes
//! include cycles harmless.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Matches a whole-line `#include "path"` directive
static INCLUDE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^\s*#include\s+"([^"]+)"\s*$"#).unwrap());

/// Error raised when an included file cannot be loaded
#[derive(Debug)]
pub struct IncludeError {
    /// Normalized path of the file that failed to load
    pub path: String,
    /// Underlying loader error
    pub source: std::io::Error,
}

impl fmt::Display for IncludeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to include '{}': {}", self.path, self.source)
    }
}

impl std::error::Error for IncludeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Resolves all `#include` directives in `source`
///
/// Include paths are relative to `base_dir` for the root source and relative to
/// the including file for nested includes. Paths handed to `load_file` use `/`
/// separators with `.` and `..` segments folded away.
///
/// # Arguments
/// * `source` - WGSL source that may contain include directives
/// * `base_dir` - Directory (relative to the loader's root) that `source` lives in
/// * `load_file` - Loads a file by its normalized path
///
/// # Returns
/// The fully expanded source
pub fn resolve_includes<F>(source: &str, base_dir: &str, load_file: F) -> Result<String, IncludeError>
where
    F: FnMut(&str) -> Result<String, std::io::Error>,
{
    let mut resolver = Resolver {
        load_file,
        included: HashSet::new(),
    };
    let mut output = String::new();
    resolver.resolve(source, base_dir, &mut output)?;
    Ok(output)
}

struct Resolver<F> {
    load_file: F,
    included: HashSet<String>,
}

impl<F> Resolver<F>
where
    F: FnMut(&str) -> Result<String, std::io::Error>,
{
    fn resolve(&mut self, source: &str, base_dir: &str, output: &mut String) -> Result<(), IncludeError> {
        for line in source.lines() {
            let Some(captures) = INCLUDE_DIRECTIVE.captures(line) else {
                output.push_str(line);
                output.push('\n');
                continue;
            };

            let path = join_path(base_dir, &captures[1]);
            if !self.included.insert(path.clone()) {
                continue;
            }

            let content = (self.load_file)(&path).map_err(|source| IncludeError { path: path.clone(), source })?;
            self.resolve(&content, parent_of(&path), output)?;
        }
        Ok(())
    }
}

/// Joins `relative` onto `base` and folds `.` / `..` segments
fn join_path(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}
