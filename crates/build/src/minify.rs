//! WGSL minification for embedded programs

use std::error::Error;

/// Minifies a program's WGSL source for embedding
///
/// The module is parsed, minified and re-validated with `naga` before being
/// written back out. Host pipelines bind stages by entry point name, so every
/// name in `entry_points` must survive minification unchanged.
///
/// # Arguments
/// * `shader` - Self-contained WGSL source, includes already resolved
/// * `entry_points` - Entry point names the host will bind
pub fn minify_wgsl(shader: &str, entry_points: &[&str]) -> Result<String, Box<dyn Error>> {
    let mut module = naga::front::wgsl::parse_str(shader)?;

    wgsl_minifier::minify_module(&mut module);

    if let Some(missing) = entry_points.iter().find(|&&name| !module.entry_points.iter().any(|entry_point| entry_point.name == name)) {
        return Err(format!("Entry point '{missing}' did not survive minification").into());
    }

    let mut validator = naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all());
    let info = validator.validate(&module)?;
    let output = naga::back::wgsl::write_string(&module, &info, naga::back::wgsl::WriterFlags::empty())?;

    Ok(wgsl_minifier::minify_wgsl_source(&output))
}
