//! Embedded WGSL sources and specialization of their constants.

use crate::GpuError;

/// Compute shader applying the neighbour rule (`compute_main`).
pub const SIMULATION_SHADER: &str = include_str!("shaders/simulation.wgsl");
/// Vertex and fragment shaders drawing the cells (`vertex_main`, `fragment_main`).
pub const CELL_SHADER: &str = include_str!("shaders/cell.wgsl");

/// Replaces `const NAME: u32 = ...;` declarations with the given values.
///
/// Every requested constant must be declared in `source`.
pub fn specialize(source: &str, constants: &[(&str, u32)]) -> Result<String, GpuError> {
    let mut specialized = String::with_capacity(source.len());
    let mut replaced = vec![false; constants.len()];

    for line in source.lines() {
        let trimmed = line.trim_start();
        let hit = constants
            .iter()
            .position(|(name, _)| trimmed.starts_with(&format!("const {name}: u32 =")));
        match hit {
            Some(i) => {
                let (name, value) = constants[i];
                specialized.push_str(&format!("const {name}: u32 = {value}u;"));
                replaced[i] = true;
            }
            None => specialized.push_str(line),
        }
        specialized.push('\n');
    }

    if let Some(i) = replaced.iter().position(|done| !done) {
        return Err(GpuError::ShaderSpecialization(format!(
            "constant {} is not declared in the shader",
            constants[i].0
        )));
    }
    Ok(specialized)
}
