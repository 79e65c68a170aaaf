//! Program manifests and compiled operation programs
//!
//! A program pairs one vertex entry point with one fragment entry point. The
//! manifest names the files and entry points; compilation resolves includes,
//! validates the module, checks stage linkage against the interchange records
//! and reflects the resources the host has to bind.

mod compiled_program;
mod program_specs;

pub use compiled_program::*;
pub use program_specs::*;
