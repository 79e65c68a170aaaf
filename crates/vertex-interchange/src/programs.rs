//! Operation programs compiled from `wgsl/programs.yaml` by the build script

include!(concat!(env!("OUT_DIR"), "/programs.rs"));
