//! Verification utilities for the vertex interchange format
//!
//! This crate renders probe programs and operation programs on a real wgpu
//! device and reads the results back, so the interchange records can be
//! checked end to end rather than only at build time.

pub mod compare;
pub mod roundtrip_engine;
pub mod wgpu_helpers;

/// Probe programs compiled by the build script
pub mod probes {
    include!(concat!(env!("OUT_DIR"), "/probes.rs"));
}
