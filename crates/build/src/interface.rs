//! Stage interface extraction and vertex-to-fragment linkage checks
//!
//! A stage interface is the ordered list of slots an entry point writes (vertex
//! output) or reads (fragment input). Two stages link when their slot lists are
//! identical in binding, type and order. The record contracts at the bottom of
//! this module describe the two interchange records every operation shader uses.

use serde::Serialize;
use std::fmt;

/// How the rasterizer routes a slot between stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SlotBinding {
    /// Clip-space position builtin
    Position,
    /// Any other builtin, by its naga name
    BuiltIn(String),
    /// User-defined slot with its interpolation and sampling qualifiers
    ///
    /// Qualifiers are stored with WGSL defaults applied, so an omitted
    /// `@interpolate` equals an explicit `@interpolate(perspective, center)`.
    Location { location: u32, interpolation: String, sampling: String },
}

impl SlotBinding {
    /// A perspective-interpolated, center-sampled location
    pub fn location(location: u32) -> Self {
        Self::Location {
            location,
            interpolation: "Perspective".to_string(),
            sampling: "Center".to_string(),
        }
    }

    /// Location index of a user slot
    pub fn location_index(&self) -> Option<u32> {
        match self {
            Self::Location { location, .. } => Some(*location),
            _ => None,
        }
    }
}

/// Scalar component type of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotScalar {
    F32,
    F16,
    I32,
    U32,
    Bool,
    Other,
}

/// Component type and count of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotType {
    /// Scalar component type
    pub scalar: SlotScalar,
    /// Number of components (1 for scalars, 0 for non-numeric types)
    pub components: u32,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.components {
            1 => write!(f, "{:?}", self.scalar),
            n => write!(f, "vec{n}<{:?}>", self.scalar),
        }
    }
}

/// A single field crossing the stage boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// Field or argument name
    pub name: String,
    /// Builtin or location binding
    pub binding: SlotBinding,
    /// Component type
    pub ty: SlotType,
}

/// The flattened interface of one entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageInterface {
    /// Name of the record type when the interface is exactly one struct
    pub record: Option<String>,
    /// Slots in declaration order
    pub slots: Vec<Slot>,
}

/// Stage an entry point is expected to belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// Errors raised while extracting or comparing stage interfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkageError {
    /// No entry point with this name exists in the module
    MissingEntryPoint(String),
    /// The entry point exists but belongs to another stage
    WrongStage { entry_point: String, expected: Stage },
    /// Producer and consumer carry a different number of slots
    SlotCountMismatch { vertex_slots: usize, fragment_slots: usize },
    /// Slot at `index` is routed differently by the two stages
    BindingMismatch { index: usize, vertex: Slot, fragment: Slot },
    /// Slot at `index` has a different type in the two stages
    TypeMismatch { index: usize, vertex: Slot, fragment: Slot },
    /// The interface does not match the declared record contract
    RecordMismatch { record: &'static str, reason: String },
}

impl fmt::Display for LinkageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntryPoint(name) => write!(f, "Entry point '{name}' not found"),
            Self::WrongStage { entry_point, expected } => {
                write!(f, "Entry point '{entry_point}' is not a {expected:?} entry point")
            }
            Self::SlotCountMismatch { vertex_slots, fragment_slots } => {
                write!(f, "Vertex stage writes {vertex_slots} slots but fragment stage reads {fragment_slots}")
            }
            Self::BindingMismatch { index, vertex, fragment } => write!(
                f,
                "Slot {index}: vertex '{}' is bound to {:?} but fragment '{}' expects {:?}",
                vertex.name, vertex.binding, fragment.name, fragment.binding
            ),
            Self::TypeMismatch { index, vertex, fragment } => write!(
                f,
                "Slot {index}: vertex '{}' is {} but fragment '{}' expects {}",
                vertex.name, vertex.ty, fragment.name, fragment.ty
            ),
            Self::RecordMismatch { record, reason } => write!(f, "Interface does not match {record}: {reason}"),
        }
    }
}

impl std::error::Error for LinkageError {}

/// Extracts the stage interface of an entry point
///
/// For vertex entry points this is the function result, for fragment entry
/// points the function arguments. Struct-typed values are flattened into their
/// bound members.
///
/// # Arguments
/// * `module` - The parsed shader module
/// * `entry_point` - Entry point name
/// * `stage` - Expected stage of the entry point
pub fn interface_of(module: &naga::Module, entry_point: &str, stage: Stage) -> Result<StageInterface, LinkageError> {
    let entry = module
        .entry_points
        .iter()
        .find(|entry| entry.name == entry_point)
        .ok_or_else(|| LinkageError::MissingEntryPoint(entry_point.to_string()))?;

    if entry.stage != stage.to_naga() {
        return Err(LinkageError::WrongStage {
            entry_point: entry_point.to_string(),
            expected: stage,
        });
    }

    let mut interface = StageInterface {
        record: None,
        slots: Vec::new(),
    };

    match stage {
        Stage::Vertex => {
            if let Some(result) = &entry.function.result {
                interface.record = push_value(module, stage, "result", result.ty, result.binding.as_ref(), &mut interface.slots);
            }
        }
        Stage::Fragment => {
            // Fragment-only builtins are produced by the rasterizer, not the vertex stage
            let arguments: Vec<_> = entry
                .function
                .arguments
                .iter()
                .filter(|argument| !argument.binding.as_ref().is_some_and(is_fragment_only))
                .collect();

            let mut records = Vec::new();
            for argument in &arguments {
                let name = argument.name.as_deref().unwrap_or("argument");
                records.extend(push_value(module, stage, name, argument.ty, argument.binding.as_ref(), &mut interface.slots));
            }
            if arguments.len() == 1 {
                interface.record = records.pop();
            }
        }
    }

    Ok(interface)
}

/// Appends the slots of one value and returns its struct name if it is a record
fn push_value(
    module: &naga::Module,
    stage: Stage,
    name: &str,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    slots: &mut Vec<Slot>,
) -> Option<String> {
    if let Some(binding) = binding {
        slots.push(Slot {
            name: name.to_string(),
            binding: slot_binding(binding, slot_type(module, ty)),
            ty: slot_type(module, ty),
        });
        return None;
    }

    let ty = &module.types[ty];
    let naga::TypeInner::Struct { members, .. } = &ty.inner else {
        return None;
    };

    for member in members {
        if let Some(binding) = &member.binding {
            if stage == Stage::Fragment && is_fragment_only(binding) {
                continue;
            }
            slots.push(Slot {
                name: member.name.clone().unwrap_or_default(),
                binding: slot_binding(binding, slot_type(module, member.ty)),
                ty: slot_type(module, member.ty),
            });
        }
    }
    ty.name.clone()
}

const FRAGMENT_ONLY_BUILTINS: [naga::BuiltIn; 4] = [naga::BuiltIn::FrontFacing, naga::BuiltIn::SampleIndex, naga::BuiltIn::SampleMask, naga::BuiltIn::PrimitiveIndex];

fn is_fragment_only(binding: &naga::Binding) -> bool {
    matches!(binding, naga::Binding::BuiltIn(builtin) if FRAGMENT_ONLY_BUILTINS.contains(builtin))
}

fn builtin_name(builtin: &naga::BuiltIn) -> String {
    format!("{builtin:?}")
}

fn slot_binding(binding: &naga::Binding, ty: SlotType) -> SlotBinding {
    match binding {
        naga::Binding::BuiltIn(naga::BuiltIn::Position { .. }) => SlotBinding::Position,
        naga::Binding::BuiltIn(builtin) => SlotBinding::BuiltIn(builtin_name(builtin)),
        naga::Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        } => {
            // WGSL defaults: floats are perspective, everything else must be flat
            let interpolation = match interpolation {
                Some(interpolation) => format!("{interpolation:?}"),
                None if matches!(ty.scalar, SlotScalar::F32 | SlotScalar::F16) => "Perspective".to_string(),
                None => "Flat".to_string(),
            };
            let sampling = match sampling {
                Some(sampling) => format!("{sampling:?}"),
                None if interpolation == "Flat" => "First".to_string(),
                None => "Center".to_string(),
            };
            SlotBinding::Location {
                location: *location,
                interpolation,
                sampling,
            }
        }
    }
}

pub(crate) fn slot_type(module: &naga::Module, ty: naga::Handle<naga::Type>) -> SlotType {
    match module.types[ty].inner {
        naga::TypeInner::Scalar(scalar) => SlotType {
            scalar: slot_scalar(scalar),
            components: 1,
        },
        naga::TypeInner::Vector { size, scalar } => SlotType {
            scalar: slot_scalar(scalar),
            components: size as u32,
        },
        _ => SlotType {
            scalar: SlotScalar::Other,
            components: 0,
        },
    }
}

fn slot_scalar(scalar: naga::Scalar) -> SlotScalar {
    match (scalar.kind, scalar.width) {
        (naga::ScalarKind::Float, 4) => SlotScalar::F32,
        (naga::ScalarKind::Float, 2) => SlotScalar::F16,
        (naga::ScalarKind::Sint, 4) => SlotScalar::I32,
        (naga::ScalarKind::Uint, 4) => SlotScalar::U32,
        (naga::ScalarKind::Bool, _) => SlotScalar::Bool,
        _ => SlotScalar::Other,
    }
}

/// Checks that a vertex entry point's output links with a fragment entry point's input
///
/// Both stages must agree on the slot set, its order, every slot's binding and
/// every slot's type. Field names are not compared.
///
/// # Returns
/// The shared interface on success
pub fn check_linkage(module: &naga::Module, vertex_entry: &str, fragment_entry: &str) -> Result<StageInterface, LinkageError> {
    let vertex = interface_of(module, vertex_entry, Stage::Vertex)?;
    let fragment = interface_of(module, fragment_entry, Stage::Fragment)?;

    if vertex.slots.len() != fragment.slots.len() {
        return Err(LinkageError::SlotCountMismatch {
            vertex_slots: vertex.slots.len(),
            fragment_slots: fragment.slots.len(),
        });
    }

    for (index, (vertex_slot, fragment_slot)) in vertex.slots.iter().zip(&fragment.slots).enumerate() {
        if vertex_slot.binding != fragment_slot.binding {
            return Err(LinkageError::BindingMismatch {
                index,
                vertex: vertex_slot.clone(),
                fragment: fragment_slot.clone(),
            });
        }
        if vertex_slot.ty != fragment_slot.ty {
            return Err(LinkageError::TypeMismatch {
                index,
                vertex: vertex_slot.clone(),
                fragment: fragment_slot.clone(),
            });
        }
    }

    Ok(vertex)
}

/// Role tag of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantic {
    /// Clip-space position, interpolated by the rasterizer
    Position,
    /// User slot with its tag and WGSL location
    User { tag: &'static str, location: u32 },
}

/// One field of a record contract; every field is an f32 vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractSlot {
    pub name: &'static str,
    pub semantic: Semantic,
    pub components: u32,
}

/// The declared layout of an interchange record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordContract {
    /// WGSL struct name
    pub name: &'static str,
    /// Fields in declaration order
    pub slots: &'static [ContractSlot],
}

/// Record for fragment stages sampling one texture
pub const SINGLE_INPUT_VERTEX_IO: RecordContract = RecordContract {
    name: "SingleInputVertexIO",
    slots: &[
        ContractSlot {
            name: "position",
            semantic: Semantic::Position,
            components: 4,
        },
        ContractSlot {
            name: "texture_coordinate",
            semantic: Semantic::User { tag: "texturecoord", location: 0 },
            components: 2,
        },
    ],
};

/// Record for fragment stages sampling two textures
pub const TWO_INPUT_VERTEX_IO: RecordContract = RecordContract {
    name: "TwoInputVertexIO",
    slots: &[
        ContractSlot {
            name: "position",
            semantic: Semantic::Position,
            components: 4,
        },
        ContractSlot {
            name: "texture_coordinate",
            semantic: Semantic::User { tag: "texturecoord", location: 0 },
            components: 2,
        },
        ContractSlot {
            name: "texture_coordinate2",
            semantic: Semantic::User { tag: "texturecoord2", location: 1 },
            components: 2,
        },
    ],
};

/// Returns the record contract used by programs with `inputs` input textures
pub fn contract_for_inputs(inputs: u32) -> Option<&'static RecordContract> {
    match inputs {
        1 => Some(&SINGLE_INPUT_VERTEX_IO),
        2 => Some(&TWO_INPUT_VERTEX_IO),
        _ => None,
    }
}

/// Checks a stage interface against a record contract
///
/// The interface must be a single struct with the contract's name, fields,
/// semantics and component counts, in the contract's order.
pub fn check_record(interface: &StageInterface, contract: &'static RecordContract) -> Result<(), LinkageError> {
    let mismatch = |reason: String| LinkageError::RecordMismatch { record: contract.name, reason };

    match &interface.record {
        Some(name) if name == contract.name => {}
        Some(name) => return Err(mismatch(format!("record type is '{name}'"))),
        None => return Err(mismatch("interface is not a single record".to_string())),
    }

    if interface.slots.len() != contract.slots.len() {
        return Err(mismatch(format!("expected {} fields, found {}", contract.slots.len(), interface.slots.len())));
    }

    for (slot, expected) in interface.slots.iter().zip(contract.slots) {
        if slot.name != expected.name {
            return Err(mismatch(format!("expected field '{}', found '{}'", expected.name, slot.name)));
        }

        let binding_matches = match expected.semantic {
            Semantic::Position => slot.binding == SlotBinding::Position,
            Semantic::User { location, .. } => slot.binding == SlotBinding::location(location),
        };
        if !binding_matches {
            return Err(mismatch(format!("field '{}' is bound to {:?}, expected {:?}", slot.name, slot.binding, expected.semantic)));
        }

        let expected_type = SlotType {
            scalar: SlotScalar::F32,
            components: expected.components,
        };
        if slot.ty != expected_type {
            return Err(mismatch(format!("field '{}' is {}, expected {expected_type}", slot.name, slot.ty)));
        }
    }

    Ok(())
}
