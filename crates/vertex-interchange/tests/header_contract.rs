//! Checks that the WGSL header, the host records and the build-time record
//! contracts all describe the same layout.

use naga::{Binding, BuiltIn, Expression, Literal, TypeInner};
use vertex_interchange::{LUMINANCE_WEIGHTING_F32, OPERATION_SHADER_TYPES_WGSL, Semantic, SingleInputVertexIO, TwoInputVertexIO, VertexRecord};
use vertex_interchange_build::interface::{self, RecordContract};

fn header() -> naga::Module {
    naga::front::wgsl::parse_str(OPERATION_SHADER_TYPES_WGSL).unwrap_or_else(|e| panic!("{}", e.emit_to_string(OPERATION_SHADER_TYPES_WGSL)))
}

fn struct_members<'a>(module: &'a naga::Module, name: &str) -> &'a [naga::StructMember] {
    module
        .types
        .iter()
        .find_map(|(_, ty)| match &ty.inner {
            TypeInner::Struct { members, .. } if ty.name.as_deref() == Some(name) => Some(members.as_slice()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("struct {name} not declared in header"))
}

fn assert_layouts_agree<R: VertexRecord>(module: &naga::Module, contract: &RecordContract) {
    let members = struct_members(module, R::NAME);
    assert_eq!(contract.name, R::NAME);
    assert_eq!(members.len(), R::FIELDS.len(), "{}", R::NAME);
    assert_eq!(contract.slots.len(), R::FIELDS.len(), "{}", R::NAME);

    for ((member, field), slot) in members.iter().zip(R::FIELDS).zip(contract.slots) {
        assert_eq!(member.name.as_deref(), Some(field.name));
        assert_eq!(slot.name, field.name);
        assert_eq!(slot.components, field.components);

        match (&member.binding, field.semantic) {
            (Some(Binding::BuiltIn(BuiltIn::Position { .. })), Semantic::Position) => {
                assert_eq!(slot.semantic, interface::Semantic::Position);
            }
            (Some(Binding::Location { location, .. }), Semantic::User { tag, location: expected }) => {
                assert_eq!(*location, expected, "{}::{}", R::NAME, field.name);
                assert_eq!(slot.semantic, interface::Semantic::User { tag, location: expected });
            }
            (binding, semantic) => panic!("{}::{}: header binding {binding:?} but host semantic {semantic:?}", R::NAME, field.name),
        }

        match module.types[member.ty].inner {
            TypeInner::Vector { size, scalar } => {
                assert_eq!(size as u32, field.components, "{}::{}", R::NAME, field.name);
                assert_eq!(scalar, naga::Scalar::F32);
            }
            ref other => panic!("{}::{} has non-vector type {other:?}", R::NAME, field.name),
        }
    }
}

#[test]
fn test_single_input_record_matches_header() {
    assert_layouts_agree::<SingleInputVertexIO>(&header(), &interface::SINGLE_INPUT_VERTEX_IO);
}

#[test]
fn test_two_input_record_matches_header() {
    assert_layouts_agree::<TwoInputVertexIO>(&header(), &interface::TWO_INPUT_VERTEX_IO);
}

#[test]
fn test_luminance_weighting_matches_header() {
    let module = header();
    let constant = module
        .constants
        .iter()
        .map(|(_, constant)| constant)
        .find(|constant| constant.name.as_deref() == Some("LUMINANCE_WEIGHTING"))
        .expect("LUMINANCE_WEIGHTING not declared in header");

    let Expression::Compose { ref components, .. } = module.global_expressions[constant.init] else {
        panic!("LUMINANCE_WEIGHTING is not a composed vector");
    };
    let values = components
        .iter()
        .map(|&component| match module.global_expressions[component] {
            Expression::Literal(Literal::F32(value)) => value as f64,
            Expression::Literal(Literal::AbstractFloat(value)) => value,
            ref other => panic!("unexpected component {other:?}"),
        })
        .collect::<Vec<_>>();

    assert_eq!(values.len(), 3);
    for (header_value, host_value) in values.iter().zip(LUMINANCE_WEIGHTING_F32) {
        assert!((header_value - host_value as f64).abs() < 1e-6, "{header_value} != {host_value}");
    }
}
