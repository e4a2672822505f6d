use glreplay_extras::gl::{PixelFormat, PixelType, UniformType};
use glreplay_extras::{
    decode_extra, encode_extra, ActiveAttribute, ActiveUniform, ContextIdentity, DecodeError,
    DynamicContextState, ErrorState, Extra, ExtraKind, ExtraTag, ExtrasBag, ImageSnapshot,
    PlatformBufferDescriptor, ProgramIntrospection, ResourceId, StaticContextState, UniformBlock,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn resource_id() -> impl Strategy<Value = ResourceId> {
    any::<[u8; 32]>().prop_map(ResourceId::from_bytes)
}

fn uniform_type() -> impl Strategy<Value = UniformType> {
    proptest::sample::select(UniformType::ALL.to_vec())
}

fn pixel_format() -> impl Strategy<Value = PixelFormat> {
    proptest::sample::select(vec![
        PixelFormat::Rgba,
        PixelFormat::Rgb,
        PixelFormat::Red,
        PixelFormat::DepthComponent,
        PixelFormat::LuminanceAlpha,
        PixelFormat::RgbaInteger,
    ])
}

fn pixel_type() -> impl Strategy<Value = PixelType> {
    proptest::sample::select(vec![
        PixelType::UnsignedByte,
        PixelType::Float,
        PixelType::UnsignedShort565,
        PixelType::HalfFloatOes,
        PixelType::UnsignedInt248,
    ])
}

fn identity() -> impl Strategy<Value = ContextIdentity> {
    (any::<u64>(), any::<u64>(), any::<u64>()).prop_map(|(display, surface, context)| {
        ContextIdentity {
            display,
            surface,
            context,
        }
    })
}

fn image_snapshot() -> impl Strategy<Value = ImageSnapshot> {
    (
        resource_id(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        pixel_format(),
        pixel_type(),
    )
        .prop_map(|(id, size, width, height, format, ty)| ImageSnapshot {
            id,
            size,
            width,
            height,
            format,
            ty,
        })
}

fn program() -> impl Strategy<Value = ProgramIntrospection> {
    let uniform = (uniform_type(), "[a-z_\\[\\]0-9]{0,12}", any::<u32>(), any::<i32>())
        .prop_map(|(ty, name, array_size, location)| ActiveUniform {
            ty,
            name,
            array_size,
            location,
        });
    let attribute = (uniform_type(), "[a-z_]{1,8}", any::<u32>(), any::<i32>()).prop_map(
        |(ty, name, array_size, location)| ActiveAttribute {
            ty,
            name,
            array_size,
            location,
        },
    );
    let block = (
        "[A-Za-z]{1,8}",
        any::<u32>(),
        any::<u32>(),
        proptest::collection::vec(any::<u32>(), 0..4),
    )
        .prop_map(|(name, binding, data_size, uniform_indices)| UniformBlock {
            name,
            binding,
            data_size,
            uniform_indices,
        });
    (
        any::<bool>(),
        ".{0,24}",
        proptest::collection::vec(uniform, 0..6),
        proptest::collection::vec(attribute, 0..4),
        proptest::collection::vec(block, 0..3),
    )
        .prop_map(
            |(link_status, info_log, uniforms, attributes, uniform_blocks)| ProgramIntrospection {
                link_status,
                info_log,
                uniforms,
                attributes,
                uniform_blocks,
            },
        )
}

fn extra() -> impl Strategy<Value = Extra> {
    prop_oneof![
        (any::<u32>(), any::<u32>()).prop_map(|(a, b)| Extra::ErrorState(ErrorState {
            trace_driver_error: a,
            interceptor_error: b,
        })),
        image_snapshot().prop_map(Extra::ImageSnapshot),
        program().prop_map(Extra::ProgramIntrospection),
        (
            identity(),
            any::<(u32, u32)>(),
            ".{0,8}",
            ".{0,8}",
            ".{0,8}",
            proptest::collection::vec("GL_[A-Z_]{1,12}", 0..5),
            any::<u32>(),
        )
            .prop_map(
                |(identity, (major, minor), vendor, renderer, version, extensions, max)| {
                    Extra::StaticContextState(StaticContextState {
                        identity,
                        version_major: major,
                        version_minor: minor,
                        vendor,
                        renderer,
                        version,
                        extensions,
                        max_texture_size: max,
                    })
                }
            ),
        (identity(), any::<[u32; 5]>(), any::<(bool, bool)>()).prop_map(
            |(identity, v, (reset, preserve))| Extra::DynamicContextState(DynamicContextState {
                identity,
                backbuffer_width: v[0],
                backbuffer_height: v[1],
                color_format: v[2],
                depth_format: v[3],
                stencil_format: v[4],
                reset_viewport_scissor: reset,
                preserve_buffers_on_swap: preserve,
            })
        ),
        (any::<[u32; 5]>(), any::<u64>()).prop_map(|(v, usage)| {
            Extra::PlatformBufferDescriptor(PlatformBufferDescriptor {
                width: v[0],
                height: v[1],
                stride: v[2],
                format: v[3],
                usage,
                layer_count: v[4],
            })
        }),
    ]
}

proptest! {
    #[test]
    fn every_kind_survives_the_wire(extra in extra()) {
        let bytes = encode_extra(&extra);
        prop_assert_eq!(decode_extra(&bytes)?, extra);
    }

    #[test]
    fn bags_survive_the_wire_in_order(extras in proptest::collection::vec(extra(), 0..8)) {
        let bag: ExtrasBag = extras.into_iter().collect();
        prop_assert_eq!(ExtrasBag::decode(&bag.encode())?, bag);
    }

    #[test]
    fn remap_then_inverse_is_identity(extras in proptest::collection::vec(extra(), 0..8), key in any::<u8>()) {
        let bag: ExtrasBag = extras.into_iter().collect();
        let xor = |id: ResourceId| {
            let mut bytes = *id.as_bytes();
            for b in &mut bytes {
                *b ^= key;
            }
            ResourceId::from_bytes(bytes)
        };
        let there = bag.map_resource_ids(xor);
        let back = there.map_resource_ids(xor);
        prop_assert_eq!(back, bag);
    }

    #[test]
    fn truncation_never_decodes(extra in extra(), cut in 1usize..8) {
        let bytes = encode_extra(&extra);
        let cut = cut.min(bytes.len());
        prop_assert!(decode_extra(&bytes[..bytes.len() - cut]).is_err());
    }
}

#[test]
fn bag_with_unknown_kind_is_a_decode_error() {
    let mut bytes = ExtrasBag::new().encode();
    // Patch the count to 1 and append a frame with an unassigned tag.
    bytes[..4].copy_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&42u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(ExtrasBag::decode(&bytes).unwrap_err(), DecodeError::UnknownKind(42));
}

#[test]
fn each_kind_frames_under_its_own_tag() {
    fn framed_tag<K: ExtraKind>(value: K) -> (ExtraTag, u16) {
        let bytes = encode_extra(&value.into());
        (K::TAG, u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    let frames = [
        framed_tag(ErrorState::default()),
        framed_tag(ProgramIntrospection::default()),
        framed_tag(PlatformBufferDescriptor::default()),
    ];
    for (tag, raw) in frames {
        assert_eq!(ExtraTag::from_raw(raw), Some(tag));
    }
}

#[test]
fn decoded_program_matches_field_by_field() {
    let program = ProgramIntrospection {
        link_status: true,
        info_log: "linked".into(),
        uniforms: vec![ActiveUniform {
            ty: UniformType::FloatMat4,
            name: "u_mvp".into(),
            array_size: 1,
            location: 3,
        }],
        attributes: vec![ActiveAttribute {
            ty: UniformType::FloatVec3,
            name: "a_pos".into(),
            array_size: 1,
            location: 0,
        }],
        uniform_blocks: vec![UniformBlock {
            name: "Lights".into(),
            binding: 1,
            data_size: 64,
            uniform_indices: vec![0],
        }],
    };
    let mut bag = ExtrasBag::new();
    bag.register(program.clone());
    let decoded = ExtrasBag::decode(&bag.encode()).unwrap();
    assert_eq!(decoded.find::<ProgramIntrospection>(), Some(program));
}
