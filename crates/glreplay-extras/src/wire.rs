//! Wire encoding of extension objects.
//!
//! Each extra is framed as `tag: u16 | len: u32 | payload`. Payload layouts are fixed per kind
//! (see the [`WireCodec`] impls below); decoding a payload must consume it exactly.

use crate::codec::{Decoder, Encoder};
use crate::error::DecodeError;
use crate::gl::{PixelFormat, PixelType, UniformType};
use crate::kinds::{
    ActiveAttribute, ActiveUniform, ContextIdentity, DynamicContextState, ErrorState, Extra,
    ExtraTag, ImageSnapshot, PlatformBufferDescriptor, ProgramIntrospection, StaticContextState,
    UniformBlock,
};

/// Per-kind payload encoding. `decode(encode(x)) == x` for every value.
pub trait WireCodec: Sized {
    fn encode(&self, enc: Encoder) -> Encoder;
    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError>;
}

pub fn encode_extra(extra: &Extra) -> Vec<u8> {
    let payload = match extra {
        Extra::ErrorState(v) => v.encode(Encoder::new()),
        Extra::ImageSnapshot(v) => v.encode(Encoder::new()),
        Extra::ProgramIntrospection(v) => v.encode(Encoder::new()),
        Extra::StaticContextState(v) => v.encode(Encoder::new()),
        Extra::DynamicContextState(v) => v.encode(Encoder::new()),
        Extra::PlatformBufferDescriptor(v) => v.encode(Encoder::new()),
    }
    .finish();

    Encoder::new()
        .u16(extra.tag().raw())
        .bytes(&payload)
        .finish()
}

/// Decodes one framed extra from `dec`, leaving the cursor after it.
pub(crate) fn read_extra(dec: &mut Decoder<'_>) -> Result<Extra, DecodeError> {
    let raw_tag = dec.u16()?;
    let tag = ExtraTag::from_raw(raw_tag).ok_or(DecodeError::UnknownKind(raw_tag))?;
    let mut payload = Decoder::new(dec.bytes()?);
    let extra = match tag {
        ExtraTag::ErrorState => ErrorState::decode(&mut payload)?.into(),
        ExtraTag::ImageSnapshot => ImageSnapshot::decode(&mut payload)?.into(),
        ExtraTag::ProgramIntrospection => ProgramIntrospection::decode(&mut payload)?.into(),
        ExtraTag::StaticContextState => StaticContextState::decode(&mut payload)?.into(),
        ExtraTag::DynamicContextState => DynamicContextState::decode(&mut payload)?.into(),
        ExtraTag::PlatformBufferDescriptor => {
            PlatformBufferDescriptor::decode(&mut payload)?.into()
        }
    };
    payload.finish()?;
    Ok(extra)
}

pub fn decode_extra(bytes: &[u8]) -> Result<Extra, DecodeError> {
    let mut dec = Decoder::new(bytes);
    let extra = read_extra(&mut dec)?;
    dec.finish()?;
    Ok(extra)
}

impl WireCodec for ErrorState {
    fn encode(&self, enc: Encoder) -> Encoder {
        enc.u32(self.trace_driver_error).u32(self.interceptor_error)
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            trace_driver_error: dec.u32()?,
            interceptor_error: dec.u32()?,
        })
    }
}

impl WireCodec for ImageSnapshot {
    fn encode(&self, enc: Encoder) -> Encoder {
        enc.resource_id(&self.id)
            .u32(self.size)
            .u32(self.width)
            .u32(self.height)
            .u32(self.format.raw())
            .u32(self.ty.raw())
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: dec.resource_id()?,
            size: dec.u32()?,
            width: dec.u32()?,
            height: dec.u32()?,
            format: PixelFormat::from_raw(dec.u32()?)?,
            ty: PixelType::from_raw(dec.u32()?)?,
        })
    }
}

// ty + name length + array_size + location
const MIN_VARIABLE_SIZE: usize = 16;

fn encode_variable(
    enc: Encoder,
    ty: UniformType,
    name: &str,
    array_size: u32,
    location: i32,
) -> Encoder {
    enc.u32(ty.raw()).str(name).u32(array_size).i32(location)
}

impl WireCodec for ProgramIntrospection {
    fn encode(&self, mut enc: Encoder) -> Encoder {
        enc = enc
            .bool(self.link_status)
            .str(&self.info_log)
            .len_prefix(self.uniforms.len());
        for u in &self.uniforms {
            enc = encode_variable(enc, u.ty, &u.name, u.array_size, u.location);
        }
        enc = enc.len_prefix(self.attributes.len());
        for a in &self.attributes {
            enc = encode_variable(enc, a.ty, &a.name, a.array_size, a.location);
        }
        enc = enc.len_prefix(self.uniform_blocks.len());
        for b in &self.uniform_blocks {
            enc = enc
                .str(&b.name)
                .u32(b.binding)
                .u32(b.data_size)
                .len_prefix(b.uniform_indices.len());
            for index in &b.uniform_indices {
                enc = enc.u32(*index);
            }
        }
        enc
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let link_status = dec.bool()?;
        let info_log = dec.string()?;

        let count = dec.count(MIN_VARIABLE_SIZE)?;
        let mut uniforms = Vec::with_capacity(count);
        for _ in 0..count {
            uniforms.push(ActiveUniform {
                ty: UniformType::from_raw(dec.u32()?)?,
                name: dec.string()?,
                array_size: dec.u32()?,
                location: dec.i32()?,
            });
        }

        let count = dec.count(MIN_VARIABLE_SIZE)?;
        let mut attributes = Vec::with_capacity(count);
        for _ in 0..count {
            attributes.push(ActiveAttribute {
                ty: UniformType::from_raw(dec.u32()?)?,
                name: dec.string()?,
                array_size: dec.u32()?,
                location: dec.i32()?,
            });
        }

        // name length + binding + data_size + index count
        let count = dec.count(16)?;
        let mut uniform_blocks = Vec::with_capacity(count);
        for _ in 0..count {
            let name = dec.string()?;
            let binding = dec.u32()?;
            let data_size = dec.u32()?;
            let n = dec.count(4)?;
            let mut uniform_indices = Vec::with_capacity(n);
            for _ in 0..n {
                uniform_indices.push(dec.u32()?);
            }
            uniform_blocks.push(UniformBlock {
                name,
                binding,
                data_size,
                uniform_indices,
            });
        }

        Ok(Self {
            link_status,
            info_log,
            uniforms,
            attributes,
            uniform_blocks,
        })
    }
}

impl WireCodec for ContextIdentity {
    fn encode(&self, enc: Encoder) -> Encoder {
        enc.u64(self.display).u64(self.surface).u64(self.context)
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            display: dec.u64()?,
            surface: dec.u64()?,
            context: dec.u64()?,
        })
    }
}

impl WireCodec for StaticContextState {
    fn encode(&self, enc: Encoder) -> Encoder {
        let mut enc = self
            .identity
            .encode(enc)
            .u32(self.version_major)
            .u32(self.version_minor)
            .str(&self.vendor)
            .str(&self.renderer)
            .str(&self.version)
            .len_prefix(self.extensions.len());
        for ext in &self.extensions {
            enc = enc.str(ext);
        }
        enc.u32(self.max_texture_size)
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let identity = ContextIdentity::decode(dec)?;
        let version_major = dec.u32()?;
        let version_minor = dec.u32()?;
        let vendor = dec.string()?;
        let renderer = dec.string()?;
        let version = dec.string()?;
        let count = dec.count(4)?;
        let mut extensions = Vec::with_capacity(count);
        for _ in 0..count {
            extensions.push(dec.string()?);
        }
        Ok(Self {
            identity,
            version_major,
            version_minor,
            vendor,
            renderer,
            version,
            extensions,
            max_texture_size: dec.u32()?,
        })
    }
}

impl WireCodec for DynamicContextState {
    fn encode(&self, enc: Encoder) -> Encoder {
        self.identity
            .encode(enc)
            .u32(self.backbuffer_width)
            .u32(self.backbuffer_height)
            .u32(self.color_format)
            .u32(self.depth_format)
            .u32(self.stencil_format)
            .bool(self.reset_viewport_scissor)
            .bool(self.preserve_buffers_on_swap)
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            identity: ContextIdentity::decode(dec)?,
            backbuffer_width: dec.u32()?,
            backbuffer_height: dec.u32()?,
            color_format: dec.u32()?,
            depth_format: dec.u32()?,
            stencil_format: dec.u32()?,
            reset_viewport_scissor: dec.bool()?,
            preserve_buffers_on_swap: dec.bool()?,
        })
    }
}

impl WireCodec for PlatformBufferDescriptor {
    fn encode(&self, enc: Encoder) -> Encoder {
        enc.u32(self.width)
            .u32(self.height)
            .u32(self.stride)
            .u32(self.format)
            .u64(self.usage)
            .u32(self.layer_count)
    }

    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            width: dec.u32()?,
            height: dec.u32()?,
            stride: dec.u32()?,
            format: dec.u32()?,
            usage: dec.u64()?,
            layer_count: dec.u32()?,
        })
    }
}
