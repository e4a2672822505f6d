//! Out-of-band metadata ("extras") attached to recorded GL ES commands.
//!
//! A recorded command carries its typed arguments plus an [`ExtrasBag`]: an ordered list of
//! extension objects such as the GL error state observed at trace time, image blobs bound from
//! the platform, or link-time program introspection. This crate provides:
//!
//! - the closed set of extension kinds (see [`Extra`]) and first-match lookup that always hands
//!   out an owned copy (see [`ExtrasBag::find`]);
//! - a deterministic little-endian TLV wire encoding for bags and single extras;
//! - resource-identity remapping for the serialization boundary (see [`ResourceId`]);
//! - the small GL enum vocabulary the extras are expressed in (see [`gl`]).

mod bag;
mod error;
mod kinds;
mod resource_id;
mod wire;

pub mod codec;
pub mod gl;

pub use bag::ExtrasBag;
pub use error::DecodeError;
pub use kinds::{
    ActiveAttribute, ActiveUniform, ContextIdentity, DynamicContextState, ErrorState, Extra,
    ExtraKind, ExtraTag, ImageSnapshot, PlatformBufferDescriptor, ProgramIntrospection,
    StaticContextState, UniformBlock,
};
pub use resource_id::ResourceId;
pub use wire::{decode_extra, encode_extra, WireCodec};
