//! The slice of the GL ES enum vocabulary used by extras and readback.
//!
//! Values are the raw `GLenum`s as recorded in traces. Conversion from raw values is fallible;
//! unknown values surface as [`DecodeError::InvalidEnum`].

use crate::error::DecodeError;

/// Byte order of the recorded application's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Client pixel format (`format` argument of `glReadPixels` / `glTexImage2D`).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PixelFormat {
    StencilIndex = 0x1901,
    DepthComponent = 0x1902,
    Red = 0x1903,
    Alpha = 0x1906,
    Rgb = 0x1907,
    Rgba = 0x1908,
    Luminance = 0x1909,
    LuminanceAlpha = 0x190A,
    BgraExt = 0x80E1,
    Rg = 0x8227,
    RgInteger = 0x8228,
    DepthStencil = 0x84F9,
    RedInteger = 0x8D94,
    RgbInteger = 0x8D98,
    RgbaInteger = 0x8D99,
}

/// Which framebuffer attachment a pixel format reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Color,
    Depth,
    Stencil,
    DepthStencil,
}

impl PixelFormat {
    pub fn from_raw(value: u32) -> Result<Self, DecodeError> {
        Ok(match value {
            0x1901 => Self::StencilIndex,
            0x1902 => Self::DepthComponent,
            0x1903 => Self::Red,
            0x1906 => Self::Alpha,
            0x1907 => Self::Rgb,
            0x1908 => Self::Rgba,
            0x1909 => Self::Luminance,
            0x190A => Self::LuminanceAlpha,
            0x80E1 => Self::BgraExt,
            0x8227 => Self::Rg,
            0x8228 => Self::RgInteger,
            0x84F9 => Self::DepthStencil,
            0x8D94 => Self::RedInteger,
            0x8D98 => Self::RgbInteger,
            0x8D99 => Self::RgbaInteger,
            _ => {
                return Err(DecodeError::InvalidEnum {
                    what: "pixel format",
                    value,
                })
            }
        })
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Number of components per pixel for unpacked pixel types.
    pub fn components(self) -> u32 {
        match self {
            Self::StencilIndex
            | Self::DepthComponent
            | Self::Red
            | Self::RedInteger
            | Self::Alpha
            | Self::Luminance => 1,
            Self::LuminanceAlpha | Self::Rg | Self::RgInteger | Self::DepthStencil => 2,
            Self::Rgb | Self::RgbInteger => 3,
            Self::Rgba | Self::RgbaInteger | Self::BgraExt => 4,
        }
    }

    pub fn component_kind(self) -> ComponentKind {
        match self {
            Self::DepthComponent => ComponentKind::Depth,
            Self::StencilIndex => ComponentKind::Stencil,
            Self::DepthStencil => ComponentKind::DepthStencil,
            _ => ComponentKind::Color,
        }
    }
}

/// Client pixel data type (`type` argument of `glReadPixels`).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PixelType {
    Byte = 0x1400,
    UnsignedByte = 0x1401,
    Short = 0x1402,
    UnsignedShort = 0x1403,
    Int = 0x1404,
    UnsignedInt = 0x1405,
    Float = 0x1406,
    HalfFloat = 0x140B,
    UnsignedShort4444 = 0x8033,
    UnsignedShort5551 = 0x8034,
    UnsignedShort565 = 0x8363,
    UnsignedInt2101010Rev = 0x8368,
    UnsignedInt248 = 0x84FA,
    UnsignedInt10f11f11fRev = 0x8C3B,
    UnsignedInt5999Rev = 0x8C3E,
    HalfFloatOes = 0x8D61,
    Float32UnsignedInt248Rev = 0x8DAD,
}

impl PixelType {
    pub fn from_raw(value: u32) -> Result<Self, DecodeError> {
        Ok(match value {
            0x1400 => Self::Byte,
            0x1401 => Self::UnsignedByte,
            0x1402 => Self::Short,
            0x1403 => Self::UnsignedShort,
            0x1404 => Self::Int,
            0x1405 => Self::UnsignedInt,
            0x1406 => Self::Float,
            0x140B => Self::HalfFloat,
            0x8033 => Self::UnsignedShort4444,
            0x8034 => Self::UnsignedShort5551,
            0x8363 => Self::UnsignedShort565,
            0x8368 => Self::UnsignedInt2101010Rev,
            0x84FA => Self::UnsignedInt248,
            0x8C3B => Self::UnsignedInt10f11f11fRev,
            0x8C3E => Self::UnsignedInt5999Rev,
            0x8D61 => Self::HalfFloatOes,
            0x8DAD => Self::Float32UnsignedInt248Rev,
            _ => {
                return Err(DecodeError::InvalidEnum {
                    what: "pixel type",
                    value,
                })
            }
        })
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    /// For packed types, the size of a whole pixel and the formats it may be combined with.
    fn packed(self) -> Option<(u32, &'static [PixelFormat])> {
        const RGB: &[PixelFormat] = &[PixelFormat::Rgb];
        const RGBA: &[PixelFormat] = &[PixelFormat::Rgba];
        const RGBA_ANY: &[PixelFormat] = &[PixelFormat::Rgba, PixelFormat::RgbaInteger];
        const DEPTH_STENCIL: &[PixelFormat] = &[PixelFormat::DepthStencil];
        Some(match self {
            Self::UnsignedShort565 => (2, RGB),
            Self::UnsignedShort4444 | Self::UnsignedShort5551 => (2, RGBA),
            Self::UnsignedInt2101010Rev => (4, RGBA_ANY),
            Self::UnsignedInt10f11f11fRev | Self::UnsignedInt5999Rev => (4, RGB),
            Self::UnsignedInt248 => (4, DEPTH_STENCIL),
            Self::Float32UnsignedInt248Rev => (8, DEPTH_STENCIL),
            _ => return None,
        })
    }

    fn component_size(self) -> u32 {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort | Self::HalfFloat | Self::HalfFloatOes => 2,
            _ => 4,
        }
    }
}

/// Size of one pixel of `format`/`ty` in client memory, or `None` for invalid combinations.
pub fn bytes_per_pixel(format: PixelFormat, ty: PixelType) -> Option<u32> {
    match ty.packed() {
        Some((size, formats)) => formats.contains(&format).then_some(size),
        // Depth-stencil data only exists in packed form.
        None if format == PixelFormat::DepthStencil => None,
        None => Some(format.components() * ty.component_size()),
    }
}

/// Tightly packed (alignment 1) size of a `width` x `height` image.
pub fn uncompressed_image_size(
    format: PixelFormat,
    ty: PixelType,
    width: u32,
    height: u32,
) -> Option<u64> {
    let bpp = u64::from(bytes_per_pixel(format, ty)?);
    bpp.checked_mul(u64::from(width))?
        .checked_mul(u64::from(height))
}

/// Scalar category of a uniform/attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Float,
    Int,
    Uint,
    Bool,
}

/// Shape of a uniform/attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Scalar(ScalarKind),
    Vector(ScalarKind, u8),
    Matrix { columns: u8, rows: u8 },
    Sampler(SamplerKind),
}

/// Texture lookup dimensionality of a sampler, plus whether it is a shadow sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerKind {
    pub result: ScalarKind,
    /// Number of components in the texture coordinate (excluding the shadow reference).
    pub coord_components: u8,
    pub shadow: bool,
    pub external: bool,
}

/// Active uniform/attribute type as reported by `glGetActiveUniform`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniformType {
    Int = 0x1404,
    UnsignedInt = 0x1405,
    Float = 0x1406,
    FloatVec2 = 0x8B50,
    FloatVec3 = 0x8B51,
    FloatVec4 = 0x8B52,
    IntVec2 = 0x8B53,
    IntVec3 = 0x8B54,
    IntVec4 = 0x8B55,
    Bool = 0x8B56,
    BoolVec2 = 0x8B57,
    BoolVec3 = 0x8B58,
    BoolVec4 = 0x8B59,
    FloatMat2 = 0x8B5A,
    FloatMat3 = 0x8B5B,
    FloatMat4 = 0x8B5C,
    Sampler2d = 0x8B5E,
    Sampler3d = 0x8B5F,
    SamplerCube = 0x8B60,
    Sampler2dShadow = 0x8B62,
    FloatMat2x3 = 0x8B65,
    FloatMat2x4 = 0x8B66,
    FloatMat3x2 = 0x8B67,
    FloatMat3x4 = 0x8B68,
    FloatMat4x2 = 0x8B69,
    FloatMat4x3 = 0x8B6A,
    SamplerExternalOes = 0x8D66,
    Sampler2dArray = 0x8DC1,
    Sampler2dArrayShadow = 0x8DC4,
    SamplerCubeShadow = 0x8DC5,
    UnsignedIntVec2 = 0x8DC6,
    UnsignedIntVec3 = 0x8DC7,
    UnsignedIntVec4 = 0x8DC8,
    IntSampler2d = 0x8DCA,
    IntSampler3d = 0x8DCB,
    IntSamplerCube = 0x8DCC,
    IntSampler2dArray = 0x8DCF,
    UnsignedIntSampler2d = 0x8DD2,
    UnsignedIntSampler3d = 0x8DD3,
    UnsignedIntSamplerCube = 0x8DD4,
    UnsignedIntSampler2dArray = 0x8DD7,
}

impl UniformType {
    pub const ALL: [UniformType; 41] = [
        Self::Int,
        Self::UnsignedInt,
        Self::Float,
        Self::FloatVec2,
        Self::FloatVec3,
        Self::FloatVec4,
        Self::IntVec2,
        Self::IntVec3,
        Self::IntVec4,
        Self::Bool,
        Self::BoolVec2,
        Self::BoolVec3,
        Self::BoolVec4,
        Self::FloatMat2,
        Self::FloatMat3,
        Self::FloatMat4,
        Self::Sampler2d,
        Self::Sampler3d,
        Self::SamplerCube,
        Self::Sampler2dShadow,
        Self::FloatMat2x3,
        Self::FloatMat2x4,
        Self::FloatMat3x2,
        Self::FloatMat3x4,
        Self::FloatMat4x2,
        Self::FloatMat4x3,
        Self::SamplerExternalOes,
        Self::Sampler2dArray,
        Self::Sampler2dArrayShadow,
        Self::SamplerCubeShadow,
        Self::UnsignedIntVec2,
        Self::UnsignedIntVec3,
        Self::UnsignedIntVec4,
        Self::IntSampler2d,
        Self::IntSampler3d,
        Self::IntSamplerCube,
        Self::IntSampler2dArray,
        Self::UnsignedIntSampler2d,
        Self::UnsignedIntSampler3d,
        Self::UnsignedIntSamplerCube,
        Self::UnsignedIntSampler2dArray,
    ];

    pub fn from_raw(value: u32) -> Result<Self, DecodeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.raw() == value)
            .ok_or(DecodeError::InvalidEnum {
                what: "uniform type",
                value,
            })
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    /// GLSL ES 3.00 spelling of the type.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UnsignedInt => "uint",
            Self::Float => "float",
            Self::FloatVec2 => "vec2",
            Self::FloatVec3 => "vec3",
            Self::FloatVec4 => "vec4",
            Self::IntVec2 => "ivec2",
            Self::IntVec3 => "ivec3",
            Self::IntVec4 => "ivec4",
            Self::Bool => "bool",
            Self::BoolVec2 => "bvec2",
            Self::BoolVec3 => "bvec3",
            Self::BoolVec4 => "bvec4",
            Self::FloatMat2 => "mat2",
            Self::FloatMat3 => "mat3",
            Self::FloatMat4 => "mat4",
            Self::FloatMat2x3 => "mat2x3",
            Self::FloatMat2x4 => "mat2x4",
            Self::FloatMat3x2 => "mat3x2",
            Self::FloatMat3x4 => "mat3x4",
            Self::FloatMat4x2 => "mat4x2",
            Self::FloatMat4x3 => "mat4x3",
            Self::Sampler2d => "sampler2D",
            Self::Sampler3d => "sampler3D",
            Self::SamplerCube => "samplerCube",
            Self::Sampler2dShadow => "sampler2DShadow",
            Self::SamplerExternalOes => "samplerExternalOES",
            Self::Sampler2dArray => "sampler2DArray",
            Self::Sampler2dArrayShadow => "sampler2DArrayShadow",
            Self::SamplerCubeShadow => "samplerCubeShadow",
            Self::UnsignedIntVec2 => "uvec2",
            Self::UnsignedIntVec3 => "uvec3",
            Self::UnsignedIntVec4 => "uvec4",
            Self::IntSampler2d => "isampler2D",
            Self::IntSampler3d => "isampler3D",
            Self::IntSamplerCube => "isamplerCube",
            Self::IntSampler2dArray => "isampler2DArray",
            Self::UnsignedIntSampler2d => "usampler2D",
            Self::UnsignedIntSampler3d => "usampler3D",
            Self::UnsignedIntSamplerCube => "usamplerCube",
            Self::UnsignedIntSampler2dArray => "usampler2DArray",
        }
    }

    pub fn shape(self) -> TypeShape {
        use ScalarKind::{Bool, Float, Int, Uint};
        let sampler = |result, coord_components, shadow| {
            TypeShape::Sampler(SamplerKind {
                result,
                coord_components,
                shadow,
                external: false,
            })
        };
        match self {
            Self::Int => TypeShape::Scalar(Int),
            Self::UnsignedInt => TypeShape::Scalar(Uint),
            Self::Float => TypeShape::Scalar(Float),
            Self::Bool => TypeShape::Scalar(Bool),
            Self::FloatVec2 => TypeShape::Vector(Float, 2),
            Self::FloatVec3 => TypeShape::Vector(Float, 3),
            Self::FloatVec4 => TypeShape::Vector(Float, 4),
            Self::IntVec2 => TypeShape::Vector(Int, 2),
            Self::IntVec3 => TypeShape::Vector(Int, 3),
            Self::IntVec4 => TypeShape::Vector(Int, 4),
            Self::UnsignedIntVec2 => TypeShape::Vector(Uint, 2),
            Self::UnsignedIntVec3 => TypeShape::Vector(Uint, 3),
            Self::UnsignedIntVec4 => TypeShape::Vector(Uint, 4),
            Self::BoolVec2 => TypeShape::Vector(Bool, 2),
            Self::BoolVec3 => TypeShape::Vector(Bool, 3),
            Self::BoolVec4 => TypeShape::Vector(Bool, 4),
            Self::FloatMat2 => TypeShape::Matrix { columns: 2, rows: 2 },
            Self::FloatMat3 => TypeShape::Matrix { columns: 3, rows: 3 },
            Self::FloatMat4 => TypeShape::Matrix { columns: 4, rows: 4 },
            Self::FloatMat2x3 => TypeShape::Matrix { columns: 2, rows: 3 },
            Self::FloatMat2x4 => TypeShape::Matrix { columns: 2, rows: 4 },
            Self::FloatMat3x2 => TypeShape::Matrix { columns: 3, rows: 2 },
            Self::FloatMat3x4 => TypeShape::Matrix { columns: 3, rows: 4 },
            Self::FloatMat4x2 => TypeShape::Matrix { columns: 4, rows: 2 },
            Self::FloatMat4x3 => TypeShape::Matrix { columns: 4, rows: 3 },
            Self::Sampler2d => sampler(Float, 2, false),
            Self::Sampler3d | Self::SamplerCube | Self::Sampler2dArray => sampler(Float, 3, false),
            Self::Sampler2dShadow => sampler(Float, 2, true),
            Self::SamplerCubeShadow | Self::Sampler2dArrayShadow => sampler(Float, 3, true),
            Self::SamplerExternalOes => TypeShape::Sampler(SamplerKind {
                result: Float,
                coord_components: 2,
                shadow: false,
                external: true,
            }),
            Self::IntSampler2d => sampler(Int, 2, false),
            Self::IntSampler3d | Self::IntSamplerCube | Self::IntSampler2dArray => {
                sampler(Int, 3, false)
            }
            Self::UnsignedIntSampler2d => sampler(Uint, 2, false),
            Self::UnsignedIntSampler3d
            | Self::UnsignedIntSamplerCube
            | Self::UnsignedIntSampler2dArray => sampler(Uint, 3, false),
        }
    }

    pub fn is_sampler(self) -> bool {
        matches!(self.shape(), TypeShape::Sampler(_))
    }
}
