use thiserror::Error;

/// Malformed extras wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of data: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unknown extension kind tag {0}")]
    UnknownKind(u16),

    #[error("invalid {what} value 0x{value:X}")]
    InvalidEnum { what: &'static str, value: u32 },

    #[error("invalid bool byte 0x{0:02X}")]
    InvalidBool(u8),

    #[error("string field is not valid utf-8")]
    InvalidUtf8,

    #[error("length prefix {len} exceeds the {remaining} remaining bytes")]
    LengthOutOfBounds { len: u64, remaining: usize },

    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}
