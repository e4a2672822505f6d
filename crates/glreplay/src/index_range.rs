use glreplay_extras::gl::Endian;

/// Span of vertex indices referenced by an index buffer: `first` is the smallest index, `count`
/// the number of indices read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IndexRange {
    pub first: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexSize {
    U8,
    U16,
    U32,
}

impl IndexSize {
    pub fn from_bytes(size: u32) -> Option<Self> {
        match size {
            1 => Some(Self::U8),
            2 => Some(Self::U16),
            4 => Some(Self::U32),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Scans `bytes` as a packed array of indices. A trailing partial element is ignored; an empty
/// buffer yields the zero range.
pub fn index_range(bytes: &[u8], size: IndexSize, endian: Endian) -> IndexRange {
    let width = size.bytes();
    let mut min = u32::MAX;
    let mut count = 0u32;
    for chunk in bytes.chunks_exact(width) {
        let value = match (size, endian) {
            (IndexSize::U8, _) => u32::from(chunk[0]),
            (IndexSize::U16, Endian::Little) => u32::from(u16::from_le_bytes([chunk[0], chunk[1]])),
            (IndexSize::U16, Endian::Big) => u32::from(u16::from_be_bytes([chunk[0], chunk[1]])),
            (IndexSize::U32, Endian::Little) => {
                u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
            }
            (IndexSize::U32, Endian::Big) => {
                u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
            }
        };
        min = min.min(value);
        count = count.saturating_add(1);
    }
    if count == 0 {
        return IndexRange::default();
    }
    IndexRange { first: min, count }
}
