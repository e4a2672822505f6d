use core::fmt;

/// Content-addressed identifier of a blob resource (image bytes, readback results).
///
/// The identifier is the BLAKE3 hash of the content, so it is stable across processes and
/// independent of any in-memory object graph. Serialization boundaries may still substitute
/// identifiers (e.g. to a trace-local numbering) via the remap hooks on
/// [`Extra`](crate::Extra).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourceId([u8; ResourceId::LEN]);

impl ResourceId {
    pub const LEN: usize = 32;

    pub const ZERO: ResourceId = ResourceId([0u8; Self::LEN]);

    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Identifier of `content`.
    pub fn of(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; Self::LEN]
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form; full ids are noise in state dumps.
        write!(f, "ResourceId({}..)", &hex::encode(&self.0[..6]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_has_identical_id() {
        assert_eq!(ResourceId::of(b"pixels"), ResourceId::of(b"pixels"));
        assert_ne!(ResourceId::of(b"pixels"), ResourceId::of(b"pixelz"));
    }

    #[test]
    fn display_is_full_hex() {
        let id = ResourceId::from_bytes([0xAB; ResourceId::LEN]);
        assert_eq!(id.to_string(), "ab".repeat(ResourceId::LEN));
        assert!(!id.is_zero());
        assert!(ResourceId::ZERO.is_zero());
    }
}
