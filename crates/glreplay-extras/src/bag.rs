use crate::codec::{Decoder, Encoder};
use crate::error::DecodeError;
use crate::kinds::{Extra, ExtraKind};
use crate::resource_id::ResourceId;
use crate::wire::{encode_extra, read_extra};

/// Ordered extension objects attached to one recorded command.
///
/// The bag never deduplicates: if several objects of the same kind are registered, lookups see
/// the first one and ignore the rest. Lookups return owned copies, so callers can mutate what
/// they get back without affecting the bag or other readers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtrasBag {
    items: Vec<Extra>,
}

impl ExtrasBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `extra` after everything already registered.
    pub fn register(&mut self, extra: impl Into<Extra>) {
        self.items.push(extra.into());
    }

    /// Deep copy of the first object of kind `K`, in insertion order.
    pub fn find<K: ExtraKind>(&self) -> Option<K> {
        self.items.iter().find_map(K::from_extra).cloned()
    }

    /// Whether any object of kind `K` is registered.
    pub fn contains<K: ExtraKind>(&self) -> bool {
        self.items.iter().any(|extra| extra.tag() == K::TAG)
    }

    /// Number of registered objects of kind `K`.
    pub fn count<K: ExtraKind>(&self) -> usize {
        self.items
            .iter()
            .filter(|extra| extra.tag() == K::TAG)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extra> {
        self.items.iter()
    }

    /// Every resource identity referenced by the bag, in insertion order.
    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.items.iter().flat_map(Extra::resource_ids).collect()
    }

    /// Returns a copy of the bag with `f` applied once to every resource identity.
    pub fn map_resource_ids<F>(&self, mut f: F) -> ExtrasBag
    where
        F: FnMut(ResourceId) -> ResourceId,
    {
        ExtrasBag {
            items: self
                .items
                .iter()
                .map(|extra| extra.map_resource_ids(&mut f))
                .collect(),
        }
    }

    /// `count: u32` followed by each framed extra.
    pub fn encode(&self) -> Vec<u8> {
        let mut enc = Encoder::new().len_prefix(self.items.len());
        for extra in &self.items {
            enc = enc.raw(&encode_extra(extra));
        }
        enc.finish()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(bytes);
        // Smallest frame: tag + payload length.
        let count = dec.count(6)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read_extra(&mut dec)?);
        }
        dec.finish()?;
        Ok(Self { items })
    }
}

impl FromIterator<Extra> for ExtrasBag {
    fn from_iter<I: IntoIterator<Item = Extra>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
