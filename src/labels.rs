//! Route user-label indices between the primary and private label stores.
//!
//! Indices `0..=4` address the primary store directly. Indices `5..=20` address the
//! private store, offset by 5. Anything else has no label.

/// The number of labels held in the primary store
pub const PRIMARY_LABEL_COUNT: usize = 5;

/// The largest addressable label index
pub const MAX_LABEL_INDEX: usize = 20;

/// Where a label index resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSlot {
    Primary(usize),
    Private(usize),
}

pub fn route_label_index(index: i64) -> Option<LabelSlot> {
    let index = usize::try_from(index).ok()?;
    if index > MAX_LABEL_INDEX {
        None
    } else if index < PRIMARY_LABEL_COUNT {
        Some(LabelSlot::Primary(index))
    } else {
        Some(LabelSlot::Private(index - PRIMARY_LABEL_COUNT))
    }
}

/// An external key-value label store addressed by offset
pub trait LabelStore {
    fn label(&self, offset: usize) -> Option<&str>;
}

impl LabelStore for [String] {
    fn label(&self, offset: usize) -> Option<&str> {
        self.get(offset).map(|s| s.as_str())
    }
}

impl LabelStore for Vec<String> {
    fn label(&self, offset: usize) -> Option<&str> {
        self.as_slice().label(offset)
    }
}

impl<T: LabelStore + ?Sized> LabelStore for &T {
    fn label(&self, offset: usize) -> Option<&str> {
        (**self).label(offset)
    }
}

/// A combined view over a primary and a private [`LabelStore`]
#[derive(Debug, Default, Clone)]
pub struct UserLabels<P: LabelStore, Q: LabelStore> {
    pub primary: P,
    pub private: Q,
}

impl<P: LabelStore, Q: LabelStore> UserLabels<P, Q> {
    pub fn new(primary: P, private: Q) -> Self {
        Self { primary, private }
    }

    /// The label at `index`, or an empty string when the index is out of range or
    /// the backing store has no entry for it
    pub fn get(&self, index: i64) -> &str {
        let label = match route_label_index(index) {
            Some(LabelSlot::Primary(offset)) => self.primary.label(offset),
            Some(LabelSlot::Private(offset)) => self.private.label(offset),
            None => None,
        };
        if label.is_none() {
            log::trace!("No user label at index {index}");
        }
        label.unwrap_or_default()
    }
}
