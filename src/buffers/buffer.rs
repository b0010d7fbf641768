//! Reference-counted, immutable chunk of input bytes

use std::{ops::Deref, rc::Rc};

/// One read's worth of input, shared by every sink that queued it.
///
/// Cloning adds a holder; the bytes themselves are never copied or mutated
/// once the buffer has been published.
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    data: Rc<Vec<u8>>,
}

impl SharedBuffer {
    /// Publish a filled vector as a shared buffer
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data: Rc::new(data),
        }
    }

    /// The published bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of published bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the read returned no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes currently reserved by the backing storage
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Number of live handles to these bytes
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.data)
    }

    /// Shrink the backing storage to the logical length.
    ///
    /// Only possible while this handle is the sole holder; the contents are
    /// untouched either way. Returns whether any memory was given back.
    pub fn compact(&mut self) -> bool {
        match Rc::get_mut(&mut self.data) {
            Some(data) if data.capacity() > data.len() => {
                data.shrink_to_fit();
                true
            }
            _ => false,
        }
    }

    /// Recover the backing vector if no other holder remains
    pub(crate) fn try_into_vec(self) -> std::result::Result<Vec<u8>, Self> {
        Rc::try_unwrap(self.data).map_err(|data| Self { data })
    }
}

impl Deref for SharedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for SharedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
