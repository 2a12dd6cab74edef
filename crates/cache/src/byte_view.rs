//! Immutable view over cached bytes

use crate::eviction::ByteSize;
use bytes::Bytes;
use std::fmt;

/// A read-only cached value.
///
/// The underlying buffer is never mutated once the view exists. Clones share
/// the buffer; [`ByteView::byte_slice`] hands out an owned copy.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    /// Copy `data` into a new view
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            b: Bytes::copy_from_slice(data),
        }
    }

    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Owned copy of the bytes
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    /// The shared immutable buffer
    pub fn into_bytes(self) -> Bytes {
        self.b
    }
}

impl ByteSize for ByteView {
    fn byte_len(&self) -> usize {
        self.b.len()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self { b: Bytes::from(data) }
    }
}

impl From<&[u8]> for ByteView {
    fn from(data: &[u8]) -> Self {
        Self::copy_from_slice(data)
    }
}

impl From<String> for ByteView {
    fn from(data: String) -> Self {
        Self { b: Bytes::from(data) }
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self::copy_from_slice(data.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteView").field(&self.b).finish()
    }
}
