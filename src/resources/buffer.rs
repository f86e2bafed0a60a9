//! Raw binary buffers and the views slicing them.

use std::sync::Arc;

/// Raw byte blob supplied by the loader. Read-only to the core.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    pub name: Option<String>,
    pub data: Arc<[u8]>,
}

impl Buffer {
    #[must_use]
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: None,
            data: data.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Bind target hint carried by a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    ArrayBuffer,
    ElementArrayBuffer,
}

/// A window into a [`Buffer`].
///
/// `byte_stride == 0` means the elements are tightly packed.
#[derive(Debug, Clone, Default)]
pub struct BufferView {
    pub name: Option<String>,
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: usize,
    pub target: Option<BufferTarget>,
}

impl BufferView {
    #[must_use]
    pub fn new(buffer: usize, byte_offset: usize, byte_length: usize, byte_stride: usize) -> Self {
        Self {
            name: None,
            buffer,
            byte_offset,
            byte_length,
            byte_stride,
            target: None,
        }
    }

    /// Returns the bytes covered by this view, or `None` when the view points
    /// past the end of its buffer (or at a buffer that does not exist).
    #[must_use]
    pub fn slice<'a>(&self, buffers: &'a [Buffer]) -> Option<&'a [u8]> {
        let buffer = buffers.get(self.buffer)?;
        let end = self.byte_offset.checked_add(self.byte_length)?;
        buffer.data.get(self.byte_offset..end)
    }
}
