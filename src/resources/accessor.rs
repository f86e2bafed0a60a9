//! Accessor decoding
//!
//! Turns a `(buffer view, byte offset, component type, element type, count)`
//! descriptor into typed scalar sequences, following the glTF 2.0 accessor rules
//! bit for bit:
//!
//! - **Raw view**: `count × effective_arity` scalars read in place, where the
//!   effective arity includes the padding implied by the view's byte stride.
//! - **Deinterlaced view**: `count × arity` scalars, tightly packed, regardless
//!   of the source stride. Used for animation sampling and GPU upload.
//!
//! Sparse overrides are applied after the base view is materialized, so
//! overrides always win. Views are cached per accessor by [`AccessorViews`]
//! until the owning asset is torn down.

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::resources::buffer::{Buffer, BufferView};

/// Scalar component encoding (glTF `componentType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// Maps a GL enum code (5120..=5126) to a component type.
    #[must_use]
    pub const fn from_gl(code: u32) -> Option<Self> {
        match code {
            5120 => Some(Self::I8),
            5121 => Some(Self::U8),
            5122 => Some(Self::I16),
            5123 => Some(Self::U16),
            5125 => Some(Self::U32),
            5126 => Some(Self::F32),
            _ => None,
        }
    }

    #[must_use]
    pub const fn gl_code(self) -> u32 {
        match self {
            Self::I8 => 5120,
            Self::U8 => 5121,
            Self::I16 => 5122,
            Self::U16 => 5123,
            Self::U32 => 5125,
            Self::F32 => 5126,
        }
    }

    /// Size of one component in bytes.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }
}

/// Element shape (glTF accessor `type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(Self::Scalar),
            "VEC2" => Some(Self::Vec2),
            "VEC3" => Some(Self::Vec3),
            "VEC4" => Some(Self::Vec4),
            "MAT2" => Some(Self::Mat2),
            "MAT3" => Some(Self::Mat3),
            "MAT4" => Some(Self::Mat4),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }

    /// Number of scalar components per element.
    #[inline]
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

// ============================================================================
// Typed data
// ============================================================================

/// A materialized accessor view, stored in its native component type.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessorData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

macro_rules! read_scalars {
    ($variant:ident, $ty:ty, $bytes:expr, $len:expr, $offset_of:expr) => {{
        let mut out: Vec<$ty> = Vec::with_capacity($len);
        for i in 0..$len {
            let at = $offset_of(i);
            let value = $bytes
                .get(at..at + std::mem::size_of::<$ty>())
                .and_then(|b| <[u8; std::mem::size_of::<$ty>()]>::try_from(b).ok())
                .map_or(<$ty>::default(), <$ty>::from_le_bytes);
            out.push(value);
        }
        AccessorData::$variant(out)
    }};
}

impl AccessorData {
    /// A zero-filled sequence, the base of a sparse accessor without a view.
    #[must_use]
    pub fn zeroed(component_type: ComponentType, len: usize) -> Self {
        match component_type {
            ComponentType::I8 => Self::I8(vec![0; len]),
            ComponentType::U8 => Self::U8(vec![0; len]),
            ComponentType::I16 => Self::I16(vec![0; len]),
            ComponentType::U16 => Self::U16(vec![0; len]),
            ComponentType::U32 => Self::U32(vec![0; len]),
            ComponentType::F32 => Self::F32(vec![0.0; len]),
        }
    }

    /// Reads `len` little-endian scalars; scalar `i` lives at `offset_of(i)`.
    /// Reads past the end of `bytes` yield zero.
    fn read(
        component_type: ComponentType,
        bytes: &[u8],
        len: usize,
        offset_of: impl Fn(usize) -> usize,
    ) -> Self {
        match component_type {
            ComponentType::I8 => read_scalars!(I8, i8, bytes, len, offset_of),
            ComponentType::U8 => read_scalars!(U8, u8, bytes, len, offset_of),
            ComponentType::I16 => read_scalars!(I16, i16, bytes, len, offset_of),
            ComponentType::U16 => read_scalars!(U16, u16, bytes, len, offset_of),
            ComponentType::U32 => read_scalars!(U32, u32, bytes, len, offset_of),
            ComponentType::F32 => read_scalars!(F32, f32, bytes, len, offset_of),
        }
    }

    #[must_use]
    pub fn component_type(&self) -> ComponentType {
        match self {
            Self::I8(_) => ComponentType::I8,
            Self::U8(_) => ComponentType::U8,
            Self::I16(_) => ComponentType::I16,
            Self::U16(_) => ComponentType::U16,
            Self::U32(_) => ComponentType::U32,
            Self::F32(_) => ComponentType::F32,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scalar `i` cast to `f32` without normalization.
    #[must_use]
    pub fn get_f32(&self, i: usize) -> Option<f32> {
        match self {
            Self::I8(v) => v.get(i).map(|&c| f32::from(c)),
            Self::U8(v) => v.get(i).map(|&c| f32::from(c)),
            Self::I16(v) => v.get(i).map(|&c| f32::from(c)),
            Self::U16(v) => v.get(i).map(|&c| f32::from(c)),
            Self::U32(v) => v.get(i).map(|&c| c as f32),
            Self::F32(v) => v.get(i).copied(),
        }
    }

    /// Scalar `i` as an unsigned integer, for index data.
    #[must_use]
    pub fn get_u32(&self, i: usize) -> Option<u32> {
        match self {
            Self::U8(v) => v.get(i).map(|&c| u32::from(c)),
            Self::U16(v) => v.get(i).map(|&c| u32::from(c)),
            Self::U32(v) => v.get(i).copied(),
            Self::I8(v) => v.get(i).map(|&c| c.max(0) as u32),
            Self::I16(v) => v.get(i).map(|&c| c.max(0) as u32),
            Self::F32(v) => v.get(i).map(|&c| c.max(0.0) as u32),
        }
    }

    /// Converts every scalar to `f32`, applying glTF normalization when
    /// `normalized` is set.
    #[must_use]
    pub fn to_f32_vec(&self, normalized: bool) -> Vec<f32> {
        if !normalized {
            return (0..self.len()).filter_map(|i| self.get_f32(i)).collect();
        }
        match self {
            Self::I8(v) => v.iter().map(|&c| (f32::from(c) / 127.0).max(-1.0)).collect(),
            Self::U8(v) => v.iter().map(|&c| f32::from(c) / 255.0).collect(),
            Self::I16(v) => v.iter().map(|&c| (f32::from(c) / 32767.0).max(-1.0)).collect(),
            Self::U16(v) => v.iter().map(|&c| f32::from(c) / 65535.0).collect(),
            Self::U32(v) => v.iter().map(|&c| c as f32 / u32::MAX as f32).collect(),
            Self::F32(v) => v.clone(),
        }
    }

    #[must_use]
    pub fn to_u32_vec(&self) -> Vec<u32> {
        (0..self.len()).filter_map(|i| self.get_u32(i)).collect()
    }

    /// Native little-endian bytes of the sequence.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::I8(v) => bytemuck::cast_slice(v),
            Self::U8(v) => v,
            Self::I16(v) => bytemuck::cast_slice(v),
            Self::U16(v) => bytemuck::cast_slice(v),
            Self::U32(v) => bytemuck::cast_slice(v),
            Self::F32(v) => bytemuck::cast_slice(v),
        }
    }

    /// Copies scalar `src_index` of `src` into slot `dst_index`.
    /// Returns `false` when the types differ or an index is out of range.
    fn copy_scalar(&mut self, dst_index: usize, src: &AccessorData, src_index: usize) -> bool {
        fn copy<T: Copy>(dst: &mut [T], d: usize, src: &[T], s: usize) -> bool {
            match (dst.get_mut(d), src.get(s)) {
                (Some(slot), Some(&value)) => {
                    *slot = value;
                    true
                }
                _ => false,
            }
        }

        match (self, src) {
            (Self::I8(d), Self::I8(s)) => copy(d, dst_index, s, src_index),
            (Self::U8(d), Self::U8(s)) => copy(d, dst_index, s, src_index),
            (Self::I16(d), Self::I16(s)) => copy(d, dst_index, s, src_index),
            (Self::U16(d), Self::U16(s)) => copy(d, dst_index, s, src_index),
            (Self::U32(d), Self::U32(s)) => copy(d, dst_index, s, src_index),
            (Self::F32(d), Self::F32(s)) => copy(d, dst_index, s, src_index),
            _ => false,
        }
    }
}

// ============================================================================
// Accessor descriptor
// ============================================================================

#[derive(Debug, Clone)]
pub struct SparseIndices {
    pub buffer_view: usize,
    pub byte_offset: usize,
    pub component_type: ComponentType,
}

#[derive(Debug, Clone)]
pub struct SparseValues {
    pub buffer_view: usize,
    pub byte_offset: usize,
}

/// Sparse override block: `count` element slots replaced after the base view
/// is materialized.
#[derive(Debug, Clone)]
pub struct Sparse {
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
}

#[derive(Debug, Clone)]
pub struct Accessor {
    pub name: Option<String>,
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub element_type: ElementType,
    pub normalized: bool,
    pub count: usize,
    pub min: Option<Vec<f32>>,
    pub max: Option<Vec<f32>>,
    pub sparse: Option<Sparse>,
}

impl Accessor {
    #[must_use]
    pub fn new(
        buffer_view: Option<usize>,
        byte_offset: usize,
        component_type: ComponentType,
        element_type: ElementType,
        count: usize,
    ) -> Self {
        Self {
            name: None,
            buffer_view,
            byte_offset,
            component_type,
            element_type,
            normalized: false,
            count,
            min: None,
            max: None,
            sparse: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.element_type.arity()
    }

    /// Row length of the raw view: the declared arity, or the stride measured
    /// in components when the backing view is interleaved/padded.
    #[must_use]
    pub fn effective_arity(&self, views: &[BufferView]) -> usize {
        let component_size = self.component_type.size();
        match self.buffer_view.and_then(|i| views.get(i)) {
            Some(view) if view.byte_stride != 0 => (view.byte_stride / component_size).max(1),
            _ => self.arity(),
        }
    }

    /// Byte distance between consecutive elements.
    fn element_stride(&self, views: &[BufferView]) -> usize {
        match self.buffer_view.and_then(|i| views.get(i)) {
            Some(view) if view.byte_stride != 0 => view.byte_stride,
            _ => self.arity() * self.component_type.size(),
        }
    }

    /// Bytes of the backing view after validating that every element fits.
    fn backing_bytes<'a>(&self, view_index: usize, views: &[BufferView], buffers: &'a [Buffer]) -> Option<&'a [u8]> {
        let Some(view) = views.get(view_index) else {
            log::warn!("Accessor {:?} references missing buffer view {view_index}", self.name);
            return None;
        };
        let Some(bytes) = view.slice(buffers) else {
            log::warn!(
                "Buffer view {view_index} exceeds buffer {} (offset {}, length {})",
                view.buffer,
                view.byte_offset,
                view.byte_length
            );
            return None;
        };

        if self.count > 0 {
            let last = self.byte_offset
                + (self.count - 1) * self.element_stride(views)
                + self.arity() * self.component_type.size();
            if last > bytes.len() {
                log::warn!(
                    "Accessor {:?} reads {last} bytes but buffer view {view_index} holds {}",
                    self.name,
                    bytes.len()
                );
                return None;
            }
        }

        Some(bytes)
    }

    /// Typed in-place view: `count × effective_arity` scalars, sparse applied.
    ///
    /// Returns `None` (after logging) when the accessor has no realizable
    /// data; callers treat that as "not renderable".
    #[must_use]
    pub fn raw_view(&self, views: &[BufferView], buffers: &[Buffer]) -> Option<AccessorData> {
        let row = self.effective_arity(views);
        let mut data = match self.buffer_view {
            Some(view_index) => {
                let bytes = self.backing_bytes(view_index, views, buffers)?;
                let component_size = self.component_type.size();
                let stride = self.element_stride(views);
                let base = self.byte_offset;
                AccessorData::read(self.component_type, bytes, self.count * row, |i| {
                    base + (i / row) * stride + (i % row) * component_size
                })
            }
            None => self.sparse_only_base(row)?,
        };

        self.apply_sparse(&mut data, row, views, buffers)?;
        Some(data)
    }

    /// Tightly packed copy: `count × arity` scalars, sparse applied.
    #[must_use]
    pub fn deinterlaced_view(&self, views: &[BufferView], buffers: &[Buffer]) -> Option<AccessorData> {
        let arity = self.arity();
        let mut data = match self.buffer_view {
            Some(view_index) => {
                let bytes = self.backing_bytes(view_index, views, buffers)?;
                let component_size = self.component_type.size();
                let stride = self.element_stride(views);
                let base = self.byte_offset;
                AccessorData::read(self.component_type, bytes, self.count * arity, |i| {
                    base + (i / arity) * stride + (i % arity) * component_size
                })
            }
            None => self.sparse_only_base(arity)?,
        };

        self.apply_sparse(&mut data, arity, views, buffers)?;
        Some(data)
    }

    fn sparse_only_base(&self, row: usize) -> Option<AccessorData> {
        if self.sparse.is_some() {
            Some(AccessorData::zeroed(self.component_type, self.count * row))
        } else {
            log::warn!("Accessor {:?} has no buffer view; no view can be realized", self.name);
            None
        }
    }

    /// Overwrites `arity` scalars per sparse entry into rows of length `row`.
    fn apply_sparse(&self, data: &mut AccessorData, row: usize, views: &[BufferView], buffers: &[Buffer]) -> Option<()> {
        let Some(sparse) = &self.sparse else {
            return Some(());
        };

        let index_size = sparse.indices.component_type.size();
        let index_bytes = views
            .get(sparse.indices.buffer_view)
            .and_then(|v| v.slice(buffers))
            .filter(|b| sparse.indices.byte_offset + sparse.count * index_size <= b.len());
        let Some(index_bytes) = index_bytes else {
            log::warn!("Accessor {:?}: sparse indices do not fit their buffer view", self.name);
            return None;
        };

        let arity = self.arity();
        let component_size = self.component_type.size();
        let value_bytes = views
            .get(sparse.values.buffer_view)
            .and_then(|v| v.slice(buffers))
            .filter(|b| sparse.values.byte_offset + sparse.count * arity * component_size <= b.len());
        let Some(value_bytes) = value_bytes else {
            log::warn!("Accessor {:?}: sparse values do not fit their buffer view", self.name);
            return None;
        };

        let indices = AccessorData::read(sparse.indices.component_type, index_bytes, sparse.count, |i| {
            sparse.indices.byte_offset + i * index_size
        });
        let values = AccessorData::read(self.component_type, value_bytes, sparse.count * arity, |i| {
            sparse.values.byte_offset + i * component_size
        });

        // Validate everything first so a bad block never half-applies.
        let targets: Option<Vec<usize>> = (0..sparse.count)
            .map(|i| indices.get_u32(i).map(|idx| idx as usize).filter(|&idx| idx < self.count))
            .collect();
        let Some(targets) = targets else {
            log::warn!("Accessor {:?}: sparse index out of range", self.name);
            return None;
        };

        for (i, target) in targets.into_iter().enumerate() {
            for k in 0..arity {
                if !data.copy_scalar(target * row + k, &values, i * arity + k) {
                    return None;
                }
            }
        }

        Some(())
    }
}

// ============================================================================
// View cache
// ============================================================================

/// Which materialization of an accessor is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Raw,
    Deinterlaced,
}

/// Cache of materialized accessor views keyed by `(accessor index, kind)`.
///
/// Failed materializations are cached too, so a broken accessor is reported
/// once rather than every frame. Access is single-threaded (the renderer and
/// animation step run on one thread), hence the `RefCell`.
#[derive(Debug, Default)]
pub struct AccessorViews {
    cache: RefCell<FxHashMap<(usize, ViewKind), Option<Arc<AccessorData>>>>,
}

impl AccessorViews {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached view, materializing it on first access.
    pub fn get(
        &self,
        index: usize,
        kind: ViewKind,
        accessors: &[Accessor],
        views: &[BufferView],
        buffers: &[Buffer],
    ) -> Option<Arc<AccessorData>> {
        if let Some(cached) = self.cache.borrow().get(&(index, kind)) {
            return cached.clone();
        }

        let computed = accessors.get(index).and_then(|accessor| match kind {
            ViewKind::Raw => accessor.raw_view(views, buffers),
            ViewKind::Deinterlaced => accessor.deinterlaced_view(views, buffers),
        });
        let computed = computed.map(Arc::new);
        self.cache.borrow_mut().insert((index, kind), computed.clone());
        computed
    }

    /// Number of cached entries (including cached failures).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Drops every cached view. Called when the owning asset is unloaded.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn stride_zero_raw_equals_deinterlaced() {
        let buffers = vec![Buffer::new(f32_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))];
        let views = vec![BufferView::new(0, 0, 24, 0)];
        let accessor = Accessor::new(Some(0), 0, ComponentType::F32, ElementType::Vec3, 2);

        let raw = accessor.raw_view(&views, &buffers).unwrap();
        let packed = accessor.deinterlaced_view(&views, &buffers).unwrap();
        assert_eq!(raw, packed);
        assert_eq!(raw, AccessorData::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
    }

    #[test]
    fn padded_stride_widens_raw_view_only() {
        // VEC2 of u16 with a 6-byte stride: one padding component per element.
        let bytes: Vec<u8> = [1u16, 2, 0xFFFF, 3, 4, 0xFFFF]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let buffers = vec![Buffer::new(bytes)];
        let views = vec![BufferView::new(0, 0, 12, 6)];
        let accessor = Accessor::new(Some(0), 0, ComponentType::U16, ElementType::Vec2, 2);

        assert_eq!(accessor.effective_arity(&views), 3);
        let raw = accessor.raw_view(&views, &buffers).unwrap();
        assert_eq!(raw, AccessorData::U16(vec![1, 2, 0xFFFF, 3, 4, 0xFFFF]));

        let packed = accessor.deinterlaced_view(&views, &buffers).unwrap();
        assert_eq!(packed, AccessorData::U16(vec![1, 2, 3, 4]));
    }

    #[test]
    fn missing_view_is_not_realizable() {
        let accessor = Accessor::new(None, 0, ComponentType::F32, ElementType::Scalar, 3);
        assert!(accessor.raw_view(&[], &[]).is_none());
        assert!(accessor.deinterlaced_view(&[], &[]).is_none());
    }

    #[test]
    fn out_of_range_view_is_rejected() {
        let buffers = vec![Buffer::new(f32_bytes(&[1.0, 2.0]))];
        let views = vec![BufferView::new(0, 0, 8, 0)];
        let accessor = Accessor::new(Some(0), 0, ComponentType::F32, ElementType::Vec3, 1);
        assert!(accessor.deinterlaced_view(&views, &buffers).is_none());
    }

    #[test]
    fn normalized_conversion_follows_gltf_rules() {
        let data = AccessorData::I8(vec![-128, 127, 0]);
        assert_eq!(data.to_f32_vec(true), vec![-1.0, 1.0, 0.0]);

        let data = AccessorData::U8(vec![255, 0]);
        assert_eq!(data.to_f32_vec(true), vec![1.0, 0.0]);
        assert_eq!(data.to_f32_vec(false), vec![255.0, 0.0]);
    }

    #[test]
    fn cache_materializes_once_and_clears() {
        let buffers = vec![Buffer::new(f32_bytes(&[7.0]))];
        let views = vec![BufferView::new(0, 0, 4, 0)];
        let accessors = vec![Accessor::new(Some(0), 0, ComponentType::F32, ElementType::Scalar, 1)];

        let cache = AccessorViews::new();
        let a = cache.get(0, ViewKind::Deinterlaced, &accessors, &views, &buffers).unwrap();
        let b = cache.get(0, ViewKind::Deinterlaced, &accessors, &views, &buffers).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
