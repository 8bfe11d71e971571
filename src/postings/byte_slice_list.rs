use std::{
    io::{self, Write},
    sync::{Arc, OnceLock},
};

use tantivy_common::OwnedBytes;

use crate::{
    util::{CapacityPolicy, FractionalChunkCapacityPolicy},
    PostingError, Result,
};

/// One block of a [`ByteSliceList`]. The bytes are either resident from the
/// start or materialized on first access through a [`SliceLoader`].
pub struct ByteSlice {
    offset: usize,
    len: usize,
    data: OnceLock<OwnedBytes>,
}

/// Fetches the bytes of an on-demand slice from the storage layer.
pub trait SliceLoader: Send + Sync {
    fn load(&self, offset: usize, len: usize) -> io::Result<OwnedBytes>;
}

/// How a reader gets at the bytes of a slice. Picked once per list, so readers
/// never branch on the residency of the chain in their hot paths.
pub(crate) trait SliceAccess: Send + Sync {
    fn slice_data<'s>(&self, slice: &'s ByteSlice) -> Result<&'s [u8]>;
}

struct ResidentAccess;

struct OnDemandAccess {
    loader: Arc<dyn SliceLoader>,
}

/// A chain of discontiguous blocks forming one logical byte stream.
pub struct ByteSliceList {
    total_size: usize,
    slices: Vec<ByteSlice>,
    access: Box<dyn SliceAccess>,
}

pub struct ByteSliceWriter<C: CapacityPolicy = FractionalChunkCapacityPolicy> {
    total_size: usize,
    current_slice: Vec<u8>,
    current_slice_capacity: usize,
    slices: Vec<OwnedBytes>,
    capacity_policy: C,
}

impl ByteSlice {
    fn resident(offset: usize, data: OwnedBytes) -> Self {
        let len = data.len();
        let cell = OnceLock::new();
        let _ = cell.set(data);
        Self {
            offset,
            len,
            data: cell,
        }
    }

    fn on_demand(offset: usize, len: usize) -> Self {
        Self {
            offset,
            len,
            data: OnceLock::new(),
        }
    }

    /// Logical offset of the first byte of this slice.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_materialized(&self) -> bool {
        self.data.get().is_some()
    }
}

impl SliceAccess for ResidentAccess {
    fn slice_data<'s>(&self, slice: &'s ByteSlice) -> Result<&'s [u8]> {
        slice.data.get().map(|bytes| bytes.as_slice()).ok_or_else(|| {
            PostingError::Corruption(format!("slice at {} is not resident", slice.offset))
        })
    }
}

impl SliceAccess for OnDemandAccess {
    fn slice_data<'s>(&self, slice: &'s ByteSlice) -> Result<&'s [u8]> {
        if let Some(bytes) = slice.data.get() {
            return Ok(bytes.as_slice());
        }
        let bytes = self.loader.load(slice.offset, slice.len)?;
        if bytes.len() != slice.len {
            log::warn!(
                "slice loader returned {} bytes for slice of {} bytes at {}",
                bytes.len(),
                slice.len,
                slice.offset
            );
            return Err(PostingError::Corruption(format!(
                "slice at {} materialized with wrong length",
                slice.offset
            )));
        }
        // Losing the race to another reader is fine, both loaded the same bytes.
        let _ = slice.data.set(bytes);
        slice.data.get().map(|bytes| bytes.as_slice()).ok_or_else(|| {
            PostingError::Corruption(format!("slice at {} failed to materialize", slice.offset))
        })
    }
}

impl ByteSliceList {
    pub fn empty() -> Self {
        Self::from_slices(Vec::new())
    }

    /// A fully resident chain.
    pub fn from_slices(slices: Vec<OwnedBytes>) -> Self {
        let mut offset = 0;
        let slices: Vec<_> = slices
            .into_iter()
            .map(|data| {
                let slice = ByteSlice::resident(offset, data);
                offset += slice.len;
                slice
            })
            .collect();

        Self {
            total_size: offset,
            slices,
            access: Box::new(ResidentAccess),
        }
    }

    /// Copies `bytes` into a resident chain of `slice_len` sized slices.
    ///
    /// # Panics
    ///
    /// This function panics if `slice_len` is zero.
    pub fn from_bytes(bytes: &[u8], slice_len: usize) -> Self {
        assert!(slice_len > 0, "slice length must be positive");
        let slices = bytes
            .chunks(slice_len)
            .map(|chunk| OwnedBytes::new(chunk.to_vec()))
            .collect();
        Self::from_slices(slices)
    }

    /// A chain whose slices are materialized through `loader` on first touch.
    pub fn on_demand(slice_lens: &[usize], loader: Arc<dyn SliceLoader>) -> Self {
        let mut offset = 0;
        let slices: Vec<_> = slice_lens
            .iter()
            .map(|&len| {
                let slice = ByteSlice::on_demand(offset, len);
                offset += len;
                slice
            })
            .collect();

        Self {
            total_size: offset,
            slices,
            access: Box::new(OnDemandAccess { loader }),
        }
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn slices(&self) -> &[ByteSlice] {
        &self.slices
    }

    pub(crate) fn access(&self) -> &dyn SliceAccess {
        self.access.as_ref()
    }
}

impl<C: CapacityPolicy + Default> ByteSliceWriter<C> {
    pub fn new() -> Self {
        Self::with_policy(C::default())
    }
}

impl<C: CapacityPolicy + Default> Default for ByteSliceWriter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CapacityPolicy> ByteSliceWriter<C> {
    pub fn with_policy(capacity_policy: C) -> Self {
        Self {
            total_size: 0,
            current_slice: Vec::new(),
            current_slice_capacity: 0,
            slices: Vec::new(),
            capacity_policy,
        }
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    fn current_slice_is_full(&self) -> bool {
        self.current_slice.len() == self.current_slice_capacity
    }

    fn add_slice(&mut self) {
        let next_slice_capacity = self
            .capacity_policy
            .next_capacity(self.current_slice_capacity);
        assert!(next_slice_capacity > 0);
        if !self.current_slice.is_empty() {
            let full_slice = std::mem::take(&mut self.current_slice);
            self.slices.push(OwnedBytes::new(full_slice));
        }
        self.current_slice = Vec::with_capacity(next_slice_capacity);
        self.current_slice_capacity = next_slice_capacity;
    }

    pub fn finish(mut self) -> ByteSliceList {
        if !self.current_slice.is_empty() {
            let last_slice = std::mem::take(&mut self.current_slice);
            self.slices.push(OwnedBytes::new(last_slice));
        }
        ByteSliceList::from_slices(self.slices)
    }
}

impl<C: CapacityPolicy> Write for ByteSliceWriter<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.current_slice_is_full() {
            self.add_slice();
        }
        let remain_space = self.current_slice_capacity - self.current_slice.len();
        let size_to_write = std::cmp::min(remain_space, buf.len());
        self.current_slice
            .extend_from_slice(&buf[..size_to_write]);
        self.total_size += size_to_write;

        Ok(size_to_write)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
