use std::io::{self, Read};

use crate::{PostingError, Result};

use super::byte_slice_list::{ByteSlice, ByteSliceList, SliceAccess};

/// Forward-only cursor over a [`ByteSliceList`], presenting the chain as one
/// logical byte stream.
///
/// Slices are materialized lazily: seeking walks slice lengths only, the bytes
/// of a slice are fetched the first time a read touches it.
#[derive(Clone)]
pub struct ByteSliceReader<'a> {
    slices: &'a [ByteSlice],
    access: &'a dyn SliceAccess,
    total_size: usize,
    global_offset: usize,
    slice_index: usize,
    slice_offset: usize,
    current: Option<&'a [u8]>,
}

macro_rules! read_fixed {
    ($name:ident, $peek:ident, $ty:ty) => {
        pub fn $name(&mut self) -> Result<$ty> {
            const N: usize = std::mem::size_of::<$ty>();
            let mut bytes = [0u8; N];
            let remaining = self.current_remaining()?;
            if remaining.len() >= N {
                bytes.copy_from_slice(&remaining[..N]);
                self.advance(N);
            } else {
                self.read_exact_bytes(&mut bytes)?;
            }
            Ok(<$ty>::from_le_bytes(bytes))
        }

        /// Reads without moving the cursor.
        pub fn $peek(&mut self) -> Result<$ty> {
            let saved = self.clone();
            let result = self.$name();
            *self = saved;
            result
        }
    };
}

impl<'a> ByteSliceReader<'a> {
    pub fn open(byte_slice_list: &'a ByteSliceList) -> Self {
        Self {
            slices: byte_slice_list.slices(),
            access: byte_slice_list.access(),
            total_size: byte_slice_list.total_size(),
            global_offset: 0,
            slice_index: 0,
            slice_offset: 0,
            current: None,
        }
    }

    pub fn open_at(byte_slice_list: &'a ByteSliceList, offset: usize) -> Result<Self> {
        let mut reader = Self::open(byte_slice_list);
        reader.seek(offset)?;
        Ok(reader)
    }

    pub fn eof(&self) -> bool {
        self.global_offset == self.total_size
    }

    pub fn tell(&self) -> usize {
        self.global_offset
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn remain_size(&self) -> usize {
        self.total_size - self.global_offset
    }

    fn range_error(&self) -> PostingError {
        PostingError::Range {
            offset: self.global_offset,
            total_size: self.total_size,
        }
    }

    fn move_to_next_slice(&mut self) {
        self.slice_index += 1;
        self.slice_offset = 0;
        self.current = None;
    }

    /// Unread bytes of the slice under the cursor, empty at end of stream.
    fn current_remaining(&mut self) -> Result<&'a [u8]> {
        let slices = self.slices;
        while self.slice_index < slices.len()
            && self.slice_offset == slices[self.slice_index].len()
        {
            self.move_to_next_slice();
        }
        let Some(slice) = slices.get(self.slice_index) else {
            return Ok(&[]);
        };
        let data = match self.current {
            Some(data) => data,
            None => {
                let data = self.access.slice_data(slice)?;
                self.current = Some(data);
                data
            }
        };
        Ok(&data[self.slice_offset..])
    }

    fn advance(&mut self, len: usize) {
        self.slice_offset += len;
        self.global_offset += len;
    }

    /// Copies up to `dest.len()` bytes; fewer only at end of stream.
    pub fn read_bytes(&mut self, dest: &mut [u8]) -> Result<usize> {
        let mut copied = 0;
        while copied < dest.len() {
            let remaining = self.current_remaining()?;
            if remaining.is_empty() {
                break;
            }
            let len = std::cmp::min(remaining.len(), dest.len() - copied);
            dest[copied..copied + len].copy_from_slice(&remaining[..len]);
            self.advance(len);
            copied += len;
        }
        Ok(copied)
    }

    pub fn read_exact_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        if dest.len() > self.remain_size() {
            return Err(self.range_error());
        }
        self.read_bytes(dest)?;
        Ok(())
    }

    /// Returns `len` bytes straight from the current slice when it holds them.
    pub fn try_read_direct(&mut self, len: usize) -> Result<Option<&'a [u8]>> {
        let remaining = self.current_remaining()?;
        if remaining.len() < len {
            return Ok(None);
        }
        self.advance(len);
        Ok(Some(&remaining[..len]))
    }

    /// Like [`Self::try_read_direct`], falling back to a copy into `scratch`
    /// when the bytes span a slice boundary.
    pub fn read_may_copy<'s>(&mut self, len: usize, scratch: &'s mut Vec<u8>) -> Result<&'s [u8]>
    where
        'a: 's,
    {
        if let Some(direct) = self.try_read_direct(len)? {
            return Ok(direct);
        }
        scratch.clear();
        scratch.resize(len, 0);
        self.read_exact_bytes(scratch)?;
        Ok(&scratch[..])
    }

    read_fixed!(read_u8, peek_u8, u8);
    read_fixed!(read_i8, peek_i8, i8);
    read_fixed!(read_u16, peek_u16, u16);
    read_fixed!(read_i16, peek_i16, i16);
    read_fixed!(read_u32, peek_u32, u32);
    read_fixed!(read_i32, peek_i32, i32);
    read_fixed!(read_u64, peek_u64, u64);
    read_fixed!(read_i64, peek_i64, i64);

    pub fn read_vu32(&mut self) -> Result<u32> {
        let mut result = 0u32;
        let mut shift = 0u32;
        loop {
            let cur_byte = self.read_u8()?;
            if shift > 28 {
                log::warn!("varint32 overflow at offset {}", self.global_offset);
                return Err(PostingError::Corruption(format!(
                    "varint longer than 5 bytes ending at {}",
                    self.global_offset
                )));
            }
            result |= ((cur_byte & 0x7f) as u32) << shift;
            if cur_byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    pub fn read_vu64(&mut self) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let cur_byte = self.read_u8()?;
            if shift > 63 {
                log::warn!("varint64 overflow at offset {}", self.global_offset);
                return Err(PostingError::Corruption(format!(
                    "varint longer than 10 bytes ending at {}",
                    self.global_offset
                )));
            }
            result |= ((cur_byte & 0x7f) as u64) << shift;
            if cur_byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    /// Moves forward to `offset` without materializing the slices passed over.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset < self.global_offset {
            return Err(PostingError::BackwardSeek {
                current: self.global_offset,
                target: offset,
            });
        }
        if offset > self.total_size {
            return Err(PostingError::Range {
                offset,
                total_size: self.total_size,
            });
        }

        let mut len = offset - self.global_offset;
        while len > 0 {
            let Some(slice) = self.slices.get(self.slice_index) else {
                return Err(self.range_error());
            };
            let avail = slice.len() - self.slice_offset;
            if avail == 0 {
                self.move_to_next_slice();
                continue;
            }
            let step = std::cmp::min(avail, len);
            self.advance(step);
            len -= step;
        }

        if self.eof() {
            self.slice_index = self.slices.len();
            self.slice_offset = 0;
            self.current = None;
        }

        Ok(())
    }
}

impl<'a> Read for ByteSliceReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_bytes(buf).map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, Write},
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use proptest::prelude::*;
    use tantivy_common::OwnedBytes;

    use crate::{
        postings::{
            byte_slice_list::SliceLoader, compression::BlockEncoder, ByteSliceList,
            ByteSliceWriter,
        },
        util::FixedCapacityPolicy,
        PostingError, Result,
    };

    use super::ByteSliceReader;

    struct CountingLoader {
        data: Vec<u8>,
        loads: AtomicUsize,
    }

    impl SliceLoader for CountingLoader {
        fn load(&self, offset: usize, len: usize) -> io::Result<OwnedBytes> {
            self.loads.fetch_add(1, Ordering::Relaxed);
            Ok(OwnedBytes::new(self.data[offset..offset + len].to_vec()))
        }
    }

    struct ShortLoader;

    impl SliceLoader for ShortLoader {
        fn load(&self, _offset: usize, len: usize) -> io::Result<OwnedBytes> {
            Ok(OwnedBytes::new(vec![0; len.saturating_sub(1)]))
        }
    }

    struct FailingLoader;

    impl SliceLoader for FailingLoader {
        fn load(&self, _offset: usize, _len: usize) -> io::Result<OwnedBytes> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "device gone"))
        }
    }

    #[test]
    fn test_fixed_width_across_slices() -> Result<()> {
        let mut writer = ByteSliceWriter::with_policy(FixedCapacityPolicy::new(3));
        writer.write_all(&0x0102_0304u32.to_le_bytes())?;
        writer.write_all(&(-2i16).to_le_bytes())?;
        writer.write_all(&u64::MAX.to_le_bytes())?;
        writer.write_all(&[7])?;
        let list = writer.finish();

        let mut reader = ByteSliceReader::open(&list);
        assert_eq!(reader.peek_u32()?, 0x0102_0304);
        assert_eq!(reader.tell(), 0);
        assert_eq!(reader.read_u32()?, 0x0102_0304);
        assert_eq!(reader.read_i16()?, -2);
        assert_eq!(reader.read_u64()?, u64::MAX);
        assert_eq!(reader.read_u8()?, 7);
        assert!(reader.eof());
        assert!(matches!(
            reader.read_u8(),
            Err(PostingError::Range {
                offset: 15,
                total_size: 15
            })
        ));

        Ok(())
    }

    #[test]
    fn test_read_may_copy() -> Result<()> {
        let data: Vec<u8> = (0..10).collect();
        let list = ByteSliceList::from_bytes(&data, 4);
        let mut reader = ByteSliceReader::open(&list);
        let mut scratch = Vec::new();

        assert_eq!(reader.read_may_copy(3, &mut scratch)?, &[0, 1, 2]);
        assert!(scratch.is_empty());
        assert_eq!(reader.read_may_copy(3, &mut scratch)?, &[3, 4, 5]);
        assert_eq!(scratch, vec![3, 4, 5]);
        assert_eq!(reader.tell(), 6);
        assert!(reader.read_may_copy(5, &mut scratch).is_err());

        Ok(())
    }

    #[test]
    fn test_signed_reads_across_slices() -> Result<()> {
        let mut data = vec![0xab];
        data.extend_from_slice(&(-2i64).to_le_bytes());
        data.extend_from_slice(&i64::MIN.to_le_bytes());
        let list = ByteSliceList::from_bytes(&data, 3);
        let mut reader = ByteSliceReader::open(&list);

        assert_eq!(reader.read_u8()?, 0xab);
        assert_eq!(reader.peek_i64()?, -2);
        assert_eq!(reader.tell(), 1);
        assert_eq!(reader.read_i64()?, -2);
        assert_eq!(reader.read_i64()?, i64::MIN);
        assert!(reader.eof());
        assert!(matches!(reader.read_i64(), Err(PostingError::Range { .. })));

        Ok(())
    }

    #[test]
    fn test_short_read_at_end() -> Result<()> {
        let list = ByteSliceList::from_bytes(&[1, 2, 3, 4, 5], 2);
        let mut reader = ByteSliceReader::open(&list);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read_bytes(&mut buf)?, 5);
        assert_eq!(&buf[..5], &[1, 2, 3, 4, 5]);
        assert_eq!(reader.read_bytes(&mut buf)?, 0);

        Ok(())
    }

    #[test]
    fn test_seek() -> Result<()> {
        let data: Vec<u8> = (0..20).collect();
        let list = ByteSliceList::from_bytes(&data, 6);
        let mut reader = ByteSliceReader::open(&list);

        reader.seek(6)?;
        assert_eq!(reader.read_u8()?, 6);
        reader.seek(13)?;
        assert_eq!(reader.read_u8()?, 13);
        assert!(matches!(
            reader.seek(3),
            Err(PostingError::BackwardSeek {
                current: 14,
                target: 3
            })
        ));
        assert!(matches!(reader.seek(21), Err(PostingError::Range { .. })));
        reader.seek(20)?;
        assert!(reader.eof());
        assert_eq!(reader.remain_size(), 0);

        Ok(())
    }

    #[test]
    fn test_varint_overflow() {
        let list = ByteSliceList::from_bytes(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01], 2);
        let mut reader = ByteSliceReader::open(&list);
        assert!(matches!(reader.read_vu32(), Err(PostingError::Corruption(_))));
    }

    #[test]
    fn test_on_demand_loads_touched_slices_once() -> Result<()> {
        let data: Vec<u8> = (0..32).collect();
        let loader = Arc::new(CountingLoader {
            data: data.clone(),
            loads: AtomicUsize::new(0),
        });
        let list = ByteSliceList::on_demand(&[8, 8, 8, 8], loader.clone());
        assert_eq!(list.total_size(), 32);

        let mut reader = ByteSliceReader::open(&list);
        reader.seek(17)?;
        assert_eq!(loader.loads.load(Ordering::Relaxed), 0);
        assert_eq!(reader.read_u16()?, u16::from_le_bytes([17, 18]));
        assert_eq!(loader.loads.load(Ordering::Relaxed), 1);

        let mut reader = ByteSliceReader::open_at(&list, 20)?;
        let mut buf = [0u8; 6];
        reader.read_exact_bytes(&mut buf)?;
        assert_eq!(buf, [20, 21, 22, 23, 24, 25]);
        assert_eq!(loader.loads.load(Ordering::Relaxed), 2);
        assert!(list.slices()[2].is_materialized());
        assert!(!list.slices()[0].is_materialized());

        Ok(())
    }

    #[test]
    fn test_on_demand_failures() {
        let list = ByteSliceList::on_demand(&[4], Arc::new(ShortLoader));
        let mut reader = ByteSliceReader::open(&list);
        assert!(matches!(reader.read_u8(), Err(PostingError::Corruption(_))));

        let list = ByteSliceList::on_demand(&[4], Arc::new(FailingLoader));
        let mut reader = ByteSliceReader::open(&list);
        assert!(matches!(reader.read_u32(), Err(PostingError::Io(_))));
    }

    proptest! {
        #[test]
        fn test_read_seek_equivalence(
            data in proptest::collection::vec(any::<u8>(), 1..300),
            slice_len in 1usize..17,
            chunks in proptest::collection::vec(0usize..20, 0..20),
            skip in 0usize..300,
        ) {
            let list = ByteSliceList::from_bytes(&data, slice_len);

            let mut reader = ByteSliceReader::open(&list);
            let mut consumed = 0;
            for chunk in chunks {
                let mut buf = vec![0u8; chunk];
                let n = reader.read_bytes(&mut buf).unwrap();
                prop_assert_eq!(&buf[..n], &data[consumed..consumed + n]);
                consumed += n;
                prop_assert_eq!(reader.tell(), consumed);
            }

            let k = skip % (data.len() + 1);
            let mut seeking = ByteSliceReader::open(&list);
            seeking.seek(k).unwrap();
            let mut discarding = ByteSliceReader::open(&list);
            let mut discard = vec![0u8; k];
            discarding.read_exact_bytes(&mut discard).unwrap();

            let mut rest_a = vec![0u8; data.len() - k];
            let mut rest_b = vec![0u8; data.len() - k];
            seeking.read_exact_bytes(&mut rest_a).unwrap();
            discarding.read_exact_bytes(&mut rest_b).unwrap();
            prop_assert_eq!(&rest_a, &rest_b);
            prop_assert_eq!(&rest_a[..], &data[k..]);
        }

        #[test]
        fn test_varints_across_boundaries(values in proptest::collection::vec(any::<u64>(), 1..40), slice_len in 1usize..5) {
            let encoder = BlockEncoder;
            let mut buf = vec![];
            for &v in &values {
                encoder.encode_vu64(v, &mut buf).unwrap();
            }
            let list = ByteSliceList::from_bytes(&buf, slice_len);
            let mut reader = ByteSliceReader::open(&list);
            for &v in &values {
                prop_assert_eq!(reader.read_vu64().unwrap(), v);
            }
            prop_assert!(reader.eof());
        }
    }
}
