use std::borrow::Cow;

use crate::{
    postings::{ByteSliceList, ByteSliceReader},
    PostingError, Result, POSITION_BITMAP_BLOCK_LEN,
};

/// Position counts of one document, derived from the tf bitmap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PosCountInfo {
    /// Positions of all earlier documents, which is also the bit index where
    /// this document's region starts.
    pub prior_count: u32,
    /// Positions of this document, the terminating set bit included.
    pub own_count: u32,
}

/// Rank/select over the tf bitmap: one bit per position, set on the last
/// position of each document, plus the index of the last set bit of every
/// completed block of `POSITION_BITMAP_BLOCK_LEN` documents.
///
/// Offsets and words alias the backing slice when it holds them contiguously,
/// otherwise they are copied out.
pub struct PositionBitmapReader<'a> {
    block_count: usize,
    total_bits: u32,
    offsets: Cow<'a, [u8]>,
    words: Cow<'a, [u8]>,
    end_offset: usize,
}

const fn build_pop_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut byte = 0;
    while byte < 256 {
        table[byte] = (byte as u8).count_ones() as u8;
        byte += 1;
    }
    table
}

/// `SELECT_TABLE[byte][k]` is the index, counted from the most significant
/// bit, of the `k+1`-th set bit of `byte`.
const fn build_select_table() -> [[u8; 8]; 256] {
    let mut table = [[0u8; 8]; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut found = 0;
        let mut bit = 0;
        while bit < 8 {
            if byte & (0x80 >> bit) != 0 {
                table[byte][found] = bit as u8;
                found += 1;
            }
            bit += 1;
        }
        byte += 1;
    }
    table
}

static POP_TABLE: [u8; 256] = build_pop_table();
static SELECT_TABLE: [[u8; 8]; 256] = build_select_table();

fn read_cow<'a>(reader: &mut ByteSliceReader<'a>, len: Option<usize>) -> Result<Cow<'a, [u8]>> {
    let len = match len {
        Some(len) if len <= reader.remain_size() => len,
        _ => {
            log::warn!(
                "tf bitmap section at {} exceeds the {} remaining bytes",
                reader.tell(),
                reader.remain_size()
            );
            return Err(PostingError::Range {
                offset: reader.tell(),
                total_size: reader.total_size(),
            });
        }
    };
    if let Some(direct) = reader.try_read_direct(len)? {
        return Ok(Cow::Borrowed(direct));
    }
    let mut owned = vec![0u8; len];
    reader.read_exact_bytes(&mut owned)?;
    Ok(Cow::Owned(owned))
}

fn corruption(message: String) -> PostingError {
    log::warn!("{}", message);
    PostingError::Corruption(message)
}

impl<'a> PositionBitmapReader<'a> {
    pub fn init(byte_slice_list: &'a ByteSliceList, offset: usize) -> Result<Self> {
        let mut reader = ByteSliceReader::open_at(byte_slice_list, offset)?;
        let block_count = reader.read_vu32()? as usize;
        let total_bits = reader.read_vu32()?;
        let word_count = (total_bits as usize).div_ceil(32);

        let offsets = read_cow(&mut reader, block_count.checked_mul(4))?;
        let words = read_cow(&mut reader, word_count.checked_mul(4))?;

        let bitmap_reader = Self {
            block_count,
            total_bits,
            offsets,
            words,
            end_offset: reader.tell(),
        };
        bitmap_reader.validate()?;

        Ok(bitmap_reader)
    }

    fn validate(&self) -> Result<()> {
        let mut prev: Option<u32> = None;
        for block in 0..self.block_count {
            let offset = self.block_offset(block);
            if offset >= self.total_bits || prev.is_some_and(|prev| offset <= prev) {
                return Err(corruption(format!(
                    "tf bitmap block offset {} out of order at block {}",
                    offset, block
                )));
            }
            prev = Some(offset);
        }
        Ok(())
    }

    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Offset right after the bitmap in the backing list.
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn is_aliased(&self) -> bool {
        matches!(
            (&self.offsets, &self.words),
            (Cow::Borrowed(_), Cow::Borrowed(_))
        )
    }

    fn block_offset(&self, block: usize) -> u32 {
        let bytes = &self.offsets[block * 4..block * 4 + 4];
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn word(&self, index: usize) -> Option<u32> {
        let bytes = self.words.get(index * 4..index * 4 + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn test_bit(&self, bit: u32) -> bool {
        self.word(bit as usize / 32)
            .is_some_and(|word| word & (0x8000_0000 >> (bit % 32)) != 0)
    }

    /// Index of the `k`-th (1-based) set bit at or after `start`.
    fn select_from(&self, start: u32, k: u32) -> Result<u32> {
        let mut word_index = start as usize / 32;
        let mut word = match self.word(word_index) {
            Some(word) => word & (u32::MAX >> (start % 32)),
            None => 0,
        };
        let mut remaining = k;
        loop {
            let pop = word.count_ones();
            if remaining <= pop {
                for byte_index in 0..4 {
                    let byte = ((word >> (24 - 8 * byte_index)) & 0xff) as usize;
                    let byte_pop = POP_TABLE[byte] as u32;
                    if remaining <= byte_pop {
                        let bit_in_byte = SELECT_TABLE[byte][remaining as usize - 1] as u32;
                        return Ok(word_index as u32 * 32 + byte_index * 8 + bit_in_byte);
                    }
                    remaining -= byte_pop;
                }
            }
            remaining -= pop;
            word_index += 1;
            word = self.word(word_index).ok_or_else(|| {
                corruption(format!("tf bitmap has fewer than {} set bits after {}", k, start))
            })?;
        }
    }

    /// Counts for the `ordinal`-th (1-based) document of this segment.
    pub fn get_pos_count_info(&self, ordinal: u32) -> Result<PosCountInfo> {
        if ordinal == 0 {
            return Err(PostingError::InvalidArgument(
                "document ordinals start at 1".to_string(),
            ));
        }
        let block = (ordinal - 1) as usize / POSITION_BITMAP_BLOCK_LEN;
        let local = ((ordinal - 1) as usize % POSITION_BITMAP_BLOCK_LEN) as u32;

        let block_start = if block == 0 {
            0
        } else if block <= self.block_count {
            self.block_offset(block - 1) + 1
        } else {
            return Err(PostingError::InvalidArgument(format!(
                "ordinal {} beyond {} bitmap blocks",
                ordinal,
                self.block_count + 1
            )));
        };
        let start = if local > 0 {
            self.select_from(block_start, local)? + 1
        } else {
            block_start
        };

        let bound = if block < self.block_count {
            self.block_offset(block)
        } else {
            self.total_bits.saturating_sub(1)
        };
        let mut end = start;
        while end <= bound && !self.test_bit(end) {
            end += 1;
        }
        if end > bound || self.total_bits == 0 {
            return Err(corruption(format!(
                "no terminating bit for ordinal {} in tf bitmap",
                ordinal
            )));
        }

        Ok(PosCountInfo {
            prior_count: start,
            own_count: end - start + 1,
        })
    }
}
