use crate::{
    postings::{
        compression::BlockEncoder, skip_list::SkipListReader, ByteSliceList, ByteSliceReader,
        PostingFormat, TermPostingInfo,
    },
    PosPayload, PostingError, Result, POSITION_RECORD_LEN,
};

use super::PositionBitmapReader;

/// Where one position record lives in a segment's position region.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordLocation {
    pub index: usize,
    /// Ttf index of the first position in the record.
    pub start_ttf: u64,
    pub len: usize,
    pub byte_offset: usize,
}

/// Decodes the position records of one term in one segment.
///
/// A decoder may be shared by several in-doc iterators that take turns on the
/// same segment; [`Self::set_need_reopen`] makes the next decode fetch the
/// record afresh.
pub struct PositionListSegmentDecoder<'a> {
    byte_slice_list: &'a ByteSliceList,
    posting_format: PostingFormat,
    ttf: u64,
    record_count: usize,
    records_start: usize,
    records_end: usize,
    bitmap_reader: Option<PositionBitmapReader<'a>>,
    skip_list_reader: Option<SkipListReader<'a>>,
    skip_location: Option<RecordLocation>,
    reader: ByteSliceReader<'a>,
    need_reopen: bool,
}

impl<'a> PositionListSegmentDecoder<'a> {
    pub fn open(
        byte_slice_list: &'a ByteSliceList,
        offset: usize,
        ttf: u64,
        posting_format: PostingFormat,
    ) -> Result<Self> {
        let bitmap_reader = if posting_format.has_tf_bitmap() {
            Some(PositionBitmapReader::init(byte_slice_list, offset)?)
        } else {
            None
        };
        let header_offset = bitmap_reader
            .as_ref()
            .map_or(offset, |bitmap_reader| bitmap_reader.end_offset());
        let mut reader = ByteSliceReader::open_at(byte_slice_list, header_offset)?;
        let mut term_posting_info = TermPostingInfo::default();
        term_posting_info.load_position(&mut reader)?;

        let skip_list_start = reader.tell();
        let records_start = skip_list_start + term_posting_info.position_skip_size as usize;
        let records_end = records_start + term_posting_info.position_list_size as usize;
        if records_end > byte_slice_list.total_size() {
            log::warn!(
                "position region [{}, {}) exceeds list of {} bytes",
                records_start,
                records_end,
                byte_slice_list.total_size()
            );
            return Err(PostingError::Corruption(format!(
                "position region ends at {} beyond {}",
                records_end,
                byte_slice_list.total_size()
            )));
        }

        let record_count = (ttf as usize).div_ceil(POSITION_RECORD_LEN);
        let skip_list_reader = if record_count > 1 {
            Some(SkipListReader::open(
                posting_format.position_skip_list_format(),
                record_count,
                ByteSliceReader::open_at(byte_slice_list, skip_list_start)?,
            ))
        } else {
            None
        };
        reader.seek(records_start)?;

        log::debug!(
            "open position decoder at {}: ttf {}, {} records, bitmap {}",
            offset,
            ttf,
            record_count,
            bitmap_reader.is_some()
        );

        Ok(Self {
            byte_slice_list,
            posting_format,
            ttf,
            record_count,
            records_start,
            records_end,
            bitmap_reader,
            skip_list_reader,
            skip_location: None,
            reader,
            need_reopen: false,
        })
    }

    pub fn ttf(&self) -> u64 {
        self.ttf
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn posting_format(&self) -> &PostingFormat {
        &self.posting_format
    }

    pub fn bitmap(&self) -> Option<&PositionBitmapReader<'a>> {
        self.bitmap_reader.as_ref()
    }

    pub fn set_need_reopen(&mut self) {
        self.need_reopen = true;
    }

    pub fn need_reopen(&self) -> bool {
        self.need_reopen
    }

    /// Finds the record holding the position with ttf index `target_ttf`.
    pub fn locate(&mut self, target_ttf: u64) -> Result<RecordLocation> {
        if target_ttf >= self.ttf {
            return Err(PostingError::InvalidArgument(format!(
                "ttf index {} beyond {} positions",
                target_ttf, self.ttf
            )));
        }
        let Some(skip_list_reader) = self.skip_list_reader.as_mut() else {
            return Ok(RecordLocation {
                index: 0,
                start_ttf: 0,
                len: self.ttf as usize,
                byte_offset: self.records_start,
            });
        };

        if self
            .skip_location
            .is_some_and(|location| target_ttf < location.start_ttf)
        {
            skip_list_reader.reopen();
        }
        let seek = skip_list_reader.seek(target_ttf)?;
        if !seek.found {
            log::warn!("position skip list ends before ttf index {}", target_ttf);
            return Err(PostingError::Corruption(format!(
                "position skip list ends before ttf index {}",
                target_ttf
            )));
        }
        let start_ttf = (seek.skipped_count * POSITION_RECORD_LEN) as u64;
        let location = RecordLocation {
            index: seek.skipped_count,
            start_ttf,
            len: std::cmp::min(POSITION_RECORD_LEN as u64, self.ttf - start_ttf) as usize,
            byte_offset: self.records_start + seek.start_offset as usize,
        };
        self.skip_location = Some(location);

        Ok(location)
    }

    /// Locates the record covering `target_ttf` and reports whether it must
    /// be decoded, which is the case unless `resident` already names it and
    /// no reopen has been signaled.
    pub fn skip_to(
        &mut self,
        target_ttf: u64,
        resident: Option<&RecordLocation>,
    ) -> Result<(RecordLocation, bool)> {
        let location = self.locate(target_ttf)?;
        let need_decode =
            self.need_reopen || resident.map_or(true, |resident| resident.index != location.index);
        Ok((location, need_decode))
    }

    /// Decodes the record at `location`. Decoding the same record again yields
    /// the same buffers.
    pub fn decode_record(
        &mut self,
        location: &RecordLocation,
        positions: &mut [u32],
        payloads: Option<&mut [PosPayload]>,
    ) -> Result<usize> {
        let len = location.len;
        if len > positions.len() || len > POSITION_RECORD_LEN {
            return Err(PostingError::InvalidArgument(format!(
                "record of {} positions does not fit buffer of {}",
                len,
                positions.len()
            )));
        }
        if location.byte_offset >= self.records_end {
            return Err(PostingError::Range {
                offset: location.byte_offset,
                total_size: self.records_end,
            });
        }

        if self.need_reopen || self.reader.tell() > location.byte_offset {
            self.reader = ByteSliceReader::open_at(self.byte_slice_list, location.byte_offset)?;
        } else {
            self.reader.seek(location.byte_offset)?;
        }

        let block_encoder = BlockEncoder;
        block_encoder.decode_u32(&mut self.reader, &mut positions[0..len])?;
        if self.posting_format.has_position_payload() {
            match payloads {
                Some(payloads) if payloads.len() >= len => {
                    block_encoder.decode_u8(&mut self.reader, &mut payloads[0..len])?;
                }
                Some(_) => {
                    return Err(PostingError::InvalidArgument(
                        "payload buffer smaller than record".to_string(),
                    ));
                }
                None => self.reader.seek(self.reader.tell() + len)?,
            }
        }
        self.need_reopen = false;

        log::trace!(
            "decoded position record {} ({} positions) at {}",
            location.index,
            len,
            location.byte_offset
        );

        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{
        postings::{positions::PositionListEncoder, ByteSliceList, PostingFormat},
        PostingError, Result, POSITION_RECORD_LEN,
    };

    use super::PositionListSegmentDecoder;

    fn encode(format: PostingFormat, docs: &[Vec<u32>]) -> Vec<u8> {
        let mut encoder = PositionListEncoder::new(format);
        for positions in docs {
            for &pos in positions {
                encoder.add_position(pos, (pos % 251) as u8);
            }
            encoder.end_doc();
        }
        let mut buf = vec![];
        encoder.dump(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_locate_and_decode() -> Result<()> {
        let format = PostingFormat::builder().with_position_payload().build();
        let docs: Vec<Vec<u32>> = (0..100).map(|i| vec![i, i + 10, i + 20]).collect();
        let buf = encode(format, &docs);
        let mut padded = vec![0u8; 3];
        padded.extend_from_slice(&buf);
        let list = ByteSliceList::from_bytes(&padded, 17);

        let mut decoder = PositionListSegmentDecoder::open(&list, 3, 300, format)?;
        assert_eq!(decoder.record_count(), 3);
        assert!(decoder.bitmap().is_none());

        let location = decoder.locate(130)?;
        assert_eq!(location.index, 1);
        assert_eq!(location.start_ttf, 128);
        assert_eq!(location.len, POSITION_RECORD_LEN);

        let mut positions = [0u32; POSITION_RECORD_LEN];
        let mut payloads = [0u8; POSITION_RECORD_LEN];
        assert_eq!(
            decoder.decode_record(&location, &mut positions, Some(&mut payloads))?,
            128
        );
        // ttf 128 is the third position of doc 42, delta 10 from doc 42's second
        assert_eq!(positions[0], 10);
        assert_eq!(payloads[0], 62);

        let last = decoder.locate(299)?;
        assert_eq!((last.index, last.start_ttf, last.len), (2, 256, 44));

        // backwards goes through a reopened skip list
        let first = decoder.locate(5)?;
        assert_eq!((first.index, first.start_ttf), (0, 0));
        decoder.decode_record(&first, &mut positions, None)?;
        assert_eq!(&positions[..3], &[0, 10, 10]);

        assert!(matches!(
            decoder.locate(300),
            Err(PostingError::InvalidArgument(_))
        ));

        Ok(())
    }

    #[test]
    fn test_skip_to_need_decode() -> Result<()> {
        let format = PostingFormat::builder().with_position_list().build();
        let docs: Vec<Vec<u32>> = (0..200).map(|i| vec![i, i + 1]).collect();
        let buf = encode(format, &docs);
        let list = ByteSliceList::from_bytes(&buf, 64);
        let mut decoder = PositionListSegmentDecoder::open(&list, 0, 400, format)?;

        let (location, need_decode) = decoder.skip_to(10, None)?;
        assert!(need_decode);
        let (same, need_decode) = decoder.skip_to(20, Some(&location))?;
        assert_eq!(same, location);
        assert!(!need_decode);

        decoder.set_need_reopen();
        let (_, need_decode) = decoder.skip_to(20, Some(&location))?;
        assert!(need_decode);
        let mut positions = [0u32; POSITION_RECORD_LEN];
        decoder.decode_record(&location, &mut positions, None)?;
        assert!(!decoder.need_reopen());

        let (next, need_decode) = decoder.skip_to(200, Some(&location))?;
        assert_eq!(next.index, 1);
        assert!(need_decode);

        Ok(())
    }

    #[test]
    fn test_truncated_region() {
        let format = PostingFormat::builder().with_position_list().build();
        let buf = encode(format, &[vec![1, 2, 3]]);
        let list = ByteSliceList::from_bytes(&buf[..buf.len() - 1], 8);
        assert!(matches!(
            PositionListSegmentDecoder::open(&list, 0, 3, format),
            Err(PostingError::Corruption(_))
        ));
    }

    proptest! {
        #[test]
        fn test_decode_is_idempotent(
            tfs in proptest::collection::vec(1usize..40, 1..60),
            slice_len in 1usize..64,
            pick in any::<prop::sample::Index>(),
        ) {
            let format = PostingFormat::builder().with_position_payload().build();
            let docs: Vec<Vec<u32>> = tfs
                .iter()
                .enumerate()
                .map(|(doc, &tf)| (0..tf as u32).map(|i| doc as u32 + i * 3).collect())
                .collect();
            let ttf: usize = tfs.iter().sum();
            let buf = encode(format, &docs);
            let list = ByteSliceList::from_bytes(&buf, slice_len);
            let mut decoder = PositionListSegmentDecoder::open(&list, 0, ttf as u64, format).unwrap();

            let target = pick.index(ttf) as u64;
            let location = decoder.locate(target).unwrap();
            prop_assert!(location.start_ttf <= target);
            prop_assert!(target < location.start_ttf + location.len as u64);

            let mut first = ([0u32; POSITION_RECORD_LEN], [0u8; POSITION_RECORD_LEN]);
            let mut second = ([0u32; POSITION_RECORD_LEN], [0u8; POSITION_RECORD_LEN]);
            let n1 = decoder.decode_record(&location, &mut first.0, Some(&mut first.1)).unwrap();
            decoder.set_need_reopen();
            let n2 = decoder.decode_record(&location, &mut second.0, Some(&mut second.1)).unwrap();
            prop_assert_eq!(n1, n2);
            prop_assert_eq!(&first.0[..n1], &second.0[..n2]);
            prop_assert_eq!(&first.1[..n1], &second.1[..n2]);
        }
    }
}
