use crate::{
    postings::{
        compression::BlockEncoder, skip_list::SkipListReader, ByteSliceList, ByteSliceReader,
        DocListBlock, PostingFormat, TermPostingInfo,
    },
    DocId, PostingError, Result, DOC_LIST_BLOCK_LEN,
};

use super::SegmentDocDecode;

/// Decodes the doc region of one term in one segment page by page.
///
/// Lists of a single page carry no skip list and are decoded once; longer
/// lists locate the page of a doc id through the doc skip list.
pub struct DocListSegmentDecoder<'a> {
    byte_slice_list: &'a ByteSliceList,
    posting_format: PostingFormat,
    df: usize,
    blocks_start: usize,
    blocks_end: usize,
    reader: ByteSliceReader<'a>,
    skip_list_reader: Option<SkipListReader<'a>>,
    docid_buffer: Box<[u32]>,
    doc_list_block: DocListBlock,
    decoded_block: Option<usize>,
}

fn corruption(message: String) -> PostingError {
    log::warn!("{}", message);
    PostingError::Corruption(message)
}

impl<'a> DocListSegmentDecoder<'a> {
    pub fn open(
        byte_slice_list: &'a ByteSliceList,
        offset: usize,
        df: usize,
        posting_format: PostingFormat,
    ) -> Result<Self> {
        let mut reader = ByteSliceReader::open_at(byte_slice_list, offset)?;
        let mut term_posting_info = TermPostingInfo::default();
        term_posting_info.load_posting(&mut reader)?;

        let skip_list_start = reader.tell();
        let blocks_start = skip_list_start + term_posting_info.posting_skip_size as usize;
        let blocks_end = blocks_start + term_posting_info.posting_list_size as usize;
        if blocks_end > byte_slice_list.total_size() {
            log::warn!(
                "doc region [{}, {}) exceeds list of {} bytes",
                blocks_start,
                blocks_end,
                byte_slice_list.total_size()
            );
            return Err(PostingError::Corruption(format!(
                "doc region ends at {} beyond {}",
                blocks_end,
                byte_slice_list.total_size()
            )));
        }

        let block_count = df.div_ceil(DOC_LIST_BLOCK_LEN);
        let skip_list_reader = if block_count > 1 {
            Some(SkipListReader::open(
                posting_format.doc_skip_list_format(),
                block_count,
                ByteSliceReader::open_at(byte_slice_list, skip_list_start)?,
            ))
        } else {
            None
        };
        reader.seek(blocks_start)?;

        log::debug!(
            "open doc list decoder at {}: df {}, {} blocks",
            offset,
            df,
            block_count
        );

        Ok(Self {
            byte_slice_list,
            posting_format,
            df,
            blocks_start,
            blocks_end,
            reader,
            skip_list_reader,
            docid_buffer: vec![0; DOC_LIST_BLOCK_LEN].into_boxed_slice(),
            doc_list_block: DocListBlock::new(&posting_format),
            decoded_block: None,
        })
    }

    pub fn df(&self) -> usize {
        self.df
    }

    fn decode_block(
        &mut self,
        index: usize,
        base_docid: DocId,
        base_ttf: u64,
        byte_offset: usize,
    ) -> Result<()> {
        let block_len = std::cmp::min(self.df - index * DOC_LIST_BLOCK_LEN, DOC_LIST_BLOCK_LEN);
        self.decoded_block = None;
        if byte_offset >= self.blocks_end {
            return Err(PostingError::Range {
                offset: byte_offset,
                total_size: self.blocks_end,
            });
        }
        if self.reader.tell() > byte_offset {
            self.reader = ByteSliceReader::open_at(self.byte_slice_list, byte_offset)?;
        } else {
            self.reader.seek(byte_offset)?;
        }

        let block_encoder = BlockEncoder;
        let doc_list_block = &mut self.doc_list_block;
        block_encoder.decode_u32(&mut self.reader, &mut self.docid_buffer[0..block_len])?;
        for (docid, &delta) in doc_list_block.docids[0..block_len]
            .iter_mut()
            .zip(self.docid_buffer[0..block_len].iter())
        {
            *docid = DocId::try_from(delta).map_err(|_| {
                corruption(format!("doc id delta {} in doc block {}", delta, index))
            })?;
        }
        if let Some(termfreqs) = doc_list_block.termfreqs.as_deref_mut() {
            block_encoder.decode_u32(&mut self.reader, &mut termfreqs[0..block_len])?;
        }
        if let Some(doc_payloads) = doc_list_block.doc_payloads.as_deref_mut() {
            block_encoder.decode_u16(&mut self.reader, &mut doc_payloads[0..block_len])?;
        }
        if let Some(fieldmaps) = doc_list_block.fieldmaps.as_deref_mut() {
            block_encoder.decode_u8(&mut self.reader, &mut fieldmaps[0..block_len])?;
        }
        doc_list_block.len = block_len;
        if let Err(err) = doc_list_block.decode(base_docid) {
            log::warn!("doc block {} at {}: {}", index, byte_offset, err);
            return Err(err);
        }
        doc_list_block.base_ttf = base_ttf;
        doc_list_block.skipped_doc_count = index * DOC_LIST_BLOCK_LEN;
        self.decoded_block = Some(index);

        log::trace!(
            "decode doc block {} of {} docs, last doc {}",
            index,
            block_len,
            doc_list_block.last_docid
        );

        Ok(())
    }
}

impl<'a> SegmentDocDecode for DocListSegmentDecoder<'a> {
    fn decode_doc_buffer_may_copy(&mut self, docid: DocId) -> Result<Option<&DocListBlock>> {
        if self.df == 0 {
            return Ok(None);
        }

        if self.decoded_block.is_some() && self.doc_list_block.last_docid >= docid {
            return Ok(Some(&self.doc_list_block));
        }

        let Some(skip_list_reader) = self.skip_list_reader.as_mut() else {
            if self.decoded_block.is_none() {
                self.decode_block(0, 0, 0, self.blocks_start)?;
            }
            return Ok((self.doc_list_block.last_docid >= docid).then_some(&self.doc_list_block));
        };

        let seek = skip_list_reader.seek(std::cmp::max(docid, 0) as u64)?;
        if !seek.found {
            return Ok(None);
        }
        let index = seek.skipped_count;
        let base_ttf = if self.posting_format.has_tflist() {
            seek.prev_value
        } else {
            0
        };
        let byte_offset = self.blocks_start + seek.start_offset as usize;
        self.decode_block(index, seek.prev_key as DocId, base_ttf, byte_offset)?;
        if self.doc_list_block.last_docid as u64 != seek.key {
            log::warn!(
                "doc block {} ends at {}, skip list says {}",
                index,
                self.doc_list_block.last_docid,
                seek.key
            );
            return Err(PostingError::Corruption(format!(
                "doc block {} disagrees with its skip item",
                index
            )));
        }

        Ok(Some(&self.doc_list_block))
    }
}
