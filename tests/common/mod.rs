#![allow(dead_code)]

use posting_codec::{
    index::inverted_index::SegmentPosting,
    postings::{
        in_doc::{DecoderArena, InDocPositionState, StatePool},
        ByteSliceList, PostingFormat, TermMeta, TermPostingWriter,
    },
    util::SlotId,
    DocId, Pos, END_POSITION,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Bytes written ahead of every region, so regions never start at offset 0.
pub const REGION_PADDING: usize = 3;

/// One document of a test posting list, with a segment-relative doc id.
#[derive(Debug, Clone)]
pub struct TestDoc {
    pub docid: DocId,
    pub positions: Vec<Pos>,
}

impl TestDoc {
    pub fn new(docid: DocId, positions: Vec<Pos>) -> Self {
        Self { docid, positions }
    }

    pub fn doc_payload(&self) -> u16 {
        (self.docid as u16).wrapping_mul(7)
    }

    pub fn fieldmap(&self) -> u8 {
        (self.docid % 8) as u8
    }
}

/// The dumped postings of one term in one segment.
pub struct TestSegment {
    pub base_docid: DocId,
    pub term_meta: TermMeta,
    pub inline_doc: Option<(DocId, u32)>,
    pub doc_list: ByteSliceList,
    pub position_list: Option<ByteSliceList>,
}

impl TestSegment {
    pub fn build(
        format: PostingFormat,
        base_docid: DocId,
        docs: &[TestDoc],
        slice_len: usize,
        dict_inline: bool,
    ) -> Self {
        let mut writer = TermPostingWriter::new(format);
        for doc in docs {
            if format.has_position_list() {
                writer.add_doc_with_positions(
                    doc.docid,
                    &doc.positions,
                    &[],
                    doc.doc_payload(),
                    doc.fieldmap(),
                );
            } else {
                writer.add_doc(
                    doc.docid,
                    doc.positions.len() as u32,
                    doc.doc_payload(),
                    doc.fieldmap(),
                );
            }
        }

        let mut doc_buf = vec![0xff; REGION_PADDING];
        let mut position_buf = vec![0xff; REGION_PADDING];
        let dump = writer.dump(&mut doc_buf, &mut position_buf).unwrap();
        let position_list = format
            .has_position_list()
            .then(|| ByteSliceList::from_bytes(&position_buf, slice_len));

        Self {
            base_docid,
            term_meta: dump.term_meta,
            inline_doc: if dict_inline { writer.inline_doc() } else { None },
            doc_list: ByteSliceList::from_bytes(&doc_buf, slice_len),
            position_list,
        }
    }

    pub fn posting(&self) -> SegmentPosting<'_> {
        let posting = match self.inline_doc {
            Some((docid, tf)) => {
                SegmentPosting::new_dict_inline(self.base_docid, self.term_meta, docid, tf)
            }
            None => SegmentPosting::new(
                self.base_docid,
                self.term_meta,
                &self.doc_list,
                REGION_PADDING,
            ),
        };
        match &self.position_list {
            Some(position_list) => posting.with_position_list(position_list, REGION_PADDING),
            None => posting,
        }
    }
}

/// Drains the positions of an unpacked state.
pub fn collect_positions<'a>(
    pool: &StatePool<'a>,
    handle: SlotId,
    decoders: &mut DecoderArena<'a>,
) -> Vec<Pos> {
    let state = pool.try_get(handle).unwrap();
    let mut iterator = state.create_iterator(decoders).unwrap();
    let mut positions = vec![];
    loop {
        let pos = iterator.seek_position(decoders, 0).unwrap();
        if pos == END_POSITION {
            break;
        }
        positions.push(pos);
    }
    positions
}
