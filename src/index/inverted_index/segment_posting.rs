use crate::{
    postings::{ByteSliceList, TermMeta},
    DocId, TermFreq,
};

/// Where the doc ids of a term live in one segment.
#[derive(Clone, Copy)]
pub enum DocListData<'a> {
    /// A doc region starting at `offset` of `list`.
    Slices {
        list: &'a ByteSliceList,
        offset: usize,
    },
    /// The only document of the term, stored in the dictionary entry.
    DictInline { docid: DocId, tf: TermFreq },
}

/// A position region starting at `offset` of `list`.
#[derive(Clone, Copy)]
pub struct PositionListData<'a> {
    pub list: &'a ByteSliceList,
    pub offset: usize,
}

/// One term's postings in one segment. Doc ids stored in the segment are
/// relative to `base_docid`.
#[derive(Clone, Copy)]
pub struct SegmentPosting<'a> {
    base_docid: DocId,
    term_meta: TermMeta,
    doc_list: DocListData<'a>,
    position_list: Option<PositionListData<'a>>,
}

impl<'a> SegmentPosting<'a> {
    pub fn new(
        base_docid: DocId,
        term_meta: TermMeta,
        doc_list: &'a ByteSliceList,
        offset: usize,
    ) -> Self {
        Self {
            base_docid,
            term_meta,
            doc_list: DocListData::Slices {
                list: doc_list,
                offset,
            },
            position_list: None,
        }
    }

    pub fn new_dict_inline(base_docid: DocId, term_meta: TermMeta, docid: DocId, tf: TermFreq) -> Self {
        Self {
            base_docid,
            term_meta,
            doc_list: DocListData::DictInline { docid, tf },
            position_list: None,
        }
    }

    pub fn with_position_list(mut self, position_list: &'a ByteSliceList, offset: usize) -> Self {
        self.position_list = Some(PositionListData {
            list: position_list,
            offset,
        });
        self
    }

    pub fn base_docid(&self) -> DocId {
        self.base_docid
    }

    pub fn term_meta(&self) -> &TermMeta {
        &self.term_meta
    }

    pub fn doc_list(&self) -> &DocListData<'a> {
        &self.doc_list
    }

    pub fn position_list(&self) -> Option<&PositionListData<'a>> {
        self.position_list.as_ref()
    }
}
