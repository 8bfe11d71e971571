use crate::{postings::MatchData, DocId, Result};

/// Doc-level cursor over the postings of one term.
pub trait PostingIterator {
    /// Moves to the smallest doc id `>= docid` and returns it, or `END_DOCID`
    /// once the postings are exhausted. Never moves backwards.
    fn seek(&mut self, docid: DocId) -> Result<DocId>;

    fn match_data(&mut self) -> Result<MatchData>;
}
