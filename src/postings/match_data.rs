use crate::{DocPayload, FieldMap, TermFreq};

/// Per-document match statistics handed to scoring.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchData {
    pub tf: TermFreq,
    pub fieldmap: FieldMap,
    pub doc_payload: DocPayload,
}
