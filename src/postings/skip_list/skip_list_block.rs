use crate::SKIP_LIST_BLOCK_LEN;

use super::SkipListFormat;

/// One decoded block of skip items, still delta encoded.
pub struct SkipListBlock {
    pub len: usize,
    pub keys: [u32; SKIP_LIST_BLOCK_LEN],
    pub offsets: [u32; SKIP_LIST_BLOCK_LEN],
    pub values: Option<Box<[u32]>>,
}

impl SkipListBlock {
    pub fn new(skip_list_format: &SkipListFormat) -> Self {
        let values = if skip_list_format.has_value() {
            Some(vec![0; SKIP_LIST_BLOCK_LEN].into_boxed_slice())
        } else {
            None
        };

        Self {
            len: 0,
            keys: [0; SKIP_LIST_BLOCK_LEN],
            offsets: [0; SKIP_LIST_BLOCK_LEN],
            values,
        }
    }
}
