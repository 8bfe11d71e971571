pub mod inverted_index;
mod posting_iterator;

pub use posting_iterator::PostingIterator;
