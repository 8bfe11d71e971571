mod in_doc_position_iterator;
mod in_doc_position_state;
mod state_keeper;

pub use in_doc_position_iterator::InDocPositionIterator;
pub use in_doc_position_state::{DecoderArena, InDocPositionState, NormalInDocState, StatePool};
pub use state_keeper::StateKeeper;
