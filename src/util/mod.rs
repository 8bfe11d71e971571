mod capacity_policy;
mod fractional_capacity_policy;
mod slot_arena;

pub use capacity_policy::{CapacityPolicy, FixedCapacityPolicy};
pub use fractional_capacity_policy::{
    FractionalCapacityPolicy, FractionalChunkCapacityPolicy, FRACTIONAL_CAPACITY_CHUNK_SIZE,
    FRACTIONAL_CAPACITY_INIT_SIZE,
};
pub use slot_arena::{SlotArena, SlotId};
