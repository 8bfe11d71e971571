/// Decides how large the next slice of a growing byte-slice chain is.
pub trait CapacityPolicy {
    fn next_capacity(&self, current: usize) -> usize;
}

/// Every slice has the same capacity as the first one.
#[derive(Clone, Copy)]
pub struct FixedCapacityPolicy {
    capacity: usize,
}

impl FixedCapacityPolicy {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        Self { capacity }
    }
}

impl Default for FixedCapacityPolicy {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl CapacityPolicy for FixedCapacityPolicy {
    fn next_capacity(&self, current: usize) -> usize {
        if current == 0 {
            self.capacity
        } else {
            current
        }
    }
}
