use super::capacity_policy::CapacityPolicy;

/// Grows each slice by a quarter, starting at `I` bytes and capped at `H` bytes.
#[derive(Default, Clone, Copy)]
pub struct FractionalCapacityPolicy<const I: usize, const H: usize>;

impl<const I: usize, const H: usize> CapacityPolicy for FractionalCapacityPolicy<I, H> {
    fn next_capacity(&self, current: usize) -> usize {
        if current == 0 {
            I
        } else {
            std::cmp::min(current + (current >> 2), H)
        }
    }
}

pub const FRACTIONAL_CAPACITY_INIT_SIZE: usize = 128;
pub const FRACTIONAL_CAPACITY_CHUNK_SIZE: usize = 10 * 1024 * 1024;
pub type FractionalChunkCapacityPolicy =
    FractionalCapacityPolicy<FRACTIONAL_CAPACITY_INIT_SIZE, FRACTIONAL_CAPACITY_CHUNK_SIZE>;

#[cfg(test)]
mod tests {
    use crate::util::CapacityPolicy;

    use super::FractionalCapacityPolicy;

    #[test]
    fn test_growth_is_capped() {
        let policy = FractionalCapacityPolicy::<8, 12>;
        assert_eq!(policy.next_capacity(0), 8);
        assert_eq!(policy.next_capacity(8), 10);
        assert_eq!(policy.next_capacity(10), 12);
        assert_eq!(policy.next_capacity(12), 12);
    }
}
