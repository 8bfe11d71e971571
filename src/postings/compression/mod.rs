mod block_encoder;

pub use block_encoder::BlockEncoder;
