pub mod bedrock;
pub mod codec;
pub mod java;
pub mod metadata;
mod packet;

pub use codec::*;
pub use packet::Packet;
