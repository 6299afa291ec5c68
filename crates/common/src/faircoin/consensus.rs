mod params;

pub use bitcoin::consensus::encode::{
    Decodable, Encodable, Error as EncodeDecodeError, MAX_VEC_SIZE, VarInt, deserialize,
    deserialize_partial, serialize,
};
pub use fairchain_derive::ConsensusCodec;
pub use params::Params;
