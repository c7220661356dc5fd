mod key_id;
mod mpi;
mod s2k;
mod tag;

pub use self::key_id::KeyId;
pub use self::mpi::Mpi;
pub use self::s2k::{StringToKey, StringToKeyType};
pub use self::tag::{PacketLength, Tag};
