mod rocksdb;
mod sequence;

pub use self::rocksdb::{RocksDbNumberStore, SCHEMA_VERSION};
pub use self::sequence::AtomicSequenceGenerator;
