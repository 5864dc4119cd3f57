pub mod error;
pub mod sequence;
pub mod storage;

pub use error::{InputError, NumbersError, SequenceError, StorageError};
pub use sequence::SequenceGenerator;
pub use storage::{NumberStore, StoredNumber};
