use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rocksdb::{Direction, IteratorMode, Options, ReadOptions, WriteBatch, WriteOptions, DB};

use crate::contracts::{NumberStore, SequenceGenerator, StorageError, StoredNumber};
use crate::storage::AtomicSequenceGenerator;

/// Key prefix for number records: `num:{id:016x}`
const RECORD_PREFIX: &[u8] = b"num:";
/// Key prefix for the ascending value index: `val:{value}{id}`
const VALUE_INDEX_PREFIX: &[u8] = b"val:";
/// Key holding the schema version of the relation
const SCHEMA_KEY: &[u8] = b"meta:schema";

/// Version written by `ensure_schema`.
pub const SCHEMA_VERSION: u32 = 1;

/// Flipping the sign bit makes big-endian byte order match numeric order.
const SIGN_BIT: u64 = 1 << 63;

/// RocksDB-backed number store.
///
/// Each insert writes the record and its value index entry in a single
/// `WriteBatch`, so a record is either fully visible or absent. Sorted reads
/// are one forward scan of the value index.
pub struct RocksDbNumberStore {
    db: DB,
    ids: AtomicSequenceGenerator,
    schema_ready: AtomicBool,
    path: PathBuf,
}

impl RocksDbNumberStore {
    /// Opens or creates a RocksDB database at the given path.
    ///
    /// The relation is not usable until `ensure_schema` has succeeded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let parallelism = std::thread::available_parallelism()
            .map(|p| p.get() as i32)
            .unwrap_or(4);
        opts.increase_parallelism(parallelism);
        opts.set_max_background_jobs(parallelism.min(4));

        let db = DB::open(&opts, path).map_err(|e| StorageError::RocksDb(e.to_string()))?;

        Ok(Self {
            db,
            ids: AtomicSequenceGenerator::new(),
            schema_ready: AtomicBool::new(false),
            path: path.to_path_buf(),
        })
    }

    /// Returns the directory backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads a single record by identifier.
    pub fn get(&self, id: u64) -> Result<Option<StoredNumber>, StorageError> {
        match self.db.get(Self::record_key(id)) {
            Ok(Some(bytes)) => Ok(Some(Self::deserialize_record(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::RocksDb(e.to_string())),
        }
    }

    fn record_key(id: u64) -> Vec<u8> {
        format!("num:{:016x}", id).into_bytes()
    }

    /// Index key layout: prefix, 8 bytes of order-preserving value, 8 bytes of id.
    /// The id suffix keeps duplicate values as distinct entries.
    fn value_index_key(value: i64, id: u64) -> Vec<u8> {
        let mut key = Vec::with_capacity(VALUE_INDEX_PREFIX.len() + 16);
        key.extend_from_slice(VALUE_INDEX_PREFIX);
        key.extend_from_slice(&Self::encode_value(value));
        key.extend_from_slice(&id.to_be_bytes());
        key
    }

    #[inline]
    fn encode_value(value: i64) -> [u8; 8] {
        ((value as u64) ^ SIGN_BIT).to_be_bytes()
    }

    #[inline]
    fn decode_value(bytes: &[u8]) -> Result<i64, StorageError> {
        bytes
            .try_into()
            .map(u64::from_be_bytes)
            .map(|raw| (raw ^ SIGN_BIT) as i64)
            .map_err(|_| StorageError::Serialization("Invalid value index key".into()))
    }

    /// Exclusive upper bound for a key prefix ending in ':'.
    fn prefix_upper_bound(prefix: &[u8]) -> Vec<u8> {
        let mut bound = prefix.to_vec();
        if let Some(last) = bound.last_mut() {
            *last += 1;
        }
        bound
    }

    fn serialize_record(record: &StoredNumber) -> Result<Vec<u8>, StorageError> {
        bincode::serialize(record).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn deserialize_record(bytes: &[u8]) -> Result<StoredNumber, StorageError> {
        bincode::deserialize(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Writes go through the WAL so an acknowledged insert survives a crash.
    fn write_options() -> WriteOptions {
        WriteOptions::default()
    }

    fn read_options_with_bound(upper_bound: Vec<u8>) -> ReadOptions {
        let mut opts = ReadOptions::default();
        opts.fill_cache(true);
        opts.set_iterate_upper_bound(upper_bound);
        opts
    }

    /// Finds the highest record identifier on disk, or 0 for an empty relation.
    fn load_last_id(&self) -> Result<u64, StorageError> {
        let upper = Self::prefix_upper_bound(RECORD_PREFIX);
        let mut iter = self
            .db
            .iterator(IteratorMode::From(&upper, Direction::Reverse));

        match iter.next() {
            Some(item) => {
                let (key, _) = item.map_err(|e| StorageError::RocksDb(e.to_string()))?;
                if !key.starts_with(RECORD_PREFIX) {
                    return Ok(0);
                }
                let hex = std::str::from_utf8(&key[RECORD_PREFIX.len()..])
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                u64::from_str_radix(hex, 16)
                    .map_err(|e| StorageError::Serialization(format!("Invalid record key: {}", e)))
            }
            None => Ok(0),
        }
    }

    fn check_ready(&self) -> Result<(), StorageError> {
        if self.schema_ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StorageError::SchemaNotReady)
        }
    }
}

impl NumberStore for RocksDbNumberStore {
    fn ensure_schema(&self) -> Result<(), StorageError> {
        let existing = self
            .db
            .get(SCHEMA_KEY)
            .map_err(|e| StorageError::RocksDb(e.to_string()))?;

        match existing {
            Some(bytes) => {
                let found = bytes
                    .as_slice()
                    .try_into()
                    .map(u32::from_be_bytes)
                    .map_err(|_| StorageError::Serialization("Invalid schema version".into()))?;
                if found != SCHEMA_VERSION {
                    return Err(StorageError::SchemaMismatch {
                        expected: SCHEMA_VERSION,
                        found,
                    });
                }
            }
            None => {
                self.db
                    .put_opt(SCHEMA_KEY, SCHEMA_VERSION.to_be_bytes(), &Self::write_options())
                    .map_err(|e| StorageError::RocksDb(e.to_string()))?;
                tracing::info!(version = SCHEMA_VERSION, "Created numbers relation");
            }
        }

        let last_id = self.load_last_id()?;
        self.ids.advance_to(last_id);
        self.schema_ready.store(true, Ordering::Release);

        tracing::debug!(last_id, "Numbers relation ready");
        Ok(())
    }

    fn insert(&self, value: i64) -> Result<StoredNumber, StorageError> {
        self.check_ready()?;

        let id = self.ids.next()?;
        let record = StoredNumber {
            id,
            value,
            created_at_ms: current_timestamp_ms(),
        };
        let record_bytes = Self::serialize_record(&record)?;

        let mut batch = WriteBatch::default();
        batch.put(Self::record_key(id), &record_bytes);
        batch.put(Self::value_index_key(value, id), b"");

        self.db
            .write_opt(batch, &Self::write_options())
            .map_err(|e| StorageError::RocksDb(e.to_string()))?;

        tracing::debug!(id, value, "Inserted number");
        Ok(record)
    }

    fn list_sorted(&self) -> Result<Vec<i64>, StorageError> {
        self.check_ready()?;

        let read_opts =
            Self::read_options_with_bound(Self::prefix_upper_bound(VALUE_INDEX_PREFIX));
        let iter = self.db.iterator_opt(
            IteratorMode::From(VALUE_INDEX_PREFIX, Direction::Forward),
            read_opts,
        );

        let value_start = VALUE_INDEX_PREFIX.len();
        let mut values = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StorageError::RocksDb(e.to_string()))?;
            if !key.starts_with(VALUE_INDEX_PREFIX) {
                break;
            }
            let value_bytes = key
                .get(value_start..value_start + 8)
                .ok_or_else(|| StorageError::Serialization("Truncated value index key".into()))?;
            values.push(Self::decode_value(value_bytes)?);
        }

        Ok(values)
    }
}

fn current_timestamp_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
