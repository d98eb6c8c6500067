use async_trait::async_trait;
use redb::{
    Database, ReadableTable, TableDefinition, TableError, TableHandle, WriteTransaction,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;
use urlcutter_core::error::{Result, StorageError};
use urlcutter_core::repository::{ReadRepository, Repository, UrlRecord};
use urlcutter_core::shortcode::ShortCode;

/// Name of the collection records are stored in unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "urlcutter";

/// Last issued counter value per collection.
///
/// A collection without an entry here has issued nothing yet; the first
/// insert stores 1, so counter values (and keys) start at 1.
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequences");

type RecordTable<'a> = TableDefinition<'a, &'static str, &'static [u8]>;

/// Configures a [`RedbRepository`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct StoreSettings {
    /// Database file; created together with its parent directory if absent.
    #[builder(setter(into))]
    pub path: PathBuf,
    /// Table holding the records and owning the counter.
    #[builder(default = String::from(DEFAULT_COLLECTION), setter(into))]
    pub collection: String,
    /// Page cache size in bytes, redb's default when unset.
    #[builder(default, setter(strip_option))]
    pub cache_size: Option<usize>,
}

#[derive(Debug)]
struct Store {
    db: Database,
    collection: String,
}

/// Durable repository backed by a single redb file.
///
/// Each insert runs in one write transaction that advances the collection
/// counter, encodes it as the short code and writes the JSON record under
/// that code. redb allows one writer at a time, so concurrent inserts see the
/// counter as a strict sequence. Reads use their own snapshot and never
/// observe a half-written insert.
///
/// redb calls block, so the async trait methods run them on tokio's blocking
/// pool; the inherent methods are synchronous.
#[derive(Debug)]
pub struct RedbRepository {
    store: Arc<Store>,
    path: PathBuf,
}

impl RedbRepository {
    /// Opens the database at `path` with the default collection.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_settings(StoreSettings::builder().path(path.as_ref()).build())
    }

    /// Opens or creates the database described by `settings`.
    ///
    /// No tables are created here; the collection appears with the first
    /// insert.
    pub fn with_settings(settings: StoreSettings) -> Result<Self> {
        if settings.collection.is_empty() || settings.collection == SEQUENCE_TABLE.name() {
            return Err(StorageError::Open(format!(
                "invalid collection name '{}'",
                settings.collection
            )));
        }

        if let Some(parent) = settings.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Open(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let mut builder = Database::builder();
        if let Some(bytes) = settings.cache_size {
            builder.set_cache_size(bytes);
        }
        let db = builder.create(&settings.path).map_err(|e| {
            StorageError::Open(format!("{}: {e}", settings.path.display()))
        })?;

        debug!(
            path = %settings.path.display(),
            collection = %settings.collection,
            "opened redb store"
        );

        Ok(Self {
            store: Arc::new(Store {
                db,
                collection: settings.collection,
            }),
            path: settings.path,
        })
    }

    /// Returns the path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the collection name.
    pub fn collection(&self) -> &str {
        &self.store.collection
    }

    /// Returns the last issued counter value, `0` if nothing was inserted.
    pub fn current_sequence(&self) -> Result<u64> {
        self.store.current_sequence()
    }

    /// Closes the database file.
    ///
    /// Operations still running on the blocking pool keep the file open until
    /// they finish.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.store) {
            Ok(store) => {
                drop(store.db);
                debug!(path = %self.path.display(), "closed redb store");
            }
            Err(_) => {
                warn!(
                    path = %self.path.display(),
                    "redb store closed with operations in flight"
                );
            }
        }
        Ok(())
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| StorageError::Transaction(format!("blocking task failed: {e}")))?
    }
}

impl Store {
    fn records(&self) -> RecordTable<'_> {
        TableDefinition::new(&self.collection)
    }

    fn insert(&self, target_url: String) -> Result<ShortCode> {
        let txn = self.db.begin_write().map_err(backend_error)?;

        match self.stage_insert(&txn, target_url) {
            Ok(code) => {
                txn.commit().map_err(backend_error)?;
                Ok(code)
            }
            Err(err) => {
                if let Err(abort) = txn.abort() {
                    warn!(error = %abort, "failed to abort insert transaction");
                }
                Err(err)
            }
        }
    }

    fn stage_insert(&self, txn: &WriteTransaction, target_url: String) -> Result<ShortCode> {
        let mut sequences = txn.open_table(SEQUENCE_TABLE).map_err(backend_error)?;
        let last = sequences
            .get(self.collection.as_str())
            .map_err(backend_error)?
            .map(|v| v.value())
            .unwrap_or(0);
        let next = last.checked_add(1).ok_or_else(|| {
            StorageError::Transaction(format!("sequence of '{}' exhausted", self.collection))
        })?;
        sequences
            .insert(self.collection.as_str(), next)
            .map_err(backend_error)?;

        let key = ShortCode::generated(next);
        let record = UrlRecord {
            key: key.clone(),
            target_url,
        };
        let encoded =
            serde_json::to_vec(&record).map_err(|e| StorageError::Encode(e.to_string()))?;

        let mut records = txn.open_table(self.records()).map_err(backend_error)?;
        records
            .insert(key.as_str(), encoded.as_slice())
            .map_err(backend_error)?;

        debug!(code = %key, sequence = next, "staged url record");
        Ok(key)
    }

    fn get(&self, code: &ShortCode) -> Result<UrlRecord> {
        let txn = self.db.begin_read().map_err(backend_error)?;
        let records = match txn.open_table(self.records()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => {
                return Err(StorageError::CollectionMissing(self.collection.clone()));
            }
            Err(err) => return Err(backend_error(err)),
        };

        let Some(value) = records.get(code.as_str()).map_err(backend_error)? else {
            trace!(code = %code, "short code not found");
            return Err(StorageError::NotFound(code.to_string()));
        };

        let bytes = value.value();
        if bytes.is_empty() {
            warn!(code = %code, "stored record is empty");
            return Err(StorageError::NotFound(code.to_string()));
        }

        serde_json::from_slice(bytes).map_err(|e| {
            warn!(code = %code, error = %e, "stored record is unreadable");
            StorageError::NotFound(code.to_string())
        })
    }

    fn current_sequence(&self) -> Result<u64> {
        let txn = self.db.begin_read().map_err(backend_error)?;
        let sequences = match txn.open_table(SEQUENCE_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(err) => return Err(backend_error(err)),
        };

        let last = sequences
            .get(self.collection.as_str())
            .map_err(backend_error)?
            .map(|v| v.value())
            .unwrap_or(0);
        Ok(last)
    }
}

fn backend_error(err: impl Into<redb::Error>) -> StorageError {
    StorageError::Transaction(err.into().to_string())
}

#[async_trait]
impl ReadRepository for RedbRepository {
    async fn get(&self, code: &ShortCode) -> Result<UrlRecord> {
        let code = code.clone();
        self.run_blocking(move |store| store.get(&code)).await
    }
}

#[async_trait]
impl Repository for RedbRepository {
    async fn insert(&self, target_url: &str) -> Result<ShortCode> {
        let target_url = target_url.to_owned();
        self.run_blocking(move |store| store.insert(target_url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, RedbRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = RedbRepository::open(dir.path().join("urlcutter.db")).unwrap();
        (dir, repo)
    }

    #[tokio::test]
    async fn first_insert_starts_the_counter_at_one() {
        let (_dir, repo) = open_temp();
        assert_eq!(repo.current_sequence().unwrap(), 0);

        let code = repo.insert("http://example.com").await.unwrap();

        assert_eq!(code.as_str(), "2");
        assert_eq!(code.id().unwrap(), 1);
        assert_eq!(repo.current_sequence().unwrap(), 1);
    }

    #[tokio::test]
    async fn lookup_before_any_insert_reports_missing_collection() {
        let (_dir, repo) = open_temp();

        let err = repo.get(&ShortCode::generated(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::CollectionMissing(ref c) if c == DEFAULT_COLLECTION));
    }

    #[tokio::test]
    async fn empty_and_corrupt_values_read_as_not_found() {
        let (_dir, repo) = open_temp();
        repo.insert("http://example.com").await.unwrap();

        {
            let txn = repo.store.db.begin_write().unwrap();
            {
                let mut table = txn.open_table(repo.store.records()).unwrap();
                table.insert("empty", b"".as_slice()).unwrap();
                table.insert("corrupt", b"{not json".as_slice()).unwrap();
            }
            txn.commit().unwrap();
        }

        for key in ["empty", "corrupt"] {
            let err = repo.get(&ShortCode::new_unchecked(key)).await.unwrap_err();
            assert!(matches!(err, StorageError::NotFound(_)), "{key}: {err:?}");
        }
    }

    #[tokio::test]
    async fn failed_insert_leaves_no_trace() {
        let (_dir, repo) = open_temp();
        repo.insert("http://example.com").await.unwrap();

        let txn = repo.store.db.begin_write().unwrap();
        repo.store
            .stage_insert(&txn, "http://discarded.com".to_string())
            .unwrap();
        txn.abort().unwrap();

        assert_eq!(repo.current_sequence().unwrap(), 1);
        let err = repo.get(&ShortCode::generated(2)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        let code = repo.insert("http://kept.com").await.unwrap();
        assert_eq!(code.id().unwrap(), 2);
    }

    #[test]
    fn rejects_reserved_collection_names() {
        let dir = tempfile::tempdir().unwrap();

        for collection in ["", "sequences"] {
            let settings = StoreSettings::builder()
                .path(dir.path().join("urlcutter.db"))
                .collection(collection)
                .build();
            assert!(matches!(
                RedbRepository::with_settings(settings),
                Err(StorageError::Open(_))
            ));
        }
    }

    #[tokio::test]
    async fn collections_keep_separate_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urlcutter.db");

        let first = RedbRepository::open(&path).unwrap();
        first.insert("http://one.example").await.unwrap();
        first.insert("http://two.example").await.unwrap();
        first.close().unwrap();

        let other = RedbRepository::with_settings(
            StoreSettings::builder()
                .path(&path)
                .collection("archive")
                .cache_size(1 << 20)
                .build(),
        )
        .unwrap();
        let code = other.insert("http://three.example").await.unwrap();

        assert_eq!(other.collection(), "archive");
        assert_eq!(code.id().unwrap(), 1);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("urlcutter.db");

        let repo = RedbRepository::open(&path).unwrap();
        assert_eq!(repo.path(), path);
        assert!(path.exists());
    }
}
