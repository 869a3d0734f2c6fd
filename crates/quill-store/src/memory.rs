use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use quill_types::{Address, Identity};
use tracing::{debug, info};

use crate::account::{AccountKind, StoredAccount};
use crate::batch::{BatchOp, WriteBatch};
use crate::error::{StoreError, StoreResult};
use crate::traits::AccountStore;

/// One snapshot record: address, payer, and the account in its on-disk
/// layout (see [`StoredAccount::to_bytes`]).
type SnapshotEntry = (Address, Identity, Vec<u8>);

/// In-memory, map-based account store.
///
/// Accounts are held behind a `RwLock`: reads run concurrently and each
/// commit holds the write lock for the whole check-then-apply sequence, so
/// two batches racing for one address are ordered and the loser sees
/// `AlreadyExists`.
pub struct InMemoryAccountStore {
    accounts: RwLock<BTreeMap<Address, StoredAccount>>,
}

impl InMemoryAccountStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of accounts currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_lock()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_lock()?.is_empty())
    }

    /// Total storage footprint across all accounts.
    pub fn total_bytes(&self) -> StoreResult<u64> {
        Ok(self.read_lock()?.values().map(StoredAccount::size).sum())
    }

    /// Write a snapshot of every account to `path`.
    ///
    /// The snapshot is written to a temporary file in the same directory and
    /// renamed over `path`, so a crash never leaves a half-written file.
    pub fn save_to(&self, path: &Path) -> StoreResult<()> {
        let entries: Vec<SnapshotEntry> = self
            .read_lock()?
            .iter()
            .map(|(address, account)| (*address, account.payer, account.to_bytes()))
            .collect();
        let bytes =
            bincode::serialize(&entries).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| StoreError::Io(e.error))?;

        info!(path = %path.display(), accounts = entries.len(), "store snapshot saved");
        Ok(())
    }

    /// Load a snapshot written by [`Self::save_to`].
    ///
    /// A missing file yields an empty store.
    pub fn load_from(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot; starting empty");
            return Ok(Self::new());
        }
        let bytes = std::fs::read(path)?;
        let entries: Vec<SnapshotEntry> =
            bincode::deserialize(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let accounts = entries
            .into_iter()
            .map(|(address, payer, raw)| Ok((address, StoredAccount::from_bytes(payer, &raw)?)))
            .collect::<StoreResult<BTreeMap<_, _>>>()?;
        info!(path = %path.display(), accounts = accounts.len(), "store snapshot loaded");
        Ok(Self {
            accounts: RwLock::new(accounts),
        })
    }

    fn read_lock(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<Address, StoredAccount>>> {
        self.accounts.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_lock(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<Address, StoredAccount>>> {
        self.accounts.write().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Check every operation against the current state plus the effects of the
/// operations before it, without mutating anything.
fn check_batch(
    accounts: &BTreeMap<Address, StoredAccount>,
    batch: &WriteBatch,
) -> StoreResult<()> {
    let mut staged: HashMap<Address, Option<AccountKind>> = HashMap::new();
    for op in batch.ops() {
        let address = *op.address();
        let current = match staged.get(&address) {
            Some(kind) => *kind,
            None => accounts.get(&address).map(|a| a.kind),
        };
        match op {
            BatchOp::Create { account, .. } => {
                if current.is_some() {
                    return Err(StoreError::AlreadyExists(address));
                }
                staged.insert(address, Some(account.kind));
            }
            BatchOp::Update { account, .. } => {
                let stored = current.ok_or(StoreError::NotFound(address))?;
                if stored != account.kind {
                    return Err(StoreError::KindMismatch {
                        address,
                        stored,
                        requested: account.kind,
                    });
                }
            }
            BatchOp::Close { .. } => {
                current.ok_or(StoreError::NotFound(address))?;
                staged.insert(address, None);
            }
        }
    }
    Ok(())
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn read(&self, address: &Address) -> StoreResult<Option<StoredAccount>> {
        Ok(self.read_lock()?.get(address).cloned())
    }

    fn exists(&self, address: &Address) -> StoreResult<bool> {
        Ok(self.read_lock()?.contains_key(address))
    }

    fn scan(&self, kind: AccountKind) -> StoreResult<Vec<(Address, StoredAccount)>> {
        Ok(self
            .read_lock()?
            .iter()
            .filter(|(_, account)| account.kind == kind)
            .map(|(address, account)| (*address, account.clone()))
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<Vec<StoredAccount>> {
        let mut accounts = self.write_lock()?;
        check_batch(&accounts, &batch)?;

        let op_count = batch.len();
        let mut closed = Vec::new();
        for op in batch.ops() {
            match op {
                BatchOp::Create { address, account } | BatchOp::Update { address, account } => {
                    accounts.insert(*address, account.clone());
                }
                BatchOp::Close { address } => {
                    if let Some(account) = accounts.remove(address) {
                        closed.push(account);
                    }
                }
            }
        }
        debug!(ops = op_count, closed = closed.len(), "batch committed");
        Ok(closed)
    }
}

impl std::fmt::Debug for InMemoryAccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.accounts.read().map(|a| a.len()).unwrap_or_default();
        f.debug_struct("InMemoryAccountStore")
            .field("account_count", &count)
            .finish()
    }
}
