use quill_types::Address;

use crate::account::{AccountKind, StoredAccount};
use crate::batch::WriteBatch;
use crate::error::StoreResult;

/// Address-keyed account store.
///
/// All implementations must satisfy these invariants:
/// - An address holds at most one account.
/// - `commit` applies every operation of a batch or none of them.
/// - `Create` on an occupied address fails with `AlreadyExists`, including
///   when the occupant was created earlier in the same batch.
/// - `Update` and `Close` on a vacant address fail with `NotFound`.
/// - The store never interprets account data.
pub trait AccountStore: Send + Sync {
    /// Read an account. Returns `Ok(None)` if the address is vacant.
    fn read(&self, address: &Address) -> StoreResult<Option<StoredAccount>>;

    /// Check whether an address is occupied.
    fn exists(&self, address: &Address) -> StoreResult<bool> {
        Ok(self.read(address)?.is_some())
    }

    /// Every account of one kind, sorted by address.
    fn scan(&self, kind: AccountKind) -> StoreResult<Vec<(Address, StoredAccount)>>;

    /// Atomically apply a batch.
    ///
    /// Returns the accounts removed by `Close` operations, in batch order.
    fn commit(&self, batch: WriteBatch) -> StoreResult<Vec<StoredAccount>>;
}
