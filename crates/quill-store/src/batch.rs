use quill_types::Address;

use crate::account::StoredAccount;

/// A single mutation inside a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    /// Allocate a new account. Fails if the address is occupied.
    Create {
        address: Address,
        account: StoredAccount,
    },
    /// Overwrite an existing account of the same kind.
    Update {
        address: Address,
        account: StoredAccount,
    },
    /// Destroy an existing account.
    Close { address: Address },
}

impl BatchOp {
    /// The address this operation touches.
    pub fn address(&self) -> &Address {
        match self {
            Self::Create { address, .. } | Self::Update { address, .. } | Self::Close { address } => {
                address
            }
        }
    }
}

/// Ordered set of mutations committed all-or-nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(mut self, address: Address, account: StoredAccount) -> Self {
        self.ops.push(BatchOp::Create { address, account });
        self
    }

    pub fn update(mut self, address: Address, account: StoredAccount) -> Self {
        self.ops.push(BatchOp::Update { address, account });
        self
    }

    pub fn close(mut self, address: Address) -> Self {
        self.ops.push(BatchOp::Close { address });
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
