use quill_types::{Address, Identity};

use crate::hasher::ContentHasher;

/// Seed tag of note addresses.
pub const NOTE_SEED: &[u8] = b"blog";
/// Seed tag of like mark addresses.
pub const LIKE_SEED: &[u8] = b"like";
/// Seed tag of save mark addresses.
pub const SAVE_SEED: &[u8] = b"saved";

/// Maximum number of seeds in one derivation.
pub const MAX_SEEDS: usize = 16;
/// Maximum combined length, in bytes, of all seeds in one derivation.
pub const MAX_DERIVATION_INPUT: usize = 160;

const DERIVATION_DOMAIN: &[u8] = b"quill-address-v1:";
const DEFAULT_NAMESPACE: &str = "quill-notes";

/// Deterministic, one-way mapping from seeds to storage addresses.
///
/// An address is the BLAKE3 hash of a domain tag, the program namespace and
/// every seed prefixed with its length. The length prefix makes the encoding
/// injective, so `["blog", owner, "ab"]` and `["blogo", ...]` can never meet.
/// Derivation is pure: clients compute the same addresses the program does
/// without touching storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressDeriver {
    program: Address,
}

impl AddressDeriver {
    /// Deriver scoped to an explicit program namespace address.
    pub fn new(program: Address) -> Self {
        Self { program }
    }

    /// Deriver whose namespace address is derived from a name.
    pub fn for_namespace(name: &str) -> Self {
        Self::new(Address::from_bytes(ContentHasher::NAMESPACE.hash(name.as_bytes())))
    }

    /// The namespace address every derivation is scoped to.
    pub fn program(&self) -> Address {
        self.program
    }

    /// Derive an address from raw seeds.
    pub fn derive(&self, seeds: &[&[u8]]) -> Result<Address, DerivationError> {
        if seeds.len() > MAX_SEEDS {
            return Err(DerivationError::TooManySeeds {
                count: seeds.len(),
                max: MAX_SEEDS,
            });
        }
        let len: usize = seeds.iter().map(|s| s.len()).sum();
        if len > MAX_DERIVATION_INPUT {
            return Err(DerivationError::InputTooLong {
                len,
                max: MAX_DERIVATION_INPUT,
            });
        }

        let mut hasher = blake3::Hasher::new();
        hasher.update(DERIVATION_DOMAIN);
        hasher.update(self.program.as_bytes());
        for seed in seeds {
            // Bounded by MAX_DERIVATION_INPUT above.
            hasher.update(&(seed.len() as u32).to_le_bytes());
            hasher.update(seed);
        }
        Ok(Address::from_bytes(*hasher.finalize().as_bytes()))
    }

    /// Address of the note `title` owned by `creator`.
    pub fn note_address(&self, creator: &Identity, title: &str) -> Result<Address, DerivationError> {
        self.derive(&[NOTE_SEED, creator.as_bytes().as_slice(), title.as_bytes()])
    }

    /// Address of the like mark linking `user` to `note`.
    pub fn like_address(&self, user: &Identity, note: &Address) -> Result<Address, DerivationError> {
        self.derive(&[LIKE_SEED, user.as_bytes().as_slice(), note.as_bytes().as_slice()])
    }

    /// Address of the save mark linking `user` to `note`.
    pub fn save_address(&self, user: &Identity, note: &Address) -> Result<Address, DerivationError> {
        self.derive(&[SAVE_SEED, user.as_bytes().as_slice(), note.as_bytes().as_slice()])
    }
}

impl Default for AddressDeriver {
    fn default() -> Self {
        Self::for_namespace(DEFAULT_NAMESPACE)
    }
}

/// Errors from address derivation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DerivationError {
    #[error("derivation input is {len} bytes, maximum is {max}")]
    InputTooLong { len: usize, max: usize },
    #[error("derivation uses {count} seeds, maximum is {max}")]
    TooManySeeds { count: usize, max: usize },
}
