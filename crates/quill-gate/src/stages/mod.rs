//! Built-in guard stages.

pub mod like_policy;
pub mod ownership;
pub mod signature;

pub use like_policy::LikePolicyStage;
pub use ownership::OwnershipStage;
pub use signature::SignatureStage;
