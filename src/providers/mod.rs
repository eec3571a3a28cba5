//! Provider capability.
//!
//! Concrete backends live with the caller; this module only defines the
//! seam they plug into.

pub mod traits;

pub use traits::CommitProvider;
