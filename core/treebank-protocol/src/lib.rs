#![no_std] // Shared with the wasm surface

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(any(feature = "std", test))]
extern crate std;

pub mod ids;
pub mod tagset;

// Re-export core types for convenience
pub use ids::{SentenceId, TokenId};
pub use tagset::*;

pub mod model;
pub use model::*;
