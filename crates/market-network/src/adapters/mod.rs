//! # Adapters
//!
//! Concrete implementations of the outbound ports.

pub mod credentials;
pub mod file_cache;
pub mod memory;

pub use credentials::{GuidBoundVerifier, NoPgpBackend};
pub use file_cache::FileResourceCache;
pub use memory::{InMemoryFollowStore, InMemoryOverlay, InMemoryProfileStore, InMemoryResourceCache};
