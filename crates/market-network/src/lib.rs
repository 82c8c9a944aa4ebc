//! # Market Network
//!
//! Peer-to-peer protocol core of a decentralized marketplace.
//!
//! **Architecture:** Hexagonal (ports/adapters)
//!
//! ## Purpose
//!
//! Every byte a peer sends is untrusted. This crate verifies it before it is
//! cached, followed up or shown to the application:
//! - GUIDs are bound to signing keys by a hash with a proof-of-work window
//! - Content is addressed by hash and checked on arrival
//! - Direct messages are signed and sealed, with an overlay mailbox for
//!   offline recipients
//! - Social-graph records are signed by their subjects
//!
//! ## Trust Checks
//!
//! | Check | Applies to |
//! |-------|------------|
//! | GUID binding + proof-of-work | nodes, followers, message senders, moderators |
//! | Content hash | contracts, images |
//! | Ed25519 signature | profiles, metadata, listings, follow records, messages, order acks |
//! | Moderator key chain | moderators listed in a contract |
//!
//! Any failed check yields an absent or negative result at the API; the
//! failing check is only visible in DEBUG logs.
//!
//! ## Module Structure
//!
//! ```text
//! market-network/
//! ├── domain/          # Identities, entities, contracts, verification, wire codec
//! ├── ports/           # MarketApi (inbound) + RPC, overlay and store traits (outbound)
//! ├── service/         # MarketService and its protocol components
//! ├── adapters/        # In-memory and file-backed port implementations
//! └── config.rs        # MarketConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use adapters::{
    FileResourceCache, GuidBoundVerifier, InMemoryFollowStore, InMemoryOverlay,
    InMemoryProfileStore, InMemoryResourceCache, NoPgpBackend,
};
pub use config::MarketConfig;
pub use domain::{
    mailbox_key, verify_identity, verify_key_chain, verify_node_identity, verify_signature,
    ContentHash, Contract, Follower, Followers, Following, FollowingUser, Guid, ListingMetadata,
    Listings, LocalIdentity, MarketError, Metadata, MessageType, NodeIdentity, Profile,
    SignedPubkey, VerificationError,
};
pub use ports::{
    CredentialVerifier, FollowStore, MarketApi, MarketRpc, MessageListener, Overlay,
    ProfileStore, ResourceCache, RpcResponse,
};
pub use service::{
    DeliveryOutcome, MarketContext, MarketService, Messenger, ModeratorRegistry,
    PurchaseHandshake, ResourceFetcher, SocialGraph,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
