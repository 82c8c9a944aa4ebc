//! # Market Service
//!
//! Protocol components over one explicit [`MarketContext`]:
//!
//! | Component | Responsibility |
//! |-----------|----------------|
//! | [`ResourceFetcher`] | fetch-verify-cache of contracts, images, profiles, listings |
//! | [`Messenger`] | ephemeral-box messages with mailbox fallback, inbox draining |
//! | [`SocialGraph`] | follow/unfollow, verified follower lists, notifications |
//! | [`PurchaseHandshake`] | order submission and confirmation |
//! | [`ModeratorRegistry`] | moderator publication and discovery |
//!
//! Component methods return `Result<_, MarketError>`. [`MarketService`]
//! implements [`crate::ports::MarketApi`] on top of them and is the only
//! place results collapse to absent/negative values.

mod api;
mod fetch;
mod helpers;
mod messaging;
mod moderator;
mod purchase;
mod social;

pub use fetch::ResourceFetcher;
pub use messaging::{DeliveryOutcome, Messenger};
pub use moderator::ModeratorRegistry;
pub use purchase::PurchaseHandshake;
pub use social::SocialGraph;

use crate::adapters::{InMemoryFollowStore, InMemoryProfileStore, NoPgpBackend};
use crate::config::MarketConfig;
use crate::domain::LocalIdentity;
use crate::ports::{
    CredentialVerifier, FollowStore, MarketRpc, Overlay, ProfileStore, ResourceCache,
};
use std::sync::Arc;

/// Everything a protocol operation may touch.
pub struct MarketContext {
    /// Local keys and node record.
    pub identity: LocalIdentity,
    /// RPC transport.
    pub rpc: Arc<dyn MarketRpc>,
    /// Shared overlay.
    pub overlay: Arc<dyn Overlay>,
    /// Content-addressed cache.
    pub cache: Arc<dyn ResourceCache>,
    /// Follower/following store.
    pub follows: Arc<dyn FollowStore>,
    /// Local profile.
    pub profile: Arc<dyn ProfileStore>,
    /// PGP credential checker.
    pub credentials: Arc<dyn CredentialVerifier>,
    /// Configuration.
    pub config: MarketConfig,
}

impl MarketContext {
    /// Context with in-memory follow/profile stores and no PGP backend.
    pub fn new(
        identity: LocalIdentity,
        rpc: Arc<dyn MarketRpc>,
        overlay: Arc<dyn Overlay>,
        cache: Arc<dyn ResourceCache>,
    ) -> Self {
        Self {
            identity,
            rpc,
            overlay,
            cache,
            follows: Arc::new(InMemoryFollowStore::new()),
            profile: Arc::new(InMemoryProfileStore::default()),
            credentials: Arc::new(NoPgpBackend),
            config: MarketConfig::default(),
        }
    }

    /// Replace the follow store.
    pub fn with_follow_store(mut self, follows: Arc<dyn FollowStore>) -> Self {
        self.follows = follows;
        self
    }

    /// Replace the profile store.
    pub fn with_profile_store(mut self, profile: Arc<dyn ProfileStore>) -> Self {
        self.profile = profile;
        self
    }

    /// Replace the credential checker.
    pub fn with_credential_verifier(mut self, credentials: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: MarketConfig) -> Self {
        self.config = config;
        self
    }
}

/// Market Service - the protocol core.
#[derive(Clone)]
pub struct MarketService {
    ctx: Arc<MarketContext>,
}

impl MarketService {
    /// Create the service.
    pub fn new(ctx: MarketContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Shared context.
    pub fn context(&self) -> &MarketContext {
        &self.ctx
    }

    /// Fetch-verify-cache component.
    pub fn fetcher(&self) -> ResourceFetcher {
        ResourceFetcher::new(self.ctx.clone())
    }

    /// Messaging component.
    pub fn messenger(&self) -> Messenger {
        Messenger::new(self.ctx.clone())
    }

    /// Social graph component.
    pub fn social(&self) -> SocialGraph {
        SocialGraph::new(self.ctx.clone())
    }

    /// Purchase handshake component.
    pub fn purchases(&self) -> PurchaseHandshake {
        PurchaseHandshake::new(self.ctx.clone())
    }

    /// Moderator registry component.
    pub fn moderators(&self) -> ModeratorRegistry {
        ModeratorRegistry::new(self.ctx.clone())
    }
}
