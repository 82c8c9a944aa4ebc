//! # Moderator Registry
//!
//! Moderators publish their node record under `digest("moderators")`. The
//! subkey covers only the GUID and signed key, so a node that comes back on
//! a new address still replaces or retracts its own entry.

use super::MarketContext;
use crate::domain::{
    verify_node_identity, wire, ContentHash, MarketError, NodeIdentity, OverlayKey,
    PublicKeyEntry, StoredValue,
};
use market_telemetry::{log_event, log_peer_event};
use std::sync::Arc;

const COMPONENT: &str = "moderator";

/// Moderator registry component.
#[derive(Clone)]
pub struct ModeratorRegistry {
    ctx: Arc<MarketContext>,
}

impl ModeratorRegistry {
    /// Create the component.
    pub fn new(ctx: Arc<MarketContext>) -> Self {
        Self { ctx }
    }

    /// Publish this node as a moderator.
    ///
    /// Signs the payment master key into the local profile, sets the
    /// moderator flag and stores the node record in the overlay.
    pub async fn make_moderator(&self) -> Result<(), MarketError> {
        let identity = &self.ctx.identity;
        let master_key = identity.payment_master_pubkey();
        if master_key.is_empty() {
            return Err(MarketError::PolicyViolation(
                "no payment master key configured".to_string(),
            ));
        }

        let mut profile = self.ctx.profile.get()?;
        profile.bitcoin_key = Some(PublicKeyEntry {
            public_key: master_key.to_vec(),
            signature: identity.sign(master_key),
        });
        profile.moderator = true;
        self.ctx.profile.update(profile)?;

        let record = wire::encode(identity.node())?;
        let subkey = record_subkey(identity.node());
        if !self.ctx.overlay.set(self.key(), subkey, record).await {
            return Err(MarketError::Rejected("moderator record refused".to_string()));
        }
        log_peer_event!(info, COMPONENT, "Published moderator record", identity.guid());
        Ok(())
    }

    /// Retract the moderator record and clear the profile flag.
    pub async fn unmake_moderator(&self) -> Result<(), MarketError> {
        let identity = &self.ctx.identity;
        let subkey = record_subkey(identity.node());
        let signature = identity.sign(&subkey);

        if !self.ctx.overlay.delete(self.key(), subkey, signature).await {
            log_event!(debug, COMPONENT, "No moderator record to remove");
        }

        let mut profile = self.ctx.profile.get()?;
        profile.moderator = false;
        self.ctx.profile.update(profile)?;
        log_peer_event!(info, COMPONENT, "Retracted moderator record", identity.guid());
        Ok(())
    }

    /// Published moderators whose GUID proof-of-work holds.
    pub async fn fetch_moderators(&self) -> Vec<NodeIdentity> {
        let limit = self.ctx.config.max_payload_bytes;
        self.ctx
            .overlay
            .get(&self.key())
            .await
            .iter()
            .filter_map(|raw| match decode_moderator(raw, limit) {
                Ok(node) => Some(node),
                Err(e) => {
                    log_event!(debug, COMPONENT, "Ignoring moderator record", error = %e);
                    None
                }
            })
            .collect()
    }

    fn key(&self) -> OverlayKey {
        ContentHash::of(self.ctx.config.moderators_key.as_bytes())
    }
}

fn record_subkey(node: &NodeIdentity) -> Vec<u8> {
    let mut bound = node.id.as_bytes().to_vec();
    bound.extend_from_slice(node.signed_pubkey.as_bytes());
    ContentHash::of(&bound).to_vec()
}

fn decode_moderator(raw: &[u8], limit: u64) -> Result<NodeIdentity, MarketError> {
    let stored: StoredValue = wire::decode(raw, limit)?;
    let node: NodeIdentity = wire::decode(&stored.serialized_data, limit)?;
    verify_node_identity(&node.signed_pubkey, &node.id)?;
    Ok(node)
}
