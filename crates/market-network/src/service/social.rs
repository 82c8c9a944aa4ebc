//! # Social Graph
//!
//! Follow records are signed by the follower; following entries carry
//! metadata signed by the followed user. Lists fetched from peers are
//! filtered entry by entry, so one forged record never hides the rest.

use super::helpers::{require_address, response_parts, verified_payload};
use super::MarketContext;
use crate::domain::{
    verify_node_identity, verify_signature, wire, Follower, Followers, Following, FollowingUser,
    Guid, MarketError, Metadata, NodeIdentity, VerificationError,
};
use crate::ports::ACK;
use futures::future::join_all;
use market_telemetry::{log_event, log_peer_event};
use std::sync::Arc;

const COMPONENT: &str = "social";

/// Prefix of the signed unfollow token.
const UNFOLLOW_PREFIX: &[u8] = b"unfollow:";

/// Social graph component.
#[derive(Clone)]
pub struct SocialGraph {
    ctx: Arc<MarketContext>,
}

impl SocialGraph {
    /// Create the component.
    pub fn new(ctx: Arc<MarketContext>) -> Self {
        Self { ctx }
    }

    /// Send a signed follow record to `target`.
    ///
    /// The local following entry is written only after the target
    /// acknowledges, its GUID checks out and its returned metadata verifies.
    pub async fn follow(&self, target: &NodeIdentity) -> Result<(), MarketError> {
        require_address(target)?;
        let identity = &self.ctx.identity;

        let mut record = Follower {
            guid: identity.guid(),
            following: target.id,
            signed_pubkey: identity.signed_pubkey().clone(),
            metadata: self.ctx.profile.get()?.metadata(),
            signature: Vec::new(),
        };
        record.signature = identity.sign(&record.signing_bytes()?);
        let encoded = wire::encode(&record)?;
        let signature = identity.sign(&encoded);

        let response = self.ctx.rpc.call_follow(target, encoded, signature).await;
        match response_parts(&response, target)? {
            [ack, metadata, metadata_signature, ..] if ack.as_slice() == ACK => {
                verify_node_identity(&target.signed_pubkey, &target.id)?;
                verify_signature(target.signed_pubkey.verify_key(), metadata, metadata_signature)?;
                let metadata: Metadata = wire::decode(metadata, self.ctx.config.max_payload_bytes)?;

                self.ctx.follows.follow(FollowingUser {
                    guid: target.id,
                    signed_pubkey: target.signed_pubkey.clone(),
                    metadata,
                    signature: metadata_signature.clone(),
                })?;
                log_peer_event!(info, COMPONENT, "Now following", target.id);
                Ok(())
            }
            _ => Err(MarketError::Rejected("follow not acknowledged".to_string())),
        }
    }

    /// Send a signed unfollow token and drop the local following entry.
    ///
    /// The entry stays unless the target acknowledges.
    pub async fn unfollow(&self, target: &NodeIdentity) -> Result<(), MarketError> {
        require_address(target)?;

        let mut token = UNFOLLOW_PREFIX.to_vec();
        token.extend_from_slice(target.id.as_bytes());
        let response = self
            .ctx
            .rpc
            .call_unfollow(target, self.ctx.identity.sign(&token))
            .await;
        response_parts(&response, target)?;
        if !response.acknowledged() {
            return Err(MarketError::Rejected("unfollow not acknowledged".to_string()));
        }

        self.ctx.follows.unfollow(&target.id)?;
        log_peer_event!(info, COMPONENT, "Unfollowed", target.id);
        Ok(())
    }

    /// Followers of `node` whose records verify and name `node` as the
    /// followed GUID, in the order the peer sent them.
    pub async fn get_followers(&self, node: &NodeIdentity) -> Result<Followers, MarketError> {
        require_address(node)?;
        let response = self.ctx.rpc.call_get_followers(node).await;
        let data = verified_payload(&response, node)?;
        let mut followers: Followers = wire::decode(data, self.ctx.config.max_payload_bytes)?;

        followers.followers.retain(|follower| match verify_follower(follower, &node.id) {
            Ok(()) => true,
            Err(e) => {
                log_peer_event!(debug, COMPONENT, "Dropping follower record", follower.guid, error = %e);
                false
            }
        });
        Ok(followers)
    }

    /// Users `node` follows whose entries verify, in the order the peer sent them.
    pub async fn get_following(&self, node: &NodeIdentity) -> Result<Following, MarketError> {
        require_address(node)?;
        let response = self.ctx.rpc.call_get_following(node).await;
        let data = verified_payload(&response, node)?;
        let mut following: Following = wire::decode(data, self.ctx.config.max_payload_bytes)?;

        following.users.retain(|user| match verify_following_user(user) {
            Ok(()) => true,
            Err(e) => {
                log_peer_event!(debug, COMPONENT, "Dropping following entry", user.guid, error = %e);
                false
            }
        });
        Ok(following)
    }

    /// Notify every follower that resolves to a live address.
    ///
    /// Resolutions are issued together, then notifications are issued
    /// together to the live ones. Returns how many acknowledged.
    pub async fn send_notification(&self, message: &str) -> Result<usize, MarketError> {
        let limit = self.ctx.config.max_notification_chars;
        let length = message.chars().count();
        if length > limit {
            return Err(MarketError::PolicyViolation(format!(
                "notification of {} characters exceeds {}",
                length, limit
            )));
        }

        let followers = self.ctx.follows.followers()?.followers;
        let resolved = join_all(
            followers
                .iter()
                .map(|follower| self.ctx.overlay.resolve(&follower.guid)),
        )
        .await;
        let live: Vec<NodeIdentity> = resolved
            .into_iter()
            .flatten()
            .filter(NodeIdentity::is_reachable)
            .collect();

        let signature = self.ctx.identity.sign(message.as_bytes());
        let responses = join_all(live.iter().map(|node| {
            self.ctx
                .rpc
                .call_notify(node, message.to_string(), signature.clone())
        }))
        .await;
        let reached = responses.iter().filter(|r| r.acknowledged()).count();

        log_event!(
            info,
            COMPONENT,
            "Notification sent",
            followers = followers.len(),
            live = live.len(),
            reached = reached
        );
        Ok(reached)
    }
}

fn verify_follower(follower: &Follower, followed: &Guid) -> Result<(), MarketError> {
    if follower.following != *followed {
        return Err(VerificationError::FollowTargetMismatch.into());
    }
    verify_node_identity(&follower.signed_pubkey, &follower.guid)?;
    verify_signature(
        follower.signed_pubkey.verify_key(),
        &follower.signing_bytes()?,
        &follower.signature,
    )?;
    Ok(())
}

fn verify_following_user(user: &FollowingUser) -> Result<(), MarketError> {
    verify_node_identity(&user.signed_pubkey, &user.guid)?;
    verify_signature(
        user.signed_pubkey.verify_key(),
        &wire::encode(&user.metadata)?,
        &user.signature,
    )?;
    Ok(())
}
