//! # Encrypted Messaging
//!
//! Direct messages are signed, sealed to the recipient's X25519 key with a
//! one-time key pair, and delivered by RPC. When the recipient is offline the
//! sealed box is parked in its overlay mailbox at `digest(recipient_id)`.

use super::helpers::unix_timestamp;
use super::MarketContext;
use crate::domain::{
    mailbox_key, verify_node_identity, verify_signature, wire, Guid, MarketError, MessageType,
    NodeIdentity, PlaintextMessage, StoredValue,
};
use crate::ports::MessageListener;
use market_telemetry::{log_event, log_peer_event};
use shared_crypto::{open, seal, SealedBox};
use std::sync::Arc;

const COMPONENT: &str = "messaging";

/// Where an outbound message ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The recipient accepted the direct RPC.
    Delivered,
    /// Parked in the recipient's overlay mailbox.
    Stored,
}

/// Messaging component.
#[derive(Clone)]
pub struct Messenger {
    ctx: Arc<MarketContext>,
}

impl Messenger {
    /// Create the component.
    pub fn new(ctx: Arc<MarketContext>) -> Self {
        Self { ctx }
    }

    /// Sign, seal and deliver a message.
    ///
    /// Bodies over `max_message_bytes` are rejected before anything is sent.
    /// Unless `store_only` is set, a reachable recipient is tried directly
    /// first; otherwise, or if that fails, the box goes to the mailbox.
    pub async fn send_message(
        &self,
        recipient: &NodeIdentity,
        recipient_encryption_key: &[u8],
        message_type: MessageType,
        body: &str,
        subject: Option<&str>,
        store_only: bool,
    ) -> Result<DeliveryOutcome, MarketError> {
        let limit = self.ctx.config.max_message_bytes;
        if body.len() > limit {
            return Err(MarketError::PolicyViolation(format!(
                "message of {} bytes exceeds {}",
                body.len(),
                limit
            )));
        }

        let message = self.signed_message(message_type, body, subject)?;
        let sealed = seal(recipient_encryption_key, &wire::encode(&message)?)?;

        if !store_only && recipient.is_reachable() {
            let response = self
                .ctx
                .rpc
                .call_message(recipient, sealed.ephemeral_public_key, sealed.ciphertext.clone())
                .await;
            if response.success {
                log_peer_event!(debug, COMPONENT, "Message delivered", recipient.id);
                return Ok(DeliveryOutcome::Delivered);
            }
            log_peer_event!(debug, COMPONENT, "Direct delivery failed, using mailbox", recipient.id);
        }

        self.store_in_mailbox(&recipient.id, sealed).await
    }

    /// Deliver every verifiable mailbox entry to `listener`.
    ///
    /// Waits for the transport to become ready, polling at
    /// `inbox_retry_delay`. Each decodable entry is deleted afterwards
    /// whether or not it verified. Returns the number delivered.
    pub async fn drain_inbox(&self, listener: &dyn MessageListener) -> Result<usize, MarketError> {
        while !self.ctx.rpc.is_ready() {
            tokio::time::sleep(self.ctx.config.inbox_retry_delay()).await;
        }

        let key = mailbox_key(&self.ctx.identity.guid());
        let entries = self.ctx.overlay.get(&key).await;
        let mut delivered = 0;

        for raw in entries {
            let stored: StoredValue = match wire::decode(&raw, self.ctx.config.max_payload_bytes) {
                Ok(stored) => stored,
                Err(e) => {
                    log_event!(debug, COMPONENT, "Skipping undecodable mailbox entry", error = %e);
                    continue;
                }
            };

            match self.open_entry(&stored) {
                Ok(message) => {
                    listener.notify(
                        message.sender_guid,
                        message.encryption_pubkey,
                        message.subject,
                        message.message_type.name(),
                        message.message,
                    );
                    delivered += 1;
                }
                Err(e) => {
                    log_event!(debug, COMPONENT, "Discarding unverifiable mailbox entry", error = %e);
                }
            }

            let signature = self.ctx.identity.sign(&stored.value_key);
            if !self.ctx.overlay.delete(key, stored.value_key, signature).await {
                log_event!(debug, COMPONENT, "Mailbox entry was already gone");
            }
        }

        log_event!(info, COMPONENT, "Inbox drained", delivered = delivered);
        Ok(delivered)
    }

    fn signed_message(
        &self,
        message_type: MessageType,
        body: &str,
        subject: Option<&str>,
    ) -> Result<PlaintextMessage, MarketError> {
        let identity = &self.ctx.identity;
        let profile = self.ctx.profile.get()?;

        let mut message = PlaintextMessage {
            sender_guid: identity.guid(),
            signed_pubkey: identity.signed_pubkey().clone(),
            encryption_pubkey: identity.encryption_public_key().to_vec(),
            message_type,
            subject: subject.map(str::to_string),
            message: body.to_string(),
            handle: profile.handle,
            avatar_hash: profile.avatar_hash,
            timestamp: unix_timestamp(),
            signature: Vec::new(),
        };
        message.signature = identity.sign(&message.signing_bytes()?);
        Ok(message)
    }

    async fn store_in_mailbox(
        &self,
        recipient: &Guid,
        sealed: SealedBox,
    ) -> Result<DeliveryOutcome, MarketError> {
        let stored = self
            .ctx
            .overlay
            .set(
                mailbox_key(recipient),
                sealed.ephemeral_public_key.to_vec(),
                sealed.ciphertext,
            )
            .await;
        if !stored {
            return Err(MarketError::Rejected("mailbox write refused".to_string()));
        }
        log_peer_event!(debug, COMPONENT, "Message stored in mailbox", recipient);
        Ok(DeliveryOutcome::Stored)
    }

    fn open_entry(&self, stored: &StoredValue) -> Result<PlaintextMessage, MarketError> {
        let plaintext = open(
            self.ctx.identity.encryption_keys(),
            &stored.value_key,
            &stored.serialized_data,
        )?;
        let message: PlaintextMessage = wire::decode(&plaintext, self.ctx.config.max_payload_bytes)?;
        verify_signature(
            message.signed_pubkey.verify_key(),
            &message.signing_bytes()?,
            &message.signature,
        )?;
        verify_node_identity(&message.signed_pubkey, &message.sender_guid)?;
        Ok(message)
    }
}
