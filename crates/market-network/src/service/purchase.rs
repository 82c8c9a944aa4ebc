//! # Purchase Handshake
//!
//! The buyer seals the contract with its order to the vendor and gets back
//! the vendor's signature over the payment address. The vendor seals the
//! confirmed contract back to the buyer, or leaves the confirmation in the
//! buyer's mailbox tagged with the order id.

use super::helpers::{first_part, require_address};
use super::messaging::{DeliveryOutcome, Messenger};
use super::MarketContext;
use crate::domain::{verify_signature, Contract, Guid, MarketError, MessageType, NodeIdentity};
use market_telemetry::log_peer_event;
use shared_crypto::seal;
use std::sync::Arc;

const COMPONENT: &str = "purchase";

/// Purchase handshake component.
#[derive(Clone)]
pub struct PurchaseHandshake {
    ctx: Arc<MarketContext>,
}

impl PurchaseHandshake {
    /// Create the component.
    pub fn new(ctx: Arc<MarketContext>) -> Self {
        Self { ctx }
    }

    /// Send the contract, buyer order included, to the vendor.
    ///
    /// Returns the vendor's signature over the buyer's payment address once
    /// it verifies against the vendor's signing key.
    pub async fn purchase(
        &self,
        vendor: &NodeIdentity,
        contract: &Contract,
    ) -> Result<Vec<u8>, MarketError> {
        require_address(vendor)?;
        let sealed = seal(&contract.vendor_encryption_key()?, &contract.to_canonical_bytes()?)?;

        let response = self
            .ctx
            .rpc
            .call_order(vendor, sealed.ephemeral_public_key, sealed.ciphertext)
            .await;
        let signature = first_part(&response, vendor)?;
        verify_signature(
            vendor.signed_pubkey.verify_key(),
            contract.buyer_payment_address()?.as_bytes(),
            signature,
        )?;

        log_peer_event!(info, COMPONENT, "Order accepted by vendor", vendor.id);
        Ok(signature.to_vec())
    }

    /// Deliver the confirmed contract to the buyer.
    ///
    /// A buyer that cannot be resolved, or does not answer, gets the
    /// confirmation through its mailbox as an order message whose subject is
    /// the hex order id. A buyer that answers without acknowledging is a
    /// rejection.
    pub async fn confirm_order(
        &self,
        buyer: &Guid,
        contract: &Contract,
    ) -> Result<DeliveryOutcome, MarketError> {
        let encryption_key = contract.buyer_encryption_key()?;

        let live = self
            .ctx
            .overlay
            .resolve(buyer)
            .await
            .filter(NodeIdentity::is_reachable);
        if let Some(node) = live {
            let sealed = seal(&encryption_key, &contract.to_canonical_bytes()?)?;
            let response = self
                .ctx
                .rpc
                .call_order_confirmation(&node, sealed.ephemeral_public_key, sealed.ciphertext)
                .await;
            if response.success {
                if !response.acknowledged() {
                    return Err(MarketError::Rejected(
                        "order confirmation not acknowledged".to_string(),
                    ));
                }
                log_peer_event!(info, COMPONENT, "Order confirmation delivered", buyer);
                return Ok(DeliveryOutcome::Delivered);
            }
            log_peer_event!(debug, COMPONENT, "Buyer did not answer, using mailbox", buyer);
        }

        let order_id = contract.order_id()?;
        let body = serde_json::to_string(contract.order_confirmation()?)
            .map_err(|e| MarketError::Encoding(e.to_string()))?;
        Messenger::new(self.ctx.clone())
            .send_message(
                &NodeIdentity::from_guid(*buyer),
                &encryption_key,
                MessageType::Order,
                &body,
                Some(&order_id.hex()),
                true,
            )
            .await
    }
}
