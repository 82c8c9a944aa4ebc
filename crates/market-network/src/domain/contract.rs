//! # Contract Document
//!
//! Contracts travel as JSON with preserved key order:
//!
//! ```text
//! {
//!     "vendor_offer": { "listing": {...}, "signature": "<hex>" },
//!     "buyer_order": {...},                 // after purchase
//!     "vendor_order_confirmation": {...}    // after confirmation
//! }
//! ```
//!
//! Content addressing hashes the raw bytes as received. Signatures and the
//! order id are computed over the canonical form: four-space indentation,
//! one item per line, `": "` between key and value, UTF-8 without escaping.

use super::errors::{MarketError, VerificationError};
use super::identity::LocalIdentity;
use super::value_objects::{ContentHash, Guid};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{json, Value};

const VENDOR_OFFER: &str = "vendor_offer";
const BUYER_ORDER: &str = "buyer_order";
const ORDER_CONFIRMATION: &str = "vendor_order_confirmation";

/// Serialize `value` in canonical form.
pub fn canonical_json(value: &Value) -> Result<Vec<u8>, MarketError> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| MarketError::Encoding(e.to_string()))?;
    Ok(out)
}

/// Key and owner signature, both hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChainEntry {
    /// Hex key bytes.
    pub key: String,
    /// Hex signature over the key bytes.
    pub signature: String,
}

impl KeyChainEntry {
    /// Hex-encode a key and its signature.
    pub fn new(key: &[u8], signature: &[u8]) -> Self {
        Self {
            key: hex::encode(key),
            signature: hex::encode(signature),
        }
    }

    /// Decoded key bytes.
    pub fn key_bytes(&self) -> Result<Vec<u8>, VerificationError> {
        hex::decode(&self.key).map_err(|_| VerificationError::InvalidPublicKey)
    }

    /// Decoded signature bytes.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, VerificationError> {
        hex::decode(&self.signature).map_err(|_| VerificationError::InvalidSignature)
    }
}

/// A moderator's key chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorKeys {
    /// Signing key, with `signature` the self-signature of the signed key.
    pub signing: KeyChainEntry,
    /// X25519 key signed by the signing key.
    pub encryption: KeyChainEntry,
    /// Payment key signed by the signing key.
    pub bitcoin: KeyChainEntry,
}

/// Moderator attestation listed in a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorEntry {
    /// Hex GUID.
    pub guid: String,
    /// Key chain.
    pub pubkeys: ModeratorKeys,
}

impl ModeratorEntry {
    /// Key chain for a local identity.
    pub fn for_identity(identity: &LocalIdentity) -> Self {
        let encryption_key = identity.encryption_public_key();
        let payment_key = identity.payment_master_pubkey();
        Self {
            guid: identity.guid().hex(),
            pubkeys: ModeratorKeys {
                signing: KeyChainEntry::new(
                    identity.signed_pubkey().verify_key(),
                    identity.signed_pubkey().signature(),
                ),
                encryption: KeyChainEntry::new(&encryption_key, &identity.sign(&encryption_key)),
                bitcoin: KeyChainEntry::new(payment_key, &identity.sign(payment_key)),
            },
        }
    }
}

/// A contract as exchanged between buyer, vendor and moderators.
#[derive(Clone, Debug, PartialEq)]
pub struct Contract(Value);

impl Contract {
    /// Parse raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MarketError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| MarketError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wrap a JSON object.
    pub fn from_value(value: Value) -> Result<Self, MarketError> {
        if !value.is_object() {
            return Err(MarketError::Malformed("contract is not an object".to_string()));
        }
        Ok(Self(value))
    }

    /// Vendor side: sign `listing` and wrap it in a vendor offer.
    pub fn signed_offer(listing: Value, vendor: &LocalIdentity) -> Result<Self, MarketError> {
        let signature = vendor.sign(&canonical_json(&listing)?);
        Self::from_value(json!({
            "vendor_offer": {
                "listing": listing,
                "signature": hex::encode(signature),
            }
        }))
    }

    /// Underlying JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Canonical bytes of the whole contract.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, MarketError> {
        canonical_json(&self.0)
    }

    /// Attach the buyer's order.
    pub fn set_buyer_order(&mut self, order: Value) {
        if let Some(object) = self.0.as_object_mut() {
            object.insert(BUYER_ORDER.to_string(), order);
        }
    }

    /// Attach the vendor's confirmation.
    pub fn set_order_confirmation(&mut self, confirmation: Value) {
        if let Some(object) = self.0.as_object_mut() {
            object.insert(ORDER_CONFIRMATION.to_string(), confirmation);
        }
    }

    /// `vendor_offer.listing`.
    pub fn listing(&self) -> Result<&Value, MarketError> {
        self.field(&[VENDOR_OFFER, "listing"])
    }

    /// Decoded vendor signature over the canonical listing.
    pub fn vendor_signature(&self) -> Result<Vec<u8>, MarketError> {
        self.hex_field(&[VENDOR_OFFER, "signature"])
    }

    /// Moderators listed in the offer; empty if none.
    pub fn moderators(&self) -> Result<Vec<ModeratorEntry>, MarketError> {
        match self.listing()?.get("moderators") {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| MarketError::Malformed(format!("moderators: {}", e))),
        }
    }

    /// `listing.item.image_hashes`; empty if absent.
    pub fn image_hashes(&self) -> Result<Vec<ContentHash>, MarketError> {
        let hashes = match self
            .listing()?
            .get("item")
            .and_then(|item| item.get("image_hashes"))
        {
            None => return Ok(Vec::new()),
            Some(value) => value,
        };
        let array = hashes
            .as_array()
            .ok_or_else(|| MarketError::Malformed("image_hashes is not a list".to_string()))?;
        array
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .and_then(ContentHash::from_hex)
                    .ok_or_else(|| MarketError::Malformed("invalid image hash".to_string()))
            })
            .collect()
    }

    /// Vendor's X25519 key from `listing.id.pubkeys.encryption`.
    pub fn vendor_encryption_key(&self) -> Result<Vec<u8>, MarketError> {
        self.hex_field(&[VENDOR_OFFER, "listing", "id", "pubkeys", "encryption"])
    }

    /// Buyer's X25519 key from `buyer_order.order.id.pubkeys.encryption`.
    pub fn buyer_encryption_key(&self) -> Result<Vec<u8>, MarketError> {
        self.hex_field(&[BUYER_ORDER, "order", "id", "pubkeys", "encryption"])
    }

    /// Buyer's GUID from `buyer_order.order.id.guid`.
    pub fn buyer_guid(&self) -> Result<Guid, MarketError> {
        let hex = self.str_field(&[BUYER_ORDER, "order", "id", "guid"])?;
        Guid::from_hex(hex).ok_or_else(|| MarketError::Malformed("invalid buyer guid".to_string()))
    }

    /// Address the vendor must sign to acknowledge an order.
    pub fn buyer_payment_address(&self) -> Result<&str, MarketError> {
        self.str_field(&[BUYER_ORDER, "order", "payment", "address"])
    }

    /// `vendor_order_confirmation`.
    pub fn order_confirmation(&self) -> Result<&Value, MarketError> {
        self.field(&[ORDER_CONFIRMATION])
    }

    /// Hash of the canonical contract without its confirmation. Buyer and
    /// vendor compute the same id before and after confirmation.
    pub fn order_id(&self) -> Result<ContentHash, MarketError> {
        let mut value = self.0.clone();
        if let Some(object) = value.as_object_mut() {
            object.shift_remove(ORDER_CONFIRMATION);
        }
        Ok(ContentHash::of(&canonical_json(&value)?))
    }

    fn field(&self, path: &[&str]) -> Result<&Value, MarketError> {
        let mut current = &self.0;
        for key in path {
            current = current
                .get(*key)
                .ok_or_else(|| MarketError::Malformed(format!("missing {}", path.join("."))))?;
        }
        Ok(current)
    }

    fn str_field(&self, path: &[&str]) -> Result<&str, MarketError> {
        self.field(path)?
            .as_str()
            .ok_or_else(|| MarketError::Malformed(format!("{} is not a string", path.join("."))))
    }

    fn hex_field(&self, path: &[&str]) -> Result<Vec<u8>, MarketError> {
        hex::decode(self.str_field(path)?)
            .map_err(|_| MarketError::Malformed(format!("{} is not hex", path.join("."))))
    }
}
