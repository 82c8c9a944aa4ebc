//! # Identity & Trust Verification
//!
//! A GUID is the first 20 bytes of a SHA-512 binding hash over the identity's
//! key material. Bytes `[32..35)` of the same hash, read big-endian, must be
//! below [`POW_THRESHOLD`]; roughly one key in 335 000 qualifies.
//!
//! Two binding inputs exist and are kept apart on purpose:
//!
//! | Check | Hash input | Used for |
//! |-------|-----------|----------|
//! | [`verify_node_identity`] | `signedPubkey` | nodes, followers, message senders |
//! | [`verify_moderator_identity`] | `signature ‖ key` | moderators listed in contracts |

use super::contract::ModeratorEntry;
use super::errors::VerificationError;
use super::value_objects::{Guid, SignedPubkey, GUID_LEN};
use shared_crypto::hashing::binding_hash_many;
use shared_crypto::{binding_hash, verify_detached, BindingHash, CryptoError};
use std::ops::Range;

/// Window values must be strictly below this.
pub const POW_THRESHOLD: u32 = 50;

/// Bytes of the binding hash holding the proof-of-work window.
pub const POW_WINDOW: Range<usize> = 32..35;

/// Big-endian value of the proof-of-work window.
pub fn pow_window_value(hash: &BindingHash) -> u32 {
    hash[POW_WINDOW]
        .iter()
        .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte))
}

/// Check the proof-of-work window alone.
pub fn check_proof_of_work(hash: &BindingHash) -> Result<(), VerificationError> {
    let window = pow_window_value(hash);
    if window >= POW_THRESHOLD {
        return Err(VerificationError::ProofOfWorkNotMet { window });
    }
    Ok(())
}

fn check_binding(hash: &BindingHash, claimed: &Guid) -> Result<(), VerificationError> {
    check_proof_of_work(hash)?;
    if hash[..GUID_LEN] != claimed.as_bytes()[..] {
        return Err(VerificationError::GuidMismatch);
    }
    Ok(())
}

/// GUID bound to a signed key, if the key meets the proof-of-work constraint.
pub fn derive_guid(signed_pubkey: &SignedPubkey) -> Result<Guid, VerificationError> {
    let hash = binding_hash(signed_pubkey.as_bytes());
    check_proof_of_work(&hash)?;
    let mut guid = [0u8; GUID_LEN];
    guid.copy_from_slice(&hash[..GUID_LEN]);
    Ok(Guid::from_bytes(guid))
}

/// Node, follower and message-sender identities: hash of the signed key.
pub fn verify_node_identity(
    signed_pubkey: &SignedPubkey,
    claimed: &Guid,
) -> Result<(), VerificationError> {
    check_binding(&binding_hash(signed_pubkey.as_bytes()), claimed)
}

/// Moderator identities: hash of `signature ‖ key` from the contract's key chain.
pub fn verify_moderator_identity(
    signature: &[u8],
    key: &[u8],
    claimed: &Guid,
) -> Result<(), VerificationError> {
    check_binding(&binding_hash_many(&[signature, key]), claimed)
}

/// Boolean form of [`verify_node_identity`].
pub fn verify_identity(signed_pubkey: &SignedPubkey, claimed: &Guid) -> bool {
    verify_node_identity(signed_pubkey, claimed).is_ok()
}

/// Ed25519 verification of untrusted bytes.
pub fn verify_signature(
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), VerificationError> {
    verify_detached(public_key, message, signature).map_err(|e| match e {
        CryptoError::InvalidKeyLength { .. } | CryptoError::InvalidPublicKey => {
            VerificationError::InvalidPublicKey
        }
        _ => VerificationError::InvalidSignature,
    })
}

/// Moderator key chain: GUID proof-of-work, then the encryption and payment
/// keys must be signed by the moderator's signing key.
pub fn verify_key_chain(entry: &ModeratorEntry) -> Result<(), VerificationError> {
    let guid = Guid::from_hex(&entry.guid).ok_or(VerificationError::GuidMismatch)?;
    let signing_key = entry.pubkeys.signing.key_bytes()?;
    let self_signature = entry.pubkeys.signing.signature_bytes()?;
    verify_moderator_identity(&self_signature, &signing_key, &guid)?;

    for sub_key in [&entry.pubkeys.encryption, &entry.pubkeys.bitcoin] {
        verify_signature(&signing_key, &sub_key.key_bytes()?, &sub_key.signature_bytes()?)?;
    }
    Ok(())
}
