//! # Ephemeral-Box Encryption
//!
//! Authenticated public-key encryption with a one-time sender key:
//!
//! ```text
//! ephemeral = X25519::random()
//! shared    = X25519(ephemeral, recipient)
//! key       = HKDF-SHA256(ikm = shared, info = ephemeral_pub || recipient_pub)
//! output    = (ephemeral_pub, nonce[24] || XChaCha20-Poly1305(key, nonce, plaintext))
//! ```
//!
//! The recipient only needs its long-term X25519 secret and the ephemeral
//! public key shipped alongside the ciphertext.

use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};
use zeroize::Zeroize;

/// X25519 public key length.
pub const PUBLIC_KEY_LEN: usize = 32;

/// XChaCha20 nonce length.
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

/// Long-term X25519 key pair used to receive sealed boxes.
pub struct EncryptionKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl EncryptionKeyPair {
    /// Generate a random key pair.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Derive the key pair from a 32-byte seed (the node's signing seed).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let secret = StaticSecret::from(seed);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Public half, as shipped to peers.
    pub fn public_key(&self) -> [u8; 32] {
        self.public.to_bytes()
    }
}

/// Output of [`seal`]: the one-time public key and the authenticated ciphertext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBox {
    /// Ephemeral X25519 public key generated for this message.
    pub ephemeral_public_key: [u8; 32],
    /// `nonce || ciphertext || tag`.
    pub ciphertext: Vec<u8>,
}

/// Seal `plaintext` to `recipient_public_key` with a freshly generated ephemeral key.
///
/// # Errors
///
/// - `InvalidKeyLength` if the recipient key is not 32 bytes
/// - `KeyAgreementFailed` if the recipient key is a low-order point
pub fn seal(recipient_public_key: &[u8], plaintext: &[u8]) -> Result<SealedBox, CryptoError> {
    let recipient = parse_public_key(recipient_public_key)?;

    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&recipient);
    if !shared.was_contributory() {
        return Err(CryptoError::KeyAgreementFailed);
    }

    let mut key = derive_key(shared.as_bytes(), ephemeral_public.as_bytes(), recipient.as_bytes())?;
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
    key.zeroize();

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let sealed = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut ciphertext = Vec::with_capacity(NONCE_LEN + sealed.len());
    ciphertext.extend_from_slice(&nonce);
    ciphertext.extend_from_slice(&sealed);

    Ok(SealedBox {
        ephemeral_public_key: ephemeral_public.to_bytes(),
        ciphertext,
    })
}

/// Open a box sealed to `recipient`.
///
/// # Errors
///
/// Returns `DecryptionFailed` for a wrong recipient or any tampering.
pub fn open(
    recipient: &EncryptionKeyPair,
    ephemeral_public_key: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::CiphertextTooShort(ciphertext.len()));
    }
    let ephemeral = parse_public_key(ephemeral_public_key)?;

    let shared = recipient.secret.diffie_hellman(&ephemeral);
    if !shared.was_contributory() {
        return Err(CryptoError::KeyAgreementFailed);
    }

    let mut key = derive_key(shared.as_bytes(), ephemeral.as_bytes(), recipient.public.as_bytes())?;
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
    key.zeroize();

    let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
    cipher
        .decrypt(XNonce::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::DecryptionFailed)
}

fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, CryptoError> {
    let array: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: PUBLIC_KEY_LEN,
        actual: bytes.len(),
    })?;
    Ok(PublicKey::from(array))
}

fn derive_key(
    shared_secret: &[u8; 32],
    ephemeral_public: &[u8; 32],
    recipient_public: &[u8; 32],
) -> Result<[u8; 32], CryptoError> {
    let mut info = [0u8; 64];
    info[..32].copy_from_slice(ephemeral_public);
    info[32..].copy_from_slice(recipient_public);

    let hkdf = Hkdf::<Sha256>::new(None, shared_secret);
    let mut okm = [0u8; 32];
    hkdf.expand(&info, &mut okm)
        .map_err(|_| CryptoError::KeyAgreementFailed)?;
    Ok(okm)
}
