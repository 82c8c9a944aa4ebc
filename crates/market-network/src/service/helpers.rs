//! Helpers shared by the protocol components.

use crate::domain::{verify_signature, MarketError, NodeIdentity};
use crate::ports::RpcResponse;

/// Fail fast for peers without a known endpoint.
pub(crate) fn require_address(node: &NodeIdentity) -> Result<(), MarketError> {
    if node.is_reachable() {
        Ok(())
    } else {
        Err(MarketError::Unreachable(node.id))
    }
}

/// Parts of a successful response.
pub(crate) fn response_parts<'a>(
    response: &'a RpcResponse,
    node: &NodeIdentity,
) -> Result<&'a [Vec<u8>], MarketError> {
    if !response.success {
        return Err(MarketError::Unreachable(node.id));
    }
    Ok(&response.payload)
}

/// First part of a successful response.
pub(crate) fn first_part<'a>(
    response: &'a RpcResponse,
    node: &NodeIdentity,
) -> Result<&'a [u8], MarketError> {
    response_parts(response, node)?
        .first()
        .map(Vec::as_slice)
        .ok_or_else(|| MarketError::Malformed("empty response".to_string()))
}

/// `[data, signature]` response: verify the signature against the node's
/// signing key and return `data`.
pub(crate) fn verified_payload<'a>(
    response: &'a RpcResponse,
    node: &NodeIdentity,
) -> Result<&'a [u8], MarketError> {
    match response_parts(response, node)? {
        [data, signature, ..] => {
            verify_signature(node.signed_pubkey.verify_key(), data, signature)?;
            Ok(data)
        }
        _ => Err(MarketError::Malformed("expected data and signature".to_string())),
    }
}

/// Unix seconds.
pub(crate) fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
