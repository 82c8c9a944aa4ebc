//! Test utilities for the market protocol.
//!
//! Deterministic identities, a scriptable RPC transport, a recording message
//! listener and contract builders. Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use market_network::test_utils::fixture_identity;
//! use market_network::verify_identity;
//!
//! let vendor = fixture_identity(0);
//! assert!(verify_identity(vendor.signed_pubkey(), &vendor.guid()));
//! ```

use crate::adapters::{
    InMemoryFollowStore, InMemoryOverlay, InMemoryProfileStore, InMemoryResourceCache,
};
use crate::config::MarketConfig;
use crate::domain::{
    wire, ContentHash, Contract, Follower, FollowingUser, Guid, LocalIdentity, Metadata,
    ModeratorEntry, NodeIdentity,
};
use crate::ports::{MarketRpc, MessageListener, RpcResponse, ACK};
use crate::service::{MarketContext, MarketService};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Ed25519 seeds whose signed keys satisfy the GUID proof-of-work.
pub const FIXTURE_SEEDS: [&str; 6] = [
    "7066363e7b6058ad939de813d12affc560636d70f9568cf74fbaaf7c95c5311a",
    "36ff45d246e6cb302045eb4125a5fdc001f9f15226360b124a8a886f0ae8c18d",
    "30881896032848379fc02e526f75f1b9b80f6f266d4803949e78c92260952da1",
    "5dca309ebb96611bf69bb8604682ad71c014e2c33f191162e25ff8e48b98d08a",
    "11b67b2f6b34274ecf974f6dfd6e9d2891fbbac46f2f1c9f11f6a7200ffe86c0",
    "8eed78c5ea5632b4b85a334ddab045f72cc807acdab1e099bf06727843d5f51e",
];

/// Payment address the sample buyer order pays from.
pub const SAMPLE_PAYMENT_ADDRESS: &str = "1BoatSLRHtKNngkdXEeobR76b53LETtpyT";

/// Seed bytes of fixture `index`.
pub fn fixture_seed(index: usize) -> [u8; 32] {
    let bytes = hex::decode(FIXTURE_SEEDS[index]).expect("fixture seed is hex");
    bytes.try_into().expect("fixture seed is 32 bytes")
}

/// Loopback address of fixture `index`.
pub fn fixture_address(index: usize) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 18000 + index as u16))
}

/// Identity of fixture `index`, listening on [`fixture_address`], with a
/// payment master key.
pub fn fixture_identity(index: usize) -> LocalIdentity {
    LocalIdentity::from_seed(fixture_seed(index), Some(fixture_address(index)))
        .expect("fixture seed meets proof-of-work")
        .with_payment_master_pubkey(vec![0x02; 33])
}

/// Node record of fixture `index`.
pub fn fixture_node(index: usize) -> NodeIdentity {
    fixture_identity(index).node().clone()
}

/// `[data, signature]` signed by `identity`.
pub fn signed_response(identity: &LocalIdentity, data: Vec<u8>) -> RpcResponse {
    let signature = identity.sign(&data);
    RpcResponse::ok(vec![data, signature])
}

/// Positive acknowledgement.
pub fn ack() -> RpcResponse {
    RpcResponse::ok(vec![ACK.to_vec()])
}

/// Follow record from `follower` naming `following`, correctly signed.
pub fn follower_record(follower: &LocalIdentity, following: Guid) -> Follower {
    let mut record = Follower {
        guid: follower.guid(),
        following,
        signed_pubkey: follower.signed_pubkey().clone(),
        metadata: Metadata {
            name: format!("follower {}", follower.guid()),
            ..Default::default()
        },
        signature: Vec::new(),
    };
    let bytes = record.signing_bytes().expect("follower encodes");
    record.signature = follower.sign(&bytes);
    record
}

/// Following entry for `user` with metadata signed by `user`.
pub fn following_entry(user: &LocalIdentity, metadata: Metadata) -> FollowingUser {
    let signature = user.sign(&wire::encode(&metadata).expect("metadata encodes"));
    FollowingUser {
        guid: user.guid(),
        signed_pubkey: user.signed_pubkey().clone(),
        metadata,
        signature,
    }
}

/// Listing offered by `vendor`, moderated by `moderators`.
pub fn sample_listing(
    vendor: &LocalIdentity,
    moderators: &[&LocalIdentity],
    image_hashes: &[ContentHash],
) -> Value {
    let moderators: Vec<Value> = moderators
        .iter()
        .map(|moderator| {
            serde_json::to_value(ModeratorEntry::for_identity(moderator))
                .expect("moderator entry serializes")
        })
        .collect();
    json!({
        "id": {
            "guid": vendor.guid().hex(),
            "pubkeys": {
                "guid": hex::encode(vendor.signed_pubkey().verify_key()),
                "encryption": hex::encode(vendor.encryption_public_key()),
            },
        },
        "item": {
            "title": "Hand-carved walnut bowl",
            "price_per_unit": {"fiat": {"currency_code": "USD", "price": 42.5}},
            "image_hashes": image_hashes.iter().map(ContentHash::hex).collect::<Vec<_>>(),
        },
        "moderators": moderators,
    })
}

/// Buyer order placed by `buyer`.
pub fn sample_order(buyer: &LocalIdentity) -> Value {
    json!({
        "order": {
            "id": {
                "guid": buyer.guid().hex(),
                "pubkeys": {
                    "guid": hex::encode(buyer.signed_pubkey().verify_key()),
                    "encryption": hex::encode(buyer.encryption_public_key()),
                },
            },
            "quantity": 1,
            "payment": {"address": SAMPLE_PAYMENT_ADDRESS, "amount": 0.0125},
        }
    })
}

/// Vendor confirmation.
pub fn sample_confirmation() -> Value {
    json!({
        "invoice": {
            "shipping": {"tracking_number": "1Z999AA10123456784"},
            "comments": "Shipped today",
        }
    })
}

/// Signed vendor offer with a buyer order attached.
pub fn sample_contract(
    vendor: &LocalIdentity,
    buyer: &LocalIdentity,
    moderators: &[&LocalIdentity],
) -> Contract {
    let mut contract = Contract::signed_offer(sample_listing(vendor, moderators, &[]), vendor)
        .expect("offer signs");
    contract.set_buyer_order(sample_order(buyer));
    contract
}

/// RPC primitives the mock can script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    /// `call_get_contract`
    GetContract,
    /// `call_get_image`
    GetImage,
    /// `call_get_profile`
    GetProfile,
    /// `call_get_user_metadata`
    GetUserMetadata,
    /// `call_get_listings`
    GetListings,
    /// `call_get_contract_metadata`
    GetContractMetadata,
    /// `call_follow`
    Follow,
    /// `call_unfollow`
    Unfollow,
    /// `call_get_followers`
    GetFollowers,
    /// `call_get_following`
    GetFollowing,
    /// `call_notify`
    Notify,
    /// `call_message`
    Message,
    /// `call_order`
    Order,
    /// `call_order_confirmation`
    OrderConfirmation,
}

/// One call seen by [`MockMarketRpc`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
    /// Called peer.
    pub node: Guid,
    /// Primitive.
    pub method: RpcMethod,
    /// Arguments after the node, as bytes.
    pub args: Vec<Vec<u8>>,
}

type ResponseKey = (Guid, RpcMethod, Option<ContentHash>);

/// Scriptable RPC transport.
///
/// Unscripted calls answer [`RpcResponse::failed`]. Responses scripted for a
/// specific hash take precedence over the per-method response.
#[derive(Default)]
pub struct MockMarketRpc {
    responses: RwLock<HashMap<ResponseKey, RpcResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
    not_ready_polls: AtomicUsize,
    readiness_polls: AtomicUsize,
}

impl MockMarketRpc {
    /// Transport that is ready and has no scripted answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `method` call to `node` with `response`.
    pub fn respond(&self, node: Guid, method: RpcMethod, response: RpcResponse) {
        self.responses.write().insert((node, method, None), response);
    }

    /// Answer `method` calls to `node` for `hash` with `response`.
    pub fn respond_for(&self, node: Guid, method: RpcMethod, hash: ContentHash, response: RpcResponse) {
        self.responses
            .write()
            .insert((node, method, Some(hash)), response);
    }

    /// Report not ready for the next `polls` readiness checks.
    pub fn not_ready_for(&self, polls: usize) {
        self.not_ready_polls.store(polls, Ordering::SeqCst);
    }

    /// Number of readiness checks so far.
    pub fn readiness_polls(&self) -> usize {
        self.readiness_polls.load(Ordering::SeqCst)
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls of one primitive.
    pub fn calls_to(&self, method: RpcMethod) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    fn answer(
        &self,
        node: &NodeIdentity,
        method: RpcMethod,
        hash: Option<&ContentHash>,
        args: Vec<Vec<u8>>,
    ) -> RpcResponse {
        self.calls.lock().push(RecordedCall {
            node: node.id,
            method,
            args,
        });
        let responses = self.responses.read();
        hash.and_then(|hash| responses.get(&(node.id, method, Some(*hash))))
            .or_else(|| responses.get(&(node.id, method, None)))
            .cloned()
            .unwrap_or_else(RpcResponse::failed)
    }
}

#[async_trait]
impl MarketRpc for MockMarketRpc {
    async fn call_get_contract(&self, node: &NodeIdentity, hash: &ContentHash) -> RpcResponse {
        self.answer(node, RpcMethod::GetContract, Some(hash), vec![hash.to_vec()])
    }

    async fn call_get_image(&self, node: &NodeIdentity, hash: &ContentHash) -> RpcResponse {
        self.answer(node, RpcMethod::GetImage, Some(hash), vec![hash.to_vec()])
    }

    async fn call_get_profile(&self, node: &NodeIdentity) -> RpcResponse {
        self.answer(node, RpcMethod::GetProfile, None, Vec::new())
    }

    async fn call_get_user_metadata(&self, node: &NodeIdentity) -> RpcResponse {
        self.answer(node, RpcMethod::GetUserMetadata, None, Vec::new())
    }

    async fn call_get_listings(&self, node: &NodeIdentity) -> RpcResponse {
        self.answer(node, RpcMethod::GetListings, None, Vec::new())
    }

    async fn call_get_contract_metadata(
        &self,
        node: &NodeIdentity,
        hash: &ContentHash,
    ) -> RpcResponse {
        self.answer(node, RpcMethod::GetContractMetadata, Some(hash), vec![hash.to_vec()])
    }

    async fn call_follow(
        &self,
        node: &NodeIdentity,
        follower: Vec<u8>,
        signature: Vec<u8>,
    ) -> RpcResponse {
        self.answer(node, RpcMethod::Follow, None, vec![follower, signature])
    }

    async fn call_unfollow(&self, node: &NodeIdentity, signature: Vec<u8>) -> RpcResponse {
        self.answer(node, RpcMethod::Unfollow, None, vec![signature])
    }

    async fn call_get_followers(&self, node: &NodeIdentity) -> RpcResponse {
        self.answer(node, RpcMethod::GetFollowers, None, Vec::new())
    }

    async fn call_get_following(&self, node: &NodeIdentity) -> RpcResponse {
        self.answer(node, RpcMethod::GetFollowing, None, Vec::new())
    }

    async fn call_notify(
        &self,
        node: &NodeIdentity,
        message: String,
        signature: Vec<u8>,
    ) -> RpcResponse {
        self.answer(node, RpcMethod::Notify, None, vec![message.into_bytes(), signature])
    }

    async fn call_message(
        &self,
        node: &NodeIdentity,
        ephemeral_pubkey: [u8; 32],
        ciphertext: Vec<u8>,
    ) -> RpcResponse {
        self.answer(node, RpcMethod::Message, None, vec![ephemeral_pubkey.to_vec(), ciphertext])
    }

    async fn call_order(
        &self,
        node: &NodeIdentity,
        ephemeral_pubkey: [u8; 32],
        ciphertext: Vec<u8>,
    ) -> RpcResponse {
        self.answer(node, RpcMethod::Order, None, vec![ephemeral_pubkey.to_vec(), ciphertext])
    }

    async fn call_order_confirmation(
        &self,
        node: &NodeIdentity,
        ephemeral_pubkey: [u8; 32],
        ciphertext: Vec<u8>,
    ) -> RpcResponse {
        self.answer(
            node,
            RpcMethod::OrderConfirmation,
            None,
            vec![ephemeral_pubkey.to_vec(), ciphertext],
        )
    }

    fn is_ready(&self) -> bool {
        self.readiness_polls.fetch_add(1, Ordering::SeqCst);
        self.not_ready_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}

/// A message handed to [`RecordingListener`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Sender GUID.
    pub sender: Guid,
    /// Sender's X25519 key.
    pub encryption_pubkey: Vec<u8>,
    /// Subject.
    pub subject: Option<String>,
    /// Type name.
    pub message_type: String,
    /// Body.
    pub body: String,
}

/// Listener that keeps every delivered message.
#[derive(Default)]
pub struct RecordingListener {
    messages: Mutex<Vec<ReceivedMessage>>,
}

impl RecordingListener {
    /// Empty listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far.
    pub fn messages(&self) -> Vec<ReceivedMessage> {
        self.messages.lock().clone()
    }
}

impl MessageListener for RecordingListener {
    fn notify(
        &self,
        sender: Guid,
        encryption_pubkey: Vec<u8>,
        subject: Option<String>,
        message_type: &str,
        body: String,
    ) {
        self.messages.lock().push(ReceivedMessage {
            sender,
            encryption_pubkey,
            subject,
            message_type: message_type.to_string(),
            body,
        });
    }
}

/// A service wired to in-memory adapters, with handles on each of them.
pub struct TestNode {
    /// Service under test.
    pub service: MarketService,
    /// Scripted transport.
    pub rpc: Arc<MockMarketRpc>,
    /// Overlay, possibly shared with other nodes.
    pub overlay: Arc<InMemoryOverlay>,
    /// Resource cache.
    pub cache: Arc<InMemoryResourceCache>,
    /// Follow store.
    pub follows: Arc<InMemoryFollowStore>,
    /// Profile store.
    pub profile: Arc<InMemoryProfileStore>,
}

impl TestNode {
    /// Fixture `index` on its own overlay.
    pub fn new(index: usize) -> Self {
        Self::on_overlay(index, Arc::new(InMemoryOverlay::new()))
    }

    /// Fixture `index` on a shared overlay.
    pub fn on_overlay(index: usize, overlay: Arc<InMemoryOverlay>) -> Self {
        let rpc = Arc::new(MockMarketRpc::new());
        let cache = Arc::new(InMemoryResourceCache::new());
        let follows = Arc::new(InMemoryFollowStore::new());
        let profile = Arc::new(InMemoryProfileStore::default());

        let ctx = MarketContext::new(
            fixture_identity(index),
            rpc.clone(),
            overlay.clone(),
            cache.clone(),
        )
        .with_follow_store(follows.clone())
        .with_profile_store(profile.clone())
        .with_config(MarketConfig::for_testing());

        Self {
            service: MarketService::new(ctx),
            rpc,
            overlay,
            cache,
            follows,
            profile,
        }
    }

    /// Local identity.
    pub fn identity(&self) -> &LocalIdentity {
        &self.service.context().identity
    }
}
