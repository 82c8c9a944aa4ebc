//! # Integration Test Flows
//!
//! 1. **Store-and-forward chat**: offline delivery through the mailbox, reply
//!    to the key carried in the message
//! 2. **Purchase**: order acknowledgement, then an offline buyer receives the
//!    confirmation tagged with the order id both sides compute
//! 3. **Social graph**: follow, follower list served back, notification fan-out
//! 4. **Moderators**: publication, discovery and key-chain verification
//! 5. **File cache**: verified contracts land on disk under their hash

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use market_network::domain::{wire, ModeratorEntry};
    use market_network::ports::ACK;
    use market_network::test_utils::{
        fixture_identity, sample_confirmation, sample_contract, sample_listing, signed_response,
        ack, MockMarketRpc, RecordingListener, RpcMethod, TestNode, SAMPLE_PAYMENT_ADDRESS,
    };
    use market_network::{
        verify_key_chain, ContentHash, Contract, FileResourceCache, Follower, FollowStore,
        InMemoryOverlay, MarketApi, MarketConfig, MarketContext, MarketService, MessageType,
        Metadata, NodeIdentity, ResourceCache, RpcResponse,
    };
    use market_telemetry::{init_telemetry, TelemetryConfig};

    const LIMIT: u64 = 1024 * 1024;

    fn init_logging() {
        // A second init in the same process fails; that is fine here
        let _ = init_telemetry(TelemetryConfig::for_node("market-tests"));
    }

    // =============================================================================
    // STORE-AND-FORWARD CHAT
    // =============================================================================

    #[tokio::test]
    async fn test_offline_chat_roundtrip() {
        init_logging();
        let overlay = Arc::new(InMemoryOverlay::new());
        let alice = TestNode::on_overlay(1, overlay.clone());
        let bob = TestNode::on_overlay(2, overlay.clone());

        // Bob does not answer, so the message lands in his mailbox
        let bob_node = bob.identity().node().clone();
        assert!(
            alice
                .service
                .send_message(
                    &bob_node,
                    &bob.identity().encryption_public_key(),
                    MessageType::Chat,
                    "Do you ship to Lisbon?",
                    Some("shipping"),
                    false,
                )
                .await
        );

        let bob_inbox = RecordingListener::new();
        assert_eq!(bob.service.drain_inbox(&bob_inbox).await, 1);
        let question = bob_inbox.messages().remove(0);
        assert_eq!(question.sender, alice.identity().guid());
        assert_eq!(question.subject.as_deref(), Some("shipping"));
        assert_eq!(question.body, "Do you ship to Lisbon?");

        // Reply using only what the message carried
        assert!(
            bob.service
                .send_message(
                    &NodeIdentity::from_guid(question.sender),
                    &question.encryption_pubkey,
                    MessageType::Chat,
                    "Yes, 5 business days.",
                    None,
                    false,
                )
                .await
        );
        assert!(bob.rpc.calls().is_empty());

        let alice_inbox = RecordingListener::new();
        assert_eq!(alice.service.drain_inbox(&alice_inbox).await, 1);
        assert_eq!(alice_inbox.messages()[0].sender, bob.identity().guid());
        assert_eq!(alice_inbox.messages()[0].body, "Yes, 5 business days.");

        // Both mailboxes are empty afterwards
        assert_eq!(bob.service.drain_inbox(&bob_inbox).await, 0);
        assert_eq!(alice.service.drain_inbox(&alice_inbox).await, 0);
    }

    // =============================================================================
    // PURCHASE
    // =============================================================================

    #[tokio::test]
    async fn test_purchase_then_offline_confirmation() {
        init_logging();
        let overlay = Arc::new(InMemoryOverlay::new());
        let vendor = TestNode::on_overlay(0, overlay.clone());
        let buyer = TestNode::on_overlay(1, overlay.clone());
        let vendor_node = vendor.identity().node().clone();

        let ordered = sample_contract(vendor.identity(), buyer.identity(), &[]);
        buyer.rpc.respond(
            vendor_node.id,
            RpcMethod::Order,
            RpcResponse::ok(vec![vendor.identity().sign(SAMPLE_PAYMENT_ADDRESS.as_bytes())]),
        );
        assert!(buyer.service.purchase(&vendor_node, &ordered).await.is_some());

        let mut confirmed = ordered.clone();
        confirmed.set_order_confirmation(sample_confirmation());
        assert!(
            vendor
                .service
                .confirm_order(&buyer.identity().guid(), &confirmed)
                .await
        );

        let inbox = RecordingListener::new();
        assert_eq!(buyer.service.drain_inbox(&inbox).await, 1);
        let update = inbox.messages().remove(0);
        assert_eq!(update.sender, vendor_node.id);
        assert_eq!(update.message_type, "ORDER");
        assert_eq!(update.subject, Some(ordered.order_id().unwrap().hex()));
        let body: serde_json::Value = serde_json::from_str(&update.body).unwrap();
        assert_eq!(body, sample_confirmation());
    }

    // =============================================================================
    // SOCIAL GRAPH
    // =============================================================================

    #[tokio::test]
    async fn test_follow_list_and_notify() {
        init_logging();
        let overlay = Arc::new(InMemoryOverlay::new());
        let store = TestNode::on_overlay(0, overlay.clone());
        let shopper = TestNode::on_overlay(1, overlay.clone());
        let store_node = store.identity().node().clone();
        let shopper_node = shopper.identity().node().clone();

        // The store acknowledges with its signed metadata
        let metadata = Metadata {
            name: "Walnut Works".to_string(),
            ..Default::default()
        };
        let encoded = wire::encode(&metadata).unwrap();
        shopper.rpc.respond(
            store_node.id,
            RpcMethod::Follow,
            RpcResponse::ok(vec![
                ACK.to_vec(),
                encoded.clone(),
                store.identity().sign(&encoded),
            ]),
        );
        assert!(shopper.service.follow(&store_node).await);

        // The store keeps the record it was sent
        let call = shopper.rpc.calls_to(RpcMethod::Follow).remove(0);
        let record: Follower = wire::decode(&call.args[0], LIMIT).unwrap();
        store.follows.add_follower(record);

        // ...and serves it back, signed
        let followers = store.follows.followers().unwrap();
        shopper.rpc.respond(
            store_node.id,
            RpcMethod::GetFollowers,
            signed_response(store.identity(), wire::encode(&followers).unwrap()),
        );
        let listed = shopper.service.get_followers(&store_node).await.unwrap();
        assert_eq!(listed.followers.len(), 1);
        assert_eq!(listed.followers[0].guid, shopper_node.id);

        overlay.register_node(shopper_node.clone());
        store.rpc.respond(shopper_node.id, RpcMethod::Notify, ack());
        assert_eq!(
            store.service.send_notification("New walnut bowls in stock").await,
            1
        );
    }

    // =============================================================================
    // MODERATORS
    // =============================================================================

    #[tokio::test]
    async fn test_moderator_discovery() {
        init_logging();
        let overlay = Arc::new(InMemoryOverlay::new());
        let moderator = TestNode::on_overlay(2, overlay.clone());
        let buyer = TestNode::on_overlay(1, overlay.clone());

        assert!(buyer.service.fetch_moderators().await.is_empty());
        assert!(moderator.service.make_moderator().await);

        let found = buyer.service.fetch_moderators().await;
        assert_eq!(found, vec![moderator.identity().node().clone()]);
        verify_key_chain(&ModeratorEntry::for_identity(moderator.identity())).unwrap();

        assert!(moderator.service.unmake_moderator().await);
        assert!(buyer.service.fetch_moderators().await.is_empty());
    }

    // =============================================================================
    // FILE CACHE
    // =============================================================================

    #[tokio::test]
    async fn test_verified_contract_cached_on_disk() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(FileResourceCache::open(dir.path()).unwrap());
        let rpc = Arc::new(MockMarketRpc::new());
        let ctx = MarketContext::new(
            fixture_identity(1),
            rpc.clone(),
            Arc::new(InMemoryOverlay::new()),
            cache.clone(),
        )
        .with_config(MarketConfig::for_testing());
        let service = MarketService::new(ctx);

        let vendor = fixture_identity(0);
        let moderator = fixture_identity(3);
        let contract =
            Contract::signed_offer(sample_listing(&vendor, &[&moderator], &[]), &vendor).unwrap();
        let raw = contract.to_canonical_bytes().unwrap();
        let hash = ContentHash::of(&raw);
        rpc.respond(vendor.guid(), RpcMethod::GetContract, RpcResponse::ok(vec![raw.clone()]));

        assert_eq!(service.fetch_contract(vendor.node(), hash).await, Some(contract.clone()));
        assert_eq!(service.fetch_contract(vendor.node(), hash).await, Some(contract));

        assert!(cache.contains(&hash));
        assert_eq!(std::fs::read(cache.path_for(&hash)).unwrap(), raw);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
