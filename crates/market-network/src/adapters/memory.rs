//! In-memory adapters for local runs and tests.

use crate::domain::wire;
use crate::domain::{
    ContentHash, Follower, Followers, Following, FollowingUser, Guid, NodeIdentity, OverlayKey,
    Profile, StoreError, StoredValue,
};
use crate::ports::{FollowStore, Overlay, ProfileStore, ResourceCache};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// Overlay shared by every node of an in-process network.
///
/// Deletions are honoured without checking the signature; a real overlay
/// checks it against the record owner's key.
#[derive(Default)]
pub struct InMemoryOverlay {
    /// Per key: `(subkey, encoded StoredValue)` in insertion order.
    entries: RwLock<HashMap<OverlayKey, Vec<(Vec<u8>, Vec<u8>)>>>,
    nodes: RwLock<HashMap<Guid, NodeIdentity>>,
    deletions: Mutex<Vec<(OverlayKey, Vec<u8>, Vec<u8>)>>,
}

impl InMemoryOverlay {
    /// Empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `node` resolvable.
    pub fn register_node(&self, node: NodeIdentity) {
        self.nodes.write().insert(node.id, node);
    }

    /// Take `guid` offline.
    pub fn unregister_node(&self, guid: &Guid) {
        self.nodes.write().remove(guid);
    }

    /// Insert raw bytes under `key` without wrapping them in a `StoredValue`.
    pub fn insert_raw(&self, key: OverlayKey, subkey: Vec<u8>, bytes: Vec<u8>) {
        Self::upsert(&mut self.entries.write(), key, subkey, bytes);
    }

    /// Number of records under `key`.
    pub fn len(&self, key: &OverlayKey) -> usize {
        self.entries.read().get(key).map_or(0, Vec::len)
    }

    /// Whether `key` holds no records.
    pub fn is_empty(&self, key: &OverlayKey) -> bool {
        self.len(key) == 0
    }

    /// `(key, subkey, signature)` of every accepted deletion.
    pub fn deletions(&self) -> Vec<(OverlayKey, Vec<u8>, Vec<u8>)> {
        self.deletions.lock().clone()
    }

    fn upsert(
        entries: &mut HashMap<OverlayKey, Vec<(Vec<u8>, Vec<u8>)>>,
        key: OverlayKey,
        subkey: Vec<u8>,
        bytes: Vec<u8>,
    ) {
        let records = entries.entry(key).or_default();
        match records.iter_mut().find(|(existing, _)| *existing == subkey) {
            Some(record) => record.1 = bytes,
            None => records.push((subkey, bytes)),
        }
    }
}

#[async_trait]
impl Overlay for InMemoryOverlay {
    async fn get(&self, key: &OverlayKey) -> Vec<Vec<u8>> {
        self.entries
            .read()
            .get(key)
            .map(|records| records.iter().map(|(_, bytes)| bytes.clone()).collect())
            .unwrap_or_default()
    }

    async fn set(&self, key: OverlayKey, subkey: Vec<u8>, value: Vec<u8>) -> bool {
        let record = StoredValue {
            value_key: subkey.clone(),
            serialized_data: value,
        };
        match wire::encode(&record) {
            Ok(bytes) => {
                Self::upsert(&mut self.entries.write(), key, subkey, bytes);
                true
            }
            Err(_) => false,
        }
    }

    async fn delete(&self, key: OverlayKey, subkey: Vec<u8>, signature: Vec<u8>) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            match entries.get_mut(&key) {
                Some(records) => {
                    let before = records.len();
                    records.retain(|(existing, _)| *existing != subkey);
                    records.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.deletions.lock().push((key, subkey, signature));
        }
        removed
    }

    async fn resolve(&self, guid: &Guid) -> Option<NodeIdentity> {
        self.nodes.read().get(guid).cloned()
    }
}

/// Resource cache held in memory.
#[derive(Default)]
pub struct InMemoryResourceCache {
    resources: RwLock<HashMap<ContentHash, Vec<u8>>>,
}

impl InMemoryResourceCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.resources.read().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceCache for InMemoryResourceCache {
    fn contains(&self, hash: &ContentHash) -> bool {
        self.resources.read().contains_key(hash)
    }

    fn store(&self, bytes: &[u8]) -> Result<ContentHash, StoreError> {
        let hash = ContentHash::of(bytes);
        self.resources
            .write()
            .entry(hash)
            .or_insert_with(|| bytes.to_vec());
        Ok(hash)
    }

    fn load(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.resources.read().get(hash).cloned())
    }
}

/// Follower and following lists held in memory.
#[derive(Default)]
pub struct InMemoryFollowStore {
    followers: RwLock<Vec<Follower>>,
    following: RwLock<Vec<FollowingUser>>,
}

impl InMemoryFollowStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an incoming follower, replacing any earlier record from the same GUID.
    pub fn add_follower(&self, follower: Follower) {
        let mut followers = self.followers.write();
        match followers.iter_mut().find(|f| f.guid == follower.guid) {
            Some(existing) => *existing = follower,
            None => followers.push(follower),
        }
    }
}

impl FollowStore for InMemoryFollowStore {
    fn followers(&self) -> Result<Followers, StoreError> {
        Ok(Followers {
            followers: self.followers.read().clone(),
        })
    }

    fn following(&self) -> Result<Following, StoreError> {
        Ok(Following {
            users: self.following.read().clone(),
        })
    }

    fn follow(&self, user: FollowingUser) -> Result<(), StoreError> {
        let mut following = self.following.write();
        match following.iter_mut().find(|u| u.guid == user.guid) {
            Some(existing) => *existing = user,
            None => following.push(user),
        }
        Ok(())
    }

    fn unfollow(&self, guid: &Guid) -> Result<(), StoreError> {
        self.following.write().retain(|u| u.guid != *guid);
        Ok(())
    }
}

/// Profile held in memory.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profile: RwLock<Profile>,
}

impl InMemoryProfileStore {
    /// Store seeded with `profile`.
    pub fn new(profile: Profile) -> Self {
        Self {
            profile: RwLock::new(profile),
        }
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self) -> Result<Profile, StoreError> {
        Ok(self.profile.read().clone())
    }

    fn update(&self, profile: Profile) -> Result<(), StoreError> {
        *self.profile.write() = profile;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metadata, SignedPubkey};

    fn key() -> OverlayKey {
        ContentHash::of(b"mailbox")
    }

    #[tokio::test]
    async fn test_overlay_set_get_delete() {
        let overlay = InMemoryOverlay::new();
        assert!(overlay.set(key(), vec![1], b"a".to_vec()).await);
        assert!(overlay.set(key(), vec![2], b"b".to_vec()).await);

        let records = overlay.get(&key()).await;
        assert_eq!(records.len(), 2);
        let first: StoredValue = wire::decode(&records[0], 1024).unwrap();
        assert_eq!(first.value_key, vec![1]);
        assert_eq!(first.serialized_data, b"a".to_vec());

        assert!(overlay.delete(key(), vec![1], vec![0xaa]).await);
        assert!(!overlay.delete(key(), vec![1], vec![0xaa]).await);
        assert_eq!(overlay.len(&key()), 1);
        assert_eq!(overlay.deletions(), vec![(key(), vec![1], vec![0xaa])]);
    }

    #[tokio::test]
    async fn test_overlay_same_subkey_replaces() {
        let overlay = InMemoryOverlay::new();
        overlay.set(key(), vec![1], b"old".to_vec()).await;
        overlay.set(key(), vec![1], b"new".to_vec()).await;

        let records = overlay.get(&key()).await;
        assert_eq!(records.len(), 1);
        let record: StoredValue = wire::decode(&records[0], 1024).unwrap();
        assert_eq!(record.serialized_data, b"new".to_vec());
    }

    #[tokio::test]
    async fn test_overlay_resolve() {
        let overlay = InMemoryOverlay::new();
        let guid = Guid::from_bytes([4; 20]);
        assert!(overlay.resolve(&guid).await.is_none());

        overlay.register_node(NodeIdentity::from_guid(guid));
        assert_eq!(overlay.resolve(&guid).await.map(|n| n.id), Some(guid));

        overlay.unregister_node(&guid);
        assert!(overlay.resolve(&guid).await.is_none());
    }

    #[test]
    fn test_cache_store_is_idempotent() {
        let cache = InMemoryResourceCache::new();
        let first = cache.store(b"image").unwrap();
        let second = cache.store(b"image").unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.load(&first).unwrap(), Some(b"image".to_vec()));
    }

    #[test]
    fn test_follow_replaces_by_guid() {
        let store = InMemoryFollowStore::new();
        let user = |name: &str| FollowingUser {
            guid: Guid::from_bytes([1; 20]),
            signed_pubkey: SignedPubkey::default(),
            metadata: Metadata {
                name: name.to_string(),
                ..Default::default()
            },
            signature: Vec::new(),
        };

        store.follow(user("first")).unwrap();
        store.follow(user("second")).unwrap();
        let following = store.following().unwrap();
        assert_eq!(following.users.len(), 1);
        assert_eq!(following.users[0].metadata.name, "second");

        store.unfollow(&Guid::from_bytes([1; 20])).unwrap();
        assert!(store.following().unwrap().users.is_empty());
    }

    #[test]
    fn test_profile_update() {
        let store = InMemoryProfileStore::default();
        let mut profile = store.get().unwrap();
        profile.moderator = true;
        store.update(profile).unwrap();
        assert!(store.get().unwrap().moderator);
    }
}
