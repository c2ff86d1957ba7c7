/// File-backed credential store
///
/// Owns the authoritative in-memory copy of all user records; the JSON file
/// on disk is a write-through mirror rewritten in full after every
/// mutation (no appends, so the file is always a complete snapshot).
///
/// Concurrency discipline: reads go through an `RwLock` and always see a
/// consistent snapshot. Every mutation runs its whole
/// read-modify-swap-persist sequence while holding `write_gate`, which
/// serializes mutations against each other and rules out lost updates
/// between concurrent logins/logouts. The in-memory swap happens first;
/// the file write is awaited before the mutation returns, so a handler
/// never completes with its change still buffered.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::error::StoreError;

/// A single user record.
///
/// An empty `refresh_token` means "no active session"; at most one live
/// refresh token exists per user at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub refresh_token: String,
}

pub struct UserStore {
    users: RwLock<Vec<UserRecord>>,
    /// Serializes read-modify-write sequences and the trailing file write.
    write_gate: Mutex<()>,
    path: PathBuf,
}

impl UserStore {
    /// Load all user records from the durable file.
    ///
    /// A missing or malformed file is a bootstrap failure; the process must
    /// not start with an unreadable credential store.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let raw = tokio::fs::read(&path).await?;
        let users: Vec<UserRecord> = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        tracing::info!(path = %path.display(), count = users.len(), "User store loaded");

        Ok(Self {
            users: RwLock::new(users),
            write_gate: Mutex::new(()),
            path,
        })
    }

    pub async fn find_by_username(&self, username: &str) -> Option<UserRecord> {
        let users = self.users.read().await;
        users.iter().find(|u| u.username == username).cloned()
    }

    pub async fn find_by_refresh_token(&self, token: &str) -> Option<UserRecord> {
        // An empty token marks a logged-out record, never a live session.
        if token.is_empty() {
            return None;
        }
        let users = self.users.read().await;
        users.iter().find(|u| u.refresh_token == token).cloned()
    }

    /// Read-only snapshot of the whole collection.
    pub async fn snapshot(&self) -> Vec<UserRecord> {
        self.users.read().await.clone()
    }

    /// Atomically replace the whole collection and rewrite the file.
    pub async fn replace_all(&self, users: Vec<UserRecord>) -> Result<(), StoreError> {
        let _gate = self.write_gate.lock().await;
        self.swap_and_persist(users).await
    }

    /// Record a fresh refresh token for `username`, displacing any previous
    /// one. Only the session lifecycle handlers call this.
    pub async fn set_refresh_token(&self, username: &str, token: &str) -> Result<(), StoreError> {
        let _gate = self.write_gate.lock().await;
        let mut users = self.users.read().await.clone();
        for user in users.iter_mut() {
            if user.username == username {
                user.refresh_token = token.to_string();
            }
        }
        self.swap_and_persist(users).await
    }

    /// Clear the refresh token of whichever record currently holds `token`.
    /// Returns whether any record matched; the no-match case still succeeds
    /// so logout stays idempotent.
    pub async fn clear_refresh_token(&self, token: &str) -> Result<bool, StoreError> {
        if token.is_empty() {
            return Ok(false);
        }
        let _gate = self.write_gate.lock().await;
        let mut users = self.users.read().await.clone();
        let mut matched = false;
        for user in users.iter_mut() {
            if user.refresh_token == token {
                user.refresh_token = String::new();
                matched = true;
            }
        }
        if matched {
            self.swap_and_persist(users).await?;
        }
        Ok(matched)
    }

    /// Add a new user record. Fails on a duplicate username.
    pub async fn insert_user(&self, record: UserRecord) -> Result<(), StoreError> {
        let _gate = self.write_gate.lock().await;
        let mut users = self.users.read().await.clone();
        if users.iter().any(|u| u.username == record.username) {
            return Err(StoreError::DuplicateUser(record.username));
        }
        users.push(record);
        self.swap_and_persist(users).await
    }

    /// Swap the in-memory collection, then mirror it to disk in a single
    /// buffered write. Caller must hold `write_gate`.
    async fn swap_and_persist(&self, users: Vec<UserRecord>) -> Result<(), StoreError> {
        let serialized = serde_json::to_vec_pretty(&users)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        {
            let mut guard = self.users.write().await;
            *guard = users;
        }
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_record(username: &str, refresh_token: &str) -> UserRecord {
        UserRecord {
            username: username.to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            roles: vec!["User".to_string()],
            refresh_token: refresh_token.to_string(),
        }
    }

    async fn seeded_store(users: &[UserRecord]) -> (UserStore, PathBuf) {
        let path = std::env::temp_dir().join(format!("authgate-store-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, serde_json::to_vec(users).unwrap())
            .await
            .expect("Failed to write seed file");
        let store = UserStore::load(&path).await.expect("Failed to load store");
        (store, path)
    }

    #[tokio::test]
    async fn load_fails_on_missing_file() {
        let path = std::env::temp_dir().join("authgate-store-does-not-exist.json");
        let result = UserStore::load(&path).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn load_fails_on_malformed_file() {
        let path = std::env::temp_dir().join(format!("authgate-store-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"not json at all").await.unwrap();

        let result = UserStore::load(&path).await;
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn finds_users_by_username_and_token() {
        let (store, _path) = seeded_store(&[test_record("walt", "tok-1"), test_record("skyler", "")]).await;

        assert_eq!(store.find_by_username("walt").await.unwrap().username, "walt");
        assert!(store.find_by_username("jesse").await.is_none());
        assert_eq!(
            store.find_by_refresh_token("tok-1").await.unwrap().username,
            "walt"
        );
        assert!(store.find_by_refresh_token("unknown").await.is_none());
    }

    #[tokio::test]
    async fn empty_token_never_matches_a_logged_out_record() {
        let (store, _path) = seeded_store(&[test_record("skyler", "")]).await;
        assert!(store.find_by_refresh_token("").await.is_none());
    }

    #[tokio::test]
    async fn set_refresh_token_persists_to_disk() {
        let (store, path) = seeded_store(&[test_record("walt", "")]).await;

        store.set_refresh_token("walt", "tok-new").await.unwrap();

        let reloaded = UserStore::load(&path).await.unwrap();
        assert_eq!(
            reloaded.find_by_username("walt").await.unwrap().refresh_token,
            "tok-new"
        );
    }

    #[tokio::test]
    async fn clear_refresh_token_reports_whether_it_matched() {
        let (store, path) = seeded_store(&[test_record("walt", "tok-1")]).await;

        assert!(store.clear_refresh_token("tok-1").await.unwrap());
        assert!(!store.clear_refresh_token("tok-1").await.unwrap());

        let reloaded = UserStore::load(&path).await.unwrap();
        assert_eq!(reloaded.find_by_username("walt").await.unwrap().refresh_token, "");
    }

    #[tokio::test]
    async fn insert_user_rejects_duplicates() {
        let (store, _path) = seeded_store(&[test_record("walt", "")]).await;

        let result = store.insert_user(test_record("walt", "")).await;
        assert!(matches!(result, Err(StoreError::DuplicateUser(_))));
    }

    #[tokio::test]
    async fn concurrent_mutations_are_not_lost() {
        let (store, path) = seeded_store(&[test_record("walt", ""), test_record("skyler", "")]).await;
        let store = Arc::new(store);

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.set_refresh_token("walt", "tok-walt").await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.set_refresh_token("skyler", "tok-skyler").await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Both writes must survive in memory and on disk.
        let reloaded = UserStore::load(&path).await.unwrap();
        assert!(reloaded.find_by_refresh_token("tok-walt").await.is_some());
        assert!(reloaded.find_by_refresh_token("tok-skyler").await.is_some());
    }
}
