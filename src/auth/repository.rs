// Account storage interface and the in-memory implementation

use crate::auth::{
    error::AccountField,
    models::{Account, AccountChanges, NewAccount},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors reported by an `AccountStore`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique field collided with another record
    #[error("unique constraint violated on {0}")]
    Conflict(AccountField),

    /// The backend failed; the message is for server-side logs only
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence for accounts
///
/// Lookups report absence as `Ok(None)`. Implementations must enforce the
/// uniqueness of email and nickname on `create` and `update_fields` and apply
/// each call atomically per record. Emails arrive already normalized.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new account, assigning its id and creation time
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Merge `changes` into the record; `Ok(None)` if the id is unknown
    async fn update_fields(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> Result<Option<Account>, StoreError>;

    /// Remove the record; `Ok(false)` if the id is unknown
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All accounts, oldest first
    async fn list(&self) -> Result<Vec<Account>, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
    by_nickname: HashMap<String, Uuid>,
}

impl MemoryState {
    fn holder_of_email(&self, email: &str) -> Option<Uuid> {
        self.by_email.get(email).copied()
    }

    fn holder_of_nickname(&self, nickname: &str) -> Option<Uuid> {
        self.by_nickname.get(nickname).copied()
    }
}

/// Account store kept in process memory
///
/// Unique indexes are maintained next to the records and checked under the
/// same write lock as the mutation, so the store itself never admits a
/// duplicate.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .holder_of_email(email)
            .and_then(|id| state.accounts.get(&id).cloned()))
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .holder_of_nickname(nickname)
            .and_then(|id| state.accounts.get(&id).cloned()))
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut state = self.state.write().await;

        if state.holder_of_email(&account.email).is_some() {
            return Err(StoreError::Conflict(AccountField::Email));
        }
        if state.holder_of_nickname(&account.nickname).is_some() {
            return Err(StoreError::Conflict(AccountField::Nickname));
        }

        let mut id = Uuid::new_v4();
        while state.accounts.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let created = Account {
            id,
            email: account.email,
            nickname: account.nickname,
            password_hash: account.password_hash,
            created_at: Utc::now(),
        };

        state.by_email.insert(created.email.clone(), id);
        state.by_nickname.insert(created.nickname.clone(), id);
        state.accounts.insert(id, created.clone());

        Ok(created)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> Result<Option<Account>, StoreError> {
        let mut state = self.state.write().await;

        let Some(current) = state.accounts.get(&id).cloned() else {
            return Ok(None);
        };

        if let Some(email) = &changes.email {
            if state.holder_of_email(email).is_some_and(|holder| holder != id) {
                return Err(StoreError::Conflict(AccountField::Email));
            }
        }
        if let Some(nickname) = &changes.nickname {
            if state.holder_of_nickname(nickname).is_some_and(|holder| holder != id) {
                return Err(StoreError::Conflict(AccountField::Nickname));
            }
        }

        let mut updated = current.clone();
        if let Some(email) = changes.email {
            state.by_email.remove(&current.email);
            state.by_email.insert(email.clone(), id);
            updated.email = email;
        }
        if let Some(nickname) = changes.nickname {
            state.by_nickname.remove(&current.nickname);
            state.by_nickname.insert(nickname.clone(), id);
            updated.nickname = nickname;
        }
        if let Some(password_hash) = changes.password_hash {
            updated.password_hash = password_hash;
        }

        state.accounts.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        match state.accounts.remove(&id) {
            Some(removed) => {
                state.by_email.remove(&removed.email);
                state.by_nickname.remove(&removed.nickname);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }
}
