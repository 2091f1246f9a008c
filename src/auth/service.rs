// Authentication service - business logic layer

use crate::auth::{
    error::{AccountField, AuthError},
    models::{Account, AccountChanges, AccountView, NewAccount, ProfileChanges},
    password::PasswordService,
    repository::{AccountStore, StoreError},
    token::TokenService,
};
use crate::redact::{mask_client_addr, mask_email};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// Verified against when the email is unknown, so both sign-in failures
// pay for one password verification
const TIMING_EQUALIZER_PASSWORD: &str = "no-such-account-placeholder";

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize a nickname for storage and lookup
pub fn normalize_nickname(nickname: &str) -> String {
    nickname.trim().to_string()
}

/// Authentication service coordinating all credential operations
///
/// Holds no mutable state of its own. Every store call is an await point and
/// no lock is held across it; password work runs on the blocking pool.
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    password_service: PasswordService,
    token_service: Arc<TokenService>,
    placeholder_hash: String,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        store: Arc<dyn AccountStore>,
        password_service: PasswordService,
        token_service: Arc<TokenService>,
    ) -> Result<Self, AuthError> {
        let placeholder_hash = password_service.hash_password(TIMING_EQUALIZER_PASSWORD)?;

        Ok(Self {
            store,
            password_service,
            token_service,
            placeholder_hash,
        })
    }

    /// Token service used to issue credentials
    pub fn token_service(&self) -> Arc<TokenService> {
        Arc::clone(&self.token_service)
    }

    /// Register a new account and return a bearer token for it
    ///
    /// Email uniqueness is checked before nickname uniqueness. A conflict the
    /// store reports after both pre-checks passed still maps to `AlreadyExists`.
    pub async fn signup(
        &self,
        email: &str,
        nickname: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let nickname = normalize_nickname(nickname);

        // 1. Email must be free
        let email_holder = self
            .store
            .find_by_email(&email)
            .await
            .map_err(|e| store_failure("signup", e))?;
        if email_holder.is_some() {
            debug!(email = %mask_email(&email), "Signup rejected: email already exists");
            return Err(AuthError::AlreadyExists(AccountField::Email));
        }

        // 2. Nickname must be free
        let nickname_holder = self
            .store
            .find_by_nickname(&nickname)
            .await
            .map_err(|e| store_failure("signup", e))?;
        if nickname_holder.is_some() {
            debug!(nickname = %nickname, "Signup rejected: nickname already exists");
            return Err(AuthError::AlreadyExists(AccountField::Nickname));
        }

        // 3. Hash the password
        let password_hash = self.hash_password(password).await?;

        // 4. Persist
        let account = self
            .store
            .create(NewAccount {
                email,
                nickname,
                password_hash,
            })
            .await
            .map_err(|e| store_failure("signup", e))?;

        // 5. Issue the token
        let token = self.token_service.issue(account.id)?;

        info!(
            account_id = %account.id,
            nickname = %account.nickname,
            email = %mask_email(&account.email),
            "Account successfully signed up"
        );
        Ok(token)
    }

    /// Authenticate by email and password and return a bearer token
    ///
    /// Unknown email and wrong password fail with the same error and the same
    /// amount of hashing work.
    pub async fn signin(
        &self,
        email: &str,
        password: &str,
        client_addr: Option<IpAddr>,
    ) -> Result<String, AuthError> {
        let email = normalize_email(email);

        let account = self
            .store
            .find_by_email(&email)
            .await
            .map_err(|e| store_failure("signin", e))?;

        let Some(account) = account else {
            self.verify_password(password, &self.placeholder_hash).await?;
            warn!(
                email = %mask_email(&email),
                client = %mask_client_addr(client_addr),
                "Failed sign in attempt with unknown email"
            );
            return Err(AuthError::InvalidCredentials);
        };

        self.check_password(&account, password, client_addr, "sign in").await?;

        debug!(account_id = %account.id, "Sign in succeeded");
        self.token_service.issue(account.id)
    }

    /// Update email, nickname and/or password of an account
    ///
    /// The current password is always re-checked. Checks run email, nickname,
    /// password in that order and the first failure stops the update before
    /// anything is written; the merged result goes to the store in one call.
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        current_password: &str,
        changes: ProfileChanges,
        client_addr: Option<IpAddr>,
    ) -> Result<AccountView, AuthError> {
        // 1. Load the account
        let account = self
            .store
            .find_by_id(account_id)
            .await
            .map_err(|e| store_failure("update", e))?
            .ok_or(AuthError::NotFound)?;

        // 2. Re-authenticate
        self.check_password(&account, current_password, client_addr, "update").await?;

        let mut pending = AccountChanges::default();

        // 3. Email
        if let Some(email) = changes.email.as_deref().map(normalize_email) {
            if email == account.email {
                return Err(AuthError::NoOpChange(AccountField::Email));
            }
            let holder = self
                .store
                .find_by_email(&email)
                .await
                .map_err(|e| store_failure("update", e))?;
            if let Some(holder) = holder {
                debug!(
                    account_id = %account.id,
                    holder_id = %holder.id,
                    "Update rejected: email taken"
                );
                return Err(AuthError::AlreadyExists(AccountField::Email));
            }
            pending.email = Some(email);
        }

        // 4. Nickname
        if let Some(nickname) = changes.nickname.as_deref().map(normalize_nickname) {
            if nickname == account.nickname {
                return Err(AuthError::NoOpChange(AccountField::Nickname));
            }
            let holder = self
                .store
                .find_by_nickname(&nickname)
                .await
                .map_err(|e| store_failure("update", e))?;
            if let Some(holder) = holder {
                debug!(
                    account_id = %account.id,
                    holder_id = %holder.id,
                    "Update rejected: nickname taken"
                );
                return Err(AuthError::AlreadyExists(AccountField::Nickname));
            }
            pending.nickname = Some(nickname);
        }

        // 5. Password
        if let Some(new_password) = changes.new_password.as_deref() {
            if new_password == current_password {
                return Err(AuthError::NoOpChange(AccountField::Password));
            }
            pending.password_hash = Some(self.hash_password(new_password).await?);
        }

        if pending.is_empty() {
            return Err(AuthError::EmptyUpdate);
        }

        let changed_email = pending.email.is_some();
        let changed_nickname = pending.nickname.is_some();
        let changed_password = pending.password_hash.is_some();

        // 6. Persist the merged record
        let updated = self
            .store
            .update_fields(account.id, pending)
            .await
            .map_err(|e| store_failure("update", e))?
            .ok_or(AuthError::NotFound)?;

        info!(
            account_id = %updated.id,
            changed_email,
            changed_nickname,
            changed_password,
            "Account updated"
        );
        Ok(AccountView::from(updated))
    }

    /// Get the account behind an authenticated id
    pub async fn profile(&self, account_id: Uuid) -> Result<AccountView, AuthError> {
        self.store
            .find_by_id(account_id)
            .await
            .map_err(|e| store_failure("profile", e))?
            .map(AccountView::from)
            .ok_or(AuthError::NotFound)
    }

    /// List all accounts without password hashes
    pub async fn list_accounts(&self) -> Result<Vec<AccountView>, AuthError> {
        let accounts = self
            .store
            .list()
            .await
            .map_err(|e| store_failure("list", e))?;

        Ok(accounts.into_iter().map(AccountView::from).collect())
    }

    /// Delete an account by id
    pub async fn delete_account(&self, account_id: Uuid) -> Result<(), AuthError> {
        let removed = self
            .store
            .delete_by_id(account_id)
            .await
            .map_err(|e| store_failure("delete", e))?;

        if !removed {
            return Err(AuthError::NotFound);
        }

        info!(account_id = %account_id, "Account deleted");
        Ok(())
    }

    /// Verify `password` against the account, logging a redacted warning on mismatch
    async fn check_password(
        &self,
        account: &Account,
        password: &str,
        client_addr: Option<IpAddr>,
        attempt: &str,
    ) -> Result<(), AuthError> {
        if self.verify_password(password, &account.password_hash).await? {
            return Ok(());
        }

        warn!(
            email = %mask_email(&account.email),
            client = %mask_client_addr(client_addr),
            "Failed {} attempt due to incorrect password",
            attempt
        );
        Err(AuthError::InvalidCredentials)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.password_service.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| hashing_task_failure(&e))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.password_service.clone();
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| hashing_task_failure(&e))?
    }
}

/// Map a store error, logging the ones that are not policy outcomes
fn store_failure(operation: &str, err: StoreError) -> AuthError {
    match err {
        StoreError::Conflict(field) => {
            debug!(operation, %field, "Store reported a unique conflict");
            AuthError::AlreadyExists(field)
        }
        StoreError::Backend(message) => {
            error!(operation, "Unexpected account store failure: {}", message);
            AuthError::StorageError(message)
        }
    }
}

fn hashing_task_failure(err: &tokio::task::JoinError) -> AuthError {
    error!("Password hashing task failed: {}", err);
    AuthError::HashingError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::InMemoryAccountStore;
    use crate::auth::token::DEFAULT_TOKEN_TTL_SECONDS;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;

    const SECRET: &str = "service_test_secret";

    fn test_service_with_store(store: Arc<dyn AccountStore>) -> AuthService {
        let passwords = PasswordService::with_memory(1, 64).unwrap();
        let tokens = Arc::new(TokenService::new(SECRET, DEFAULT_TOKEN_TTL_SECONDS).unwrap());
        AuthService::new(store, passwords, tokens).unwrap()
    }

    fn test_service() -> (AuthService, InMemoryAccountStore) {
        let store = InMemoryAccountStore::new();
        (test_service_with_store(Arc::new(store.clone())), store)
    }

    fn client() -> Option<IpAddr> {
        Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)))
    }

    async fn signup_alice(service: &AuthService) -> Uuid {
        let token = service.signup("a@x.com", "alice", "pass1234").await.unwrap();
        service.token_service().verify(&token).unwrap()
    }

    fn nickname_change(nickname: &str) -> ProfileChanges {
        ProfileChanges {
            nickname: Some(nickname.to_string()),
            ..Default::default()
        }
    }

    fn email_change(email: &str) -> ProfileChanges {
        ProfileChanges {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }

    fn password_change(password: &str) -> ProfileChanges {
        ProfileChanges {
            new_password: Some(password.to_string()),
            ..Default::default()
        }
    }

    /// Store whose lookups never find anything, as if a concurrent signup
    /// landed between the pre-check and the write
    struct BlindLookupStore {
        inner: InMemoryAccountStore,
    }

    #[async_trait]
    impl AccountStore for BlindLookupStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
            self.inner.find_by_id(id).await
        }
        async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, StoreError> {
            Ok(None)
        }
        async fn find_by_nickname(&self, _nickname: &str) -> Result<Option<Account>, StoreError> {
            Ok(None)
        }
        async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
            self.inner.create(account).await
        }
        async fn update_fields(
            &self,
            id: Uuid,
            changes: AccountChanges,
        ) -> Result<Option<Account>, StoreError> {
            self.inner.update_fields(id, changes).await
        }
        async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
            self.inner.delete_by_id(id).await
        }
        async fn list(&self) -> Result<Vec<Account>, StoreError> {
            self.inner.list().await
        }
    }

    /// Store that is unreachable
    struct DownStore;

    #[async_trait]
    impl AccountStore for DownStore {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn find_by_nickname(&self, _nickname: &str) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn create(&self, _account: NewAccount) -> Result<Account, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn update_fields(
            &self,
            _id: Uuid,
            _changes: AccountChanges,
        ) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn delete_by_id(&self, _id: Uuid) -> Result<bool, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn list(&self) -> Result<Vec<Account>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    // ===== signup =====

    #[tokio::test]
    async fn test_signup_issues_token_for_new_account() {
        let (service, store) = test_service();

        let token = service.signup("a@x.com", "alice", "pass1234").await.unwrap();
        let subject = service.token_service().verify(&token).unwrap();

        let stored = store.find_by_id(subject).await.unwrap().unwrap();
        assert_eq!(stored.email, "a@x.com");
        assert_eq!(stored.nickname, "alice");
        assert_ne!(stored.password_hash, "pass1234");
        assert!(!stored.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_signup_twice_with_same_email_fails() {
        let (service, _) = test_service();
        service.signup("a@x.com", "alice", "pass1234").await.unwrap();

        assert_eq!(
            service.signup("a@x.com", "alice", "pass1234").await,
            Err(AuthError::AlreadyExists(AccountField::Email))
        );
        assert_eq!(
            service.signup("a@x.com", "someone_else", "pass1234").await,
            Err(AuthError::AlreadyExists(AccountField::Email))
        );
    }

    #[tokio::test]
    async fn test_signup_email_is_case_insensitive() {
        let (service, _) = test_service();
        service.signup("a@x.com", "alice", "pass1234").await.unwrap();

        assert_eq!(
            service.signup("  A@X.COM ", "other", "pass1234").await,
            Err(AuthError::AlreadyExists(AccountField::Email))
        );
    }

    #[tokio::test]
    async fn test_signup_duplicate_nickname_fails() {
        let (service, _) = test_service();
        service.signup("a@x.com", "alice", "pass1234").await.unwrap();

        assert_eq!(
            service.signup("b@x.com", "alice", "pass1234").await,
            Err(AuthError::AlreadyExists(AccountField::Nickname))
        );
    }

    #[tokio::test]
    async fn test_signup_email_conflict_takes_priority() {
        let (service, _) = test_service();
        service.signup("a@x.com", "alice", "pass1234").await.unwrap();
        service.signup("b@x.com", "bob", "pass1234").await.unwrap();

        assert_eq!(
            service.signup("a@x.com", "bob", "pass1234").await,
            Err(AuthError::AlreadyExists(AccountField::Email))
        );
    }

    #[tokio::test]
    async fn test_signup_late_store_conflict_maps_to_already_exists() {
        let inner = InMemoryAccountStore::new();
        let service = test_service_with_store(Arc::new(BlindLookupStore { inner: inner.clone() }));

        service.signup("a@x.com", "alice", "pass1234").await.unwrap();

        assert_eq!(
            service.signup("a@x.com", "other", "pass1234").await,
            Err(AuthError::AlreadyExists(AccountField::Email))
        );
        assert_eq!(
            service.signup("b@x.com", "alice", "pass1234").await,
            Err(AuthError::AlreadyExists(AccountField::Nickname))
        );
        assert_eq!(inner.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_outage_is_a_storage_error() {
        let service = test_service_with_store(Arc::new(DownStore));

        assert!(matches!(
            service.signup("a@x.com", "alice", "pass1234").await,
            Err(AuthError::StorageError(_))
        ));
        assert!(matches!(
            service.signin("a@x.com", "pass1234", None).await,
            Err(AuthError::StorageError(_))
        ));
        assert!(matches!(
            service.update_profile(Uuid::new_v4(), "pass1234", nickname_change("bob"), None).await,
            Err(AuthError::StorageError(_))
        ));
        assert!(matches!(service.list_accounts().await, Err(AuthError::StorageError(_))));
    }

    // ===== signin =====

    #[tokio::test]
    async fn test_signin_returns_token_for_account() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;

        let token = service.signin("a@x.com", "pass1234", client()).await.unwrap();
        assert_eq!(service.token_service().verify(&token).unwrap(), id);
    }

    #[tokio::test]
    async fn test_signin_failures_are_indistinguishable() {
        let (service, _) = test_service();
        signup_alice(&service).await;

        let wrong_password = service.signin("a@x.com", "wrong", client()).await;
        let unknown_email = service.signin("nobody@x.com", "pass1234", client()).await;

        assert_eq!(wrong_password, Err(AuthError::InvalidCredentials));
        assert_eq!(unknown_email, wrong_password);
    }

    #[tokio::test]
    async fn test_signin_without_client_addr() {
        let (service, _) = test_service();
        signup_alice(&service).await;

        assert_eq!(
            service.signin("a@x.com", "nope", None).await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(service.signin("A@x.com", "pass1234", None).await.is_ok());
    }

    // ===== update_profile =====

    #[tokio::test]
    async fn test_update_unknown_account_is_not_found() {
        let (service, _) = test_service();

        assert_eq!(
            service.update_profile(Uuid::new_v4(), "pass1234", nickname_change("bob"), None).await,
            Err(AuthError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_update_requires_current_password() {
        let (service, store) = test_service();
        let id = signup_alice(&service).await;

        assert_eq!(
            service.update_profile(id, "wrongpass", nickname_change("bob"), client()).await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().nickname, "alice");
    }

    #[tokio::test]
    async fn test_update_same_email_is_no_op() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;

        assert_eq!(
            service.update_profile(id, "pass1234", email_change("a@x.com"), None).await,
            Err(AuthError::NoOpChange(AccountField::Email))
        );
        assert_eq!(
            service.update_profile(id, "pass1234", email_change("A@X.com"), None).await,
            Err(AuthError::NoOpChange(AccountField::Email))
        );
    }

    #[tokio::test]
    async fn test_update_email_taken_by_other() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;
        service.signup("b@x.com", "bob", "pass5678").await.unwrap();

        assert_eq!(
            service.update_profile(id, "pass1234", email_change("b@x.com"), None).await,
            Err(AuthError::AlreadyExists(AccountField::Email))
        );
    }

    #[tokio::test]
    async fn test_update_same_nickname_is_no_op() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;

        assert_eq!(
            service.update_profile(id, "pass1234", nickname_change("alice"), None).await,
            Err(AuthError::NoOpChange(AccountField::Nickname))
        );
    }

    #[tokio::test]
    async fn test_update_nickname_taken_by_other() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;
        service.signup("b@x.com", "bob", "pass5678").await.unwrap();

        assert_eq!(
            service.update_profile(id, "pass1234", nickname_change("bob"), None).await,
            Err(AuthError::AlreadyExists(AccountField::Nickname))
        );
    }

    #[tokio::test]
    async fn test_update_nickname_leaves_other_fields() {
        let (service, store) = test_service();
        let id = signup_alice(&service).await;
        let before = store.find_by_id(id).await.unwrap().unwrap();

        let view = service
            .update_profile(id, "pass1234", nickname_change("bob"), None)
            .await
            .unwrap();

        assert_eq!(view.email, "a@x.com");
        assert_eq!(view.nickname, "bob");
        let after = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.password_hash, before.password_hash);
        assert!(service.signin("a@x.com", "pass1234", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_same_password_is_no_op() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;

        assert_eq!(
            service.update_profile(id, "pass1234", password_change("pass1234"), None).await,
            Err(AuthError::NoOpChange(AccountField::Password))
        );
    }

    #[tokio::test]
    async fn test_update_password_rotates_credentials() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;

        service
            .update_profile(id, "pass1234", password_change("newpass99"), None)
            .await
            .unwrap();

        assert_eq!(
            service.signin("a@x.com", "pass1234", None).await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(service.signin("a@x.com", "newpass99", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_email_is_normalized_and_reindexed() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;

        let view = service
            .update_profile(id, "pass1234", email_change(" New@X.com"), None)
            .await
            .unwrap();

        assert_eq!(view.email, "new@x.com");
        assert!(service.signin("new@x.com", "pass1234", None).await.is_ok());
        assert_eq!(
            service.signin("a@x.com", "pass1234", None).await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_update_checks_email_before_nickname_before_password() {
        let (service, store) = test_service();
        let id = signup_alice(&service).await;
        service.signup("b@x.com", "bob", "pass5678").await.unwrap();

        let all_bad = ProfileChanges {
            email: Some("a@x.com".to_string()),
            nickname: Some("bob".to_string()),
            new_password: Some("pass1234".to_string()),
        };
        assert_eq!(
            service.update_profile(id, "pass1234", all_bad, None).await,
            Err(AuthError::NoOpChange(AccountField::Email))
        );

        let nickname_and_password_bad = ProfileChanges {
            email: Some("fresh@x.com".to_string()),
            nickname: Some("alice".to_string()),
            new_password: Some("pass1234".to_string()),
        };
        assert_eq!(
            service.update_profile(id, "pass1234", nickname_and_password_bad, None).await,
            Err(AuthError::NoOpChange(AccountField::Nickname))
        );

        let password_bad = ProfileChanges {
            email: Some("fresh@x.com".to_string()),
            nickname: Some("fresh".to_string()),
            new_password: Some("pass1234".to_string()),
        };
        assert_eq!(
            service.update_profile(id, "pass1234", password_bad, None).await,
            Err(AuthError::NoOpChange(AccountField::Password))
        );

        // Nothing was written by any of the rejected attempts
        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.email, "a@x.com");
        assert_eq!(stored.nickname, "alice");
    }

    #[tokio::test]
    async fn test_update_fields_are_checked_independently() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;

        // A changed nickname alongside an absent email is accepted
        let view = service
            .update_profile(
                id,
                "pass1234",
                ProfileChanges {
                    email: None,
                    nickname: Some("alicia".to_string()),
                    new_password: Some("otherpass".to_string()),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(view.nickname, "alicia");
        assert_eq!(view.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_update_without_changes_is_rejected() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;

        assert_eq!(
            service.update_profile(id, "pass1234", ProfileChanges::default(), None).await,
            Err(AuthError::EmptyUpdate)
        );
    }

    #[tokio::test]
    async fn test_update_late_store_conflict_maps_to_already_exists() {
        let inner = InMemoryAccountStore::new();
        let service = test_service_with_store(Arc::new(BlindLookupStore { inner: inner.clone() }));
        let token = service.signup("a@x.com", "alice", "pass1234").await.unwrap();
        let id = service.token_service().verify(&token).unwrap();
        service.signup("b@x.com", "bob", "pass5678").await.unwrap();

        assert_eq!(
            service.update_profile(id, "pass1234", nickname_change("bob"), None).await,
            Err(AuthError::AlreadyExists(AccountField::Nickname))
        );
        assert_eq!(inner.find_by_id(id).await.unwrap().unwrap().nickname, "alice");
    }

    // ===== profile / list / delete =====

    #[tokio::test]
    async fn test_profile_list_and_delete() {
        let (service, _) = test_service();
        let id = signup_alice(&service).await;
        service.signup("b@x.com", "bob", "pass5678").await.unwrap();

        let profile = service.profile(id).await.unwrap();
        assert_eq!(profile.nickname, "alice");

        let listed = service.list_accounts().await.unwrap();
        assert_eq!(listed.len(), 2);

        service.delete_account(id).await.unwrap();
        assert_eq!(service.profile(id).await, Err(AuthError::NotFound));
        assert_eq!(service.delete_account(id).await, Err(AuthError::NotFound));
        assert_eq!(service.list_accounts().await.unwrap().len(), 1);
    }

    // ===== end-to-end scenario =====

    #[tokio::test]
    async fn test_account_lifecycle_scenario() {
        let (service, _) = test_service();
        let tokens = service.token_service();

        let t1 = service.signup("a@x.com", "alice", "pass1234").await.unwrap();
        let a_id = tokens.verify(&t1).unwrap();

        assert_eq!(
            service.signup("a@x.com", "alice", "pass1234").await,
            Err(AuthError::AlreadyExists(AccountField::Email))
        );
        assert_eq!(
            service.signin("a@x.com", "wrong", None).await,
            Err(AuthError::InvalidCredentials)
        );

        let t2 = service.signin("a@x.com", "pass1234", None).await.unwrap();
        assert_eq!(tokens.verify(&t2).unwrap(), a_id);

        assert_eq!(
            service.update_profile(a_id, "pass1234", password_change("pass1234"), None).await,
            Err(AuthError::NoOpChange(AccountField::Password))
        );

        let view = service
            .update_profile(a_id, "pass1234", nickname_change("bob"), None)
            .await
            .unwrap();
        assert_eq!((view.email.as_str(), view.nickname.as_str()), ("a@x.com", "bob"));
        assert!(service.signin("a@x.com", "pass1234", None).await.is_ok());
    }
}
