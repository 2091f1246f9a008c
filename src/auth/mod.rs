// Authentication module
// Password hashing, bearer tokens, account storage, the credential service and its HTTP surface

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::{AccountField, AuthError};
pub use middleware::{authenticate, AuthenticatedAccount};
pub use models::{Account, AccountView, ProfileChanges};
pub use password::PasswordService;
pub use repository::{AccountStore, InMemoryAccountStore, StoreError};
pub use service::AuthService;
pub use token::TokenService;
