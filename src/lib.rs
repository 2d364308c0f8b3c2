// Identity & credential lifecycle core
//
// Links external provider accounts to a canonical user, stores and rotates
// the associated tokens, deduplicates cross-platform entity records, and
// issues hashed per-user stream keys. Consumed as a library by the HTTP/OAuth
// callback layer, which owns transport, sessions, and pagination.

pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;
pub mod store;

pub use error::{IdentityError, RefreshError, Result};

// Re-export commonly used types
pub use config::{Config, ProviderConfig};
pub use models::{
    Credential, Entity, NewEntity, ProfileInfo, Provider, ProviderIdentity, TokenPair, User,
};
pub use providers::{ProviderClient, ProviderRegistry};
pub use services::{AccountLinker, EntityResolver, LinkedAccount, StreamKeyGenerator, TokenRefresher};
pub use store::{IdentityStore, MemoryStore, PgStore};
