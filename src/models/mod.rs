pub mod credential;
pub mod entity;
pub mod user;

pub use credential::{Credential, IdentityKind, Provider, ProviderIdentity, TokenPair};
pub use entity::{Entity, NewEntity};
pub use user::{ProfileInfo, User};
