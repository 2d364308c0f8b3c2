/// Stream key generation
///
/// A stream key is a 32-byte value from the OS CSPRNG, stored only as a
/// URL-safe base64 encoding of its SHA-256 digest. The raw bytes never leave
/// this module, so the stored record cannot be turned back into a key.
use crate::error::Result;
use crate::models::User;
use crate::store::IdentityStore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

const STREAM_KEY_BYTES: usize = 32;

pub struct StreamKeyGenerator {
    store: Arc<dyn IdentityStore>,
}

impl StreamKeyGenerator {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Mint a fresh stream key for the user, overwriting any previous value,
    /// and return the updated user. Concurrent calls for the same user are
    /// last-write-wins; this is an explicit regenerate-on-demand operation.
    pub async fn generate(&self, user_id: Uuid) -> Result<User> {
        let key = mint_key();
        self.store.set_stream_key(user_id, &key).await
    }
}

fn mint_key() -> String {
    let mut raw = [0u8; STREAM_KEY_BYTES];
    OsRng.fill_bytes(&mut raw);
    URL_SAFE_NO_PAD.encode(Sha256::digest(raw))
}
