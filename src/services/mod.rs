pub mod entities;
pub mod linker;
pub mod refresher;
pub mod stream_key;

pub use entities::EntityResolver;
pub use linker::{AccountLinker, LinkedAccount};
pub use refresher::TokenRefresher;
pub use stream_key::StreamKeyGenerator;
