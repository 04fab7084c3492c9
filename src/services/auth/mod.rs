pub mod claims;
pub mod engine;
pub mod factory;
pub mod key_material;
pub mod principal;
pub mod rejection;
pub mod signature;
pub mod token;

pub use engine::{AuthSettings, TokenAuthenticator};
pub use factory::build_authenticator;
pub use key_material::{KeyMaterialError, KeyMaterialProvider, KeySource, StaticKeyProvider};
pub use principal::AuthenticatedPrincipal;
pub use rejection::Rejection;
pub use token::DEFAULT_MAX_TOKEN_BYTES;
