//! Identity credential: value type, durable copy and startup lifecycle.

mod lifecycle;
mod store;

pub use lifecycle::{
    Bootstrap, CredentialLifecycle, CredentialSource, LoginProvider, TOKEN_QUERY_PARAM,
    UrlParseError, login_url, take_token,
};
pub use store::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError,
};
