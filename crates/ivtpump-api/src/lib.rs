//! Async client for the IVT / Bosch K30 heat pump gateway.
//!
//! Two surfaces, one credential:
//!
//! - **[`Gateway`]**: serialized, authenticated GET/PUT against the
//!   PoinTT resource tree (`{base}/{device}/resource{path}`). Per-request
//!   failures degrade to [`RawResponse::Absent`] / `false`.
//! - **[`TokenManager`]**: keeps the SingleKey ID bearer token valid,
//!   refreshing it single-flight and handing every renewed
//!   [`Credential`] to a host-supplied [`TokenSink`].
//!
//! [`oauth`] holds the PKCE helpers and the `authorization_code` grant
//! used for the first login.

pub mod credential;
pub mod error;
pub mod gateway;
pub mod oauth;
pub mod response;
pub mod token;
pub mod transport;

pub use credential::Credential;
pub use error::Error;
pub use gateway::{Gateway, POINTT_BASE_URL, PROBE_PATH};
pub use oauth::OAuthConfig;
pub use response::RawResponse;
pub use token::{TokenManager, TokenSink};
pub use transport::{TlsMode, TransportConfig};
