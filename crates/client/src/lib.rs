//! Orvio API client
//!
//! Typed clients for the Orvio SMS/OTP delivery platform. The public client
//! covers the token-less sign-in bootstrap endpoints (send/resend/verify OTP,
//! token refresh); the authenticated client attaches a bearer access token to
//! every request and transparently recovers once from an expired token by
//! exchanging the refresh token and replaying the request.

pub mod client;
pub mod session;
pub mod types;
pub mod validation;

pub use client::error::ClientError;
pub use client::{AuthenticatedOrvioClient, OrvioClientBuilder, PublicOrvioClient};
pub use session::{MemorySessionStore, Session, SessionStore, SessionStoreError};
