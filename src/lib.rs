//! # `auth_client` (Session-aware authentication API client)
//!
//! `auth_client` is the client-side half of an authentication service: it
//! owns the persisted session (opaque bearer token plus a lightweight user
//! record), wraps every outgoing request with auth headers and uniform
//! error normalization, and exposes the auth flows as typed async
//! operations. Rendering, notifications, and navigation belong to the
//! embedding application.
//!
//! ## Session lifecycle
//!
//! - **Login** stores the returned session token (and refresh token, when
//!   issued) and a user record derived from the submitted email.
//! - **Signup** records the email as pending; **verification** (email-link
//!   or OTP) completes the account, adopting a returned session token when
//!   the server issues one.
//! - **Expiry** is discovered reactively: a 401 from any endpoint except
//!   the login endpoint clears the store and surfaces
//!   [`ApiError::Unauthenticated`]; the caller decides what to do next. A
//!   401 from the login endpoint means bad credentials and never touches
//!   the store.
//! - **Logout** notifies the server best-effort and always clears the
//!   local session.
//!
//! Endpoint paths and token field names vary across deployments, so both
//! are configuration: see [`Endpoints`] and the serde aliases in
//! [`types`]. Token material is held as [`secrecy::SecretString`] and must
//! never be logged.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod session;
pub mod types;

pub use api::ApiClient;
pub use auth::{AuthFlow, AuthState, PASSWORD_RESET_NOTICE};
pub use config::{AuthConfig, Endpoints};
pub use errors::ApiError;
pub use session::{FileStorage, MemoryStorage, SessionStore, StorageBackend, UserRecord};
