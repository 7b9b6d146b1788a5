//! Session state for the admin shell.
//!
//! A [`Session`] remembers who is signed in, persists the credentials in a
//! [`SessionStore`], hands the bearer token to HTTP clients through
//! [`TokenSource`], and marks the end of a login: [`Session::logout`] clears the
//! store and resets every cache registered with it.

mod auth;
mod session;
pub mod store;

pub use auth::{AuthState, UnknownRole, UserRole};
pub use session::{Session, TokenSource};
pub use store::{MemorySessionStore, SessionStore};
