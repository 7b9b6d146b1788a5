//! Singleton resource cache with de-duplicated fetches, write-through updates
//! and change broadcast.
//!

pub use signet_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use signet_internal::prelude::*;
}
