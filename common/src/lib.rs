//! Ratekeeper Common Types
//!
//! Shared types used across the Ratekeeper crates: normalized currency codes,
//! currency pairs, dated exchange rates and the clock abstraction used for
//! cache expiry and "today" resolution.

pub mod currency;
pub mod rate;
pub mod error;
pub mod time;

pub use currency::*;
pub use rate::*;
pub use error::*;
pub use time::*;
