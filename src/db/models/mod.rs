//! Database models split into separate files, re-exported at
//! `crate::db::models` for convenience.

pub mod activation;
pub mod booking;
pub mod contact_message;
pub mod performer;
pub mod venue;

pub use self::activation::*;
pub use self::booking::*;
pub use self::contact_message::*;
pub use self::performer::*;
pub use self::venue::*;
