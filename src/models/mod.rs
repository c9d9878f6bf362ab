//! Core data models for Cryptaris

pub mod ids;
pub mod link;

pub use ids::{LinkId, LINK_ID_LEN};
pub use link::{epoch_seconds_now, LinkRecord};
