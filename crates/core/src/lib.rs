//! `refhub-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod email;
pub mod entity;
pub mod error;
pub mod fields;
pub mod id;
pub mod upload;

pub use email::Email;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use fields::Fields;
pub use id::{ProductId, RankingId, ReferralId, TicketId, UserId};
pub use upload::{FileRef, Upload, UploadKind, MAX_UPLOAD_BYTES};
