//! HTTP access to the remote game authority.

mod client;
mod error;
mod wire;

pub use client::{ApiClient, GAME_API_PREFIX};
pub use error::{ApiError, ApiErrorKind};
pub use wire::{MoveRequest, MoveResponse};
