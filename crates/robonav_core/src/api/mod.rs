//! REST client for the fleet backend.

mod client;
mod sequence;

pub use client::{ApiClient, DEFAULT_ERROR_MESSAGE, LOGIN_FAILED_MESSAGE, LoginResponse};
pub use sequence::{RequestSlot, RequestTicket};
