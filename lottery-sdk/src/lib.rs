//! Shared DTOs for the lottery draw server.
//!
//! `objects` holds the HTTP request/response bodies and the webhook payloads
//! posted when an occurrence opens or concludes.

pub mod objects;
