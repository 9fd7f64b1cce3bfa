//! HTTP API handlers.
//!
//! - `admin`: event lifecycle and schedule inspection, nested under `/admin`
//! - `user`: participant surface (active events, bid intake)

pub mod admin;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;
