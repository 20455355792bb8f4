//! Authentication extractors.
//!
//! - [`auth::CentralOperator`] -- Requires a valid central operator JWT.

pub mod auth;
