//! Domain layer for the Hygieia federated coordination service.
//!
//! Pure logic only: no database, no HTTP. The `db` and `api` crates build on
//! the types and functions exposed here.

pub mod aggregation;
pub mod dataset;
pub mod error;
pub mod registration;
pub mod training;
pub mod types;
