pub mod auth;
pub mod central;
pub mod hospital;
pub mod weights;
