pub mod central_admin;
pub mod dataset;
pub mod global_model;
pub mod hospital;
pub mod training_run;
pub mod weights;
