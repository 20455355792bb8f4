//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument.

pub mod central_admin_repo;
pub mod dataset_repo;
pub mod global_model_repo;
pub mod hospital_repo;
pub mod training_run_repo;
pub mod weight_snapshot_repo;
pub mod weight_transfer_repo;

pub use central_admin_repo::CentralAdminRepo;
pub use dataset_repo::DatasetRepo;
pub use global_model_repo::GlobalModelRepo;
pub use hospital_repo::HospitalRepo;
pub use training_run_repo::TrainingRunRepo;
pub use weight_snapshot_repo::WeightSnapshotRepo;
pub use weight_transfer_repo::WeightTransferRepo;
