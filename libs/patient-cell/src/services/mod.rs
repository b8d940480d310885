pub mod patient;

pub use patient::PatientRegistry;
