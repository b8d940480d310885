pub mod registry;
pub mod availability;
pub mod matching;

pub use registry::ClinicRegistry;
pub use matching::GenderMatchFilter;
