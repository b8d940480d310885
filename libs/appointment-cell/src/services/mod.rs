pub mod alternatives;
pub mod booking;
pub mod conflict;
pub mod matrix;
pub mod timing;

pub use alternatives::{get_recurring_slot_alternatives, SchedulingContext};
pub use booking::AppointmentBookingService;
pub use conflict::can_book_appointment;
pub use matrix::build_schedule_matrix;
pub use timing::ClinicTimingTable;
