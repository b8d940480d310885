pub mod error;
pub mod schedule;

pub use schedule::{
    deserialize_clinic_date, deserialize_optional_clinic_date, parse_clinic_date, Gender, ScheduleParseError, TimeSlot,
};
