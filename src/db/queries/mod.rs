pub mod approvals;
pub mod availability;
pub mod bookings;
pub mod dashboard;
pub mod guests;
pub mod rooms;
pub mod staff;
