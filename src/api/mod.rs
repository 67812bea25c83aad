pub mod approvals;
pub mod auth;
pub mod availability;
pub mod bookings;
pub mod dashboard;
pub mod guests;
pub mod health;
pub mod rooms;
pub mod staff;
