pub mod activations;
pub mod bookings;
pub mod calendar;
pub mod contact;
pub mod health;
pub mod performers;
pub mod venues;
