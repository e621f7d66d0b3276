pub mod activation;
pub mod booking;
pub mod contact_message;
pub mod performer;
pub mod venue;

pub use activation::ActivationRepository;
pub use booking::BookingRepository;
pub use contact_message::ContactMessageRepository;
pub use performer::PerformerRepository;
pub use venue::VenueRepository;
