pub mod google_calendar;
pub mod init;
pub mod mail;
pub mod projector;
pub mod sync;
