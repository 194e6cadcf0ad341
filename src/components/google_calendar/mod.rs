//! Google Calendar as the event store: an actor owning the HTTP client and
//! service-account token, fronted by a cloneable handle.

mod actor;
mod handle;
pub mod models;
pub mod token;

pub use handle::GoogleCalendarHandle;
pub use models::ServiceAccountKey;
