//! Data models for the campus administration backend.
//!
//! Response types serialize to camelCase JSON; request types are lenient and
//! leave required-field checks to the handlers so that errors use the common envelope.

mod admin;
mod attendance;
mod course;
mod material;
mod notification;
mod timetable;
mod user;

pub use admin::*;
pub use attendance::*;
pub use course::*;
pub use material::*;
pub use notification::*;
pub use timetable::*;
pub use user::*;
