//! Business operations.
//!
//! Handlers parse the request and hand the [`Actor`](crate::auth::Actor) to a
//! service function; services resolve the user, run the ownership gate and
//! talk to the [`Store`](crate::store::Store). Nothing here knows about HTTP.

pub mod accounts;
pub mod motivation;
pub mod password_reset;
pub mod projects;
pub mod sorting;
pub mod tasks;
