//! Command handlers grouped by the API area they drive.

pub(crate) mod repos;
pub(crate) mod system;
pub(crate) mod users;
