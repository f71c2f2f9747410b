//! Data transfer objects for the admin endpoints.

pub mod response;
