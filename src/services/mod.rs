pub mod access;
pub mod audit;
pub mod auth;
pub mod authz;
pub mod jobs;
pub mod rejection;
