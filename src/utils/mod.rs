pub mod authz;
pub mod jwt;
pub mod location;
