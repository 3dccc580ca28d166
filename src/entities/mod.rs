pub mod booking;
pub mod city;
pub mod ride;
pub mod route;
pub mod user;
