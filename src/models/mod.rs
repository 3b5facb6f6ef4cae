pub mod auth;
pub mod customer;
pub mod film;
pub mod rental;
