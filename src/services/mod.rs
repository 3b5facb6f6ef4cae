pub mod ai;
pub mod auth;
pub mod customers;
pub mod films;
pub mod rentals;
pub mod session;
pub mod token;
