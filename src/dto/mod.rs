pub mod auth;
pub mod orders;
pub mod partners;
pub mod products;
pub mod users;
