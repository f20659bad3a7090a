pub mod owners;
pub mod project;
pub mod ticket;
pub mod user;
