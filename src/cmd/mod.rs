pub mod setup;
pub mod ticket;
