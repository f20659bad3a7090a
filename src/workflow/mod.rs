pub mod input;
pub mod ticket;
