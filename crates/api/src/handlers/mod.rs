pub mod generate;
pub mod interrupt;
pub mod requests;
