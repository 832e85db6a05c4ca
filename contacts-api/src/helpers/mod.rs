pub mod database;
pub mod geo;
pub mod owner;
