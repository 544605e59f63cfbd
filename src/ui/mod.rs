pub mod display;
pub mod models;
