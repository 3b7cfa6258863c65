pub mod checker;
pub mod converter;
pub mod database;
pub mod loader;
