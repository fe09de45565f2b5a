pub mod api;
pub mod config;
pub mod database;
pub mod drive;
pub mod global;
pub mod migration;
pub mod repository;
pub mod validation;

#[cfg(test)]
mod tests;
