pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod permissions;
pub mod resources;
pub mod server;
pub mod types;

#[cfg(test)]
pub mod testing;
