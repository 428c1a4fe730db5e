pub mod board;
pub mod business;
pub mod config;
pub mod db;
pub mod dnd;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod session;
pub mod settings;
pub mod stats;
pub mod tasks;
pub mod workspace;

