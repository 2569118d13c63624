pub mod config;
pub mod vector;
