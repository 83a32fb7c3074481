pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod inference;
pub mod init;
pub mod models;
pub mod services;
pub mod utils;

pub use error::SentimentError;
