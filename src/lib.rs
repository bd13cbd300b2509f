pub mod bot;
pub mod cli;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod llm;
pub mod scheduler;
pub mod summary;
pub mod transport;
