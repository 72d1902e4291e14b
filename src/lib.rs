pub mod cli;
pub mod client;
pub mod config;
pub mod earthquake;
pub mod error;
pub mod feed;
pub mod intensity;
pub mod logging;
pub mod report;
pub mod summary;
pub mod table;
