pub mod config;
pub mod matching;
pub mod posting;
pub mod user;
