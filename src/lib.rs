pub mod crawlers;
pub mod db;
pub mod domain;
pub mod inference;
pub mod models;
pub mod processing;
pub mod repository;
pub mod schema;
