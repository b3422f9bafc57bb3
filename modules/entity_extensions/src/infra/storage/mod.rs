//! Storage layer - statement building, repositories and table bootstrap

pub mod mapper;
pub mod migrations;
pub mod query;
pub mod repositories;

pub use migrations::ensure_tables;
pub use repositories::SeaOrmExtensionRepository;
