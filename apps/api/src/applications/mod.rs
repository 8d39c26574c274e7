pub mod engine;
pub mod handlers;
pub mod policy;
pub mod repository;
pub mod views;
