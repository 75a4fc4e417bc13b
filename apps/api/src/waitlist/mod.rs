pub mod gateway;
pub mod handlers;
pub mod repository;
