pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod intake;
pub mod models;
pub mod onboarding;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;
pub mod waitlist;

#[cfg(test)]
mod test_utils;
