pub mod audio;
pub mod config;
pub mod error;
pub mod health;
pub mod job;
pub mod routes;
pub mod rvc;
pub mod state;
pub mod utils;
pub mod voice;
