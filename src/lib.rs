pub mod backup;
pub mod repository;
pub mod server;
pub mod settings;
pub mod status;
