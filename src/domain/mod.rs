pub mod matcher;
pub mod models;
pub mod settings;
