pub mod address_space;
pub mod command;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod helpers;
pub mod mapping;
pub mod materialize;
pub mod router;
pub mod templates;
pub mod upstream;
