pub mod config;
pub mod container;
pub mod manager;
pub mod reporter;
pub mod restful;
pub mod session;
pub mod thread;
