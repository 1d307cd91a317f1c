pub mod agenda;
pub mod app;
pub mod command;
pub mod config;
pub mod context;
pub mod events;
pub mod form;
pub mod layout;
pub mod model;
pub mod period;
pub mod ui;
