pub mod bootstrap;
pub mod client;
pub mod config;
pub mod models;
pub mod screens;
pub mod services;
pub mod web;

pub use client::*;
pub use config::*;
pub use models::*;
