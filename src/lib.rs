// src/lib.rs

pub mod api;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod extract;
pub mod page;
pub mod state;
pub mod tasks;
pub mod telegram;
pub mod watch;

pub use error::{Result, WatchError};
