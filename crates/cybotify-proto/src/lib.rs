//! Shared types for the cybotify feed server and terminal UI.

pub mod config;
pub mod error;
pub mod model;
pub mod platform;
pub mod protocol;
