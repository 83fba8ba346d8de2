pub mod analyzer;
pub mod audit;
pub mod body;
pub mod cli;
pub mod config;
pub mod document;
pub mod domain;
pub mod editor;
pub mod error;
pub mod logger;
pub mod store;
pub mod ui;
pub mod warning;

pub use error::{BumpError, Result};
