pub mod config;
pub mod enums;
pub mod error;
pub mod models;
pub mod db;
pub mod providers;
pub mod services;
pub mod screens;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use enums::{ FavoriteAction, SortOrder };
pub use error::{ AppError, NetworkError, Result };
