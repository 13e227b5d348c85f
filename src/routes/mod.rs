pub mod admin;
pub mod auth;
pub mod bookmarks;
pub mod export;
pub mod tags;
