pub mod batch;
pub mod classify;
pub mod config;
pub mod dialect;
pub mod filesystem;
pub mod inline;
pub mod render;
pub mod runtime;
pub mod translate;
pub mod upload;
pub mod verify;
