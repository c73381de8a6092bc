pub mod editor_service;

pub use editor_service::*;
