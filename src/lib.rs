//! Revista Flipbook Library
//!
//! Presentation-independent core of the flipbook viewer plus the
//! upload/config server used by the branding editor.
//!
//! # Modules
//!
//! - `site`: Site configuration (branding, texts, PDF source) and its loader
//! - `render`: PDF rasterization into page + thumbnail images
//! - `viewer`: Flip navigator, zoom/pan, session persistence, filmstrip
//! - `editor`: Admin editor model and HTTP client
//! - `routes`: Upload and save endpoints

pub mod config;
pub mod editor;
pub mod error;
pub mod render;
pub mod routes;
pub mod site;
pub mod state;
pub mod upload;
pub mod viewer;

pub use config::ServerConfig;
pub use state::AppState;
