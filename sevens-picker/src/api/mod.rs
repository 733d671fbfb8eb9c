//! HTTP API handlers for sevens-picker

pub mod albums;
pub mod health;
pub mod overview;

pub use albums::album_routes;
pub use health::health_routes;
pub use overview::overview_routes;
