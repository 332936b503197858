pub mod app;
pub mod board;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod metrics;
pub mod model;
pub mod recorder;
pub mod reports;
pub mod service;
pub mod sync;

pub use app::{AppState, SharedAppState, create_app};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use gateway::{Gateway, GatewayError, MemoryGateway, Snapshot};
pub use service::Dashboard;
pub use sync::SyncResult;
