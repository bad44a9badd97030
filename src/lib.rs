pub mod app;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod ui;

pub use app::router;
pub use dataset::{load_dataset, resolve_dataset_path};
pub use state::AppState;
