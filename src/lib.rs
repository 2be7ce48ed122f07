pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod stats;
pub mod storage;
pub mod state;
pub mod view;

pub use app::router;
pub use state::AppState;
pub use stats::{aggregate, aggregate_at, today_snapshot};
pub use storage::{load_dataset, resolve_data_path};
