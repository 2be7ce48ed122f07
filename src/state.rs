use crate::models::{CategoryRanges, Dataset};
use crate::view::AnalyticsView;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub ranges: Arc<CategoryRanges>,
    pub view: Arc<Mutex<AnalyticsView>>,
}

impl AppState {
    pub fn new(dataset: Dataset, ranges: CategoryRanges) -> Self {
        Self {
            dataset: Arc::new(dataset),
            ranges: Arc::new(ranges),
            view: Arc::new(Mutex::new(AnalyticsView::default())),
        }
    }
}
