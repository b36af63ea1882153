use crate::config::Config;
use crate::services::activity::Activity;
use crate::services::browser::Browser;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub browser: Arc<Browser>,
    pub activity: Arc<Activity>,
    pub config: Arc<Config>,
}
