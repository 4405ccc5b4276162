use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::JobRepository;
use crate::application::services::StageTask;

#[derive(Clone)]
pub struct AppState {
    pub job_repository: Arc<dyn JobRepository>,
    pub task_sender: mpsc::Sender<StageTask>,
    pub processor_token: Arc<str>,
}
