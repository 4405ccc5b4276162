mod health;
mod job_status;
mod tasks;

use serde::Serialize;

pub use health::health_handler;
pub use job_status::{JobStatusResponse, job_status_handler};
pub use tasks::{TaskAcceptedResponse, submit_task_handler};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
