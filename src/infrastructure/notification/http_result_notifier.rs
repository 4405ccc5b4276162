use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::ports::{NotifierError, ResultNotifier};
use crate::domain::{StageFailure, StageOutcome, StreamId, TaskKind};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts stage results to `<api_url>/processor/<endpoint>`, authenticated
/// with the shared processor token.
pub struct HttpResultNotifier {
    client: reqwest::Client,
    api_url: String,
    processor_token: String,
}

impl HttpResultNotifier {
    pub fn new(api_url: impl Into<String>, processor_token: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: api_url.trim_end_matches('/').to_string(),
            processor_token: processor_token.into(),
        }
    }

    async fn post<T: Serialize + Sync>(&self, endpoint: &str, body: &T) -> Result<(), NotifierError> {
        let url = format!("{}/processor/{}", self.api_url, endpoint);
        tracing::debug!(url = %url, "Posting stage result");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.processor_token)
            .json(body)
            .send()
            .await
            .map_err(|e| NotifierError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(NotifierError::Rejected { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl ResultNotifier for HttpResultNotifier {
    async fn notify_success(&self, outcome: &StageOutcome) -> Result<(), NotifierError> {
        self.post(outcome.task().success_endpoint(), outcome).await
    }

    async fn notify_failure(
        &self,
        task: TaskKind,
        stream_id: &StreamId,
    ) -> Result<(), NotifierError> {
        let body = StageFailure {
            stream_id: stream_id.clone(),
        };
        self.post(&task.failure_endpoint(), &body).await
    }
}
