use crate::models::{
    AnswerCheckRequest, ApiSettings, FlashcardRequest, FlashcardResponse, HealthStatus,
    QuizRequest, QuizResponse, QuizResult, SummaryRequest, SummaryResponse, UploadResponse,
};
use crate::services::validation::UploadCandidate;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors from the study backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx response. `body` is the raw response text.
    #[error("Failed to {operation}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to {operation}: unexpected response ({source})")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Operations offered by the study backend.
///
/// The controller only talks to this trait, so tests can substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudyApi: Send + Sync {
    /// Upload a PDF and get its extracted text back.
    async fn upload_document(&self, document: &UploadCandidate) -> Result<UploadResponse, ApiError>;

    async fn generate_summary(&self, request: &SummaryRequest) -> Result<SummaryResponse, ApiError>;

    async fn generate_quiz(&self, request: &QuizRequest) -> Result<QuizResponse, ApiError>;

    /// Grade answers aligned by position with the correct answers.
    async fn check_answers(&self, request: &AnswerCheckRequest) -> Result<QuizResult, ApiError>;

    async fn generate_flashcards(
        &self,
        request: &FlashcardRequest,
    ) -> Result<FlashcardResponse, ApiError>;

    async fn health_check(&self) -> Result<HealthStatus, ApiError>;
}

/// [`StudyApi`] over HTTP with multipart form bodies.
#[derive(Debug, Clone)]
pub struct HttpStudyApi {
    client: Client,
    base_url: String,
}

impl HttpStudyApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        tracing::debug!(operation, path, "Sending request to study backend");
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        Self::parse(operation, response).await
    }

    async fn parse<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status.as_u16(), "Study backend returned an error");
            return Err(ApiError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { operation, source })
    }
}

#[async_trait]
impl StudyApi for HttpStudyApi {
    async fn upload_document(&self, document: &UploadCandidate) -> Result<UploadResponse, ApiError> {
        const OPERATION: &str = "upload PDF";
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.name.clone())
            .mime_str(&document.media_type)
            .map_err(|source| ApiError::Transport {
                operation: OPERATION,
                source,
            })?;
        let form = Form::new().part("file", part);
        self.post_form(OPERATION, "/upload-pdf", form).await
    }

    async fn generate_summary(&self, request: &SummaryRequest) -> Result<SummaryResponse, ApiError> {
        let mut form = Form::new()
            .text("text_content", request.text_content.clone())
            .text("summary_type", request.summary_type.as_str());
        if let Some(subject) = request.subject.as_ref().filter(|s| !s.is_empty()) {
            form = form.text("subject", subject.clone());
        }
        self.post_form("generate summary", "/generate-summary", form)
            .await
    }

    async fn generate_quiz(&self, request: &QuizRequest) -> Result<QuizResponse, ApiError> {
        let mut form = Form::new()
            .text("text_content", request.text_content.clone())
            .text("num_questions", request.num_questions.to_string())
            .text("subject", request.subject.clone())
            .text("difficulty", request.difficulty.as_str());
        if let Some(score) = request.previous_score {
            form = form.text("previous_score", score.to_string());
        }
        self.post_form("generate quiz", "/generate-quiz", form).await
    }

    async fn check_answers(&self, request: &AnswerCheckRequest) -> Result<QuizResult, ApiError> {
        let mut form = Form::new();
        for answer in &request.user_answers {
            form = form.text("user_answers", answer.clone());
        }
        for answer in &request.correct_answers {
            form = form.text("correct_answers", answer.clone());
        }
        self.post_form("check answers", "/check-answers", form).await
    }

    async fn generate_flashcards(
        &self,
        request: &FlashcardRequest,
    ) -> Result<FlashcardResponse, ApiError> {
        let form = Form::new()
            .text("text_content", request.text_content.clone())
            .text("num_cards", request.num_cards.to_string())
            .text("subject", request.subject.clone())
            .text("card_type", request.card_type.as_str());
        self.post_form("generate flashcards", "/generate-flashcards", form)
            .await
    }

    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        const OPERATION: &str = "reach study backend";
        let response = self
            .client
            .get(self.url("/health"))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                operation: OPERATION,
                source,
            })?;
        Self::parse(OPERATION, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let settings = ApiSettings {
            base_url: "http://localhost:8000/".to_string(),
            timeout_secs: 5,
        };
        let api = HttpStudyApi::new(&settings).unwrap();

        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn test_status_error_message_includes_body() {
        let err = ApiError::Status {
            operation: "generate quiz",
            status: 500,
            body: "model overloaded".to_string(),
        };

        assert_eq!(err.to_string(), "Failed to generate quiz: model overloaded");
        assert_eq!(err.status(), Some(500));
    }
}
