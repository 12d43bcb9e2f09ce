//! HTTP adapter for the council backend

use super::wire::{
    self, API_KEYS_PATH, ANSWER_PATH, AnswerBody, AnswerResponse, ApiKeysResponse,
    CONCLUSION_PATH, ConclusionBody, ConclusionResponse, LOCAL_INSTANCE_PATH,
    LocalInstanceResponse, MODELS_PATH, OrderedAnswers, PERSPECTIVES_PATH, PerspectivesResponse,
};
use crate::config::FileBackendConfig;
use async_trait::async_trait;
use council_application::ports::council_gateway::{
    CouncilGateway, GatewayError, GeneratedAnswer, GeneratedConclusion,
};
use council_domain::{ModelId, PerspectiveCatalog, PerspectiveId, Provider};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// [`CouncilGateway`] backed by the REST backend
pub struct HttpCouncilGateway {
    client: Client,
    base_url: String,
}

impl HttpCouncilGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Other(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &FileBackendConfig) -> Result<Self, GatewayError> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::Connection(e.to_string())
    } else {
        GatewayError::Other(e.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(GatewayError::Http {
            status: status.as_u16(),
            message: wire::error_message(&body),
        });
    }
    serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
}

#[async_trait]
impl CouncilGateway for HttpCouncilGateway {
    async fn perspectives(&self) -> Result<PerspectiveCatalog, GatewayError> {
        let response: PerspectivesResponse = self.get_json(PERSPECTIVES_PATH, &[]).await?;
        Ok(PerspectiveCatalog::from_pairs(response))
    }

    async fn provider_availability(&self, provider: &Provider) -> Result<bool, GatewayError> {
        match provider {
            Provider::Local => {
                let response: LocalInstanceResponse =
                    self.get_json(LOCAL_INSTANCE_PATH, &[]).await?;
                Ok(response.available)
            }
            Provider::OpenRouter => {
                let response: ApiKeysResponse = self.get_json(API_KEYS_PATH, &[]).await?;
                Ok(response.openrouter)
            }
            other => {
                debug!("No availability check for provider {}", other);
                Ok(false)
            }
        }
    }

    async fn models(&self, provider: &Provider) -> Result<Vec<ModelId>, GatewayError> {
        let models: Vec<String> = self
            .get_json(MODELS_PATH, &[("provider", provider.as_str())])
            .await?;
        Ok(models.into_iter().map(ModelId::from).collect())
    }

    async fn answer(
        &self,
        question: &str,
        perspective: &PerspectiveId,
        model: &ModelId,
    ) -> Result<GeneratedAnswer, GatewayError> {
        let body = AnswerBody {
            question,
            perspective: perspective.as_str(),
            model: model.as_str(),
        };
        let response: AnswerResponse = self.post_json(ANSWER_PATH, &body).await?;
        if let Some(echoed) = response.perspective.as_deref()
            && echoed != perspective.as_str()
        {
            warn!(
                "Backend answered for '{}' instead of '{}'",
                echoed, perspective
            );
        }
        Ok(GeneratedAnswer {
            answer: response.answer,
            metadata: response.metadata.unwrap_or_default(),
        })
    }

    async fn conclusion(
        &self,
        answers: &[(PerspectiveId, String)],
        model: &ModelId,
    ) -> Result<GeneratedConclusion, GatewayError> {
        let body = ConclusionBody {
            answers: OrderedAnswers(answers),
            model: model.as_str(),
        };
        let response: ConclusionResponse = self.post_json(CONCLUSION_PATH, &body).await?;
        Ok(GeneratedConclusion {
            conclusion: response.conclusion,
            metadata: response.metadata.unwrap_or_default(),
        })
    }
}
