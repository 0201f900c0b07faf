/*!
 * Hosted-model engines.
 *
 * Document translation still runs through pdf2zh (pointed at the hosted
 * service with the configured model and key); the HTTP client of each
 * service is used for the connection preflight.
 */

use async_trait::async_trait;

use crate::app_config::Engine;
use crate::errors::ProviderError;
use crate::providers::anthropic::Anthropic;
use crate::providers::gemini::Gemini;
use crate::providers::openai::OpenAI;
use crate::providers::pdf2zh::Pdf2zh;
use crate::providers::{Backend, BackendJob, BackendOutput};

/// Credentials and options of an API engine
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Rendered system prompt for the preflight request
    pub system_prompt: String,
}

/// HTTP client of the selected service
#[derive(Debug, Clone)]
enum ApiClient {
    OpenAI(OpenAI),
    Gemini(Gemini),
    Anthropic(Anthropic),
}

/// Backend for the OpenAI, Gemini and Claude engines
#[derive(Debug, Clone)]
pub struct ApiBackend {
    engine: Engine,
    runner: Pdf2zh,
    client: ApiClient,
    model: String,
    system_prompt: String,
}

impl ApiBackend {
    /// Wire an API engine on top of a pdf2zh runner
    ///
    /// `engine` must be one of the API engines; the default engine has no
    /// hosted service and is built directly from [`Pdf2zh`].
    pub fn new(engine: Engine, runner: Pdf2zh, settings: ApiSettings) -> Self {
        let ApiSettings {
            api_key,
            endpoint,
            model,
            timeout_secs,
            system_prompt,
        } = settings;

        let (service, env_var, client) = match engine {
            Engine::Gemini => (
                "gemini",
                "GEMINI_API_KEY",
                ApiClient::Gemini(Gemini::new(api_key.clone(), endpoint, timeout_secs)),
            ),
            Engine::Claude => (
                "anthropic",
                "ANTHROPIC_API_KEY",
                ApiClient::Anthropic(Anthropic::new(api_key.clone(), endpoint, timeout_secs)),
            ),
            Engine::OpenAI | Engine::Default => (
                "openai",
                "OPENAI_API_KEY",
                ApiClient::OpenAI(OpenAI::new(api_key.clone(), endpoint, timeout_secs)),
            ),
        };

        let service_spec = if model.is_empty() {
            service.to_string()
        } else {
            format!("{}:{}", service, model)
        };

        Self {
            engine,
            runner: runner.service(service_spec).env(env_var, api_key),
            client,
            model,
            system_prompt,
        }
    }

    /// Runner used for document translation
    pub fn runner(&self) -> &Pdf2zh {
        &self.runner
    }
}

#[async_trait]
impl Backend for ApiBackend {
    fn engine(&self) -> Engine {
        self.engine
    }

    async fn translate(&self, job: &BackendJob) -> Result<BackendOutput, ProviderError> {
        self.runner.run(job).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.client {
            ApiClient::OpenAI(client) => client.test_connection(&self.model, &self.system_prompt).await,
            ApiClient::Gemini(client) => client.test_connection(&self.model, &self.system_prompt).await,
            ApiClient::Anthropic(client) => client.test_connection(&self.model, &self.system_prompt).await,
        }
    }
}
