use async_trait::async_trait;
use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};

use super::prompt::{
    SYSTEM_PROMPT,
    build_prompt,
};
use super::{
    TranslationError,
    TranslationRequest,
    Translator,
};
use crate::config::LocalizeSettings;

/// `POST {api_base_url}/chat/completions` で翻訳する
#[derive(Debug, Clone)]
pub struct OpenAiTranslator {
    /// HTTP クライアント（タイムアウト設定済み）
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    /// `.../chat/completions` の完全な URL
    endpoint: String,
}

/// リクエストボディ
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// レスポンスのうち使う部分だけ
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiTranslator {
    /// # Errors
    /// HTTP クライアントを初期化できない場合
    pub fn new(
        api_key: impl Into<String>,
        settings: &LocalizeSettings,
    ) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            endpoint: format!("{}/chat/completions", settings.api_base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, request: &TranslationRequest<'_>) -> Result<String, TranslationError> {
        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
            temperature: self.temperature,
        };

        tracing::debug!(
            target_language = request.target_language,
            model = %self.model,
            "Sending translation request"
        );

        let response =
            self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Provider { status: status.as_u16(), body });
        }

        let text = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(TranslationError::InvalidResponse)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(TranslationError::EmptyResponse)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use serde_json::json;
    use wiremock::matchers::{
        body_partial_json,
        header,
        method,
        path,
    };
    use wiremock::{
        Mock,
        MockServer,
        ResponseTemplate,
    };

    use super::*;

    fn request() -> TranslationRequest<'static> {
        TranslationRequest {
            text: "%@ items remaining",
            source_language: "en",
            target_language: "es",
            context: Some("Inbox counter"),
        }
    }

    fn translator(server: &MockServer) -> OpenAiTranslator {
        let settings = LocalizeSettings {
            api_base_url: format!("{}/v1/", server.uri()),
            ..LocalizeSettings::default()
        };
        OpenAiTranslator::new("test-key", &settings).unwrap()
    }

    fn completion(content: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        }))
    }

    #[tokio::test]
    async fn returns_raw_content_of_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "gpt-4" })))
            .respond_with(completion(json!("❮%@ elementos restantes❯")))
            .expect(1)
            .mount(&server)
            .await;

        let raw = translator(&server).translate(&request()).await.unwrap();

        assert_that!(raw, eq("❮%@ elementos restantes❯"));
    }

    #[tokio::test]
    async fn sends_system_and_user_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": build_prompt(&request()) }
                ]
            })))
            .respond_with(completion(json!("❮ok❯")))
            .expect(1)
            .mount(&server)
            .await;

        let result = translator(&server).translate(&request()).await;

        assert_that!(result, ok(eq("❮ok❯")));
    }

    #[tokio::test]
    async fn non_success_status_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let result = translator(&server).translate(&request()).await;

        assert!(matches!(
            result,
            Err(TranslationError::Provider { status: 429, ref body }) if body == "rate limited"
        ));
    }

    #[tokio::test]
    async fn missing_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(completion(json!(null))).mount(&server).await;

        let result = translator(&server).translate(&request()).await;

        assert!(matches!(result, Err(TranslationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn no_choices_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let result = translator(&server).translate(&request()).await;

        assert!(matches!(result, Err(TranslationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn undecodable_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = translator(&server).translate(&request()).await;

        assert!(matches!(result, Err(TranslationError::InvalidResponse(_))));
    }
}
