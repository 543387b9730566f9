use super::models::{ChatSendRequest, ChatStartResponse, ClientNameRequest};
use crate::error::ApiError;
use crate::model::ChatMessage;
use reqwest::{Client, Response, Url};

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = parse_base(base_url)?;
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn run_segmentation(&self) -> Result<(), ApiError> {
        let url = self.endpoint("seg")?;
        log::info!("Requesting segmentation from {url}");
        let response = self.http.post(url).send().await?;
        ensure_success(response).await.map(|_| ())
    }

    pub async fn generate_report(&self, client_name: &str) -> Result<(), ApiError> {
        let url = self.endpoint("report")?;
        log::info!("Requesting report for {client_name} from {url}");
        let response = self
            .http
            .post(url)
            .json(&ClientNameRequest { client_name })
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }

    pub async fn start_chat(&self, client_name: &str) -> Result<Vec<ChatMessage>, ApiError> {
        let url = self.endpoint("chat/start")?;
        log::info!("Starting chat session for {client_name}");
        let response = self
            .http
            .post(url)
            .json(&ClientNameRequest { client_name })
            .send()
            .await?;
        let body = ensure_success(response).await?.bytes().await?;
        let parsed: ChatStartResponse = serde_json::from_slice(&body)?;
        Ok(parsed.messages)
    }

    pub async fn send_chat(&self, message: &str) -> Result<ChatMessage, ApiError> {
        let url = self.endpoint("chat/send")?;
        log::debug!("Sending chat message ({} chars)", message.len());
        let response = self
            .http
            .post(url)
            .json(&ChatSendRequest { message })
            .send()
            .await?;
        let body = ensure_success(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|_| ApiError::InvalidUrl(format!("{}{path}", self.base)))
    }
}

pub(crate) fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|_| ApiError::InvalidUrl(raw.to_string()))
}

pub(crate) async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            status,
            url: response.url().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChatRole;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn start_chat_posts_client_name_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/start"))
            .and(body_json(json!({ "client_name": "Bob" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [
                    { "role": "user", "content": "Here are the client data" },
                    { "role": "assistant", "content": "I'm your clinical radiology assistant." }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let messages = client.start_chat("Bob").await.unwrap();
        assert_eq!(
            messages,
            vec![
                ChatMessage::user("Here are the client data"),
                ChatMessage::assistant("I'm your clinical radiology assistant."),
            ]
        );
    }

    #[tokio::test]
    async fn send_chat_returns_the_assistant_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .and(body_json(json!({ "message": "How is the tumor trending?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "role": "assistant",
                "content": "The maximum diameter rose from **0.74** to **1.05** cm."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let reply = client.send_chat("How is the tumor trending?").await.unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert!(reply.content.contains("1.05"));
    }

    #[tokio::test]
    async fn report_and_segmentation_report_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/report"))
            .and(body_json(json!({ "client_name": "Alice" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/seg"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        client.generate_report("Alice").await.unwrap();
        let err = client.run_segmentation().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn malformed_reply_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let err = client.send_chat("hi").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn base_path_is_preserved() {
        let client = BackendClient::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            client.endpoint("chat/start").unwrap().as_str(),
            "http://localhost:8000/api/chat/start"
        );
        assert!(BackendClient::new("not a url").is_err());
    }
}
