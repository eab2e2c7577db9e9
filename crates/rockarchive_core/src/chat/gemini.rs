//! Google Generative Language API client.
//!
//! Uses the blocking `generateContent` endpoint; the calling thread waits
//! for the full answer.

use super::service::{GenerationService, ServiceError};
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";
const GENERATE_CONTENT_METHOD: &str = "generateContent";

/// Generation service backed by a Gemini model.
pub struct GeminiService {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiService {
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com`.
    /// * `model` - Model id without the `models/` prefix, e.g. `gemini-2.5-flash`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, model)
    }

    /// Same as `new`, over a caller-configured HTTP client.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists the models that accept `generateContent` for this key.
    pub fn list_models(&self, credential: &str) -> Result<Vec<String>, ServiceError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, credential)
            .send()
            .map_err(map_transport_error)?;
        let body: ModelsResponse = check_status(response)?
            .json()
            .map_err(|e| ServiceError::InvalidResponse(format!("failed to parse model list: {e}")))?;

        Ok(body
            .models
            .into_iter()
            .filter(|model| {
                model
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == GENERATE_CONTENT_METHOD)
            })
            .map(|model| model.name)
            .collect())
    }
}

impl GenerationService for GeminiService {
    fn generate(&self, prompt: &str, credential: &str) -> Result<String, ServiceError> {
        let url = format!(
            "{}/v1beta/models/{}:{GENERATE_CONTENT_METHOD}",
            self.base_url, self.model
        );
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!(
            "event=generate module=chat status=start model={} prompt_chars={}",
            self.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, credential)
            .json(&request)
            .send()
            .map_err(map_transport_error)?;
        let body: GenerateResponse = check_status(response)?
            .json()
            .map_err(|e| ServiceError::InvalidResponse(format!("failed to parse answer: {e}")))?;

        extract_text(body)
    }
}

fn map_transport_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout
    } else {
        ServiceError::Connection(err.to_string())
    }
}

fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => ServiceError::RateLimited,
        _ => ServiceError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

fn extract_text(body: GenerateResponse) -> Result<String, ServiceError> {
    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::InvalidResponse("response has no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(ServiceError::InvalidResponse(format!(
            "candidate has no text (finish reason: {reason})"
        )));
    }
    Ok(text)
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{
        extract_text, GeminiService, GenerateRequest, GenerateResponse, RequestContent,
        RequestPart,
    };
    use crate::chat::{GenerationService, ServiceError};
    use reqwest::blocking::Client;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    const ANSWER_BODY: &str = r#"{"candidates":[{"content":{"parts":[{"text":"Formed in 2009."}]}}]}"#;

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    /// Local server answering one request with a canned response.
    ///
    /// Returns the base URL and a handle yielding the raw request text.
    fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        (base_url, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = stream.read(&mut chunk).unwrap();
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let Some(header_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|value| value.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn service_at(base_url: &str) -> GeminiService {
        let client = Client::builder().no_proxy().build().unwrap();
        GeminiService::with_client(client, base_url, "m")
    }

    fn generate_against(status_line: &str, body: &str) -> (Result<String, ServiceError>, String) {
        let (base_url, server) = serve_once(status_line, body);
        let result = service_at(&base_url).generate("hello", "secret");
        (result, server.join().unwrap())
    }

    #[test]
    fn generate_posts_prompt_with_key_header_to_model_path() {
        let (result, request) = generate_against("200 OK", ANSWER_BODY);

        assert_eq!(result.unwrap(), "Formed in 2009.");
        assert!(request.starts_with("POST /v1beta/models/m:generateContent HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: secret"));
        assert!(request.contains(r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#));
    }

    #[test]
    fn unauthorized_maps_to_auth() {
        let (result, _) = generate_against("401 Unauthorized", "API key not valid");
        assert_eq!(
            result.unwrap_err(),
            ServiceError::Auth("API key not valid".to_string())
        );
    }

    #[test]
    fn forbidden_maps_to_auth() {
        let (result, _) = generate_against("403 Forbidden", "denied");
        assert!(matches!(result.unwrap_err(), ServiceError::Auth(_)));
    }

    #[test]
    fn too_many_requests_maps_to_rate_limited() {
        let (result, _) = generate_against("429 Too Many Requests", "quota");
        assert_eq!(result.unwrap_err(), ServiceError::RateLimited);
    }

    #[test]
    fn other_failure_status_maps_to_api_error() {
        let (result, _) = generate_against("500 Internal Server Error", "boom");
        assert_eq!(
            result.unwrap_err(),
            ServiceError::Api {
                status: 500,
                message: "boom".to_string(),
            }
        );
    }

    #[test]
    fn undecodable_body_maps_to_invalid_response() {
        let (result, _) = generate_against("200 OK", "not json");
        assert!(matches!(result.unwrap_err(), ServiceError::InvalidResponse(_)));
    }

    #[test]
    fn refused_connection_maps_to_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = service_at(&base_url).generate("hello", "secret").unwrap_err();
        assert!(matches!(err, ServiceError::Connection(_)));
    }

    #[test]
    fn list_models_keeps_generate_content_models() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"models":[
                {"name":"models/gemini-2.5-flash","supportedGenerationMethods":["generateContent","countTokens"]},
                {"name":"models/text-embedding-004","supportedGenerationMethods":["embedContent"]}
            ]}"#,
        );

        let models = service_at(&base_url).list_models("secret").unwrap();
        let request = server.join().unwrap();

        assert_eq!(models, vec!["models/gemini-2.5-flash".to_string()]);
        assert!(request.starts_with("GET /v1beta/models HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: secret"));
    }

    #[test]
    fn request_body_matches_wire_shape() {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn extract_text_joins_parts_of_first_candidate() {
        let body = parse(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"Taknara "},{"text":"formed in 2009."}]}},
                {"content":{"parts":[{"text":"ignored"}]}}
            ]}"#,
        );
        assert_eq!(extract_text(body).unwrap(), "Taknara formed in 2009.");
    }

    #[test]
    fn extract_text_rejects_empty_candidates() {
        let err = extract_text(parse(r#"{}"#)).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[test]
    fn extract_text_reports_finish_reason_when_blocked() {
        let err = extract_text(parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#))
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
