//! AI summary of cost data via the Gemini generate-content API

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{CloudcostError, Result};

/// HTTP request timeout in seconds (generation is slow)
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Instruction sent ahead of the CSV data
pub const ANALYSIS_PROMPT: &str = "You are a cloud cost analyst. Based on the CSV data below \
(columns: month, provider, service, cost), write two sections of short bullet points. \
\"Key Findings\": the most relevant spend patterns, the largest providers and services, \
and notable changes between months. \"Recommendations\": concrete actions to reduce or \
control costs. Do not write an introduction.";

/// Produces a natural-language summary from CSV cost data
pub trait Summarizer: Send + Sync {
    fn summarize(&self, csv: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
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
struct ApiError {
    message: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String> {
        if let Some(err) = self.error {
            let message = err.message.unwrap_or_else(|| "unknown API error".to_string());
            return Err(CloudcostError::Analysis(message));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| CloudcostError::Analysis("response has no candidates".into()))?;

        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default())
    }
}

/// Gemini generate-content client
pub struct GeminiClient {
    url: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client; both values must be non-empty
    pub fn new(url: Option<&str>, api_key: Option<&str>) -> Result<Self> {
        let url = url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| CloudcostError::Config("GEMINI_API_URL is not set".into()))?;
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CloudcostError::Config("GEMINI_API_KEY is not set".into()))?;
        Ok(Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, prompt: &str) -> std::result::Result<GenerateResponse, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = client
            .post(&self.url)
            .header("X-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status();
        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| format!("JSON parse error (status {}): {}", status.as_u16(), e))?;
        Ok(parsed)
    }
}

impl Summarizer for GeminiClient {
    fn summarize(&self, csv: &str) -> Result<String> {
        let prompt = format!("{}\n{}", ANALYSIS_PROMPT, csv);
        tracing::info!(bytes = prompt.len(), "requesting cost analysis");
        let response = self.request(&prompt).map_err(CloudcostError::Analysis)?;
        response.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    #[test]
    fn test_new_requires_url_and_key() {
        let err = GeminiClient::new(None, Some("key")).err().unwrap();
        assert!(matches!(err, CloudcostError::Config(_)));

        let err = GeminiClient::new(Some("http://x"), Some("  ")).err().unwrap();
        assert!(matches!(err, CloudcostError::Config(_)));

        assert!(GeminiClient::new(Some("http://x"), Some("key")).is_ok());
    }

    #[test]
    fn test_summarize_joins_parts() {
        let (url, requests) = serve_once(
            200,
            r#"{"candidates":[{"content":{"parts":[{"text":"Key Findings\n"},{"text":"- AWS leads"}]}}]}"#,
        );
        let client = GeminiClient::new(Some(&url), Some("secret")).unwrap();

        let text = client.summarize("month,provider,service,cost").unwrap();
        assert_eq!(text, "Key Findings\n- AWS leads");

        let request = requests.recv().unwrap();
        assert!(request.request_line.starts_with("POST / "));
        assert!(request
            .headers
            .iter()
            .any(|h| h.to_ascii_lowercase() == "x-goog-api-key: secret"));

        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with(ANALYSIS_PROMPT));
        assert!(text.ends_with("\nmonth,provider,service,cost"));
    }

    #[test]
    fn test_summarize_api_error() {
        let (url, _requests) = serve_once(400, r#"{"error":{"code":400,"message":"API key not valid"}}"#);
        let client = GeminiClient::new(Some(&url), Some("bad")).unwrap();

        let err = client.summarize("csv").unwrap_err();
        assert!(matches!(err, CloudcostError::Analysis(_)));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_summarize_no_candidates() {
        let (url, _requests) = serve_once(200, r#"{"candidates":[]}"#);
        let client = GeminiClient::new(Some(&url), Some("key")).unwrap();

        let err = client.summarize("csv").unwrap_err();
        assert!(matches!(err, CloudcostError::Analysis(_)));
    }

    #[test]
    fn test_into_text_missing_content_is_empty() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert_eq!(response.into_text().unwrap(), "");
    }
}
