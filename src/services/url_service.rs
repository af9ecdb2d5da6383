use reqwest::Client;
use serde_json::json;

use crate::dto::quiz_dto::QuizLinks;
use crate::models::quiz::Quiz;

const TINYURL_CREATE_ENDPOINT: &str = "https://api.tinyurl.com/create";

/// Builds shareable quiz URLs. Shortening goes through the TinyURL API and
/// falls back to the normal URL whenever the API token is missing or the
/// call fails; link generation never errors on the shortener's account.
#[derive(Clone)]
pub struct UrlService {
    frontend_url: String,
    tinyurl_api_token: Option<String>,
    client: Client,
}

impl UrlService {
    pub fn new(frontend_url: String, tinyurl_api_token: Option<String>, client: Client) -> Self {
        Self {
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            tinyurl_api_token,
            client,
        }
    }

    /// Token-only format keeps the link clean; the slug is not part of it.
    pub fn generate_normal_url(&self, quiz_token: &str) -> String {
        format!("{}/quiz/{}", self.frontend_url, quiz_token)
    }

    /// Alias derived from quiz id plus the first token characters for
    /// uniqueness.
    pub fn generate_url_alias(&self, quiz_id: i32, quiz_token: &str) -> String {
        let unique_part: String = quiz_token.chars().take(8).collect();
        format!("quiz-{}-{}", quiz_id, unique_part)
    }

    pub async fn generate_short_url(&self, normal_url: &str, alias: Option<&str>) -> String {
        let Some(token) = self.tinyurl_api_token.as_deref() else {
            return normal_url.to_string();
        };

        let body = json!({
            "url": normal_url,
            "domain": "tinyurl.com",
            "alias": alias,
            "description": "Quiz Link",
        });

        let response = self
            .client
            .post(TINYURL_CREATE_ENDPOINT)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await;

        match response {
            Ok(resp) => match resp.json::<serde_json::Value>().await {
                Ok(result) => match result["data"]["tiny_url"].as_str() {
                    Some(tiny_url) => tiny_url.to_string(),
                    None => {
                        tracing::warn!(?result, "TinyURL API returned no tiny_url");
                        normal_url.to_string()
                    }
                },
                Err(e) => {
                    tracing::warn!(error = ?e, "Failed to parse TinyURL response");
                    normal_url.to_string()
                }
            },
            Err(e) => {
                tracing::warn!(error = ?e, "Failed to reach TinyURL API");
                normal_url.to_string()
            }
        }
    }

    pub async fn generate_quiz_urls(&self, quiz: &Quiz) -> QuizLinks {
        let normal_url = self.generate_normal_url(&quiz.token);
        let alias = self.generate_url_alias(quiz.id, &quiz.token);
        let short_url = self.generate_short_url(&normal_url, Some(&alias)).await;
        QuizLinks {
            normal_url,
            short_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(token: Option<&str>) -> UrlService {
        UrlService::new(
            "https://quiz.example.com/".to_string(),
            token.map(String::from),
            Client::new(),
        )
    }

    #[test]
    fn normal_url_uses_token_only_format() {
        let url = service(None).generate_normal_url("abc123XYZ");
        assert_eq!(url, "https://quiz.example.com/quiz/abc123XYZ");
    }

    #[test]
    fn alias_combines_id_and_token_prefix() {
        let alias = service(None).generate_url_alias(9, "abcdefghijkl");
        assert_eq!(alias, "quiz-9-abcdefgh");
    }

    #[test]
    fn alias_tolerates_short_tokens() {
        let alias = service(None).generate_url_alias(2, "abc");
        assert_eq!(alias, "quiz-2-abc");
    }

    #[test]
    fn short_url_falls_back_without_api_token() {
        let svc = service(None);
        let short = tokio_test::block_on(
            svc.generate_short_url("https://quiz.example.com/quiz/t", Some("quiz-1-t")),
        );
        assert_eq!(short, "https://quiz.example.com/quiz/t");
    }
}
