use std::time::Duration;

use axum::async_trait;
use leaky_bucket::RateLimiter;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

macro_rules! gmail_url {
    ($($params:expr),*) => {
        {
            const GMAIL_ENDPOINT: &str = "https://www.googleapis.com/gmail/v1/users/me";
            let list_params = vec![$($params),*];
            let path = list_params.join("/");
            format!("{}/{}", GMAIL_ENDPOINT, path)
        }
    };
}

#[derive(Debug, Clone)]
pub struct InboxProfile {
    pub email_address: String,
    pub history_id: String,
}

#[derive(Debug, Clone)]
pub struct MessagePage {
    pub message_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub message_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessagePart {
    pub mime_type: String,
    /// base64url-encoded body, as returned on the wire; decoded by `email_proc::decode`.
    pub body_data: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawMessage {
    pub id: String,
    pub thread_id: String,
    pub label_ids: Vec<String>,
    pub in_reply_to: Option<String>,
    pub sender_address: String,
    pub sender_display_name: Option<String>,
    pub subject: Option<String>,
    pub received_at: chrono::DateTime<chrono::Utc>,
    pub snippet: String,
    pub parts: Vec<MessagePart>,
}

/// Parses a `Name <address@example.com>` or bare `address@example.com` `From` header value.
fn split_sender(raw: &str) -> (String, Option<String>) {
    if let Some(lt) = raw.rfind('<') {
        if let Some(gt) = raw.rfind('>') {
            if gt > lt {
                let address = raw[lt + 1..gt].trim().to_string();
                let name = raw[..lt].trim().trim_matches('"').to_string();
                return (
                    address,
                    if name.is_empty() { None } else { Some(name) },
                );
            }
        }
    }
    (raw.trim().to_string(), None)
}

/// Abstracts the upstream inbox provider so the core pipeline never depends directly on the
/// out-of-scope OAuth dance — only on this narrow, already-authenticated surface
/// (SPEC_FULL §6, §4.1).
#[async_trait]
pub trait InboxClient: Send + Sync {
    async fn get_profile(&self) -> AppResult<InboxProfile>;
    async fn list_messages(
        &self,
        filter: &str,
        page_token: Option<String>,
    ) -> AppResult<MessagePage>;
    async fn get_message(&self, id: &str) -> AppResult<RawMessage>;
    /// Number of other messages in the thread (i.e. `len() - 1`, floored at 0).
    async fn list_thread(&self, thread_id: &str) -> AppResult<usize>;
    async fn list_history(
        &self,
        cursor: &str,
        page_token: Option<String>,
    ) -> AppResult<HistoryPage>;
}

pub struct GmailInboxClient {
    http_client: reqwest::Client,
    access_token: String,
    rate_limiter: RateLimiter,
}

impl GmailInboxClient {
    pub fn new(http_client: reqwest::Client, access_token: String) -> Self {
        let rate_limiter = RateLimiter::builder()
            .initial(10)
            .interval(Duration::from_secs(1))
            .refill(10)
            .build();

        Self {
            http_client,
            access_token,
            rate_limiter,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GmailProfileResponse {
    #[serde(rename = "emailAddress")]
    email_address: String,
    #[serde(rename = "historyId")]
    history_id: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GmailListMessagesResponse {
    messages: Option<Vec<GmailMessageRef>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailHistoryMessageAdded {
    message: GmailMessageRef,
}

#[derive(Debug, Deserialize)]
struct GmailHistoryRecord {
    #[serde(rename = "messagesAdded", default)]
    messages_added: Vec<GmailHistoryMessageAdded>,
}

#[derive(Debug, Deserialize)]
struct GmailListHistoryResponse {
    #[serde(default)]
    history: Vec<GmailHistoryRecord>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessagePartBody {
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailMessagePart {
    #[serde(rename = "mimeType", default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<GmailHeader>,
    body: Option<GmailMessagePartBody>,
    #[serde(default)]
    parts: Vec<GmailMessagePart>,
}

#[derive(Debug, Deserialize)]
struct GmailMessageResponse {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: String,
    #[serde(rename = "labelIds", default)]
    label_ids: Vec<String>,
    #[serde(rename = "internalDate")]
    internal_date: Option<String>,
    snippet: Option<String>,
    payload: Option<GmailMessagePart>,
}

fn flatten_parts(part: &GmailMessagePart, out: &mut Vec<MessagePart>) {
    if let Some(body) = &part.body {
        if body.data.is_some() {
            out.push(MessagePart {
                mime_type: part.mime_type.clone(),
                body_data: body.data.clone(),
            });
        }
    }
    for child in &part.parts {
        flatten_parts(child, out);
    }
}

#[async_trait]
impl InboxClient for GmailInboxClient {
    async fn get_profile(&self) -> AppResult<InboxProfile> {
        self.rate_limiter.acquire_one().await;
        let resp = self
            .http_client
            .get(gmail_url!("profile"))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let data = resp.json::<GmailProfileResponse>().await?;

        Ok(InboxProfile {
            email_address: data.email_address,
            history_id: data.history_id,
        })
    }

    async fn list_messages(
        &self,
        filter: &str,
        page_token: Option<String>,
    ) -> AppResult<MessagePage> {
        self.rate_limiter.acquire_one().await;

        let mut query = vec![
            ("q".to_string(), filter.to_string()),
            ("maxResults".to_string(), "500".to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken".to_string(), token));
        }

        let resp = self
            .http_client
            .get(gmail_url!("messages"))
            .query(&query)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let data = resp.json::<GmailListMessagesResponse>().await?;

        Ok(MessagePage {
            message_ids: data
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(|m| m.id)
                .collect(),
            next_page_token: data.next_page_token,
        })
    }

    async fn get_message(&self, id: &str) -> AppResult<RawMessage> {
        self.rate_limiter.acquire_one().await;

        let resp = self
            .http_client
            .get(gmail_url!("messages", id))
            .query(&[("format", "full")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let data = resp.json::<GmailMessageResponse>().await?;

        let mut parts = Vec::new();
        let mut in_reply_to = None;
        let mut sender_address = String::new();
        let mut sender_display_name = None;
        let mut subject = None;
        if let Some(payload) = &data.payload {
            flatten_parts(payload, &mut parts);
            let header = |name: &str| {
                payload
                    .headers
                    .iter()
                    .find(|h| h.name.eq_ignore_ascii_case(name))
                    .map(|h| h.value.clone())
            };
            in_reply_to = header("In-Reply-To");
            subject = header("Subject");
            if let Some(from) = header("From") {
                let (address, name) = split_sender(&from);
                sender_address = address;
                sender_display_name = name;
            }
        }

        let received_at = data
            .internal_date
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(chrono::DateTime::from_timestamp_millis)
            .unwrap_or_else(chrono::Utc::now);

        Ok(RawMessage {
            id: data.id,
            thread_id: data.thread_id,
            label_ids: data.label_ids,
            in_reply_to,
            sender_address,
            sender_display_name,
            subject,
            received_at,
            snippet: data.snippet.unwrap_or_default(),
            parts,
        })
    }

    async fn list_thread(&self, thread_id: &str) -> AppResult<usize> {
        self.rate_limiter.acquire_one().await;

        #[derive(Debug, Deserialize)]
        struct ThreadMessage {
            id: String,
        }
        #[derive(Debug, Deserialize)]
        struct ThreadResponse {
            messages: Option<Vec<ThreadMessage>>,
        }

        let resp = self
            .http_client
            .get(gmail_url!("threads", thread_id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let data = resp.json::<ThreadResponse>().await?;

        Ok(data
            .messages
            .map(|m| m.len().saturating_sub(1))
            .unwrap_or(0))
    }

    async fn list_history(
        &self,
        cursor: &str,
        page_token: Option<String>,
    ) -> AppResult<HistoryPage> {
        self.rate_limiter.acquire_one().await;

        let mut query = vec![("startHistoryId".to_string(), cursor.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken".to_string(), token));
        }

        let resp = self
            .http_client
            .get(gmail_url!("history"))
            .query(&query)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            // startHistoryId too old: caller falls back to a bounded initial sync.
            return Err(AppError::Conflict("history cursor expired".to_string()));
        }

        let data = resp.json::<GmailListHistoryResponse>().await?;

        let message_ids = data
            .history
            .into_iter()
            .flat_map(|h| h.messages_added)
            .map(|m| m.message.id)
            .collect();

        Ok(HistoryPage {
            message_ids,
            next_page_token: data.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn gmail_url_joins_path_segments() {
        let url = gmail_url!("messages");
        assert_eq!(url, "https://www.googleapis.com/gmail/v1/users/me/messages");
        let url = gmail_url!("messages", "123");
        assert_eq!(
            url,
            "https://www.googleapis.com/gmail/v1/users/me/messages/123"
        );
    }
}
