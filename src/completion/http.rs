//! HTTP/SSE client for a remote completion service.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, warn};

use super::{CompletionEvent, CompletionRequest, CompletionService, CompletionStream, StreamFault};
use crate::config::EngineConfig;
use crate::error::{Result, RunError};
use crate::tools::ToolDefinition;

/// Completion service reached over HTTP.
///
/// `POST {base_url}/v1/completions` answers with a server-sent-event stream
/// whose `data:` lines are JSON-encoded [`CompletionEvent`]s, terminated by
/// `data: [DONE]`.
#[derive(Debug, Clone)]
pub struct HttpCompletionService {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequestBody<'a> {
    system_prompt: &'a str,
    user_prompt: &'a str,
    tools: &'a [ToolDefinition],
    step_ceiling: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_source_url: Option<&'a str>,
}

impl HttpCompletionService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    /// Build from config; requires `completion_url`.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let base_url = config.completion_url.clone().ok_or_else(|| {
            RunError::Configuration("completion_url is required for the HTTP completion service".into())
        })?;
        let mut service = Self::new(config.http_client()?, base_url);
        service.api_token = config.api_token.clone();
        Ok(service)
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        if let Some(token) = &self.api_token {
            if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, val);
            }
        }
        headers
    }
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let url = format!("{}/v1/completions", self.base_url);
        let body = CompletionRequestBody {
            system_prompt: &request.system_prompt,
            user_prompt: &request.user_prompt,
            tools: &request.tools,
            step_ceiling: request.step_ceiling,
            tool_source_url: request.tool_source_url.as_deref(),
        };

        debug!(%url, tools = request.tools.len(), "opening completion stream");

        let resp = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(RunError::api(status.as_u16(), body_text));
        }

        Ok(sse_events(resp.bytes_stream()))
    }
}

/// Decode an SSE byte stream into completion events.
///
/// Bytes are buffered until a full line is available, so a multi-byte
/// character split across chunks decodes intact. A line that is not valid
/// UTF-8 ends the stream with an opaque fault.
fn sse_events<S, B, E>(byte_stream: S) -> CompletionStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    let stream = async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();
        futures::pin_mut!(byte_stream);

        'chunks: while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield CompletionEvent::error(StreamFault::Opaque(
                        serde_json::json!({ "error": e.to_string() }),
                    ));
                    break 'chunks;
                }
            };

            buffer.extend_from_slice(chunk.as_ref());

            while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = match std::str::from_utf8(&raw[..line_end]) {
                    Ok(line) => line.trim(),
                    Err(err) => {
                        warn!(error = %err, "completion event line is not valid UTF-8");
                        yield CompletionEvent::error(StreamFault::Opaque(serde_json::json!({
                            "invalidUtf8": String::from_utf8_lossy(&raw[..line_end]),
                        })));
                        break 'chunks;
                    }
                };

                match parse_sse_line(line) {
                    SseLine::Ignored => continue,
                    SseLine::Done => break 'chunks,
                    SseLine::Data(data) => match serde_json::from_str::<CompletionEvent>(data) {
                        Ok(event) => yield event,
                        Err(err) => {
                            warn!(error = %err, "unparseable completion event");
                            yield CompletionEvent::error(StreamFault::Opaque(
                                serde_json::json!({ "unparseable": data }),
                            ));
                            break 'chunks;
                        }
                    },
                }
            }
        }
    };

    Box::pin(stream)
}

#[derive(Debug, PartialEq)]
enum SseLine<'a> {
    Data(&'a str),
    Done,
    Ignored,
}

/// Classify one SSE line; comments, blank lines and non-data fields are ignored.
fn parse_sse_line(line: &str) -> SseLine<'_> {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Ignored;
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        SseLine::Done
    } else if data.is_empty() {
        SseLine::Ignored
    } else {
        SseLine::Data(data)
    }
}
