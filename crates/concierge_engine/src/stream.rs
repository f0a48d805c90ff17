use bytes::Bytes;
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::decode::{DecodedFrame, FrameDecoder};
use crate::{ClientError, ClientSettings, FailureKind, StageUpdate, StreamCompletion, StreamEvent};

/// Receives stage notifications as soon as they are decoded.
pub trait ProgressSink: Send + Sync {
    fn stage(&self, update: StageUpdate);
}

/// The two ways of talking to the chat backend.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Streams the request, reporting stages to `sink` as they arrive.
    async fn stream(
        &self,
        body: &Value,
        sink: &dyn ProgressSink,
    ) -> Result<StreamCompletion, ClientError>;

    /// Single request/response exchange whose body is the result payload.
    async fn post(&self, body: &Value) -> Result<Option<Value>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: ClientSettings,
}

impl ReqwestTransport {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ClientError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))
    }

    async fn send_json(
        &self,
        endpoint: &str,
        body: &Value,
        accept: &'static str,
    ) -> Result<reqwest::Response, ClientError> {
        let url = reqwest::Url::parse(endpoint)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let encoded = serde_json::to_vec(body)
            .map_err(|err| ClientError::new(FailureKind::Encode, err.to_string()))?;
        let client = self.build_client()?;

        let response = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, accept)
            .body(encoded)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).await
    }
}

#[async_trait::async_trait]
impl ChatTransport for ReqwestTransport {
    async fn stream(
        &self,
        body: &Value,
        sink: &dyn ProgressSink,
    ) -> Result<StreamCompletion, ClientError> {
        let response = self
            .send_json(&self.settings.stream_endpoint, body, "text/event-stream")
            .await?;
        engine_info!("stream opened: {}", self.settings.stream_endpoint);

        let mut decoder = FrameDecoder::new(self.settings.max_frame_bytes);
        let mut result = None;
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk: Bytes = chunk.map_err(map_reqwest_error)?;
            for frame in decoder.push(&chunk) {
                apply_frame(frame, &mut result, sink)?;
            }
        }
        for frame in decoder.finish() {
            apply_frame(frame, &mut result, sink)?;
        }

        Ok(match result {
            Some(payload) => StreamCompletion::Result(payload),
            None => {
                engine_warn!("stream ended without a result");
                StreamCompletion::NoOutput
            }
        })
    }

    async fn post(&self, body: &Value) -> Result<Option<Value>, ClientError> {
        let response = self
            .send_json(&self.settings.chat_endpoint, body, "application/json")
            .await?;
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let payload: Value = serde_json::from_slice(&bytes)
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
        Ok((!payload.is_null()).then_some(payload))
    }
}

/// Acts on one decoded frame. A server error ends the read; a result is kept
/// and reading continues until the stream closes.
fn apply_frame(
    frame: DecodedFrame,
    result: &mut Option<Value>,
    sink: &dyn ProgressSink,
) -> Result<(), ClientError> {
    match frame {
        DecodedFrame::Event(StreamEvent::Stage(update)) => {
            engine_debug!("stage: {}", update.name);
            sink.stage(update);
        }
        DecodedFrame::Event(StreamEvent::Result(payload)) => {
            if result.is_some() {
                engine_warn!("stream sent more than one result; keeping the last");
            }
            *result = Some(payload);
        }
        DecodedFrame::Event(StreamEvent::Error(message)) => {
            return Err(ClientError::new(FailureKind::Server, message));
        }
        DecodedFrame::Ignorable => {}
        DecodedFrame::Fatal(reason) => {
            return Err(ClientError::new(FailureKind::Protocol, reason));
        }
    }
    Ok(())
}

/// Turns a non-2xx response into an error carrying the body text.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = if text.trim().is_empty() {
        status.to_string()
    } else {
        text
    };
    Err(ClientError::new(
        FailureKind::HttpStatus(status.as_u16()),
        message,
    ))
}

/// Connection-level failures are network faults, even when the connect step
/// timed out; a slow server that did answer is a timeout.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_connect() {
        return ClientError::new(FailureKind::Network, err.to_string());
    }
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
