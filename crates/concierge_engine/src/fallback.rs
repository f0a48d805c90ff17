use engine_logging::{engine_info, engine_warn};
use serde_json::Value;

use crate::{ChatTransport, ClientError, Completion, ProgressSink, StreamCompletion};

/// Streams the request and, if the stream fails at the transport level,
/// retries exactly once with the non-streaming endpoint and the same body.
///
/// Errors the server reported, status errors and timeouts are returned as
/// they are. A failed fallback is final.
pub async fn submit_with_fallback(
    transport: &dyn ChatTransport,
    body: &Value,
    sink: &dyn ProgressSink,
) -> Result<Completion, ClientError> {
    match transport.stream(body, sink).await {
        Ok(StreamCompletion::Result(payload)) => Ok(Completion {
            payload: Some(payload),
            via_fallback: false,
        }),
        Ok(StreamCompletion::NoOutput) => Ok(Completion {
            payload: None,
            via_fallback: false,
        }),
        Err(err) if err.kind.is_transport_fault() => {
            engine_warn!("stream failed ({err}); retrying without streaming");
            let payload = transport.post(body).await?;
            engine_info!("fallback request completed");
            Ok(Completion {
                payload,
                via_fallback: true,
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailureKind, StageUpdate};
    use serde_json::json;
    use std::sync::Mutex;

    struct NullSink;

    impl ProgressSink for NullSink {
        fn stage(&self, _update: StageUpdate) {}
    }

    struct ScriptedTransport {
        stream_result: Result<StreamCompletion, ClientError>,
        post_result: Result<Option<Value>, ClientError>,
        posted: Mutex<Vec<Value>>,
    }

    impl ScriptedTransport {
        fn new(
            stream_result: Result<StreamCompletion, ClientError>,
            post_result: Result<Option<Value>, ClientError>,
        ) -> Self {
            Self {
                stream_result,
                post_result,
                posted: Mutex::new(Vec::new()),
            }
        }

        fn posted(&self) -> Vec<Value> {
            self.posted.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn stream(
            &self,
            _body: &Value,
            _sink: &dyn ProgressSink,
        ) -> Result<StreamCompletion, ClientError> {
            self.stream_result.clone()
        }

        async fn post(&self, body: &Value) -> Result<Option<Value>, ClientError> {
            self.posted.lock().unwrap().push(body.clone());
            self.post_result.clone()
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn error(kind: FailureKind) -> ClientError {
        ClientError::new(kind, "boom")
    }

    #[test]
    fn network_fault_posts_same_body_once() {
        let body = json!({"user_profile": {"message": "hi"}});
        let transport = ScriptedTransport::new(
            Err(error(FailureKind::Network)),
            Ok(Some(json!({"conflicts": []}))),
        );

        let completion = block_on(submit_with_fallback(&transport, &body, &NullSink)).unwrap();

        assert!(completion.via_fallback);
        assert_eq!(completion.payload, Some(json!({"conflicts": []})));
        assert_eq!(transport.posted(), vec![body]);
    }

    #[test]
    fn non_transport_failures_do_not_fall_back() {
        for kind in [
            FailureKind::Server,
            FailureKind::Timeout,
            FailureKind::HttpStatus(500),
            FailureKind::Protocol,
        ] {
            let transport = ScriptedTransport::new(Err(error(kind.clone())), Ok(None));
            let err = block_on(submit_with_fallback(&transport, &json!({}), &NullSink)).unwrap_err();
            assert_eq!(err.kind, kind);
            assert!(transport.posted().is_empty());
        }
    }

    #[test]
    fn fallback_failure_is_final() {
        let transport = ScriptedTransport::new(
            Err(error(FailureKind::Network)),
            Err(error(FailureKind::Network)),
        );
        let err = block_on(submit_with_fallback(&transport, &json!({}), &NullSink)).unwrap_err();

        assert_eq!(err.kind, FailureKind::Network);
        assert_eq!(transport.posted().len(), 1);
    }

    #[test]
    fn empty_stream_is_success_without_payload() {
        let transport = ScriptedTransport::new(Ok(StreamCompletion::NoOutput), Ok(None));
        let completion = block_on(submit_with_fallback(&transport, &json!({}), &NullSink)).unwrap();

        assert_eq!(
            completion,
            Completion {
                payload: None,
                via_fallback: false
            }
        );
        assert!(transport.posted().is_empty());
    }
}
