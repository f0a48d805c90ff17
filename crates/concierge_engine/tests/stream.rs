use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, Once};
use std::thread;

use concierge_engine::{
    submit_with_fallback, ChatTransport, ClientSettings, Completion, FailureKind, ProgressSink,
    ReqwestTransport, StageUpdate, StreamCompletion,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Default)]
struct TestSink {
    stages: Arc<Mutex<Vec<StageUpdate>>>,
}

impl TestSink {
    fn names(&self) -> Vec<String> {
        self.stages
            .lock()
            .unwrap()
            .iter()
            .map(|update| update.name.clone())
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn stage(&self, update: StageUpdate) {
        self.stages.lock().unwrap().push(update);
    }
}

fn sse(events: &[Value]) -> String {
    events
        .iter()
        .map(|event| format!("data: {event}\n\n"))
        .collect()
}

fn request_body() -> Value {
    json!({
        "user_profile": {"user_id": "u1", "message": "Plan a trip from NYC to SFO"},
        "seed_urls": [],
        "llm_provider": "stub",
        "llm_model": "stub"
    })
}

/// Reads one request, headers and body, so closing the socket later is a
/// clean end of stream rather than a reset.
fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            return;
        }
    }
}

/// Serves a single chunked event stream that breaks off after `frame`,
/// without the terminating chunk. Returns the stream URL.
fn spawn_broken_stream(frame: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        read_request(&mut socket);
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n",
            )
            .unwrap();
        socket
            .write_all(format!("{:x}\r\n{frame}\r\n", frame.len()).as_bytes())
            .unwrap();
        socket.flush().unwrap();
    });
    format!("http://{addr}/api/chat/stream")
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn stream_reports_stages_then_result() {
    init_logging();
    let server = MockServer::start().await;
    let result = json!({"travel": {"plan": {"origin": "NYC", "destination": "SFO"}}});
    mount_stream(
        &server,
        sse(&[
            json!({"stage": "classifying", "label": "Analyzing your query...", "active_agents": ["travel"]}),
            json!({"stage": "fetching", "label": "Gathering evidence..."}),
            json!({"result": result.clone()}),
        ]),
    )
    .await;

    let transport = ReqwestTransport::new(ClientSettings::for_base_url(&server.uri()));
    let sink = TestSink::default();
    let completion = transport.stream(&request_body(), &sink).await.expect("stream ok");

    assert_eq!(completion, StreamCompletion::Result(result));
    assert_eq!(sink.names(), vec!["classifying", "fetching"]);
    let first = sink.stages.lock().unwrap()[0].clone();
    assert_eq!(first.active_agents, vec!["travel"]);
}

#[tokio::test]
async fn last_of_several_results_wins() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse(&[
            json!({"result": {"conflicts": ["first"]}}),
            json!({"stage": "processing"}),
            json!({"result": {"conflicts": ["second"]}}),
        ]),
    )
    .await;

    let transport = ReqwestTransport::new(ClientSettings::for_base_url(&server.uri()));
    let sink = TestSink::default();
    let completion = transport.stream(&request_body(), &sink).await.expect("stream ok");

    assert_eq!(
        completion,
        StreamCompletion::Result(json!({"conflicts": ["second"]}))
    );
    assert_eq!(sink.names(), vec!["processing"]);
}

#[tokio::test]
async fn result_is_kept_while_stream_drains() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse(&[json!({"result": {"conflicts": ["x"]}}), json!({"stage": "done"})]),
    )
    .await;

    let transport = ReqwestTransport::new(ClientSettings::for_base_url(&server.uri()));
    let sink = TestSink::default();
    let completion = transport.stream(&request_body(), &sink).await.unwrap();

    assert_eq!(completion, StreamCompletion::Result(json!({"conflicts": ["x"]})));
    assert_eq!(sink.names(), vec!["done"]);
}

#[tokio::test]
async fn server_error_event_aborts_without_fallback() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse(&[
            json!({"stage": "classifying"}),
            json!({"error": "LLM quota exceeded"}),
            json!({"result": {"travel": {}}}),
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(ClientSettings::for_base_url(&server.uri()));
    let sink = TestSink::default();
    let err = submit_with_fallback(&transport, &request_body(), &sink)
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Server);
    assert_eq!(err.user_message(), "LLM quota exceeded");
    assert_eq!(sink.names(), vec!["classifying"]);
}

#[tokio::test]
async fn http_error_body_becomes_message() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error: boom"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(ClientSettings::for_base_url(&server.uri()));
    let err = submit_with_fallback(&transport, &request_body(), &TestSink::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.user_message(), "Internal Server Error: boom");
}

#[tokio::test]
async fn stream_without_result_is_no_output() {
    init_logging();
    let server = MockServer::start().await;
    mount_stream(
        &server,
        format!(
            "{}: keepalive\n\ndata: not json\n\n",
            sse(&[json!({"stage": "classifying"}), json!({"stage": "done"})])
        ),
    )
    .await;

    let transport = ReqwestTransport::new(ClientSettings::for_base_url(&server.uri()));
    let completion = submit_with_fallback(&transport, &request_body(), &TestSink::default())
        .await
        .unwrap();

    assert_eq!(
        completion,
        Completion {
            payload: None,
            via_fallback: false
        }
    );
}

#[tokio::test]
async fn unreachable_stream_falls_back_once_with_same_body() {
    init_logging();
    let server = MockServer::start().await;
    let result = json!({"travel": {"plan": {"origin": "NYC", "destination": "SFO"}}});
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(request_body()))
        .respond_with(ResponseTemplate::new(200).set_body_json(result.clone()))
        .expect(1)
        .mount(&server)
        .await;

    // Nothing listens on port 1, so the stream fails at connect time.
    let settings = ClientSettings {
        stream_endpoint: "http://127.0.0.1:1/api/chat/stream".to_string(),
        ..ClientSettings::for_base_url(&server.uri())
    };
    let transport = ReqwestTransport::new(settings);
    let sink = TestSink::default();
    let completion = submit_with_fallback(&transport, &request_body(), &sink)
        .await
        .expect("fallback ok");

    assert_eq!(
        completion,
        Completion {
            payload: Some(result),
            via_fallback: true
        }
    );
    assert!(sink.names().is_empty());
}

#[tokio::test]
async fn interrupted_body_falls_back_once() {
    init_logging();
    let server = MockServer::start().await;
    let result = json!({"conflicts": ["fb"]});
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(request_body()))
        .respond_with(ResponseTemplate::new(200).set_body_json(result.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        stream_endpoint: spawn_broken_stream(sse(&[json!({"stage": "classifying"})])),
        ..ClientSettings::for_base_url(&server.uri())
    };
    let transport = ReqwestTransport::new(settings);
    let sink = TestSink::default();
    let completion = submit_with_fallback(&transport, &request_body(), &sink)
        .await
        .expect("fallback ok");

    assert_eq!(
        completion,
        Completion {
            payload: Some(result),
            via_fallback: true
        }
    );
    assert_eq!(sink.names(), vec!["classifying"]);
}

#[tokio::test]
async fn interrupted_body_is_a_network_fault() {
    init_logging();
    let transport = ReqwestTransport::new(ClientSettings {
        stream_endpoint: spawn_broken_stream(sse(&[json!({"stage": "fetching"})])),
        ..ClientSettings::for_base_url("http://127.0.0.1:1")
    });

    let err = transport
        .stream(&request_body(), &TestSink::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn failed_fallback_is_final() {
    init_logging();
    let settings = ClientSettings::for_base_url("http://127.0.0.1:1");
    let transport = ReqwestTransport::new(settings);

    let err = submit_with_fallback(&transport, &request_body(), &TestSink::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn fallback_rejects_non_json_body() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(ClientSettings::for_base_url(&server.uri()));
    let err = transport.post(&request_body()).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Decode);
}
