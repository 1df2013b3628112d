//! End-to-end session tests: controller, scanner and engine against one mock host.

mod support;

use std::time::Duration;

use repofetch_core::download::OutputLayout;
use repofetch_core::provider::ProviderEndpoints;
use repofetch_core::session::{
    CancelToken, CrawlController, CrawlRequest, EventSink, FailureCategory, SessionEvent,
    SessionHandle, SessionOutcome, SessionState, Summary,
};
use support::socket_guard::start_mock_server_or_skip;
use support::{listing_page, mount_file, mount_page};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn controller(server: &MockServer) -> CrawlController {
    CrawlController::new()
        .with_endpoints(ProviderEndpoints::new(server.uri(), server.uri()))
        .with_transfer_delay(Duration::ZERO)
}

fn request(patterns: &str, output_dir: &TempDir) -> CrawlRequest {
    CrawlRequest {
        repository: "https://github.com/octo/demo".to_string(),
        patterns: patterns.to_string(),
        output_dir: output_dir.path().join("out"),
        credential: None,
        layout: OutputLayout::Mirror,
    }
}

/// Drains every event and returns them with the joined outcome.
async fn finish(mut handle: SessionHandle) -> (Vec<SessionEvent>, SessionOutcome) {
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    let outcome = handle.join.await.expect("session task should not panic");
    (events, outcome)
}

fn states(events: &[SessionEvent]) -> Vec<SessionState> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::State(state) => Some(*state),
            _ => None,
        })
        .collect()
}

async fn mount_two_file_repository(server: &MockServer) {
    mount_page(
        server,
        "/octo/demo",
        listing_page(&[
            "/octo/demo/blob/main/README.md",
            "/octo/demo/tree/main/src",
            "/octo/demo/blob/main/LICENSE",
        ]),
    )
    .await;
    mount_page(
        server,
        "/octo/demo/tree/main/src",
        listing_page(&["/octo/demo/blob/main/src/main.py"]),
    )
    .await;
}

#[tokio::test]
async fn test_session_completes_and_reports_progress() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_two_file_repository(&server).await;
    mount_file(&server, "/octo/demo/main/README.md", b"# demo\n").await;
    mount_file(&server, "/octo/demo/main/src/main.py", b"print(1)\n").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let handle = controller(&server).spawn(request(".py,README.md", &temp_dir));
    let (events, outcome) = finish(handle).await;

    assert_eq!(
        outcome,
        SessionOutcome::Completed(Summary {
            matched: 2,
            downloaded: 2,
            failed: 0,
        })
    );
    assert_eq!(
        states(&events),
        vec![
            SessionState::Idle,
            SessionState::Scanning,
            SessionState::Downloading,
            SessionState::Completed,
        ]
    );
    assert!(events.contains(&SessionEvent::Progress {
        downloaded: 2,
        total: 2
    }));
    assert_eq!(events.last(), Some(&SessionEvent::Finished(outcome)));

    let out = temp_dir.path().join("out");
    assert_eq!(std::fs::read(out.join("README.md")).expect("read"), b"# demo\n");
    assert_eq!(std::fs::read(out.join("src/main.py")).expect("read"), b"print(1)\n");
    assert!(!out.join("LICENSE").exists());
}

#[tokio::test]
async fn test_session_without_matches_is_distinguishable() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_two_file_repository(&server).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let handle = controller(&server).spawn(request(".java", &temp_dir));
    let (events, outcome) = finish(handle).await;

    assert_eq!(
        outcome,
        SessionOutcome::NoMatches {
            patterns: ".java".to_string()
        }
    );
    assert_eq!(states(&events).last(), Some(&SessionState::Completed));
    assert!(temp_dir.path().join("out").is_dir(), "output directory still created");
}

#[tokio::test]
async fn test_session_counts_failed_files_without_stopping() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_two_file_repository(&server).await;
    Mock::given(method("GET"))
        .and(path("/octo/demo/main/README.md"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_file(&server, "/octo/demo/main/src/main.py", b"print(1)\n").await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let handle = controller(&server).spawn(request(".py,README.md", &temp_dir));
    let (_, outcome) = finish(handle).await;

    assert_eq!(
        outcome,
        SessionOutcome::Completed(Summary {
            matched: 2,
            downloaded: 1,
            failed: 1,
        })
    );
}

#[tokio::test]
async fn test_session_rate_limited_root_page_fails_with_category() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/octo/demo"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1700000000"),
        )
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let handle = controller(&server).spawn(request(".py", &temp_dir));
    let (events, outcome) = finish(handle).await;

    let SessionOutcome::Failed {
        title,
        message,
        category,
    } = outcome
    else {
        panic!("expected a failed session, got {outcome:?}");
    };
    assert_eq!(category, FailureCategory::RateLimited);
    assert_eq!(title, "Rate limit reached");
    assert!(message.contains("remaining quota 0"), "{message}");
    assert!(message.contains("GMT"), "reset time rendered as an HTTP date: {message}");
    assert_eq!(states(&events).last(), Some(&SessionState::Failed));
}

#[tokio::test]
async fn test_session_missing_repository_fails_as_network() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let handle = controller(&server).spawn(request(".py", &temp_dir));
    let (_, outcome) = finish(handle).await;

    assert!(matches!(
        outcome,
        SessionOutcome::Failed {
            category: FailureCategory::Network,
            ..
        }
    ));
}

/// Serves a file body and requests cancellation while doing so.
struct CancelWhileServing {
    cancel: CancelToken,
    body: Vec<u8>,
}

impl Respond for CancelWhileServing {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.cancel.cancel();
        ResponseTemplate::new(200).set_body_bytes(self.body.clone())
    }
}

#[tokio::test]
async fn test_session_cancellation_during_download_stops_remaining_files() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_two_file_repository(&server).await;
    let cancel = CancelToken::new();
    Mock::given(method("GET"))
        .and(path("/octo/demo/main/README.md"))
        .respond_with(CancelWhileServing {
            cancel: cancel.clone(),
            body: b"# demo\n".to_vec(),
        })
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/octo/demo/main/src/main.py"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let (sink, mut receiver) = EventSink::channel();
    let outcome = controller(&server)
        .run(request(".py,README.md", &temp_dir), cancel, &sink)
        .await;
    drop(sink);
    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }

    let SessionOutcome::Cancelled(summary) = outcome else {
        panic!("expected a cancelled session, got {outcome:?}");
    };
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.downloaded, 0);
    assert_eq!(states(&events).last(), Some(&SessionState::Cancelled));
}

#[tokio::test]
async fn test_session_out_of_range_reset_header_still_fails_as_rate_limited() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/octo/demo"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "18446744073709551615"),
        )
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let handle = controller(&server).spawn(request(".py", &temp_dir));
    let (events, outcome) = finish(handle).await;

    assert!(matches!(
        outcome,
        SessionOutcome::Failed {
            category: FailureCategory::RateLimited,
            ..
        }
    ));
    assert!(matches!(events.last(), Some(SessionEvent::Finished(_))));
}

#[tokio::test]
async fn test_session_cancelled_after_last_file_still_completes() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_page(
        &server,
        "/octo/demo",
        listing_page(&["/octo/demo/blob/main/empty.py"]),
    )
    .await;
    let cancel = CancelToken::new();
    // An empty body finishes without reaching a cancellation checkpoint.
    Mock::given(method("GET"))
        .and(path("/octo/demo/main/empty.py"))
        .respond_with(CancelWhileServing {
            cancel: cancel.clone(),
            body: Vec::new(),
        })
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let outcome = controller(&server)
        .run(request(".py", &temp_dir), cancel.clone(), &EventSink::detached())
        .await;

    assert!(cancel.is_cancelled());
    assert_eq!(
        outcome,
        SessionOutcome::Completed(Summary {
            matched: 1,
            downloaded: 1,
            failed: 0,
        })
    );
    assert!(temp_dir.path().join("out/empty.py").exists());
}
