#![allow(dead_code)]

pub mod socket_guard;

use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wraps anchors in a minimal listing page using the row-header layout.
#[must_use]
pub fn listing_page(hrefs: &[&str]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| {
            format!(r#"<div role="row"><a role="rowheader" href="{href}">{href}</a></div>"#)
        })
        .collect();
    format!("<html><body><div role=\"grid\">{rows}</div></body></html>")
}

/// Serves `body` as the first page (no `after` query) of `page_path`.
pub async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves `body` for `page_path?after=<cursor>`.
pub async fn mount_next_page(server: &MockServer, page_path: &str, cursor: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("after", cursor))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves raw file bytes at `file_path`.
pub async fn mount_file(server: &MockServer, file_path: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}
