//! Tests for the HTTP content store.
//!
//! Request and response handling runs against a one-shot local listener
//! that records the raw request and replies with a canned body. The
//! `#[ignore]`d test talks to a real project and needs
//! `VOCASTORY_STORE_ID` and `VOCASTORY_TOKEN` in the environment.
//!
//! Run with: `cargo test -p vocastory-storage --test http -- --ignored`

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde_json::json;
use vocastory_core::models::credentials::Credentials;
use vocastory_core::models::record::RecordKind;
use vocastory_storage::connector::{HttpConnector, StoreConnector};
use vocastory_storage::error::StorageError;
use vocastory_storage::http::HttpStoreConfig;
use vocastory_storage::store::ContentStore;

struct RecordedRequest {
    /// Request line and headers, lowercased.
    head: String,
    body: String,
}

impl RecordedRequest {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }
}

/// Accept one connection, record it, and answer with `status` and `reply`.
fn serve_once(status: &'static str, reply: &'static str) -> (String, JoinHandle<RecordedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut head = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line.to_ascii_lowercase());
        }

        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();

        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
            reply.len()
        )
        .unwrap();
        stream.flush().unwrap();

        RecordedRequest {
            head,
            body: String::from_utf8(body).unwrap(),
        }
    });

    (base_url, handle)
}

fn connect_local(base_url: String) -> Arc<dyn ContentStore> {
    let connector = HttpConnector::new(HttpStoreConfig {
        base_url: Some(base_url),
        ..HttpStoreConfig::default()
    });
    connector
        .connect(&Credentials::new("proj1", "sk-secret-token"))
        .expect("connect should succeed")
}

#[test]
fn connect_rejects_store_id_that_is_not_a_host_label() {
    let connector = HttpConnector::new(HttpStoreConfig::default());
    let err = connector
        .connect(&Credentials::new("not a host/label", "t"))
        .err()
        .expect("connect should fail");
    assert!(matches!(err, StorageError::InvalidStoreId(_)));
}

#[test]
fn connect_builds_handle_without_io() {
    let connector = HttpConnector::new(HttpStoreConfig::default());
    let store = connector
        .connect(&Credentials::new("abc123", "t"))
        .expect("connect should succeed");
    assert_eq!(store.store_id(), "abc123");
}

#[test]
fn status_codes_map_to_storage_errors() {
    assert!(StorageError::from(ureq::Error::StatusCode(401)).is_auth());
    assert!(matches!(
        StorageError::from(ureq::Error::StatusCode(500)),
        StorageError::Status { status: 500 }
    ));
}

#[tokio::test]
async fn probe_queries_stories_with_bearer_token() {
    let (base_url, server) = serve_once("200 OK", r#"{"ms":3,"result":[{"_id":"a"},{"_id":"b"}]}"#);
    let store = connect_local(base_url);

    assert_eq!(store.probe().await.unwrap(), 2);

    let request = server.join().unwrap();
    assert!(
        request
            .request_line()
            .starts_with("get /v2021-03-25/data/query/production?query="),
        "unexpected request line: {}",
        request.request_line()
    );
    assert!(request.request_line().contains("_type"));
    assert!(request.head.contains("authorization: bearer sk-secret-token"));
}

#[tokio::test]
async fn probe_maps_rejected_token_to_unauthorized() {
    let (base_url, server) = serve_once("401 Unauthorized", r#"{"error":"Unauthorized"}"#);
    let store = connect_local(base_url);

    let err = store.probe().await.unwrap_err();
    assert!(err.is_auth(), "expected an auth error, got {err:?}");
    server.join().unwrap();
}

#[tokio::test]
async fn commit_posts_every_mutation_in_one_request() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"transactionId":"tx-42","results":[{"id":"vocab-1","operation":"create"},{"id":"story-9","operation":"create"}]}"#,
    );
    let store = connect_local(base_url);

    let mut txn = store.begin_transaction();
    txn.create_if_absent(RecordKind::Vocabulary, "vocab-1", &json!({"en": "cat", "vi": "con mèo"}))
        .unwrap()
        .create(RecordKind::Story, &json!({"title": "Cats", "content": "a cat"}))
        .unwrap();
    assert_eq!(txn.mutations().len(), 2);
    let receipt = txn.commit().await.unwrap();

    assert_eq!(receipt.transaction_id, "tx-42");
    assert_eq!(receipt.document_ids, ["vocab-1", "story-9"]);

    let request = server.join().unwrap();
    assert_eq!(
        request.request_line().trim_end(),
        "post /v2021-03-25/data/mutate/production?returnids=true http/1.1"
    );
    assert!(request.head.contains("authorization: bearer sk-secret-token"));

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body,
        json!({
            "mutations": [
                {"createIfNotExists": {"_id": "vocab-1", "_type": "vocabulary", "en": "cat", "vi": "con mèo"}},
                {"create": {"_type": "story", "title": "Cats", "content": "a cat"}},
            ]
        })
    );
}

#[tokio::test]
#[ignore]
async fn probe_real_project() {
    let store_id = std::env::var("VOCASTORY_STORE_ID").expect("VOCASTORY_STORE_ID");
    let token = std::env::var("VOCASTORY_TOKEN").expect("VOCASTORY_TOKEN");

    let store = HttpConnector::default()
        .connect(&Credentials::new(store_id, token))
        .expect("connect");
    let documents = store.probe().await.expect("probe should succeed");
    println!("probe matched {documents} stories");
}
