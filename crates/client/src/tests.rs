use crate::{BibliographyFormat, BibliographyOptions, Client, Notifier};
use futures::future::join_all;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use zotlink_protocol::models::{CiteKey, CiteKeyExport, Group, IssueDate};
use zotlink_protocol::{PROBE_PATH, method};
use zotlink_transport::error::ErrorKind as TransportErrorKind;
use zotlink_transport::{Call, MockTransport};

#[derive(Debug, Default)]
struct Recorded {
    notices: Vec<String>,
    busy: Vec<bool>,
}

#[derive(Debug, Clone, Default)]
struct Recorder(Arc<Mutex<Recorded>>);
impl Recorder {
    fn notices(&self) -> Vec<String> {
        self.0.lock().notices.clone()
    }
}
impl Notifier for Recorder {
    fn busy(&self, busy: bool) {
        self.0.lock().busy.push(busy);
    }

    fn notice(&self, message: &str) {
        self.0.lock().notices.push(message.to_string());
    }
}

fn ok(result: Value) -> String {
    json!({"jsonrpc": "2.0", "result": result}).to_string()
}

fn setup() -> (Arc<MockTransport>, Recorder, Client) {
    let transport = Arc::new(MockTransport::default());
    let recorder = Recorder::default();
    let client = Client::new(transport.clone()).with_notifier(recorder.clone());
    (transport, recorder, client)
}

fn rpc_params(transport: &MockTransport, wanted: &str) -> Vec<Value> {
    transport
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Rpc { method, params } if method == wanted => Some(params),
            _ => None,
        })
        .collect()
}

fn key(key: &str) -> CiteKey {
    CiteKey::new(key, 1)
}

const LAB_EXPORT: &str = "/better-bibtex/export/library?/4/Lab%20Papers.json";
const MY_EXPORT: &str = "/better-bibtex/export/library?/1/My%20Library.json";

fn script_two_libraries(transport: &MockTransport) {
    transport
        .on_get(PROBE_PATH, "ready")
        .on_rpc(method::GROUPS, ok(json!([{"id": 1, "name": "My Library"}, {"id": 4, "name": "Lab Papers"}])))
        .on_get(MY_EXPORT, r#"[{"citation-key": "doe2020", "title": "A"}, {"title": "no key"}]"#)
        .on_get(LAB_EXPORT, r#"[{"citekey": "roe2021", "title": "B"}]"#);
}

#[tokio::test]
async fn test_concurrent_operations_are_single_flight() {
    let (transport, _, client) = setup();
    transport.on_rpc(method::SEARCH, ok(json!([]))).on_rpc(method::GROUPS, ok(json!([])));
    let searches = (0..6).map(|i| {
        let client = &client;
        async move { client.search(&format!("term {i}")).await }
    });
    let (searches, groups, running) = tokio::join!(join_all(searches), client.groups(), client.is_running());
    assert!(searches.iter().all(Option::is_some));
    assert_eq!(groups, Some(vec![]));
    assert!(!running);
    assert_eq!(transport.calls().len(), 8);
    assert_eq!(transport.peak_in_flight(), 1);
    assert!(client.queue().is_idle());
}

#[tokio::test]
async fn test_citekeys_are_cached_within_refresh_interval() {
    let (transport, _, client) = setup();
    script_two_libraries(&transport);

    let first = client.all_citekeys(false).await;
    assert!(!first.from_cache);
    assert_eq!(*first.citekeys, vec![CiteKeyExport::new(1, "doe2020", "A"), CiteKeyExport::new(4, "roe2021", "B")]);

    let second = client.all_citekeys(false).await;
    assert!(second.from_cache);
    assert!(Arc::ptr_eq(&first.citekeys, &second.citekeys));
    assert_eq!(transport.get_count(PROBE_PATH), 1);
    assert_eq!(transport.rpc_count(method::GROUPS), 1);
    assert_eq!(transport.calls().len(), 4);
}

#[tokio::test]
async fn test_forced_refresh_goes_to_the_service() {
    let (transport, _, client) = setup();
    script_two_libraries(&transport);
    let first = client.all_citekeys(false).await;
    let forced = client.all_citekeys(true).await;
    assert!(!forced.from_cache);
    assert!(!Arc::ptr_eq(&first.citekeys, &forced.citekeys));
    assert_eq!(transport.rpc_count(method::GROUPS), 2);
}

#[tokio::test]
async fn test_stale_citekeys_served_when_service_is_down() {
    let (transport, recorder, client) = setup();
    script_two_libraries(&transport);
    transport.fail_get(PROBE_PATH, TransportErrorKind::Connection("127.0.0.1:23119".to_string()));

    let first = client.all_citekeys(false).await;
    client.caches().expire_citekeys().await;
    let second = client.all_citekeys(false).await;
    assert!(second.from_cache);
    assert!(Arc::ptr_eq(&first.citekeys, &second.citekeys));
    assert_eq!(transport.rpc_count(method::GROUPS), 1);
    // Being offline isn't worth bothering the user about.
    assert!(recorder.notices().is_empty());
}

#[tokio::test]
async fn test_no_citekeys_yet_and_service_down() {
    let (transport, _, client) = setup();
    let snapshot = client.all_citekeys(false).await;
    assert!(snapshot.from_cache);
    assert!(snapshot.is_empty());
    assert_eq!(transport.calls(), vec![Call::Get { path: PROBE_PATH.to_string() }]);
}

#[tokio::test]
async fn test_failing_group_list_keeps_previous_citekeys() {
    let (transport, _, client) = setup();
    transport.on_get(PROBE_PATH, "ready").on_rpc(method::GROUPS, ok(json!([{"id": 1, "name": "My Library"}])));
    transport.on_rpc(method::GROUPS, r#"{"error": {"message": "boom"}}"#);
    transport.on_get(MY_EXPORT, r#"[{"citation-key": "doe2020", "title": "A"}]"#);

    let first = client.all_citekeys(false).await;
    assert_eq!(first.len(), 1);
    let second = client.all_citekeys(true).await;
    assert!(second.from_cache);
    assert!(Arc::ptr_eq(&first.citekeys, &second.citekeys));
}

#[tokio::test]
async fn test_failing_group_export_is_skipped() {
    let (transport, _, client) = setup();
    transport
        .on_get(PROBE_PATH, "ready")
        .on_rpc(method::GROUPS, ok(json!([{"id": 1, "name": "My Library"}, {"id": 4, "name": "Lab Papers"}])))
        .fail_get(MY_EXPORT, TransportErrorKind::Status(500))
        .on_get(LAB_EXPORT, r#"[{"citekey": "roe2021", "title": "B"}]"#);
    let snapshot = client.all_citekeys(false).await;
    assert!(!snapshot.from_cache);
    assert_eq!(*snapshot.citekeys, vec![CiteKeyExport::new(4, "roe2021", "B")]);
}

#[tokio::test]
async fn test_relations_keep_input_order() {
    let (transport, _, client) = setup();
    let item = json!({"citationKey": "doe2020", "title": "Found"});
    transport
        .on_rpc(method::CITATION_KEY, ok(json!({"u1": null, "u2": "doe2020"})))
        .on_rpc(method::EXPORT, ok(json!([200, "application/json", json!({"items": [item.clone()]}).to_string()])));

    let uris: Vec<String> = ["u1", "u2", "u3"].map(String::from).to_vec();
    let merged = client.items_by_relations(1, &uris).await.unwrap();
    assert_eq!(merged, vec![json!({"uri": "u1"}), item, json!({"uri": "u3"})]);
    let exported = rpc_params(&transport, method::EXPORT);
    assert_eq!(exported, vec![json!([["doe2020"], zotlink_protocol::ITEM_TRANSLATOR, 1])]);
}

#[tokio::test]
async fn test_relations_unresolvable_is_absent() {
    let (transport, recorder, client) = setup();
    transport.on_rpc(method::CITATION_KEY, r#"{"error": {"message": "unknown item"}}"#);
    assert_eq!(client.items_by_relations(1, &["u1".to_string()]).await, None);
    assert_eq!(transport.rpc_count(method::EXPORT), 0);
    assert_eq!(recorder.notices().len(), 1);
}

#[tokio::test]
async fn test_relations_batch_failure_gives_placeholders() {
    let (transport, _, client) = setup();
    transport.on_rpc(method::CITATION_KEY, ok(json!({"u1": "a", "u2": "b"})));
    transport.fail_rpc(method::EXPORT, TransportErrorKind::Timeout);
    let merged = client.items_by_relations(1, &["u1".to_string(), "u2".to_string()]).await;
    assert_eq!(merged, Some(vec![json!({"uri": "u1"}), json!({"uri": "u2"})]));
}

#[tokio::test]
async fn test_relations_nothing_resolved_skips_fetch() {
    let (transport, _, client) = setup();
    transport.on_rpc(method::CITATION_KEY, ok(json!({})));
    let merged = client.items_by_relations(1, &["u1".to_string()]).await;
    assert_eq!(merged, Some(vec![json!({"uri": "u1"})]));
    assert_eq!(transport.rpc_count(method::EXPORT), 0);
}

#[tokio::test]
async fn test_every_operation_is_absent_on_failure() {
    let (_, recorder, client) = setup();
    let doe = key("doe2020");
    assert_eq!(client.notes(std::slice::from_ref(&doe)).await, None);
    assert_eq!(client.collections(&doe).await, None);
    assert_eq!(client.attachments(&doe).await, None);
    assert_eq!(client.bibliography(std::slice::from_ref(&doe), &BibliographyOptions::default()).await, None);
    assert_eq!(client.items(std::slice::from_ref(&doe), 1).await, None);
    assert_eq!(client.items_by_relations(1, &["u1".to_string()]).await, None);
    assert_eq!(client.issue_date(&doe, true).await, None);
    assert_eq!(client.search("doe").await, None);
    assert_eq!(client.export_citekeys(1, "My Library").await, None);
    assert_eq!(client.groups().await, None);
    assert_eq!(client.library_for_citekey("doe2020").await, None);
    assert!(!client.is_running().await);
    assert_eq!(recorder.notices().len(), 11);
    assert!(recorder.notices().iter().all(|n| n.starts_with("cannot reach Better BibTeX")));
}

#[tokio::test]
async fn test_malformed_response_is_absent() {
    let (transport, recorder, client) = setup();
    transport.on_rpc(method::SEARCH, "<html>Internal Server Error</html>");
    assert_eq!(client.search("doe").await, None);
    assert!(recorder.notices()[0].starts_with("unexpected response from Better BibTeX"));
}

#[tokio::test]
async fn test_busy_is_balanced() {
    let (transport, recorder, client) = setup();
    transport.on_rpc(method::SEARCH, ok(json!([])));
    client.search("a").await;
    client.search("b").await;
    assert_eq!(recorder.0.lock().busy, vec![true, false, true, false]);
}

#[tokio::test]
async fn test_notes_in_input_order() {
    let (transport, _, client) = setup();
    transport.on_rpc(method::NOTES, ok(json!({"b": ["<p>B</p>"], "a": [{"note": "<p>A</p>"}]})));
    let notes = client.notes(&[key("a"), key("b"), key("c")]).await.unwrap();
    let keys: Vec<_> = notes.iter().map(|n| n.citekey.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(rpc_params(&transport, method::NOTES), vec![json!([["a", "b", "c"]])]);
}

#[tokio::test]
async fn test_collection_paths() {
    let (transport, _, client) = setup();
    transport.on_rpc(
        method::COLLECTIONS,
        ok(json!({"doe2020": [{
            "key": "C", "name": "C",
            "parentCollection": {"key": "P", "name": "P", "parentCollection": {"key": "G", "name": "G", "parentCollection": false}}
        }]})),
    );
    let paths = client.collections(&key("doe2020")).await.unwrap();
    assert_eq!(paths[0].full_path, "G/P/C");
    assert_eq!(rpc_params(&transport, method::COLLECTIONS), vec![json!([["doe2020"], true])]);
}

#[tokio::test]
async fn test_attachments_use_library() {
    let (transport, _, client) = setup();
    transport.on_rpc(method::ATTACHMENTS, ok(json!([{"path": "/tmp/a.pdf"}])));
    let attachments = client.attachments(&CiteKey::new("doe2020", 4)).await.unwrap();
    assert_eq!(attachments, vec![json!({"path": "/tmp/a.pdf"})]);
    assert_eq!(rpc_params(&transport, method::ATTACHMENTS), vec![json!(["doe2020", 4])]);
}

#[tokio::test]
async fn test_issue_date() {
    let (transport, _, client) = setup();
    let csl = json!([{"id": "doe2020", "issued": {"date-parts": [[2020]]}}]).to_string();
    transport.on_rpc(method::EXPORT, ok(json!([200, "application/json", csl])));
    let doe = key("doe2020");
    assert_eq!(client.issue_date(&doe, true).await, Some(IssueDate::Text("2020".to_string())));
    let calendar = client.issue_date(&doe, false).await.unwrap();
    assert_eq!(calendar.to_string(), "2020-01-01");
    assert_eq!(rpc_params(&transport, method::EXPORT)[0][1], json!(zotlink_protocol::DATE_TRANSLATOR));
}

#[tokio::test]
async fn test_missing_issue_date_is_quiet() {
    let (transport, recorder, client) = setup();
    transport.on_rpc(method::EXPORT, ok(json!([{"id": "doe2020"}])));
    assert_eq!(client.issue_date(&key("doe2020"), true).await, None);
    assert!(recorder.notices().is_empty());
}

#[tokio::test]
async fn test_bibliography_with_quick_copy() {
    let (transport, _, client) = setup();
    transport.on_rpc(method::BIBLIOGRAPHY, ok(json!("<div class=\"csl-entry\">Doe (2020)</div>")));
    let rendered = client.bibliography(&[key("doe2020")], &BibliographyOptions::default()).await;
    assert_eq!(rendered.as_deref(), Some("<div class=\"csl-entry\">Doe (2020)</div>"));
    assert_eq!(
        rpc_params(&transport, method::BIBLIOGRAPHY),
        vec![json!([["doe2020"], {"quickCopy": true, "contentType": "html"}, 1])]
    );
}

#[tokio::test]
async fn test_bibliography_as_markdown() {
    let (transport, _, client) = setup();
    transport.on_rpc(method::BIBLIOGRAPHY, ok(json!("<div class=\"csl-entry\">Doe (2020)</div>")));
    let options = BibliographyOptions { format: BibliographyFormat::Markdown, ..Default::default() };
    let rendered = client.bibliography(&[key("doe2020")], &options).await.unwrap();
    assert!(rendered.contains("Doe") && rendered.contains("2020"));
    assert!(!rendered.contains("<div"));
}

#[tokio::test]
async fn test_empty_bibliography_explains_quick_copy() {
    let (transport, recorder, client) = setup();
    transport
        .on_rpc(method::BIBLIOGRAPHY, ok(json!("  \n")))
        .on_rpc(method::BIBLIOGRAPHY, r#"{"error": {"message": "Cannot read properties of undefined (reading 'children')"}}"#);
    let options = BibliographyOptions::default();
    assert_eq!(client.bibliography(&[key("a")], &options).await, None);
    assert_eq!(client.bibliography(&[key("a")], &options).await, None);
    let notices = recorder.notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.contains("Quick Copy")));
}

#[tokio::test]
async fn test_bibliography_of_nothing() {
    let (transport, recorder, client) = setup();
    assert_eq!(client.bibliography(&[], &BibliographyOptions::default()).await, None);
    assert!(transport.calls().is_empty());
    assert!(recorder.notices().is_empty());
}

#[tokio::test]
async fn test_library_for_citekey_is_cached() {
    let (transport, _, client) = setup();
    transport
        .on_rpc(
            method::SEARCH,
            ok(json!([{"citekey": "doe2020a", "library": "My Library"}, {"citekey": "doe2020", "library": "Lab Papers"}])),
        )
        .on_rpc(method::GROUPS, ok(json!([{"id": 1, "name": "My Library"}, {"id": 4, "name": "Lab Papers"}])));

    assert_eq!(client.library_for_citekey("doe2020").await, Some(4));
    assert_eq!(client.library_for_citekey("doe2020").await, Some(4));
    assert_eq!(client.library_for_citekey("doe2020a").await, Some(1));
    assert_eq!(transport.rpc_count(method::SEARCH), 2);
    assert_eq!(transport.rpc_count(method::GROUPS), 1);
    assert_eq!(*client.caches().groups().await.unwrap(), vec![Group::new(1, "My Library"), Group::new(4, "Lab Papers")]);
}

#[tokio::test]
async fn test_library_for_unknown_citekey_is_quiet() {
    let (transport, recorder, client) = setup();
    transport.on_rpc(method::SEARCH, ok(json!([{"citekey": "other", "library": "My Library"}])));
    assert_eq!(client.library_for_citekey("doe2020").await, None);
    assert_eq!(client.caches().library_id("doe2020").await, None);
    assert_eq!(transport.rpc_count(method::GROUPS), 0);
    assert!(recorder.notices().is_empty());
}

#[tokio::test]
async fn test_is_running_needs_ready() {
    let (transport, _, client) = setup();
    transport.on_get(PROBE_PATH, "ready\n").on_get(PROBE_PATH, "No endpoint found");
    assert!(client.is_running().await);
    assert!(!client.is_running().await);
}
