//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a listing page, discussion pages and
//! story pages, and run the full crawl against a temporary output directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use story_archiver::config::Config;
use story_archiver::crawler::{crawl, Coordinator};
use story_archiver::state::{Entry, Fingerprint};
use story_archiver::storage::{
    render_manifest, ByteStream, ContentStore, FsContentStore, StorageResult,
};
use story_archiver::ArchiverError;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, out: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.root_url = format!("{}/", server.uri());
    config.crawler.request_timeout_secs = 5;
    config.output.directory = out.display().to_string();
    config
}

fn listing_page(rows: &[String]) -> String {
    format!(
        r#"<html><body><center><table id="hnmain"><tr><td>
           <table class="itemlist">{}</table>
           </td></tr></table></center></body></html>"#,
        rows.concat()
    )
}

fn story_row(id: u32, title: &str, href: &str) -> String {
    format!(
        r#"<tr class="athing submission" id="{id}">
             <td class="title"><span class="rank">{id}.</span></td>
             <td class="title"><span class="titleline"><a href="{href}">{title}</a></span></td>
           </tr>"#
    )
}

fn meta_row(id: u32, comments: u32) -> String {
    format!(
        r#"<tr><td class="subtext"><span class="subline">
             <a href="user?id=someone" class="hnuser">someone</a>
             <a href="hide?id={id}">hide</a> | <a href="item?id={id}">{comments}&nbsp;comments</a>
           </span></td></tr>"#
    )
}

fn comments_page(links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">link</a> "#, l))
        .collect();
    format!(
        r#"<html><body>
           <table class="fatitem"><tr><td><a href="https://not-in-tree.example/">x</a></td></tr></table>
           <table class="comment-tree"><tr class="athing comtr"><td>
             <a href="user?id=alice">alice</a> <a href="item?id=99">1 hour ago</a>
             {}
           </td></tr></table></body></html>"#,
        anchors
    )
}

async fn mount_listing(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_item(server: &MockServer, id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

fn story_dirs(out: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(out)
        .expect("Failed to read output root")
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn comment_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("comment_"))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_scenario_a_single_story_archived() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    let base = server.uri();

    mount_listing(
        &server,
        listing_page(&[story_row(1, "Example Story", "/item?id=1"), meta_row(1, 5)]),
    )
    .await;
    let item_body = comments_page(&[format!("{}/ext/a", base), format!("{}/ext/b", base)]);
    mount_item(&server, "1", item_body.clone()).await;
    mount_page(&server, "/ext/a", "<html>cited a</html>").await;
    mount_page(&server, "/ext/b", "<html>cited b</html>").await;

    let report = crawl(create_test_config(&server, out.path()))
        .await
        .expect("Crawl failed");

    let dir = out.path().join(Fingerprint::of("Example Story").as_str());
    assert!(dir.is_dir());
    assert_eq!(
        std::fs::read_to_string(dir.join("main.html")).unwrap(),
        item_body
    );

    let mut cited: Vec<String> = comment_files(&dir)
        .iter()
        .map(|n| std::fs::read_to_string(dir.join(n)).unwrap())
        .collect();
    cited.sort();
    assert_eq!(cited, vec!["<html>cited a</html>", "<html>cited b</html>"]);
    assert_eq!(comment_files(&dir), vec!["comment_0.html", "comment_1.html"]);

    assert_eq!(report.discovered, 1);
    assert_eq!(report.archived, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.comment_links_saved, 2);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_manifest_written_alongside_main_page() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_listing(
        &server,
        listing_page(&[story_row(1, "Example Story", "/item?id=1"), meta_row(1, 5)]),
    )
    .await;
    mount_item(&server, "1", comments_page(&[])).await;

    crawl(create_test_config(&server, out.path()))
        .await
        .expect("Crawl failed");

    let dir = out.path().join(Fingerprint::of("Example Story").as_str());
    let expected = render_manifest(&Entry::new(
        "Example Story",
        "/item?id=1",
        Some("item?id=1".to_string()),
    ))
    .unwrap();
    assert_eq!(std::fs::read_to_string(dir.join("readme")).unwrap(), expected);
}

#[tokio::test]
async fn test_manifest_can_be_disabled() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_listing(&server, listing_page(&[story_row(1, "Quiet", "/story")])).await;
    mount_page(&server, "/story", "<html>story</html>").await;

    let mut config = create_test_config(&server, out.path());
    config.crawler.write_manifest = false;
    crawl(config).await.expect("Crawl failed");

    let dir = out.path().join(Fingerprint::of("Quiet").as_str());
    assert!(dir.join("main.html").is_file());
    assert!(!dir.join("readme").exists());
}

#[tokio::test]
async fn test_scenario_b_duplicate_titles_archived_once() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_listing(
        &server,
        listing_page(&[
            story_row(1, "Same Title", "/first"),
            story_row(2, "Same Title", "/second"),
            story_row(3, "Other Title", "/third"),
        ]),
    )
    .await;
    mount_page(&server, "/first", "first").await;
    mount_page(&server, "/second", "second").await;
    mount_page(&server, "/third", "third").await;

    let report = crawl(create_test_config(&server, out.path()))
        .await
        .expect("Crawl failed");

    assert_eq!(story_dirs(out.path()).len(), 2);
    assert_eq!(report.discovered, 3);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.archived, 2);

    let dir = out.path().join(Fingerprint::of("Same Title").as_str());
    let body = std::fs::read_to_string(dir.join("main.html")).unwrap();
    assert!(body == "first" || body == "second");
}

#[tokio::test]
async fn test_scenario_c_empty_comment_tree() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_listing(
        &server,
        listing_page(&[story_row(1, "No Discussion", "/story"), meta_row(7, 0)]),
    )
    .await;
    mount_page(&server, "/story", "<html>story</html>").await;
    mount_item(
        &server,
        "7",
        r#"<html><body><table class="comment-tree"></table></body></html>"#.to_string(),
    )
    .await;

    let report = crawl(create_test_config(&server, out.path()))
        .await
        .expect("Crawl failed");

    let dir = out.path().join(Fingerprint::of("No Discussion").as_str());
    assert!(dir.join("main.html").is_file());
    assert!(comment_files(&dir).is_empty());
    assert_eq!(report.archived, 1);
    assert_eq!(report.comment_links_saved, 0);
}

#[tokio::test]
async fn test_scenario_d_primary_failure_is_isolated() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // Nothing listens on port 1, so the first story's download fails
    mount_listing(
        &server,
        listing_page(&[
            story_row(1, "Unreachable Story", "http://127.0.0.1:1/gone"),
            meta_row(1, 3),
            story_row(2, "Healthy Story", "/healthy"),
        ]),
    )
    .await;
    mount_page(&server, "/healthy", "<html>healthy</html>").await;
    // The failed entry's discussion must never be requested
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(comments_page(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(create_test_config(&server, out.path()))
        .await
        .expect("Crawl should complete despite a failed entry");

    assert_eq!(report.failed, 1);
    assert_eq!(report.archived, 1);
    assert!(report.is_success());

    let failed_dir = out.path().join(Fingerprint::of("Unreachable Story").as_str());
    assert!(!failed_dir.join("main.html").exists());

    let healthy_dir = out.path().join(Fingerprint::of("Healthy Story").as_str());
    assert_eq!(
        std::fs::read_to_string(healthy_dir.join("main.html")).unwrap(),
        "<html>healthy</html>"
    );
}

#[tokio::test]
async fn test_http_error_on_primary_page_fails_entry() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_listing(&server, listing_page(&[story_row(1, "Broken", "/broken")])).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = crawl(create_test_config(&server, out.path()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.failed, 1);
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_comment_link_failures_are_independent() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    let base = server.uri();

    mount_listing(
        &server,
        listing_page(&[story_row(1, "Cited", "/story"), meta_row(4, 2)]),
    )
    .await;
    mount_page(&server, "/story", "story").await;
    mount_item(
        &server,
        "4",
        comments_page(&[format!("{}/missing", base), format!("{}/present", base)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/present", "present").await;

    let report = crawl(create_test_config(&server, out.path()))
        .await
        .expect("Crawl failed");

    let dir = out.path().join(Fingerprint::of("Cited").as_str());
    assert_eq!(comment_files(&dir), vec!["comment_1.html"]);
    assert_eq!(
        std::fs::read_to_string(dir.join("comment_1.html")).unwrap(),
        "present"
    );
    assert_eq!(report.archived, 1);
    assert_eq!(report.comment_links_saved, 1);
    assert_eq!(report.comment_links_failed, 1);
}

#[tokio::test]
async fn test_unreachable_comments_page_still_done() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_listing(
        &server,
        listing_page(&[story_row(1, "Lost Thread", "/story"), meta_row(8, 2)]),
    )
    .await;
    mount_page(&server, "/story", "story").await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let report = crawl(create_test_config(&server, out.path()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.archived, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_listing_fetch_failure_is_fatal() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = crawl(create_test_config(&server, out.path())).await;
    assert!(matches!(result, Err(ArchiverError::Fetch(_))));
}

#[tokio::test]
async fn test_zero_entry_concurrency_is_rejected() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_listing(
        &server,
        listing_page(&[story_row(1, "Only", &format!("{}/a", server.uri()))]),
    )
    .await;

    let mut config = create_test_config(&server, out.path());
    config.crawler.max_concurrent_entries = 0;

    let result = tokio::time::timeout(Duration::from_secs(3), crawl(config))
        .await
        .expect("Crawl hung instead of rejecting the configuration");
    assert!(matches!(result, Err(ArchiverError::Config(_))));
    assert!(story_dirs(out.path()).is_empty());
}

#[tokio::test]
async fn test_listing_without_rows_is_fatal() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_listing(&server, "<html><body>maintenance</body></html>".to_string()).await;

    let result = crawl(create_test_config(&server, out.path())).await;
    assert!(matches!(result, Err(ArchiverError::Parse(_))));
}

#[tokio::test]
async fn test_output_root_is_created() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("nested").join("archive");

    mount_listing(&server, listing_page(&[story_row(1, "Fresh Root", "/story")])).await;
    mount_page(&server, "/story", "story").await;

    let report = crawl(create_test_config(&server, &out))
        .await
        .expect("Crawl failed");

    assert!(out.is_dir());
    assert_eq!(report.archived, 1);
}

/// Store that records when each write begins and ends
#[derive(Default)]
struct RecordingStore {
    inner: FsContentStore,
    events: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn record(&self, kind: &str, path: &Path) {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:{}", kind, name));
    }

    fn position(&self, event: &str) -> usize {
        let events = self.events.lock().unwrap();
        events
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("missing event {} in {:?}", event, events))
    }
}

#[async_trait]
impl ContentStore for RecordingStore {
    async fn ensure_dir(&self, path: &Path) -> StorageResult<()> {
        self.inner.ensure_dir(path).await
    }

    async fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path).await
    }

    async fn write_stream(&self, path: &Path, body: ByteStream) -> StorageResult<u64> {
        self.record("start", path);
        let result = self.inner.write_stream(path, body).await;
        self.record("end", path);
        result
    }

    async fn write_bytes(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        self.record("start", path);
        let result = self.inner.write_bytes(path, contents).await;
        self.record("end", path);
        result
    }
}

#[tokio::test]
async fn test_primary_page_written_before_comment_links() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    let base = server.uri();

    mount_listing(
        &server,
        listing_page(&[story_row(1, "Ordered", "/slow"), meta_row(5, 3)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow primary page")
                .set_delay(std::time::Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    mount_item(
        &server,
        "5",
        comments_page(&[
            format!("{}/c0", base),
            format!("{}/c1", base),
            format!("{}/c2", base),
        ]),
    )
    .await;
    for page in ["/c0", "/c1", "/c2"] {
        mount_page(&server, page, "cited").await;
    }

    let store = Arc::new(RecordingStore::default());
    let coordinator =
        Coordinator::with_store(create_test_config(&server, out.path()), store.clone())
            .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");
    assert_eq!(report.comment_links_saved, 3);

    assert!(store.position("end:readme") < store.position("start:main.html"));
    let main_done = store.position("end:main.html");
    for index in 0..3 {
        let start = store.position(&format!("start:comment_{}.html", index));
        assert!(main_done < start, "comment_{} began before main.html", index);
    }
}
