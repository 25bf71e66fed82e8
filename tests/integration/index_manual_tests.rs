//! Integration tests for indexing a manual
//!
//! These tests use wiremock to serve a rendered manual and run the full
//! pipeline end-to-end into the in-memory search client.

use manual_indexer::config::{Config, CrawlerConfig, SearchConfig};
use manual_indexer::search::{document_id, DEFAULT_INDEX};
use manual_indexer::{
    ElasticsearchClient, FetchError, IndexerError, ManualIndexer, MemorySearchClient,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MANUAL_PATH: &str = "/m/core/main/en-us";

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_fetches: 2,
            fetch_timeout: 5,
            run_deadline: 60,
        },
        ..Config::default()
    }
}

fn sitemap(links: &[&str]) -> String {
    let items: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{}">{}</a></li>"#, href, href))
        .collect();
    format!(
        r#"<html><body>
        <nav><a href="../Index.html#navigation">Navigation</a></nav>
        <div class="sitemap"><ul>{}</ul></div>
        </body></html>"#,
        items
    )
}

const INDEX_PAGE: &str = r##"<html><head><title>Core APIs</title></head><body>
    <div class="sidebartop"><div class="project">Core <b>APIs</b> (10.4)</div></div>
    <div class="section" id="intro">
        <h1>Introduction<a class="headerlink" href="#intro">¶</a></h1>
        <p>Welcome to the core APIs.</p>
        <div class="section" id="install">
            <h2>Installation<a class="headerlink" href="#install">¶</a></h2>
            <p>Run   composer require.</p>
        </div>
    </div>
</body></html>"##;

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_sitemap(server: &MockServer, links: &[&str]) {
    mount_page(
        server,
        &format!("{}/Sitemap/Index.html", MANUAL_PATH),
        sitemap(links),
    )
    .await;
}

async fn mount_index_page(server: &MockServer, body: &str) {
    mount_page(server, &format!("{}/Index.html", MANUAL_PATH), body.to_string()).await;
}

fn manual_url(server: &MockServer) -> String {
    format!("{}{}/", server.uri(), MANUAL_PATH)
}

fn section_url(server: &MockServer, page: &str, fragment: &str) -> String {
    format!("{}{}/{}#{}", server.uri(), MANUAL_PATH, page, fragment)
}

fn memory_indexer(search: Arc<MemorySearchClient>) -> ManualIndexer {
    ManualIndexer::from_config(&create_test_config(), search).expect("Failed to build indexer")
}

#[tokio::test]
async fn test_index_two_sections_of_one_page() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["../Index.html#intro", "../Index.html#install"]).await;
    mount_index_page(&server, INDEX_PAGE).await;

    let search = Arc::new(MemorySearchClient::new());
    let result = memory_indexer(search.clone())
        .index_manual(&manual_url(&server))
        .await
        .expect("Indexing failed");

    assert_eq!(result.indexed, 2);
    assert_eq!(result.skipped, 0);
    assert!(result.is_complete());
    assert_eq!(search.create_calls(), 1);

    let intro_id = document_id(&section_url(&server, "Index.html", "intro")).unwrap();
    let install_id = document_id(&section_url(&server, "Index.html", "install")).unwrap();
    assert_ne!(intro_id, install_id);
    assert_eq!(result.document_ids, vec![intro_id.clone(), install_id.clone()]);

    let intro = search.document(DEFAULT_INDEX, &intro_id).expect("intro missing");
    assert_eq!(intro.body.title, "Introduction");
    assert_eq!(intro.body.manual, "Core APIs");
    assert_eq!(intro.body.version, "10.4");
    assert_eq!(intro.body.uri, section_url(&server, "Index.html", "intro"));
    assert!(intro.body.content.starts_with("Introduction"));
    assert!(intro.body.content.contains("Welcome to the core APIs."));
    assert!(!intro.body.content.contains('¶'));

    let install = search.document(DEFAULT_INDEX, &install_id).expect("install missing");
    assert_eq!(install.body.title, "Installation");
    assert!(install.body.content.starts_with("Installation"));
    assert!(install.body.content.ends_with("Run   composer require."));
    assert_eq!(
        (install.body.manual.as_str(), install.body.version.as_str()),
        ("Core APIs", "10.4")
    );
}

#[tokio::test]
async fn test_reindex_is_idempotent() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["../Index.html#intro", "../Index.html#install"]).await;
    mount_index_page(&server, INDEX_PAGE).await;

    let search = Arc::new(MemorySearchClient::new());
    let indexer = memory_indexer(search.clone());

    indexer.reindex_manual(&manual_url(&server)).await.unwrap();
    let first = search.documents(DEFAULT_INDEX);

    let result = indexer.reindex_manual(&manual_url(&server)).await.unwrap();
    let second = search.documents(DEFAULT_INDEX);

    assert_eq!(result.indexed, 2);
    assert_eq!(result.retracted, 0);
    assert_eq!(first, second);
    assert_eq!(search.create_calls(), 1);
}

#[tokio::test]
async fn test_links_without_fragment_are_skipped() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["../Setup/Index.html", "../Index.html#intro"]).await;
    mount_index_page(&server, INDEX_PAGE).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/Setup/Index.html", MANUAL_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let search = Arc::new(MemorySearchClient::new());
    let result = memory_indexer(search.clone())
        .index_manual(&manual_url(&server))
        .await
        .unwrap();

    assert_eq!(result.skipped, 1);
    assert_eq!(result.indexed, 1);
    assert!(result.is_complete());
}

#[tokio::test]
async fn test_missing_page_does_not_stop_the_run() {
    let server = MockServer::start().await;
    mount_sitemap(
        &server,
        &["../Missing.html#gone", "../Index.html#intro", "../Index.html#nope"],
    )
    .await;
    mount_index_page(&server, INDEX_PAGE).await;

    let search = Arc::new(MemorySearchClient::new());
    let result = memory_indexer(search.clone())
        .index_manual(&manual_url(&server))
        .await
        .unwrap();

    assert_eq!(result.indexed, 1);
    assert_eq!(result.failed(), 2);

    assert_eq!(result.errors[0].url, section_url(&server, "Missing.html", "gone"));
    assert!(matches!(
        result.errors[0].error,
        IndexerError::Fetch(FetchError::Status { status: 404, .. })
    ));
    assert!(matches!(
        &result.errors[1].error,
        IndexerError::FragmentNotFound { fragment, .. } if fragment == "nope"
    ));
    assert_eq!(search.documents(DEFAULT_INDEX).len(), 1);
}

#[tokio::test]
async fn test_excluded_and_foreign_links_are_ignored() {
    let server = MockServer::start().await;
    mount_sitemap(
        &server,
        &[
            "../Targets.html#labels",
            "https://other.example.org/m/core/main/en-us/Index.html#intro",
            "../../../../other-manual/Index.html#intro",
            "../Index.html#intro",
            "../Index.html#intro",
        ],
    )
    .await;
    mount_index_page(&server, INDEX_PAGE).await;

    let search = Arc::new(MemorySearchClient::new());
    let result = memory_indexer(search.clone())
        .index_manual(&manual_url(&server))
        .await
        .unwrap();

    assert_eq!(result.indexed, 1);
    assert_eq!(result.skipped, 0);
    assert!(result.is_complete());
}

#[tokio::test]
async fn test_sitemap_without_container_is_fatal() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        &format!("{}/Sitemap/Index.html", MANUAL_PATH),
        r#"<html><body><a href="../Index.html#intro">Intro</a></body></html>"#.to_string(),
    )
    .await;

    let search = Arc::new(MemorySearchClient::new());
    let err = memory_indexer(search.clone())
        .index_manual(&manual_url(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, IndexerError::Discovery { .. }));
    assert!(err.is_run_fatal());
    assert!(search.documents(DEFAULT_INDEX).is_empty());
}

#[tokio::test]
async fn test_unreachable_sitemap_is_fatal() {
    let server = MockServer::start().await;

    let search = Arc::new(MemorySearchClient::new());
    let err = memory_indexer(search)
        .index_manual(&manual_url(&server))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IndexerError::Fetch(FetchError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_reindex_retracts_removed_sections() {
    let server = MockServer::start().await;
    let search = Arc::new(MemorySearchClient::new());
    let indexer = memory_indexer(search.clone());

    mount_sitemap(&server, &["../Index.html#intro", "../Index.html#install"]).await;
    mount_index_page(&server, INDEX_PAGE).await;

    indexer.reindex_manual(&manual_url(&server)).await.unwrap();
    assert_eq!(search.documents(DEFAULT_INDEX).len(), 2);

    // The next build of the manual drops the installation section.
    server.reset().await;
    mount_index_page(&server, INDEX_PAGE).await;
    mount_sitemap(&server, &["../Index.html#intro"]).await;
    let result = indexer.reindex_manual(&manual_url(&server)).await.unwrap();

    assert_eq!(result.indexed, 1);
    assert_eq!(result.retracted, 1);

    let docs = search.documents(DEFAULT_INDEX);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].body.title, "Introduction");
}

#[tokio::test]
async fn test_run_deadline_is_fatal() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["../Index.html#intro"]).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/Index.html", MANUAL_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(INDEX_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = Config {
        crawler: CrawlerConfig {
            run_deadline: 1,
            ..create_test_config().crawler
        },
        ..create_test_config()
    };
    let indexer =
        ManualIndexer::from_config(&config, Arc::new(MemorySearchClient::new())).unwrap();

    let err = indexer.index_manual(&manual_url(&server)).await.unwrap_err();
    assert!(matches!(err, IndexerError::Timeout(d) if d == Duration::from_secs(1)));
}

#[tokio::test]
async fn test_provisioning_failure_is_fatal() {
    let site = MockServer::start().await;
    mount_sitemap(&site, &["../Index.html#intro"]).await;
    mount_index_page(&site, INDEX_PAGE).await;

    let engine = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path(format!("/{}", DEFAULT_INDEX)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&engine)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&engine)
        .await;

    let search = ElasticsearchClient::from_config(&SearchConfig {
        endpoint: engine.uri(),
        ..SearchConfig::default()
    })
    .unwrap();
    let indexer = ManualIndexer::from_config(&create_test_config(), Arc::new(search)).unwrap();

    let err = indexer.index_manual(&manual_url(&site)).await.unwrap_err();
    assert!(matches!(err, IndexerError::IndexProvisioning { .. }));
}

#[tokio::test]
async fn test_reindex_keeps_other_locale_of_same_manual() {
    let server = MockServer::start().await;
    let de_path = "/m/core/main/de-de";

    mount_sitemap(&server, &["../Index.html#intro"]).await;
    mount_index_page(&server, INDEX_PAGE).await;
    mount_page(
        &server,
        &format!("{}/Sitemap/Index.html", de_path),
        sitemap(&["../Index.html#intro", "../Index.html#install"]),
    )
    .await;
    mount_page(&server, &format!("{}/Index.html", de_path), INDEX_PAGE.to_string()).await;

    let search = Arc::new(MemorySearchClient::new());
    let indexer = memory_indexer(search.clone());

    let de_url = format!("{}{}/", server.uri(), de_path);
    indexer.reindex_manual(&de_url).await.unwrap();
    let result = indexer.reindex_manual(&manual_url(&server)).await.unwrap();

    // Both locales render "Core APIs (10.4)", yet the German sections stay.
    assert_eq!(result.retracted, 0);
    let docs = search.documents(DEFAULT_INDEX);
    assert_eq!(docs.len(), 3);
    assert_eq!(
        docs.iter()
            .filter(|doc| doc.body.uri.starts_with(&de_url))
            .count(),
        2
    );
}
