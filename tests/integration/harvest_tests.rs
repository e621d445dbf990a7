//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small blog (listing pages and post
//! pages) and run discovery and the full pipeline end-to-end.

use blog_harvester::config::{
    Config, HarvestConfig, HttpConfig, LoggingConfig, StorageConfig, UserAgentConfig,
};
use blog_harvester::crawler::{
    build_http_client, discover, run_harvest, CompiledTemplate, Harvester, PageFetcher,
    SiteTemplate,
};
use blog_harvester::extract::TagDictionary;
use blog_harvester::records::{RecordAttribute, RecordStore, SqliteRecordStore};
use blog_harvester::storage::{FsObjectStore, MemoryObjectStore, ObjectStore};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIRST_KEY: &str = "2023-09-14-my-first-blog.txt";
const SECOND_KEY: &str = "2023-10-02-scaling-vpc-networking.txt";

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestHarvester".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn template() -> CompiledTemplate {
    CompiledTemplate::compile(&SiteTemplate::default()).unwrap()
}

fn harvester<S: ObjectStore>(store: S) -> Harvester<S> {
    harvester_with_http(store, &HttpConfig::default())
}

fn harvester_with_http<S: ObjectStore>(store: S, http: &HttpConfig) -> Harvester<S> {
    let client = build_http_client(http, &user_agent()).unwrap();
    Harvester::new(
        client,
        template(),
        TagDictionary::from_lines("security\nnetworking\nkubernetes"),
        store,
    )
}

fn fs_store(dir: &TempDir) -> FsObjectStore {
    FsObjectStore::open(dir.path(), "blog-archive", "data", None).unwrap()
}

fn stored_body(dir: &TempDir, key: &str) -> String {
    fs::read_to_string(dir.path().join("blog-archive").join("data").join(key)).unwrap()
}

/// Renders a listing page with the given post paths and optional next page
fn listing_html(posts: &[&str], next_page: Option<&str>) -> String {
    let titles: String = posts
        .iter()
        .map(|p| {
            format!(
                r#"<div class="blog-post"><h2 class="lb-bold blog-post-title"><a href="{}">Post</a></h2></div>"#,
                p
            )
        })
        .collect();
    let pagination = next_page
        .map(|n| format!(r#"<div class="blog-pagination"><a href="{}">Older posts</a></div>"#, n))
        .unwrap_or_default();

    format!(
        "<html><head><title>Blog</title></head><body>{}{}</body></html>",
        titles, pagination
    )
}

/// Renders a post page following the default site template
fn post_html(title: &str, category: &str, date: &str, label: &str, paragraph: &str) -> String {
    format!(
        r#"<html><body>
        <h2 class="lb-h5 blog-title">{category}</h2>
        <article>
          <h1 class="lb-h2 blog-post-title">{title}</h1>
          <footer class="blog-post-meta">
            by <span property="author">Jane Doe</span> on
            <time property="datePublished">{date}</time> in
            <span class="blog-post-categories">{label}</span>
          </footer>
          <p>{paragraph}</p>
          <div class="blog-author-box"><h3 class="lb-h4">Jane Doe</h3><p>Jane writes about the cloud.</p></div>
        </article>
        </body></html>"#,
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a page that must be requested exactly once
async fn mount_html_once(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts a listing with two valid posts and no pagination
async fn mount_two_post_blog(server: &MockServer) {
    mount_html(
        server,
        "/blog/",
        listing_html(&["/blog/my-first-blog/", "/blog/scaling-vpc/"], None),
    )
    .await;
    mount_html(
        server,
        "/blog/my-first-blog/",
        post_html(
            "My First Blog!",
            "Security",
            "14 Sep 2023",
            "Security, Identity, &amp; Compliance",
            "First paragraph.",
        ),
    )
    .await;
    mount_html(
        server,
        "/blog/scaling-vpc/",
        post_html(
            "Scaling VPC Networking",
            "Networking",
            "02 Oct 2023",
            "Networking &amp; Content Delivery",
            "VPC paragraph.",
        ),
    )
    .await;
}

fn seed(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

#[tokio::test]
async fn test_discovery_single_listing_page() {
    let server = MockServer::start().await;
    mount_two_post_blog(&server).await;

    let client = build_http_client(&HttpConfig::default(), &user_agent()).unwrap();
    let mut fetcher = PageFetcher::new(client);

    let discovery = discover(&mut fetcher, &template(), &seed(&server, "/blog/"), None).await;

    let urls: Vec<String> = discovery.posts.iter().map(|p| p.url.to_string()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/blog/my-first-blog/", server.uri()),
            format!("{}/blog/scaling-vpc/", server.uri()),
        ]
    );
    assert_eq!(discovery.pages_visited.len(), 1);
}

#[tokio::test]
async fn test_pagination_cycle_terminates() {
    let server = MockServer::start().await;

    mount_html_once(
        &server,
        "/blog/page/1/",
        listing_html(&["/blog/a/"], Some("/blog/page/2/")),
    )
    .await;
    // The last page links back to the first one
    mount_html_once(
        &server,
        "/blog/page/2/",
        listing_html(&["/blog/b/"], Some("/blog/page/1/")),
    )
    .await;

    let client = build_http_client(&HttpConfig::default(), &user_agent()).unwrap();
    let mut fetcher = PageFetcher::new(client);

    let discovery =
        discover(&mut fetcher, &template(), &seed(&server, "/blog/page/1/"), None).await;

    assert_eq!(discovery.pages_visited.len(), 2);
    assert_eq!(discovery.posts.len(), 2);
    assert!(discovery.posts[0].url.path().ends_with("/blog/a/"));
    assert!(discovery.posts[1].url.path().ends_with("/blog/b/"));
}

#[tokio::test]
async fn test_page_linking_to_itself_is_fetched_once() {
    let server = MockServer::start().await;
    mount_html_once(
        &server,
        "/blog/page/1/",
        listing_html(&["/blog/a/"], Some("/blog/page/1/")),
    )
    .await;

    let client = build_http_client(&HttpConfig::default(), &user_agent()).unwrap();
    let mut fetcher = PageFetcher::new(client);

    let discovery =
        discover(&mut fetcher, &template(), &seed(&server, "/blog/page/1/"), None).await;

    assert_eq!(discovery.pages_visited.len(), 1);
    assert_eq!(discovery.posts.len(), 1);
}

#[tokio::test]
async fn test_pagination_page_limit() {
    let server = MockServer::start().await;

    for n in 1..=3 {
        mount_html(
            &server,
            &format!("/blog/page/{}/", n),
            listing_html(
                &[format!("/blog/post-{}/", n).as_str()],
                Some(format!("/blog/page/{}/", n + 1).as_str()),
            ),
        )
        .await;
    }

    let client = build_http_client(&HttpConfig::default(), &user_agent()).unwrap();
    let mut fetcher = PageFetcher::new(client);

    let discovery =
        discover(&mut fetcher, &template(), &seed(&server, "/blog/page/1/"), Some(2)).await;

    assert_eq!(discovery.pages_visited.len(), 2);
    assert_eq!(discovery.posts.len(), 2);
}

#[tokio::test]
async fn test_unavailable_next_page_keeps_partial_results() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/blog/",
        listing_html(&["/blog/a/", "/blog/b/"], Some("/blog/page/2/")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/blog/page/2/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = build_http_client(&HttpConfig::default(), &user_agent()).unwrap();
    let mut fetcher = PageFetcher::new(client);

    let discovery = discover(&mut fetcher, &template(), &seed(&server, "/blog/"), None).await;

    assert_eq!(discovery.posts.len(), 2);
    assert_eq!(discovery.pages_visited.len(), 2);
}

#[tokio::test]
async fn test_full_run_stores_bodies() {
    let server = MockServer::start().await;
    mount_two_post_blog(&server).await;
    let dir = TempDir::new().unwrap();

    let mut harvester = harvester(fs_store(&dir));
    let stats = harvester.run(&seed(&server, "/blog/")).await.unwrap();

    assert_eq!(stats.stored, 2);
    assert_eq!(stats.processed(), 2);

    let first = stored_body(&dir, FIRST_KEY);
    assert!(first.starts_with("My First Blog!"));
    assert!(first.contains("First paragraph."));
    assert!(!first.contains("Jane writes about the cloud"));
    assert!(!first.contains("14 Sep 2023"));

    assert!(stored_body(&dir, SECOND_KEY).contains("VPC paragraph."));

    let keys: Vec<String> = harvester
        .store()
        .list()
        .unwrap()
        .into_iter()
        .map(|o| o.key)
        .collect();
    assert_eq!(keys, vec![FIRST_KEY.to_string(), SECOND_KEY.to_string()]);
}

#[tokio::test]
async fn test_second_run_skips_existing_objects() {
    let server = MockServer::start().await;
    mount_two_post_blog(&server).await;
    let dir = TempDir::new().unwrap();

    let first = harvester(fs_store(&dir))
        .run(&seed(&server, "/blog/"))
        .await
        .unwrap();
    assert_eq!(first.stored, 2);

    // Pretend the first post was edited locally; it must survive the re-run
    let path = dir.path().join("blog-archive/data").join(FIRST_KEY);
    fs::write(&path, "edited").unwrap();

    let second = harvester(fs_store(&dir))
        .run(&seed(&server, "/blog/"))
        .await
        .unwrap();

    assert_eq!(second.stored, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), "edited");
}

#[tokio::test]
async fn test_bad_posts_do_not_stop_the_run() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/blog/",
        listing_html(
            &[
                "/blog/no-title/",
                "/blog/missing/",
                "/blog/bad-date/",
                "/blog/my-first-blog/",
            ],
            None,
        ),
    )
    .await;
    mount_html(
        &server,
        "/blog/no-title/",
        r#"<html><body><h2 class="lb-h5 blog-title">Security</h2>
           <article><span property="author">Jane</span>
           <time property="datePublished">14 Sep 2023</time></article></body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/blog/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/blog/bad-date/",
        post_html("Dated", "Security", "2023-09-14", "Security", "Body."),
    )
    .await;
    mount_html(
        &server,
        "/blog/my-first-blog/",
        post_html("My First Blog!", "Security", "14 Sep 2023", "Security", "Body."),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let stats = harvester(fs_store(&dir))
        .run(&seed(&server, "/blog/"))
        .await
        .unwrap();

    assert_eq!(stats.posts_discovered, 4);
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.unavailable, 1);
    assert_eq!(stats.stored, 1);
    assert!(stored_body(&dir, FIRST_KEY).contains("Body."));
}

#[tokio::test]
async fn test_symbol_only_title_rejects_only_that_post() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/blog/",
        listing_html(&["/blog/rocket/", "/blog/my-first-blog/"], None),
    )
    .await;
    mount_html(
        &server,
        "/blog/rocket/",
        post_html("🚀🚀", "Security", "13 Sep 2023", "Security", "Rocket body."),
    )
    .await;
    mount_html(
        &server,
        "/blog/my-first-blog/",
        post_html("My First Blog!", "Security", "14 Sep 2023", "Security", "Body."),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut harvester = harvester(fs_store(&dir));
    let stats = harvester.run(&seed(&server, "/blog/")).await.unwrap();

    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.stored, 1);
    assert_eq!(harvester.store().list().unwrap().len(), 1);
    assert!(stored_body(&dir, FIRST_KEY).contains("Body."));
}

#[tokio::test]
async fn test_timed_out_post_is_unavailable() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/blog/",
        listing_html(&["/blog/slow/", "/blog/my-first-blog/"], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/blog/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(post_html("Slow", "Security", "13 Sep 2023", "Security", "Late."))
                .insert_header("content-type", "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/blog/my-first-blog/",
        post_html("My First Blog!", "Security", "14 Sep 2023", "Security", "Body."),
    )
    .await;

    let http = HttpConfig {
        request_timeout_secs: 1,
        connect_timeout_secs: 1,
    };
    let mut harvester = harvester_with_http(MemoryObjectStore::new("blog-archive"), &http);
    let stats = harvester.run(&seed(&server, "/blog/")).await.unwrap();

    assert_eq!(stats.unavailable, 1);
    assert_eq!(stats.stored, 1);
    assert!(harvester.store().get(FIRST_KEY).is_some());
}

#[tokio::test]
async fn test_redirected_post_records_final_url() {
    let server = MockServer::start().await;
    mount_html(&server, "/blog/", listing_html(&["/blog/old-link/"], None)).await;
    Mock::given(method("GET"))
        .and(path("/blog/old-link/"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/blog/my-first-blog/", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/blog/my-first-blog/",
        post_html("My First Blog!", "Security", "14 Sep 2023", "Security", "Body."),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("records.db");
    let stats = harvester(MemoryObjectStore::new("blog-archive"))
        .with_records(Box::new(SqliteRecordStore::new(&db_path).unwrap()))
        .run(&seed(&server, "/blog/"))
        .await
        .unwrap();
    assert_eq!(stats.stored, 1);

    let records = SqliteRecordStore::new(&db_path).unwrap();
    let post = records.get("my first blog!", "2023-09-14").unwrap().unwrap();
    assert_eq!(post.source_url, format!("{}/blog/my-first-blog/", server.uri()));
}

#[tokio::test]
async fn test_unavailable_seed_yields_empty_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut harvester = harvester(MemoryObjectStore::new("dry-run"));
    let stats = harvester.run(&seed(&server, "/blog/")).await.unwrap();

    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.posts_discovered, 0);
    assert_eq!(stats.stored, 0);
    assert!(harvester.store().is_empty());
}

#[tokio::test]
async fn test_record_store_populated() {
    let server = MockServer::start().await;
    mount_two_post_blog(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("records.db");

    let records = SqliteRecordStore::new(&db_path).unwrap();
    let stats = harvester(MemoryObjectStore::new("blog-archive"))
        .with_records(Box::new(records))
        .run(&seed(&server, "/blog/"))
        .await
        .unwrap();
    assert_eq!(stats.stored, 2);
    assert_eq!(stats.record_failures, 0);

    let records = SqliteRecordStore::new(&db_path).unwrap();
    assert_eq!(records.count().unwrap(), 2);

    let post = records.get("my first blog!", "2023-09-14").unwrap().unwrap();
    assert_eq!(post.category, "security");
    assert_eq!(post.object_key, FIRST_KEY);
    assert!(post.authors.contains("jane doe"));
    assert!(post.tags.contains("security"));
    assert_eq!(post.source_url, format!("{}/blog/my-first-blog/", server.uri()));

    let networking = records.query(RecordAttribute::Tag, "networking").unwrap();
    assert_eq!(networking.len(), 1);
    assert_eq!(networking[0].blog_title, "scaling vpc networking");
}

#[tokio::test]
async fn test_run_harvest_from_config() {
    let server = MockServer::start().await;
    mount_two_post_blog(&server).await;
    let dir = TempDir::new().unwrap();

    let dictionary = dir.path().join("tags.txt");
    fs::write(&dictionary, "Security\n\nnetworking\n").unwrap();

    let config = Config {
        harvest: HarvestConfig {
            seed_url: seed(&server, "/blog/").to_string(),
            tag_dictionary: dictionary.display().to_string(),
            file_extension: ".txt".to_string(),
            max_pages: None,
        },
        http: HttpConfig::default(),
        user_agent: user_agent(),
        storage: StorageConfig {
            bucket: "blog-archive".to_string(),
            root: dir.path().display().to_string(),
            prefix: "data".to_string(),
            public_base_url: None,
        },
        records: None,
        logging: LoggingConfig::default(),
        template: SiteTemplate::default(),
    };

    let stats = run_harvest(&config).await.unwrap();

    assert_eq!(stats.stored, 2);
    assert!(dir.path().join("blog-archive/data").join(FIRST_KEY).exists());
}

#[tokio::test]
async fn test_run_harvest_missing_dictionary_is_fatal() {
    let dir = TempDir::new().unwrap();

    let config = Config {
        harvest: HarvestConfig {
            seed_url: "http://127.0.0.1:9/blog/".to_string(),
            tag_dictionary: dir.path().join("absent.txt").display().to_string(),
            file_extension: ".txt".to_string(),
            max_pages: None,
        },
        http: HttpConfig::default(),
        user_agent: user_agent(),
        storage: StorageConfig {
            bucket: "blog-archive".to_string(),
            root: dir.path().display().to_string(),
            prefix: "data".to_string(),
            public_base_url: None,
        },
        records: None,
        logging: LoggingConfig::default(),
        template: SiteTemplate::default(),
    };

    assert!(run_harvest(&config).await.is_err());
}
