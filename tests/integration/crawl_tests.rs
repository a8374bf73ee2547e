//! Integration tests for full crawl cycles

use crate::common::*;
use tokio_util::sync::CancellationToken;
use udn_harvest::config::Config;
use udn_harvest::crawler::{CrawlStats, Coordinator};
use udn_harvest::storage::{ArticleStorage, RunStatus, SqliteStorage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing(links: &[&str], next: Option<&str>) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">story</a>"#, href))
        .collect();
    let next = next
        .map(|href| format!(r#"<link rel="next" href="{}">"#, href))
        .unwrap_or_default();
    format!(
        "<html><head>{}</head><body>{}<a href=\"/about\">about</a></body></html>",
        next, anchors
    )
}

/// Two listing pages, five distinct article links and one of each outcome
async fn mount_site(server: &MockServer) {
    mount_html(
        server,
        INDEX_PATH,
        listing(
            &[
                "/news/story/1/1",
                "/news/story/1/2",
                "/news/story/1/1?from=udn-ch1_breaknews",
            ],
            Some("/news/breaknews/1/99/2"),
        ),
    )
    .await;
    mount_html(
        server,
        "/news/breaknews/1/99/2",
        listing(
            &["/news/story/1/3", "/news/story/1/4", "/news/story/1/5"],
            Some(INDEX_PATH),
        ),
    )
    .await;

    mount_html(
        server,
        "/news/story/1/1",
        article_page("第一則 | 要聞 | 聯合新聞網", &fresh_date(), "<p>一</p>"),
    )
    .await;
    mount_html(
        server,
        "/news/story/1/2",
        article_page("第二則 | 社會 | 聯合新聞網", &fresh_date(), "<p>二</p>"),
    )
    .await;
    mount_html(
        server,
        "/news/story/1/3",
        article_page("舊聞", &stale_date(), "<p>三</p>"),
    )
    .await;
    mount_html(
        server,
        "/news/story/1/4",
        article_page("漲停 | 股市", &fresh_date(), "<p>四</p>"),
    )
    .await;
    mount_status(server, "/news/story/1/5", 404).await;
}

fn coordinator(server: &MockServer) -> Coordinator {
    coordinator_with(create_test_config(&server.uri(), ":memory:"))
}

fn coordinator_with(config: Config) -> Coordinator {
    let storage = SqliteStorage::open_in_memory().unwrap();
    Coordinator::with_storage(
        config,
        "test-hash".to_string(),
        storage,
        CancellationToken::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_full_cycle_counts_every_outcome() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let coordinator = coordinator(&server);
    let stats = coordinator.run_cycle().await.unwrap();

    assert_eq!(
        stats,
        CrawlStats {
            discovered: 5,
            stored: 2,
            ignored_category: 1,
            ignored_vip: 0,
            stale: 1,
            failed: 1,
            cancelled: 0,
        }
    );
    assert_eq!(stats.processed(), stats.discovered);

    let storage = coordinator.storage();
    let storage = storage.lock().unwrap();
    let titles: Vec<String> = storage
        .list()
        .unwrap()
        .into_iter()
        .map(|article| article.title)
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"第一則".to_string()));
    assert!(titles.contains(&"第二則".to_string()));

    let runs = storage.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].config_hash, "test-hash");
    assert_eq!(runs[0].stats, stats);
}

#[tokio::test]
async fn test_repeated_cycles_do_not_duplicate_articles() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let coordinator = coordinator(&server);
    coordinator.run_cycle().await.unwrap();
    let second = coordinator.run_cycle().await.unwrap();

    assert_eq!(second.stored, 2);

    let storage = coordinator.storage();
    let storage = storage.lock().unwrap();
    assert_eq!(storage.count().unwrap(), 2);
    assert_eq!(storage.recent_runs(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_listing_page_keeps_earlier_links() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        INDEX_PATH,
        listing(&["/news/story/2/1"], Some("/news/breaknews/1/99/2")),
    )
    .await;
    mount_status(&server, "/news/breaknews/1/99/2", 500).await;
    mount_html(
        &server,
        "/news/story/2/1",
        article_page("僅存一則", &fresh_date(), "<p>一</p>"),
    )
    .await;

    let coordinator = coordinator(&server);
    let stats = coordinator.run_cycle().await.unwrap();

    assert_eq!(stats.discovered, 1);
    assert_eq!(stats.stored, 1);
}

#[tokio::test]
async fn test_unreachable_index_yields_empty_cycle() {
    let server = MockServer::start().await;
    mount_status(&server, INDEX_PATH, 503).await;

    let coordinator = coordinator(&server);
    let stats = coordinator.run_cycle().await.unwrap();

    assert_eq!(stats, CrawlStats::default());
}

#[tokio::test]
async fn test_cancelled_run_returns_after_one_cycle() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let config = create_test_config(&server.uri(), ":memory:");
    let cancel = CancellationToken::new();
    cancel.cancel();
    let coordinator = Coordinator::with_storage(
        config,
        "test-hash".to_string(),
        SqliteStorage::open_in_memory().unwrap(),
        cancel,
    )
    .unwrap();

    // Looping mode still stops because the token has fired
    let stats = coordinator.run(false).await.unwrap();
    assert_eq!(stats.stored, 0);

    let storage = coordinator.storage();
    let storage = storage.lock().unwrap();
    let runs = storage.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Interrupted);
}

#[tokio::test]
async fn test_pagination_stops_at_max_index_pages() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        INDEX_PATH,
        listing(&["/news/story/3/1"], Some("/news/breaknews/1/99/2")),
    )
    .await;
    mount_html(
        &server,
        "/news/breaknews/1/99/2",
        listing(&["/news/story/3/2"], Some("/news/breaknews/1/99/3")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/news/breaknews/1/99/3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing(&["/news/story/3/3"], None)),
        )
        .expect(0)
        .mount(&server)
        .await;
    for id in 1..=3 {
        mount_html(
            &server,
            &format!("/news/story/3/{}", id),
            article_page(&format!("分頁{}", id), &fresh_date(), "<p>內文</p>"),
        )
        .await;
    }

    let mut config = create_test_config(&server.uri(), ":memory:");
    config.crawler.max_index_pages = 2;
    let stats = coordinator_with(config).run_cycle().await.unwrap();

    assert_eq!(stats.discovered, 2);
    assert_eq!(stats.stored, 2);
}

#[tokio::test]
async fn test_links_shared_by_index_urls_are_counted_once() {
    let server = MockServer::start().await;
    let second_index = "/news/cate/2/6638";
    mount_html(
        &server,
        INDEX_PATH,
        listing(&["/news/story/4/1", "/news/story/4/2"], None),
    )
    .await;
    mount_html(
        &server,
        second_index,
        listing(&["/news/story/4/2?from=cate", "/news/story/4/3"], None),
    )
    .await;
    for id in 1..=3 {
        mount_html(
            &server,
            &format!("/news/story/4/{}", id),
            article_page(&format!("共用{}", id), &fresh_date(), "<p>內文</p>"),
        )
        .await;
    }

    let mut config = create_test_config(&server.uri(), ":memory:");
    config
        .discovery
        .index_urls
        .push(format!("{}{}", server.uri(), second_index));
    let coordinator = coordinator_with(config);
    let stats = coordinator.run_cycle().await.unwrap();

    assert_eq!(stats.discovered, 3);
    assert_eq!(stats.stored, 3);

    let storage = coordinator.storage();
    let storage = storage.lock().unwrap();
    assert_eq!(storage.count().unwrap(), 3);
}
