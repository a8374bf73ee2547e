//! Integration tests for single-article assembly against a mock site

use crate::common::*;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use udn_harvest::article::{article_id, Assembler, Exclusion};
use udn_harvest::config::Config;
use udn_harvest::crawler::Fetcher;
use udn_harvest::{Assembly, FetchError, HarvestError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn assembler_for(config: Config) -> Assembler {
    assembler_with_token(config, CancellationToken::new())
}

fn assembler_with_token(config: Config, cancel: CancellationToken) -> Assembler {
    let fetcher = Fetcher::from_config(&config, cancel).unwrap();
    Assembler::new(Arc::new(config), fetcher).unwrap()
}

async fn assemble(
    server: &MockServer,
    config: Config,
    route: &str,
) -> Result<Assembly, HarvestError> {
    assembler_for(config)
        .assemble(&format!("{}{}", server.uri(), route))
        .await
}

#[tokio::test]
async fn test_fresh_article_is_assembled() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/100";
    mount_html(
        &server,
        route,
        article_page(
            "颱風逼近 北部豪雨特報 | 生活 | 聯合新聞網",
            &fresh_date(),
            "<p>第一段</p><p>第二段</p>",
        ),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let url = format!("{}{}", server.uri(), route);
    let assembly = assemble(&server, config, route).await.unwrap();

    let article = assembly.article().expect("article should be done");
    assert_eq!(article.id, article_id(&url));
    assert_eq!(article.id.len(), 64);
    assert_eq!(article.title, "颱風逼近 北部豪雨特報");
    assert_eq!(article.website_domain, "udn.com");
    assert_eq!(article.source_url, url);
    assert!(article.content.starts_with("# 颱風逼近 北部豪雨特報\n\nLastUpdate: "));
    assert!(article.content.contains("第一段  \n第二段  \n"));
    assert!(article.content.ends_with(&format!("原地址：[{0}]({0})", url)));
}

#[tokio::test]
async fn test_ignored_category_is_rejected_without_time() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/101";
    mount_html(
        &server,
        route,
        article_page("Foo | 股市", &fresh_date(), "<p>行情</p>"),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let assembly = assemble(&server, config, route).await.unwrap();

    let rejection = assembly.rejection().expect("article should be rejected");
    assert_eq!(rejection.reason, Exclusion::IgnoreCate);
    assert_eq!(rejection.update_time, None);
    assert!(rejection.url.ends_with(route));
}

#[tokio::test]
async fn test_stale_article_is_rejected_with_time() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/102";
    mount_html(
        &server,
        route,
        article_page("舊聞", "2021-11-01T08:00:00+08:00", "<p>舊</p>"),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let assembly = assemble(&server, config, route).await.unwrap();

    let rejection = assembly.rejection().expect("article should be rejected");
    assert_eq!(rejection.reason, Exclusion::TimeOverDays);
    assert_eq!(
        rejection.update_time,
        Some(Utc.with_ymd_and_hms(2021, 11, 1, 0, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_future_article_is_kept() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/103";
    mount_html(
        &server,
        route,
        article_page("預告", "2099-01-01T00:00:00+08:00", "<p>未來</p>"),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let assembly = assemble(&server, config, route).await.unwrap();

    let article = assembly.article().expect("article should be done");
    assert!(article.content.contains("LastUpdate: 2099-01-01T00:00:00+08:00"));
}

#[tokio::test]
async fn test_redirect_to_vip_is_rejected() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/104";
    mount_html(
        &server,
        route,
        redirect_page(
            "付費文章",
            &fresh_date(),
            "https://vip.udn.com/vip/story/122047/5844909",
            "",
        ),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let assembly = assemble(&server, config, route).await.unwrap();

    let rejection = assembly.rejection().expect("article should be rejected");
    assert_eq!(rejection.reason, Exclusion::IgnoreVip);
    assert!(rejection.update_time.is_some());
}

#[tokio::test]
async fn test_paywall_marker_after_redirect_is_rejected() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/105";
    let target = format!("{}/money/story/5612/105", server.uri());
    mount_html(
        &server,
        route,
        redirect_page("會員限定", &fresh_date(), &target, "<p>訂閱看完整精彩內容</p>"),
    )
    .await;
    mount_html(
        &server,
        "/money/story/5612/105",
        article_page("會員限定", &fresh_date(), "<p>內文</p>"),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let assembly = assemble(&server, config, route).await.unwrap();

    assert_eq!(
        assembly.rejection().map(|r| r.reason),
        Some(Exclusion::IgnoreVip)
    );
}

#[tokio::test]
async fn test_redirect_body_comes_from_target() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/106";
    let target = format!("{}/news/story/7331/106-full", server.uri());
    mount_html(
        &server,
        route,
        redirect_page("轉址文章", &fresh_date(), &target, "<p>原頁內容</p>"),
    )
    .await;
    mount_html(
        &server,
        "/news/story/7331/106-full",
        article_page("轉址文章", &fresh_date(), "<p>完整內容</p>"),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let assembly = assemble(&server, config, route).await.unwrap();

    let article = assembly.article().expect("article should be done");
    assert!(article.content.contains("完整內容  \n"));
    assert!(!article.content.contains("原頁內容"));
}

#[tokio::test]
async fn test_unavailable_redirect_yields_empty_body() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/107";
    let target = format!("{}/gone", server.uri());
    mount_html(
        &server,
        route,
        redirect_page("消失的文章", &fresh_date(), &target, ""),
    )
    .await;
    mount_status(&server, "/gone", 404).await;

    let config = create_test_config(&server.uri(), ":memory:");
    let assembly = assemble(&server, config, route).await.unwrap();

    let article = assembly.article().expect("article should be done");
    assert!(article.content.contains("\n\n---\n\n\n原地址："));
}

#[tokio::test]
async fn test_missing_region_yields_empty_body() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/108";
    let page = format!(
        r#"<html><head><title>沒有內文</title>
<script type="application/ld+json">{{"datePublished": "{}"}}</script>
</head><body><div class="other"><p>不是內文</p></div></body></html>"#,
        fresh_date()
    );
    mount_html(&server, route, page).await;

    let config = create_test_config(&server.uri(), ":memory:");
    let assembly = assemble(&server, config, route).await.unwrap();

    let article = assembly.article().expect("article should be done");
    assert!(!article.content.contains("不是內文"));
    assert!(article.content.contains("\n\n---\n\n\n原地址："));
}

#[tokio::test]
async fn test_missing_title_is_an_error() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/109";
    mount_html(
        &server,
        route,
        "<html><head></head><body><p>無標題</p></body></html>".to_string(),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let result = assemble(&server, config, route).await;

    assert!(matches!(result, Err(HarvestError::MissingTitle { .. })));
}

#[tokio::test]
async fn test_server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/110";
    mount_status(&server, route, 500).await;

    let config = create_test_config(&server.uri(), ":memory:");
    let result = assemble(&server, config, route).await;

    assert!(matches!(
        result,
        Err(HarvestError::Fetch {
            source: FetchError::Status(500),
            ..
        })
    ));
}

#[tokio::test]
async fn test_slow_response_is_not_found() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/111";
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page("慢", &fresh_date(), "<p>慢</p>"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), ":memory:");
    config.site.timeout = "500ms".to_string();
    let result = assemble(&server, config, route).await;

    assert!(matches!(
        result,
        Err(HarvestError::Fetch {
            source: FetchError::NotFound,
            ..
        })
    ));
}

#[tokio::test]
async fn test_cancelled_token_stops_assembly() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/112";
    mount_html(
        &server,
        route,
        article_page("取消", &fresh_date(), "<p>取消</p>"),
    )
    .await;

    let config = create_test_config(&server.uri(), ":memory:");
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = assembler_with_token(config, cancel)
        .assemble(&format!("{}{}", server.uri(), route))
        .await;

    assert!(matches!(result, Err(HarvestError::Cancelled { .. })));
}

#[tokio::test]
async fn test_content_is_converted_to_simplified() {
    let server = MockServer::start().await;
    let route = "/news/story/7331/113";
    mount_html(
        &server,
        route,
        article_page("國際新聞", &fresh_date(), "<p>國際局勢</p>"),
    )
    .await;

    let mut config = create_test_config(&server.uri(), ":memory:");
    config.translate.target = "zh-Hans".to_string();
    let assembly = assemble(&server, config, route).await.unwrap();

    let article = assembly.article().expect("article should be done");
    assert!(article.content.contains("国际"));
    assert!(!article.content.contains("國際"));
    // Only the content is converted
    assert_eq!(article.title, "國際新聞");
}

#[tokio::test]
async fn test_malformed_header_yields_stub_article() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nBroken Header Line\r\n\r\n")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    let base = format!("http://{}", addr);
    let url = format!("{}/news/story/7331/114", base);
    let config = create_test_config(&base, ":memory:");
    let assembly = assembler_for(config).assemble(&url).await.unwrap();

    let article = assembly.article().expect("stub article should be done");
    assert_eq!(article.title, "/news/story/7331/114");
    assert_eq!(article.id, article_id(&url));
    assert!(article.content.contains("\n\n---\n\n\n原地址："));
}
