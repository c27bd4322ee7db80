//! Fixtures shared by the integration tests

use image::{ImageFormat, Rgba, RgbaImage};
use kakurizer::config::{EnrichmentConfig, HttpConfig, IndexConfig, UserAgentConfig};
use kakurizer::crawler::{HttpFetcher, IndexCrawler};
use kakurizer::enrich::EnrichmentWorker;
use kakurizer::markup::{CompiledContract, MarkupContract};
use std::io::Cursor;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const INDEX_PATH: &str = "/crosswords/series/kakuro";

pub fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

pub fn fetcher() -> HttpFetcher {
    let http = HttpConfig {
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
    };
    HttpFetcher::new(&user_agent(), &http).expect("Failed to build HTTP client")
}

pub fn contract() -> Arc<CompiledContract> {
    Arc::new(CompiledContract::compile(&MarkupContract::default()).expect("Default contract"))
}

pub fn index_config(server: &MockServer) -> IndexConfig {
    IndexConfig {
        base_url: format!("{}{}?page=", server.uri(), INDEX_PATH),
        max_pages: None,
        skip_malformed_listings: false,
    }
}

pub fn crawler(server: &MockServer) -> IndexCrawler<HttpFetcher> {
    IndexCrawler::new(fetcher(), &index_config(server), contract())
}

pub fn worker(max_concurrent: usize) -> EnrichmentWorker<HttpFetcher> {
    let config = EnrichmentConfig {
        max_concurrent_enrichments: max_concurrent,
    };
    EnrichmentWorker::new(fetcher(), &config, contract())
}

pub fn detail_path(id: i64) -> String {
    format!("/lifeandstyle/kakuro-{}-hard", id)
}

pub fn image_path(id: i64) -> String {
    format!("/img/media/kakuro-{}/master.png", id)
}

/// One listing as the index renders it
pub fn listing(server: &MockServer, id: i64) -> String {
    format!(
        r#"<section id="kakuro-{id}" class="fc-container">
             <div class="fc-item__container">
               <h1 class="fc-item__title"><span>Kakuro {pretty} hard</span></h1>
               <time class="fc-item__timestamp" datetime="2017-12-22" data-timestamp="{ts}">22 Dec</time>
               <a class="fc-item__link" href="{base}{detail}" data-link-name="article"></a>
             </div>
           </section>"#,
        id = id,
        pretty = with_thousands(id),
        ts = 1_513_900_898_000i64 - id,
        base = server.uri(),
        detail = detail_path(id),
    )
}

fn with_thousands(id: i64) -> String {
    if id >= 1000 {
        format!("{},{:03}", id / 1000, id % 1000)
    } else {
        id.to_string()
    }
}

pub fn index_page(server: &MockServer, ids: &[i64]) -> String {
    let listings: String = ids.iter().map(|&id| listing(server, id)).collect();
    format!(
        r#"<html><head><title>Kakuro</title></head><body>
             <section class="fc-container--rolled-up-hide"><h2>Most viewed</h2></section>
             {}
           </body></html>"#,
        listings
    )
}

pub fn detail_page(image_src: &str) -> String {
    format!(
        r#"<html><body><figure class="element-image"><picture>
             <source media="(min-width: 660px)" sizes="300px" srcset="{src}?width=300&amp;quality=85 300w">
             <source media="(min-width: 480px)" sizes="600px" srcset="{src}?width=600&amp;quality=85 600w">
             <source sizes="400px" srcset="{src}?width=400&amp;quality=85 400w">
             <img class="gu-image" src="{src}?width=300" alt="Kakuro">
           </picture></figure></body></html>"#,
        src = image_src
    )
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer
}

/// Serves one index page, expecting it to be requested `times` times
pub async fn mount_index_page(server: &MockServer, page: u32, html: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Serves a detail page and its 36x36 image for puzzle `id`
pub async fn mount_puzzle(server: &MockServer, id: i64) {
    Mock::given(method("GET"))
        .and(path(detail_path(id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page(&format!("{}{}", server.uri(), image_path(id))))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(image_path(id)))
        .and(query_param("width", "600"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(png(36, 36))
                .insert_header("content-type", "image/png"),
        )
        .mount(server)
        .await;
}
