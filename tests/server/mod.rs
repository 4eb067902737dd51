#![allow(dead_code)]

use actix_web::dev::Server;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;

pub const SITE_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Handmade Oak Furniture for Modern Homes | Oakwood</title>
    <meta name="description" content="Handmade oak tables, chairs and shelves built to last for generations. Free delivery and a ten year warranty on every piece.">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="index, follow">
    <link rel="canonical" href="/">
    <meta property="og:title" content="Oakwood Furniture">
    <meta property="og:type" content="website">
    <meta name="twitter:card" content="summary_large_image">
    <style>body { font-family: serif; }</style>
    <script type="application/ld+json">{"@context": "https://schema.org", "@type": "Organization", "name": "Oakwood", "foundingDate": 1998}</script>
    <script type="application/ld+json">{not valid json</script>
    <script type="application/ld+json">[{"@type": "BreadcrumbList"}, {"@type": ["Product", "Offer"], "name": "Oak table"}]</script>
</head>
<body>
    <h1>Handmade oak furniture</h1>
    <p>Every oak table is built by hand in our workshop. Oak ages beautifully.</p>
    <script>var hidden = "scripttext";</script>
    <noscript>Enable noscripttext please</noscript>
    <h2>Oak tables</h2>
    <h3>{{ product.name }}</h3>
    <h4>Dining tables</h4>
    <p>Solid oak dining tables for families.</p>
    <a href="/about">About us</a>
    <a href="/contact" rel="nofollow" title="Contact">Contact</a>
    <a href="https://external.example.org/review">Independent review</a>
    <a href="#top">Back to top</a>
    <a href="mailto:shop@oakwood.example">Mail</a>
    <a href="javascript:void(0)">Script</a>
    <img src="/img/table.jpg" alt="Oak dining table" width="800" height="600">
    <img data-src="/img/chair.jpg" alt="">
    <img src="/img/shelf.jpg" alt="photo" loading="lazy">
</body>
</html>"##;

pub const SEARCH_RESULTS: &str = r#"<html><body>
<div class="result">
  <h2 class="result__title"><a href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.competitor-one.com%2Foak&amp;rut=abc">Competitor One</a></h2>
  <a class="result__snippet">Oak furniture made to order</a>
</div>
<div class="result">
  <h2 class="result__title"><a href="https://competitor-two.net/tables">Competitor Two</a></h2>
  <a class="result__snippet">Tables and chairs</a>
</div>
<div class="result">
  <h2 class="result__title"><a href="/relative/link">Relative link</a></h2>
</div>
<div class="result">
  <h2 class="result__title"><a href="https://oakwood.example/">Oakwood</a></h2>
  <a class="result__snippet">The target itself</a>
</div>
</body></html>"#;

fn spawn(addrs: Vec<SocketAddr>, server: Server) -> String {
    let addr = addrs.first().cloned().expect("No address bound");

    tokio::spawn(async move {
        if let Err(e) = server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    format!("http://{}", addr)
}

fn html(body: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// A small site: the page, robots.txt, sitemap.xml, a redirect and a few failures.
pub async fn start_site_server(with_site_files: bool) -> String {
    let http_server = HttpServer::new(move || {
        let app = App::new()
            .route("/", web::get().to(|| async { html(SITE_PAGE) }))
            .route(
                "/moved",
                web::get().to(|| async {
                    HttpResponse::MovedPermanently()
                        .append_header(("Location", "/"))
                        .finish()
                }),
            )
            .route(
                "/plain",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/plain")
                        .body("Just some plain text words")
                }),
            )
            .route(
                "/gone",
                web::get().to(|| async { HttpResponse::NotFound().body("<h1>Not found</h1>") }),
            );

        if with_site_files {
            app.route(
                "/robots.txt",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/plain")
                        .body("User-agent: *\nDisallow: /admin\nSitemap: /sitemap.xml\n")
                }),
            )
            .route(
                "/sitemap.xml",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("application/xml")
                        .body("<urlset><url><loc>/</loc></url></urlset>")
                }),
            )
        } else {
            app
        }
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind site server");

    spawn(http_server.addrs(), http_server.run())
}

async fn search_page(query: web::Query<HashMap<String, String>>) -> HttpResponse {
    match query.get("q").map(String::as_str) {
        Some(q) if q.contains("blocked") => HttpResponse::ServiceUnavailable().body("rate limited"),
        Some("nothing") => html("<html><body><p>No results.</p></body></html>"),
        Some(_) => html(SEARCH_RESULTS),
        None => HttpResponse::BadRequest().finish(),
    }
}

async fn ollama(body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "model": body["model"],
        "response": format!("ollama:{}", body["model"].as_str().unwrap_or_default()),
        "done": true
    }))
}

async fn ollama_blank() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "response": "   ", "done": true }))
}

async fn ollama_broken() -> HttpResponse {
    HttpResponse::InternalServerError().body("model not loaded")
}

async fn openai(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    let authorized = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer test-key");
    if !authorized {
        return HttpResponse::Unauthorized().json(json!({ "error": "invalid api key" }));
    }

    HttpResponse::Ok().json(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": format!("openai:{}", body["messages"][0]["content"].as_str().unwrap_or_default())
            }
        }]
    }))
}

async fn anthropic(req: HttpRequest) -> HttpResponse {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    if header("x-api-key").as_deref() != Some("test-key")
        || header("anthropic-version").as_deref() != Some("2023-06-01")
    {
        return HttpResponse::Unauthorized().finish();
    }

    HttpResponse::Ok().json(json!({
        "content": [
            { "type": "text", "text": "Hello " },
            { "type": "tool_use", "id": "t1", "name": "noop", "input": {} },
            { "type": "text", "text": "world" }
        ]
    }))
}

/// Fake search engine and language-model backends.
///
/// Search: `/html/`. Ollama: `/api/generate`, `/blank/api/generate`,
/// `/broken/api/generate`. OpenAI: `/v1/chat/completions`. Anthropic: `/v1/messages`.
pub async fn start_service_server() -> String {
    let http_server = HttpServer::new(|| {
        App::new()
            .route("/html/", web::get().to(search_page))
            .route("/api/generate", web::post().to(ollama))
            .route("/blank/api/generate", web::post().to(ollama_blank))
            .route("/broken/api/generate", web::post().to(ollama_broken))
            .route("/v1/chat/completions", web::post().to(openai))
            .route("/v1/messages", web::post().to(anthropic))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind service server");

    spawn(http_server.addrs(), http_server.run())
}
