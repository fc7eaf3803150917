use std::sync::OnceLock;

use sample_app::{api::routes::create_router, config::Config, logging, AppState};
use tokio::net::TcpListener;

static TRACING: OnceLock<()> = OnceLock::new();

pub fn init_test_tracing() {
    TRACING.get_or_init(|| logging::init_logging(logging::LogFormat::Text, "debug"));
}

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn spawn_app(config: Config) -> String {
    init_test_tracing();

    let app = create_router(AppState::new(config).expect("state should build"));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    format!("http://{}", addr)
}

/// A URL on localhost with nothing listening behind it.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/wiki/Nowhere", addr)
}

pub fn article(fifth_child: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Sample</title></head><body>
<div id="mw-content-text"><div class="mw-parser-output"><div class="hatnote">note</div><table class="infobox"><tr><td>box</td></tr></table><p>first</p><p>second</p>{}<p>after</p></div></div>
</body></html>"#,
        fifth_child
    )
}
