use std::net::SocketAddr;

use ideaboard::services::ideas::IdeaForm;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::common::TestApp;

async fn setup_server(app: &TestApp) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    let handle = tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    (addr, handle)
}

/// Send one raw HTTP/1.1 request and return the status line and body.
async fn raw_request(addr: SocketAddr, request: &str) -> (String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let status = response.lines().next().unwrap_or_default().to_string();
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

#[tokio::test]
async fn likes_are_keyed_by_peer_address_without_proxy() {
    let app = TestApp::without_proxy().await;
    let idea = app
        .state
        .ideas
        .create(&IdeaForm {
            title: Some("T".into()),
            content: Some("C".into()),
            ..IdeaForm::default()
        })
        .await
        .unwrap();
    let (addr, handle) = setup_server(&app).await;

    let (status, body) = raw_request(
        addr,
        &format!(
            "POST /api/ideas/{}/like HTTP/1.1\r\nHost: localhost\r\nX-Forwarded-For: 203.0.113.9\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            idea.id
        ),
    )
    .await;
    assert!(status.contains("200"), "{status}");
    assert!(body.contains("\"liked\":true"), "{body}");

    // The forwarded header was ignored, so the socket address owns the like.
    let (_, body) = raw_request(
        addr,
        &format!(
            "GET /api/ideas/{}/like-status HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            idea.id
        ),
    )
    .await;
    assert!(body.contains("\"liked\":true"), "{body}");

    handle.abort();
}
