//! Editor client against a running server

use std::net::SocketAddr;

use reqwest::Url;
use serde_json::{json, Value};
use tempfile::TempDir;

use revista_flipbook::editor::{EditorClient, EditorError};
use revista_flipbook::{routes, AppState, ServerConfig};

const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

async fn serve(config: ServerConfig) -> SocketAddr {
    let app = routes::app(AppState::new(config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> EditorClient {
    EditorClient::new(Url::parse(&format!("http://{}/", addr)).unwrap())
}

fn seed_config(root: &TempDir) {
    std::fs::write(
        root.path().join("revista.config.json"),
        json!({
            "page": {"title": "Revista"},
            "brand": {"text": "Unimo", "logo_url": "", "logo_height": 40},
            "pdf": {"url": "./documento.pdf", "allow_query_override": false},
            "texts": {"loading": "Cargando Revista", "openPdf": "Abrir PDF"}
        })
        .to_string(),
    )
    .unwrap();
}

fn read_saved(root: &TempDir) -> Value {
    let raw = std::fs::read_to_string(root.path().join("revista.config.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_load_edit_upload_save() {
    let root = TempDir::new().unwrap();
    seed_config(&root);
    let addr = serve(ServerConfig::with_root(root.path())).await;
    let client = client(addr);

    let mut session = client.load().await.unwrap();
    assert!(session.field("texts.openPdf").is_none());

    session.set_field("brand.text", json!("Unimo Revista")).unwrap();
    session.set_field("brand.logo_height", json!("56")).unwrap();
    session.set_texts_locked(false);
    session.set_field("texts.loading", json!("Un momento...")).unwrap();

    let url = client
        .upload_logo(&mut session, "logo.png", PNG_BYTES.to_vec(), "image/png")
        .await
        .unwrap();
    assert!(url.starts_with(&format!("http://{}/uploads/", addr)));
    assert_eq!(session.preview().logo_url, url);

    // The uploaded file is served back
    let fetched = reqwest::get(&url).await.unwrap();
    assert!(fetched.status().is_success());
    assert_eq!(fetched.bytes().await.unwrap().as_ref(), PNG_BYTES);

    let file = client.save(&session).await.unwrap();
    assert_eq!(file, "revista.config.json");

    let saved = read_saved(&root);
    assert_eq!(saved["brand"]["text"], "Unimo Revista");
    assert_eq!(saved["brand"]["logo_height"], 56);
    assert_eq!(saved["brand"]["logo_url"], url.as_str());
    assert_eq!(saved["texts"]["loading"], "Un momento...");
    assert!(saved["texts"].get("openPdf").is_none());
}

#[tokio::test]
async fn test_upload_pdf_sets_document_url() {
    let root = TempDir::new().unwrap();
    seed_config(&root);
    let addr = serve(ServerConfig::with_root(root.path())).await;
    let client = client(addr);

    let mut session = client.load().await.unwrap();
    let url = client
        .upload_pdf(&mut session, "nueva.pdf", b"%PDF-1.7\n".to_vec(), "application/pdf")
        .await
        .unwrap();
    assert!(url.ends_with(".pdf"));
    assert_eq!(session.field("pdf.url"), Some(&json!(url)));
}

#[tokio::test]
async fn test_wrong_file_kinds_rejected_before_upload() {
    let root = TempDir::new().unwrap();
    seed_config(&root);
    let addr = serve(ServerConfig::with_root(root.path())).await;
    let client = client(addr);
    let mut session = client.load().await.unwrap();

    let err = client
        .upload_logo(&mut session, "doc.pdf", b"%PDF-1.7".to_vec(), "application/pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::InvalidLogoFile));

    let err = client
        .upload_pdf(&mut session, "logo.png", PNG_BYTES.to_vec(), "image/png")
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::InvalidPdfFile));
    assert!(!root.path().join("uploads").exists());
}

#[tokio::test]
async fn test_server_rejection_surfaces_as_http_error() {
    let root = TempDir::new().unwrap();
    let addr = serve(ServerConfig::with_root(root.path())).await;

    let err = client(addr)
        .upload("notes.png", b"plain text".to_vec(), "image/png")
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Http(400)));
}

#[tokio::test]
async fn test_load_fails_without_config() {
    let root = TempDir::new().unwrap();
    let addr = serve(ServerConfig::with_root(root.path())).await;

    let err = client(addr).load().await.unwrap_err();
    assert!(matches!(err, EditorError::Http(404)));
}

#[tokio::test]
async fn test_save_with_api_key() {
    let root = TempDir::new().unwrap();
    seed_config(&root);
    let mut config = ServerConfig::with_root(root.path());
    config.site.save_api_key = Some("secreto".to_string());
    let addr = serve(config).await;

    let session = client(addr).load().await.unwrap();

    let err = client(addr).save(&session).await.unwrap_err();
    match err {
        EditorError::Server(message) => assert_eq!(message, "API key inválida"),
        other => panic!("unexpected error: {:?}", other),
    }

    let file = client(addr)
        .with_api_key("secreto")
        .save(&session)
        .await
        .unwrap();
    assert_eq!(file, "revista.config.json");
}
