//! HTTP surface tests, driven through axum-test.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use docreader::server::router;
use docreader::{ConversionHandler, OutcomeReport, OutcomeStatus, ReaderConfig};

fn server_with(config: ReaderConfig) -> TestServer {
    TestServer::new(router(ConversionHandler::from_config(config))).unwrap()
}

fn server() -> TestServer {
    server_with(ReaderConfig::default())
}

fn file_part(name: &str, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes).file_name(name)
}

#[tokio::test]
async fn index_page_has_upload_form() {
    let response = server().get("/").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains(r#"name="files""#));
    assert!(body.contains(".docx,.xlsx,.pptx,.pdf,.html"));
    assert!(body.contains(r#"name="compare""#));
}

#[tokio::test]
async fn health_reports_ok() {
    let response = server().get("/health").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn results_page_shows_success_and_failure_in_order() {
    let response = server()
        .post("/convert")
        .multipart(
            MultipartForm::new()
                .add_part("files", file_part("budget.xlsx", common::xlsx_budget()))
                .add_part("files", file_part("deck.pptx", common::corrupt_office_bytes()))
                .add_text("compare", "on"),
        )
        .await;

    response.assert_status_ok();
    let body = response.text();
    let ok = body.find("Converted <strong>budget.xlsx</strong>").unwrap();
    let err = body.find("Could not read deck.pptx").unwrap();
    assert!(ok < err);

    assert!(body.contains("Original File"));
    assert!(body.contains("Converted Markdown"));
    assert!(body.contains("Converted Plain Text"));
    assert!(body.contains("smaller than the original file"));
    assert!(body.contains("budget_converted.md"));
    assert!(body.contains("budget_converted.txt"));
    assert!(!body.contains("deck_converted.md"));
}

#[tokio::test]
async fn comparison_is_omitted_without_the_checkbox() {
    let response = server()
        .post("/convert")
        .multipart(
            MultipartForm::new()
                .add_part("files", file_part("page.html", common::html_page("<p>hi</p>"))),
        )
        .await;
    response.assert_status_ok();
    assert!(!response.text().contains("Converted Plain Text"));
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let response = server()
        .post("/convert")
        .multipart(MultipartForm::new().add_text("compare", "on"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_returns_json_outcomes() {
    let response = server()
        .post("/api/convert")
        .multipart(
            MultipartForm::new()
                .add_part("files", file_part("report.docx", common::docx_with_heading_and_table()))
                .add_part("files", file_part("empty.pdf", Vec::new())),
        )
        .await;

    response.assert_status_ok();
    let reports: Vec<OutcomeReport> = response.json();
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0].file_name, "report.docx");
    assert_eq!(reports[0].status, OutcomeStatus::Converted);
    let text = reports[0].text_content.as_deref().unwrap();
    assert!(text.contains("# Quarterly Report"));
    assert_eq!(reports[0].converted_size_bytes, Some(text.len() as u64));
    assert_eq!(reports[0].downloads.len(), 2);
    assert_eq!(reports[0].downloads[0].mime, "text/markdown");

    assert_eq!(reports[1].status, OutcomeStatus::Failed);
    assert!(reports[1].error.as_deref().unwrap().contains("empty.pdf"));
    assert!(reports[1].downloads.is_empty());
}

#[tokio::test]
async fn download_returns_attachment_byte_for_byte() {
    let text = "\n# Title\r\n\r\nBody\r\n";
    let response = server()
        .post("/download")
        .form(&[
            ("file_name", "report.v2.docx"),
            ("format", "md"),
            ("content", URL_SAFE.encode(text).as_str()),
        ])
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type"),
        "text/markdown; charset=utf-8"
    );
    let disposition = response.header("content-disposition");
    assert!(disposition
        .to_str()
        .unwrap()
        .contains("filename=\"report.v2_converted.md\""));
    assert_eq!(response.as_bytes().as_ref(), text.as_bytes());
}

#[tokio::test]
async fn txt_download_has_same_bytes() {
    let server = server();
    let content = URL_SAFE.encode("same text\n");
    let fetch = |format: &'static str| {
        server.post("/download").form(&[
            ("file_name", "notes.html"),
            ("format", format),
            ("content", content.as_str()),
        ])
    };

    let md = fetch("md").await;
    let txt = fetch("txt").await;
    assert_eq!(txt.header("content-type"), "text/plain; charset=utf-8");
    assert_eq!(md.as_bytes(), txt.as_bytes());
}

#[tokio::test]
async fn results_page_downloads_match_converted_text() {
    let server = server();
    let page = server
        .post("/convert")
        .multipart(
            MultipartForm::new()
                .add_part("files", file_part("budget.xlsx", common::xlsx_budget())),
        )
        .await
        .text();

    let marker = r#"name="content" value=""#;
    let start = page.find(marker).unwrap() + marker.len();
    let payload = &page[start..start + page[start..].find('"').unwrap()];

    let download = server
        .post("/download")
        .form(&[("file_name", "budget.xlsx"), ("format", "txt"), ("content", payload)])
        .await;
    download.assert_status_ok();
    assert_eq!(
        download.text(),
        "## Budget\n\n| Item | Cost |\n| --- | --- |\n| Paper | 250 |\n"
    );
}

#[tokio::test]
async fn malformed_download_content_is_rejected() {
    let response = server()
        .post("/download")
        .form(&[("file_name", "a.pdf"), ("format", "md"), ("content", "%%%")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let config = ReaderConfig::builder()
        .max_upload_bytes(1024)
        .build()
        .unwrap();
    let response = server_with(config)
        .post("/convert")
        .multipart(
            MultipartForm::new().add_part("files", file_part("big.html", vec![b'a'; 8 * 1024])),
        )
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}
