use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::ThreadId;

use async_trait::async_trait;
use certificate_mailer::error::RenderError;
use certificate_mailer::infrastructure::FontBook;
use certificate_mailer::models::{CertificateArtifact, OutputFormat};
use certificate_mailer::{
    logger, App, BatchJob, BatchProcessor, CertificateFlow, CertificateRender, CertificateRenderer, Config,
    MailTransport, NotificationDispatcher, RawRecord, SenderCredentials, TransportError,
};
use image::{Rgb, RgbImage};
use lettre::Message;
use regex::Regex;

/// 记录收件人的传输，可选在第 n 次发送后执行钩子
#[derive(Default)]
struct FakeTransport {
    recipients: Mutex<Vec<String>>,
    after_send: Option<(usize, PathBuf)>,
}

#[async_trait]
impl MailTransport for FakeTransport {
    async fn send(&self, message: Message, _credentials: &SenderCredentials) -> Result<(), TransportError> {
        let mut recipients = self.recipients.lock().unwrap();
        let to = message
            .envelope()
            .to()
            .first()
            .map(|a| a.to_string())
            .unwrap_or_default();
        recipients.push(to);

        // 模拟模板在批次中途被删除
        if let Some((n, template)) = &self.after_send {
            if recipients.len() == *n {
                std::fs::remove_file(template).unwrap();
            }
        }
        Ok(())
    }
}

/// 第 k 次调用失败的渲染器
struct FlakyRenderer {
    inner: CertificateRenderer,
    fail_on: usize,
    calls: AtomicUsize,
}

impl CertificateRender for FlakyRenderer {
    fn render(&self, name: &str, event_name: &str, date: &str, base_url: &str) -> Result<CertificateArtifact, RenderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(RenderError::RenderIo {
                path: PathBuf::from("simulated"),
                detail: "disk full".to_string(),
            });
        }
        self.inner.render(name, event_name, date, base_url)
    }
}

/// 记录渲染所在线程；遇到指定姓名时 panic
struct ThreadRecordingRenderer {
    inner: CertificateRenderer,
    threads: Mutex<Vec<ThreadId>>,
    panic_on: Option<&'static str>,
}

impl CertificateRender for ThreadRecordingRenderer {
    fn render(&self, name: &str, event_name: &str, date: &str, base_url: &str) -> Result<CertificateArtifact, RenderError> {
        self.threads.lock().unwrap().push(std::thread::current().id());
        if self.panic_on == Some(name) {
            panic!("renderer crashed on {name}");
        }
        self.inner.render(name, event_name, date, base_url)
    }
}

fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("template.png");
    RgbImage::from_pixel(800, 600, Rgb([255, 255, 255])).save(&path).unwrap();
    path
}

fn renderer(dir: &Path) -> CertificateRenderer {
    CertificateRenderer::new(write_template(dir), dir.join("certificates"), FontBook::builtin())
}

fn job() -> BatchJob {
    BatchJob::new("Hackathon 2025", "Oct 3, 2025", "http://127.0.0.1:5000/")
}

fn creds() -> Option<SenderCredentials> {
    Some(SenderCredentials::new("certs@example.com", "app-password"))
}

fn records(names: &[&str]) -> Vec<RawRecord> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
            RawRecord::from_pair(i as u64 + 2, name, &email)
        })
        .collect()
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    logger::init(false);
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = NotificationDispatcher::new(FakeTransport::default(), creds());
    let processor = BatchProcessor::new(CertificateFlow::new(renderer(dir.path()), dispatcher));
    let input = vec![
        RawRecord::from_pair(2, "Ada Lovelace", "ada@example.com"),
        RawRecord::from_pair(3, "Bob!!", "bob@example.com"),
    ];

    let rows = processor.process_batch(&input, &job(), None).await;

    assert_eq!(rows.len(), 2);
    let ada = Regex::new(r"^Ada_Lovelace_[0-9a-f]{8}\.pdf$").unwrap();
    let bob = Regex::new(r"^Bob___[0-9a-f]{8}\.pdf$").unwrap();
    assert!(ada.is_match(rows[0].cert_filename.as_deref().unwrap()));
    assert!(bob.is_match(rows[1].cert_filename.as_deref().unwrap()));
    for row in &rows {
        assert_eq!(row.cert_status, "Generated");
        assert!(row.email_status == "Sent" || row.email_status.starts_with("Failed:"));
        let path = dir.path().join("certificates").join(row.cert_filename.as_deref().unwrap());
        assert!(path.exists());
    }
    assert_eq!(rows[0].email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn test_render_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let flaky = FlakyRenderer {
        inner: renderer(dir.path()),
        fail_on: 3,
        calls: AtomicUsize::new(0),
    };
    let dispatcher = NotificationDispatcher::new(FakeTransport::default(), creds());
    let processor = BatchProcessor::new(CertificateFlow::new(flaky, dispatcher));
    let input = records(&["Ada", "Bob", "Cy", "Dee", "Eve"]);

    let rows = processor.process_batch(&input, &job(), None).await;

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[2].email_status, "Skipped");
    assert_eq!(rows[2].cert_filename, None);
    assert!(rows[2].cert_status.starts_with("Certificate error:"));
    for i in [0, 1, 3, 4] {
        assert_eq!(rows[i].cert_status, "Generated");
        assert_eq!(rows[i].email_status, "Sent");
    }
    let sent = processor.flow().dispatcher().transport().recipients.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec!["ada@example.com", "bob@example.com", "dee@example.com", "eve@example.com"]
    );
}

#[tokio::test]
async fn test_template_removed_mid_batch() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = renderer(dir.path());
    let transport = FakeTransport {
        after_send: Some((2, dir.path().join("template.png"))),
        ..Default::default()
    };
    let dispatcher = NotificationDispatcher::new(transport, creds());
    let processor = BatchProcessor::new(CertificateFlow::new(renderer, dispatcher));
    let input = records(&["Ada", "Bob", "Cy", "Dee"]);

    let rows = processor.process_batch(&input, &job(), None).await;

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1].email_status, "Sent");
    for row in &rows[2..] {
        assert!(row.cert_status.starts_with("Certificate error: Template not found"));
        assert_eq!(row.email_status, "Skipped");
    }
}

#[tokio::test]
async fn test_rows_follow_input_order_with_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = NotificationDispatcher::new(FakeTransport::default(), creds());
    let processor = BatchProcessor::new(CertificateFlow::new(renderer(dir.path()), dispatcher));
    let mut input = records(&["Ada", "Bob", "Cy"]);
    input.insert(
        1,
        RawRecord {
            line: 9,
            name: Some(b"Broken".to_vec()),
            email: None,
        },
    );

    let rows = processor.process_batch(&input, &job(), None).await;

    assert_eq!(rows.len(), 4);
    let names: Vec<_> = rows.iter().map(|r| r.name.as_deref()).collect();
    assert_eq!(names, vec![Some("Ada"), None, Some("Bob"), Some("Cy")]);
    assert!(rows[1].cert_status.starts_with("Row read error:"));
    assert_eq!(rows[1].email_status, "Skipped");
}

#[tokio::test]
async fn test_missing_credentials_never_reach_transport() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = NotificationDispatcher::new(FakeTransport::default(), None);
    let processor = BatchProcessor::new(CertificateFlow::new(renderer(dir.path()), dispatcher));

    let rows = processor.process_batch(&records(&["Ada"]), &job(), None).await;

    assert!(rows[0].email_status.starts_with("Failed: missing SMTP credentials"));
    assert_eq!(rows[0].cert_status, "Generated");
    assert!(processor.flow().dispatcher().transport().recipients.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_render_runs_on_blocking_pool() {
    let dir = tempfile::tempdir().unwrap();
    let recording = ThreadRecordingRenderer {
        inner: renderer(dir.path()),
        threads: Mutex::new(Vec::new()),
        panic_on: None,
    };
    let dispatcher = NotificationDispatcher::new(FakeTransport::default(), creds());
    let processor = BatchProcessor::new(CertificateFlow::new(recording, dispatcher));

    let rows = processor.process_batch(&records(&["Ada", "Bob"]), &job(), None).await;

    assert!(rows.iter().all(|row| row.cert_status == "Generated"));
    let here = std::thread::current().id();
    let threads = processor.flow().renderer().threads.lock().unwrap().clone();
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|id| *id != here));
}

#[tokio::test]
async fn test_renderer_panic_only_fails_its_record() {
    let dir = tempfile::tempdir().unwrap();
    let crashing = ThreadRecordingRenderer {
        inner: renderer(dir.path()),
        threads: Mutex::new(Vec::new()),
        panic_on: Some("Bob"),
    };
    let dispatcher = NotificationDispatcher::new(FakeTransport::default(), creds());
    let processor = BatchProcessor::new(CertificateFlow::new(crashing, dispatcher));

    let rows = processor.process_batch(&records(&["Ada", "Bob", "Cy"]), &job(), None).await;

    assert_eq!(rows.len(), 3);
    assert!(rows[1].cert_status.starts_with("Certificate error: render task aborted"));
    assert_eq!(rows[1].email_status, "Skipped");
    assert_eq!(rows[0].email_status, "Sent");
    assert_eq!(rows[2].email_status, "Sent");
}

fn app_config(dir: &Path, csv: &str) -> Config {
    let input = dir.join("participants.csv");
    std::fs::write(&input, csv).unwrap();
    Config {
        input_file: input.to_string_lossy().into_owned(),
        template_path: write_template(dir).to_string_lossy().into_owned(),
        output_dir: dir.join("certificates").to_string_lossy().into_owned(),
        output_format: OutputFormat::Png,
        report_file: dir.join("report.json").to_string_lossy().into_owned(),
        preferred_font: None,
        secondary_font: None,
        sender: None,
        batch_sender: None,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_app_run_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = app_config(dir.path(), "Name,Email,Team\nAda Lovelace,ada@example.com,red\nBob!!,bob@example.com,blue\n");

    let app = App::initialize(config).unwrap();
    let summary = app.run().await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.generated, 2);
    assert_eq!(summary.failed, 2);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report["rows"][0]["name"], "Ada Lovelace");
    assert_eq!(report["rows"][1]["name"], "Bob!!");
    let png = Regex::new(r"^Ada_Lovelace_[0-9a-f]{8}\.png$").unwrap();
    assert!(png.is_match(report["rows"][0]["certFilename"].as_str().unwrap()));
}

#[tokio::test]
async fn test_app_aborts_on_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let config = app_config(dir.path(), "Name,Phone\nAda,123\n");

    let app = App::initialize(config).unwrap();
    let err = app.run().await.unwrap_err();

    assert!(err.to_string().contains("CSV must contain the columns"));
    assert!(!dir.path().join("report.json").exists());
}

#[tokio::test]
async fn test_report_failure_keeps_batch_summary() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = app_config(dir.path(), "Name,Email\nAda,ada@example.com\nBob,bob@example.com\n");
    config.report_file = dir.path().join("missing").join("report.json").to_string_lossy().into_owned();

    let app = App::initialize(config).unwrap();
    let err = app.run().await.unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("证书 2/2"), "{}", message);
    assert!(message.contains("邮件 0/2"), "{}", message);
    assert_eq!(std::fs::read_dir(dir.path().join("certificates")).unwrap().count(), 2);
}
