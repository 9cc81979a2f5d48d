use async_trait::async_trait;
use rust_xlsxwriter::Workbook;
use serde_json::json;
use stackprobe_client::{ClientError, FingerprintClient, Fingerprinter, NoDelay};
use stackprobe_core::{PipelineEvent, RecordingSink, TechCategory, TechnologyRecord};
use stackprobe_enricher::{EnrichError, Enricher, Table, WorkflowOptions, COLUMNS};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// What the fake client does for a given URL
#[derive(Clone)]
enum Scripted {
    Found(&'static str),
    Failed(&'static str),
    Crash,
}

/// Fingerprinter returning canned outcomes and counting calls
#[derive(Default)]
struct ScriptedClient {
    script: HashMap<String, Scripted>,
    fetched: Mutex<Vec<String>>,
    closes: AtomicUsize,
}

impl ScriptedClient {
    fn with(mut self, url: &str, outcome: Scripted) -> Self {
        self.script.insert(url.to_string(), outcome);
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("lock").clone()
    }

    fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fingerprinter for ScriptedClient {
    async fn fetch(&self, url: &str) -> stackprobe_client::Result<TechnologyRecord> {
        self.fetched.lock().expect("lock").push(url.to_string());

        match self.script.get(url).cloned() {
            Some(Scripted::Found(server)) => {
                let mut record = TechnologyRecord::new(url);
                record.lookup_link = Some(format!("https://whatcms.org/?s={url}"));
                record.push(TechCategory::WebServer, server);
                record.status_note = "200 - Success".to_string();
                Ok(record)
            }
            Some(Scripted::Failed(note)) => Ok(TechnologyRecord::failed(url, note)),
            Some(Scripted::Crash) => Err(ClientError::SessionClosed),
            None => Ok(TechnologyRecord::new(url)),
        }
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn urls(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn write_input(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("input.csv");
    std::fs::write(&path, contents).expect("write input");
    path
}

#[tokio::test]
async fn test_failed_lookup_keeps_its_row() {
    let client = Arc::new(
        ScriptedClient::default()
            .with("a.com", Scripted::Found("Nginx"))
            .with("b.com", Scripted::Failed("Error: connection refused"))
            .with("c.com", Scripted::Found("Apache")),
    );
    let enricher = Enricher::new(client.clone());

    let records = enricher.enrich(&urls(&["a.com", "b.com", "c.com"])).await;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].technologies(TechCategory::WebServer), ["Nginx"]);
    assert_eq!(records[1].url(), "b.com");
    assert_eq!(records[1].status_note, "Error: connection refused");
    assert_eq!(records[1].technology_count(), 0);
    assert_eq!(records[2].technologies(TechCategory::WebServer), ["Apache"]);
    assert_eq!(client.fetched(), ["a.com", "b.com", "c.com"]);
}

/// Mount a successful lookup for `url` reporting one web server.
async fn mount_found(server: &MockServer, url: &str, web_server: &str) {
    Mock::given(method("GET"))
        .and(path("/API/Tech"))
        .and(query_param("url", url))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request": format!("https://whatcms.org/?s={url}"),
            "result": {"code": 200, "msg": "Success"},
            "results": [{"name": web_server, "categories": ["Web Server"]}]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_transport_error_keeps_its_row_over_http() {
    let server = MockServer::start().await;
    mount_found(&server, "a.com", "Nginx").await;
    mount_found(&server, "c.com", "Apache").await;
    Mock::given(method("GET"))
        .and(path("/API/Tech"))
        .and(query_param("url", "b.com"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .expect(1)
        .mount(&server)
        .await;

    let client = FingerprintClient::with_endpoint(
        format!("{}/API/Tech", server.uri()),
        "test-key",
        Duration::from_millis(300),
    )
    .expect("create client")
    .with_rate_limit(Arc::new(NoDelay));
    let enricher = Enricher::new(Arc::new(client));

    let records = enricher.enrich(&urls(&["a.com", "b.com", "c.com"])).await;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].technologies(TechCategory::WebServer), ["Nginx"]);
    assert_eq!(records[1].url(), "b.com");
    assert!(
        records[1].status_note.starts_with("Error: "),
        "unexpected note: {}",
        records[1].status_note
    );
    assert!(!records[1].status_note.contains("test-key"));
    assert_eq!(records[1].lookup_link, None);
    assert_eq!(records[1].technology_count(), 0);
    assert_eq!(records[2].technologies(TechCategory::WebServer), ["Apache"]);
}

#[tokio::test]
async fn test_local_error_drops_url_and_continues() {
    let client = Arc::new(
        ScriptedClient::default()
            .with("a.com", Scripted::Found("Nginx"))
            .with("b.com", Scripted::Crash),
    );
    let enricher = Enricher::new(client.clone());

    let records = enricher.enrich(&urls(&["a.com", "b.com", "c.com"])).await;

    let kept: Vec<_> = records.iter().map(TechnologyRecord::url).collect();
    assert_eq!(kept, ["a.com", "c.com"]);
    assert_eq!(client.fetched().len(), 3);
}

#[tokio::test]
async fn test_empty_batch() {
    let client = Arc::new(ScriptedClient::default());
    let enricher = Enricher::new(client.clone());

    assert!(enricher.enrich(&[]).await.is_empty());
    assert!(client.fetched().is_empty());
}

#[tokio::test]
async fn test_events_follow_request_order() {
    let client = Arc::new(
        ScriptedClient::default()
            .with("a.com", Scripted::Found("Nginx"))
            .with("b.com", Scripted::Crash),
    );
    let sink = Arc::new(RecordingSink::new());
    let enricher = Enricher::new(client).with_event_sink(sink.clone());

    enricher.enrich(&urls(&["a.com", "b.com"])).await;

    assert_eq!(
        sink.events(),
        vec![
            PipelineEvent::RunStarted { total: 2 },
            PipelineEvent::RequestStarted {
                index: 1,
                total: 2,
                url: "a.com".to_string(),
            },
            PipelineEvent::RequestCompleted {
                url: "a.com".to_string(),
                status_note: "200 - Success".to_string(),
                technologies: 1,
            },
            PipelineEvent::RequestStarted {
                index: 2,
                total: 2,
                url: "b.com".to_string(),
            },
            PipelineEvent::RecordDropped {
                url: "b.com".to_string(),
                reason: "client session is closed".to_string(),
            },
            PipelineEvent::RunFinished {
                total: 2,
                emitted: 1,
                dropped: 1,
            },
        ]
    );
}

#[tokio::test]
async fn test_missing_column_issues_no_requests() {
    let client = Arc::new(ScriptedClient::default());
    let enricher = Enricher::new(client.clone());
    let table = Table::new(
        vec!["website".to_string()],
        vec![vec!["a.com".to_string()]],
    );

    let err = enricher.enrich_table(&table, "url").await.unwrap_err();

    assert!(matches!(err, EnrichError::MissingColumn { .. }));
    assert!(client.fetched().is_empty());
}

#[tokio::test]
async fn test_workflow_writes_report() {
    let tmp = TempDir::new().expect("create temp dir");
    let input = write_input(&tmp, "company,url\nAcme,a.com\nGlobex,b.com\n");
    let output = tmp.path().join("report.csv");

    let client = Arc::new(
        ScriptedClient::default()
            .with("a.com", Scripted::Found("Nginx"))
            .with("b.com", Scripted::Failed("Error: 429")),
    );
    let enricher = Enricher::new(client.clone());

    let summary = enricher
        .run_workflow(&input, &output, &WorkflowOptions::default())
        .await
        .expect("workflow succeeds");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.emitted, 2);
    assert_eq!(summary.dropped, 0);
    assert!(summary.finished_at >= summary.started_at);
    assert_eq!(client.closes(), 1);

    let text = std::fs::read_to_string(&output).expect("read report");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], COLUMNS.join(","));
    assert_eq!(
        lines[1],
        "a.com,https://whatcms.org/?s=a.com,,,,,,Nginx,,,,200 - Success"
    );
    assert_eq!(lines[2], "b.com,,,,,,,,,,,Error: 429");
    assert_eq!(lines.len(), 3);
}

#[tokio::test]
async fn test_workflow_json_report_counts_dropped() {
    let tmp = TempDir::new().expect("create temp dir");
    let input = write_input(&tmp, "url\na.com\nb.com\nc.com\n");
    let output = tmp.path().join("report.json");

    let client = Arc::new(ScriptedClient::default().with("b.com", Scripted::Crash));
    let enricher = Enricher::new(client.clone());

    let summary = enricher
        .run_workflow(&input, &output, &WorkflowOptions::default())
        .await
        .expect("workflow succeeds");

    assert_eq!(summary.total, 3);
    assert_eq!(summary.emitted, 2);
    assert_eq!(summary.dropped, 1);

    let text = std::fs::read_to_string(&output).expect("read report");
    let rows: serde_json::Value = serde_json::from_str(&text).expect("parse report");
    assert_eq!(rows[0]["url"], "a.com");
    assert_eq!(rows[1]["url"], "c.com");
}

#[tokio::test]
async fn test_workflow_custom_column() {
    let tmp = TempDir::new().expect("create temp dir");
    let input = write_input(&tmp, "website\na.com\n");
    let output = tmp.path().join("report.csv");

    let client = Arc::new(ScriptedClient::default());
    let enricher = Enricher::new(client.clone());
    let options = WorkflowOptions {
        url_column: "website".to_string(),
        sheet_name: None,
    };

    let summary = enricher
        .run_workflow(&input, &output, &options)
        .await
        .expect("workflow succeeds");

    assert_eq!(summary.emitted, 1);
    assert_eq!(client.fetched(), ["a.com"]);
}

#[tokio::test]
async fn test_workflow_closes_client_on_missing_input() {
    let tmp = TempDir::new().expect("create temp dir");
    let client = Arc::new(ScriptedClient::default());
    let enricher = Enricher::new(client.clone());

    let err = enricher
        .run_workflow(
            &tmp.path().join("missing.csv"),
            &tmp.path().join("report.csv"),
            &WorkflowOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichError::InputNotFound { .. }));
    assert_eq!(client.closes(), 1);
    assert!(client.fetched().is_empty());
}

#[tokio::test]
async fn test_unsupported_output_fails_before_any_lookup() {
    let tmp = TempDir::new().expect("create temp dir");
    let input = write_input(&tmp, "url\na.com\nb.com\nc.com\n");
    let output = tmp.path().join("report.txt");

    let client = Arc::new(ScriptedClient::default());
    let enricher = Enricher::new(client.clone());

    let err = enricher
        .run_workflow(&input, &output, &WorkflowOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichError::UnsupportedFormat { .. }));
    assert!(client.fetched().is_empty());
    assert_eq!(client.closes(), 1);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_workflow_xlsx_in_and_out() {
    let tmp = TempDir::new().expect("create temp dir");
    let input = tmp.path().join("input.xlsx");
    let output = tmp.path().join("report.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("WHATCMS INPUT").expect("name sheet");
    sheet.write_string(0, 0, "url").expect("write cell");
    sheet.write_string(1, 0, "a.com").expect("write cell");
    sheet.write_string(2, 0, "b.com").expect("write cell");
    workbook.save(&input).expect("save workbook");

    let client = Arc::new(
        ScriptedClient::default()
            .with("a.com", Scripted::Found("Nginx"))
            .with("b.com", Scripted::Failed("Error: 429")),
    );
    let enricher = Enricher::new(client.clone());
    let options = WorkflowOptions {
        url_column: "url".to_string(),
        sheet_name: Some("WHATCMS INPUT".to_string()),
    };

    let summary = enricher
        .run_workflow(&input, &output, &options)
        .await
        .expect("workflow succeeds");

    assert_eq!(summary.emitted, 2);
    assert_eq!(client.fetched(), ["a.com", "b.com"]);
    assert_eq!(client.closes(), 1);

    let report = Table::load(&output, None).expect("load report");
    assert_eq!(report.headers(), COLUMNS);
    assert_eq!(
        report.column("Web_Server"),
        Some(vec!["Nginx".to_string(), String::new()])
    );
    assert_eq!(
        report.column("whatcms_response"),
        Some(vec!["200 - Success".to_string(), "Error: 429".to_string()])
    );
}

#[tokio::test]
async fn test_workflow_missing_column_closes_client() {
    let tmp = TempDir::new().expect("create temp dir");
    let input = write_input(&tmp, "website\na.com\n");

    let client = Arc::new(ScriptedClient::default());
    let enricher = Enricher::new(client.clone());

    let err = enricher
        .run_workflow(
            &input,
            &tmp.path().join("report.csv"),
            &WorkflowOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichError::MissingColumn { .. }));
    assert!(client.fetched().is_empty());
    assert_eq!(client.closes(), 1);
}
