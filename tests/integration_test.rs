//! Integration tests for the extraction pipeline
//! Serves fixture HTML pages over a local mock server and runs the real HTTP fetcher

use internship_match::error::FetchError;
use internship_match::extractor::Extractor;
use internship_match::fetch::{HttpFetcher, PageFetcher};
use internship_match::session::{add_student, import_listing, recommend};
use internship_match::storage::{JsonFileStore, RecordStore};
use internship_match::types::{DiagnosticKind, OpportunityRecord, WorkMode};
use std::fs;
use std::net::TcpListener;
use std::time::Duration;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{}", name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

fn fetcher(timeout: Duration) -> HttpFetcher {
    HttpFetcher::new("Mozilla/5.0", timeout).expect("Failed to build fetcher")
}

/// Mounts the fixture listing and its detail pages. The Flutter detail page errors.
fn serve_listing(server: &mut mockito::ServerGuard) -> Vec<mockito::Mock> {
    vec![
        server
            .mock("GET", "/internships")
            .match_header("user-agent", "Mozilla/5.0")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(fixture("listing.html"))
            .create(),
        server
            .mock(
                "GET",
                "/internship/detail/backend-development-internship-in-bangalore-101",
            )
            .with_status(200)
            .with_body(fixture("detail_backend.html"))
            .create(),
        server
            .mock(
                "GET",
                "/internship/detail/work-from-home-data-science-internship-202",
            )
            .with_status(200)
            .with_body(fixture("detail_remote.html"))
            .create(),
        server
            .mock("GET", "/internship/detail/flutter-internship-in-pune-303")
            .with_status(500)
            .create(),
    ]
}

#[test]
fn test_extract_listing_skips_broken_entries() {
    let mut server = mockito::Server::new();
    let mocks = serve_listing(&mut server);

    let extractor = Extractor::with_default_selectors(fetcher(Duration::from_secs(5))).unwrap();
    let result = extractor.extract(&format!("{}/internships", server.url()));

    assert_eq!(
        result.records,
        vec![
            OpportunityRecord {
                title: "Backend Development Internship in Bangalore".to_string(),
                requirements: "Python, Django, SQL".to_string(),
                location: "Bangalore".to_string(),
                mode: WorkMode::InOffice,
            },
            OpportunityRecord {
                title: "Work From Home Data Science Internship".to_string(),
                requirements: "Python, Machine Learning".to_string(),
                location: "Work From Home".to_string(),
                mode: WorkMode::Remote,
            },
        ]
    );

    assert_eq!(result.diagnostics.len(), 2);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::MissingDetailLink);
    assert_eq!(result.diagnostics[0].entry, Some(2));
    assert_eq!(result.diagnostics[1].kind, DiagnosticKind::DetailFetchFailed);
    assert_eq!(result.diagnostics[1].entry, Some(4));
    assert!(result.diagnostics[1].message.contains("500"));

    for mock in mocks {
        mock.assert();
    }
}

#[test]
fn test_empty_listing_reports_no_entries() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/internships")
        .with_status(200)
        .with_body(fixture("empty_listing.html"))
        .create();

    let extractor = Extractor::with_default_selectors(fetcher(Duration::from_secs(5))).unwrap();
    let result = extractor.extract(&format!("{}/internships", server.url()));

    assert!(result.records.is_empty());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::NoEntries);
}

#[test]
fn test_listing_http_error_reports_fetch_failure() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/internships").with_status(403).create();

    let extractor = Extractor::with_default_selectors(fetcher(Duration::from_secs(5))).unwrap();
    let result = extractor.extract(&format!("{}/internships", server.url()));

    assert!(result.records.is_empty());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::ListingFetchFailed);
    assert!(result.diagnostics[0].message.contains("403"));
}

#[test]
fn test_stalled_detail_page_times_out_and_extraction_continues() {
    // Accepts connections into the backlog but never answers
    let silent = TcpListener::bind("127.0.0.1:0").unwrap();
    let stalled_url = format!("http://{}/stall", silent.local_addr().unwrap());

    let card = |link: &str, city: &str| {
        format!(
            r#"<div class="individual_internship" data-href="{}">
                 <div class="locations">{}</div>
               </div>"#,
            link, city
        )
    };
    let listing = format!(
        "<html><body>{}{}{}</body></html>",
        card("/d/1", "Pune"),
        card(&stalled_url, "Delhi"),
        card("/d/3", "Goa")
    );

    let mut server = mockito::Server::new();
    server.mock("GET", "/list").with_status(200).with_body(listing).create();
    server
        .mock("GET", "/d/1")
        .with_status(200)
        .with_body("<h1>First Intern</h1><span class=\"round_tabs\">Rust</span>")
        .create();
    server
        .mock("GET", "/d/3")
        .with_status(200)
        .with_body("<h1>Third Intern</h1><span class=\"round_tabs\">Go</span>")
        .create();

    let extractor =
        Extractor::with_default_selectors(fetcher(Duration::from_millis(500))).unwrap();
    let result = extractor.extract(&format!("{}/list", server.url()));

    let titles: Vec<_> = result.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["First Intern", "Third Intern"]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].entry, Some(2));
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::DetailFetchFailed);

    drop(silent);
}

#[test]
fn test_http_fetcher_classifies_errors() {
    let mut server = mockito::Server::new();
    let ok = server
        .mock("GET", "/ok")
        .match_header("user-agent", "Mozilla/5.0")
        .with_status(200)
        .with_body("hello")
        .expect(1)
        .create();
    server.mock("GET", "/gone").with_status(404).create();

    let fetcher = fetcher(Duration::from_secs(5));

    assert_eq!(fetcher.fetch(&format!("{}/ok", server.url())).unwrap(), "hello");
    ok.assert();

    match fetcher.fetch(&format!("{}/gone", server.url())) {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected status error, got {:?}", other),
    }

    // Connections queue in the backlog and never get a response
    let silent = TcpListener::bind("127.0.0.1:0").unwrap();
    let stalled = format!("http://{}/", silent.local_addr().unwrap());
    let quick = HttpFetcher::new("Mozilla/5.0", Duration::from_millis(300)).unwrap();
    assert!(matches!(quick.fetch(&stalled), Err(FetchError::Timeout { .. })));
}

#[test]
fn test_import_and_recommend_with_file_store() {
    let mut server = mockito::Server::new();
    let _mocks = serve_listing(&mut server);

    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path());
    let extractor = Extractor::with_default_selectors(fetcher(Duration::from_secs(5))).unwrap();

    let extraction =
        import_listing(&mut store, &extractor, &format!("{}/internships", server.url())).unwrap();
    assert_eq!(extraction.records.len(), 2);
    assert_eq!(store.read_all::<OpportunityRecord>().len(), 2);

    add_student(&mut store, "Priya", "SQL, Django, excel").unwrap();

    // Reopen to read back from disk
    let store = JsonFileStore::new(dir.path());
    let ranked = recommend(&store, "Priya", 5).unwrap();

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].opportunity.title, "Backend Development Internship in Bangalore");
    assert_eq!(ranked[0].score, 2);
    assert_eq!(ranked[1].score, 0);
}
