use super::*;
use crate::testing::source;

fn catalog(dir: &Path) -> Catalog {
    Catalog::new(dir.join("catalog"), "SHA-256").unwrap()
}

fn stream(sources: &[Source]) -> String {
    sources
        .iter()
        .map(|s| serde_json::to_string(s).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn json_stream_registers_each_source() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog(dir.path());
    let input = stream(&[source("a", &[(0, 10, "x")]), source("b", &[(5, 9, "")])]);

    let report = ingest_json(&catalog, input.as_bytes()).unwrap();
    assert_eq!(report, IngestReport { created: 2, skipped: 0 });
    assert_eq!(catalog.lookup("b").unwrap(), source("b", &[(5, 9, "")]));
}

#[test]
fn duplicates_and_invalid_sources_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog(dir.path());
    let input = stream(&[
        source("a", &[(0, 10, "")]),
        source("a", &[(0, 20, "")]),
        source("bad", &[(4, 2, "")]),
        source("c", &[(0, 1, "")]),
    ]);

    let report = ingest_json(&catalog, input.as_bytes()).unwrap();
    assert_eq!(report, IngestReport { created: 2, skipped: 2 });
    // The first registration wins.
    assert_eq!(catalog.lookup("a").unwrap(), source("a", &[(0, 10, "")]));
    assert!(catalog.lookup("bad").unwrap_err().is_not_found());
}

#[test]
fn malformed_document_stops_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog(dir.path());
    let input = format!("{}\n{{\"key\": ", stream(&[source("a", &[(0, 10, "")])]));

    let err = ingest_json(&catalog, input.as_bytes()).unwrap_err();
    assert!(matches!(err, MashupError::Serde(_)), "{err}");
    assert!(catalog.lookup("a").is_ok());
}

#[test]
fn ingest_paths_keeps_going_past_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog(dir.path());
    let good = dir.path().join("good.json");
    std::fs::write(&good, stream(&[source("a", &[(0, 10, "")])])).unwrap();
    let missing = dir.path().join("missing.json");
    let not_media = dir.path().join("notes.txt");
    std::fs::write(&not_media, b"hello").unwrap();

    let report = ingest_paths(&catalog, &[missing, not_media, good]);
    assert_eq!(report, IngestReport { created: 1, skipped: 2 });
    assert!(catalog.lookup("a").is_ok());
}

#[test]
fn json_extensions_are_recognised() {
    assert!(is_json_stream(Path::new("x/sources.json")));
    assert!(is_json_stream(Path::new("sources.jsonl")));
    assert!(!is_json_stream(Path::new("movie.mkv")));
    assert!(!is_json_stream(Path::new("list.m3u")));
}
