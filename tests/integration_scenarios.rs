//! End-to-end scenarios exercising the full build -> merge -> lexicon -> search
//! pipeline against real on-disk artifacts in a scratch directory.

use html_index::analyzer::build_token_table;
use html_index::index::IndexBuilder;
use html_index::ingest::{read_all, IngestItem, IngestSource};
use html_index::models::Document;
use html_index::parser;
use html_index::retrieval::SearchEngine;
use html_index::url_map::strip_fragment;
use std::fs;

fn doc(url: &str, html: &str) -> Document {
    let extracted = parser::extract(html);
    Document {
        url: strip_fragment(url).to_string(),
        normal_text: extracted.normal.clone(),
        important_text: extracted.important.clone(),
        token_table: build_token_table(&extracted.normal, &extracted.important),
        doc_id: 0,
        fingerprint: 0,
    }
}

#[test]
fn scenario_1_single_doc_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = IndexBuilder::new(tmp.path().to_path_buf(), 15_000, 3);
    builder
        .add_document(
            doc(
                "http://e.com/a",
                "<html><title>Gaza report</title><p>Gaza is in the news.</p></html>",
            ),
            false,
        )
        .unwrap();
    builder.finalize().unwrap();

    let engine = SearchEngine::open(tmp.path()).unwrap();
    let results = engine.search("gaza", 5).unwrap();
    assert_eq!(results.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(), vec!["http://e.com/a"]);

    let lexicon_contents = fs::read_to_string(tmp.path().join("lexicon.txt")).unwrap();
    for expected_term in ["gaza", "report", "news", "gaza_report", "gaza_is_in"] {
        assert!(
            lexicon_contents.lines().any(|line| line.starts_with(&format!("{expected_term} "))),
            "expected lexicon to contain an entry for '{expected_term}'"
        );
    }
}

#[test]
fn scenario_2_acronym_query() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = IndexBuilder::new(tmp.path().to_path_buf(), 15_000, 3);
    builder
        .add_document(doc("http://e.com/a", "<html><p>ACM SIGIR conference</p></html>"), false)
        .unwrap();
    builder.finalize().unwrap();

    let engine = SearchEngine::open(tmp.path()).unwrap();
    let results = engine.search("ACM", 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "http://e.com/a");

    let index_contents = fs::read_to_string(tmp.path().join("inverted_index.txt")).unwrap();
    assert!(index_contents.lines().any(|line| line.starts_with("acm:")));
}

#[test]
fn scenario_3_near_duplicate_skip() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = IndexBuilder::new(tmp.path().to_path_buf(), 15_000, 3);
    builder
        .add_document(
            doc(
                "http://e.com/a",
                "<html><p>The quick brown fox jumps over the lazy dog near the river bank today.</p></html>",
            ),
            true,
        )
        .unwrap();
    let second_indexed = builder
        .add_document(
            doc(
                "http://e.com/b",
                "<html><p>The quick brown fox jumps over the lazy dog near the river bank this morning.</p></html>",
            ),
            true,
        )
        .unwrap();

    assert!(!second_indexed);
    assert_eq!(builder.stats().duplicates_found, 1);
    assert_eq!(builder.stats().duplicates_skipped, 1);
}

#[test]
fn scenario_4_external_merge_correctness() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = IndexBuilder::new(tmp.path().to_path_buf(), 10_000, 3);

    for i in 1..=30_001u32 {
        let content = match i {
            7 => "<p>widget widget</p>".to_string(),
            10_007 => "<p>widget widget widget</p>".to_string(),
            20_007 => "<p>widget widget widget widget widget</p>".to_string(),
            _ => format!("<p>filler{i}</p>"),
        };
        builder
            .add_document(doc(&format!("http://e.com/{i}"), &content), false)
            .unwrap();
    }

    assert_eq!(builder.stats().partial_segments_written, 3);
    let stats = builder.finalize().unwrap();
    assert_eq!(stats.partial_segments_written, 4);
    assert_eq!(stats.documents_indexed, 30_001);

    let index_contents = fs::read_to_string(tmp.path().join("inverted_index.txt")).unwrap();
    let widget_line = index_contents
        .lines()
        .find(|line| line.starts_with("widget:"))
        .expect("widget term must be present in the final index");
    assert!(widget_line.starts_with("widget:7:2,10007:3,20007:5"));
}

#[test]
fn scenario_5_conjunctive_multi_word() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = IndexBuilder::new(tmp.path().to_path_buf(), 15_000, 3);
    builder.add_document(doc("http://e.com/a", "<p>cats sleep</p>"), false).unwrap();
    builder.add_document(doc("http://e.com/b", "<p>cats chase dogs</p>"), false).unwrap();
    builder.add_document(doc("http://e.com/c", "<p>dogs sleep</p>"), false).unwrap();
    builder.finalize().unwrap();

    let engine = SearchEngine::open(tmp.path()).unwrap();
    let results = engine.search("cats dogs", 10).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "http://e.com/b");
}

#[test]
fn scenario_6_ngram_boost_ranks_heading_phrase_first() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = IndexBuilder::new(tmp.path().to_path_buf(), 15_000, 3);
    builder
        .add_document(
            doc("http://e.com/a", "<html><h1>Machine Learning</h1><p>general discussion</p></html>"),
            false,
        )
        .unwrap();
    builder
        .add_document(
            doc(
                "http://e.com/b",
                "<html><p>machine is a word that appears here and learning happens over a very long separate paragraph</p></html>",
            ),
            false,
        )
        .unwrap();
    builder.finalize().unwrap();

    let engine = SearchEngine::open(tmp.path()).unwrap();
    let results = engine.search("machine learning", 10).unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].url, "http://e.com/a");
}

#[test]
fn scenario_7_ingestion_tolerates_one_empty_file_in_a_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus_dir = tmp.path().join("corpus");
    fs::create_dir_all(&corpus_dir).unwrap();
    fs::write(corpus_dir.join("a.json"), r#"{"url":"http://e.com/a","content":"<p>alpha</p>"}"#).unwrap();
    fs::write(corpus_dir.join("b.json"), "").unwrap();
    fs::write(corpus_dir.join("c.json"), r#"{"url":"http://e.com/c","content":"<p>gamma</p>"}"#).unwrap();
    fs::write(corpus_dir.join("d.json"), r#"{"url":"http://e.com/d","content":"<p>delta</p>"}"#).unwrap();
    fs::write(corpus_dir.join("e.json"), r#"{"url":"http://e.com/e","content":"<p>epsilon</p>"}"#).unwrap();

    let items = read_all(&IngestSource::Directory(corpus_dir)).unwrap();
    let index_dir = tmp.path().join("index");
    fs::create_dir_all(&index_dir).unwrap();
    let mut builder = IndexBuilder::new(index_dir, 15_000, 3);

    for item in items {
        if let IngestItem::Record(record) = item {
            let extracted = parser::extract(&record.content);
            let document = Document {
                url: strip_fragment(&record.url).to_string(),
                normal_text: extracted.normal.clone(),
                important_text: extracted.important.clone(),
                token_table: build_token_table(&extracted.normal, &extracted.important),
                doc_id: 0,
                fingerprint: 0,
            };
            builder.add_document(document, false).unwrap();
        }
    }

    let stats = builder.finalize().unwrap();
    assert_eq!(stats.documents_indexed, 4);
}
