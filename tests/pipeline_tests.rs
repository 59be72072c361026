//! End-to-end pipeline scenarios driven through the file boundary: corpus
//! and configuration JSON in, corpus JSON, verse lines, and CSV report out.

use std::fs;
use tempfile::tempdir;
use versewright::config::{OverrideConfig, RuleConfig};
use versewright::ingestion::{self, SourceFormat};
use versewright::overrides::{LiteralOverrides, OverrideMap};
use versewright::{compile_rules, pipeline, storage, Corpus};

const CORPUS_JSON: &str = r#"{
  "Genesis": {
    "1": {
      "1": "In the beginning God created the heaven and the earth.",
      "2": "And the Spirit of God moved upon the face of the waters."
    }
  },
  "Exodus": {
    "20": {
      "3": "Thou shalt have no other gods before me."
    }
  }
}"#;

const RULES_JSON: &str = r#"{
  "rules": [
    {"pattern": "\\bGod\\b", "replacement": "Elohiym", "description": "God -> Elohiym"},
    {"pattern": "\\bLORD\\b", "replacement": "Yahuah", "description": "LORD -> Yahuah"}
  ]
}"#;

const OVERRIDES_JSON: &str = r#"{
  "overrides": [
    {"id": "Exodus 20:3", "actions": [
      {"type": "replace", "pattern": "gods", "replacement": "elohiym"}
    ]}
  ]
}"#;

#[test]
fn test_restore_run_from_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("corpus.json");
    let rules_path = dir.path().join("rules.json");
    let overrides_path = dir.path().join("overrides.json");
    fs::write(&input, CORPUS_JSON).unwrap();
    fs::write(&rules_path, RULES_JSON).unwrap();
    fs::write(&overrides_path, OVERRIDES_JSON).unwrap();

    let rules = compile_rules(&RuleConfig::from_file(&rules_path).unwrap()).unwrap();
    let overrides =
        OverrideMap::from_config(&OverrideConfig::from_file(&overrides_path).unwrap()).unwrap();
    let corpus = storage::load_corpus(&input).unwrap();

    let (restored, outcome) = pipeline::process_corpus_preserving_structure(
        &corpus,
        &rules,
        &overrides,
        &LiteralOverrides::default(),
        false,
    )
    .unwrap();

    assert_eq!(
        restored.verse("Genesis", 1, 1),
        Some("In the beginning Elohiym created the heaven and the earth.")
    );
    assert_eq!(
        restored.verse("Exodus", 20, 3),
        Some("Thou shalt have no other elohiym before me.")
    );
    assert!(outcome.is_clean());

    let out_json = dir.path().join("build").join("restored.json");
    let out_text = dir.path().join("build").join("restored.txt");
    let report_path = dir.path().join("build").join("report.csv");
    storage::save_corpus(&out_json, &restored).unwrap();
    storage::save_corpus_lines(&out_text, &restored).unwrap();
    storage::save_report_csv(&report_path, &outcome.report).unwrap();

    let reloaded = storage::load_corpus(&out_json).unwrap();
    assert_eq!(reloaded, restored);

    let text = fs::read_to_string(&out_text).unwrap();
    assert!(text
        .lines()
        .any(|l| l == "Exodus 20:3 Thou shalt have no other elohiym before me."));

    let report = fs::read_to_string(&report_path).unwrap();
    let mut lines = report.lines();
    assert_eq!(lines.next(), Some("Rule Description,Matches/Replacements"));
    assert_eq!(lines.next(), Some("God -> Elohiym,2"));
    // A rule with zero matches still gets a row.
    assert_eq!(lines.next(), Some("LORD -> Yahuah,0"));
}

#[test]
fn test_extras_processing_preserves_empty_chapters() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("extras.json");
    fs::write(
        &input,
        r#"{
          "Book of Enoch": {
            "1": {"1": "The words of the blessing of Enoch, spoken unto thee by God."},
            "2": {},
            "108": {}
          }
        }"#,
    )
    .unwrap();

    let rules = compile_rules(
        &serde_json::from_str::<RuleConfig>(RULES_JSON).unwrap(),
    )
    .unwrap();
    let literals = LiteralOverrides::from_config(
        &serde_json::from_str::<OverrideConfig>(
            r#"{"overrides": [{"id": "enoch", "replacements": {"blessing": "barakah"}}]}"#,
        )
        .unwrap(),
    );

    let corpus = storage::load_corpus(&input).unwrap();
    let (processed, outcome) = pipeline::process_corpus_preserving_structure(
        &corpus,
        &rules,
        &OverrideMap::default(),
        &literals,
        true,
    )
    .unwrap();

    // Rules, literal overrides, and modernization all applied to verse text.
    assert_eq!(
        processed.verse("Book of Enoch", 1, 1),
        Some("The words of the barakah of Enoch, spoken unto you by Elohiym.")
    );
    assert_eq!(outcome.verses_in, outcome.verses_out);

    // In-place rewrite keeps the empty placeholder chapters.
    storage::save_corpus(&input, &processed).unwrap();
    let reloaded = storage::load_corpus(&input).unwrap();
    let chapters = reloaded.book("Book of Enoch").unwrap();
    assert_eq!(chapters.len(), 3);
    assert!(chapters.get(&2).unwrap().is_empty());
    assert!(chapters.get(&108).unwrap().is_empty());
}

#[test]
fn test_parse_source_to_corpus_file() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("enoch.txt");
    fs::write(
        &source,
        "CHAPTER 1\n1. The words of the blessing of Enoch,\nwherewith he blessed the elect.\n",
    )
    .unwrap();

    let text = storage::load_text(&source).unwrap();
    let corpus = ingestion::parse_source(SourceFormat::ChapterText, &text).unwrap();
    assert_eq!(
        corpus.verse("Book of Enoch", 1, 1),
        Some("The words of the blessing of Enoch, wherewith he blessed the elect.")
    );
    // Default chapter-text parser pads to the full standard extent.
    assert_eq!(corpus.book("Book of Enoch").unwrap().len(), 108);

    let out = dir.path().join("enoch.json");
    storage::save_corpus(&out, &corpus).unwrap();
    assert_eq!(storage::load_corpus(&out).unwrap(), corpus);
}

#[test]
fn test_corrupt_corpus_json_is_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.json");
    fs::write(&input, r#"{"Genesis": {"01": {"1": "leading zero"}}}"#).unwrap();
    assert!(matches!(
        storage::load_corpus(&input),
        Err(versewright::PipelineError::MalformedCorpus { .. })
    ));
}

#[test]
fn test_line_mode_matches_default_mode_on_clean_corpus() {
    // When no rule can touch an address prefix, both engines agree.
    let corpus: Corpus = serde_json::from_str(CORPUS_JSON).unwrap();
    let rules = compile_rules(&serde_json::from_str::<RuleConfig>(RULES_JSON).unwrap()).unwrap();

    let (line_out, line_outcome) =
        pipeline::process_corpus(&corpus, &rules, &OverrideMap::default()).unwrap();
    let (preserved_out, preserved_outcome) = pipeline::process_corpus_preserving_structure(
        &corpus,
        &rules,
        &OverrideMap::default(),
        &LiteralOverrides::default(),
        false,
    )
    .unwrap();

    assert_eq!(line_out, preserved_out);
    assert_eq!(
        line_outcome.report.rows(),
        preserved_outcome.report.rows()
    );
}
