use std::fs;
use std::str::FromStr;
use tempfile::TempDir;

use figment::providers::{Format, Toml};
use figment::Figment;
use skillmentor_core::config::Config;
use skillmentor_core::corpus::{write_corpus, CorpusLoader};
use skillmentor_core::{Category, Document, DocumentId};

#[test]
fn load_dir_reads_sorted_files_in_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("b.txt"), "charlie\n\ndelta").unwrap();
    fs::write(dir.join("a.txt"), "alpha\n---\nbravo").unwrap();
    fs::write(dir.join("skip.md"), "not a corpus file").unwrap();

    let docs = CorpusLoader::new().load(dir).expect("load dir");
    let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts, vec!["alpha", "bravo", "charlie", "delta"]);
    assert_eq!(docs[2].id, DocumentId::derive(2, "charlie"));
}

#[test]
fn written_corpus_reparses_to_same_documents() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested/documents.txt");
    let original = CorpusLoader::new().parse(
        "category: pricing\nCost-plus pricing.\nValue pricing.\n\nDirect selling at markets builds trust.",
    );

    write_corpus(&path, &original).expect("write");
    let reloaded = CorpusLoader::new().load_file(&path).expect("reload");
    assert_eq!(original, reloaded);
}

#[test]
fn uncategorized_header_like_text_survives_rewrite() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("documents.txt");
    let original = vec![
        Document::new(0, "Category: a label people write in notes\nPricing tips follow here.", None),
        Document::new(1, "category: only a header", None),
    ];

    write_corpus(&path, &original).expect("write");
    let reloaded = CorpusLoader::new().load_file(&path).expect("reload");
    assert_eq!(original, reloaded);
}

#[test]
fn missing_corpus_file_is_storage_error() {
    let tmp = TempDir::new().unwrap();
    let err = CorpusLoader::new().load_file(&tmp.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, skillmentor_core::Error::Storage(_)), "got {err:?}");
}

#[test]
fn settings_fill_defaults_and_merge_overrides() {
    let config = Config::from_figment(Figment::new().merge(Toml::string(
        "[retrieval]\ntop_k = 5\n\n[generator]\nenabled = true\nmodel = \"mistral\"\n",
    )));
    let settings = config.settings().expect("settings");
    assert_eq!(settings.retrieval.top_k, 5);
    assert_eq!(settings.retrieval.batch_size, 32);
    assert!(settings.generator.enabled);
    assert_eq!(settings.generator.model, "mistral");
    assert_eq!(settings.advice.min_keyword_len, 4);
    let top_k: usize = config.get("retrieval.top_k").expect("get");
    assert_eq!(top_k, 5);
}

#[test]
fn zero_top_k_is_rejected() {
    let config = Config::from_figment(Figment::new().merge(Toml::string("[retrieval]\ntop_k = 0\n")));
    assert!(config.settings().is_err());
}

#[test]
fn category_parses_case_insensitively() {
    assert_eq!(Category::from_str(" Sustainability ").unwrap(), Category::Sustainability);
    assert!(Category::from_str("finance").is_err());
    assert_eq!(Category::General.to_string(), "general");
}
