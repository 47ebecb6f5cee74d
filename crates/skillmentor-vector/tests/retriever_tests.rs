use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use skillmentor_core::traits::Embedder;
use skillmentor_core::{Document, Error};
use skillmentor_embed::HashingEmbedder;
use skillmentor_vector::{Retriever, VectorIndex};

fn corpus() -> Vec<String> {
    vec![
        "Price handmade furniture by adding material cost, labour hours and a fair margin.".to_string(),
        "Reduce textile waste by turning fabric offcuts into patchwork products.".to_string(),
        "Promote your bakery on social media with photos of fresh bread.".to_string(),
        "Keep a workshop inventory so materials never run out mid-order.".to_string(),
        "Compost food scraps and recycle packaging to cut waste.".to_string(),
    ]
}

fn retriever() -> Retriever { Retriever::new(Arc::new(HashingEmbedder::new(256))).with_batch_size(2) }

/// Hashing embedder that can be taken offline mid-test.
struct SwitchableEmbedder {
    inner: HashingEmbedder,
    offline: AtomicBool,
}

impl Embedder for SwitchableEmbedder {
    fn dim(&self) -> usize { self.inner.dim() }
    fn max_len(&self) -> usize { self.inner.max_len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if self.offline.load(Ordering::SeqCst) { anyhow::bail!("model offline"); }
        self.inner.embed_batch(texts)
    }
}

#[test]
fn results_are_bounded_and_sorted() -> Result<()> {
    let r = retriever();
    assert_eq!(r.create_index_from_texts(&corpus())?, 5);
    for k in 1..=7 {
        let hits = r.retrieve_documents("how do I reduce fabric waste", k)?;
        assert_eq!(hits.len(), k.min(5));
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
    let top = r.retrieve("how do I reduce fabric waste", 1)?;
    assert!(top[0].contains("textile waste"), "{:?}", top);
    Ok(())
}

#[test]
fn repeated_queries_are_identical() -> Result<()> {
    let r = retriever();
    r.create_index_from_texts(&corpus())?;
    let first = r.retrieve_documents("social media marketing", 3)?;
    for _ in 0..5 {
        assert_eq!(r.retrieve_documents("social media marketing", 3)?, first);
    }
    Ok(())
}

#[test]
fn uninitialized_index_returns_nothing() -> Result<()> {
    let r = retriever();
    assert!(!r.is_ready());
    assert!(r.retrieve("anything", 3)?.is_empty());
    Ok(())
}

#[test]
fn zero_k_is_rejected() {
    let r = retriever();
    assert!(matches!(r.retrieve("anything", 0), Err(Error::InvalidArgument(_))));
}

#[test]
fn empty_corpus_builds_an_empty_index() -> Result<()> {
    let r = retriever();
    assert_eq!(r.create_index(Vec::new())?, 0);
    assert!(r.is_ready());
    assert!(r.retrieve("pricing", 3)?.is_empty());
    Ok(())
}

#[test]
fn embedding_failure_keeps_previous_index() -> Result<()> {
    let embedder = Arc::new(SwitchableEmbedder { inner: HashingEmbedder::new(256), offline: AtomicBool::new(false) });
    let r = Retriever::new(embedder.clone());
    r.create_index_from_texts(&corpus())?;
    let before = r.retrieve_documents("reduce fabric waste", 3)?;

    embedder.offline.store(true, Ordering::SeqCst);
    let err = r.create_index_from_texts(&["a replacement corpus".to_string()]).unwrap_err();
    assert!(matches!(err, Error::Embedding(_)));

    embedder.offline.store(false, Ordering::SeqCst);
    assert!(r.is_ready());
    assert_eq!(r.len(), 5);
    assert_eq!(r.retrieve_documents("reduce fabric waste", 3)?, before);
    Ok(())
}

#[test]
fn failed_first_build_leaves_retriever_uninitialized() {
    let embedder = Arc::new(SwitchableEmbedder { inner: HashingEmbedder::new(256), offline: AtomicBool::new(true) });
    let r = Retriever::new(embedder);
    assert!(matches!(r.create_index_from_texts(&corpus()), Err(Error::Embedding(_))));
    assert!(!r.is_ready());
}

#[test]
fn blank_documents_are_skipped_and_renumbered() -> Result<()> {
    let r = retriever();
    let docs = vec![Document::new(0, "first", None), Document::new(1, "  \n ", None), Document::new(2, "second", None)];
    assert_eq!(r.create_index(docs)?, 2);
    let hits = r.retrieve_documents("second", 2)?;
    assert_eq!(hits[0].document.id.as_str().split(':').next(), Some("1"));
    Ok(())
}

#[test]
fn save_and_load_preserve_search_results() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let index_path = tmp.path().join("index/skillmentor.idx");
    let docs_path = tmp.path().join("index/documents.txt");

    let built = retriever();
    let mut docs: Vec<Document> = corpus().iter().enumerate().map(|(i, t)| Document::new(i, t, None)).collect();
    docs[1].category = Some("sustainability".into());
    built.create_index(docs)?;
    built.save(&index_path, &docs_path)?;

    let loaded = Retriever::open(Arc::new(HashingEmbedder::new(256)), &index_path, &docs_path);
    assert_eq!(loaded.len(), 5);
    for probe in ["pricing furniture", "compost", "bakery photos"] {
        assert_eq!(loaded.retrieve_documents(probe, 3)?, built.retrieve_documents(probe, 3)?);
    }

    let index = VectorIndex::load(&index_path)?;
    assert_eq!(index.search(&HashingEmbedder::new(256).embed_text("compost"), 2)?.len(), 2);
    Ok(())
}

#[test]
fn header_like_text_survives_save_and_load() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let index_path = tmp.path().join("skillmentor.idx");
    let docs_path = tmp.path().join("documents.txt");
    let docs = vec![
        Document::new(0, "Category: a label people write in notes\nPricing tips follow here.", None),
        Document::new(1, "category: pricing", None),
        Document::new(2, "Compost food scraps.", Some("sustainability".into())),
    ];

    let built = retriever();
    built.create_index(docs)?;
    built.save(&index_path, &docs_path)?;

    let loaded = retriever();
    loaded.load(&index_path, &docs_path)?;
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.retrieve_documents("pricing tips", 3)?, built.retrieve_documents("pricing tips", 3)?);
    Ok(())
}

#[test]
fn misaligned_documents_fail_to_load() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let index_path = tmp.path().join("skillmentor.idx");
    let docs_path = tmp.path().join("documents.txt");
    let r = retriever();
    r.create_index_from_texts(&corpus())?;
    r.save(&index_path, &docs_path)?;

    std::fs::write(&docs_path, "a different corpus\n\nwith other records\n")?;
    let fresh = retriever();
    assert!(matches!(fresh.load(&index_path, &docs_path), Err(Error::Storage(_))));
    assert!(!fresh.is_ready());

    let opened = Retriever::open(Arc::new(HashingEmbedder::new(256)), &index_path, &docs_path);
    assert!(!opened.is_ready());
    Ok(())
}

#[test]
fn missing_files_open_uninitialized() {
    let tmp = tempfile::tempdir().unwrap();
    let r = Retriever::open(Arc::new(HashingEmbedder::new(256)), &tmp.path().join("nope.idx"), &tmp.path().join("nope.txt"));
    assert!(!r.is_ready());
    assert!(matches!(VectorIndex::load(&tmp.path().join("nope.idx")), Err(Error::Storage(_))));
}
