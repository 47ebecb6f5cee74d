use skillmentor_core::config::EmbeddingSettings;
use skillmentor_core::traits::Embedder;
use skillmentor_embed::{default_embedder, HashingEmbedder};

fn dot(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

#[test]
fn fake_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { use_fake: true, dim: 256, ..EmbeddingSettings::default() };
    let embedder = default_embedder(&settings).expect("embedder");
    let texts = vec!["hello world".to_string(), "Hello, WORLD".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");

    assert_eq!(embedder.dim(), 256);
    assert_eq!(embs[0].len(), 256, "embedding dim follows settings");

    let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Case and punctuation do not change the tokens
    for (a, b) in embs[0].iter().zip(embs[1].iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn shared_words_score_closer() {
    let embedder = HashingEmbedder::new(512);
    let query = embedder.embed_text("reduce textile waste");
    let related = embedder.embed_text("Textile businesses can reduce waste by upcycling offcuts");
    let unrelated = embedder.embed_text("Charm pricing ends prices with .99");
    assert!(dot(&query, &related) > dot(&query, &unrelated));
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let v = HashingEmbedder::new(8).embed_text("  ...  ");
    assert!(v.iter().all(|x| *x == 0.0));
}
