use skillmentor_text::{normalize_query, KeywordAnalyzer, QueryKey};

#[test]
fn key_ignores_case_and_spacing() {
    let a = QueryKey::from_query("How can I reduce waste?");
    let b = QueryKey::from_query("  how   CAN i\treduce waste?  ");
    assert_eq!(a, b);
    assert_ne!(a, QueryKey::from_query("How can I reduce waste"));
    assert_eq!(normalize_query("  A \n b "), "a b");
}

#[test]
fn pick_stays_in_range() {
    let key = QueryKey::from_query("pricing question");
    for len in 1..20 {
        assert!(key.pick(len) < len);
    }
    assert_eq!(key.pick(7), key.pick(7));
}

#[test]
fn punctuation_splits_tokens() {
    let analyzer = KeywordAnalyzer::new(4);
    assert_eq!(analyzer.keywords("eco-friendly packaging, recycled!"), vec!["friendly", "packaging", "recycled"]);
    assert_eq!(analyzer.tokens("eco-friendly"), vec!["eco", "friendly"]);
}
