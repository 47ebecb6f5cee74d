use std::collections::HashSet;
use std::sync::Arc;

use skillmentor_advice::{AdviceCatalog, AdviceMemory, AdviceSelector, CategoryClassifier};
use skillmentor_core::{Category, Error};
use skillmentor_text::QueryKey;

fn selector(seed: u64) -> AdviceSelector {
    AdviceSelector::with_seed(Arc::new(AdviceCatalog::builtin()), Arc::new(AdviceMemory::new()), seed).unwrap()
}

#[test]
fn pricing_question_routes_to_pricing() {
    let classifier = CategoryClassifier::default();
    assert_eq!(classifier.classify("How should I price my wooden chairs?"), Category::Pricing);
    let scores = classifier.score("How should I price my wooden chairs?");
    assert_eq!(scores.get(Category::Pricing), 5);
    assert_eq!(scores.get(Category::General), 1);
}

#[test]
fn textile_waste_routes_to_sustainability() {
    let classifier = CategoryClassifier::default();
    assert_eq!(classifier.classify("How can I reduce waste in my textile business?"), Category::Sustainability);
}

#[test]
fn unmatched_questions_fall_back_to_general() {
    let classifier = CategoryClassifier::default();
    assert_eq!(classifier.classify("Where do I even start?"), Category::General);
    assert_eq!(classifier.classify(""), Category::General);
    assert_eq!(classifier.classify("How do I find customers on Instagram?"), Category::Marketing);
}

#[test]
fn rotation_visits_every_entry_before_repeating() {
    let selector = selector(7);
    let key = QueryKey::from_query("How can I reduce waste in my textile business?");
    let pool_len = selector.catalog().pool(Category::Sustainability).len();

    let mut seen = HashSet::new();
    for i in 0..pool_len {
        let advice = selector.select(Category::Sustainability, key);
        assert!(!advice.rotation_reset);
        assert!(seen.insert(advice.index), "index {} repeated at pick {}", advice.index, i);
        assert_eq!(advice.text, selector.catalog().pool(Category::Sustainability)[advice.index]);
    }
    assert_eq!(seen.len(), pool_len);

    let next = selector.select(Category::Sustainability, key);
    assert!(next.rotation_reset);
    assert_eq!(selector.memory().used(key, Category::Sustainability), vec![next.index]);
}

#[test]
fn repeated_query_gets_distinct_sustainability_advice() {
    let classifier = CategoryClassifier::default();
    let selector = selector(11);
    let query = "How can I reduce waste in my textile business?";
    let category = classifier.classify(query);
    let key = QueryKey::from_query(query);
    let first = selector.select(category, key);
    let second = selector.select(category, QueryKey::from_query("how can i reduce   waste in my textile business?"));
    assert_eq!(first.category, Category::Sustainability);
    assert!(selector.catalog().pool(Category::Sustainability).contains(&second.text));
    assert_ne!(first.text, second.text);
}

#[test]
fn keys_and_categories_rotate_independently() {
    let selector = selector(3);
    let a = QueryKey::from_query("question a");
    let b = QueryKey::from_query("question b");
    selector.select(Category::General, a);
    selector.select(Category::General, a);
    selector.select(Category::Pricing, a);
    assert_eq!(selector.memory().used(a, Category::General).len(), 2);
    assert_eq!(selector.memory().used(a, Category::Pricing).len(), 1);
    assert!(selector.memory().used(b, Category::General).is_empty());

    selector.memory().clear();
    assert!(selector.memory().used(a, Category::General).is_empty());
}

#[test]
fn same_seed_same_sequence() {
    let key = QueryKey::from_query("same");
    let a: Vec<usize> = (0..5).map({ let s = selector(42); move |_| s.select(Category::Marketing, key).index }).collect();
    let b: Vec<usize> = (0..5).map({ let s = selector(42); move |_| s.select(Category::Marketing, key).index }).collect();
    assert_eq!(a, b);
}

#[test]
fn concurrent_selects_never_repeat_within_a_rotation() {
    let selector = Arc::new(selector(5));
    let key = QueryKey::from_query("shared question");
    let handles: Vec<_> = (0..9)
        .map(|_| {
            let s = Arc::clone(&selector);
            std::thread::spawn(move || s.select(Category::Production, key).index)
        })
        .collect();
    let picked: HashSet<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(picked.len(), 9);
}

#[test]
fn empty_pool_is_rejected_at_construction() {
    let mut catalog = AdviceCatalog::builtin();
    catalog.pools.insert(Category::Production, Vec::new());
    let err = AdviceSelector::with_seed(Arc::new(catalog), Arc::new(AdviceMemory::new()), 1).err().unwrap();
    assert!(matches!(err, Error::InvalidConfig(_)));
}
