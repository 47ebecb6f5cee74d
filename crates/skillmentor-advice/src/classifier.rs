use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use skillmentor_core::Category;
use skillmentor_text::KeywordAnalyzer;

const KEYWORD_WEIGHT: u32 = 2;
const TRIGGER_BONUS: u32 = 3;
const GENERAL_BASELINE: u32 = 1;
const TRIGGER_WORD: &str = "how";

/// Keyword and trigger-stem tables for the four topical categories.
#[derive(Debug, Clone)]
pub struct KeywordTables {
    keywords: HashMap<String, Category>,
    triggers: Vec<(Category, Vec<String>)>,
}

impl KeywordTables {
    /// `tables` are consulted in order; a word listed under several
    /// categories belongs to the first.
    pub fn new(tables: Vec<(Category, Vec<String>)>, triggers: Vec<(Category, Vec<String>)>) -> Self {
        let mut keywords = HashMap::new();
        for (category, words) in tables {
            for word in words { keywords.entry(word.to_lowercase()).or_insert(category); }
        }
        Self { keywords, triggers }
    }

    pub fn builtin() -> Self {
        let tables = KEYWORDS.iter().map(|(c, words)| (*c, words.iter().map(|w| w.to_string()).collect())).collect();
        let triggers = TRIGGERS.iter().map(|(c, stems)| (*c, stems.iter().map(|s| s.to_string()).collect())).collect();
        Self::new(tables, triggers)
    }

    /// Exact match first, then the singular form of a plural.
    pub fn category_of(&self, keyword: &str) -> Option<Category> {
        self.keywords
            .get(keyword)
            .or_else(|| keyword.strip_suffix('s').and_then(|stem| self.keywords.get(stem)))
            .copied()
    }

    /// Categories with at least one trigger stem that starts some token.
    pub fn triggered<'a>(&'a self, tokens: &'a [String]) -> impl Iterator<Item = Category> + 'a {
        self.triggers
            .iter()
            .filter(|(_, stems)| tokens.iter().any(|t| stems.iter().any(|s| t.starts_with(s.as_str()))))
            .map(|(c, _)| *c)
    }
}

impl Default for KeywordTables {
    fn default() -> Self { Self::builtin() }
}

/// Accumulated score per category for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CategoryScores([u32; 5]);

impl CategoryScores {
    pub fn get(&self, category: Category) -> u32 { self.0[slot(category)] }

    fn add(&mut self, category: Category, points: u32) { self.0[slot(category)] += points; }

    /// Highest score wins, earlier categories win ties, and nothing above the
    /// baseline means `General`.
    pub fn winner(&self) -> Category {
        let mut best = Category::General;
        let mut best_score = 0;
        for category in Category::ALL {
            let score = self.get(category);
            if score > best_score { best = category; best_score = score; }
        }
        if best_score <= GENERAL_BASELINE { Category::General } else { best }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ { Category::ALL.into_iter().map(|c| (c, self.get(c))) }
}

fn slot(category: Category) -> usize {
    match category {
        Category::Pricing => 0,
        Category::Marketing => 1,
        Category::Sustainability => 2,
        Category::Production => 3,
        Category::General => 4,
    }
}

/// Routes a query to an advice category by keyword scoring.
#[derive(Clone)]
pub struct CategoryClassifier {
    analyzer: KeywordAnalyzer,
    tables: KeywordTables,
}

impl CategoryClassifier {
    pub fn new(analyzer: KeywordAnalyzer, tables: KeywordTables) -> Self { Self { analyzer, tables } }

    pub fn with_min_keyword_len(min_len: usize) -> Self { Self::new(KeywordAnalyzer::new(min_len), KeywordTables::builtin()) }

    pub fn score(&self, query: &str) -> CategoryScores {
        let mut scores = CategoryScores::default();
        scores.add(Category::General, GENERAL_BASELINE);
        for keyword in self.analyzer.keywords(query) {
            if let Some(category) = self.tables.category_of(&keyword) { scores.add(category, KEYWORD_WEIGHT); }
        }
        let tokens = self.analyzer.tokens(query);
        if tokens.iter().any(|t| t == TRIGGER_WORD) {
            for category in self.tables.triggered(&tokens) { scores.add(category, TRIGGER_BONUS); }
        }
        scores
    }

    pub fn classify(&self, query: &str) -> Category {
        let scores = self.score(query);
        let category = scores.winner();
        debug!(%category, ?scores, "classified query");
        category
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self { Self::new(KeywordAnalyzer::default(), KeywordTables::builtin()) }
}

const KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Pricing, &[
        "price", "pricing", "cost", "charge", "profit", "margin", "worth", "expensive", "cheap", "afford", "value",
        "discount", "money", "financial", "income", "revenue", "earning", "dollar", "rupee", "sale", "budget",
    ]),
    (Category::Marketing, &[
        "market", "sell", "customer", "promote", "advertise", "publicity", "brand", "client", "social", "media",
        "facebook", "instagram", "platform", "audience", "target", "position", "visibility", "display", "showcase",
    ]),
    (Category::Sustainability, &[
        "sustain", "environment", "eco", "green", "waste", "recycle", "reuse", "carbon", "footprint", "natural",
        "organic", "renewable", "biodegradable", "impact", "conservation", "preserve", "energy", "efficient",
        "climate", "friendly",
    ]),
    (Category::Production, &[
        "product", "quality", "improve", "make", "create", "production", "manufacture", "craft", "skill",
        "technique", "process", "material", "supply", "chain", "inventory", "design", "equipment", "tool",
        "efficiency", "output", "workshop",
    ]),
];

const TRIGGERS: &[(Category, &[&str])] = &[
    (Category::Pricing, &["price"]),
    (Category::Marketing, &["market", "sell"]),
    (Category::Sustainability, &["sustainab", "eco", "waste", "recycl"]),
    (Category::Production, &["make", "produc"]),
];
