use std::sync::Arc;

use skillmentor_text::{KeywordAnalyzer, QueryKey};

use crate::catalog::{AdviceCatalog, ADVICE_PLACEHOLDER};

const MIN_TERM_LEN: usize = 3;

/// Wraps plain advice in a response template and adds sector and closing
/// lines derived from the query.
///
/// Template and sector line are chosen from the query key, so asking the same
/// question again changes only the advice inside.
#[derive(Clone)]
pub struct Personalizer {
    catalog: Arc<AdviceCatalog>,
    analyzer: KeywordAnalyzer,
}

impl Personalizer {
    pub fn new(catalog: Arc<AdviceCatalog>) -> Self { Self { catalog, analyzer: KeywordAnalyzer::new(MIN_TERM_LEN) } }

    pub fn personalize(&self, advice: &str, query: &str) -> String {
        let key = QueryKey::from_query(query);
        let terms: Vec<String> = self
            .analyzer
            .tokens(query)
            .into_iter()
            .filter(|t| t.chars().count() >= MIN_TERM_LEN)
            .collect();

        let mut response = match self.catalog.templates.get(key.pick(self.catalog.templates.len().max(1))) {
            Some(template) => template.replace(ADVICE_PLACEHOLDER, advice),
            None => advice.to_string(),
        };
        if let Some(profile) = self.catalog.business.iter().find(|p| mentions(&terms, &p.markers)) {
            if let Some(line) = profile.lines.get(key.pick(profile.lines.len().max(1))) {
                response.push(' ');
                response.push_str(line);
            }
        }
        if let Some(closing) = self.catalog.closings.iter().find(|c| mentions(&terms, &c.terms)) {
            response.push(' ');
            response.push_str(&closing.text);
        }
        response
    }

    /// Sector detected in `query`, if any.
    pub fn business_type(&self, query: &str) -> Option<&str> {
        let terms: Vec<String> = self.analyzer.tokens(query).into_iter().filter(|t| t.chars().count() >= MIN_TERM_LEN).collect();
        self.catalog.business.iter().find(|p| mentions(&terms, &p.markers)).map(|p| p.name.as_str())
    }
}

fn mentions(terms: &[String], stems: &[String]) -> bool {
    terms.iter().any(|t| stems.iter().any(|s| t.starts_with(s.as_str())))
}
