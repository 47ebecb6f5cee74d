use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use skillmentor_core::traits::CompletionBackend;
use skillmentor_core::Category;

use crate::personalize::Personalizer;
use crate::selector::Advice;

/// Line that ends the prompt; the model's answer follows it.
pub const ADVICE_MARKER: &str = "YOUR ADVICE:";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Where the final advice text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceSource {
    /// Written by the completion backend.
    Backend,
    /// Top retrieved document plus a strategy from the advice pool.
    Document,
    /// Personalized advice from the pool alone.
    Rules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub text: String,
    pub source: AdviceSource,
    /// Pool advice the fallback was built from; `None` for backend answers.
    pub strategy: Option<Advice>,
}

/// Turns retrieved context and a category fallback into advice text.
///
/// Backend failures of any kind end in the rule-based path; `generate` never
/// fails.
pub struct Generator {
    backend: Option<Arc<dyn CompletionBackend>>,
    timeout: Duration,
    personalizer: Personalizer,
}

impl Generator {
    pub fn new(personalizer: Personalizer) -> Self { Self { backend: None, timeout: DEFAULT_TIMEOUT, personalizer } }

    pub fn with_backend(mut self, backend: Arc<dyn CompletionBackend>, timeout: Duration) -> Self {
        self.backend = Some(backend);
        self.timeout = timeout;
        self
    }

    /// Ask the backend first; `select` is only called when the answer has to
    /// come from the advice pool, so a backend answer leaves rotation untouched.
    pub async fn generate<F>(&self, query: &str, documents: &[String], category: Category, select: F) -> Generated
    where
        F: FnOnce() -> Advice,
    {
        if let Some(backend) = &self.backend {
            let prompt = build_prompt(query, documents, category);
            match tokio::time::timeout(self.timeout, backend.complete(&prompt)).await {
                Ok(Ok(raw)) => {
                    let text = extract_advice(&raw, &prompt);
                    if !text.is_empty() {
                        debug!(backend = backend.name(), chars = text.len(), "backend produced advice");
                        return Generated { text, source: AdviceSource::Backend, strategy: None };
                    }
                    warn!(backend = backend.name(), "backend returned empty advice; using fallback");
                }
                Ok(Err(e)) => warn!(backend = backend.name(), error = %e, "generation failed; using fallback"),
                Err(_) => warn!(backend = backend.name(), timeout_ms = self.timeout.as_millis() as u64, "generation timed out; using fallback"),
            }
        }
        self.fallback(query, documents, select())
    }

    /// Rule-based answer: the closest document with the pool advice attached,
    /// or the personalized pool advice when nothing was retrieved.
    pub fn fallback(&self, query: &str, documents: &[String], advice: Advice) -> Generated {
        let (text, source) = match documents.first().map(|d| d.trim()).filter(|d| !d.is_empty()) {
            Some(doc) => (format!("{}\n\nStrategy recommendation: {}", doc, advice.text), AdviceSource::Document),
            None => (self.personalizer.personalize(&advice.text, query), AdviceSource::Rules),
        };
        Generated { text, source, strategy: Some(advice) }
    }
}

pub fn build_prompt(query: &str, documents: &[String], category: Category) -> String {
    let context = if documents.is_empty() { "(no reference material found)".to_string() } else { documents.join("\n") };
    format!(
        "You are SkillMentor, an AI business advisor for micro-entrepreneurs in underserved communities.\n\
         Your goal is to provide actionable, sustainable business advice.\n\n\
         USER QUERY: {query}\n\
         TOPIC: {category}\n\n\
         RELEVANT CONTEXT:\n{context}\n\n\
         Provide a concise, practical response that:\n\
         1. Directly addresses the user's question\n\
         2. Incorporates sustainable business practices\n\
         3. Is actionable with limited resources\n\
         4. Considers local context and constraints\n\n\
         {ADVICE_MARKER}\n"
    )
}

/// The model's answer from raw backend output: text after the last advice
/// marker, otherwise the output minus any echoed prompt.
pub fn extract_advice(raw: &str, prompt: &str) -> String {
    if let Some(pos) = raw.rfind(ADVICE_MARKER) {
        return raw[pos + ADVICE_MARKER.len()..].trim().to_string();
    }
    raw.strip_prefix(prompt.trim_end()).unwrap_or(raw).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_follows_the_last_marker() {
        let prompt = build_prompt("How do I sell more?", &[], Category::Marketing);
        let echoed = format!("{}  Join the weekly market.  ", prompt);
        assert_eq!(extract_advice(&echoed, &prompt), "Join the weekly market.");
        assert_eq!(extract_advice("Plain answer", &prompt), "Plain answer");
        assert_eq!(extract_advice("YOUR ADVICE:   ", &prompt), "");
    }

    #[test]
    fn prompt_lists_context_and_ends_with_marker() {
        let prompt = build_prompt("q", &["doc one".into(), "doc two".into()], Category::Pricing);
        assert!(prompt.contains("doc one\ndoc two"));
        assert!(prompt.contains("TOPIC: pricing"));
        assert!(prompt.trim_end().ends_with(ADVICE_MARKER));
    }
}
