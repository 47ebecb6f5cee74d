use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

/// Common English function words ignored when extracting keywords.
pub const STOP_WORDS: &[&str] = &[
	"i","me","my","myself","we","our","ours","ourselves","you","your","yours","yourself","yourselves",
	"he","him","his","himself","she","her","hers","herself","it","its","itself","they","them","their",
	"theirs","themselves","what","which","who","whom","this","that","these","those","am","is","are",
	"was","were","be","been","being","have","has","had","having","do","does","did","doing","a","an",
	"the","and","but","if","or","because","as","until","while","of","at","by","for","with","about",
	"against","between","into","through","during","before","after","above","below","to","from","up",
	"down","in","out","on","off","over","under","again","further","then","once","here","there","when",
	"where","why","how","all","any","both","each","few","more","most","other","some","such","no","nor",
	"not","only","own","same","so","than","too","very","s","t","can","will","just","don","should","now",
];

const MAX_TOKEN_LEN: usize = 40;

/// Splits query text into lower-cased alphanumeric tokens.
///
/// `tokens` keeps every word; `keywords` additionally drops stopwords and
/// anything shorter than `min_len` characters.
#[derive(Clone)]
pub struct KeywordAnalyzer {
	plain: TextAnalyzer,
	keywords: TextAnalyzer,
	min_len: usize,
}

impl KeywordAnalyzer {
	pub fn new(min_len: usize) -> Self {
		let plain = TextAnalyzer::builder(SimpleTokenizer::default())
			.filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
			.filter(LowerCaser)
			.build();
		let keywords = TextAnalyzer::builder(SimpleTokenizer::default())
			.filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
			.filter(LowerCaser)
			.filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
			.build();
		Self { plain, keywords, min_len }
	}

	pub fn tokens(&self, text: &str) -> Vec<String> {
		let mut analyzer = self.plain.clone();
		collect(&mut analyzer, text)
	}

	pub fn keywords(&self, text: &str) -> Vec<String> {
		let mut analyzer = self.keywords.clone();
		collect(&mut analyzer, text)
			.into_iter()
			.filter(|t| t.chars().count() >= self.min_len)
			.collect()
	}
}

impl Default for KeywordAnalyzer {
	fn default() -> Self { Self::new(4) }
}

fn collect(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut stream = analyzer.token_stream(text);
	let mut out = Vec::new();
	while stream.advance() { out.push(stream.token().text.clone()); }
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keywords_drop_stopwords_and_short_words() {
		let analyzer = KeywordAnalyzer::new(4);
		assert_eq!(analyzer.keywords("How should I price my wooden chairs?"), vec!["price", "wooden", "chairs"]);
		assert_eq!(analyzer.tokens("How CAN I"), vec!["how", "can", "i"]);
	}
}
