use serde::Deserialize;

/// `?search=` query parameter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    pub fn terms(&self) -> SearchTerms {
        SearchTerms::parse(self.search.as_deref().unwrap_or(""))
    }
}

/// Search input split on whitespace and commas. Every term must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms(Vec<String>);

impl SearchTerms {
    pub fn parse(raw: &str) -> Self {
        let terms = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();
        Self(terms)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    /// Case-insensitive substring match of every term
    pub fn matches(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        self.0.iter().all(|term| value.contains(term.as_str()))
    }

    /// ILIKE patterns with LIKE metacharacters escaped
    pub fn like_patterns(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|term| format!("%{}%", escape_like(term)))
            .collect()
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_commas() {
        let terms = SearchTerms::parse("  Leo, tol  ");
        assert_eq!(terms.terms(), &["leo".to_string(), "tol".to_string()]);
        assert!(SearchTerms::parse(" , ").is_empty());
    }

    #[test]
    fn every_term_must_match() {
        let terms = SearchTerms::parse("leo tol");
        assert!(terms.matches("LeoTolstoy"));
        assert!(!terms.matches("leo"));
        assert!(SearchTerms::default().matches("anything"));
    }

    #[test]
    fn escapes_like_metacharacters() {
        let terms = SearchTerms::parse("50%_off");
        assert_eq!(terms.like_patterns(), vec!["%50\\%\\_off%".to_string()]);
    }
}
