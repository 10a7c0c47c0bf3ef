use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Source-specific extras. The index never looks at these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocKind {
    #[default]
    Generic,
    Reddit {
        #[serde(default)]
        comments: Option<u32>,
    },
    Arxiv {
        #[serde(default)]
        co_authors: Vec<String>,
    },
}

impl DocKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocKind::Generic => "document",
            DocKind::Reddit { .. } => "reddit",
            DocKind::Arxiv { .. } => "arxiv",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Free-form date as delivered by the source (ISO 8601 or a unix timestamp).
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: DocKind,
}

impl Document {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { title: title.into(), text: text.into(), ..Self::default() }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_kind(mut self, kind: DocKind) -> Self {
        self.kind = kind;
        self
    }

    /// Author as shown to users: arXiv co-authors comma-joined, otherwise `author`.
    pub fn author_line(&self) -> String {
        match &self.kind {
            DocKind::Arxiv { co_authors } if !co_authors.is_empty() => co_authors.join(", "),
            _ => self.author.clone(),
        }
    }

    /// Individual author names; empty names are left out.
    pub fn authors(&self) -> Vec<&str> {
        let names: Vec<&str> = match &self.kind {
            DocKind::Arxiv { co_authors } if !co_authors.is_empty() => {
                co_authors.iter().map(String::as_str).collect()
            }
            _ => vec![self.author.as_str()],
        };
        names.into_iter().map(str::trim).filter(|n| !n.is_empty()).collect()
    }

    /// `date` as seconds since the epoch. Accepts a numeric timestamp or RFC 3339;
    /// anything else counts as 0.
    pub fn timestamp(&self) -> f64 {
        let date = self.date.trim();
        if let Ok(secs) = date.parse::<f64>() {
            return if secs.is_finite() { secs } else { 0.0 };
        }
        OffsetDateTime::parse(date, &Rfc3339)
            .map(|dt| dt.unix_timestamp_nanos() as f64 / 1e9)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arxiv_author_line_joins_co_authors() {
        let doc = Document::new("Attention", "transformers")
            .with_kind(DocKind::Arxiv { co_authors: vec!["Vaswani".into(), "Shazeer".into()] });
        assert_eq!(doc.author_line(), "Vaswani, Shazeer");
        assert_eq!(Document::new("t", "x").with_author("bob").author_line(), "bob");
    }

    #[test]
    fn timestamps_from_numbers_and_rfc3339() {
        assert_eq!(Document::default().with_date("1700000000.5").timestamp(), 1_700_000_000.5);
        assert_eq!(Document::default().with_date("1970-01-02T00:00:00Z").timestamp(), 86_400.0);
        assert_eq!(Document::default().with_date("2020-01-01T01:00:00+01:00").timestamp(), 1_577_836_800.0);
        assert_eq!(Document::default().with_date("yesterday").timestamp(), 0.0);
        assert_eq!(Document::default().with_date("NaN").timestamp(), 0.0);
        assert_eq!(Document::default().timestamp(), 0.0);
    }

    #[test]
    fn authors_split_co_authors_and_skip_blanks() {
        let paper = Document::default().with_kind(DocKind::Arxiv { co_authors: vec!["a".into(), " b ".into()] });
        assert_eq!(paper.authors(), vec!["a", "b"]);
        assert!(Document::default().authors().is_empty());
    }

    #[test]
    fn kind_is_tagged_and_defaults_to_generic() {
        let doc: Document = serde_json::from_str(r#"{"title":"a","text":"b"}"#).unwrap();
        assert_eq!(doc.kind, DocKind::Generic);

        let doc: Document =
            serde_json::from_str(r#"{"text":"b","kind":{"type":"reddit","comments":12}}"#).unwrap();
        assert_eq!(doc.kind, DocKind::Reddit { comments: Some(12) });
        assert_eq!(doc.kind.label(), "reddit");
    }
}
