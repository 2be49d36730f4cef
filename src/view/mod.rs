//! View models built from server records. The controller only stores these;
//! drawing them is left to `app::ui` and the HTML report.

pub mod html;

use crate::upload::{EvaluationRecord, RedactedFile};

/// Suffix the server appends to the text produced for each document.
pub const REDACTED_SUFFIX: &str = "_redacted.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// A `(Page N)` marker, kept verbatim.
    PageRef(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationCard {
    pub title: String,
    /// Evaluation HTML as the server sent it.
    pub body: String,
    /// The body flattened to text and split around page markers.
    pub segments: Vec<Segment>,
}

impl EvaluationCard {
    pub fn from_record(record: &EvaluationRecord) -> Self {
        Self {
            title: strip_redacted_suffix(&record.document).to_string(),
            body: record.evaluation.clone(),
            segments: highlight_page_refs(&html::to_plain_text(&record.evaluation)),
        }
    }

    #[cfg(test)]
    pub fn page_refs(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::PageRef(marker) => Some(marker.as_str()),
            Segment::Text(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedLink {
    pub label: String,
    pub file: RedactedFile,
}

impl From<RedactedFile> for RedactedLink {
    fn from(file: RedactedFile) -> Self {
        Self {
            label: file.document.clone(),
            file,
        }
    }
}

/// An HTML fragment from the server, plus the cells we could read out of
/// it for native display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFragment {
    pub html: String,
    pub rows: Vec<Vec<String>>,
}

impl TableFragment {
    /// `None` for absent or blank fragments.
    pub fn from_optional(fragment: Option<&str>) -> Option<Self> {
        let fragment = fragment?.trim();
        if fragment.is_empty() {
            return None;
        }
        Some(Self {
            html: fragment.to_string(),
            rows: html::extract_table_rows(fragment),
        })
    }
}

pub fn strip_redacted_suffix(document: &str) -> &str {
    document.strip_suffix(REDACTED_SUFFIX).unwrap_or(document)
}

/// Splits plain `text` around every `(Page N)` marker, where N is one or
/// more ASCII digits. Callers pass text content, never raw markup.
pub fn highlight_page_refs(text: &str) -> Vec<Segment> {
    const OPEN: &str = "(Page ";

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(OPEN) {
        let start = cursor + offset;
        let digits_start = start + OPEN.len();
        let digits_len = text[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        let close = digits_start + digits_len;

        if digits_len > 0 && text[close..].starts_with(')') {
            if start > plain_start {
                segments.push(Segment::Text(text[plain_start..start].to_string()));
            }
            segments.push(Segment::PageRef(text[start..=close].to_string()));
            plain_start = close + 1;
            cursor = plain_start;
        } else {
            cursor = start + 1;
        }
    }

    if plain_start < text.len() {
        segments.push(Segment::Text(text[plain_start..].to_string()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(document: &str, evaluation: &str) -> EvaluationRecord {
        EvaluationRecord {
            document: document.to_string(),
            evaluation: evaluation.to_string(),
        }
    }

    #[test]
    fn card_title_drops_redacted_suffix() {
        let card = EvaluationCard::from_record(&record("x_redacted.txt", "(Page 1) ok"));
        assert_eq!(card.title, "x");
        assert_eq!(
            card.segments,
            vec![
                Segment::PageRef("(Page 1)".to_string()),
                Segment::Text(" ok".to_string()),
            ]
        );
    }

    #[test]
    fn titles_without_suffix_are_kept() {
        assert_eq!(strip_redacted_suffix("tender.pdf"), "tender.pdf");
        assert_eq!(strip_redacted_suffix("a_redacted.txt.bak"), "a_redacted.txt.bak");
    }

    #[test]
    fn every_page_number_is_highlighted() {
        for page in [0u32, 3, 12, 4096] {
            let text = format!("Pricing is clear (Page {page}) and complete.");
            let segments = highlight_page_refs(&text);
            assert_eq!(
                segments,
                vec![
                    Segment::Text("Pricing is clear ".to_string()),
                    Segment::PageRef(format!("(Page {page})")),
                    Segment::Text(" and complete.".to_string()),
                ]
            );
        }
    }

    #[test]
    fn incomplete_markers_stay_plain() {
        let text = "(Page ) (Page x) (Page 7 (Pages 2) (Page 9)";
        let card = EvaluationCard::from_record(&record("d", text));
        assert_eq!(card.page_refs().collect::<Vec<_>>(), vec!["(Page 9)"]);
        assert_eq!(
            card.segments[0],
            Segment::Text("(Page ) (Page x) (Page 7 (Pages 2) ".to_string())
        );
    }

    #[test]
    fn adjacent_markers_and_multibyte_text() {
        let segments = highlight_page_refs("⭐ (Page 1)(Page 2)📌");
        assert_eq!(
            segments,
            vec![
                Segment::Text("⭐ ".to_string()),
                Segment::PageRef("(Page 1)".to_string()),
                Segment::PageRef("(Page 2)".to_string()),
                Segment::Text("📌".to_string()),
            ]
        );
        assert!(highlight_page_refs("").is_empty());
    }

    #[test]
    fn blank_table_fragments_are_skipped() {
        assert!(TableFragment::from_optional(None).is_none());
        assert!(TableFragment::from_optional(Some("  \n ")).is_none());
        let table = TableFragment::from_optional(Some("<table><tr><td>1</td></tr></table>"))
            .unwrap();
        assert_eq!(table.rows, vec![vec!["1".to_string()]]);
    }
}
