use super::{highlight_page_refs, EvaluationCard, Segment, TableFragment};
use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Node, Selector};

pub const PAGE_REF_CLASS: &str = "page-ref";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "table", "tr", "ul", "ol", "pre", "blockquote", "h1", "h2", "h3", "h4", "h5",
    "h6",
];

fn skipped(name: &str) -> bool {
    matches!(name, "script" | "style")
}

fn line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Flattens an evaluation's HTML into readable text: block elements become
/// line breaks, list items get a bullet, entities are decoded by the parser.
pub fn to_plain_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let mut out = String::with_capacity(fragment.len());
    push_children_text(parsed.root_element(), &mut out);
    out
}

fn push_children_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_element_text(child, out);
                }
            }
            _ => {}
        }
    }
}

fn push_element_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if skipped(name) {
        return;
    }
    let breaks = name == "li" || BLOCK_ELEMENTS.contains(&name);

    if breaks {
        line_break(out);
    }
    if name == "li" {
        out.push_str("• ");
    }
    push_children_text(element, out);
    if breaks {
        line_break(out);
    }
    if matches!(name, "td" | "th") {
        out.push('\t');
    }
}

/// Reads cell text out of every `<tr>` in a table fragment.
pub fn extract_table_rows(fragment: &str) -> Vec<Vec<String>> {
    let Ok(row_selector) = Selector::parse("tr") else {
        return Vec::new();
    };
    let parsed = Html::parse_fragment(fragment);

    parsed
        .select(&row_selector)
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(cell_text)
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let text: String = cell.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Re-serializes server HTML with every `(Page N)` found in a text node
/// wrapped in a `page-ref` span. Attribute values and tag names are never
/// rewritten. Scripts and styles are dropped.
pub fn highlight_markup(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let mut out = String::with_capacity(fragment.len());
    push_children_markup(parsed.root_element(), &mut out);
    out
}

fn push_children_markup(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_highlighted(text, out),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_element_markup(child, out);
                }
            }
            _ => {}
        }
    }
}

fn push_element_markup(element: ElementRef<'_>, out: &mut String) {
    let tag = element.value();
    let name = tag.name();
    if skipped(name) {
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, value) in tag.attrs() {
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    push_children_markup(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn push_highlighted(text: &str, out: &mut String) {
    for segment in highlight_page_refs(text) {
        match segment {
            Segment::Text(text) => out.push_str(&encode_text(&text)),
            Segment::PageRef(marker) => out.push_str(&format!(
                "<span class=\"{}\">{}</span>",
                PAGE_REF_CLASS,
                encode_text(&marker)
            )),
        }
    }
}

/// Card markup. The title is escaped; the body is the server HTML with its
/// page markers highlighted.
pub fn card_html(card: &EvaluationCard) -> String {
    format!(
        "<div class=\"card\">\n<div class=\"card-header\"><h3>{}</h3></div>\n<div class=\"card-body\">{}</div>\n</div>\n",
        encode_text(&card.title),
        highlight_markup(&card.body)
    )
}

const REPORT_STYLE: &str = "body{font-family:sans-serif;margin:2rem;max-width:960px}\
.card{border:1px solid #ddd;border-radius:6px;margin-bottom:1.5rem}\
.card-header{background:#f4f0fa;padding:.5rem 1rem}\
.card-body{padding:1rem}\
.page-ref{background:#fff3a0;font-weight:bold;padding:0 2px}\
table{border-collapse:collapse;margin-bottom:1.5rem}\
td,th{border:1px solid #ccc;padding:4px 8px}";

/// Standalone page with every card and the optional tables.
pub fn render_report(
    cards: &[EvaluationCard],
    summary_table: Option<&TableFragment>,
    yes_no_table: Option<&TableFragment>,
) -> String {
    let mut page = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str("<title>Evaluation Results</title>\n");
    page.push_str(&format!("<style>{}</style>\n", REPORT_STYLE));
    page.push_str("</head>\n<body>\n<h2>Evaluation Results</h2>\n");

    for card in cards {
        page.push_str(&card_html(card));
    }
    if let Some(table) = summary_table {
        page.push_str("<h2>Evaluation Summary</h2>\n");
        page.push_str(&table.html);
        page.push('\n');
    }
    if let Some(table) = yes_no_table {
        page.push_str("<h2>Compliance Checklist</h2>\n");
        page.push_str(&table.html);
        page.push('\n');
    }

    page.push_str("</body>\n</html>\n");
    page
}
