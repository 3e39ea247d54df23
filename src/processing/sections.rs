//! Splits an aggregated summary into its four fixed sections.
//!
//! The summary prompt asks the model for four emoji-tagged headers. Output is not schema
//! validated, so parsing is lenient: headers are recognized by their icon (with or without the
//! emoji variation selector) or by a bold title, and text before the first header is kept in
//! `unsectioned`. Multi-chunk summaries repeat the headers; repeated sections are appended in
//! chunk order.

use serde::Serialize;

/// One of the four fixed summary sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Short plain-language overview.
    Summary,
    /// Most important terms.
    KeyPoints,
    /// Risks, responsibilities, and red flags.
    Risks,
    /// What the reader should watch for or clarify.
    Guidance,
}

impl SectionKind {
    /// All sections in display order.
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Summary,
        SectionKind::KeyPoints,
        SectionKind::Risks,
        SectionKind::Guidance,
    ];

    /// Emoji tag without variation selector.
    pub fn icon(self) -> &'static str {
        match self {
            SectionKind::Summary => "📌",
            SectionKind::KeyPoints => "✅",
            SectionKind::Risks => "⚖",
            SectionKind::Guidance => "💡",
        }
    }

    /// Header title as requested from the model.
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Summary => "Simple Summary",
            SectionKind::KeyPoints => "Key Points",
            SectionKind::Risks => "Risks & Obligations",
            SectionKind::Guidance => "Practical Guidance",
        }
    }

    /// Full header line, e.g. `📌 **Simple Summary**`.
    pub fn header(self) -> String {
        let selector = if self == SectionKind::Risks { "\u{fe0f}" } else { "" };
        format!("{}{selector} **{}**", self.icon(), self.title())
    }
}

/// Summary text grouped by section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummarySections {
    /// Plain-language overview paragraphs joined by blank lines.
    pub summary: String,
    /// Key point items.
    pub key_points: Vec<String>,
    /// Risk and obligation items.
    pub risks: Vec<String>,
    /// Practical guidance items.
    pub guidance: Vec<String>,
    /// Text outside any recognized section, such as a non-legal classification note.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unsectioned: String,
}

impl SummarySections {
    /// Whether no section received any content.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.key_points.is_empty()
            && self.risks.is_empty()
            && self.guidance.is_empty()
            && self.unsectioned.is_empty()
    }

    fn items_mut(&mut self, kind: SectionKind) -> Option<&mut Vec<String>> {
        match kind {
            SectionKind::Summary => None,
            SectionKind::KeyPoints => Some(&mut self.key_points),
            SectionKind::Risks => Some(&mut self.risks),
            SectionKind::Guidance => Some(&mut self.guidance),
        }
    }
}

/// Parse summary text into sections.
pub fn parse_sections(text: &str) -> SummarySections {
    let mut sections = SummarySections::default();
    let mut summary = Paragraphs::default();
    let mut unsectioned = Paragraphs::default();
    let mut current: Option<SectionKind> = None;

    for line in text.lines() {
        if let Some((kind, remainder)) = match_header(line) {
            summary.break_paragraph();
            unsectioned.break_paragraph();
            current = Some(kind);
            if !remainder.is_empty() {
                push_line(&mut sections, &mut summary, kind, remainder);
            }
            continue;
        }

        match current {
            None if line.trim().is_empty() => unsectioned.break_paragraph(),
            None => unsectioned.push(line.trim()),
            Some(SectionKind::Summary) if line.trim().is_empty() => summary.break_paragraph(),
            Some(kind) => push_line(&mut sections, &mut summary, kind, line),
        }
    }

    sections.summary = summary.finish();
    sections.unsectioned = unsectioned.finish();
    sections
}

fn push_line(
    sections: &mut SummarySections,
    summary: &mut Paragraphs,
    kind: SectionKind,
    line: &str,
) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }
    match sections.items_mut(kind) {
        Some(items) => items.push(strip_list_marker(trimmed).to_string()),
        None => summary.push(trimmed),
    }
}

/// Recognize a header line, returning its section and any content following the title.
fn match_header(line: &str) -> Option<(SectionKind, &str)> {
    let trimmed = line.trim_start_matches(|c: char| {
        c == '#' || c == '.' || c == ')' || c.is_whitespace() || c.is_ascii_digit()
    });

    for kind in SectionKind::ALL {
        if let Some(rest) = trimmed.strip_prefix(kind.icon()) {
            // An icon alone is a bullet; a header needs a bold span or the title after it.
            let rest = rest.trim_start_matches('\u{fe0f}').trim_start();
            if rest.starts_with("**") || starts_with_ignore_case(rest, kind.title()) {
                return Some((kind, after_title(rest, kind.title())));
            }
            return None;
        }
    }

    if trimmed.starts_with("**") {
        let unstarred = trimmed.trim_start_matches('*');
        for kind in SectionKind::ALL {
            if starts_with_ignore_case(unstarred, kind.title()) {
                return Some((kind, after_title(trimmed, kind.title())));
            }
        }
    }

    None
}

/// Strip the bold span (or the plain title), then any separator punctuation.
fn after_title<'a>(rest: &'a str, title: &str) -> &'a str {
    let rest = if let Some(bold) = rest.strip_prefix("**") {
        bold.find("**").map_or(bold, |end| &bold[end + 2..])
    } else if starts_with_ignore_case(rest, title) {
        &rest[title.len()..]
    } else {
        rest
    };
    rest.trim_start_matches('*')
        .trim_start_matches(|c: char| matches!(c, ':' | '-' | '–' | '—') || c.is_whitespace())
        .trim_end()
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn strip_list_marker(line: &str) -> &str {
    for kind in SectionKind::ALL {
        if let Some(rest) = line.strip_prefix(kind.icon()) {
            return rest.trim_start_matches('\u{fe0f}').trim_start();
        }
    }
    for marker in ["- ", "* ", "• ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim_start();
        }
    }
    line
}

#[derive(Default)]
struct Paragraphs {
    done: Vec<String>,
    open: Vec<String>,
}

impl Paragraphs {
    fn push(&mut self, line: &str) {
        self.open.push(line.to_string());
    }

    fn break_paragraph(&mut self) {
        if !self.open.is_empty() {
            self.done.push(self.open.join("\n"));
            self.open.clear();
        }
    }

    fn finish(mut self) -> String {
        self.break_paragraph();
        self.done.join("\n\n")
    }
}
