pub const REPORT_PATH: &str = "/report/report.html";
pub const LOAD_ERROR_TEXT: &str = "Error loading report";
pub const TREND_CANVAS_ID: &str = "evolutionChart";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: &'static str,
    pub value: f32,
}

pub const TREND_LABEL: &str = "Max Diameter (cm)";
pub const TREND_X_TITLE: &str = "Scan Date";
pub const TREND_Y_TITLE: &str = "Diameter (cm)";
pub const TREND_POINTS: [TrendPoint; 3] = [
    TrendPoint {
        date: "2025-02-27",
        value: 0.74,
    },
    TrendPoint {
        date: "2025-03-24",
        value: 0.74,
    },
    TrendPoint {
        date: "2025-04-18",
        value: 1.05,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBlock {
    Heading { level: u8, text: String },
    Paragraph(String),
    ListItem(String),
    TableRow(Vec<String>),
    /// Site-absolute image, fetched through the asset source.
    Image { src: String, alt: String },
    TrendChart,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportDocument {
    pub blocks: Vec<ReportBlock>,
}

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "head", "noscript", "template"];
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "main", "table", "thead", "tbody",
    "ul", "ol", "blockquote", "pre", "body", "html", "hr", "figure", "figcaption",
];

impl ReportDocument {
    pub fn error() -> Self {
        Self {
            blocks: vec![ReportBlock::Paragraph(LOAD_ERROR_TEXT.to_string())],
        }
    }

    pub fn has_trend_chart(&self) -> bool {
        self.blocks.contains(&ReportBlock::TrendChart)
    }

    pub fn image_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for block in &self.blocks {
            if let ReportBlock::Image { src, .. } = block {
                if !sources.contains(&src.as_str()) {
                    sources.push(src);
                }
            }
        }
        sources
    }

    pub fn parse(html: &str) -> Self {
        let mut builder = BlockBuilder::default();
        let mut rest = html;

        while let Some(start) = rest.find('<') {
            builder.push_text(&rest[..start]);
            rest = &rest[start..];

            if let Some(after) = rest.strip_prefix("<!--") {
                rest = after.find("-->").map_or("", |end| &after[end + 3..]);
                continue;
            }

            let Some(end) = rest.find('>') else {
                builder.push_text(rest);
                rest = "";
                break;
            };
            let tag = Tag::parse(&rest[1..end]);
            rest = &rest[end + 1..];

            let Some(tag) = tag else { continue };
            if !tag.closing && SKIPPED_ELEMENTS.contains(&tag.name.as_str()) {
                let closing = format!("</{}", tag.name);
                rest = find_ignore_case(rest, &closing)
                    .and_then(|pos| rest[pos..].find('>').map(|end| &rest[pos + end + 1..]))
                    .unwrap_or("");
                continue;
            }
            builder.handle_tag(&tag);
        }
        builder.push_text(rest);
        builder.finish()
    }
}

struct Tag {
    name: String,
    closing: bool,
    attributes: String,
}

impl Tag {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_end_matches('/');
        let (closing, raw) = match raw.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        if raw.starts_with('!') || raw.starts_with('?') {
            return None;
        }
        let name_end = raw
            .find(|c: char| c.is_whitespace())
            .unwrap_or(raw.len());
        let name = raw[..name_end].to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            closing,
            attributes: raw[name_end..].to_string(),
        })
    }

    fn attribute(&self, wanted: &str) -> Option<&str> {
        let mut rest = self.attributes.as_str();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                return None;
            }
            let name_end = rest
                .find(|c: char| c.is_whitespace() || c == '=')
                .unwrap_or(rest.len());
            let name = &rest[..name_end];
            rest = rest[name_end..].trim_start();
            let value = match rest.strip_prefix('=') {
                Some(after) => {
                    let (value, remaining) = split_attribute_value(after.trim_start());
                    rest = remaining;
                    Some(value)
                }
                None => None,
            };
            if name.eq_ignore_ascii_case(wanted) {
                return value;
            }
        }
    }

    fn heading_level(&self) -> Option<u8> {
        let mut chars = self.name.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('h'), Some(digit @ '1'..='6'), None) => digit.to_digit(10).map(|d| d as u8),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PendingKind {
    #[default]
    Paragraph,
    Heading(u8),
    ListItem,
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<ReportBlock>,
    text: String,
    kind: PendingKind,
    row: Option<Vec<String>>,
    pending_space: bool,
}

impl BlockBuilder {
    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let decoded = decode_entities(raw);
        if decoded.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        for (position, word) in decoded.split_whitespace().enumerate() {
            if (position > 0 || self.pending_space) && !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(word);
            self.pending_space = false;
        }
        if decoded.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }

    fn handle_tag(&mut self, tag: &Tag) {
        let name = tag.name.as_str();
        match name {
            "br" => self.flush(),
            "canvas" if !tag.closing => {
                if tag.attribute("id") == Some(TREND_CANVAS_ID) {
                    self.flush();
                    self.blocks.push(ReportBlock::TrendChart);
                }
            }
            "img" if !tag.closing => {
                let src = tag.attribute("src").map(decode_entities);
                match src {
                    // Only asset paths; remote and inline sources are dropped.
                    Some(src) if src.starts_with('/') && !src.starts_with("//") => {
                        self.flush();
                        let alt = tag.attribute("alt").map(decode_entities).unwrap_or_default();
                        self.blocks.push(ReportBlock::Image { src, alt });
                    }
                    Some(src) => log::warn!("Dropping report image with external source {src}"),
                    None => {}
                }
            }
            "li" => {
                self.flush();
                if !tag.closing {
                    self.kind = PendingKind::ListItem;
                }
            }
            "tr" => {
                self.flush_row();
                if !tag.closing {
                    self.row = Some(Vec::new());
                }
            }
            "td" | "th" => {
                if self.row.is_some() || tag.closing {
                    self.flush();
                }
            }
            _ if tag.heading_level().is_some() => {
                self.flush();
                if !tag.closing {
                    self.kind = PendingKind::Heading(tag.heading_level().unwrap_or(1));
                }
            }
            _ if BLOCK_ELEMENTS.contains(&name) => {
                if name == "table" {
                    self.flush_row();
                }
                self.flush();
            }
            _ => {}
        }
    }

    fn take_text(&mut self) -> Option<String> {
        let text = self.text.trim().to_string();
        self.text.clear();
        self.pending_space = false;
        (!text.is_empty()).then_some(text)
    }

    fn flush(&mut self) {
        if self.row.is_some() {
            // Loose text inside a table row belongs to the row.
            if let Some(cell) = self.take_text() {
                if let Some(row) = self.row.as_mut() {
                    row.push(cell);
                }
            }
            return;
        }
        let kind = std::mem::take(&mut self.kind);
        let Some(text) = self.take_text() else {
            return;
        };
        self.blocks.push(match kind {
            PendingKind::Paragraph => ReportBlock::Paragraph(text),
            PendingKind::Heading(level) => ReportBlock::Heading { level, text },
            PendingKind::ListItem => ReportBlock::ListItem(text),
        });
    }

    fn flush_row(&mut self) {
        if self.row.is_some() {
            self.flush();
        }
        if let Some(row) = self.row.take() {
            if !row.is_empty() {
                self.blocks.push(ReportBlock::TableRow(row));
            }
        }
    }

    fn finish(mut self) -> ReportDocument {
        self.flush_row();
        self.flush();
        ReportDocument {
            blocks: self.blocks,
        }
    }
}

fn split_attribute_value(raw: &str) -> (&str, &str) {
    match raw.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let value = &raw[1..];
            match value.find(quote) {
                Some(end) => (&value[..end], &value[end + 1..]),
                None => (value, ""),
            }
        }
        _ => {
            let end = raw.find(char::is_whitespace).unwrap_or(raw.len());
            (&raw[..end], &raw[end..])
        }
    }
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.to_ascii_lowercase();
    haystack
        .to_ascii_lowercase()
        .find(&needle)
}

pub fn decode_entities(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        rest = &rest[start..];
        let entity_end = rest.find(';').filter(|&end| end <= 10);
        let replacement = entity_end.and_then(|end| decode_entity(&rest[1..end]));
        match (entity_end, replacement) {
            (Some(end), Some(c)) => {
                decoded.push(c);
                rest = &rest[end + 1..];
            }
            _ => {
                decoded.push('&');
                rest = &rest[1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "deg" => Some('°'),
        "plusmn" => Some('±'),
        "times" => Some('×'),
        "middot" => Some('·'),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_styles_and_head_are_dropped() {
        let doc = ReportDocument::parse(
            r#"<html><head><title>x</title><style>p { color: red }</style></head>
            <body><p>Stable findings.</p><script>alert("pwned")</script>
            <SCRIPT type="text/javascript">steal()</SCRIPT></body></html>"#,
        );
        assert_eq!(
            doc.blocks,
            vec![ReportBlock::Paragraph("Stable findings.".to_string())]
        );
    }

    #[test]
    fn headings_lists_and_paragraphs() {
        let doc = ReportDocument::parse(
            "<h1>Patient Report</h1><h3>Findings</h3><ul><li>ARIA-E: absent</li>\
             <li>ARIA-H &amp; microbleeds: 2</li></ul><p>Line one<br>line two</p>",
        );
        assert_eq!(
            doc.blocks,
            vec![
                ReportBlock::Heading {
                    level: 1,
                    text: "Patient Report".to_string()
                },
                ReportBlock::Heading {
                    level: 3,
                    text: "Findings".to_string()
                },
                ReportBlock::ListItem("ARIA-E: absent".to_string()),
                ReportBlock::ListItem("ARIA-H & microbleeds: 2".to_string()),
                ReportBlock::Paragraph("Line one".to_string()),
                ReportBlock::Paragraph("line two".to_string()),
            ]
        );
    }

    #[test]
    fn inline_markup_is_flattened() {
        let doc = ReportDocument::parse(
            "<p>Max diameter <strong>1.05</strong> cm <a href=\"javascript:x()\">(see)</a></p>",
        );
        assert_eq!(
            doc.blocks,
            vec![ReportBlock::Paragraph("Max diameter 1.05 cm (see)".to_string())]
        );
    }

    #[test]
    fn tables_become_rows() {
        let doc = ReportDocument::parse(
            "<table><tr><th>Date</th><th>Diameter</th></tr>\
             <tr><td>2025-04-18</td><td>1.05</td></tr></table>",
        );
        assert_eq!(
            doc.blocks,
            vec![
                ReportBlock::TableRow(vec!["Date".to_string(), "Diameter".to_string()]),
                ReportBlock::TableRow(vec!["2025-04-18".to_string(), "1.05".to_string()]),
            ]
        );
    }

    #[test]
    fn trend_canvas_is_located() {
        let doc = ReportDocument::parse(
            "<h2>Evolution</h2><canvas id=\"evolutionChart\"></canvas><p>After</p>",
        );
        assert!(doc.has_trend_chart());
        assert_eq!(doc.blocks[1], ReportBlock::TrendChart);

        let other = ReportDocument::parse("<canvas id='otherChart'></canvas><p>x</p>");
        assert!(!other.has_trend_chart());
    }

    #[test]
    fn canvas_id_matches_the_whole_attribute_name() {
        let doc = ReportDocument::parse(
            "<canvas data-id=\"x\" id = \"evolutionChart\"></canvas>",
        );
        assert!(doc.has_trend_chart());

        let doc = ReportDocument::parse("<canvas data-id=\"evolutionChart\"></canvas>");
        assert!(!doc.has_trend_chart());

        let doc = ReportDocument::parse("<canvas grid=evolutionChart ID=evolutionChart>");
        assert!(doc.has_trend_chart());
    }

    #[test]
    fn lesion_images_are_kept() {
        let doc = ReportDocument::parse(
            r#"<h2>Lesion Visualization</h2>
            <div class="visualization">
                <img src="/mri/0.seg/slice_077.jpg" alt="TP0">
                <img src="/mri/1.seg/slice_077.jpg" alt="TP1">
                <img src="/mri/difference/slice_077.jpg" alt="TP1 + Seg">
            </div>
            <div class="visualization-labels">
                <div>2025-03-24</div>
                <div>2025-04-18</div>
                <div>Segmentation</div>
            </div>"#,
        );
        let image = |src: &str, alt: &str| ReportBlock::Image {
            src: src.to_string(),
            alt: alt.to_string(),
        };
        assert_eq!(
            doc.blocks,
            vec![
                ReportBlock::Heading {
                    level: 2,
                    text: "Lesion Visualization".to_string()
                },
                image("/mri/0.seg/slice_077.jpg", "TP0"),
                image("/mri/1.seg/slice_077.jpg", "TP1"),
                image("/mri/difference/slice_077.jpg", "TP1 + Seg"),
                ReportBlock::Paragraph("2025-03-24".to_string()),
                ReportBlock::Paragraph("2025-04-18".to_string()),
                ReportBlock::Paragraph("Segmentation".to_string()),
            ]
        );
        assert_eq!(
            doc.image_sources(),
            vec![
                "/mri/0.seg/slice_077.jpg",
                "/mri/1.seg/slice_077.jpg",
                "/mri/difference/slice_077.jpg"
            ]
        );
    }

    #[test]
    fn external_and_inline_images_are_dropped() {
        let doc = ReportDocument::parse(
            "<img src=\"https://tracker.example/p.gif\"><img src=\"//cdn/x.png\">\
             <img src=\"data:image/png;base64,AAAA\"><img alt=\"no source\">\
             <img src='/report/a&amp;b.jpg' alt='A &amp; B' />",
        );
        assert_eq!(
            doc.blocks,
            vec![ReportBlock::Image {
                src: "/report/a&b.jpg".to_string(),
                alt: "A & B".to_string(),
            }]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let doc = ReportDocument::parse("<p>a<!-- <script>bad()</script> -->b</p>");
        assert_eq!(doc.blocks, vec![ReportBlock::Paragraph("ab".to_string())]);
    }

    #[test]
    fn entities_decode() {
        assert_eq!(decode_entities("a &lt;b&gt; &#65;&#x42; &nbsp;"), "a <b> AB  ");
        assert_eq!(decode_entities("R&D &unknown; &"), "R&D &unknown; &");
    }

    #[test]
    fn error_document() {
        assert_eq!(
            ReportDocument::error().blocks,
            vec![ReportBlock::Paragraph(LOAD_ERROR_TEXT.to_string())]
        );
    }
}
