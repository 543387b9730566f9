use crate::components::TrendChart;
use crate::image_pipeline::SliceCache;
use crate::model::slice::MRI_ROOT;
use crate::model::{ChatRole, ChatSession, OverlayMode, ReportDocument, SliceCursor, SlicePaths};
use iced::widget::markdown;

pub enum Screen {
    PatientList(PatientListState),
    Mri(MriState),
    Report(ReportState),
    Chat(ChatState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Segmentation,
    Report,
}

impl PendingAction {
    pub fn label(self) -> &'static str {
        match self {
            PendingAction::Segmentation => "Processing MRI...",
            PendingAction::Report => "Generating report...",
        }
    }
}

#[derive(Debug, Default)]
pub struct PatientListState {
    pub expanded: Option<&'static str>,
    pub pending: Option<PendingAction>,
}

impl PatientListState {
    pub fn toggle(&mut self, patient: &'static str) {
        self.expanded = if self.expanded == Some(patient) {
            None
        } else {
            Some(patient)
        };
    }
}

#[derive(Debug)]
pub struct MriState {
    pub patient_name: String,
    pub cursor: SliceCursor,
    pub overlay: OverlayMode,
    pub cache: SliceCache,
}

impl MriState {
    pub fn new(patient_slug: &str, cursor: SliceCursor) -> Self {
        Self {
            patient_name: patient_slug.replace('-', " "),
            cursor,
            overlay: OverlayMode::None,
            cache: SliceCache::new(),
        }
    }

    pub fn current_paths(&self) -> SlicePaths {
        SlicePaths::for_slice(MRI_ROOT, self.cursor.index(), self.overlay)
    }

    // Nearest slices first.
    pub fn prefetch_paths(&self, radius: u16) -> Vec<String> {
        let current = self.cursor.index();
        let mut indices: Vec<u16> = self.cursor.prefetch_window(radius).collect();
        indices.sort_by_key(|index| index.abs_diff(current));
        indices
            .into_iter()
            .flat_map(|index| {
                let paths = SlicePaths::for_slice(MRI_ROOT, index, self.overlay);
                [paths.left, paths.right]
            })
            .collect()
    }
}

pub struct ReportState {
    pub patient: String,
    pub client_name: String,
    pub loading: bool,
    pub html: Option<String>,
    pub document: ReportDocument,
    pub chart: Option<TrendChart>,
    pub images: SliceCache,
    pub saving: bool,
    pub notice: Option<String>,
}

impl ReportState {
    pub fn new(patient: String, client_name: String) -> Self {
        Self {
            patient,
            client_name,
            loading: true,
            html: None,
            document: ReportDocument::default(),
            chart: None,
            images: SliceCache::new(),
            saving: false,
            notice: None,
        }
    }

    pub fn loaded(&mut self, result: Result<String, String>) {
        self.loading = false;
        match result {
            Ok(html) => {
                self.document = ReportDocument::parse(&html);
                self.html = Some(html);
            }
            Err(err) => {
                log::error!("Error loading report: {err}");
                self.document = ReportDocument::error();
                self.html = None;
            }
        }

        if self.chart.take().is_some() {
            log::debug!("Discarding previous trend chart");
        }
        if self.document.has_trend_chart() {
            self.chart = Some(TrendChart::new());
        }
    }

    /// Marks the report's images as requested and returns the ones to fetch.
    pub fn request_images(&mut self) -> Vec<String> {
        let mut requested = Vec::new();
        for src in self.document.image_sources() {
            if self.images.request(src) {
                requested.push(src.to_string());
            }
        }
        requested
    }

    pub fn download_file_name(&self) -> String {
        format!("{}_report.html", self.client_name)
    }
}

pub struct ChatState {
    pub id: u64,
    pub session: ChatSession,
    pub input: String,
    /// Parsed Markdown for each transcript entry; `None` for user messages.
    pub rendered: Vec<Option<Vec<markdown::Item>>>,
}

impl ChatState {
    pub fn new(id: u64, client_name: String) -> Self {
        Self {
            id,
            session: ChatSession::new(client_name),
            input: String::new(),
            rendered: Vec::new(),
        }
    }

    pub fn sync_rendered(&mut self) {
        let messages = self.session.messages();
        self.rendered.truncate(messages.len());
        for message in &messages[self.rendered.len()..] {
            self.rendered.push(match message.role {
                ChatRole::Assistant => Some(markdown::parse(&message.content).collect()),
                ChatRole::User => None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::report::LOAD_ERROR_TEXT;
    use crate::model::{ChatMessage, ReportBlock};

    #[test]
    fn expanding_one_patient_collapses_the_other() {
        let mut list = PatientListState::default();
        list.toggle("alice");
        assert_eq!(list.expanded, Some("alice"));
        list.toggle("bob");
        assert_eq!(list.expanded, Some("bob"));
        list.toggle("bob");
        assert_eq!(list.expanded, None);
    }

    #[test]
    fn prefetch_covers_both_panels_for_the_window() {
        let state = MriState::new("bob", SliceCursor::new(0, 154));
        let paths = state.prefetch_paths(5);
        assert_eq!(paths.len(), 12);
        assert_eq!(paths[0], "/mri/baseline/slice_000.jpg");
        assert_eq!(paths[1], "/mri/followup/slice_000.jpg");
        assert!(paths.contains(&"/mri/followup/slice_005.jpg".to_string()));
        assert!(!paths.contains(&"/mri/followup/slice_006.jpg".to_string()));
    }

    #[test]
    fn prefetch_follows_the_overlay() {
        let mut state = MriState::new("mary-ann", SliceCursor::new(77, 154));
        assert_eq!(state.patient_name, "mary ann");
        state.overlay = state.overlay.toggle_progression();
        let paths = state.prefetch_paths(5);
        assert_eq!(paths.len(), 22);
        assert!(paths
            .iter()
            .all(|p| p.contains("/baseline/") || p.contains("/difference/")));
    }

    #[test]
    fn report_with_canvas_gets_a_chart() {
        let mut report = ReportState::new("alice".to_string(), "Alice".to_string());
        report.loaded(Ok("<p>Findings</p><canvas id=\"evolutionChart\"></canvas>".to_string()));
        assert!(!report.loading);
        assert!(report.chart.is_some());
        assert_eq!(report.download_file_name(), "Alice_report.html");

        report.loaded(Ok("<p>No chart</p>".to_string()));
        assert!(report.chart.is_none());
    }

    #[test]
    fn report_images_are_requested_once() {
        let mut report = ReportState::new("bob".to_string(), "Bob".to_string());
        report.loaded(Ok("<img src=\"/mri/0.seg/slice_077.jpg\" alt=\"TP0\">\
             <img src=\"/mri/difference/slice_077.jpg\">\
             <img src=\"/mri/0.seg/slice_077.jpg\">"
            .to_string()));
        assert_eq!(
            report.request_images(),
            vec![
                "/mri/0.seg/slice_077.jpg".to_string(),
                "/mri/difference/slice_077.jpg".to_string()
            ]
        );
        assert!(report.request_images().is_empty());
        assert!(report.images.is_loading("/mri/difference/slice_077.jpg"));
    }

    #[test]
    fn failed_report_shows_inline_error() {
        let mut report = ReportState::new("bob".to_string(), "Bob".to_string());
        report.loaded(Err("connection refused".to_string()));
        assert!(report.html.is_none());
        assert_eq!(
            report.document.blocks,
            vec![ReportBlock::Paragraph(LOAD_ERROR_TEXT.to_string())]
        );
    }

    #[test]
    fn only_assistant_messages_are_parsed_as_markdown() {
        let mut chat = ChatState::new(1, "Bob".to_string());
        chat.session.started(Ok(vec![
            ChatMessage::user("seed"),
            ChatMessage::assistant("**Stable** disease"),
        ]));
        chat.sync_rendered();
        assert_eq!(chat.rendered.len(), 2);
        assert!(chat.rendered[0].is_none());
        assert!(chat.rendered[1].as_ref().is_some_and(|items| !items.is_empty()));
    }
}
