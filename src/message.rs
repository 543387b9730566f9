use crate::model::{ChatMessage, Route};
use iced::widget::markdown;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Route),

    TogglePatient(&'static str),
    OpenMri(&'static str),
    SegmentationFinished {
        patient: &'static str,
        result: Result<(), String>,
    },
    OpenReport(&'static str),
    ReportGenerated {
        patient: &'static str,
        result: Result<(), String>,
    },

    SliceChanged(u16),
    PreviousSlice,
    NextSlice,
    ToggleSegmentation,
    ToggleProgression,
    SliceLoaded {
        path: String,
        result: Result<Vec<u8>, String>,
    },

    ReportLoaded(Result<String, String>),
    ReportImageLoaded {
        path: String,
        result: Result<Vec<u8>, String>,
    },
    DownloadReport,
    ReportSaved(Result<Option<PathBuf>, String>),

    ChatStarted {
        session: u64,
        result: Result<Vec<ChatMessage>, String>,
    },
    ChatInputChanged(String),
    SendChat,
    ChatReplied {
        session: u64,
        result: Result<ChatMessage, String>,
    },
    LinkClicked(markdown::Url),
}
