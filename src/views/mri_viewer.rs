use super::page_header;
use crate::components::overlay_toggle;
use crate::message::Message;
use crate::model::slice::{BASELINE_SCAN_DATE, FOLLOWUP_SCAN_DATE};
use crate::screen::MriState;
use iced::widget::{button, column, container, image, row, slider, text};
use iced::{Alignment, Element, Length};

const PANEL_HEIGHT: f32 = 420.0;

pub fn mri_viewer(state: &MriState) -> Element<'_, Message> {
    let cursor = state.cursor;
    let paths = state.current_paths();

    let controls = column![
        row![
            text(format!(
                "Slice: {} / {}",
                cursor.index() + 1,
                cursor.total()
            )),
            overlay_toggle(state.overlay),
        ]
        .spacing(24)
        .align_y(Alignment::Center),
        slider(0..=cursor.last(), cursor.index(), Message::SliceChanged),
        row![
            text("Slice 1").size(12),
            iced::widget::horizontal_space(),
            text(format!("Slice {}", cursor.total())).size(12),
        ],
    ]
    .spacing(12);

    let panels = row![
        slice_panel(
            state,
            &paths.left,
            BASELINE_SCAN_DATE,
            state.overlay.left_caption()
        ),
        slice_panel(
            state,
            &paths.right,
            FOLLOWUP_SCAN_DATE,
            state.overlay.right_caption()
        ),
    ]
    .spacing(24);

    let navigation = row![
        button("Previous").on_press_maybe((!cursor.at_start()).then_some(Message::PreviousSlice)),
        text(format!("Slice {} of {}", cursor.index() + 1, cursor.total())),
        button("Next").on_press_maybe((!cursor.at_end()).then_some(Message::NextSlice)),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    column![
        page_header(
            "MRI Viewer".to_string(),
            format!("Patient: {}", state.patient_name)
        ),
        container(controls)
            .padding(20)
            .style(container::rounded_box),
        container(
            column![panels, navigation]
                .spacing(24)
                .align_x(Alignment::Center)
        )
        .padding(20)
        .style(container::rounded_box),
    ]
    .padding(24)
    .spacing(24)
    .into()
}

fn slice_panel<'a>(
    state: &'a MriState,
    path: &str,
    date: &'a str,
    caption: &'a str,
) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match state.cache.get(path) {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None if state.cache.is_loading(path) => text("Loading…").into(),
        None => text("No image").into(),
    };

    let caption = if state.cache.is_placeholder(path) {
        text(format!("{caption} (image unavailable)")).size(14)
    } else {
        text(caption).size(14)
    };

    column![
        text(date).size(20),
        caption,
        container(picture)
            .width(Length::Fill)
            .height(Length::Fixed(PANEL_HEIGHT))
            .align_x(Alignment::Center)
            .align_y(Alignment::Center)
            .style(container::rounded_box),
    ]
    .spacing(8)
    .align_x(Alignment::Center)
    .width(Length::FillPortion(1))
    .into()
}
