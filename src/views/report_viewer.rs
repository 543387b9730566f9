use super::page_header;
use crate::message::Message;
use crate::model::{ReportBlock, Route};
use crate::screen::ReportState;
use iced::widget::text::Wrapping;
use iced::widget::{
    button, canvas, column, container, horizontal_space, image, row, scrollable, text,
    Row,
};
use iced::{Alignment, Element, Length};

const CHART_HEIGHT: f32 = 260.0;
const IMAGE_SIZE: f32 = 240.0;

pub fn report_viewer(state: &ReportState) -> Element<'_, Message> {
    let actions = row![
        horizontal_space(),
        button(if state.saving {
            "Downloading..."
        } else {
            "Download report"
        })
        .on_press_maybe(
            (state.html.is_some() && !state.saving).then_some(Message::DownloadReport)
        ),
        button("Ask MedGemma").on_press(Message::Navigate(Route::Chat {
            patient: state.patient.clone(),
            client_name: Some(state.client_name.clone()),
        })),
    ]
    .spacing(12);

    let body: Element<'_, Message> = if state.loading {
        text("Loading report...").into()
    } else {
        let mut blocks = column![].spacing(10);
        let mut gallery = Vec::new();
        for block in &state.document.blocks {
            if matches!(block, ReportBlock::Image { .. }) {
                gallery.push(report_block(state, block));
                continue;
            }
            if !gallery.is_empty() {
                blocks = blocks.push(Row::with_children(std::mem::take(&mut gallery)).spacing(16));
            }
            blocks = blocks.push(report_block(state, block));
        }
        if !gallery.is_empty() {
            blocks = blocks.push(Row::with_children(gallery).spacing(16));
        }
        scrollable(blocks.padding(8)).into()
    };

    let mut content = column![
        page_header(
            format!("Medical Report - {}", state.client_name),
            "Patient Report".to_string()
        ),
        actions,
    ]
    .spacing(16);

    if let Some(notice) = &state.notice {
        content = content.push(text(notice).size(14).wrapping(Wrapping::Word));
    }

    content
        .push(
            container(body)
                .padding(20)
                .width(Length::Fill)
                .height(Length::Fill)
                .style(container::rounded_box),
        )
        .padding(24)
        .into()
}

fn report_block<'a>(state: &'a ReportState, block: &'a ReportBlock) -> Element<'a, Message> {
    match block {
        ReportBlock::Heading { level, text: title } => {
            let size: u16 = match level {
                1 => 28,
                2 => 22,
                3 => 18,
                _ => 16,
            };
            text(title).size(size).into()
        }
        ReportBlock::Paragraph(body) => text(body).wrapping(Wrapping::Word).into(),
        ReportBlock::ListItem(item) => row![text("•"), text(item).wrapping(Wrapping::Word)]
            .spacing(8)
            .into(),
        ReportBlock::TableRow(cells) => cells
            .iter()
            .fold(row![].spacing(12), |row, cell| {
                row.push(
                    text(cell)
                        .width(Length::FillPortion(1))
                        .wrapping(Wrapping::Word),
                )
            })
            .into(),
        ReportBlock::Image { src, alt } => {
            let picture: Element<'a, Message> = match state.images.get(src) {
                Some(handle) => image(handle.clone())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into(),
                None if state.images.is_loading(src) => text("Loading…").into(),
                None => text("No image").into(),
            };
            column![
                container(picture)
                    .width(Length::Fixed(IMAGE_SIZE))
                    .height(Length::Fixed(IMAGE_SIZE))
                    .align_x(Alignment::Center)
                    .align_y(Alignment::Center)
                    .style(container::bordered_box),
                text(alt).size(12),
            ]
            .spacing(4)
            .into()
        }
        ReportBlock::TrendChart => match &state.chart {
            Some(chart) => canvas(chart)
                .width(Length::Fill)
                .height(Length::Fixed(CHART_HEIGHT))
                .into(),
            None => text("").into(),
        },
    }
}
