use super::page_header;
use crate::message::Message;
use crate::model::{ChatPhase, ChatRole};
use crate::screen::ChatState;
use iced::widget::text::Wrapping;
use iced::widget::{
    button, center, column, container, horizontal_space, markdown, row, scrollable, text,
    text_input, Column,
};
use iced::{Element, Length, Theme};

pub const TRANSCRIPT_ID: &str = "chat-transcript";
const BUBBLE_WIDTH: f32 = 520.0;

pub fn chat_view<'a>(state: &'a ChatState, theme: &Theme) -> Element<'a, Message> {
    let header = page_header(
        "Chat with MedGemma".to_string(),
        format!("Patient: {}", state.session.client_name()),
    );

    if state.session.phase() == ChatPhase::Loading {
        return column![header, center(text("Initializing chat with MedGemma...").size(18))]
            .padding(24)
            .spacing(24)
            .into();
    }

    let mut transcript = state
        .session
        .messages()
        .iter()
        .zip(&state.rendered)
        .fold(Column::new().spacing(16), |column, (message, rendered)| {
            let bubble: Element<'a, Message> = match (message.role, rendered) {
                (ChatRole::Assistant, Some(items)) => markdown::view(
                    items,
                    markdown::Settings::default(),
                    markdown::Style::from_palette(theme.palette()),
                )
                .map(Message::LinkClicked),
                _ => text(&message.content).wrapping(Wrapping::Word).into(),
            };
            let style: fn(&Theme) -> container::Style = match message.role {
                ChatRole::User => container::rounded_box,
                ChatRole::Assistant => container::bordered_box,
            };
            let bubble = container(bubble)
                .padding([12, 18])
                .max_width(BUBBLE_WIDTH)
                .style(style);
            column.push(match message.role {
                ChatRole::User => row![horizontal_space(), bubble],
                ChatRole::Assistant => row![bubble, horizontal_space()],
            })
        });

    if state.session.phase() == ChatPhase::Sending {
        transcript = transcript.push(
            container(text("• • •"))
                .padding([12, 18])
                .style(container::bordered_box),
        );
    }

    let sending = state.session.phase() == ChatPhase::Sending;
    let input = text_input("Type your message...", &state.input)
        .padding(14)
        .on_input_maybe((!sending).then_some(Message::ChatInputChanged))
        .on_submit(Message::SendChat);
    let send = button("Send")
        .padding(14)
        .on_press_maybe(state.session.can_send(&state.input).then_some(Message::SendChat));

    let mut content = column![
        header,
        container(
            scrollable(transcript.padding(12))
                .id(scrollable::Id::new(TRANSCRIPT_ID))
                .height(Length::Fill)
        )
        .padding(12)
        .height(Length::Fill)
        .style(container::rounded_box),
    ]
    .spacing(16);

    if let Some(notice) = state.session.notice() {
        content = content.push(text(notice).size(14));
    }

    content
        .push(row![input, send].spacing(12))
        .padding(24)
        .into()
}
