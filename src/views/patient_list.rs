use crate::message::Message;
use crate::model::{Patient, Route};
use crate::screen::PatientListState;
use iced::widget::text::Wrapping;
use iced::widget::{
    button, center, column, container, horizontal_space, opaque, row, scrollable, stack, text,
    Column,
};
use iced::{Alignment, Element, Length};

pub fn patient_list<'a>(
    patients: &'static [Patient],
    state: &PatientListState,
) -> Element<'a, Message> {
    let busy = state.pending.is_some();
    let rows = patients
        .iter()
        .fold(Column::new().spacing(16), |column, patient| {
            column.push(patient_card(
                patient,
                state.expanded == Some(patient.id),
                busy,
            ))
        });

    let content = column![
        row![text("GemmARIA").size(40), horizontal_space()].align_y(Alignment::Center),
        scrollable(rows),
    ]
    .padding(24)
    .spacing(24);

    match state.pending {
        Some(action) => stack![
            content,
            opaque(center(
                container(text(action.label()).size(18))
                    .padding(32)
                    .style(container::rounded_box),
            )),
        ]
        .into(),
        None => content.into(),
    }
}

fn patient_card<'a>(patient: &'static Patient, expanded: bool, busy: bool) -> Element<'a, Message> {
    let arrow = if expanded { "▼" } else { "▶" };

    let mut title = row![text(patient.name).size(24)]
        .spacing(12)
        .align_y(Alignment::Center);
    if let Some(date) = patient.new_scan_date {
        title = title.push(
            container(text(format!("New MRI · {date}")).size(12))
                .padding([2, 10])
                .style(container::rounded_box),
        );
    }

    let details = row![
        text(format!("DOB: {}", patient.date_of_birth)),
        text(format!("Age: {} years", patient.age)),
        text(format!("Treatment Start: {}", patient.treatment_start_date)),
    ]
    .spacing(32);

    let header = button(
        row![
            column![title, details].spacing(8).width(Length::Fill),
            text(arrow).size(20),
        ]
        .align_y(Alignment::Center),
    )
    .width(Length::Fill)
    .padding(20)
    .style(button::text)
    .on_press_maybe((!busy).then_some(Message::TogglePatient(patient.id)));

    let mut card = column![header];
    if expanded {
        let idle = |message: Message| (!busy).then_some(message);
        card = card.push(
            row![
                action_button("Visualize MRI", idle(Message::OpenMri(patient.id))),
                action_button("View Report", idle(Message::OpenReport(patient.id))),
                action_button(
                    "Chat with MedGemma",
                    idle(Message::Navigate(Route::Chat {
                        patient: patient.id.to_string(),
                        client_name: None,
                    })),
                ),
            ]
            .spacing(16)
            .padding([0, 20]),
        );
        card = card.push(iced::widget::Space::with_height(Length::Fixed(20.0)));
    }

    container(card)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn action_button<'a>(label: &'a str, on_press: Option<Message>) -> Element<'a, Message> {
    button(
        text(label)
            .wrapping(Wrapping::None)
            .width(Length::Fill)
            .align_x(Alignment::Center),
    )
    .width(Length::FillPortion(1))
    .padding(12)
    .on_press_maybe(on_press)
    .into()
}
