pub mod chat_view;
pub mod mri_viewer;
pub mod patient_list;
pub mod report_viewer;

pub use chat_view::chat_view;
pub use mri_viewer::mri_viewer;
pub use patient_list::patient_list;
pub use report_viewer::report_viewer;

use crate::message::Message;
use crate::model::Route;
use iced::widget::{button, column, horizontal_space, row, text};
use iced::{Alignment, Element};

fn page_header<'a>(title: String, subtitle: String) -> Element<'a, Message> {
    row![
        column![text(title).size(32), text(subtitle).size(16)].spacing(4),
        horizontal_space(),
        button("Back to Home").on_press(Message::Navigate(Route::PatientList)),
    ]
    .align_y(Alignment::Center)
    .into()
}
