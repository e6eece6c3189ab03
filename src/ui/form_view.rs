//! Widgets of the tagging form

use iced::widget::image::{Handle, Image};
use iced::widget::{button, container, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::{Message, Slot};

/// Side length of the preview boxes
const PREVIEW_BOX: f32 = 260.0;

/// Label, path field, "Choose file" and "Clear" for one image slot
pub fn path_row<'a>(caption: &'a str, value: &'a str, slot: Slot) -> Element<'a, Message> {
    row![
        text(caption).width(Length::Fixed(280.0)),
        text_input("", value)
            .on_input(move |path| Message::PathEdited(slot, path))
            .width(Length::Fill),
        button("Choose file").on_press(Message::ChooseFile(slot)),
        button("Clear").on_press(Message::ClearFile(slot)),
    ]
    .spacing(5)
    .align_y(Alignment::Center)
    .into()
}

/// Scale field with step buttons, limited to 1..=10 by validation
pub fn scale_row(scale: &str) -> Element<'_, Message> {
    row![
        text("Scale:").width(Length::Fixed(280.0)),
        button("-").on_press(Message::ScaleStep(-1)),
        text_input("1", scale)
            .on_input(Message::ScaleChanged)
            .width(Length::Fixed(50.0)),
        button("+").on_press(Message::ScaleStep(1)),
    ]
    .spacing(5)
    .align_y(Alignment::Center)
    .into()
}

/// Sunken box showing a preview thumbnail, empty when nothing is loaded
pub fn preview(handle: Option<&Handle>) -> Element<'_, Message> {
    let content: Element<'_, Message> = match handle {
        Some(handle) => Image::new(handle.clone()).into(),
        None => text("").into(),
    };

    container(content)
        .center_x(Length::Fixed(PREVIEW_BOX))
        .center_y(Length::Fixed(PREVIEW_BOX))
        .style(container::bordered_box)
        .into()
}
