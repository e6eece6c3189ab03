//! Startup prompt for the module id the stored asset paths are prefixed with

use iced::widget::{button, column, container, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::Message;

/// Build the module id prompt
pub fn view(input: &str) -> Element<'_, Message> {
    let content = column![
        text("Foundry module id:").size(16),
        text_input("token-sammlung", input)
            .on_input(Message::ModuleIdChanged)
            .on_submit(Message::ModuleIdConfirmed)
            .padding(8)
            .width(Length::Fixed(360.0)),
        text("Please enter the Foundry id of the module").size(12),
        row![
            button("OK").on_press(Message::ModuleIdConfirmed).padding(8),
            button("Cancel").on_press(Message::ModuleIdCancelled).padding(8),
        ]
        .spacing(20),
    ]
    .spacing(10)
    .padding(40)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
