//! Tag groups: one bordered box per category with its checkboxes laid out
//! in a small grid, plus the "keep tags" toggle underneath

use iced::widget::{checkbox, column, container, text, Column, Row};
use iced::{Element, Length, Pixels};
use iced_aw::Wrap;

use crate::tags::{TagBoard, TagCategory};
use crate::Message;

/// Width of a single tag checkbox cell
const CELL_WIDTH: f32 = 115.0;

/// Build the tag panel; groups wrap onto new lines when the window is narrow
pub fn view(board: &TagBoard) -> Element<'_, Message> {
    let groups: Vec<Element<'_, Message>> = board
        .taxonomy()
        .categories()
        .iter()
        .map(|category| group(board, category))
        .collect();

    Wrap::with_elements(groups)
        .spacing(Pixels(10.0))
        .line_spacing(Pixels(10.0))
        .into()
}

fn group<'a>(board: &'a TagBoard, category: &'a TagCategory) -> Element<'a, Message> {
    let rows = category.tags.chunks(category.columns()).map(|chunk| {
        Row::with_children(chunk.iter().map(|tag| {
            let name = category.name.clone();
            let tag_name = tag.clone();
            checkbox(tag.as_str(), board.is_checked(&category.name, tag))
                .on_toggle(move |checked| Message::TagToggled {
                    category: name.clone(),
                    tag: tag_name.clone(),
                    checked,
                })
                .size(14)
                .width(Length::Fixed(CELL_WIDTH))
                .into()
        }))
        .spacing(4)
        .into()
    });

    let keep_name = category.name.clone();
    let keep = checkbox("Keep tags", board.keeps(&category.name))
        .on_toggle(move |keep| Message::KeepToggled(keep_name.clone(), keep))
        .size(14);

    container(
        column![
            text(capitalize(&category.name)).size(16),
            Column::with_children(rows).spacing(2),
            keep,
        ]
        .spacing(6),
    )
    .padding(8)
    .style(container::bordered_box)
    .into()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("ancestry"), "Ancestry");
        assert_eq!(capitalize(""), "");
    }
}
