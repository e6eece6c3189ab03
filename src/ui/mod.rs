//! UI building blocks
//!
//! - Module id prompt shown at startup (prompt.rs)
//! - Path rows, previews and the form layout (form_view.rs)
//! - Tag group checkboxes (tag_panel.rs)
//! - Native message dialogs

pub mod form_view;
pub mod prompt;
pub mod tag_panel;

use rfd::{MessageButtons, MessageDialog, MessageLevel};

/// Show a blocking native message box, like the file picker does
pub fn notify(level: MessageLevel, title: &str, text: impl Into<String>) {
    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(text)
        .set_buttons(MessageButtons::Ok)
        .show();
}
