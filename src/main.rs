use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::{FileDialog, MessageLevel};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod folder;
mod form;
mod paths;
mod preview;
mod session;
mod state;
mod tags;
mod ui;

use config::TaggerConfig;
use error::Error;
use form::{suggest_label, FormInput};
use preview::Thumbnail;
use session::Session;
use state::data::{SCALE_MAX, SCALE_MIN};
use tags::{TagBoard, Taxonomy};

/// Which of the two image fields a message refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Image 1: portrait and thumb
    Primary,
    /// Image 2: token and subject, optional
    Secondary,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    ModuleIdChanged(String),
    ModuleIdConfirmed,
    ModuleIdCancelled,
    /// User clicked "Choose file" next to a path field
    ChooseFile(Slot),
    ClearFile(Slot),
    PathEdited(Slot, String),
    LabelChanged(String),
    ScaleChanged(String),
    ScaleStep(i64),
    TagToggled {
        category: String,
        tag: String,
        checked: bool,
    },
    KeepToggled(String, bool),
    Save,
    Skip,
    /// Background thumbnail decoding finished
    PreviewLoaded(Slot, PathBuf, Result<Thumbnail, String>),
}

/// The two screens of the app
enum Screen {
    /// Asking for the module id before anything else
    ModulePrompt { input: String },
    Tagging(Box<Form>),
}

/// Everything the tagging form shows
struct Form {
    session: Session,
    board: TagBoard,
    primary_path: String,
    secondary_path: String,
    label: String,
    scale: String,
    primary_preview: Option<Handle>,
    secondary_preview: Option<Handle>,
}

/// Main application state
struct Tagger {
    config: TaggerConfig,
    taxonomy: Taxonomy,
    screen: Screen,
}

impl Tagger {
    /// Load configuration and tag vocabulary, then ask for the module id
    fn new() -> (Self, Task<Message>) {
        let config = TaggerConfig::load().unwrap_or_else(|e| {
            error!("❌ {}", e);
            ui::notify(
                MessageLevel::Error,
                "Configuration",
                format!("The configuration could not be loaded, using defaults:\n{}", e),
            );
            TaggerConfig::with_base_dir(std::env::current_dir().unwrap_or_default())
        });

        let taxonomy = Taxonomy::load(config.taxonomy_path.as_deref()).unwrap_or_else(|e| {
            error!("❌ {}", e);
            ui::notify(
                MessageLevel::Error,
                "Tag groups",
                format!("The tag groups could not be loaded, using the built-in ones:\n{}", e),
            );
            Taxonomy::builtin()
        });

        info!(
            "📁 Datasheet: {}, log: {}",
            config.datastore_path.display(),
            config.processed_log_path.display()
        );

        let input = config.module_id.clone();
        (
            Tagger {
                config,
                taxonomy,
                screen: Screen::ModulePrompt { input },
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        if let Screen::Tagging(form) = &mut self.screen {
            return form.update(message);
        }

        match message {
            Message::ModuleIdChanged(value) => {
                if let Screen::ModulePrompt { input } = &mut self.screen {
                    *input = value;
                }
                Task::none()
            }
            Message::ModuleIdConfirmed => {
                self.confirm_module_id();
                Task::none()
            }
            Message::ModuleIdCancelled => {
                info!("👋 Module id prompt cancelled");
                iced::exit()
            }
            _ => Task::none(),
        }
    }

    /// Validate the module id and open the tagging session
    fn confirm_module_id(&mut self) {
        let Screen::ModulePrompt { input } = &self.screen else {
            return;
        };

        match paths::validate_module_id(input) {
            Ok(module_id) => {
                let (session, warnings) = Session::start(self.config.clone(), module_id);
                for warning in warnings {
                    ui::notify(MessageLevel::Warning, "Startup", warning);
                }
                let board = TagBoard::new(self.taxonomy.clone());
                self.screen = Screen::Tagging(Box::new(Form::new(session, board)));
            }
            Err(e) => ui::notify(MessageLevel::Error, "Invalid module id", e.to_string()),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        match &self.screen {
            Screen::ModulePrompt { input } => ui::prompt::view(input),
            Screen::Tagging(form) => form.view(),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl Form {
    fn new(session: Session, board: TagBoard) -> Self {
        Form {
            session,
            board,
            primary_path: String::new(),
            secondary_path: String::new(),
            label: String::new(),
            scale: SCALE_MIN.to_string(),
            primary_preview: None,
            secondary_preview: None,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseFile(slot) => self.choose_file(slot),
            Message::ClearFile(slot) => {
                self.clear_slot(slot);
                Task::none()
            }
            Message::PathEdited(slot, path) => {
                match slot {
                    Slot::Primary => self.primary_path = path,
                    Slot::Secondary => self.secondary_path = path,
                }
                Task::none()
            }
            Message::LabelChanged(label) => {
                self.label = label;
                Task::none()
            }
            Message::ScaleChanged(scale) => {
                self.scale = scale;
                Task::none()
            }
            Message::ScaleStep(step) => {
                let current = self.scale.trim().parse::<i64>().unwrap_or(i64::from(SCALE_MIN));
                let next = current
                    .saturating_add(step)
                    .clamp(i64::from(SCALE_MIN), i64::from(SCALE_MAX));
                self.scale = next.to_string();
                Task::none()
            }
            Message::TagToggled {
                category,
                tag,
                checked,
            } => {
                self.board.toggle(&category, &tag, checked);
                Task::none()
            }
            Message::KeepToggled(category, keep) => {
                self.board.set_keep(&category, keep);
                Task::none()
            }
            Message::Save => self.save_and_next(),
            Message::Skip => {
                let next = self.session.skip();
                self.show_next(next)
            }
            Message::PreviewLoaded(slot, path, result) => {
                // Ignore previews for a path that is no longer in the field
                let current = match slot {
                    Slot::Primary => &self.primary_path,
                    Slot::Secondary => &self.secondary_path,
                };
                if Path::new(current) != path {
                    return Task::none();
                }
                match result {
                    Ok(thumb) => {
                        let handle = Handle::from_rgba(thumb.width, thumb.height, thumb.pixels);
                        match slot {
                            Slot::Primary => self.primary_preview = Some(handle),
                            Slot::Secondary => self.secondary_preview = Some(handle),
                        }
                    }
                    Err(e) => {
                        warn!("⚠️  {}", e);
                        ui::notify(
                            MessageLevel::Error,
                            "Error",
                            format!("The image could not be loaded:\n{}", e),
                        );
                    }
                }
                Task::none()
            }
            Message::ModuleIdChanged(_)
            | Message::ModuleIdConfirmed
            | Message::ModuleIdCancelled => Task::none(),
        }
    }

    /// Show the native picker and load the chosen image into a slot
    fn choose_file(&mut self, slot: Slot) -> Task<Message> {
        let Some(path) = FileDialog::new()
            .set_title("Choose image file")
            .add_filter("Images", folder::IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return Task::none();
        };

        let already_processed = match slot {
            Slot::Primary => {
                let pick = self.session.pick_primary(&path);
                if let Some(warning) = pick.warning {
                    ui::notify(MessageLevel::Warning, "Folder", warning);
                }
                self.label = pick.suggested_label;
                pick.already_processed
            }
            Slot::Secondary => self.session.is_processed(&path),
        };

        if already_processed {
            ui::notify(
                MessageLevel::Warning,
                "Note",
                format!("This image was already tagged:\n{}", path.display()),
            );
        }

        self.set_slot(slot, path)
    }

    /// Put a path into a slot and start decoding its preview
    fn set_slot(&mut self, slot: Slot, path: PathBuf) -> Task<Message> {
        let value = path.to_string_lossy().into_owned();
        match slot {
            Slot::Primary => {
                self.primary_path = value;
                self.primary_preview = None;
            }
            Slot::Secondary => {
                self.secondary_path = value;
                self.secondary_preview = None;
            }
        }

        Task::perform(preview::load_thumbnail(path.clone()), move |result| {
            Message::PreviewLoaded(slot, path.clone(), result.map_err(|e| e.to_string()))
        })
    }

    fn clear_slot(&mut self, slot: Slot) {
        match slot {
            Slot::Primary => {
                self.primary_path.clear();
                self.primary_preview = None;
            }
            Slot::Secondary => {
                self.secondary_path.clear();
                self.secondary_preview = None;
            }
        }
    }

    fn save_and_next(&mut self) -> Task<Message> {
        let input = FormInput {
            primary_path: self.primary_path.clone(),
            secondary_path: self.secondary_path.clone(),
            label: self.label.clone(),
            scale: self.scale.clone(),
            tags: self.board.selection(),
        };

        let outcome = match self.session.save(&input) {
            Ok(outcome) => outcome,
            Err(Error::Validation(e)) => {
                ui::notify(MessageLevel::Warning, "Error", e.to_string());
                return Task::none();
            }
            Err(e) => {
                error!("❌ Save failed: {}", e);
                ui::notify(
                    MessageLevel::Error,
                    "Error",
                    format!("The datasheet could not be written:\n{}", e),
                );
                return Task::none();
            }
        };

        for warning in outcome.warnings {
            ui::notify(MessageLevel::Error, "Processed log", warning);
        }

        self.board.reset_unkept();
        self.show_next(outcome.next)
    }

    /// Load the next queued image, or reset the form when the folder is done
    fn show_next(&mut self, next: Option<PathBuf>) -> Task<Message> {
        self.clear_slot(Slot::Secondary);

        match next {
            Some(path) => {
                self.label = suggest_label(&path);
                self.set_slot(Slot::Primary, path)
            }
            None => {
                ui::notify(MessageLevel::Info, "Done", "No more images in this folder.");
                self.clear_slot(Slot::Primary);
                self.label.clear();
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let fields = column![
            ui::form_view::path_row(
                "Image 1 (portrait/thumb):",
                &self.primary_path,
                Slot::Primary
            ),
            ui::form_view::path_row(
                "Image 2 (token/subject, optional):",
                &self.secondary_path,
                Slot::Secondary
            ),
            row![
                text("Label:").width(Length::Fixed(280.0)),
                text_input("", &self.label)
                    .on_input(Message::LabelChanged)
                    .on_submit(Message::Save),
            ]
            .spacing(5)
            .align_y(Alignment::Center),
            ui::form_view::scale_row(&self.scale),
        ]
        .spacing(6);

        let previews = row![
            ui::form_view::preview(self.primary_preview.as_ref()),
            ui::form_view::preview(self.secondary_preview.as_ref()),
        ]
        .spacing(20);

        let actions = row![
            button("Save & next image").on_press(Message::Save).padding(10),
            button("Skip").on_press(Message::Skip).padding(10),
        ]
        .spacing(20);

        let content = column![
            fields,
            container(previews).center_x(Length::Fill),
            container(actions).center_x(Length::Fill),
            container(text(format!(
                "{}   (module: {})",
                self.session.status_text(),
                self.session.module_id()
            )))
            .center_x(Length::Fill),
            scrollable(ui::tag_panel::view(&self.board)).height(Length::Fill),
        ]
        .spacing(10)
        .padding(10);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gallery_tagger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    iced::application("Character Gallery Tagger", Tagger::update, Tagger::view)
        .theme(Tagger::theme)
        .window_size((1260.0, 1000.0))
        .centered()
        .run_with(Tagger::new)
}
