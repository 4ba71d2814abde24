#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod logging;
mod ui;
mod update;
mod windowing;

use std::path::PathBuf;

use anyhow::Context;
use iced::widget::{self, scrollable, text_editor};
use iced::{Task, Theme};
use swapcore_config::Settings;
use swapcore_scroll::{ScrollPositions, ScrollSync};
use swapd::Session;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let settings = Settings::default();
    logging::init_tracing(&settings.log_filter);
    info!(version = env!("CARGO_PKG_VERSION"), "NameSwapper starting");

    let window = windowing::native_window_settings(&settings.window);

    iced::application(
        move || (App::new(settings.clone()), Task::none()),
        update::update,
        ui::view,
    )
    .title("NameSwapper")
    .theme(theme)
    .window(window)
    .run()
    .context("NameSwapper window exited with an error")
}

#[derive(Debug, Clone)]
enum Message {
    ChooseInputFile,
    InputFileChosen(Option<PathBuf>),
    NamesEdited(text_editor::Action),
    PreviewScrolled(scrollable::Viewport),
    SharedScrollbarMoved(f32),
    CreateFiles,
}

struct App {
    session: Session,
    names: text_editor::Content,
    scroll: ScrollSync,
    preview_scroll_id: widget::Id,
    picking_file: bool,
    theme: Theme,
}

impl App {
    fn new(settings: Settings) -> Self {
        let theme = match settings.theme {
            swapcore_config::Theme::TerminalDark => Theme::TokyoNight,
            swapcore_config::Theme::TerminalLight => Theme::Light,
        };

        Self {
            session: Session::new(settings),
            names: text_editor::Content::new(),
            scroll: ScrollSync::default(),
            preview_scroll_id: widget::Id::unique(),
            picking_file: false,
            theme,
        }
    }

    /// Recomputes both scroll ranges after the editor or preview changed size.
    fn refresh_scroll_ranges(&mut self) -> Task<Message> {
        let metrics = self.session.settings.editor;
        self.scroll
            .set_input_max(windowing::editor_scroll_max(self.names.line_count(), &metrics));
        self.scroll.set_list_max(windowing::estimated_list_max(
            self.session.preview().len(),
            &metrics,
        ));

        self.apply_preview_position(self.scroll.positions())
    }

    /// The slider is drawn bottom-up, so it carries the editor position inverted.
    fn shared_range_max(&self) -> f32 {
        self.scroll.input_max().max(1.0)
    }

    fn shared_value(&self) -> f32 {
        self.shared_range_max() - self.scroll.input()
    }

    /// Scrolls the editor by whole lines until it reaches `positions.input`.
    fn apply_editor_position(&mut self, previous_input: f32, positions: ScrollPositions) {
        let lines = (positions.input - previous_input).round() as i32;
        if lines != 0 {
            self.names.perform(text_editor::Action::Scroll { lines });
        }
    }

    fn apply_preview_position(&self, positions: ScrollPositions) -> Task<Message> {
        windowing::sync_preview_scroll(
            self.preview_scroll_id.clone(),
            positions.list,
            self.scroll.list_max(),
        )
    }
}

fn theme(app: &App) -> Theme {
    app.theme.clone()
}
