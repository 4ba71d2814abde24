use iced::widget::text_editor;
use iced::Task;
use swapcore_copy::FsCopier;
use tracing::{debug, info, warn};

use crate::{App, Message};

pub(crate) fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::ChooseInputFile => {
            if app.picking_file {
                return Task::none();
            }
            app.picking_file = true;

            return Task::perform(
                async {
                    rfd::AsyncFileDialog::new()
                        .set_title("Select Input File")
                        .pick_file()
                        .await
                        .map(|file| file.path().to_path_buf())
                },
                Message::InputFileChosen,
            );
        }
        Message::InputFileChosen(path) => {
            app.picking_file = false;
            if let Err(error) = app.session.select_input_file(path) {
                warn!(%error, "input file rejected");
            }

            return app.refresh_scroll_ranges();
        }
        Message::NamesEdited(action) => {
            if let text_editor::Action::Scroll { lines } = action {
                let previous = app.scroll.input();
                app.names.perform(action);
                let positions = app.scroll.from_input(previous + lines as f32);
                debug!(lines, input = positions.input, list = positions.list, "editor scrolled");
                return app.apply_preview_position(positions);
            }

            let is_edit = action.is_edit();
            app.names.perform(action);
            if is_edit {
                app.session.set_names_text(editor_text(&app.names));
                return app.refresh_scroll_ranges();
            }
        }
        Message::PreviewScrolled(viewport) => {
            let list_max = (viewport.content_bounds().height - viewport.bounds().height).max(0.0);
            app.scroll.set_list_max(list_max);

            let offset = viewport.absolute_offset().y;
            if (offset - app.scroll.positions().list).abs() < 1.0 {
                return Task::none();
            }

            let previous = app.scroll.input();
            let positions = app.scroll.from_list(offset);
            app.apply_editor_position(previous, positions);
            return app.apply_preview_position(positions);
        }
        Message::SharedScrollbarMoved(value) => {
            let previous = app.scroll.input();
            let positions = app.scroll.from_shared(app.shared_range_max() - value);
            app.apply_editor_position(previous, positions);
            return app.apply_preview_position(positions);
        }
        Message::CreateFiles => match app.session.execute(&FsCopier) {
            Ok(report) => info!(
                created = report.created_count(),
                failed = report.failures.len(),
                "create files finished"
            ),
            Err(error) => warn!(%error, "create files refused"),
        },
    }

    Task::none()
}

/// Text of the editor with one name per line.
///
/// A buffer of `n` lines holds `n - 1` newlines. Any newline `Content::text` adds past that
/// is dropped.
pub(crate) fn editor_text(content: &text_editor::Content) -> String {
    let mut text = content.text();
    if text.split('\n').count() > content.line_count() && text.ends_with('\n') {
        text.pop();
    }
    text
}
