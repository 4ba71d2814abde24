use iced::widget::{
    button, column, container, row, scrollable, text, text_editor, vertical_slider,
};
use iced::{Alignment, Color, Element, Fill, Length};

use crate::{App, Message};

const SHARED_SCROLLBAR_WIDTH: f32 = 14.0;

pub(crate) fn view(app: &App) -> Element<'_, Message> {
    let metrics = app.session.settings.editor;

    let header = row![
        text(app.session.input_label()).width(Fill),
        button(text("Select Input File"))
            .on_press_maybe((!app.picking_file).then_some(Message::ChooseInputFile))
            .padding([6, 12]),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let labels = row![
        container(text("Names")).center_x(Fill),
        container(text("")).width(Length::Fixed(SHARED_SCROLLBAR_WIDTH)),
        container(text(
            "Output File Names\n(Saved in the same location as the input file)"
        ))
        .width(Fill),
    ]
    .spacing(8);

    let editor = text_editor(&app.names)
        .placeholder("Paste a list of names here...")
        .on_action(Message::NamesEdited)
        .height(Length::Fixed(metrics.height));

    let shared_scrollbar = container(
        vertical_slider(
            0.0..=app.shared_range_max(),
            app.shared_value(),
            Message::SharedScrollbarMoved,
        )
        .step(1.0)
        .height(Length::Fixed(metrics.height)),
    )
    .width(Length::Fixed(SHARED_SCROLLBAR_WIDTH));

    let mut rows = column![];
    for file_name in app.session.preview() {
        rows = rows.push(
            container(text(file_name.as_str()).size(14))
                .height(Length::Fixed(metrics.line_height))
                .width(Fill),
        );
    }

    let preview = container(
        scrollable(rows)
            .id(app.preview_scroll_id.clone())
            .on_scroll(Message::PreviewScrolled)
            .direction(scrollable::Direction::Vertical(
                scrollable::Scrollbar::new().width(0.0).scroller_width(0.0),
            ))
            .height(Length::Fixed(metrics.height)),
    )
    .padding(4)
    .width(Fill)
    .style(container::bordered_box);

    let panes = row![editor, shared_scrollbar, preview]
        .spacing(8)
        .align_y(Alignment::Start);

    let action = container(
        button(text(app.session.action_label()))
            .on_press_maybe(app.session.can_execute().then_some(Message::CreateFiles))
            .padding([15, 10]),
    )
    .center_x(Fill);

    let mut status = column![text(app.session.status_text().unwrap_or_default())].spacing(4);
    if let Some(report) = app.session.report() {
        for failure in &report.failures {
            status = status.push(
                text(format!("{}: {}", failure.file_name, failure.error))
                    .size(12)
                    .color(Color::from_rgb8(235, 72, 72)),
            );
        }
    }

    column![header, labels, panes, action, status]
        .spacing(10)
        .padding(12)
        .into()
}
