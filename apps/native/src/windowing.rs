use iced::widget::operation;
use iced::{widget, window, Size, Task};
use swapcore_config::{EditorMetrics, WindowSettings};

use crate::Message;

pub(crate) fn native_window_settings(config: &WindowSettings) -> window::Settings {
    let mut settings = window::Settings::default();
    settings.size = Size::new(config.width, config.height);
    settings.min_size = Some(Size::new(config.min_width, config.min_height));
    settings.resizable = true;
    settings
}

/// Whole lines the names editor can scroll past.
pub(crate) fn editor_scroll_max(line_count: usize, metrics: &EditorMetrics) -> f32 {
    line_count.saturating_sub(metrics.visible_lines()) as f32
}

/// Preview rows have a fixed height, so the list range is known before its first scroll event.
pub(crate) fn estimated_list_max(rows: usize, metrics: &EditorMetrics) -> f32 {
    (rows as f32 * metrics.line_height - metrics.height).max(0.0)
}

pub(crate) fn sync_preview_scroll(
    scroll_id: widget::Id,
    list_position: f32,
    list_max: f32,
) -> Task<Message> {
    let y = if list_max > 0.0 {
        (list_position / list_max).clamp(0.0, 1.0)
    } else {
        0.0
    };

    operation::snap_to(scroll_id, widget::scrollable::RelativeOffset { x: 0.0, y })
}
