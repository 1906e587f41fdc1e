use crate::Message;
use crate::models::QueueItem;
use iced::widget::image::Handle;
use iced::widget::{Row, button, column, container, image, row, text};
use iced::{Border, Color, Element, Length, Theme};

const HIGHLIGHT: Color = Color::from_rgb(0.95, 0.45, 0.75);

/// One row of the queue: artwork, title, submitter, votes and actions.
pub fn get_queue_item_widget<'a, V, D>(
    item: &'a QueueItem,
    image_handle: Option<Handle>,
    is_current: bool,
    on_vote: V,
    on_delete: D,
) -> Element<'a, Message>
where
    V: Fn(QueueItem, bool) -> Message,
    D: Fn(QueueItem) -> Message,
{
    let mut row = Row::new();

    if let Some(handle) = image_handle {
        row = row.push(image(handle).width(96).height(54));
    } else {
        row = row.push(container(text("...")).width(96).height(54).center(Length::Fill));
    }

    let title = if is_current {
        text(item.display_title())
            .shaping(text::Shaping::Advanced)
            .color(HIGHLIGHT)
    } else {
        text(item.display_title()).shaping(text::Shaping::Advanced)
    };

    row = row.push(
        column![
            title,
            text(format!("Added by: {}", item.submitter_label())).size(12),
            text(format!("{} votes", item.priority)).size(12),
        ]
        .spacing(2)
        .width(Length::Fill),
    );

    row = row.push(
        row![
            button("+").on_press(on_vote(item.clone(), true)),
            button("-").on_press(on_vote(item.clone(), false)),
            button("Remove")
                .style(button::danger)
                .on_press(on_delete(item.clone())),
        ]
        .spacing(5),
    );

    let body = container(row.spacing(10).padding(5)).width(Length::Fill);

    if is_current {
        body.style(|theme: &Theme| {
            container::rounded_box(theme).border(Border {
                color: HIGHLIGHT,
                width: 2.0,
                radius: 6.0.into(),
            })
        })
        .into()
    } else {
        body.into()
    }
}
