use crate::Message;
use crate::managers::PlaybackState;
use crate::models::QueueItem;
use iced::widget::image::Handle;
use iced::{
    Length,
    alignment::Vertical,
    widget::{Space, button, column, container, horizontal_rule, image, row, slider, text},
};

pub struct NowPlaying<'a> {
    pub item: Option<&'a QueueItem>,
    pub artwork: Option<Handle>,
    pub state: PlaybackState,
    pub paused: bool,
    pub position: Option<usize>,
    pub queue_length: usize,
    pub has_next: bool,
    pub volume: u32,
}

/// Renders the current item with transport controls
pub fn get_now_playing_bar<'a>(
    now_playing: NowPlaying<'a>,
    on_toggle: Message,
    on_skip: Message,
    on_remove: Message,
    on_volume: impl Fn(u32) -> Message + 'a,
    on_volume_release: Message,
) -> iced::Element<'a, Message> {
    let Some(item) = now_playing.item else {
        return column![
            container(text("No song playing").size(20)).padding(10),
            horizontal_rule(2),
        ]
        .into();
    };

    let artwork: iced::Element<'a, Message> = match now_playing.artwork {
        Some(handle) => image(handle).width(160).height(90).into(),
        None => container(text("...")).width(160).height(90).center(Length::Fill).into(),
    };

    let status = match &now_playing.state {
        PlaybackState::Empty => text("Not playable"),
        PlaybackState::Loading(_) => text("Loading..."),
        PlaybackState::Playing(_) if now_playing.paused => text("Paused"),
        PlaybackState::Playing(_) => text("Now Playing"),
    };

    let queue_text = match now_playing.position {
        Some(position) => text(format!("Queue: {} of {}", position + 1, now_playing.queue_length)),
        None => text("Queue: Empty"),
    };

    column![
        container(
            row![
                artwork,
                column![
                    status.size(14),
                    text(item.display_title())
                        .shaping(text::Shaping::Advanced)
                        .size(20),
                    text(format!("Requested by: {}", item.submitter_label())),
                    queue_text.size(12),
                ]
                .spacing(2)
                .padding(5),
                Space::with_width(Length::Fill),
                column![
                    row![
                        button(if now_playing.paused { "Play" } else { "Pause" }).on_press(on_toggle),
                        button("Skip").on_press_maybe(now_playing.has_next.then_some(on_skip)),
                        button("Remove")
                            .style(button::danger)
                            .on_press(on_remove),
                    ]
                    .spacing(5),
                    row![
                        text("Volume").size(12),
                        slider(0..=100, now_playing.volume, on_volume)
                            .on_release(on_volume_release)
                            .width(140),
                    ]
                    .spacing(5)
                    .align_y(Vertical::Center),
                ]
                .spacing(8),
            ]
            .spacing(10)
            .align_y(Vertical::Center),
        )
        .padding(10),
        horizontal_rule(2),
    ]
    .into()
}
