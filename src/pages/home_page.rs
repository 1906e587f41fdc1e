use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::{self, AppSettings};
use crate::managers::{
    AudioPlatform, Cue, Jukebox, MediaSession, QueueError, QueueFuture, RefreshOutcome,
    RefreshTicket,
};
use crate::media::{self, MediaId, MediaResolver, ResolveError, SubmissionPreview};
use crate::models::QueueItem;
use crate::utilities;
use crate::widgets::{NowPlaying, get_now_playing_bar, get_queue_item_widget};
use crate::{Message, Page};
use iced::alignment::Vertical;
use iced::widget::image::Handle;
use iced::widget::{Space, button, column, container, image, row, scrollable, text, text_input};
use iced::{Color, Length, Task};
use tokio_util::bytes::Bytes;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Submit,
    Vote,
    Delete,
}

#[derive(Debug, Clone)]
pub enum HomePageMessage {
    PlatformReady(bool),
    Refresh,
    QueueFetched(RefreshTicket, Result<Vec<QueueItem>, ApiError>),
    Mutated(Mutation, Result<(), ApiError>),
    SourceLoaded(MediaId, Result<Bytes, ResolveError>),
    ImageLoaded(String, Handle),
    ImageLoadFailed(String),
    InputChanged(String),
    AddToQueue,
    Vote(QueueItem, bool),
    Delete(QueueItem),
    DeleteCurrent,
    Skip,
    TogglePause,
    SetPaused(bool),
    VolumeChanged(u32),
    VolumeReleased,
    Logout,
}

type Mh = HomePageMessage;

pub struct HomePage {
    settings: AppSettings,
    jukebox: Jukebox<ApiClient, AudioPlatform>,
    resolver: MediaResolver,
    input_url: String,
    preview: Option<SubmissionPreview>,
    submit_error: Option<String>,
    images: HashMap<String, Handle>,
    requested_images: HashSet<String>,
}

impl HomePage {
    pub fn new(settings: AppSettings, token: String) -> Result<(Self, Task<Message>), ApiError> {
        let client = ApiClient::new(&settings.api_url(), token)?;
        let resolver = MediaResolver::new(&settings.player);

        let mut jukebox = Jukebox::new(Arc::new(client), AudioPlatform::new());
        jukebox.playback_mut().set_volume(settings.player.volume);

        let mut page = Self {
            settings,
            jukebox,
            resolver,
            input_url: String::new(),
            preview: None,
            submit_error: None,
            images: HashMap::new(),
            requested_images: HashSet::new(),
        };

        let readiness = Task::perform(page.resolver.clone().ready(), |ready| {
            Message::HomePage(Mh::PlatformReady(ready))
        });
        let refresh = page.refresh();

        Ok((page, Task::batch([readiness, refresh])))
    }

    fn refresh(&mut self) -> Task<Message> {
        let (ticket, fetch) = self.jukebox.refresh();
        Self::fetch(ticket, fetch)
    }

    fn fetch(ticket: RefreshTicket, fetch: QueueFuture<Vec<QueueItem>>) -> Task<Message> {
        Task::perform(fetch, move |result| {
            Message::HomePage(Mh::QueueFetched(ticket, result))
        })
    }

    fn mutate(kind: Mutation, request: QueueFuture<()>) -> Task<Message> {
        Task::perform(request, move |result| {
            Message::HomePage(Mh::Mutated(kind, result))
        })
    }

    fn cue(&self, cue: Cue) -> Task<Message> {
        match cue {
            Cue::Load(media_id) => {
                let id = media_id.clone();
                let load = Task::perform(self.resolver.clone().fetch_audio(media_id), move |result| {
                    Message::HomePage(Mh::SourceLoaded(id.clone(), result))
                });
                Task::batch([load, self.announce_current()])
            }
            Cue::Stopped => Task::done(Message::MediaSession(MediaSession::Stopped)),
            Cue::Idle => Task::none(),
        }
    }

    fn announce_current(&self) -> Task<Message> {
        match self.jukebox.queue().current_item() {
            Some(item) => Task::done(Message::MediaSession(MediaSession::Track {
                title: item.display_title().to_string(),
                submitter: item.submitter_label(),
                cover_url: item.artwork_url(),
            })),
            None => Task::none(),
        }
    }

    fn announce_paused(&self) -> Task<Message> {
        Task::done(Message::MediaSession(MediaSession::Paused(
            self.jukebox.playback().is_paused(),
        )))
    }

    fn load_images(&mut self, urls: Vec<String>) -> Task<Message> {
        let wanted: Vec<String> = urls
            .into_iter()
            .filter(|url| !self.images.contains_key(url) && self.requested_images.insert(url.clone()))
            .collect();

        if wanted.is_empty() {
            return Task::none();
        }

        Task::batch(utilities::image_load_tasks(
            wanted,
            |url, handle| Message::HomePage(Mh::ImageLoaded(url, handle)),
            |url| Message::HomePage(Mh::ImageLoadFailed(url)),
        ))
    }

    fn on_api_error(&self, context: &str, error: &ApiError) -> Task<Message> {
        warn!("{} failed: {}", context, error);
        if error.is_unauthorized() {
            info!("Session rejected by the service, logging out");
            Task::done(Message::LoggedOut)
        } else {
            Task::none()
        }
    }
}

impl Page for HomePage {
    fn update(&mut self, message: Message) -> (Option<Box<dyn Page>>, Task<Message>) {
        let msg = match message {
            Message::HomePage(msg) => msg,
            Message::UiTick => {
                let cue = self.jukebox.tick();
                return (None, self.cue(cue));
            }
            _ => return (None, Task::none()),
        };

        let task = match msg {
            HomePageMessage::PlatformReady(ready) => {
                if ready {
                    let cue = self.jukebox.platform_ready();
                    self.cue(cue)
                } else {
                    warn!(
                        "`{}` is not available, playback disabled",
                        self.settings.player.resolver_command
                    );
                    Task::none()
                }
            }
            HomePageMessage::Refresh => self.refresh(),
            HomePageMessage::QueueFetched(ticket, result) => {
                match self.jukebox.queue_fetched(ticket, result) {
                    Ok((RefreshOutcome::Applied, cue)) => {
                        let artwork = self
                            .jukebox
                            .queue()
                            .items()
                            .iter()
                            .filter_map(QueueItem::artwork_url)
                            .collect();
                        let images = self.load_images(artwork);
                        Task::batch([images, self.cue(cue)])
                    }
                    Ok((RefreshOutcome::Stale, _)) => Task::none(),
                    Err(e) => self.on_api_error("Queue refresh", &e),
                }
            }
            HomePageMessage::Mutated(kind, result) => match self.jukebox.mutation_finished(result) {
                Ok((ticket, fetch)) => {
                    debug!("{:?} succeeded, refreshing queue", kind);
                    if kind == Mutation::Submit {
                        self.input_url.clear();
                        self.preview = None;
                    }
                    Self::fetch(ticket, fetch)
                }
                Err(e) => {
                    if kind == Mutation::Submit {
                        self.submit_error = Some(format!("Could not add song: {}", e));
                    }
                    self.on_api_error(&format!("{:?}", kind), &e)
                }
            },
            HomePageMessage::SourceLoaded(media_id, result) => {
                match result {
                    Ok(bytes) => match self.jukebox.playback_mut().attach_source(&media_id, bytes) {
                        Ok(true) => info!("Playing {}", media_id),
                        Ok(false) => {}
                        Err(e) => warn!("Cannot play {}: {}", media_id, e),
                    },
                    Err(e) => warn!("Failed to load audio for {}: {}", media_id, e),
                }
                Task::none()
            }
            HomePageMessage::ImageLoaded(url, handle) => {
                self.images.insert(url, handle);
                Task::none()
            }
            HomePageMessage::ImageLoadFailed(url) => {
                debug!("Failed to load image {}", url);
                Task::none()
            }
            HomePageMessage::InputChanged(input) => {
                self.preview = media::preview_for(&input);
                self.input_url = input;
                self.submit_error = None;
                match &self.preview {
                    Some(preview) => {
                        let url = preview.thumbnail_url.clone();
                        self.load_images(vec![url])
                    }
                    None => Task::none(),
                }
            }
            HomePageMessage::AddToQueue => match self.jukebox.submit(&self.input_url) {
                Ok(request) => {
                    self.submit_error = None;
                    Self::mutate(Mutation::Submit, request)
                }
                Err(QueueError::UnsupportedLink(link)) => {
                    debug!("Rejected submission {:?}", link);
                    self.submit_error = Some("Invalid YouTube URL".to_string());
                    Task::none()
                }
            },
            HomePageMessage::Vote(item, up) => Self::mutate(Mutation::Vote, self.jukebox.vote(&item, up)),
            HomePageMessage::Delete(item) => Self::mutate(Mutation::Delete, self.jukebox.remove(&item)),
            HomePageMessage::DeleteCurrent => match self.jukebox.remove_current() {
                Some(request) => Self::mutate(Mutation::Delete, request),
                None => Task::none(),
            },
            HomePageMessage::Skip => {
                let cue = self.jukebox.skip();
                self.cue(cue)
            }
            HomePageMessage::TogglePause => {
                self.jukebox.playback_mut().toggle_pause();
                self.announce_paused()
            }
            HomePageMessage::SetPaused(paused) => {
                let playback = self.jukebox.playback_mut();
                if playback.has_player() && playback.is_paused() != paused {
                    playback.toggle_pause();
                }
                self.announce_paused()
            }
            HomePageMessage::VolumeChanged(volume) => {
                self.settings.player.volume = volume;
                self.jukebox.playback_mut().set_volume(volume);
                Task::none()
            }
            HomePageMessage::VolumeReleased => {
                if let Err(e) = config::save_settings(&self.settings) {
                    warn!("Failed to save settings: {}", e);
                }
                Task::none()
            }
            HomePageMessage::Logout => Task::done(Message::LoggedOut),
        };

        (None, task)
    }

    fn view(&self) -> iced::Element<'_, Message> {
        let header = row![
            text("Bonktify").size(28),
            Space::with_width(Length::Fill),
            button("Refresh").on_press(Message::HomePage(Mh::Refresh)),
            button("Log out")
                .style(button::secondary)
                .on_press(Message::HomePage(Mh::Logout)),
        ]
        .spacing(10)
        .align_y(Vertical::Center);

        let queue = self.jukebox.queue();
        let playback = self.jukebox.playback();
        let current = queue.current_item();
        let now_playing = get_now_playing_bar(
            NowPlaying {
                item: current,
                artwork: current
                    .and_then(QueueItem::artwork_url)
                    .and_then(|url| self.images.get(&url).cloned()),
                state: playback.state(),
                paused: playback.is_paused(),
                position: (!queue.is_empty()).then(|| queue.active_index()),
                queue_length: queue.items().len(),
                has_next: queue.has_next(),
                volume: self.settings.player.volume,
            },
            Message::HomePage(Mh::TogglePause),
            Message::HomePage(Mh::Skip),
            Message::HomePage(Mh::DeleteCurrent),
            |volume| Message::HomePage(Mh::VolumeChanged(volume)),
            Message::HomePage(Mh::VolumeReleased),
        );

        let mut submit = column![
            text("Add a song").size(20),
            row![
                text_input("Paste YouTube URL here", &self.input_url)
                    .on_input(|s| Message::HomePage(Mh::InputChanged(s)))
                    .on_submit(Message::HomePage(Mh::AddToQueue)),
                button("Add to Queue").on_press_maybe(
                    self.preview
                        .as_ref()
                        .map(|_| Message::HomePage(Mh::AddToQueue))
                ),
            ]
            .spacing(10),
        ]
        .spacing(8);

        if let Some(preview) = &self.preview {
            let thumbnail: iced::Element<'_, Message> = match self.images.get(&preview.thumbnail_url) {
                Some(handle) => image(handle.clone()).width(120).height(68).into(),
                None => container(text("...")).width(120).height(68).center(Length::Fill).into(),
            };
            submit = submit.push(
                row![
                    thumbnail,
                    column![
                        text(preview.title.as_str()).size(16),
                        text(preview.media_id.watch_url()).size(12),
                    ]
                    .spacing(4),
                ]
                .spacing(10)
                .align_y(Vertical::Center),
            );
        }

        if let Some(error) = &self.submit_error {
            submit = submit.push(text(error.as_str()).color(Color::from_rgb(1.0, 0.35, 0.35)));
        }

        let queue_list = if queue.is_empty() {
            column![text("The queue is empty. Add some songs!")]
        } else {
            queue
                .items()
                .iter()
                .enumerate()
                .fold(column![].spacing(6), |list, (index, item)| {
                    let artwork = item
                        .artwork_url()
                        .and_then(|url| self.images.get(&url).cloned());
                    list.push(get_queue_item_widget(
                        item,
                        artwork,
                        index == queue.active_index(),
                        |item, up| Message::HomePage(Mh::Vote(item, up)),
                        |item| Message::HomePage(Mh::Delete(item)),
                    ))
                })
        };

        column![
            header,
            now_playing,
            submit,
            text(format!("Queue ({})", queue.items().len())).size(20),
            scrollable(queue_list).height(Length::Fill),
        ]
        .spacing(12)
        .padding(10)
        .into()
    }
}
