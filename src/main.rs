use std::time::Duration;

use crate::managers::{MediaControlsBridge, MediaSession};
use crate::pages::{AuthPage, HomePage, HomePageMessage};
use crate::session::TokenStore;
use iced::{
    Event, Subscription, Task,
    event::{self, Status},
    keyboard::{Event::KeyPressed, Key, key::Named},
    time,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    iced::application("Bonktify", App::update, App::view)
        .theme(|_| iced::Theme::CatppuccinMocha)
        .subscription(App::subscription)
        .run_with(App::new)
}

mod api;
mod config;
mod constants;
mod managers;
mod media;
mod models;
mod pages;
mod session;
mod utilities;
mod widgets;

#[derive(Debug, Clone)]
enum Message {
    AuthPage(pages::AuthPageMessage),
    HomePage(pages::HomePageMessage),
    UiTick,
    MediaControlEvent(souvlaki::MediaControlEvent),
    MediaSession(MediaSession),
    LoggedIn(String),
    LoggedOut,
}

trait Page {
    fn update(&mut self, message: Message) -> (Option<Box<dyn Page>>, Task<Message>);
    fn view(&self) -> iced::Element<'_, Message>;
}

struct App {
    page: Box<dyn Page>,
    settings: config::AppSettings,
    tokens: TokenStore,
    media_controls: Option<MediaControlsBridge>,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let settings = config::load_settings();
        let tokens = TokenStore::new();

        let mut app = Self {
            page: Box::new(AuthPage::new(settings.api_url())),
            settings,
            tokens,
            media_controls: MediaControlsBridge::new(),
        };

        let task = match app.tokens.load() {
            Some(token) => {
                info!("Resuming saved session");
                app.open_home(token)
            }
            None => Task::none(),
        };

        (app, task)
    }

    fn open_home(&mut self, token: String) -> Task<Message> {
        match HomePage::new(self.settings.clone(), token) {
            Ok((page, task)) => {
                self.page = Box::new(page);
                task
            }
            Err(e) => {
                warn!("Cannot reach queue service at {}: {}", self.settings.api_url(), e);
                self.page = Box::new(AuthPage::with_error(
                    self.settings.api_url(),
                    format!("Invalid service address: {}", e),
                ));
                Task::none()
            }
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let (maybe_page, page_task) = self.page.update(message.clone());
        if let Some(page) = maybe_page {
            self.page = page;
        }

        let app_task = match message {
            Message::LoggedIn(token) => {
                if let Err(e) = self.tokens.save(&token) {
                    warn!("Failed to persist session token: {}", e);
                }
                self.open_home(token)
            }
            Message::LoggedOut => {
                if let Err(e) = self.tokens.clear() {
                    warn!("Failed to remove session token: {}", e);
                }
                info!("Logged out");
                // Dropping the home page tears down its player.
                self.page = Box::new(AuthPage::new(self.settings.api_url()));
                Task::done(Message::MediaSession(MediaSession::Stopped))
            }
            Message::UiTick => match self.media_controls.as_ref().and_then(MediaControlsBridge::try_recv) {
                Some(event) => Task::done(Message::MediaControlEvent(event)),
                None => Task::none(),
            },
            Message::MediaControlEvent(event) => match event {
                souvlaki::MediaControlEvent::Next => {
                    Task::done(Message::HomePage(HomePageMessage::Skip))
                }
                souvlaki::MediaControlEvent::Toggle => {
                    Task::done(Message::HomePage(HomePageMessage::TogglePause))
                }
                souvlaki::MediaControlEvent::Play => {
                    Task::done(Message::HomePage(HomePageMessage::SetPaused(false)))
                }
                souvlaki::MediaControlEvent::Pause => {
                    Task::done(Message::HomePage(HomePageMessage::SetPaused(true)))
                }
                _ => Task::none(),
            },
            Message::MediaSession(session) => {
                if let Some(controls) = self.media_controls.as_mut() {
                    controls.apply(&session);
                }
                Task::none()
            }
            _ => Task::none(),
        };

        Task::batch([page_task, app_task])
    }

    fn subscription(&self) -> iced::Subscription<Message> {
        let keyboard_listener = event::listen_with(|event, status, _| match (event, status) {
            (
                Event::Keyboard(KeyPressed {
                    key: Key::Named(Named::Space),
                    ..
                }),
                Status::Ignored,
            ) => Some(Message::HomePage(HomePageMessage::TogglePause)),
            (
                Event::Keyboard(KeyPressed {
                    key: Key::Named(Named::ArrowRight),
                    ..
                }),
                Status::Ignored,
            ) => Some(Message::HomePage(HomePageMessage::Skip)),
            _ => None,
        });

        Subscription::batch(vec![
            keyboard_listener,
            time::every(Duration::from_millis(200)).map(|_| Message::UiTick),
        ])
    }

    fn view(&self) -> iced::Element<'_, Message> {
        self.page.view()
    }
}
