use crate::api::{self, AuthError};
use crate::models::Credentials;
use crate::{Message, Page};
use iced::widget::{button, column, container, row, text, text_input};
use iced::{Color, Length, Task};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Clone)]
pub enum AuthPageMessage {
    UsernameChanged(String),
    PasswordChanged(String),
    Submit,
    SwitchMode,
    LoginFinished(Result<String, AuthError>),
    SignupFinished(Result<Option<String>, AuthError>),
}

type Ma = AuthPageMessage;

pub struct AuthPage {
    api_url: String,
    mode: AuthMode,
    username: String,
    password: String,
    error: Option<String>,
    notice: Option<String>,
    pending: bool,
}

impl AuthPage {
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            mode: AuthMode::Login,
            username: String::new(),
            password: String::new(),
            error: None,
            notice: None,
            pending: false,
        }
    }

    pub fn with_error(api_url: String, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(api_url)
        }
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        }
    }

    fn submit(&mut self) -> Task<Message> {
        if self.pending {
            return Task::none();
        }
        if self.username.trim().is_empty() || self.password.is_empty() {
            self.error = Some("Username and password are required".to_string());
            return Task::none();
        }

        self.pending = true;
        self.error = None;
        self.notice = None;

        let base_url = self.api_url.clone();
        let credentials = self.credentials();
        match self.mode {
            AuthMode::Login => Task::perform(api::login(base_url, credentials), |result| {
                Message::AuthPage(Ma::LoginFinished(result))
            }),
            AuthMode::Signup => Task::perform(api::signup(base_url, credentials), |result| {
                Message::AuthPage(Ma::SignupFinished(result))
            }),
        }
    }
}

impl Page for AuthPage {
    fn update(&mut self, message: Message) -> (Option<Box<dyn Page>>, Task<Message>) {
        let Message::AuthPage(msg) = message else {
            return (None, Task::none());
        };

        match msg {
            AuthPageMessage::UsernameChanged(username) => {
                self.username = username;
                (None, Task::none())
            }
            AuthPageMessage::PasswordChanged(password) => {
                self.password = password;
                (None, Task::none())
            }
            AuthPageMessage::Submit => (None, self.submit()),
            AuthPageMessage::SwitchMode => {
                self.mode = match self.mode {
                    AuthMode::Login => AuthMode::Signup,
                    AuthMode::Signup => AuthMode::Login,
                };
                self.error = None;
                self.notice = None;
                (None, Task::none())
            }
            AuthPageMessage::LoginFinished(result) => {
                self.pending = false;
                match result {
                    Ok(token) => {
                        self.password.clear();
                        (None, Task::done(Message::LoggedIn(token)))
                    }
                    Err(e) => {
                        debug!("Login failed: {}", e);
                        self.error = Some(e.user_message("Login failed"));
                        (None, Task::none())
                    }
                }
            }
            AuthPageMessage::SignupFinished(result) => {
                self.pending = false;
                match result {
                    Ok(Some(token)) => {
                        self.password.clear();
                        (None, Task::done(Message::LoggedIn(token)))
                    }
                    Ok(None) => {
                        info!("No token after signup, login required");
                        self.mode = AuthMode::Login;
                        self.password.clear();
                        self.notice = Some("Account created. Please log in.".to_string());
                        (None, Task::none())
                    }
                    Err(e) => {
                        debug!("Signup failed: {}", e);
                        self.error = Some(e.user_message("Signup failed"));
                        (None, Task::none())
                    }
                }
            }
        }
    }

    fn view(&self) -> iced::Element<'_, Message> {
        let (heading, action, switch_label) = match self.mode {
            AuthMode::Login => ("Log in", "Log in", "Need an account? Sign up"),
            AuthMode::Signup => ("Sign up", "Create account", "Have an account? Log in"),
        };

        let mut form = column![
            text("Bonktify").size(32),
            text(heading).size(20),
            text_input("Username", &self.username)
                .on_input(|s| Message::AuthPage(Ma::UsernameChanged(s)))
                .on_submit(Message::AuthPage(Ma::Submit)),
            text_input("Password", &self.password)
                .secure(true)
                .on_input(|s| Message::AuthPage(Ma::PasswordChanged(s)))
                .on_submit(Message::AuthPage(Ma::Submit)),
        ]
        .spacing(10)
        .width(320);

        if let Some(error) = &self.error {
            form = form.push(text(error.clone()).color(Color::from_rgb(1.0, 0.35, 0.35)));
        }
        if let Some(notice) = &self.notice {
            form = form.push(text(notice.clone()));
        }

        let submit = if self.pending {
            button("Please wait...")
        } else {
            button(action).on_press(Message::AuthPage(Ma::Submit))
        };

        form = form.push(
            row![
                submit,
                button(switch_label)
                    .style(button::text)
                    .on_press(Message::AuthPage(Ma::SwitchMode)),
            ]
            .spacing(10),
        );

        container(form)
            .center(Length::Fill)
            .padding(20)
            .into()
    }
}
