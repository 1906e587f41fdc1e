mod auth_page;
mod home_page;

pub use auth_page::{AuthPage, AuthPageMessage};
pub use home_page::{HomePage, HomePageMessage};
