mod now_playing;
mod queue_item_widget;

pub use now_playing::{NowPlaying, get_now_playing_bar};
pub use queue_item_widget::get_queue_item_widget;
