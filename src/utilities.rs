use iced::Task;
use iced::widget::image::Handle;

use crate::Message;

pub async fn download_image(url: &str) -> Result<Handle, Box<dyn std::error::Error + Send + Sync>> {
    let response = reqwest::get(url).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {} fetching {}", status, url).into());
    }

    let bytes = response.bytes().await?;
    Ok(Handle::from_bytes(bytes))
}

/// One download task per URL, mapped to page messages.
pub fn image_load_tasks<F>(
    urls: impl IntoIterator<Item = String>,
    on_loaded: F,
    on_failed: fn(String) -> Message,
) -> Vec<Task<Message>>
where
    F: Fn(String, Handle) -> Message + Clone + Send + 'static,
{
    urls.into_iter()
        .map(|url| {
            let on_loaded = on_loaded.clone();
            let key = url.clone();
            Task::perform(
                async move { download_image(&url).await.map_err(|e| e.to_string()) },
                move |result| match result {
                    Ok(handle) => on_loaded(key.clone(), handle),
                    Err(_) => on_failed(key.clone()),
                },
            )
        })
        .collect()
}
