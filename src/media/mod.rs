mod extract;
mod resolver;

pub use extract::{extract_media_id, preview_for, MediaId, SubmissionPreview};
pub use resolver::{MediaResolver, ResolveError};
