//! Main page content: an ordered list of typed blocks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyBlock {
    /// Sanitized rich text.
    Paragraph { html: String },
    Image {
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        caption: Option<String>,
    },
    /// A media URL resolved by the front end (video, slides).
    EmbedUrl { url: String },
    EmbedHtml { html: String },
    Code {
        #[serde(default)]
        language: Option<String>,
        code: String,
    },
}
