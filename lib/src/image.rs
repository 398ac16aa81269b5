//! Module handling *dynamic* images stored in the database, as opposed to
//! *static* image assets.
//!
//! Stored images are opaque blobs. The gallery layer references them by id
//! and never looks inside; they are served back verbatim from the media
//! route.

use crate::db::{Collectable, Identifiable};
use crate::{routes, Config};

pub type ImageId = uuid::Uuid;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Image {
    pub id: ImageId,
    pub bytes: Vec<u8>,
    /// Content type as declared at upload time, replayed on serving.
    pub content_type: String,
}

impl Image {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            id: ImageId::new_v4(),
            bytes,
            content_type: content_type.into(),
        }
    }

    /// Absolute url under which the image bytes can be retrieved.
    pub fn url(id: ImageId, config: &Config) -> String {
        format!("{}{}/{}", config.base_url(), routes::MEDIA, id)
    }
}

impl Collectable for Image {
    fn get_collection_name() -> &'static str {
        "images"
    }
}

impl Identifiable for Image {
    fn get_id(&self) -> uuid::Uuid {
        self.id
    }
}
