use serde::{Deserialize, Serialize};

use super::Photo;

/// Wire shape of a photo in `GET /api/photos/`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PhotoDto {
    pub title: String,
    pub description: String,
    pub image: String,
}

impl From<Photo> for PhotoDto {
    fn from(photo: Photo) -> Self {
        Self {
            title: photo.title,
            description: photo.description,
            image: photo.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_drops_the_row_id() {
        let photo = Photo {
            id: 7,
            title: "Sunset".into(),
            description: "A photo of a sunset.".into(),
            image: "gallery/sunset.jpg".into(),
        };

        let dto = PhotoDto::from(photo);
        assert_eq!(dto.title, "Sunset");
        assert_eq!(dto.description, "A photo of a sunset.");
        assert_eq!(dto.image, "gallery/sunset.jpg");
    }
}
