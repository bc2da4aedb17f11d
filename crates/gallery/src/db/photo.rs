use thiserror::Error;

pub const TITLE_MAX_LEN: usize = 100;
pub const IMAGE_MAX_LEN: usize = 100;

/// A stored gallery photo. `image` is relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhotoError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title is {0} characters long, at most {max} allowed", max = TITLE_MAX_LEN)]
    TitleTooLong(usize),
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("image path must not be empty")]
    EmptyImage,
    #[error("image path is {0} characters long, at most {max} allowed", max = IMAGE_MAX_LEN)]
    ImagePathTooLong(usize),
}

impl NewPhoto {
    pub fn validate(&self) -> Result<(), PhotoError> {
        if self.title.trim().is_empty() {
            return Err(PhotoError::EmptyTitle);
        }
        let title_len = self.title.chars().count();
        if title_len > TITLE_MAX_LEN {
            return Err(PhotoError::TitleTooLong(title_len));
        }

        if self.description.trim().is_empty() {
            return Err(PhotoError::EmptyDescription);
        }

        if self.image.trim().is_empty() {
            return Err(PhotoError::EmptyImage);
        }
        let image_len = self.image.chars().count();
        if image_len > IMAGE_MAX_LEN {
            return Err(PhotoError::ImagePathTooLong(image_len));
        }

        Ok(())
    }
}
