mod photo;
mod photo_dto;
mod repository;

pub use photo::{IMAGE_MAX_LEN, NewPhoto, Photo, PhotoError, TITLE_MAX_LEN};
pub use photo_dto::PhotoDto;
pub use repository::Repository;
