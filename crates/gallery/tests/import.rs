use std::path::{Path, PathBuf};

use gallery::{
    db::{PhotoError, Repository},
    media,
};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    repo: Repository,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(&dir.path().join("db.sqlite3")).unwrap();
        std::fs::create_dir_all(dir.path().join("incoming")).unwrap();
        Self { dir, repo }
    }

    fn media_root(&self) -> PathBuf {
        self.dir.path().join("media")
    }

    fn png(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("incoming").join(name);
        image::RgbImage::new(3, 2).save(&path).unwrap();
        path
    }

    fn stored_files(&self) -> usize {
        let upload_dir = self.media_root().join(media::UPLOAD_DIR);
        if !upload_dir.exists() {
            return 0;
        }
        std::fs::read_dir(upload_dir).unwrap().count()
    }
}

async fn import(fx: &Fixture, title: &str, description: &str, src: &Path) -> anyhow::Result<()> {
    media::import_photo(
        &fx.repo,
        &fx.media_root(),
        title.to_string(),
        description.to_string(),
        src,
    )
    .await
    .map(|_| ())
}

#[tokio::test]
async fn imported_photo_is_stored_and_listed() {
    let fx = Fixture::new();
    let src = fx.png("sunset.png");

    let imported = media::import_photo(
        &fx.repo,
        &fx.media_root(),
        "Sunset".to_string(),
        "A photo of a sunset.".to_string(),
        &src,
    )
    .await
    .unwrap();

    assert_eq!(imported.photo.image, "gallery/sunset.png");
    assert_eq!((imported.width, imported.height), (3, 2));
    assert!(fx.media_root().join("gallery/sunset.png").is_file());
    assert_eq!(fx.repo.list_photos().await.unwrap(), vec![imported.photo]);
}

#[tokio::test]
async fn rejected_row_leaves_no_file_behind() {
    let fx = Fixture::new();
    let src = fx.png("sunset.png");

    let err = import(&fx, &"x".repeat(101), "A photo of a sunset.", &src)
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<PhotoError>(),
        Some(&PhotoError::TitleTooLong(101))
    );
    assert_eq!(fx.stored_files(), 0);
    assert_eq!(fx.repo.count_photos().await.unwrap(), 0);
}

#[tokio::test]
async fn blank_description_leaves_no_file_behind() {
    let fx = Fixture::new();
    let src = fx.png("sunset.png");

    let err = import(&fx, "Sunset", " ", &src).await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<PhotoError>(),
        Some(&PhotoError::EmptyDescription)
    );
    assert_eq!(fx.stored_files(), 0);
}

#[tokio::test]
async fn database_failure_leaves_no_file_behind() {
    let fx = Fixture::new();
    let src = fx.png("sunset.png");
    let conn = rusqlite::Connection::open(fx.dir.path().join("db.sqlite3")).unwrap();
    conn.execute_batch("DROP TABLE gallery_photo;").unwrap();
    drop(conn);

    assert!(import(&fx, "Sunset", "A photo of a sunset.", &src).await.is_err());
    assert_eq!(fx.stored_files(), 0);
}

#[tokio::test]
async fn non_image_is_refused_before_copying() {
    let fx = Fixture::new();
    let src = fx.dir.path().join("incoming").join("notes.png");
    std::fs::write(&src, b"plain text").unwrap();

    assert!(import(&fx, "Notes", "Not a picture.", &src).await.is_err());
    assert_eq!(fx.stored_files(), 0);
    assert_eq!(fx.repo.count_photos().await.unwrap(), 0);
}

#[tokio::test]
async fn long_file_name_is_shortened_instead_of_rejected() {
    let fx = Fixture::new();
    let src = fx.png(&format!("{}.png", "a".repeat(120)));

    let imported = media::import_photo(
        &fx.repo,
        &fx.media_root(),
        "Long".to_string(),
        "Very long file name.".to_string(),
        &src,
    )
    .await
    .unwrap();

    assert_eq!(imported.photo.image.chars().count(), 100);
    assert!(fx.media_root().join(&imported.photo.image).is_file());
}
