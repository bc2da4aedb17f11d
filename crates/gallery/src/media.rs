//! Copies images into the media root on behalf of the admin CLI.

use std::{
    ffi::OsStr,
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};

use crate::db::{IMAGE_MAX_LEN, NewPhoto, Photo, Repository};

/// Subdirectory of the media root that gallery images land in.
pub const UPLOAD_DIR: &str = "gallery";

const SUFFIX_LEN: usize = 7;
const MAX_NAME_ATTEMPTS: usize = 100;

/// A file copied below the media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Path relative to the media root, always `/`-separated.
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPhoto {
    pub photo: Photo,
    pub width: u32,
    pub height: u32,
}

/// Fails unless `src` decodes as a supported image.
pub fn check_image(src: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(src)
        .with_context(|| format!("{} is not a readable image", src.display()))
}

/// Checks `src`, copies it below the media root and registers it.
/// The copy is removed again when the row cannot be stored.
pub async fn import_photo(
    repo: &Repository,
    media_root: &Path,
    title: String,
    description: String,
    src: &Path,
) -> Result<ImportedPhoto> {
    let (width, height) = check_image(src)?;
    let stored = store_image(media_root, src)?;

    let new = NewPhoto {
        title,
        description,
        image: stored.name.clone(),
    };
    match repo.add_photo(new).await {
        Ok(photo) => Ok(ImportedPhoto {
            photo,
            width,
            height,
        }),
        Err(e) => {
            if let Err(rm) = std::fs::remove_file(&stored.path) {
                tracing::warn!("cannot remove {}: {rm}", stored.path.display());
            }
            Err(e)
        }
    }
}

/// Copies `src` into `<media_root>/gallery/`, keeping its file name unless taken.
/// Long names are shortened so the stored path fits the `image` column.
pub fn store_image(media_root: &Path, src: &Path) -> Result<StoredImage> {
    let Some(file_name) = src.file_name().and_then(OsStr::to_str) else {
        bail!("{} has no usable file name", src.display());
    };

    let upload_dir = media_root.join(UPLOAD_DIR);
    std::fs::create_dir_all(&upload_dir)
        .with_context(|| format!("cannot create {}", upload_dir.display()))?;

    let mut source = File::open(src).with_context(|| format!("cannot open {}", src.display()))?;
    let (file_name, mut dest) = create_available(&upload_dir, file_name)?;
    let path = upload_dir.join(&file_name);

    if let Err(e) = io::copy(&mut source, &mut dest).and_then(|_| dest.sync_all()) {
        drop(dest);
        let _ = std::fs::remove_file(&path);
        return Err(e)
            .with_context(|| format!("cannot copy {} to {}", src.display(), path.display()));
    }
    tracing::debug!("stored {}", path.display());

    Ok(StoredImage {
        name: format!("{UPLOAD_DIR}/{file_name}"),
        path,
    })
}

/// Creates a file in `dir` that did not exist before, suffixing the name until one is free.
fn create_available(dir: &Path, file_name: &str) -> Result<(String, File)> {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(OsStr::to_str).unwrap_or(file_name);
    let ext = path.extension().and_then(OsStr::to_str);
    let budget = IMAGE_MAX_LEN - UPLOAD_DIR.len() - 1;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let suffix = (attempt > 0).then(random_suffix);
        let candidate = fit_name(stem, suffix.as_deref(), ext, budget)?;
        let opened = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&candidate));
        match opened {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("cannot create {candidate} in {}", dir.display()));
            }
        }
    }

    bail!("no free name for {file_name} in {}", dir.display())
}

/// `stem[_suffix][.ext]`, with the stem cut so the whole name is at most `budget` chars.
fn fit_name(
    stem: &str,
    suffix: Option<&str>,
    ext: Option<&str>,
    budget: usize,
) -> Result<String> {
    let mut tail = String::new();
    if let Some(suffix) = suffix {
        tail.push('_');
        tail.push_str(suffix);
    }
    if let Some(ext) = ext {
        tail.push('.');
        tail.push_str(ext);
    }

    let stem_budget = budget.saturating_sub(tail.chars().count());
    if stem_budget == 0 {
        bail!("file name {stem}{tail} cannot be shortened to {budget} characters");
    }
    let stem: String = stem.chars().take(stem_budget).collect();
    Ok(format!("{stem}{tail}"))
}

fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..SUFFIX_LEN].to_string()
}
