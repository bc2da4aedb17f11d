use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tokio::task;

use super::{NewPhoto, Photo};

const POOL_SIZE: u32 = 4;

pub struct Repository {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Repository {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Opens (or creates) the database file and makes sure the schema exists.
    pub fn open(db_file: &Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(db_file);
        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .build(manager)
            .with_context(|| format!("cannot open database {}", db_file.display()))?;
        let repo = Self::new(pool);
        repo.init_schema()?;
        Ok(repo)
    }

    pub fn init_schema(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS gallery_photo (
                id           INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
                title        VARCHAR(100) NOT NULL,
                description  TEXT NOT NULL,
                image        VARCHAR(100) NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub async fn count_photos(&self) -> Result<usize> {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let conn = pool.get()?;
            let n: usize = conn.query_row("SELECT COUNT(*) FROM gallery_photo", [], |r| r.get(0))?;
            Ok(n)
        })
        .await?
    }

    /// Every photo in insertion order.
    pub async fn list_photos(&self) -> Result<Vec<Photo>> {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                r#"
                SELECT id, title, description, image
                FROM gallery_photo
                ORDER BY id ASC
                "#,
            )?;

            let photos = stmt
                .query_map([], |row| {
                    Ok(Photo {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        image: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(photos)
        })
        .await?
    }

    pub async fn add_photo(&self, new: NewPhoto) -> Result<Photo> {
        new.validate()?;

        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                r#"
                INSERT INTO gallery_photo (title, description, image)
                VALUES (?1, ?2, ?3)
                "#,
                params![new.title, new.description, new.image],
            )?;

            Ok(Photo {
                id: conn.last_insert_rowid(),
                title: new.title,
                description: new.description,
                image: new.image,
            })
        })
        .await?
    }
}
