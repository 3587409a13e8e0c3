//! Generated placeholder avatars.
//!
//! Each passport maps to a symmetric 5×5 identicon whose pattern and colour
//! come from a SHA-256 of the passport, encoded as JPEG. Files land at
//! `<root>/<passport>.jpg`, matching the `/upload/avatar/<passport>.jpg` URL
//! stored on the account.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::domain::Passport;
use crate::domain::ports::{AvatarError, AvatarStore, RenderedAvatar};

const GRID: u32 = 5;
const CELL: u32 = 40;
const MARGIN: u32 = 20;
const SIDE: u32 = GRID * CELL + 2 * MARGIN;
const BACKGROUND: Rgb<u8> = Rgb([240, 240, 240]);

/// Writes identicons below a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemAvatarStore {
    root: PathBuf,
}

impl FilesystemAvatarStore {
    /// Store rooted at `root`, usually `<upload path>/avatar`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding avatar files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `passport`'s generated avatar.
    pub fn path_for(&self, passport: &Passport) -> PathBuf {
        self.root.join(format!("{passport}.jpg"))
    }

    /// Create the root directory if it is missing.
    pub async fn ensure_root(&self) -> Result<(), AvatarError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|err| AvatarError::write(self.root.display().to_string(), err.to_string()))
    }
}

/// Render the identicon for `passport` as RGB pixels.
pub fn identicon(passport: &Passport) -> RgbImage {
    let digest = Sha256::digest(passport.as_str().as_bytes());
    // Keep the colour away from the light background.
    let colour = Rgb([digest[0] / 2 + 32, digest[1] / 2 + 32, digest[2] / 2 + 32]);
    let half = GRID.div_ceil(2);

    let mut cells = [[false; GRID as usize]; GRID as usize];
    for row in 0..GRID as usize {
        for col in 0..half as usize {
            let bit = digest[3 + row * half as usize + col] & 1 == 1;
            cells[row][col] = bit;
            cells[row][GRID as usize - 1 - col] = bit;
        }
    }

    RgbImage::from_fn(SIDE, SIDE, |x, y| {
        let inside = (MARGIN..SIDE - MARGIN).contains(&x) && (MARGIN..SIDE - MARGIN).contains(&y);
        if !inside {
            return BACKGROUND;
        }
        let col = ((x - MARGIN) / CELL) as usize;
        let row = ((y - MARGIN) / CELL) as usize;
        if cells[row][col] { colour } else { BACKGROUND }
    })
}

#[async_trait]
impl AvatarStore for FilesystemAvatarStore {
    fn render(&self, passport: &Passport) -> Result<RenderedAvatar, AvatarError> {
        let image = identicon(passport);
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .map_err(|err| AvatarError::render(err.to_string()))?;
        Ok(RenderedAvatar {
            passport: passport.clone(),
            bytes,
        })
    }

    async fn save(&self, avatar: &RenderedAvatar) -> Result<(), AvatarError> {
        self.ensure_root().await?;
        let path = self.path_for(&avatar.passport);
        fs::write(&path, &avatar.bytes)
            .await
            .map_err(|err| AvatarError::write(path.display().to_string(), err.to_string()))?;
        debug!(path = %path.display(), "avatar written");
        Ok(())
    }
}
