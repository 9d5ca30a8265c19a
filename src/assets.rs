use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use log::{error, info};
use thiserror::Error;

use crate::scene::TextureSlot;

/// Reasons a texture file could not be turned into pixels.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unable to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} is {width}x{height}, larger than the {max}px texture limit")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub fallback: bool,
}

impl TextureImage {
    /// Decodes an image file, sniffing the format from its contents.
    /// Images wider or taller than `max_dimension` are rejected.
    pub fn load<P: AsRef<Path>>(path: P, max_dimension: u32) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| AssetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let rgba = reader
            .decode()
            .map_err(|source| AssetError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        if !fits(rgba.width(), rgba.height(), max_dimension) {
            return Err(AssetError::TooLarge {
                path: path.to_path_buf(),
                width: rgba.width(),
                height: rgba.height(),
                max: max_dimension,
            });
        }
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
            fallback: false,
        })
    }

    /// Magenta and black 2x2 checker used in place of a missing texture.
    pub fn fallback() -> Self {
        const MAGENTA: [u8; 4] = [255, 0, 255, 255];
        const BLACK: [u8; 4] = [0, 0, 0, 255];
        Self {
            width: 2,
            height: 2,
            pixels: [MAGENTA, BLACK, BLACK, MAGENTA].concat(),
            fallback: true,
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }

    pub fn fits_within(&self, max_dimension: u32) -> bool {
        fits(self.width, self.height, max_dimension)
    }
}

fn fits(width: u32, height: u32, max_dimension: u32) -> bool {
    width <= max_dimension && height <= max_dimension
}

/// All scene textures, decoded from disk once at startup.
#[derive(Debug, Clone)]
pub struct TextureSet {
    images: HashMap<TextureSlot, TextureImage>,
}

impl TextureSet {
    /// Loads every texture slot from `root`. Files that fail to load or
    /// exceed `max_dimension` are logged and replaced by
    /// [`TextureImage::fallback`].
    pub fn load(root: &Path, max_dimension: u32) -> Self {
        let images = TextureSlot::ALL
            .iter()
            .map(|&slot| {
                let path = root.join(slot.relative_path());
                let image = TextureImage::load(&path, max_dimension).unwrap_or_else(|err| {
                    error!("texture {slot:?} unavailable, using fallback: {err}");
                    TextureImage::fallback()
                });
                (slot, image)
            })
            .collect::<HashMap<_, _>>();
        let set = Self { images };
        info!(
            "loaded {}/{} textures from {}",
            set.loaded_count(),
            TextureSlot::ALL.len(),
            root.display()
        );
        set
    }

    pub fn get(&self, slot: TextureSlot) -> &TextureImage {
        &self.images[&slot]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureSlot, &TextureImage)> {
        TextureSlot::ALL.iter().map(move |&slot| (slot, self.get(slot)))
    }

    /// Number of slots backed by a real file rather than the fallback.
    pub fn loaded_count(&self) -> usize {
        self.images.values().filter(|image| !image.fallback).count()
    }
}
