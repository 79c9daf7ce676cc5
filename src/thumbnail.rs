use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::errors::{AppError, AppResult};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

/// Bundled image shown when a video frame cannot be extracted.
pub const VIDEO_PLACEHOLDER: &str = "romfs:/video.png";

const JPEG_QUALITY: u8 = 75;

const FILM_DARK: Rgb<u8> = Rgb([20, 20, 20]);
const FILM_HOLE: Rgb<u8> = Rgb([220, 220, 220]);

/// Grabs a single frame of `source`, scaled to exactly `width`x`height`,
/// and writes it as JPEG to `dest`.
pub trait FrameExtractor {
    fn extract_frame(&self, source: &Path, dest: &Path, width: u32, height: u32) -> AppResult<()>;
}

/// Runs the `ffmpeg` binary found on `PATH`.
#[derive(Debug, Default, Clone)]
pub struct FfmpegExtractor;

impl FrameExtractor for FfmpegExtractor {
    fn extract_frame(&self, source: &Path, dest: &Path, width: u32, height: u32) -> AppResult<()> {
        let ffmpeg = which::which("ffmpeg")
            .map_err(|e| AppError::thumbnail_failed(source, format!("ffmpeg not found: {}", e)))?;

        let output = Command::new(ffmpeg)
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(source)
            .args(["-frames:v", "1", "-vf"])
            .arg(format!("thumbnail,scale={}:{}", width, height))
            .args(["-f", "image2", "-c:v", "mjpeg"])
            .arg(dest)
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::warn!("ffmpeg: {}", stderr.trim());
            return Err(AppError::thumbnail_failed(
                source,
                format!("ffmpeg exited with {}", output.status),
            ));
        }

        if !dest.exists() {
            return Err(AppError::thumbnail_failed(source, "ffmpeg produced no frame"));
        }

        Ok(())
    }
}

/// Size-specific preview images, cached in one directory.
///
/// A generated thumbnail is never regenerated: once `<name><w>x<h>.jpg`
/// exists it is returned as is.
pub struct Thumbnailer<E: FrameExtractor = FfmpegExtractor> {
    dir: PathBuf,
    extractor: E,
    placeholder: PathBuf,
}

impl Thumbnailer<FfmpegExtractor> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_extractor(dir, FfmpegExtractor)
    }
}

impl<E: FrameExtractor> Thumbnailer<E> {
    pub fn with_extractor(dir: impl Into<PathBuf>, extractor: E) -> Self {
        Self {
            dir: dir.into(),
            extractor,
            placeholder: PathBuf::from(VIDEO_PLACEHOLDER),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<PathBuf>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn placeholder(&self) -> &Path {
        &self.placeholder
    }

    pub fn thumbnail_path(&self, file: &Path, width: u32, height: u32) -> PathBuf {
        let name = file.file_name().unwrap_or_default().to_string_lossy();
        self.dir.join(format!("{}{}x{}.jpg", name, width, height))
    }

    /// Path to a `width`x`height` preview of `file`.
    ///
    /// Images are decoded, scaled and re-encoded; a decode or encode failure
    /// is an error. Videos go through the frame extractor and get a film
    /// strip; if that fails the placeholder path is returned and nothing is
    /// cached. Any other file is returned unchanged.
    pub fn get_thumbnail(&self, file: impl AsRef<Path>, width: u32, height: u32) -> AppResult<PathBuf> {
        let file = file.as_ref();
        let thumb = self.thumbnail_path(file, width, height);
        if thumb.exists() {
            return Ok(thumb);
        }

        let extension = file.extension().and_then(|e| e.to_str()).unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&extension) {
            validate_size(width, height)?;
            fs::create_dir_all(&self.dir)?;
            render_image(file, &thumb, width, height)?;
            log::info!("Generated thumbnail for {} at {}", file.display(), thumb.display());
            Ok(thumb)
        } else if VIDEO_EXTENSIONS.contains(&extension) {
            validate_size(width, height)?;
            fs::create_dir_all(&self.dir)?;
            match self.render_video(file, &thumb, width, height) {
                Ok(()) => Ok(thumb),
                Err(e) => {
                    log::warn!("Video thumbnail failed for {}: {}", file.display(), e);
                    if thumb.exists() {
                        if let Err(e) = fs::remove_file(&thumb) {
                            log::warn!("Failed to remove partial thumbnail {}: {}", thumb.display(), e);
                        }
                    }
                    Ok(self.placeholder.clone())
                }
            }
        } else {
            Ok(file.to_path_buf())
        }
    }

    fn render_video(&self, source: &Path, thumb: &Path, width: u32, height: u32) -> AppResult<()> {
        self.extractor.extract_frame(source, thumb, width, height)?;

        let mut frame = image::open(thumb)?.to_rgb8();
        overlay_film_strip(&mut frame);
        write_jpeg(&DynamicImage::ImageRgb8(frame), thumb)
    }
}

fn validate_size(width: u32, height: u32) -> AppResult<()> {
    if width == 0 || height == 0 {
        return Err(AppError::validation("size", "Thumbnail width and height must be non-zero"));
    }
    Ok(())
}

fn render_image(source: &Path, thumb: &Path, width: u32, height: u32) -> AppResult<()> {
    let img = image::open(source)?;
    let scaled = img.resize_exact(width, height, FilterType::Triangle);

    log::debug!(
        "Resized {} from {}x{} to {}x{}",
        source.display(),
        img.width(),
        img.height(),
        width,
        height
    );

    write_jpeg(&DynamicImage::ImageRgb8(scaled.to_rgb8()), thumb)
}

/// Encode in memory, write a sibling temp file, then rename it over `dest`.
/// `dest` is either untouched or complete.
fn write_jpeg(img: &DynamicImage, dest: &Path) -> AppResult<()> {
    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
    img.write_with_encoder(encoder)?;

    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let name = dest.file_name().unwrap_or_default().to_string_lossy();
    let temp_path = dir.join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()));

    if let Err(e) = fs::write(&temp_path, output).and_then(|_| fs::rename(&temp_path, dest)) {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", temp_path.display(), cleanup);
            }
        }
        return Err(e.into());
    }
    Ok(())
}

/// Paint sprocket-hole bands down the left and right edges.
pub fn overlay_film_strip(img: &mut RgbImage) {
    let (width, height) = img.dimensions();
    let band = (width / 12).max(1);
    if band * 2 >= width {
        return;
    }

    let hole = (band / 2).max(1);
    let inset = band / 4;

    for y in 0..height {
        let in_hole_row = y % (hole * 2) < hole;
        for offset in 0..band {
            let in_hole_col = offset >= inset && offset < band - inset;
            let color = if in_hole_row && in_hole_col {
                FILM_HOLE
            } else {
                FILM_DARK
            };
            img.put_pixel(offset, y, color);
            img.put_pixel(width - 1 - offset, y, color);
        }
    }
}
