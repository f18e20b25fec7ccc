use crate::error::{PadError, PadResult};
use image::io::Reader as ImageReader;
use image::{imageops, DynamicImage, ImageBuffer, ImageFormat, Pixel};
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Every file is read and written back in this encoding.
pub const FILE_FORMAT: ImageFormat = ImageFormat::Png;

/// Per-run padding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    multiple: u32,
    centered: bool,
}

impl Padding {
    pub fn new(multiple: u32, centered: bool) -> PadResult<Self> {
        if multiple == 0 {
            return Err(PadError::InvalidMultiple(multiple));
        }
        Ok(Self { multiple, centered })
    }

    pub fn multiple(&self) -> u32 {
        self.multiple
    }

    pub fn centered(&self) -> bool {
        self.centered
    }

    /// Each dimension grows by its own remainder against the multiple.
    ///
    /// This is `d + d % k`, not a round-up to the next multiple of `k`:
    /// a 100px edge with `k = 40` becomes 120, which is not divisible by 40.
    pub fn padded_size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            width + width % self.multiple,
            height + height % self.multiple,
        )
    }

    fn checked_padded_size(&self, width: u32, height: u32) -> PadResult<(u32, u32)> {
        let grow = |d: u32| d.checked_add(d % self.multiple);
        match (grow(width), grow(height)) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(PadError::CanvasTooLarge { width, height }),
        }
    }

    /// Where the original pixels land on the padded canvas.
    pub fn offset(&self, width: u32, height: u32) -> (u32, u32) {
        if !self.centered {
            return (0, 0);
        }
        let (new_width, new_height) = self.padded_size(width, height);
        ((new_width - width) / 2, (new_height - height) / 2)
    }
}

/// What padding did, or would do, to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PadOutcome {
    pub original: (u32, u32),
    pub padded: (u32, u32),
    pub offset: (u32, u32),
}

impl PadOutcome {
    fn new(padding: Padding, width: u32, height: u32) -> Self {
        Self {
            original: (width, height),
            padded: padding.padded_size(width, height),
            offset: padding.offset(width, height),
        }
    }

    pub fn is_resized(&self) -> bool {
        self.original != self.padded
    }
}

/// Copy `image` onto a zero-filled canvas of the padded size.
///
/// The canvas keeps the source color type, so the padding is transparent for
/// images with alpha and black for opaque ones. Color types without a
/// matching buffer are widened to RGBA8.
pub fn pad_image(image: &DynamicImage, padding: Padding) -> PadResult<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    let (new_width, new_height) = padding.checked_padded_size(width, height)?;
    let (x, y) = padding.offset(width, height);

    let canvas = match image {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(place_on_canvas(buf, new_width, new_height, x, y))
        }
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(place_on_canvas(buf, new_width, new_height, x, y))
        }
        DynamicImage::ImageRgb8(buf) => {
            DynamicImage::ImageRgb8(place_on_canvas(buf, new_width, new_height, x, y))
        }
        DynamicImage::ImageRgba8(buf) => {
            DynamicImage::ImageRgba8(place_on_canvas(buf, new_width, new_height, x, y))
        }
        DynamicImage::ImageLuma16(buf) => {
            DynamicImage::ImageLuma16(place_on_canvas(buf, new_width, new_height, x, y))
        }
        DynamicImage::ImageLumaA16(buf) => {
            DynamicImage::ImageLumaA16(place_on_canvas(buf, new_width, new_height, x, y))
        }
        DynamicImage::ImageRgb16(buf) => {
            DynamicImage::ImageRgb16(place_on_canvas(buf, new_width, new_height, x, y))
        }
        DynamicImage::ImageRgba16(buf) => {
            DynamicImage::ImageRgba16(place_on_canvas(buf, new_width, new_height, x, y))
        }
        other => DynamicImage::ImageRgba8(place_on_canvas(
            &other.to_rgba8(),
            new_width,
            new_height,
            x,
            y,
        )),
    };
    Ok(canvas)
}

fn place_on_canvas<P: Pixel>(
    source: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    x: u32,
    y: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let mut canvas: ImageBuffer<P, Vec<P::Subpixel>> = ImageBuffer::new(width, height);
    imageops::replace(&mut canvas, source, x as i64, y as i64);
    canvas
}

/// Pad the PNG at `path` and overwrite it in place.
///
/// The file is re-encoded even when its size does not change. The new image
/// is written to a sibling temp file first and renamed over `path`, so a
/// failed encode leaves the original untouched.
pub fn pad_file(path: &Path, padding: Padding) -> PadResult<PadOutcome> {
    let image = open_reader(path)?
        .decode()
        .map_err(|source| PadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let canvas = pad_image(&image, padding)?;
    let outcome = PadOutcome::new(padding, image.width(), image.height());
    replace_file(path, &canvas)?;

    log::debug!(
        "Padded {}: {:?} -> {:?} at {:?}",
        path.display(),
        outcome.original,
        outcome.padded,
        outcome.offset
    );
    Ok(outcome)
}

fn replace_file(path: &Path, canvas: &DynamicImage) -> PadResult<()> {
    let write_err = |source| PadError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).map_err(write_err)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        canvas
            .write_to(&mut writer, FILE_FORMAT)
            .map_err(|source| PadError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(write_err)?;
    }
    fs::set_permissions(tmp.path(), permissions).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Report what [`pad_file`] would do, reading only the image header.
pub fn plan_file(path: &Path, padding: Padding) -> PadResult<PadOutcome> {
    let (width, height) = open_reader(path)?
        .into_dimensions()
        .map_err(|source| PadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(PadOutcome::new(padding, width, height))
}

fn open_reader(path: &Path) -> PadResult<ImageReader<std::io::BufReader<std::fs::File>>> {
    let mut reader = ImageReader::open(path).map_err(|source| PadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    reader.set_format(FILE_FORMAT);
    Ok(reader)
}
