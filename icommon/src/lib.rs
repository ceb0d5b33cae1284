use anyhow::Result;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::{self, FilterType};
use image::{
    DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, Rgba, Rgba32FImage, RgbaImage,
};
use std::io::Write;
use std::path::Path;

/// Dimensions of a `width` x `height` image scaled uniformly so that its
/// longer side is exactly `size`.
///
/// Both sides are rounded half to even and never drop below one pixel.
pub fn fit(width: u32, height: u32, size: u32) -> (u32, u32) {
    let target = size as f64;
    let scale = f64::min(target / width as f64, target / height as f64);
    let scaled = |side: u32| ((side as f64 * scale).round_ties_even() as u32).max(1);
    (scaled(width), scaled(height))
}

fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Lanczos3 resize on premultiplied alpha, so the color of transparent
/// pixels does not bleed into antialiased edges.
fn resize(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let premultiplied = Rgba32FImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0.map(|c| c as f32 / 255.0);
        Rgba([r * a, g * a, b * a, a])
    });
    let scaled = imageops::resize(&premultiplied, width, height, FilterType::Lanczos3);
    RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = scaled.get_pixel(x, y).0;
        if a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba([to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)])
    })
}

/// Decoded source image that can be normalized into square icons of any size.
pub struct Scaler {
    img: RgbaImage,
}

impl Scaler {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let scaler = Self::new(ImageReader::open(path)?.with_guessed_format()?.decode()?);
        let (width, height) = scaler.dimensions();
        tracing::debug!("decoded {} ({}x{})", path.display(), width, height);
        Ok(scaler)
    }

    pub fn new(img: DynamicImage) -> Self {
        Self {
            img: img.into_rgba8(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    /// Produces a `size` x `size` copy of the source.
    ///
    /// Square sources are scaled directly. Other sources are scaled to fit and
    /// alpha composited onto the center of a transparent canvas, so nothing is
    /// cropped and source transparency survives.
    pub fn normalize(&self, size: u32) -> Result<RgbaImage> {
        anyhow::ensure!(size > 0, "icon size must be positive");
        let (width, height) = self.img.dimensions();
        if width == height {
            if width == size {
                return Ok(self.img.clone());
            }
            return Ok(resize(&self.img, size, size));
        }
        let (new_width, new_height) = fit(width, height, size);
        let scaled = resize(&self.img, new_width, new_height);
        let mut canvas = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
        let x = size.saturating_sub(new_width) / 2;
        let y = size.saturating_sub(new_height) / 2;
        imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
        Ok(canvas)
    }

    /// Writes the normalized icon as an RGBA png using the strongest compression.
    pub fn write<W: Write>(&self, w: W, size: u32) -> Result<()> {
        let icon = self.normalize(size)?;
        PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive)
            .write_image(icon.as_raw(), size, size, ExtendedColorType::Rgba8)?;
        Ok(())
    }
}

impl From<RgbaImage> for Scaler {
    fn from(img: RgbaImage) -> Self {
        Self { img }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use std::io::Cursor;

    const RED: Rgba<u8> = Rgba([200, 30, 30, 255]);

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> Scaler {
        Scaler::from(RgbaImage::from_pixel(width, height, color))
    }

    fn close(a: &Rgba<u8>, b: &Rgba<u8>) -> bool {
        a.0.iter().zip(b.0).all(|(a, b)| a.abs_diff(b) <= 1)
    }

    #[test]
    fn fit_maps_longer_side_to_size() {
        assert_eq!(fit(300, 600, 144), (72, 144));
        assert_eq!(fit(600, 300, 144), (144, 72));
        assert_eq!(fit(1000, 10, 16), (16, 1));
        assert_eq!(fit(1, 5000, 48), (1, 48));
        // 5 * (16 / 32) = 2.5 rounds to the even neighbour.
        assert_eq!(fit(5, 32, 16), (2, 16));
        assert_eq!(fit(7, 32, 16), (4, 16));
    }

    #[test]
    fn normalize_is_always_square() -> Result<()> {
        let sources = [(512, 512), (300, 600), (600, 300), (17, 3), (1, 1)];
        for (width, height) in sources {
            let scaler = solid(width, height, RED);
            for size in [1, 16, 24, 48, 144, 256] {
                assert_eq!(scaler.normalize(size)?.dimensions(), (size, size));
            }
        }
        Ok(())
    }

    #[test]
    fn normalize_rejects_zero_size() {
        assert!(solid(4, 4, RED).normalize(0).is_err());
    }

    #[test]
    fn square_source_is_scaled_without_padding() -> Result<()> {
        let scaler = solid(512, 512, RED);
        let icon = scaler.normalize(48)?;
        let direct = resize(&scaler.img, 48, 48);
        assert_eq!(icon, direct);
        assert!(icon.pixels().all(|p| close(p, &RED)));
        Ok(())
    }

    #[test]
    fn normalize_at_own_size_is_identity() -> Result<()> {
        let mut img = RgbaImage::new(32, 32);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8 * 8, y as u8 * 8, 128, (x + y) as u8]);
        }
        let scaler = Scaler::from(img.clone());
        assert_eq!(scaler.normalize(32)?, img);
        Ok(())
    }

    #[test]
    fn portrait_source_is_centered_horizontally() -> Result<()> {
        let icon = solid(300, 600, RED).normalize(144)?;
        for (x, _, pixel) in icon.enumerate_pixels() {
            if (36..108).contains(&x) {
                assert_eq!(pixel[3], 255, "column {x}");
                assert!(close(pixel, &RED), "column {x}: {pixel:?}");
            } else {
                assert_eq!(pixel[3], 0, "column {x}");
            }
        }
        Ok(())
    }

    #[test]
    fn landscape_source_is_centered_vertically() -> Result<()> {
        // 90 x 40 fits to 48 x 21, leaving 13 rows above and 14 below.
        assert_eq!(fit(90, 40, 48), (48, 21));
        let icon = solid(90, 40, RED).normalize(48)?;
        for (_, y, pixel) in icon.enumerate_pixels() {
            if (13..34).contains(&y) {
                assert_eq!(pixel[3], 255, "row {y}");
            } else {
                assert_eq!(pixel[3], 0, "row {y}");
            }
        }
        Ok(())
    }

    #[test]
    fn translucent_content_is_not_flattened() -> Result<()> {
        let icon = solid(100, 50, Rgba([10, 20, 30, 128])).normalize(64)?;
        let content = icon.get_pixel(32, 32);
        assert!(content[3].abs_diff(128) <= 1, "alpha {}", content[3]);
        assert_eq!(icon.get_pixel(32, 0)[3], 0);
        assert_eq!(icon.get_pixel(32, 63)[3], 0);

        let clear = solid(100, 50, Rgba([255, 255, 255, 0])).normalize(64)?;
        assert!(clear.pixels().all(|p| p[3] == 0));
        Ok(())
    }

    #[test]
    fn transparent_black_does_not_darken_edges() -> Result<()> {
        let white = Rgba([255, 255, 255, 255]);
        let mut img = RgbaImage::new(64, 32);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            if x >= 32 {
                *pixel = white;
            }
        }
        let icon = Scaler::from(img).normalize(16)?;
        assert_eq!(icon.get_pixel(0, 8)[3], 0);
        assert!(close(icon.get_pixel(15, 8), &white));
        for pixel in icon.pixels().filter(|p| p[3] > 0) {
            assert!(pixel.0[..3].iter().all(|&c| c >= 250), "darkened edge {pixel:?}");
        }
        Ok(())
    }

    #[test]
    fn open_decodes_non_png_sources() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("source.bmp");
        RgbaImage::from_pixel(40, 20, RED).save(&path)?;
        let scaler = Scaler::open(&path)?;
        assert_eq!(scaler.dimensions(), (40, 20));
        assert_eq!(scaler.normalize(16)?.dimensions(), (16, 16));
        Ok(())
    }

    #[test]
    fn write_encodes_rgba_png() -> Result<()> {
        let mut buf = vec![];
        solid(300, 600, RED).write(Cursor::new(&mut buf), 72)?;
        let png = image::load_from_memory_with_format(&buf, ImageFormat::Png)?;
        assert_eq!(png.color(), image::ColorType::Rgba8);
        assert_eq!((png.width(), png.height()), (72, 72));
        assert_eq!(png.to_rgba8().get_pixel(0, 0)[3], 0);
        Ok(())
    }
}
