use anyhow::Result;
use icommon::Scaler;
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::ExtendedColorType;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Frame sizes stored in every icon, smallest first.
pub const ICO_SIZES: [u32; 7] = [16, 24, 32, 48, 64, 128, 256];

/// Encodes an icon with one png frame per entry of [`ICO_SIZES`].
///
/// The source is normalized once to the largest size and every frame is
/// derived from that base.
pub fn write_ico<W: Write>(scaler: &Scaler, w: W) -> Result<()> {
    let max = ICO_SIZES[ICO_SIZES.len() - 1];
    let base = Scaler::from(scaler.normalize(max)?);
    let mut frames = Vec::with_capacity(ICO_SIZES.len());
    for size in ICO_SIZES {
        let frame = base.normalize(size)?;
        frames.push(IcoFrame::as_png(
            frame.as_raw(),
            size,
            size,
            ExtendedColorType::Rgba8,
        )?);
    }
    IcoEncoder::new(w).encode_images(&frames)?;
    Ok(())
}

/// Writes `out`, creating missing parent directories and replacing any
/// existing file.
pub fn write_app_icon(scaler: &Scaler, out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = BufWriter::new(File::create(out)?);
    write_ico(scaler, &mut file)?;
    file.flush()?;
    tracing::info!("wrote {}", out.display());
    Ok(())
}

pub fn app_icon<P: AsRef<Path>, Q: AsRef<Path>>(icon: P, out: Q) -> Result<()> {
    let scaler = Scaler::open(icon)?;
    write_app_icon(&scaler, out.as_ref())
}
