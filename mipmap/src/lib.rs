use anyhow::Result;
use icommon::Scaler;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const IC_LAUNCHER: &str = "ic_launcher.png";

/// Android screen density bucket.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Density {
    Mdpi,
    Hdpi,
    Xhdpi,
    Xxhdpi,
    Xxxhdpi,
}

impl Density {
    pub const ALL: [Density; 5] = [
        Self::Mdpi,
        Self::Hdpi,
        Self::Xhdpi,
        Self::Xxhdpi,
        Self::Xxxhdpi,
    ];

    /// Launcher icon edge length in pixels.
    pub fn size(self) -> u32 {
        match self {
            Self::Mdpi => 48,
            Self::Hdpi => 72,
            Self::Xhdpi => 96,
            Self::Xxhdpi => 144,
            Self::Xxxhdpi => 192,
        }
    }

    pub fn folder(self) -> String {
        format!("mipmap-{}", self)
    }
}

impl std::fmt::Display for Density {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Mdpi => write!(f, "mdpi"),
            Self::Hdpi => write!(f, "hdpi"),
            Self::Xhdpi => write!(f, "xhdpi"),
            Self::Xxhdpi => write!(f, "xxhdpi"),
            Self::Xxxhdpi => write!(f, "xxxhdpi"),
        }
    }
}

/// Writes `<res>/mipmap-<density>/ic_launcher.png` and returns its path.
pub fn write_ic_launcher(scaler: &Scaler, res: &Path, density: Density) -> Result<PathBuf> {
    let dir = res.join(density.folder());
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(IC_LAUNCHER);
    let mut file = BufWriter::new(File::create(&path)?);
    scaler.write(&mut file, density.size())?;
    file.flush()?;
    tracing::debug!("wrote {} ({}px)", path.display(), density.size());
    Ok(path)
}

/// Writes one launcher icon per density bucket.
///
/// Buckets are written in [`Density::ALL`] order. An error aborts the run
/// and leaves icons of earlier buckets in place.
pub fn write_mipmaps(scaler: &Scaler, res: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(Density::ALL.len());
    for density in Density::ALL {
        paths.push(write_ic_launcher(scaler, res, density)?);
    }
    tracing::info!("wrote {} launcher icons to {}", paths.len(), res.display());
    Ok(paths)
}

pub fn mipmap_ic_launcher<P: AsRef<Path>, Q: AsRef<Path>>(icon: P, res: Q) -> Result<Vec<PathBuf>> {
    let scaler = Scaler::open(icon)?;
    write_mipmaps(&scaler, res.as_ref())
}
