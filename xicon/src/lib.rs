use anyhow::Result;
use icommon::Scaler;
use std::path::{Path, PathBuf};

pub use mipmap::Density;
pub use winicon::ICO_SIZES;

/// Fixed locations of the icon source and outputs inside a project.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn default_source(&self) -> PathBuf {
        self.root.join("assets").join("branding").join("FS.png")
    }

    pub fn windows_icon(&self) -> PathBuf {
        self.root
            .join("windows")
            .join("runner")
            .join("resources")
            .join("app_icon.ico")
    }

    pub fn android_res(&self) -> PathBuf {
        self.root
            .join("android")
            .join("app")
            .join("src")
            .join("main")
            .join("res")
    }
}

/// Regenerates the Windows and Android icons of `layout` from `src`, or from
/// the layout's default source when none is given.
pub fn generate(layout: &Layout, src: Option<&Path>) -> Result<()> {
    let src = src
        .map(Path::to_path_buf)
        .unwrap_or_else(|| layout.default_source());
    if !src.exists() {
        anyhow::bail!("source image not found: {}", src.display());
    }
    let scaler = Scaler::open(&src)?;
    {
        let _span = tracing::info_span!("windows").entered();
        winicon::write_app_icon(&scaler, &layout.windows_icon())?;
    }
    {
        let _span = tracing::info_span!("android").entered();
        mipmap::write_mipmaps(&scaler, &layout.android_res())?;
    }
    Ok(())
}
