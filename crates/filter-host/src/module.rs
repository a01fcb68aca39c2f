use std::path::{Path, PathBuf};

use crate::graphics::SharedGraphics;
use crate::locale::Locale;

/// Per-plugin module environment: bundled data files, localized text and the
/// shared graphics context.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    data_dir: PathBuf,
    locale: Locale,
    graphics: SharedGraphics,
}

impl Module {
    pub fn new(
        name: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        locale: Locale,
        graphics: SharedGraphics,
    ) -> Self {
        Self {
            name: name.into(),
            data_dir: data_dir.into(),
            locale,
            graphics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Absolute path of a file bundled in the module's data directory.
    pub fn module_file(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.locale.text(key)
    }

    pub fn graphics(&self) -> &SharedGraphics {
        &self.graphics
    }
}
