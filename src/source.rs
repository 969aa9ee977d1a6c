//! Where diagram descriptions come from.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Supplies the current description on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionSource {
    File(PathBuf),
    Stdin,
    Inline(String),
}

impl DescriptionSource {
    /// `None` or `-` reads standard input; anything else is a file path.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            None => DescriptionSource::Stdin,
            Some(path) if path.as_os_str() == "-" => DescriptionSource::Stdin,
            Some(path) => DescriptionSource::File(path.to_path_buf()),
        }
    }

    /// Read the description. An empty result is valid and means "idle".
    pub fn read(&self) -> io::Result<String> {
        match self {
            DescriptionSource::File(path) => std::fs::read_to_string(path),
            DescriptionSource::Stdin => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
            DescriptionSource::Inline(text) => Ok(text.clone()),
        }
    }
}
