mod bitmap;
pub mod codec_options;
mod jpeg;
mod types;

use std::path::Path;

pub use bitmap::PngMedia;
pub use codec_options::CodecOptions;
pub use jpeg::JpegMedia;
pub use types::{Media, MediaKind};

pub trait Persist {
    fn save_as(&self, _: &Path) -> crate::Result<()>;
}
