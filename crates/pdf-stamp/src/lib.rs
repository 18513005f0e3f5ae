pub mod bitmap;
mod cancel;
pub mod constants;
pub mod jitter;
pub mod layout;
mod options;
pub mod render;
pub mod replace;
pub mod signing;
pub mod stamp;
mod types;

pub use bitmap::{BitmapSettings, StampBitmap};
pub use cancel::CancelFlag;
pub use options::*;
pub use replace::{FsReplace, ReplaceOps, replace_file, replace_file_with};
pub use signing::SigningContext;
pub use stamp::{FileReport, Stamper, stamp_batch};
pub use types::*;
