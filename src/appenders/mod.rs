//! Output targets: console streams, the log file, and rotation

pub mod console;
pub(crate) mod file;
pub mod rotating_file;

pub use console::{AnsiPalette, ConsoleStream, MemoryStream, Palette};
pub use rotating_file::{archive_path, RotatedFile};
