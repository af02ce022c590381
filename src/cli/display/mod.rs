//! Display module for formatted CLI output

pub mod colors;
pub mod icons;
pub mod printer;
pub mod table;

pub use colors::ColorTheme;
pub use icons::{StateClass, StatusIcon};
pub use printer::{OutputFormat, Printer};
pub use table::TableRenderer;
