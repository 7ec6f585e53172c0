mod theme;

pub use theme::{print_banner, print_error, ragline_theme};
