pub mod model;
pub mod view;

pub use model::{MenuState, PageStep, Phase, RadialMenu, mount};
pub use view::{Cell, IconSource, RadialView};

pub const PAGE_CAPACITY: usize = 12;
pub const MORE_ICON: &str = "ellipsis-h";
pub const CLOSE_ICON: &str = "xmark";
pub const BACK_ICON: &str = "arrow-rotate-left";
/// Hexagon rows alternate between these widths, starting with the first.
pub const ROW_PATTERN: [usize; 2] = [3, 4];
