use super::model::RadialMenu;
use super::{BACK_ICON, CLOSE_ICON, ROW_PATTERN};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    Named(String),
    Image(String),
}

impl IconSource {
    pub fn resolve(icon: &str) -> Self {
        if is_icon_url(icon) {
            Self::Image(icon.to_string())
        } else {
            Self::Named(icon.to_string())
        }
    }
}

pub fn is_icon_url(icon: &str) -> bool {
    icon.contains("://") || icon.starts_with("data:image/")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Index on the current page, as reported by slot input.
    pub slot: usize,
    pub label: String,
    pub icon: IconSource,
    pub is_more: bool,
}

/// What the radial menu shows right now, laid out as hexagon rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadialView {
    pub rows: Vec<Vec<Cell>>,
    pub center_icon: &'static str,
    pub page: usize,
    pub pages: usize,
}

impl RadialView {
    /// `None` while the menu is hidden.
    pub fn of(menu: &RadialMenu) -> Option<Self> {
        if !menu.is_visible() {
            return None;
        }
        let state = menu.state();
        let cells: Vec<Cell> = menu
            .page_items()
            .into_iter()
            .enumerate()
            .map(|(slot, item)| Cell {
                slot,
                icon: IconSource::resolve(&item.icon),
                label: item.label,
                is_more: item.is_more,
            })
            .collect();

        let center_icon = if !state.sub && state.page < 2 {
            CLOSE_ICON
        } else {
            BACK_ICON
        };

        Some(Self {
            rows: hex_rows(cells),
            center_icon,
            page: state.page,
            pages: state.page_count(),
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }
}

fn hex_rows(cells: Vec<Cell>) -> Vec<Vec<Cell>> {
    let mut rows = Vec::new();
    let mut cells = cells.into_iter().peekable();
    for width in ROW_PATTERN.iter().cycle() {
        if cells.peek().is_none() {
            break;
        }
        rows.push(cells.by_ref().take(*width).collect());
    }
    rows
}

impl fmt::Display for RadialView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "radial page {}/{}", self.page, self.pages)?;
        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match &cell.icon {
                    IconSource::Named(icon) => format!("[{}:{} {}]", cell.slot, icon, cell.label),
                    IconSource::Image(_) => format!("[{}:<img> {}]", cell.slot, cell.label),
                })
                .collect();
            writeln!(f, "  {}", line.join(" "))?;
        }
        write!(f, "  ({})", self.center_icon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nui::payload::{MenuItem, OpenMenu, RadialMenuData};

    fn menu(n: usize, sub: bool) -> RadialMenu {
        let mut menu = RadialMenu::new("More...");
        menu.open(&OpenMenu::Show(RadialMenuData {
            items: (0..n).map(|i| MenuItem::new("box", format!("{i}"))).collect(),
            sub,
            option: None,
        }));
        menu
    }

    #[test]
    fn rows_alternate_three_and_four() {
        let view = RadialView::of(&menu(15, false)).unwrap();
        let widths: Vec<usize> = view.rows.iter().map(Vec::len).collect();
        assert_eq!(widths, [3, 4, 3, 3]);

        let slots: Vec<usize> = view.cells().map(|c| c.slot).collect();
        assert_eq!(slots, (0..13).collect::<Vec<_>>());
        assert!(view.cells().last().unwrap().is_more);
    }

    #[test]
    fn center_icon_depends_on_depth_and_page() {
        assert_eq!(RadialView::of(&menu(3, false)).unwrap().center_icon, CLOSE_ICON);
        assert_eq!(RadialView::of(&menu(3, true)).unwrap().center_icon, BACK_ICON);

        let mut paged = menu(15, false);
        let effects = paged.click_slot(12);
        let [crate::gui::Effect::Transition(ticket)] = &effects[..] else {
            panic!("expected a transition, got {effects:?}");
        };
        paged.settle(*ticket, true);
        assert_eq!(RadialView::of(&paged).unwrap().center_icon, BACK_ICON);
    }

    #[test]
    fn hidden_menu_has_no_view() {
        assert_eq!(RadialView::of(&RadialMenu::new("More...")), None);
    }

    #[test]
    fn empty_menu_has_only_the_center() {
        let view = RadialView::of(&menu(0, false)).unwrap();
        assert!(view.rows.is_empty());
        assert_eq!(view.to_string(), "radial page 1/1\n  (xmark)");
    }

    #[test]
    fn url_icons_are_images() {
        assert!(is_icon_url("https://cdn.example.org/car.png"));
        assert!(is_icon_url("nui://inventory/images/water.png"));
        assert!(is_icon_url("data:image/png;base64,AAAA"));
        assert!(!is_icon_url("car"));
        assert_eq!(IconSource::resolve("car"), IconSource::Named("car".into()));
    }
}
