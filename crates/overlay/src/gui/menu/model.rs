use crate::gui::menu::{MORE_ICON, PAGE_CAPACITY};
use crate::gui::{Effect, Ticket};
use nui::payload::{MenuItem, OpenMenu, RadialMenuData};
use nui::{Call, EventRegistry, Subscription, topic};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Items of the open menu and the page being shown. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub items: Vec<MenuItem>,
    pub sub: bool,
    pub page: usize,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            sub: false,
            page: 1,
        }
    }
}

impl MenuState {
    pub fn open(data: &RadialMenuData) -> Self {
        Self {
            page: Self::initial_page(&data.items, data.option.as_deref()),
            items: data.items.clone(),
            sub: data.sub,
        }
    }

    /// Page holding the first item whose sub-menu is `option`, or the first page.
    pub fn initial_page(items: &[MenuItem], option: Option<&str>) -> usize {
        option
            .filter(|option| !option.is_empty())
            .and_then(|option| {
                items
                    .iter()
                    .position(|item| item.menu.as_deref() == Some(option))
            })
            .map_or(1, |index| index / PAGE_CAPACITY + 1)
    }

    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(PAGE_CAPACITY).max(1)
    }

    pub fn has_next_page(&self) -> bool {
        self.page * PAGE_CAPACITY < self.items.len()
    }

    /// The current page's items, followed by a "more" entry when items remain.
    pub fn page_items(&self, more_label: &str) -> Vec<MenuItem> {
        let start = ((self.page - 1) * PAGE_CAPACITY).min(self.items.len());
        let end = (start + PAGE_CAPACITY).min(self.items.len());

        let mut page = self.items[start..end].to_vec();
        if end < self.items.len() {
            page.push(MenuItem::more(MORE_ICON, more_label));
        }
        page
    }

    pub fn absolute_index(&self, slot: usize) -> usize {
        slot + (self.page - 1) * PAGE_CAPACITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Next,
    Previous,
}

impl PageStep {
    fn apply(self, page: usize) -> usize {
        match self {
            Self::Next => page + 1,
            Self::Previous => page.saturating_sub(1).max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Visible,
    /// Hidden while the host decides on a page change.
    Pending { ticket: Ticket, step: PageStep },
}

/// Paginated radial menu driven by host events and player input.
#[derive(Debug)]
pub struct RadialMenu {
    state: MenuState,
    phase: Phase,
    last_ticket: Ticket,
    more_label: String,
}

impl RadialMenu {
    pub fn new(more_label: impl Into<String>) -> Self {
        Self {
            state: MenuState::default(),
            phase: Phase::Hidden,
            last_ticket: Ticket::default(),
            more_label: more_label.into(),
        }
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase == Phase::Visible
    }

    pub fn page(&self) -> usize {
        self.state.page
    }

    pub fn more_label(&self) -> &str {
        &self.more_label
    }

    pub fn set_more_label(&mut self, label: impl Into<String>) {
        self.more_label = label.into();
    }

    pub fn page_items(&self) -> Vec<MenuItem> {
        self.state.page_items(&self.more_label)
    }

    pub fn open(&mut self, open: &OpenMenu) {
        self.cancel_pending("menu reopened");
        match open {
            OpenMenu::Dismiss => self.phase = Phase::Hidden,
            OpenMenu::Show(data) => {
                self.state = MenuState::open(data);
                self.phase = Phase::Visible;
                log::debug!(
                    "radial menu opened: {} items, page {}/{}",
                    self.state.items.len(),
                    self.state.page,
                    self.state.page_count()
                );
            }
        }
    }

    /// Leaves visibility alone; a pending page change is dropped and the menu
    /// stays hidden until the host reopens it.
    pub fn refresh(&mut self, items: &[MenuItem]) {
        self.state.items = items.to_vec();
        self.state.page = 1;
        self.cancel_pending("items refreshed");
    }

    pub fn click_slot(&mut self, slot: usize) -> Vec<Effect> {
        if !self.is_visible() {
            log::debug!("slot {slot} ignored, radial menu is not shown");
            return Vec::new();
        }
        let Some(item) = self.page_items().into_iter().nth(slot) else {
            log::warn!("slot {slot} is not on page {}", self.state.page);
            return Vec::new();
        };

        if item.is_more {
            if !self.state.has_next_page() {
                log::warn!("'{}' on the last page has nowhere to go", item.label);
                return Vec::new();
            }
            return self.begin_transition(PageStep::Next);
        }

        vec![Effect::call(
            Call::RadialClick,
            json!(self.state.absolute_index(slot)),
        )]
    }

    /// Back control: previous page, parent menu, or close.
    pub fn click_center(&mut self) -> Vec<Effect> {
        if !self.is_visible() {
            log::debug!("center ignored, radial menu is not shown");
            return Vec::new();
        }
        if self.state.page > 1 {
            self.begin_transition(PageStep::Previous)
        } else if self.state.sub {
            vec![Effect::bare(Call::RadialBack)]
        } else {
            self.phase = Phase::Hidden;
            vec![Effect::bare(Call::RadialClose)]
        }
    }

    /// Applies the host's answer to a page change. Returns `false` if the
    /// ticket no longer matches the pending change.
    pub fn settle(&mut self, ticket: Ticket, allowed: bool) -> bool {
        let Phase::Pending { ticket: pending, step } = self.phase else {
            log::debug!("transition {ticket} settled after the menu moved on");
            return false;
        };
        if pending != ticket {
            log::debug!("transition {ticket} superseded by {pending}");
            return false;
        }

        if allowed {
            self.state.page = step.apply(self.state.page);
            self.phase = Phase::Visible;
        } else {
            log::info!("host vetoed the page change, radial menu stays hidden");
            self.phase = Phase::Hidden;
        }
        true
    }

    fn begin_transition(&mut self, step: PageStep) -> Vec<Effect> {
        self.last_ticket = self.last_ticket.next();
        self.phase = Phase::Pending {
            ticket: self.last_ticket,
            step,
        };
        vec![Effect::Transition(self.last_ticket)]
    }

    fn cancel_pending(&mut self, reason: &str) -> bool {
        if let Phase::Pending { ticket, .. } = self.phase {
            log::debug!("transition {ticket} cancelled: {reason}");
            self.phase = Phase::Hidden;
            return true;
        }
        false
    }
}

pub fn mount(registry: &EventRegistry, menu: &Rc<RefCell<RadialMenu>>) -> Vec<Subscription> {
    let open = {
        let menu = menu.clone();
        registry.on::<topic::OpenRadialMenu>(move |data| menu.borrow_mut().open(data))
    };
    let refresh = {
        let menu = menu.clone();
        registry.on::<topic::RefreshItems>(move |items| menu.borrow_mut().refresh(items))
    };
    vec![open, refresh]
}
