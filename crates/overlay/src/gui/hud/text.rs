use nui::payload::{TextUiData, TextUiPosition};
use nui::{EventRegistry, Subscription, topic};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct TextBanner {
    shown: Option<TextUiData>,
}

impl TextBanner {
    pub fn show(&mut self, data: &TextUiData) {
        self.shown = Some(data.clone());
    }

    pub fn hide(&mut self) {
        self.shown = None;
    }

    pub fn current(&self) -> Option<&TextUiData> {
        self.shown.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    pub fn position(&self) -> TextUiPosition {
        self.shown
            .as_ref()
            .and_then(|data| data.position)
            .unwrap_or_default()
    }
}

pub fn mount(registry: &EventRegistry, banner: &Rc<RefCell<TextBanner>>) -> Vec<Subscription> {
    let show = {
        let banner = banner.clone();
        registry.on::<topic::TextUi>(move |data| banner.borrow_mut().show(data))
    };
    let hide = {
        let banner = banner.clone();
        registry.on::<topic::TextUiHide>(move |_| banner.borrow_mut().hide())
    };
    vec![show, hide]
}
