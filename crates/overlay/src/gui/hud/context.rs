use crate::gui::Effect;
use nui::payload::{ContextMenuData, ContextOption};
use nui::{Call, EventRegistry, Subscription, topic};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// A rendered context menu entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextButton {
    pub key: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub progress: Option<f64>,
    pub arrow: bool,
    pub enabled: bool,
}

impl ContextButton {
    fn new(key: &str, option: &ContextOption) -> Self {
        let numeric_key = key.parse::<f64>().is_ok();
        Self {
            key: key.to_string(),
            title: option
                .title
                .clone()
                .or_else(|| (!numeric_key).then(|| key.to_string())),
            description: option.description.clone(),
            icon: option.icon.clone(),
            progress: option.progress,
            arrow: (option.menu.is_some() || option.arrow == Some(true))
                && option.arrow != Some(false),
            enabled: !option.disabled && !option.read_only,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContextMenu {
    shown: Option<ContextMenuData>,
}

impl ContextMenu {
    pub fn show(&mut self, data: &ContextMenuData) {
        log::debug!("context menu '{}' with {} options", data.id, data.options.len());
        self.shown = Some(data.clone());
    }

    pub fn hide(&mut self) {
        self.shown = None;
    }

    pub fn current(&self) -> Option<&ContextMenuData> {
        self.shown.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    pub fn buttons(&self) -> Vec<ContextButton> {
        self.shown
            .iter()
            .flat_map(|menu| menu.options.iter())
            .map(|(key, option)| ContextButton::new(key, option))
            .collect()
    }

    pub fn click(&self, key: &str) -> Vec<Effect> {
        let Some(menu) = &self.shown else {
            return Vec::new();
        };
        let Some(option) = menu.options.get(key) else {
            log::warn!("context menu '{}' has no option '{key}'", menu.id);
            return Vec::new();
        };
        if option.disabled || option.read_only {
            return Vec::new();
        }

        match &option.menu {
            Some(submenu) => vec![Effect::call(
                Call::OpenContext,
                json!({ "id": submenu, "back": false }),
            )],
            None => vec![Effect::call(Call::ClickContext, json!(key))],
        }
    }

    pub fn back(&self) -> Vec<Effect> {
        match self.shown.as_ref().and_then(|menu| menu.menu.as_ref()) {
            Some(parent) => vec![Effect::call(
                Call::OpenContext,
                json!({ "id": parent, "back": true }),
            )],
            None => Vec::new(),
        }
    }

    pub fn close(&mut self) -> Vec<Effect> {
        let Some(menu) = &self.shown else {
            return Vec::new();
        };
        if menu.can_close == Some(false) {
            log::debug!("context menu '{}' cannot be closed", menu.id);
            return Vec::new();
        }
        self.shown = None;
        vec![Effect::bare(Call::CloseContext)]
    }
}

pub fn mount(registry: &EventRegistry, menu: &Rc<RefCell<ContextMenu>>) -> Vec<Subscription> {
    let show = {
        let menu = menu.clone();
        registry.on::<topic::ShowContext>(move |data| menu.borrow_mut().show(data))
    };
    let hide = {
        let menu = menu.clone();
        registry.on::<topic::HideContext>(move |_| menu.borrow_mut().hide())
    };
    vec![show, hide]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn garage() -> ContextMenu {
        let data: ContextMenuData = serde_json::from_str(
            r#"{
                "id": "garage_vehicle",
                "title": "Vehicle",
                "menu": "garage",
                "options": {
                    "Take out": { "description": "Fuel 80%" },
                    "Upgrades": { "menu": "upgrades" },
                    "Impounded": { "disabled": true },
                    "Plate": { "readOnly": true, "arrow": true },
                    "Mods": { "menu": "mods", "arrow": false }
                }
            }"#,
        )
        .unwrap();
        let mut menu = ContextMenu::default();
        menu.show(&data);
        menu
    }

    #[test]
    fn option_clicks() {
        let menu = garage();
        assert_eq!(
            menu.click("Take out"),
            [Effect::call(Call::ClickContext, json!("Take out"))]
        );
        assert_eq!(
            menu.click("Upgrades"),
            [Effect::call(
                Call::OpenContext,
                json!({ "id": "upgrades", "back": false })
            )]
        );
        assert!(menu.click("Impounded").is_empty());
        assert!(menu.click("Plate").is_empty());
        assert!(menu.click("Nope").is_empty());
    }

    #[test]
    fn back_goes_to_the_parent() {
        let menu = garage();
        assert_eq!(
            menu.back(),
            [Effect::call(
                Call::OpenContext,
                json!({ "id": "garage", "back": true })
            )]
        );

        let mut root = ContextMenu::default();
        root.show(&serde_json::from_str(r#"{ "id": "root", "options": [] }"#).unwrap());
        assert!(root.back().is_empty());
    }

    #[test]
    fn close_respects_can_close() {
        let mut menu = garage();
        assert_eq!(menu.close(), [Effect::bare(Call::CloseContext)]);
        assert!(!menu.is_visible());
        assert!(menu.close().is_empty());

        let mut locked = ContextMenu::default();
        locked.show(
            &serde_json::from_str(r#"{ "id": "x", "canClose": false, "options": [] }"#).unwrap(),
        );
        assert!(locked.close().is_empty());
        assert!(locked.is_visible());
    }

    #[test]
    fn buttons_follow_host_order_and_rules() {
        let buttons = garage().buttons();
        let keys: Vec<&str> = buttons.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, ["Take out", "Upgrades", "Impounded", "Plate", "Mods"]);

        let arrows: Vec<bool> = buttons.iter().map(|b| b.arrow).collect();
        assert_eq!(arrows, [false, true, false, true, false]);
        assert!(!buttons[2].enabled);
        assert_eq!(buttons[0].title.as_deref(), Some("Take out"));
    }

    #[test]
    fn numeric_keys_have_no_implicit_title() {
        let mut menu = ContextMenu::default();
        menu.show(
            &serde_json::from_str(
                r#"{ "id": "list", "options": [ { "title": "First" }, { "description": "x" } ] }"#,
            )
            .unwrap(),
        );
        let titles: Vec<Option<String>> = menu.buttons().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, [Some("First".to_string()), None]);
        assert_eq!(
            menu.click("1"),
            [Effect::call(Call::ClickContext, json!("1"))]
        );
    }

    #[test]
    fn mounted_menu_follows_registry_events() {
        let registry = EventRegistry::new();
        let menu = Rc::new(RefCell::new(ContextMenu::default()));
        let _subs = mount(&registry, &menu);

        let show = nui::Event::decode(
            nui::EventName::from("showContext"),
            json!({ "id": "a", "options": [] }),
        )
        .unwrap();
        registry.dispatch(&show);
        assert_eq!(menu.borrow().current().unwrap().id, "a");

        let hide =
            nui::Event::decode(nui::EventName::from("hideContext"), serde_json::Value::Null)
                .unwrap();
        registry.dispatch(&hide);
        assert!(!menu.borrow().is_visible());
    }
}
