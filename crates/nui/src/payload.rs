//! Wire shapes of the payloads carried by push events.

use crate::de::{is_falsy, millis, millis_opt, null_as_default, string_or_number_opt};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Symbolic icon name or an image URL.
    pub icon: String,
    pub label: String,
    /// Sub-menu requested from the host when the item is activated.
    #[serde(default)]
    pub menu: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_more: bool,
}

impl MenuItem {
    pub fn new(icon: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
            menu: None,
            is_more: false,
        }
    }

    pub fn with_menu(mut self, menu: impl Into<String>) -> Self {
        self.menu = Some(menu.into());
        self
    }

    pub fn more(icon: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            is_more: true,
            ..Self::new(icon, label)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RadialMenuData {
    pub items: Vec<MenuItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub: bool,
    /// Menu id of the item whose page should be shown first.
    #[serde(default)]
    pub option: Option<String>,
}

/// Payload of `openRadialMenu`: a falsy value closes the menu, anything else must be a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenMenu {
    Dismiss,
    Show(RadialMenuData),
}

impl<'de> Deserialize<'de> for OpenMenu {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if is_falsy(&value) {
            return Ok(Self::Dismiss);
        }
        RadialMenuData::deserialize(value)
            .map(Self::Show)
            .map_err(de::Error::custom)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextUiPosition {
    #[default]
    RightCenter,
    LeftCenter,
    TopCenter,
    BottomCenter,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IconAlign {
    #[default]
    Center,
    Top,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextUiData {
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub position: Option<TextUiPosition>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_color: Option<String>,
    #[serde(default)]
    pub icon_animation: Option<String>,
    #[serde(default)]
    pub align_icon: Option<IconAlign>,
    #[serde(default)]
    pub style: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "millis")]
    pub duration: Duration,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CirclePosition {
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircleProgressData {
    #[serde(deserialize_with = "millis")]
    pub duration: Duration,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub position: Option<CirclePosition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    #[serde(default, deserialize_with = "string_or_number_opt")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "millis_opt")]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub show_duration: Option<bool>,
    /// Kept as text: unknown positions fall back to the default placement.
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_color: Option<String>,
    #[serde(default)]
    pub icon_animation: Option<String>,
    #[serde(default)]
    pub style: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextOption {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_color: Option<String>,
    #[serde(default)]
    pub icon_animation: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub color_scheme: Option<String>,
    #[serde(default)]
    pub arrow: Option<bool>,
    /// Context menu id opened instead of reporting a click.
    #[serde(default)]
    pub menu: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read_only: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Context menu options in host order. A list is keyed by its indices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextOptions(Vec<(String, ContextOption)>);

impl ContextOptions {
    pub fn new(options: Vec<(String, ContextOption)>) -> Self {
        Self(options)
    }

    pub fn get(&self, key: &str) -> Option<&ContextOption> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, o)| o)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextOption)> {
        self.0.iter().map(|(k, o)| (k.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ContextOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = ContextOptions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list or a map of context options")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut options = Vec::with_capacity(seq.size_hint().unwrap_or_default());
                while let Some(option) = seq.next_element::<ContextOption>()? {
                    options.push((options.len().to_string(), option));
                }
                Ok(ContextOptions(options))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut options = Vec::with_capacity(map.size_hint().unwrap_or_default());
                while let Some((key, option)) = map.next_entry::<String, ContextOption>()? {
                    options.push((key, option));
                }
                Ok(ContextOptions(options))
            }
        }

        deserializer.deserialize_any(OptionsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuData {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Parent menu id, enables the back button.
    #[serde(default)]
    pub menu: Option<String>,
    #[serde(default)]
    pub can_close: Option<bool>,
    #[serde(default)]
    pub options: ContextOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_open_payloads_dismiss() {
        for value in [json!(false), json!(null), json!(0), json!("")] {
            let open: OpenMenu = serde_json::from_value(value).unwrap();
            assert_eq!(open, OpenMenu::Dismiss);
        }
    }

    #[test]
    fn empty_items_still_show_a_menu() {
        let open: OpenMenu = serde_json::from_value(json!({ "items": [] })).unwrap();
        assert_eq!(
            open,
            OpenMenu::Show(RadialMenuData {
                items: vec![],
                sub: false,
                option: None,
            })
        );
    }

    #[test]
    fn open_without_items_is_rejected() {
        assert!(serde_json::from_value::<OpenMenu>(json!({ "sub": true })).is_err());
    }

    #[test]
    fn menu_item_accepts_null_flags() {
        let item: MenuItem = serde_json::from_value(json!({
            "icon": "car",
            "label": "Vehicle",
            "menu": "vehicle_menu",
            "isMore": null,
        }))
        .unwrap();
        assert_eq!(item, MenuItem::new("car", "Vehicle").with_menu("vehicle_menu"));
    }

    #[test]
    fn durations_accept_fractional_milliseconds() {
        let data: ProgressData =
            serde_json::from_value(json!({ "label": "Drinking", "duration": 1500.5 })).unwrap();
        assert_eq!(data.duration, Duration::from_micros(1_500_500));
        assert!(serde_json::from_value::<ProgressData>(json!({ "duration": -1 })).is_err());
    }

    #[test]
    fn text_ui_position_is_case_insensitive() {
        let data: TextUiData =
            serde_json::from_value(json!({ "text": "[E] Open", "position": "Left-Center" }))
                .unwrap();
        assert_eq!(data.position, Some(TextUiPosition::LeftCenter));
        assert_eq!(TextUiPosition::BottomCenter.to_string(), "bottom-center");
    }

    #[test]
    fn notification_ids_may_be_numbers() {
        let data: NotificationData =
            serde_json::from_value(json!({ "id": 42, "description": "hi", "type": "success" }))
                .unwrap();
        assert_eq!(data.id.as_deref(), Some("42"));
        assert_eq!(data.kind.as_deref(), Some("success"));
    }

    #[test]
    fn context_options_keep_host_order() {
        let data: ContextMenuData = serde_json::from_str(
            r#"{
                "id": "garage",
                "title": "Garage",
                "options": { "zeta": { "title": "Z" }, "alpha": { "disabled": true } }
            }"#,
        )
        .unwrap();
        let keys: Vec<&str> = data.options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
        assert!(data.options.get("alpha").unwrap().disabled);

        let listed: ContextOptions =
            serde_json::from_value(json!([{ "title": "A" }, { "title": "B" }])).unwrap();
        let keys: Vec<&str> = listed.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["0", "1"]);
    }
}
