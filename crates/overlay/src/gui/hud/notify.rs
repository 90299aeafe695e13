use crate::events::AppEvent;
use crate::gui::{Effect, Effects, Ticket};
use nui::payload::NotificationData;
use nui::{EventRegistry, Subscription, topic};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use strum::{Display, EnumString};

pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NotifyKind {
    Error,
    Success,
    Warning,
    #[default]
    Inform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SoundCue {
    Error,
    Success,
    Info,
}

impl NotifyKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Error => "circle-xmark",
            Self::Success => "circle-check",
            Self::Warning => "circle-exclamation",
            Self::Inform => "circle-info",
        }
    }

    pub fn icon_color(self) -> &'static str {
        match self {
            Self::Error => "red.6",
            Self::Success => "teal.6",
            Self::Warning => "yellow.6",
            Self::Inform => "blue.6",
        }
    }

    pub fn sound(self) -> SoundCue {
        match self {
            Self::Error => SoundCue::Error,
            Self::Success => SoundCue::Success,
            Self::Warning | Self::Inform => SoundCue::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    #[strum(to_string = "top-center", serialize = "top")]
    TopCenter,
    BottomRight,
    BottomLeft,
    #[strum(to_string = "bottom-center", serialize = "bottom")]
    BottomCenter,
    CenterRight,
    CenterLeft,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Option<String>,
    pub ticket: Ticket,
    pub kind: NotifyKind,
    pub title: Option<String>,
    pub description: String,
    pub duration: Duration,
    pub show_duration: bool,
    pub position: ToastPosition,
    pub icon: String,
    pub icon_color: String,
    pub icon_animation: Option<String>,
}

impl Toast {
    /// `None` for notifications without a description.
    pub fn from_payload(data: &NotificationData, ticket: Ticket) -> Option<Self> {
        let description = data.description.clone().filter(|d| !d.is_empty())?;
        let kind: NotifyKind = data
            .kind
            .as_deref()
            .and_then(|kind| kind.parse().ok())
            .unwrap_or_default();
        let position = match data.position.as_deref() {
            None => ToastPosition::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("unknown toast position '{raw}'");
                ToastPosition::default()
            }),
        };

        Some(Self {
            id: data.id.clone(),
            ticket,
            kind,
            title: data.title.clone(),
            description,
            duration: data
                .duration
                .filter(|d| !d.is_zero())
                .unwrap_or(DEFAULT_DURATION),
            show_duration: data.show_duration.unwrap_or(true),
            position,
            icon: data.icon.clone().unwrap_or_else(|| kind.icon().to_string()),
            icon_color: data
                .icon_color
                .clone()
                .unwrap_or_else(|| kind.icon_color().to_string()),
            icon_animation: data.icon_animation.clone(),
        })
    }
}

/// Toasts currently on screen, oldest first.
#[derive(Debug, Default)]
pub struct Toasts {
    shown: Vec<Toast>,
    last_ticket: Ticket,
}

impl Toasts {
    pub fn shown(&self) -> &[Toast] {
        &self.shown
    }

    pub fn push(&mut self, data: &NotificationData) -> Vec<Effect> {
        let ticket = self.last_ticket.next();
        let Some(toast) = Toast::from_payload(data, ticket) else {
            log::debug!("notification without description ignored");
            return Vec::new();
        };
        self.last_ticket = ticket;
        log::debug!("toast {} plays the {} cue", ticket, toast.kind.sound());

        let delay = toast.duration;
        let existing = toast
            .id
            .as_ref()
            .and_then(|id| self.shown.iter().position(|t| t.id.as_ref() == Some(id)));
        match existing {
            Some(index) => self.shown[index] = toast,
            None => self.shown.push(toast),
        }

        vec![Effect::Schedule {
            delay,
            event: AppEvent::ToastExpired(ticket),
        }]
    }

    /// Returns whether a toast was removed.
    pub fn expire(&mut self, ticket: Ticket) -> bool {
        let before = self.shown.len();
        self.shown.retain(|toast| toast.ticket != ticket);
        before != self.shown.len()
    }
}

pub fn mount(
    registry: &EventRegistry,
    toasts: &Rc<RefCell<Toasts>>,
    effects: &Effects,
) -> Vec<Subscription> {
    let toasts = toasts.clone();
    let effects = effects.clone();
    vec![registry.on::<topic::Notify>(move |data| {
        let out = toasts.borrow_mut().push(data);
        effects.run_all(out);
    })]
}
