use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::gui::Effects;
use crate::gui::hud::{self, ContextMenu, ProgressKind, ProgressWidget, TextBanner, Toasts};
use crate::gui::menu::{self, RadialMenu, RadialView};
use async_channel::{Receiver, Sender};
use nui::{EventRegistry, HostLink, Subscription, UserInput};
use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Owns the widgets and the registry they are mounted on. Lives on the UI
/// thread; everything else reaches it through [`AppEvent`]s.
pub struct AppModel {
    registry: EventRegistry,
    effects: Effects,
    socket: PathBuf,
    socket_pinned: bool,
    radial: Rc<RefCell<RadialMenu>>,
    banner: Rc<RefCell<TextBanner>>,
    bar: Rc<RefCell<ProgressWidget>>,
    circle: Rc<RefCell<ProgressWidget>>,
    toasts: Rc<RefCell<Toasts>>,
    context: Rc<RefCell<ContextMenu>>,
    _subscriptions: Vec<Subscription>,
}

impl AppModel {
    pub fn new(config: &Config, link: HostLink, tx: Sender<AppEvent>) -> Self {
        let registry = EventRegistry::new();
        let effects = Effects::new(link, tx);

        let radial = Rc::new(RefCell::new(RadialMenu::new(config.locale.more.clone())));
        let banner = Rc::new(RefCell::new(TextBanner::default()));
        let bar = Rc::new(RefCell::new(ProgressWidget::new(ProgressKind::Bar)));
        let circle = Rc::new(RefCell::new(ProgressWidget::new(ProgressKind::Circle)));
        let toasts = Rc::new(RefCell::new(Toasts::default()));
        let context = Rc::new(RefCell::new(ContextMenu::default()));

        let mut subscriptions = menu::mount(&registry, &radial);
        subscriptions.extend(hud::text::mount(&registry, &banner));
        subscriptions.extend(hud::progress::mount(&registry, &bar, &effects));
        subscriptions.extend(hud::progress::mount(&registry, &circle, &effects));
        subscriptions.extend(hud::notify::mount(&registry, &toasts, &effects));
        subscriptions.extend(hud::context::mount(&registry, &context));
        log::debug!("widgets mounted: {:?}", registry);

        Self {
            registry,
            effects,
            socket: config.bridge.socket.clone(),
            socket_pinned: false,
            radial,
            banner,
            bar,
            circle,
            toasts,
            context,
            _subscriptions: subscriptions,
        }
    }

    /// Keeps the listening socket fixed across config reloads, for a socket
    /// given on the command line.
    pub fn pin_socket(mut self, socket: impl Into<PathBuf>) -> Self {
        self.socket = socket.into();
        self.socket_pinned = true;
        self
    }

    pub async fn run(mut self, rx: Receiver<AppEvent>) {
        while let Ok(event) = rx.recv().await {
            self.update(event);
        }
        log::info!("event channel closed, shutting down");
    }

    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Push(event) => {
                if self.registry.dispatch(&event) == 0 {
                    log::debug!("no widget handles '{}'", event.name());
                }
            }
            AppEvent::Input(input) => self.handle_input(input),
            AppEvent::HostAttached => log::info!("host attached"),
            AppEvent::HostDetached => log::info!("host detached, answering calls from stubs"),
            AppEvent::TransitionSettled { ticket, allowed } => {
                self.radial.borrow_mut().settle(ticket, allowed);
            }
            AppEvent::ProgressElapsed { kind, ticket } => {
                let widget = match kind {
                    ProgressKind::Bar => &self.bar,
                    ProgressKind::Circle => &self.circle,
                };
                let out = widget.borrow_mut().elapse(ticket);
                self.effects.run_all(out);
            }
            AppEvent::ToastExpired(ticket) => {
                self.toasts.borrow_mut().expire(ticket);
            }
            AppEvent::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.apply_config(&new_config);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
        self.render();
    }

    fn handle_input(&mut self, input: UserInput) {
        let out = match input {
            UserInput::RadialSlot { slot } => self.radial.borrow_mut().click_slot(slot),
            UserInput::RadialCenter => self.radial.borrow_mut().click_center(),
            UserInput::ContextOption { key } => self.context.borrow().click(&key),
            UserInput::ContextBack => self.context.borrow().back(),
            UserInput::ContextClose => self.context.borrow_mut().close(),
        };
        self.effects.run_all(out);
    }

    pub fn apply_config(&mut self, config: &Config) {
        let link = self.effects.link();
        link.set_timeout(config.bridge.timeout());
        link.set_stubs(config.bridge.stub_table());
        self.radial
            .borrow_mut()
            .set_more_label(config.locale.more.clone());

        if let Some(socket) = self.socket_change(config) {
            log::warn!("socket changed to {}, restart to apply", socket.display());
        }
    }

    /// A configured socket that differs from the one being served.
    pub fn socket_change<'a>(&self, config: &'a Config) -> Option<&'a Path> {
        let socket = config.bridge.socket.as_path();
        (!self.socket_pinned && socket != self.socket.as_path()).then_some(socket)
    }

    fn render(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        match RadialView::of(&self.radial.borrow()) {
            Some(view) => log::debug!("{view}"),
            None => log::debug!("radial hidden ({:?})", self.radial.borrow().phase()),
        }
        if let Some(text) = self.banner.borrow().current() {
            log::debug!("text ui [{}] {}", self.banner.borrow().position(), text.text);
        }
        for widget in [&self.bar, &self.circle] {
            let widget = widget.borrow();
            if let Some(label) = widget.label() {
                log::debug!(
                    "{} progress '{label}' {}%",
                    widget.kind(),
                    widget.percent_at(std::time::Instant::now())
                );
            }
        }
        for toast in self.toasts.borrow().shown() {
            log::debug!("toast [{}] {}", toast.position, toast.description);
        }
        for button in self.context.borrow().buttons() {
            log::debug!(
                "context {} {}{}",
                button.key,
                button.title.as_deref().unwrap_or_default(),
                if button.arrow { " >" } else { "" }
            );
        }
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    pub fn radial(&self) -> Ref<'_, RadialMenu> {
        self.radial.borrow()
    }

    pub fn banner(&self) -> Ref<'_, TextBanner> {
        self.banner.borrow()
    }

    pub fn progress(&self, kind: ProgressKind) -> Ref<'_, ProgressWidget> {
        match kind {
            ProgressKind::Bar => self.bar.borrow(),
            ProgressKind::Circle => self.circle.borrow(),
        }
    }

    pub fn toasts(&self) -> Ref<'_, Toasts> {
        self.toasts.borrow()
    }

    pub fn context(&self) -> Ref<'_, ContextMenu> {
        self.context.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nui::{Call, CallName, Event, EventName, Frame, Reply};
    use serde_json::{Value, json};
    use std::time::Duration;

    fn app_with(stubs: Vec<(CallName, Value)>) -> (AppModel, Receiver<AppEvent>, HostLink) {
        let link = HostLink::new(Duration::from_secs(1), stubs);
        let (tx, rx) = async_channel::unbounded();
        let app = AppModel::new(&Config::default(), link.clone(), tx);
        (app, rx, link)
    }

    fn push(name: &str, data: Value) -> AppEvent {
        AppEvent::Push(Event::decode(EventName::from(name), data).unwrap())
    }

    fn placeholder_items(n: usize) -> Value {
        (0..n)
            .map(|i| json!({ "icon": "circle", "label": format!("Entry {i}") }))
            .collect()
    }

    fn page_labels(app: &AppModel) -> Vec<String> {
        app.radial().page_items().into_iter().map(|i| i.label).collect()
    }

    #[tokio::test]
    async fn pages_forward_and_back_through_the_stubbed_host() {
        let (mut app, rx, _link) =
            app_with(vec![(Call::RadialTransition.into(), json!(true))]);

        app.update(push("openRadialMenu", json!({ "items": placeholder_items(15) })));
        assert_eq!(page_labels(&app).len(), 13);
        assert_eq!(page_labels(&app)[12], "More...");

        app.update(AppEvent::Input(UserInput::RadialSlot { slot: 12 }));
        assert!(!app.radial().is_visible());
        let settled = rx.recv().await.unwrap();
        assert!(matches!(
            settled,
            AppEvent::TransitionSettled { allowed: true, .. }
        ));
        app.update(settled);
        assert_eq!(app.radial().page(), 2);
        assert_eq!(page_labels(&app), ["Entry 12", "Entry 13", "Entry 14"]);

        app.update(AppEvent::Input(UserInput::RadialCenter));
        let settled = rx.recv().await.unwrap();
        app.update(settled);
        assert_eq!(app.radial().page(), 1);
        assert!(app.radial().is_visible());
    }

    #[tokio::test]
    async fn attached_host_answers_the_transition_gate() {
        let (mut app, rx, link) = app_with(vec![]);
        let (_epoch, mut outbound) = link.attach();

        app.update(push("openRadialMenu", json!({ "items": placeholder_items(13) })));
        app.update(AppEvent::Input(UserInput::RadialSlot { slot: 12 }));

        let Some(Frame::Call { id, name, .. }) = outbound.recv().await else {
            panic!("expected a call frame");
        };
        assert_eq!(name.as_str(), "radialTransition");
        assert!(link.resolve(Reply::ok(id, json!(false))));

        let settled = rx.recv().await.unwrap();
        app.update(settled);
        assert_eq!(app.radial().page(), 1);
        assert!(!app.radial().is_visible());
    }

    #[tokio::test]
    async fn item_clicks_reach_the_host() {
        let (mut app, _rx, link) = app_with(vec![]);
        let (_epoch, mut outbound) = link.attach();

        app.update(push(
            "openRadialMenu",
            json!({ "items": placeholder_items(20), "option": "x" }),
        ));
        app.update(AppEvent::Input(UserInput::RadialSlot { slot: 4 }));

        let Some(Frame::Call { name, data, .. }) = outbound.recv().await else {
            panic!("expected a call frame");
        };
        assert_eq!(name.as_str(), "radialClick");
        assert_eq!(data, json!(4));
    }

    #[tokio::test]
    async fn late_transition_after_dismiss_is_dropped() {
        let (mut app, rx, _link) =
            app_with(vec![(Call::RadialTransition.into(), json!(true))]);

        app.update(push("openRadialMenu", json!({ "items": placeholder_items(15) })));
        app.update(AppEvent::Input(UserInput::RadialSlot { slot: 12 }));
        app.update(push("openRadialMenu", json!(false)));

        app.update(rx.recv().await.unwrap());
        assert!(!app.radial().is_visible());
        assert_eq!(app.radial().page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_bar_completes_on_its_own() {
        let (mut app, rx, _link) = app_with(vec![]);
        app.update(push("progress", json!({ "label": "Drinking", "duration": 250 })));
        assert!(app.progress(ProgressKind::Bar).is_visible());

        let elapsed = rx.recv().await.unwrap();
        assert!(matches!(
            elapsed,
            AppEvent::ProgressElapsed {
                kind: ProgressKind::Bar,
                ..
            }
        ));
        app.update(elapsed);
        assert!(!app.progress(ProgressKind::Bar).is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn toasts_expire() {
        let (mut app, rx, _link) = app_with(vec![]);
        app.update(push("notify", json!({ "description": "Saved", "duration": 100 })));
        assert_eq!(app.toasts().shown().len(), 1);

        app.update(rx.recv().await.unwrap());
        assert!(app.toasts().shown().is_empty());
    }

    #[tokio::test]
    async fn context_and_text_widgets_are_mounted() {
        let (mut app, _rx, link) = app_with(vec![]);
        let (_epoch, mut outbound) = link.attach();

        app.update(push("textUi", json!({ "text": "[E] Talk" })));
        assert!(app.banner().is_visible());

        app.update(push(
            "showContext",
            json!({ "id": "shop", "options": [{ "title": "Buy" }] }),
        ));
        app.update(AppEvent::Input(UserInput::ContextOption { key: "0".into() }));
        let Some(Frame::Call { name, data, .. }) = outbound.recv().await else {
            panic!("expected a call frame");
        };
        assert_eq!(name.as_str(), "clickContext");
        assert_eq!(data, json!("0"));

        app.update(AppEvent::Input(UserInput::ContextClose));
        assert!(!app.context().is_visible());
    }

    #[tokio::test]
    async fn unknown_pushes_are_harmless() {
        let (mut app, _rx, _link) = app_with(vec![]);
        app.update(push("setClipboard", json!("text")));
        assert!(!app.radial().is_visible());
        assert_eq!(app.registry().handler_count("setClipboard"), 0);
    }

    #[tokio::test]
    async fn config_changes_apply_to_widgets_and_link() {
        let (mut app, _rx, link) = app_with(vec![]);
        let mut config = Config::default();
        config.locale.more = "Mais...".into();
        config.bridge.stubs.push(crate::config::StubConfig {
            name: Call::RadialTransition.into(),
            value: json!(true),
        });
        app.apply_config(&config);

        app.update(push("openRadialMenu", json!({ "items": placeholder_items(13) })));
        assert_eq!(page_labels(&app)[12], "Mais...");
        let reply = nui::Correlator::new(link).gate(Call::RadialTransition).await;
        assert!(reply);
    }

    #[tokio::test]
    async fn socket_changes_need_a_restart_unless_pinned() {
        let (app, _rx, _link) = app_with(vec![]);
        let mut config = Config::default();
        assert_eq!(app.socket_change(&config), None);

        config.bridge.socket = PathBuf::from("/tmp/elsewhere.sock");
        assert_eq!(
            app.socket_change(&config),
            Some(Path::new("/tmp/elsewhere.sock"))
        );

        let pinned = app.pin_socket("/run/overlay/cli.sock");
        assert_eq!(pinned.socket_change(&config), None);
        assert_eq!(pinned.socket_change(&Config::default()), None);
    }
}
