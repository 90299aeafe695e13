use crate::events::AppEvent;
use crate::gui::{Effect, Effects, Ticket};
use nui::payload::CirclePosition;
use nui::{Call, EventRegistry, Subscription, topic};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProgressKind {
    Bar,
    Circle,
}

#[derive(Debug, Clone)]
struct Run {
    ticket: Ticket,
    label: String,
    duration: Duration,
    started: Instant,
    position: CirclePosition,
}

/// Timed progress indicator. Completion, by time or by cancel, is reported
/// to the host with `progressComplete`.
#[derive(Debug)]
pub struct ProgressWidget {
    kind: ProgressKind,
    run: Option<Run>,
    last_ticket: Ticket,
    resting: u8,
}

impl ProgressWidget {
    pub fn new(kind: ProgressKind) -> Self {
        Self {
            kind,
            run: None,
            last_ticket: Ticket::default(),
            resting: 0,
        }
    }

    pub fn kind(&self) -> ProgressKind {
        self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.run.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.run.as_ref().map(|run| run.label.as_str())
    }

    pub fn position(&self) -> Option<CirclePosition> {
        self.run.as_ref().map(|run| run.position)
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.run.as_ref().map(|run| run.started)
    }

    /// A bar restarts on every call; a circle ignores new starts while running.
    pub fn start(
        &mut self,
        label: &str,
        duration: Duration,
        position: Option<CirclePosition>,
    ) -> Vec<Effect> {
        if self.kind == ProgressKind::Circle && self.run.is_some() {
            log::debug!("circle progress already running, '{label}' ignored");
            return Vec::new();
        }

        self.last_ticket = self.last_ticket.next();
        self.resting = 0;
        self.run = Some(Run {
            ticket: self.last_ticket,
            label: label.to_string(),
            duration,
            started: Instant::now(),
            position: position.unwrap_or_default(),
        });
        vec![Effect::Schedule {
            delay: duration,
            event: AppEvent::ProgressElapsed {
                kind: self.kind,
                ticket: self.last_ticket,
            },
        }]
    }

    pub fn cancel(&mut self) -> Vec<Effect> {
        if self.run.take().is_none() {
            return Vec::new();
        }
        if self.kind == ProgressKind::Circle {
            self.resting = 99;
        }
        vec![Effect::bare(Call::ProgressComplete)]
    }

    pub fn elapse(&mut self, ticket: Ticket) -> Vec<Effect> {
        if self.run.as_ref().is_none_or(|run| run.ticket != ticket) {
            log::debug!("{} progress timer {ticket} is stale", self.kind);
            return Vec::new();
        }
        self.run = None;
        self.resting = 100;
        vec![Effect::bare(Call::ProgressComplete)]
    }

    /// Completed share of the running duration, 0 to 100.
    pub fn percent_at(&self, now: Instant) -> u8 {
        let Some(run) = &self.run else {
            return self.resting;
        };
        if run.duration.is_zero() {
            return 100;
        }
        let elapsed = now.saturating_duration_since(run.started);
        (elapsed.as_secs_f64() / run.duration.as_secs_f64() * 100.0).min(100.0) as u8
    }
}

pub fn mount(
    registry: &EventRegistry,
    widget: &Rc<RefCell<ProgressWidget>>,
    effects: &Effects,
) -> Vec<Subscription> {
    let kind = widget.borrow().kind();
    let start = {
        let widget = widget.clone();
        let effects = effects.clone();
        match kind {
            ProgressKind::Bar => registry.on::<topic::Progress>(move |data| {
                let out = widget.borrow_mut().start(&data.label, data.duration, None);
                effects.run_all(out);
            }),
            ProgressKind::Circle => registry.on::<topic::CircleProgress>(move |data| {
                let label = data.label.as_deref().unwrap_or_default();
                let out = widget
                    .borrow_mut()
                    .start(label, data.duration, data.position);
                effects.run_all(out);
            }),
        }
    };
    let cancel = {
        let widget = widget.clone();
        let effects = effects.clone();
        registry.on::<topic::ProgressCancel>(move |_| {
            let out = widget.borrow_mut().cancel();
            effects.run_all(out);
        })
    };
    vec![start, cancel]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    fn elapsed_ticket(effects: &[Effect]) -> Ticket {
        match effects {
            [Effect::Schedule {
                event: AppEvent::ProgressElapsed { ticket, .. },
                ..
            }] => *ticket,
            other => panic!("expected a timer, got {other:?}"),
        }
    }

    #[test]
    fn elapsing_completes_once() {
        let mut bar = ProgressWidget::new(ProgressKind::Bar);
        let effects = bar.start("Drinking", SECOND, None);
        assert_eq!(
            effects,
            [Effect::Schedule {
                delay: SECOND,
                event: AppEvent::ProgressElapsed {
                    kind: ProgressKind::Bar,
                    ticket: Ticket::from(1)
                }
            }]
        );
        assert_eq!(bar.label(), Some("Drinking"));

        let ticket = elapsed_ticket(&effects);
        assert_eq!(bar.elapse(ticket), [Effect::bare(Call::ProgressComplete)]);
        assert!(!bar.is_visible());
        assert!(bar.elapse(ticket).is_empty());
    }

    #[test]
    fn restarted_bar_ignores_the_old_timer() {
        let mut bar = ProgressWidget::new(ProgressKind::Bar);
        let first = elapsed_ticket(&bar.start("One", SECOND, None));
        let second = elapsed_ticket(&bar.start("Two", SECOND, None));

        assert!(bar.elapse(first).is_empty());
        assert_eq!(bar.label(), Some("Two"));
        assert_eq!(bar.elapse(second).len(), 1);
    }

    #[test]
    fn cancel_reports_only_when_shown() {
        let mut bar = ProgressWidget::new(ProgressKind::Bar);
        assert!(bar.cancel().is_empty());

        let ticket = elapsed_ticket(&bar.start("Repairing", SECOND, None));
        assert_eq!(bar.cancel(), [Effect::bare(Call::ProgressComplete)]);
        assert!(bar.elapse(ticket).is_empty());
    }

    #[test]
    fn circle_ignores_starts_while_running() {
        let mut circle = ProgressWidget::new(ProgressKind::Circle);
        circle.start("Lockpicking", SECOND, Some(CirclePosition::Bottom));
        assert!(circle.start("Other", SECOND, None).is_empty());
        assert_eq!(circle.label(), Some("Lockpicking"));
        assert_eq!(circle.position(), Some(CirclePosition::Bottom));
    }

    #[test]
    fn cancelled_circle_rests_at_99() {
        let mut circle = ProgressWidget::new(ProgressKind::Circle);
        circle.start("", SECOND, None);
        assert_eq!(circle.position(), Some(CirclePosition::Middle));
        circle.cancel();
        assert_eq!(circle.percent_at(Instant::now()), 99);
    }

    #[test]
    fn percent_follows_the_clock() {
        let mut bar = ProgressWidget::new(ProgressKind::Bar);
        bar.start("Eating", 4 * SECOND, None);
        let started = bar.started_at().unwrap();
        assert_eq!(bar.percent_at(started), 0);
        assert_eq!(bar.percent_at(started + SECOND), 25);
        assert_eq!(bar.percent_at(started + 10 * SECOND), 100);

        let mut instant = ProgressWidget::new(ProgressKind::Bar);
        instant.start("", Duration::ZERO, None);
        assert_eq!(instant.percent_at(Instant::now()), 100);
    }
}
