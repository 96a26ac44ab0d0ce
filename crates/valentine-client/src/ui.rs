use std::time::Duration;

use tokio::sync::mpsc;

use crate::routes::Route;

/// Side effects a component asks the front-end to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Navigate(Route),
    Notify(Notification),
    Celebrate(Confetti),
    /// Open an external site in a new tab. Nothing is awaited.
    OpenExternal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Default,
    Destructive,
}

/// A transient, dismissible toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
    /// `None` leaves the front-end's default lifetime in place.
    pub duration: Option<Duration>,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
            duration: None,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".into(),
            description: description.into(),
            variant: Variant::Destructive,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn destructive(mut self) -> Self {
        self.variant = Variant::Destructive;
        self
    }
}

/// Burst parameters for the accept celebration.
#[derive(Debug, Clone, PartialEq)]
pub struct Confetti {
    pub particle_count: u32,
    pub origin_y: f32,
    pub colors: &'static [&'static str],
}

impl Default for Confetti {
    fn default() -> Self {
        Self {
            particle_count: 200,
            origin_y: 0.7,
            colors: &["#FDA4AF", "#FB7185", "#E11D48"],
        }
    }
}

pub type UiReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Cloneable sender half handed to every component.
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiEvent>,
}

pub fn channel() -> (UiHandle, UiReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiHandle { tx }, rx)
}

impl UiHandle {
    pub fn emit(&self, event: UiEvent) {
        // A closed receiver means the screen is gone; nothing left to show.
        let _ = self.tx.send(event);
    }

    pub fn navigate(&self, route: Route) {
        self.emit(UiEvent::Navigate(route));
    }

    pub fn notify(&self, notification: Notification) {
        self.emit(UiEvent::Notify(notification));
    }

    pub fn celebrate(&self) {
        self.emit(UiEvent::Celebrate(Confetti::default()));
    }

    pub fn open_external(&self, url: impl Into<String>) {
        self.emit(UiEvent::OpenExternal(url.into()));
    }
}

/// Drain whatever is queued without waiting. Handy for front-ends that poll
/// once per frame, and for tests.
pub fn drain(rx: &mut UiReceiver) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
