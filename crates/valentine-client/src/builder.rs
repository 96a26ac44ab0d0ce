//! The five-step creation wizard.
//!
//! [`Wizard`] is the pure form state: current step, draft values and inline
//! field errors. [`RequestBuilder`] wraps it with the Record Store and the UI
//! channel and owns the single submission.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{info, warn};
use uuid::Uuid;

use valentine_types::api::NewRequest;
use valentine_types::catalog::{GIFT_OPTIONS, THEMES, TRACKS};
use valentine_types::models::is_blank;

use crate::routes::Route;
use crate::store::RecordStore;
use crate::ui::{Notification, UiHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Identity,
    Message,
    Gift,
    Song,
    Theme,
}

impl Step {
    pub const ALL: [Step; 5] = [Step::Identity, Step::Message, Step::Gift, Step::Song, Step::Theme];

    /// 1-based position, as shown in "Step n of 5".
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn next(self) -> Option<Step> {
        Self::ALL.get(self.number()).copied()
    }

    pub fn prev(self) -> Option<Step> {
        (self as usize).checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Fields that must be filled before leaving this step.
    pub fn required_fields(self) -> &'static [Field] {
        match self {
            Step::Identity => &[Field::SenderName, Field::RecipientName],
            Step::Message => &[Field::Message],
            Step::Gift => &[Field::Gift],
            Step::Song => &[Field::Music],
            Step::Theme => &[Field::Theme],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    SenderName,
    RecipientName,
    Message,
    CustomMessage,
    Gift,
    Music,
    Theme,
}

impl Field {
    /// Inline message shown under an empty required field.
    pub fn required_message(self) -> &'static str {
        match self {
            Field::SenderName => "Sender name is required",
            Field::RecipientName => "Recipient name is required",
            Field::Message => "Message is required",
            Field::CustomMessage => "",
            Field::Gift => "Please choose a gift",
            Field::Music => "Please choose a love song",
            Field::Theme => "Please choose a theme",
        }
    }
}

/// Unsaved form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub sender_name: String,
    pub recipient_name: String,
    pub message: String,
    pub custom_message: String,
    pub gift: String,
    pub theme: String,
    pub music: String,
}

impl Draft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::SenderName => &self.sender_name,
            Field::RecipientName => &self.recipient_name,
            Field::Message => &self.message,
            Field::CustomMessage => &self.custom_message,
            Field::Gift => &self.gift,
            Field::Music => &self.music,
            Field::Theme => &self.theme,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::SenderName => &mut self.sender_name,
            Field::RecipientName => &mut self.recipient_name,
            Field::Message => &mut self.message,
            Field::CustomMessage => &mut self.custom_message,
            Field::Gift => &mut self.gift,
            Field::Music => &mut self.music,
            Field::Theme => &mut self.theme,
        }
    }

    pub fn to_new_request(&self) -> NewRequest {
        NewRequest {
            sender_name: self.sender_name.clone(),
            recipient_name: self.recipient_name.clone(),
            message: self.message.clone(),
            custom_message: (!is_blank(&self.custom_message)).then(|| self.custom_message.clone()),
            gift: self.gift.clone(),
            theme: self.theme.clone(),
            music: self.music.clone(),
            accepted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    step: Step,
    draft: Draft,
    errors: BTreeMap<Field, &'static str>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: Step::Identity,
            draft: Draft::default(),
            errors: BTreeMap::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// `(current, total)` for the progress bar.
    pub fn progress(&self) -> (usize, usize) {
        (self.step.number(), Step::ALL.len())
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn errors(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().map(|(f, m)| (*f, *m))
    }

    /// Editing a field clears its inline error.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.draft.slot(field) = value.into();
        self.errors.remove(&field);
    }

    fn missing(&self, step: Step) -> Vec<Field> {
        step.required_fields()
            .iter()
            .copied()
            .filter(|f| is_blank(self.draft.get(*f)))
            .collect()
    }

    /// Validate only the current step; on success move forward. Returns
    /// whether the step changed. The last step never advances.
    pub fn advance(&mut self) -> bool {
        let missing = self.missing(self.step);
        if !missing.is_empty() {
            for field in missing {
                self.errors.insert(field, field.required_message());
            }
            return false;
        }

        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    pub fn back(&mut self) -> bool {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    /// First step whose required fields are not all filled.
    pub fn first_invalid_step(&self) -> Option<Step> {
        Step::ALL.into_iter().find(|s| !self.missing(*s).is_empty())
    }

    /// Full-draft check used at submission. On failure the wizard jumps to
    /// the first incomplete step and flags its fields.
    fn validate_all(&mut self) -> Result<NewRequest, Step> {
        if let Some(step) = self.first_invalid_step() {
            for field in self.missing(step) {
                self.errors.insert(field, field.required_message());
            }
            self.step = step;
            return Err(step);
        }
        Ok(self.draft.to_new_request())
    }

    pub fn surprise_gift<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &'static str {
        let gift = GIFT_OPTIONS.choose(rng).copied().unwrap_or(GIFT_OPTIONS[0]);
        self.set(Field::Gift, gift);
        gift
    }

    pub fn surprise_theme<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &'static str {
        let theme = THEMES.choose(rng).unwrap_or(&THEMES[0]).id;
        self.set(Field::Theme, theme);
        theme
    }

    pub fn surprise_song<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &'static str {
        let track = TRACKS.choose(rng).unwrap_or(&TRACKS[0]).id;
        self.set(Field::Music, track);
        track
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stored; navigation to the share screen has been emitted.
    Created(Uuid),
    /// Draft incomplete; the wizard now shows this step.
    Invalid(Step),
    /// Another submission is still in flight; nothing was sent.
    AlreadySubmitting,
    /// This builder already stored its request; nothing was sent.
    AlreadySubmitted(Uuid),
    /// The store refused or was unreachable; the draft is kept for retry.
    Failed,
}

/// The creation screen: wizard state plus the one-shot submission.
pub struct RequestBuilder {
    store: Arc<dyn RecordStore>,
    ui: UiHandle,
    wizard: Mutex<Wizard>,
    submitting: AtomicBool,
    submitted: OnceLock<Uuid>,
}

/// Clears the in-flight flag however the submission ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RequestBuilder {
    pub fn new(store: Arc<dyn RecordStore>, ui: UiHandle) -> Self {
        Self {
            store,
            ui,
            wizard: Mutex::new(Wizard::new()),
            submitting: AtomicBool::new(false),
            submitted: OnceLock::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Wizard> {
        match self.wizard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run `f` against the form state.
    pub fn with_wizard<T>(&self, f: impl FnOnce(&mut Wizard) -> T) -> T {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> Wizard {
        self.lock().clone()
    }

    pub fn set(&self, field: Field, value: impl Into<String>) {
        self.lock().set(field, value);
    }

    pub fn advance(&self) -> bool {
        self.lock().advance()
    }

    pub fn back(&self) -> bool {
        self.lock().back()
    }

    pub fn step(&self) -> Step {
        self.lock().step()
    }

    pub fn surprise_gift(&self) -> &'static str {
        self.lock().surprise_gift(&mut rand::rng())
    }

    pub fn surprise_theme(&self) -> &'static str {
        self.lock().surprise_theme(&mut rand::rng())
    }

    pub fn surprise_song(&self) -> &'static str {
        self.lock().surprise_song(&mut rand::rng())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Id of the stored request once a submission has succeeded.
    pub fn submitted(&self) -> Option<Uuid> {
        self.submitted.get().copied()
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return SubmitOutcome::AlreadySubmitting;
        }
        let _in_flight = InFlight(&self.submitting);

        if let Some(id) = self.submitted.get() {
            return SubmitOutcome::AlreadySubmitted(*id);
        }

        let request = match self.lock().validate_all() {
            Ok(request) => request,
            Err(step) => return SubmitOutcome::Invalid(step),
        };

        match self.store.create(request).await {
            Ok(created) => {
                info!("Created request {}", created.id);
                let _ = self.submitted.set(created.id);
                self.ui.navigate(Route::Share(created.id));
                SubmitOutcome::Created(created.id)
            }
            Err(e) => {
                warn!("Error creating request: {}", e);
                self.ui.notify(Notification::error("Could not create request"));
                SubmitOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use valentine_types::catalog;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::ui::{self, UiEvent, Variant};

    fn fill_step(wizard: &mut Wizard, step: Step) {
        match step {
            Step::Identity => {
                wizard.set(Field::SenderName, "Sam");
                wizard.set(Field::RecipientName, "Lee");
            }
            Step::Message => wizard.set(Field::Message, "Hi"),
            Step::Gift => wizard.set(Field::Gift, "🌹 Red Rose Bouquet"),
            Step::Song => wizard.set(Field::Music, "midnight_glow"),
            Step::Theme => wizard.set(Field::Theme, "classic_romance"),
        }
    }

    fn filled_wizard() -> Wizard {
        let mut wizard = Wizard::new();
        for step in Step::ALL {
            fill_step(&mut wizard, step);
        }
        wizard
    }

    #[test]
    fn empty_step_never_advances() {
        for target in Step::ALL {
            let mut wizard = Wizard::new();
            // Walk up to the target step with valid data
            for step in Step::ALL {
                if step == target {
                    break;
                }
                fill_step(&mut wizard, step);
                assert!(wizard.advance());
            }
            assert_eq!(wizard.step(), target);

            assert!(!wizard.advance());
            assert_eq!(wizard.step(), target);
            for field in target.required_fields() {
                assert_eq!(wizard.error(*field), Some(field.required_message()));
            }
        }
    }

    #[test]
    fn whitespace_does_not_satisfy_required() {
        let mut wizard = Wizard::new();
        wizard.set(Field::SenderName, "Sam");
        wizard.set(Field::RecipientName, "  ");
        assert!(!wizard.advance());
        assert_eq!(wizard.error(Field::SenderName), None);
        assert!(wizard.error(Field::RecipientName).is_some());
    }

    #[test]
    fn only_current_step_is_validated() {
        let mut wizard = Wizard::new();
        fill_step(&mut wizard, Step::Identity);
        assert!(wizard.advance());
        // Gift/song/theme are still empty; message step only checks message
        fill_step(&mut wizard, Step::Message);
        assert!(wizard.advance());
        assert_eq!(wizard.step(), Step::Gift);
        assert_eq!(wizard.progress(), (3, 5));
    }

    #[test]
    fn back_and_last_step_edges() {
        let mut wizard = filled_wizard();
        assert!(!wizard.back());
        for _ in 0..4 {
            assert!(wizard.advance());
        }
        assert_eq!(wizard.step(), Step::Theme);
        assert!(!wizard.advance());
        assert_eq!(wizard.step(), Step::Theme);
        assert!(wizard.back());
        assert_eq!(wizard.step(), Step::Song);
    }

    #[test]
    fn surprise_picks_come_from_catalogs() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut wizard = Wizard::new();
        for _ in 0..200 {
            assert!(catalog::is_gift(wizard.surprise_gift(&mut rng)));
            assert!(catalog::theme(wizard.surprise_theme(&mut rng)).is_some());
            assert!(catalog::track(wizard.surprise_song(&mut rng)).is_some());
        }
        // Written into the draft without visiting the steps
        assert_eq!(wizard.step(), Step::Identity);
        assert!(catalog::is_gift(&wizard.draft().gift));
    }

    #[test]
    fn surprise_clears_pending_error() {
        let mut wizard = filled_wizard();
        wizard.set(Field::Gift, "");
        wizard.advance();
        wizard.advance();
        assert!(!wizard.advance());
        assert!(wizard.error(Field::Gift).is_some());

        wizard.surprise_gift(&mut StdRng::seed_from_u64(1));
        assert_eq!(wizard.error(Field::Gift), None);
        assert!(wizard.advance());
    }

    #[tokio::test]
    async fn valid_submit_creates_once_and_navigates() {
        let store = Arc::new(MemoryStore::new());
        let (ui, mut rx) = ui::channel();
        let builder = RequestBuilder::new(store.clone(), ui);
        builder.with_wizard(|w| *w = filled_wizard());

        let SubmitOutcome::Created(id) = builder.submit().await else {
            panic!("expected creation");
        };

        let calls = store.create_calls();
        assert_eq!(calls.len(), 1);
        let sent = &calls[0];
        assert_eq!(sent.sender_name, "Sam");
        assert_eq!(sent.recipient_name, "Lee");
        assert_eq!(sent.message, "Hi");
        assert_eq!(sent.gift, "🌹 Red Rose Bouquet");
        assert_eq!(sent.theme, "classic_romance");
        assert_eq!(sent.music, "midnight_glow");
        assert_eq!(sent.custom_message, None);
        assert!(!sent.accepted);

        assert_eq!(ui::drain(&mut rx), vec![UiEvent::Navigate(Route::Share(id))]);
        assert!(!builder.is_submitting());
    }

    #[tokio::test]
    async fn resubmit_after_success_sends_nothing() {
        let store = Arc::new(MemoryStore::new());
        let (ui, mut rx) = ui::channel();
        let builder = RequestBuilder::new(store.clone(), ui);
        builder.with_wizard(|w| *w = filled_wizard());

        let SubmitOutcome::Created(id) = builder.submit().await else {
            panic!("expected creation");
        };
        ui::drain(&mut rx);

        assert_eq!(builder.submit().await, SubmitOutcome::AlreadySubmitted(id));
        assert_eq!(builder.submitted(), Some(id));
        assert_eq!(store.create_calls().len(), 1);
        assert!(ui::drain(&mut rx).is_empty());
        assert!(!builder.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn double_submit_creates_one_record() {
        let store = Arc::new(MemoryStore::new().with_latency(Duration::from_millis(500)));
        let (ui, mut rx) = ui::channel();
        let builder = RequestBuilder::new(store.clone(), ui);
        builder.with_wizard(|w| *w = filled_wizard());

        let (first, second) = tokio::join!(builder.submit(), builder.submit());

        assert!(matches!(first, SubmitOutcome::Created(_)));
        assert_eq!(second, SubmitOutcome::AlreadySubmitting);
        assert_eq!(store.create_calls().len(), 1);

        let navigations = ui::drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, UiEvent::Navigate(_)))
            .count();
        assert_eq!(navigations, 1);
    }

    #[tokio::test]
    async fn incomplete_draft_is_not_sent() {
        let store = Arc::new(MemoryStore::new());
        let (ui, mut rx) = ui::channel();
        let builder = RequestBuilder::new(store.clone(), ui);
        builder.with_wizard(|w| {
            *w = filled_wizard();
            w.set(Field::Music, "");
        });

        assert_eq!(builder.submit().await, SubmitOutcome::Invalid(Step::Song));
        assert_eq!(builder.step(), Step::Song);
        assert!(store.create_calls().is_empty());
        assert!(ui::drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn failed_submit_keeps_draft_for_retry() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_creates(true);
        let (ui, mut rx) = ui::channel();
        let builder = RequestBuilder::new(store.clone(), ui);
        builder.with_wizard(|w| *w = filled_wizard());

        assert_eq!(builder.submit().await, SubmitOutcome::Failed);
        match ui::drain(&mut rx).as_slice() {
            [UiEvent::Notify(n)] => {
                assert_eq!(n.title, "Error");
                assert_eq!(n.description, "Could not create request");
                assert_eq!(n.variant, Variant::Destructive);
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert_eq!(builder.snapshot().draft(), filled_wizard().draft());

        store.set_fail_creates(false);
        assert!(matches!(builder.submit().await, SubmitOutcome::Created(_)));
        assert_eq!(store.create_calls().len(), 2);
    }

    #[test]
    fn custom_message_is_optional() {
        let mut wizard = filled_wizard();
        assert_eq!(wizard.draft().to_new_request().custom_message, None);
        wizard.set(Field::CustomMessage, "See you at eight");
        assert_eq!(
            wizard.draft().to_new_request().custom_message.as_deref(),
            Some("See you at eight")
        );
    }
}
