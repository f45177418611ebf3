//! Intake conversation engine.
//!
//! Routes inbound messages through commands, the two-step collection flow,
//! and instant add. Every message for a user runs under that user's session
//! lock, acquired once up front and threaded through as a [`UserSession`]
//! handle, so rapid double-sends cannot interleave a read-modify-write.
//!
//! Domain errors never escape: the engine answers them with a re-prompt.
//! Only infrastructure failures propagate to the adapter.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::channel::{ChannelSender, ImageStore, InboundMessage};
use crate::conversation::category::detect_category;
use crate::conversation::parse::{parse_amount, parse_instant};
use crate::conversation::summary::{SummaryPeriod, format_summary};
use crate::conversation::vendor::extract_vendor;
use crate::error::IntakeError;
use crate::models::{BillImage, Expense, ExpenseImage, IntakeStep, PendingExpenseSession, SessionUpdate};
use crate::services::{SessionService, UserSession};
use crate::storage::ExpenseStore;

pub struct IntakeEngine {
    sessions: SessionService,
    expenses: ExpenseStore,
    sender: Arc<dyn ChannelSender>,
    images: Option<Arc<dyn ImageStore>>,
}

impl IntakeEngine {
    pub fn new(
        sessions: SessionService,
        expenses: ExpenseStore,
        sender: Arc<dyn ChannelSender>,
    ) -> Self {
        Self {
            sessions,
            expenses,
            sender,
            images: None,
        }
    }

    /// Attach the image storage collaborator.
    ///
    /// Without one, receipt references keep the channel's remote URL and an
    /// empty storage id.
    pub fn with_image_store(mut self, images: Arc<dyn ImageStore>) -> Self {
        self.images = Some(images);
        self
    }

    /// Handle one inbound message for an already-resolved user.
    ///
    /// The adapter maps the channel address to `user_id` before calling in.
    pub async fn handle_message(&self, user_id: &str, msg: &InboundMessage) -> Result<()> {
        let user = self.sessions.lock_user(user_id).await;

        let reply_to = msg.sender_address.as_str();
        let text = msg.text.as_deref().unwrap_or("").trim().to_string();
        let lower = text.to_lowercase();

        match lower.as_str() {
            "cancel" | "exit" => {
                user.delete()?;
                return self
                    .send(reply_to, "❌ Cancelled.\n\nSend *add* to start again.")
                    .await;
            }
            "help" | "?" => return self.send(reply_to, HELP_TEXT).await,
            "summary" | "today" => return self.report(user_id, reply_to, SummaryPeriod::Today).await,
            "week" => return self.report(user_id, reply_to, SummaryPeriod::Week).await,
            "month" => return self.report(user_id, reply_to, SummaryPeriod::Month).await,
            "add" | "new" => return self.start_session(&user, reply_to).await,
            _ => {}
        }

        if let Some(image) = &msg.image {
            return self.attach_image(&user, reply_to, &image.url).await;
        }

        match user.get() {
            Ok(session) => self.process_step(&user, reply_to, session, &text).await,
            Err(IntakeError::NotFound(_)) => self.no_session_text(user_id, reply_to, &text).await,
            Err(IntakeError::Storage(e)) => Err(e),
            Err(e) => Err(e.into()),
        }
    }

    /// Start a fresh session; any previous one for the user is discarded
    /// first, matching the chat UX where *add* always restarts.
    async fn start_session(&self, user: &UserSession<'_>, reply_to: &str) -> Result<()> {
        user.delete()?;
        let session = match user.create(reply_to) {
            Ok(session) => session,
            Err(IntakeError::Storage(e)) => return Err(e),
            Err(e) => return Err(e.into()),
        };
        debug!(
            user_id = %session.user_id,
            created_at = session.created_at,
            "Intake session started"
        );

        self.send(
            reply_to,
            "📝 *New Expense*\n\n*Step 1/2: Amount*\nEnter the amount:\n\n_Example: 500_\n\n💡 _Tip: Send a photo anytime to attach the receipt_",
        )
        .await
    }

    async fn process_step(
        &self,
        user: &UserSession<'_>,
        reply_to: &str,
        session: PendingExpenseSession,
        text: &str,
    ) -> Result<()> {
        match session.step {
            IntakeStep::Amount => self.collect_amount(user, reply_to, text).await,
            IntakeStep::Description => self.collect_description(user, reply_to, text).await,
        }
    }

    async fn collect_amount(&self, user: &UserSession<'_>, reply_to: &str, text: &str) -> Result<()> {
        let Some(amount) = parse_amount(text) else {
            return self
                .send(reply_to, "❌ Please enter a valid amount.\n\n_Example: 500_")
                .await;
        };

        let update = SessionUpdate::step(IntakeStep::Description).with_amount(amount);
        if let Err(e) = user.update(update) {
            return self.recover(reply_to, e).await;
        }

        self.send(
            reply_to,
            &format!(
                "✅ Amount: ₹{amount}\n\n*Step 2/2: Description*\nWhat was this for?\n\n_Example: Lunch at Cafe Coffee Day_"
            ),
        )
        .await
    }

    async fn collect_description(
        &self,
        user: &UserSession<'_>,
        reply_to: &str,
        text: &str,
    ) -> Result<()> {
        if text.len() < 2 {
            return self
                .send(
                    reply_to,
                    "❌ Please enter a description.\n\n_Example: Lunch at office_",
                )
                .await;
        }

        let category = detect_category(text);
        let vendor = extract_vendor(text);
        let update = SessionUpdate::default()
            .with_description(text)
            .with_category(category)
            .with_vendor(vendor);

        let session = match user.update(update) {
            Ok(session) => session,
            Err(e) => return self.recover(reply_to, e).await,
        };

        let expense = self.finalize(user, session)?;
        self.send(
            reply_to,
            &format!(
                "✅ *Expense Saved!*\n\n💰 ₹{}\n📝 {}\n📁 {}\n🏪 {}\n📅 {}\n{}\n_Send *add* for another or *summary* for a report_",
                expense.amount,
                expense.description,
                expense.category,
                expense.vendor,
                format_date(expense.occurred_at),
                if expense.images.is_empty() {
                    ""
                } else {
                    "📷 Receipt attached\n"
                },
            ),
        )
        .await
    }

    /// Convert a completed session into a stored expense and drop the
    /// session. All-or-nothing per call: the session is only deleted after
    /// the expense write succeeds.
    fn finalize(&self, user: &UserSession<'_>, session: PendingExpenseSession) -> Result<Expense> {
        let amount = session
            .amount
            .ok_or_else(|| anyhow::anyhow!("session for {} has no amount", session.user_id))?;
        let description = session.description.clone().unwrap_or_default();

        let mut expense = Expense::new(session.user_id.clone(), amount, description);
        if let Some(category) = &session.category {
            expense = expense.with_category(category);
        }
        if let Some(vendor) = &session.vendor {
            expense = expense.with_vendor(vendor);
        }
        if let Some(occurred_at) = session.occurred_at {
            expense = expense.with_occurred_at(occurred_at);
        }
        if let Some(image) = &session.attached_image {
            expense = expense.with_image(ExpenseImage {
                url: image.url.clone(),
                storage_id: image.storage_id.clone(),
                filename: "receipt.jpg".to_string(),
            });
        }

        self.expenses.create(&expense)?;
        user.delete()?;
        info!(
            user_id = %expense.user_id,
            amount = expense.amount,
            category = %expense.category,
            "Expense finalized"
        );
        Ok(expense)
    }

    /// Plain text with no live session: instant add or a usage hint.
    async fn no_session_text(&self, user_id: &str, reply_to: &str, text: &str) -> Result<()> {
        if let Some(parsed) = parse_instant(text) {
            let expense = Expense::new(user_id, parsed.amount, parsed.description.clone())
                .with_category(detect_category(&parsed.description))
                .with_vendor(extract_vendor(&parsed.description));
            self.expenses.create(&expense)?;
            info!(user_id, amount = expense.amount, "Instant expense added");

            return self
                .send(
                    reply_to,
                    &format!(
                        "⚡ *Expense Added!*\n\n💰 ₹{}\n📝 {}\n📁 {}\n🏪 {}\n📅 {}\n\n_Send another or type *summary*_",
                        expense.amount,
                        expense.description,
                        expense.category,
                        expense.vendor,
                        format_date(expense.occurred_at),
                    ),
                )
                .await;
        }

        self.send(
            reply_to,
            "👋 *Hi!*\n\n⚡ Send: *500 lunch* to add an expense\n📝 Send: *add* for step-by-step\n📷 Send: a photo to start with a receipt\n❓ Send: *help* for all commands",
        )
        .await
    }

    /// A receipt photo arrived. Attach it to the live session, or start a
    /// session from it.
    async fn attach_image(
        &self,
        user: &UserSession<'_>,
        reply_to: &str,
        remote_url: &str,
    ) -> Result<()> {
        let bill = match &self.images {
            Some(store) => store.store(remote_url).await?,
            None => BillImage {
                url: remote_url.to_string(),
                storage_id: String::new(),
            },
        };

        match user.get() {
            Ok(session) => {
                let update = SessionUpdate::default().with_image(bill);
                if let Err(e) = user.update(update) {
                    return self.recover(reply_to, e).await;
                }
                let step_label = match session.step {
                    IntakeStep::Amount => "1/2 (amount)",
                    IntakeStep::Description => "2/2 (description)",
                };
                self.send(
                    reply_to,
                    &format!("📷 *Receipt Attached!*\n\nContinue with step {step_label}"),
                )
                .await
            }
            Err(IntakeError::NotFound(_)) => {
                if let Err(e) = user.create(reply_to) {
                    match e {
                        IntakeError::Storage(e) => return Err(e),
                        e => return Err(e.into()),
                    }
                }
                let update = SessionUpdate::default().with_image(bill);
                if let Err(e) = user.update(update) {
                    return self.recover(reply_to, e).await;
                }
                self.send(
                    reply_to,
                    "📷 *Receipt Saved!*\n\n*Step 1/2: Amount*\nEnter the amount:\n\n_Example: 500_",
                )
                .await
            }
            Err(IntakeError::Storage(e)) => Err(e),
            Err(e) => Err(e.into()),
        }
    }

    async fn report(&self, user_id: &str, reply_to: &str, period: SummaryPeriod) -> Result<()> {
        let since = period.start(chrono::Utc::now());
        let expenses = self.expenses.list_by_user_since(user_id, since)?;
        self.send(reply_to, &format_summary(period, &expenses)).await
    }

    /// Answer a recoverable domain error with a re-prompt; propagate
    /// infrastructure failures.
    async fn recover(&self, reply_to: &str, error: IntakeError) -> Result<()> {
        match error {
            IntakeError::Storage(e) => Err(e),
            e => {
                debug!(error = %e, "Recoverable intake error, re-prompting");
                self.send(
                    reply_to,
                    "⌛ That session is no longer active.\n\nSend *add* to start a new expense.",
                )
                .await
            }
        }
    }

    async fn send(&self, to: &str, text: &str) -> Result<()> {
        self.sender.send(to, text).await
    }
}

const HELP_TEXT: &str = "📱 *Expense Tracker*\n\n*Quick Add (2 steps):*\n📝 *add* - Start adding an expense\n\n*Instant Add:*\n⚡ Just send: *500 lunch*\n\n*With Photo:*\n📷 Send a photo, then amount & description\n\n*Reports:*\n📊 *summary* - Today\n📅 *week* - This week\n📆 *month* - This month\n\n❌ *cancel* - Cancel current";

/// DD/MM/YYYY, the format the original sheet uses.
fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::MockSender;
    use crate::storage::PendingSessionStore;
    use tempfile::tempdir;

    struct Fixture {
        engine: IntakeEngine,
        sender: Arc<MockSender>,
        sessions: SessionService,
        expenses: ExpenseStore,
        _tmp: tempfile::TempDir,
    }

    fn setup() -> Fixture {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("test.db");
        let storage = kharcha_storage::Storage::new(db_path.to_str().unwrap()).unwrap();

        let sessions = SessionService::new(PendingSessionStore::new(storage.pending_sessions.clone()));
        let expenses = ExpenseStore::new(storage.expenses.clone());
        let sender = Arc::new(MockSender::new());
        let engine = IntakeEngine::new(sessions.clone(), expenses.clone(), sender.clone());

        Fixture {
            engine,
            sender,
            sessions,
            expenses,
            _tmp: tmp,
        }
    }

    const PHONE: &str = "+919000000001";

    async fn say(fixture: &Fixture, text: &str) {
        fixture
            .engine
            .handle_message("u1", &InboundMessage::text(PHONE, text))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_guided_flow_creates_expense() {
        let fixture = setup();

        say(&fixture, "add").await;
        assert_eq!(fixture.sessions.get("u1").unwrap().step, IntakeStep::Amount);

        say(&fixture, "₹450").await;
        let session = fixture.sessions.get("u1").unwrap();
        assert_eq!(session.step, IntakeStep::Description);
        assert_eq!(session.amount, Some(450.0));

        say(&fixture, "dinner at Meghana").await;

        // Session is gone, expense exists
        assert!(matches!(
            fixture.sessions.get("u1"),
            Err(IntakeError::NotFound(_))
        ));
        let expenses = fixture.expenses.list_by_user("u1").unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, 450.0);
        assert_eq!(expenses[0].category, "Meals - Food");
        assert_eq!(expenses[0].vendor, "Meghana");

        let last = fixture.sender.last_message().await.unwrap();
        assert!(last.contains("Expense Saved"));
    }

    #[tokio::test]
    async fn test_invalid_amount_reprompts() {
        let fixture = setup();

        say(&fixture, "add").await;
        say(&fixture, "not a number").await;

        assert_eq!(fixture.sessions.get("u1").unwrap().step, IntakeStep::Amount);
        let last = fixture.sender.last_message().await.unwrap();
        assert!(last.contains("valid amount"));
    }

    #[tokio::test]
    async fn test_short_description_reprompts() {
        let fixture = setup();

        say(&fixture, "add").await;
        say(&fixture, "100").await;
        say(&fixture, "x").await;

        assert_eq!(
            fixture.sessions.get("u1").unwrap().step,
            IntakeStep::Description
        );
        assert_eq!(fixture.expenses.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_restarts_existing_session() {
        let fixture = setup();

        say(&fixture, "add").await;
        say(&fixture, "100").await;
        say(&fixture, "add").await;

        let session = fixture.sessions.get("u1").unwrap();
        assert_eq!(session.step, IntakeStep::Amount);
        assert!(session.amount.is_none(), "restart discards collected data");
    }

    #[tokio::test]
    async fn test_cancel_deletes_session() {
        let fixture = setup();

        say(&fixture, "add").await;
        say(&fixture, "cancel").await;

        assert!(matches!(
            fixture.sessions.get("u1"),
            Err(IntakeError::NotFound(_))
        ));
        let last = fixture.sender.last_message().await.unwrap();
        assert!(last.contains("Cancelled"));
    }

    #[tokio::test]
    async fn test_instant_add() {
        let fixture = setup();

        say(&fixture, "250 lunch at St Martha").await;

        let expenses = fixture.expenses.list_by_user("u1").unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, 250.0);
        assert_eq!(expenses[0].vendor, "St Martha");

        let last = fixture.sender.last_message().await.unwrap();
        assert!(last.contains("Expense Added"));
    }

    #[tokio::test]
    async fn test_unknown_text_sends_hint() {
        let fixture = setup();

        say(&fixture, "hello there").await;

        assert_eq!(fixture.expenses.count().unwrap(), 0);
        let last = fixture.sender.last_message().await.unwrap();
        assert!(last.contains("help"));
    }

    #[tokio::test]
    async fn test_photo_starts_session_and_lands_on_expense() {
        let fixture = setup();

        let photo = InboundMessage {
            sender_address: PHONE.to_string(),
            text: None,
            image: Some(crate::channel::InboundImage {
                url: "https://media.example/bill.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
            }),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        fixture.engine.handle_message("u1", &photo).await.unwrap();

        let session = fixture.sessions.get("u1").unwrap();
        assert_eq!(
            session.attached_image.as_ref().map(|i| i.url.as_str()),
            Some("https://media.example/bill.jpg")
        );

        say(&fixture, "899").await;
        say(&fixture, "shoes from Myntra").await;

        let expenses = fixture.expenses.list_by_user("u1").unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].images.len(), 1);
        assert_eq!(expenses[0].images[0].filename, "receipt.jpg");
    }

    #[tokio::test]
    async fn test_summary_reports_period_expenses() {
        let fixture = setup();

        say(&fixture, "120 coffee").await;
        say(&fixture, "summary").await;

        let last = fixture.sender.last_message().await.unwrap();
        assert!(last.contains("Today's Expenses"));
        assert!(last.contains("₹120"));
    }

    #[tokio::test]
    async fn test_summary_empty() {
        let fixture = setup();

        say(&fixture, "month").await;

        let last = fixture.sender.last_message().await.unwrap();
        assert!(last.contains("No expenses recorded"));
    }

    #[tokio::test]
    async fn test_users_do_not_share_sessions() {
        let fixture = setup();

        say(&fixture, "add").await;
        fixture
            .engine
            .handle_message("u2", &InboundMessage::text("+919000000002", "add"))
            .await
            .unwrap();

        say(&fixture, "100").await;
        assert_eq!(fixture.sessions.get("u2").unwrap().step, IntakeStep::Amount);
        assert_eq!(
            fixture.sessions.get("u1").unwrap().step,
            IntakeStep::Description
        );
    }
}
