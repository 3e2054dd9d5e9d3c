//! The state machine that mediates creating, editing and deleting transactions.
//!
//! A [TransactionEditor] holds the unvalidated form contents (the draft) and
//! moves through [EditorState] as the user edits and submits the form. Writes
//! are sent straight to a [TransactionStore]; the editor never keeps its own
//! copy of the user's transactions.

use std::time::Duration;

use time::{Date, OffsetDateTime, macros::date};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    auth::Session,
    database_id::TransactionId,
    money::{Amount, AmountParseError},
    transaction::{
        category::{Category, TransactionType},
        core::{Transaction, TransactionFields},
        store::TransactionStore,
    },
};

/// The earliest date a transaction may have.
pub const MIN_TRANSACTION_DATE: Date = date!(1900 - 01 - 01);

/// How long to wait for the store before giving up on a write.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// The contents of the transaction form, as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub transaction_type: TransactionType,
    /// The amount as typed, parsed during validation.
    pub amount: String,
    pub description: String,
    /// The name of the selected category, if any.
    pub category: Option<String>,
    pub date: Option<Date>,
}

impl TransactionDraft {
    /// An empty expense dated `today`.
    pub fn new(today: Date) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            amount: String::new(),
            description: String::new(),
            category: None,
            date: Some(today),
        }
    }

    /// The selected category, if it is a known category.
    pub fn selected_category(&self) -> Option<Category> {
        self.category.as_deref().and_then(|name| name.parse().ok())
    }
}

impl From<&Transaction> for TransactionDraft {
    fn from(transaction: &Transaction) -> Self {
        Self {
            transaction_type: transaction.transaction_type,
            amount: transaction.amount.to_string(),
            description: transaction.description.clone(),
            category: Some(transaction.category.to_string()),
            date: Some(transaction.date),
        }
    }
}

/// Validation messages for each field of the transaction form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    pub amount: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl FieldErrors {
    /// Whether every field passed validation.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }
}

/// Check `draft` and convert it into the fields of a transaction.
///
/// Dates after `today` are rejected for both new and edited transactions.
pub fn validate(draft: &TransactionDraft, today: Date) -> Result<TransactionFields, FieldErrors> {
    let mut errors = FieldErrors::default();

    let amount = match draft.amount.parse::<Amount>() {
        Ok(amount) if amount.is_positive() => Some(amount),
        Ok(_) => {
            errors.amount = Some("Amount must be positive.".to_owned());
            None
        }
        Err(AmountParseError::TooManyDecimals) => {
            errors.amount = Some("Amount can have at most two decimal places.".to_owned());
            None
        }
        Err(AmountParseError::OutOfRange) => {
            errors.amount = Some("Amount cannot be more than $1,000,000,000,000.".to_owned());
            None
        }
        Err(AmountParseError::Empty | AmountParseError::NotANumber) => {
            errors.amount = Some("Amount must be a number.".to_owned());
            None
        }
    };

    let description = draft.description.trim();
    if description.graphemes(true).count() < 2 {
        errors.description = Some("Description must be at least 2 characters.".to_owned());
    }

    let category = draft
        .selected_category()
        .filter(|category| category.is_allowed_for(draft.transaction_type));
    if category.is_none() {
        errors.category = Some("Please select a category.".to_owned());
    }

    match draft.date {
        None => errors.date = Some("Please select a date.".to_owned()),
        Some(date) if date > today => {
            errors.date = Some("Date cannot be in the future.".to_owned())
        }
        Some(date) if date < MIN_TRANSACTION_DATE => {
            errors.date = Some(format!("Date must be on or after {MIN_TRANSACTION_DATE}."))
        }
        Some(_) => {}
    }

    match (amount, category, draft.date) {
        (Some(amount), Some(category), Some(date)) if errors.is_empty() => Ok(TransactionFields {
            transaction_type: draft.transaction_type,
            amount,
            category,
            description: description.to_owned(),
            date,
        }),
        _ => Err(errors),
    }
}

/// Whether the editor is creating a new transaction or replacing an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(TransactionId),
}

/// The phases of editing a transaction.
#[derive(Debug, PartialEq)]
pub enum EditorState {
    /// No form is open.
    Idle,
    /// The form is open, possibly with validation messages from the last submit.
    Editing {
        mode: EditorMode,
        draft: TransactionDraft,
        errors: FieldErrors,
    },
    /// A write has been sent to the store and has not been acknowledged yet.
    Submitting {
        mode: EditorMode,
        draft: TransactionDraft,
    },
    /// The store acknowledged the write.
    Succeeded(Transaction),
    /// The store rejected the write, or did not answer in time.
    Failed {
        mode: EditorMode,
        draft: TransactionDraft,
        message: String,
    },
}

/// Drives a single transaction form through [EditorState].
///
/// Calling an operation in a state where it does not apply returns
/// [Error::InvalidEditorState] and leaves the state unchanged.
#[derive(Debug)]
pub struct TransactionEditor {
    state: EditorState,
}

impl Default for TransactionEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionEditor {
    /// Create an editor with no open form.
    pub fn new() -> Self {
        Self {
            state: EditorState::Idle,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Open the form for a new transaction with default values.
    pub fn open_create(&mut self, today: Date) -> Result<(), Error> {
        self.open_with(EditorMode::Create, TransactionDraft::new(today))
    }

    /// Open the form pre-filled with the fields of `transaction`.
    pub fn open_edit(&mut self, transaction: &Transaction) -> Result<(), Error> {
        self.open_with(EditorMode::Edit(transaction.id), transaction.into())
    }

    fn open_with(&mut self, mode: EditorMode, draft: TransactionDraft) -> Result<(), Error> {
        if self.state != EditorState::Idle {
            return Err(Error::InvalidEditorState);
        }

        self.state = EditorState::Editing {
            mode,
            draft,
            errors: FieldErrors::default(),
        };

        Ok(())
    }

    /// Change the transaction type, clearing the category if the type changed.
    pub fn set_type(&mut self, transaction_type: TransactionType) -> Result<(), Error> {
        let EditorState::Editing { draft, .. } = &mut self.state else {
            return Err(Error::InvalidEditorState);
        };

        if draft.transaction_type != transaction_type {
            draft.transaction_type = transaction_type;
            draft.category = None;
        }

        Ok(())
    }

    /// Replace the draft with the latest form contents.
    ///
    /// When the type differs from the current draft, a category that is not
    /// valid for the new type is cleared.
    pub fn update_draft(&mut self, mut new_draft: TransactionDraft) -> Result<(), Error> {
        let EditorState::Editing { draft, errors, .. } = &mut self.state else {
            return Err(Error::InvalidEditorState);
        };

        let type_changed = draft.transaction_type != new_draft.transaction_type;
        let category_allowed = new_draft
            .selected_category()
            .is_some_and(|category| category.is_allowed_for(new_draft.transaction_type));

        if type_changed && !category_allowed {
            new_draft.category = None;
        }

        *draft = new_draft;
        *errors = FieldErrors::default();

        Ok(())
    }

    /// Validate the draft and write it to `store`.
    ///
    /// Without a session the write is refused with [Error::NotAuthenticated]
    /// before the draft is checked. Validation failures keep the editor in
    /// [EditorState::Editing] with per-field messages and return
    /// [Error::InvalidForm]. In both cases the store is not called.
    ///
    /// The store call runs on the blocking thread pool and is abandoned after
    /// `timeout`, in which case the editor moves to [EditorState::Failed] and
    /// [Error::StoreTimeout] is returned. The write may still complete in the
    /// store.
    pub async fn submit<S: TransactionStore>(
        &mut self,
        session: Option<&Session>,
        store: &S,
        today: Date,
        timeout: Duration,
    ) -> Result<Transaction, Error> {
        let EditorState::Editing {
            mode,
            draft,
            errors,
        } = &mut self.state
        else {
            return Err(Error::InvalidEditorState);
        };

        let Some(session) = session else {
            return Err(Error::NotAuthenticated);
        };

        let fields = match validate(draft, today) {
            Ok(fields) => fields,
            Err(field_errors) => {
                *errors = field_errors.clone();
                return Err(Error::InvalidForm(field_errors));
            }
        };

        let mode = *mode;
        let draft = draft.clone();
        self.state = EditorState::Submitting {
            mode,
            draft: draft.clone(),
        };

        let user_id = session.user_id;
        let store = store.clone();
        let result = run_store_call(timeout, move || match mode {
            EditorMode::Create => store.create(user_id, fields, OffsetDateTime::now_utc()),
            EditorMode::Edit(id) => store.update(user_id, id, fields),
        })
        .await;

        match result {
            Ok(transaction) => {
                tracing::debug!("saved transaction {}", transaction.id);
                self.state = EditorState::Succeeded(transaction.clone());
                Ok(transaction)
            }
            Err(error) => {
                tracing::warn!("could not save transaction: {error}");
                self.state = EditorState::Failed {
                    mode,
                    draft,
                    message: error.to_string(),
                };
                Err(error)
            }
        }
    }

    /// Return to the form after a failed write, keeping what the user entered.
    pub fn resume_editing(&mut self) -> Result<(), Error> {
        match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Failed { mode, draft, .. } => {
                self.state = EditorState::Editing {
                    mode,
                    draft,
                    errors: FieldErrors::default(),
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(Error::InvalidEditorState)
            }
        }
    }

    /// Close the form and discard the draft.
    pub fn dismiss(&mut self) -> Result<(), Error> {
        match self.state {
            EditorState::Succeeded(_) | EditorState::Editing { .. } => {
                self.state = EditorState::Idle;
                Ok(())
            }
            _ => Err(Error::InvalidEditorState),
        }
    }
}

/// A delete the user has asked for but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeletion {
    id: TransactionId,
}

impl PendingDeletion {
    pub fn new(id: TransactionId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Record that the user confirmed the delete.
    pub fn confirm(self) -> ConfirmedDeletion {
        ConfirmedDeletion { id: self.id }
    }
}

/// A delete the user has confirmed. Only obtainable from [PendingDeletion::confirm].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedDeletion {
    id: TransactionId,
}

impl ConfirmedDeletion {
    pub fn id(&self) -> TransactionId {
        self.id
    }
}

/// Remove a transaction from `store` after the user has confirmed it.
///
/// On failure the stored transaction is left as it was.
pub async fn delete_transaction<S: TransactionStore>(
    session: Option<&Session>,
    store: &S,
    deletion: ConfirmedDeletion,
    timeout: Duration,
) -> Result<(), Error> {
    let Some(session) = session else {
        return Err(Error::NotAuthenticated);
    };

    let user_id = session.user_id;
    let store = store.clone();
    run_store_call(timeout, move || store.delete(user_id, deletion.id))
        .await
        .inspect_err(|error| tracing::warn!("could not delete transaction {}: {error}", deletion.id))
}

async fn run_store_call<T, F>(timeout: Duration, call: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Error> + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(call)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(Error::StoreTaskFailed(join_error.to_string())),
        Err(_) => Err(Error::StoreTimeout(timeout)),
    }
}
