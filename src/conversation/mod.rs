//! Host-side conversations: one [`FormState`] with an id, stepped one line
//! of input at a time.

mod driver;

use std::sync::Arc;

use tracing::debug;

pub use driver::{ConversationLoop, LoopOutcome};

use crate::context::ServiceContext;
use crate::error::FormError;
use crate::form::{Form, FormState, FormValues};

/// A single conversation over a shared form.
#[derive(Debug)]
pub struct Conversation {
    id: String,
    form: Arc<Form>,
    state: Option<FormState>,
    result: Option<FormValues>,
}

impl Conversation {
    /// Creates a conversation with a fresh id. Nothing is shown until
    /// [`Conversation::start`].
    #[must_use]
    pub fn new(ctx: &ServiceContext, form: Arc<Form>) -> Self {
        Self {
            id: ctx.id_gen.generate_id(),
            form,
            state: None,
            result: None,
        }
    }

    /// Conversation id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The form being filled in.
    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Current state, once started.
    #[must_use]
    pub fn state(&self) -> Option<&FormState> {
        self.state.as_ref()
    }

    /// Confirmed answers, once the user has confirmed.
    #[must_use]
    pub fn result(&self) -> Option<&FormValues> {
        self.result.as_ref()
    }

    /// Whether the conversation has ended, either confirmed or cancelled.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state.as_ref().is_some_and(FormState::is_finished)
    }

    /// Starts (or restarts) the conversation and returns the first prompt.
    ///
    /// # Errors
    ///
    /// Returns a [`FormError`] if the first prompt cannot be rendered.
    pub fn start(
        &mut self,
        ctx: &ServiceContext,
        initial: FormValues,
    ) -> Result<String, FormError> {
        debug!(id = %self.id, "starting conversation");
        let outcome = self.form.start(ctx, initial)?;
        self.state = Some(outcome.state);
        self.result = outcome.result;
        Ok(outcome.output)
    }

    /// Feeds one line of input and returns the reply.
    ///
    /// On error the previous state is kept.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotStarted`] before [`Conversation::start`],
    /// [`FormError::Finished`] after the conversation ended, or a render
    /// failure from the form.
    pub fn respond(&mut self, ctx: &ServiceContext, input: &str) -> Result<String, FormError> {
        let state = self.state.clone().ok_or(FormError::NotStarted)?;
        let outcome = self.form.step(ctx, state, input)?;
        self.state = Some(outcome.state);
        if outcome.result.is_some() {
            self.result = outcome.result;
        }
        Ok(outcome.output)
    }
}
