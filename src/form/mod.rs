//! The form: a validated schema plus the step function that drives one
//! conversation through it.
//!
//! ```
//! use formtalk::context::ServiceContext;
//! use formtalk::form::{FormValues, Value};
//! use formtalk::schema::{FieldBuilder, FormBuilder};
//!
//! let form = FormBuilder::new("Pizza")
//!     .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
//!     .build()
//!     .unwrap();
//! let ctx = ServiceContext::seeded(1);
//!
//! let turn = form.start(&ctx, FormValues::new()).unwrap();
//! assert!(turn.output.contains("Size"));
//! let turn = form.step(&ctx, turn.state, "large").unwrap();
//! let turn = form.step(&ctx, turn.state, "yes").unwrap();
//! assert!(turn.done);
//! assert_eq!(turn.result.unwrap().get("Size"), Some(&Value::Choice("Large".into())));
//! ```

pub mod clarify;
mod engine;
mod prompt;
pub mod state;
mod value;

use std::path::Path;

pub use clarify::{ClarificationContext, Contested, Resolution};
pub use state::{FormState, Position, Step};
pub use value::{FormValues, Value};

use crate::context::ServiceContext;
use crate::error::{FormError, SchemaError};
use crate::recognize::command::NO_PREFERENCE;
use crate::schema::{FormDefinition, Schema};
use crate::template::TemplateUsage;
use crate::terms::TermSet;

/// A built form, shared read-only by every conversation running it.
#[derive(Debug)]
pub struct Form {
    schema: Schema,
    no_preference: TermSet,
}

/// The result of one turn.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// State to pass to the next [`Form::step`].
    pub state: FormState,
    /// Text to show the user.
    pub output: String,
    /// Whether the conversation has ended.
    pub done: bool,
    /// The answers, once the user has confirmed them.
    pub result: Option<FormValues>,
}

impl Form {
    pub(crate) fn new(schema: Schema) -> Self {
        let mut phrases: Vec<String> = NO_PREFERENCE.iter().map(|p| (*p).to_string()).collect();
        if let Some(patterns) = schema.templates().get(TemplateUsage::NoPreference) {
            phrases.extend(patterns.iter().map(|p| p.source().to_string()));
        }
        for field in schema.fields() {
            if let Some(patterns) = field.templates().get(TemplateUsage::NoPreference) {
                phrases.extend(patterns.iter().map(|p| p.source().to_string()));
            }
        }
        let no_preference = TermSet::default().with_phrases(phrases);
        Self { schema, no_preference }
    }

    /// Parses and builds a form from YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the YAML is malformed or the form invalid.
    pub fn from_yaml(text: &str) -> Result<Self, SchemaError> {
        FormDefinition::from_yaml(text)?.build()
    }

    /// Reads, parses, and builds a form definition file.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the file cannot be read or the form is invalid.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        FormDefinition::load(path)?.build()
    }

    /// The validated declaration.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Starts a conversation. `initial` answers are kept and form the
    /// baseline that `reset` returns to.
    ///
    /// # Errors
    ///
    /// Returns a [`FormError`] if the first prompt cannot be rendered.
    pub fn start(
        &self,
        ctx: &ServiceContext,
        initial: FormValues,
    ) -> Result<StepOutcome, FormError> {
        engine::start(self, ctx, initial)
    }

    /// Consumes one line of user input.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Finished`] if the state is terminal,
    /// [`FormError::UnknownField`] if it does not belong to this form, or
    /// [`FormError::Render`] if a template fails at runtime.
    pub fn step(
        &self,
        ctx: &ServiceContext,
        state: FormState,
        input: &str,
    ) -> Result<StepOutcome, FormError> {
        engine::step(self, ctx, state, input)
    }

    /// Answers with every inactive field removed.
    ///
    /// Removal repeats until stable, since hiding one answer can deactivate
    /// fields whose conditions read it.
    #[must_use]
    pub fn effective_values(&self, values: &FormValues) -> FormValues {
        let mut effective = values.clone();
        loop {
            let inactive: Vec<&str> = self
                .schema
                .fields()
                .iter()
                .filter(|f| effective.contains(f.name()) && !f.is_active(&effective))
                .map(|f| f.name())
                .collect();
            if inactive.is_empty() {
                return effective;
            }
            for name in inactive {
                effective.remove(name);
            }
        }
    }

    fn is_no_preference(&self, input: &str) -> bool {
        self.no_preference.matches_text(input)
    }
}
