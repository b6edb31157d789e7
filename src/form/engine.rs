//! The navigation state machine behind [`Form::start`] and [`Form::step`].
//!
//! Each turn takes the state by value, applies one input, and collects every
//! line of output produced on the way (feedback, notices, the next prompt).

use tracing::{debug, info, warn};

use super::clarify::{ClarificationContext, Contested, Resolution};
use super::prompt;
use super::{Form, FormState, FormValues, Position, Step, StepOutcome, Value};
use crate::context::ServiceContext;
use crate::error::FormError;
use crate::language::{apply_case, build_list};
use crate::recognize::primitive::{
    parse_bool, parse_datetime, parse_float, parse_integer, parse_text,
};
use crate::recognize::{
    is_keep_current, parse_command, position_number, recognize, Choice, Classification, Command,
};
use crate::schema::{FieldKind, FieldSpec, Schema, ValueSpec};
use crate::template::{FeedbackPolicy, Renderer, Scope, TemplateUsage};

pub(super) fn start(
    form: &Form,
    ctx: &ServiceContext,
    initial: FormValues,
) -> Result<StepOutcome, FormError> {
    info!(form = form.schema.name(), "conversation started");
    let mut turn = Turn {
        form,
        ctx,
        state: FormState::new(initial),
        output: Vec::new(),
    };
    turn.advance()?;
    Ok(turn.finish())
}

pub(super) fn step(
    form: &Form,
    ctx: &ServiceContext,
    state: FormState,
    input: &str,
) -> Result<StepOutcome, FormError> {
    if state.is_finished() {
        return Err(FormError::Finished);
    }
    if let Some(index) = state.step.field() {
        if index >= form.schema.fields().len() {
            return Err(FormError::UnknownField(index));
        }
    }
    let mut turn = Turn {
        form,
        ctx,
        state,
        output: Vec::new(),
    };
    turn.handle(input)?;
    Ok(turn.finish())
}

/// What the recognizer reported beyond the value itself.
#[derive(Debug, Default)]
struct Heard {
    approximate: bool,
    unmatched: Vec<String>,
}

impl Heard {
    fn unmatched(unmatched: Vec<String>) -> Self {
        Self {
            approximate: false,
            unmatched,
        }
    }
}

struct Turn<'f> {
    form: &'f Form,
    ctx: &'f ServiceContext,
    state: FormState,
    output: Vec<String>,
}

impl<'f> Turn<'f> {
    fn schema(&self) -> &'f Schema {
        &self.form.schema
    }

    fn field(&self, index: usize) -> Result<&'f FieldSpec, FormError> {
        self.form
            .schema
            .fields()
            .get(index)
            .ok_or(FormError::UnknownField(index))
    }

    fn effective(&self) -> FormValues {
        self.form.effective_values(&self.state.values)
    }

    fn active_fields(&self, values: &FormValues) -> Vec<usize> {
        let fields = self.schema().fields();
        (0..fields.len())
            .filter(|&i| fields[i].is_active(values))
            .collect()
    }

    fn finish(self) -> StepOutcome {
        let done = self.state.is_finished();
        let result = matches!(self.state.step, Step::Completed)
            .then(|| self.form.effective_values(&self.state.values));
        StepOutcome {
            output: self.output.join("\n"),
            done,
            result,
            state: self.state,
        }
    }

    fn say(&mut self, text: String) {
        if !text.trim().is_empty() {
            self.output.push(text);
        }
    }

    fn render(&self, usage: TemplateUsage, scope: &Scope<'_>) -> Result<String, FormError> {
        let values = self.effective();
        let renderer = Renderer::new(self.schema(), &values, self.ctx.random.as_ref());
        Ok(renderer.render_usage(usage, scope)?)
    }

    fn emit(&mut self, usage: TemplateUsage, scope: &Scope<'_>) -> Result<(), FormError> {
        let text = self.render(usage, scope)?;
        self.say(text);
        Ok(())
    }

    fn enter(&mut self, step: Step) -> Result<(), FormError> {
        debug!(form = self.schema().name(), ?step, "entering step");
        self.state.step = step;
        self.show_step()
    }

    /// Emits the output that belongs to the current step.
    fn show_step(&mut self) -> Result<(), FormError> {
        match self.state.step.clone() {
            Step::AskingField(index) => self.prompt(index),
            Step::Clarifying { field, context } => self.ask_clarification(field, &context),
            Step::Confirming => self.emit(TemplateUsage::Confirmation, &Scope::form()),
            Step::ChangingSelection => self.show_navigation(),
            Step::Completed => self.emit(TemplateUsage::Completed, &Scope::form()),
            Step::Cancelled => self.emit(TemplateUsage::Cancelled, &Scope::form()),
        }
    }

    fn prompt(&mut self, index: usize) -> Result<(), FormError> {
        let field = self.field(index)?;
        let text = {
            let values = self.effective();
            let renderer = Renderer::new(self.schema(), &values, self.ctx.random.as_ref());
            let scope = Scope::field(field).with_args(prompt::prompt_args(field));
            if field.prompt().is_empty() {
                renderer.render_usage(prompt::prompt_usage(field.kind()), &scope)?
            } else {
                renderer.render_one_of(field.prompt(), &scope)?
            }
        };
        self.say(text);
        Ok(())
    }

    fn ask_clarification(
        &mut self,
        index: usize,
        context: &ClarificationContext,
    ) -> Result<(), FormError> {
        let field = self.field(index)?;
        let labels = self.value_labels(field, &context.current().candidates);
        let scope = Scope::field(field)
            .with_args([context.current().text.clone()])
            .with_choices(labels);
        self.emit(TemplateUsage::Clarify, &scope)
    }

    fn value_labels(&self, field: &FieldSpec, names: &[String]) -> Vec<String> {
        let casing = self.schema().options_for(Some(field)).value_case;
        names
            .iter()
            .map(|name| {
                let description = field
                    .value(name)
                    .map_or(name.as_str(), ValueSpec::description);
                apply_case(description, casing)
            })
            .collect()
    }

    fn show_navigation(&mut self) -> Result<(), FormError> {
        let text = {
            let values = self.effective();
            let renderer = Renderer::new(self.schema(), &values, self.ctx.random.as_ref());
            let mut entries = Vec::new();
            for index in self.active_fields(&values) {
                let field = self.field(index)?;
                let entry =
                    renderer.render_usage(TemplateUsage::NavigationFormat, &Scope::field(field))?;
                entries.push(entry);
            }
            let scope = Scope::form().with_choices(entries);
            renderer.render_usage(TemplateUsage::Navigation, &scope)?
        };
        self.say(text);
        Ok(())
    }

    /// Moves to the first active field without an answer, or to confirmation.
    fn advance(&mut self) -> Result<(), FormError> {
        let values = self.effective();
        let next = self
            .schema()
            .fields()
            .iter()
            .position(|f| f.is_active(&values) && !values.contains(f.name()));
        match next {
            Some(index) => self.enter(Step::AskingField(index)),
            None => self.enter(Step::Confirming),
        }
    }

    fn handle(&mut self, input: &str) -> Result<(), FormError> {
        if let Some(command) = parse_command(input) {
            debug!(form = self.schema().name(), %command, "command");
            return self.command(command);
        }
        match self.state.step.clone() {
            Step::AskingField(index) => self.answer(index, input),
            Step::Clarifying { field, context } => self.clarify(field, context, input),
            Step::Confirming => self.confirm(input),
            Step::ChangingSelection => self.choose_field(input),
            Step::Completed | Step::Cancelled => Err(FormError::Finished),
        }
    }

    fn command(&mut self, command: Command) -> Result<(), FormError> {
        if command == Command::Help {
            return self.help();
        }
        if let Step::Clarifying { field, .. } = self.state.step {
            debug!(form = self.schema().name(), "clarification abandoned");
            self.state.step = Step::AskingField(field);
        }
        match command {
            Command::Quit => {
                info!(form = self.schema().name(), "conversation cancelled");
                self.enter(Step::Cancelled)
            }
            Command::Reset => {
                self.state.values = self.state.baseline.clone();
                self.state.history.clear();
                let values = self.effective();
                match self.active_fields(&values).first() {
                    Some(&first) => self.enter(Step::AskingField(first)),
                    None => self.enter(Step::Confirming),
                }
            }
            Command::Back => self.back(),
            Command::Status => {
                self.emit(TemplateUsage::Status, &Scope::form())?;
                self.show_step()
            }
            Command::Help => self.help(),
        }
    }

    fn back(&mut self) -> Result<(), FormError> {
        if self.state.step == Step::ChangingSelection {
            return self.enter(Step::Confirming);
        }
        let values = self.effective();
        while let Some(position) = self.state.history.pop() {
            match position {
                Position::Field(index) => match self.schema().fields().get(index) {
                    Some(field) if field.is_active(&values) => {
                        return self.enter(Step::AskingField(index));
                    }
                    _ => warn!(
                        form = self.schema().name(),
                        index, "skipping history entry for an inactive field"
                    ),
                },
                Position::Confirm => return self.enter(Step::Confirming),
            }
        }
        self.emit(TemplateUsage::NoPrevious, &Scope::form())?;
        self.show_step()
    }

    fn help(&mut self) -> Result<(), FormError> {
        let commands = self.command_help()?;
        match self.state.step.clone() {
            Step::AskingField(index) => {
                let field = self.field(index)?;
                let kind_help = self.kind_help(field)?;
                let navigation = self.navigation_command_help(index)?;
                let scope = Scope::field(field).with_args([kind_help, commands, navigation]);
                self.emit(TemplateUsage::Help, &scope)?;
            }
            Step::Clarifying { field, context } => {
                let spec = self.field(field)?;
                let labels = self.value_labels(spec, &context.current().candidates);
                let options = self.schema().options_for(Some(spec));
                let list = build_list(
                    &labels,
                    &options.choice_separator,
                    &options.choice_last_separator,
                );
                let (usage, args) = if options.allow_numbers {
                    let last = labels.len().to_string();
                    (TemplateUsage::EnumOneNumberHelp, vec!["1".to_string(), last, list])
                } else {
                    (TemplateUsage::EnumOneWordHelp, vec![String::new(), String::new(), list])
                };
                let choice_help = self.render(usage, &Scope::field(spec).with_args(args))?;
                let scope = Scope::field(spec).with_args([choice_help, commands]);
                self.emit(TemplateUsage::HelpClarify, &scope)?;
            }
            Step::Confirming => {
                let answer = self.render(TemplateUsage::BoolHelp, &Scope::form())?;
                let scope = Scope::form().with_args([answer, commands]);
                self.emit(TemplateUsage::HelpConfirm, &scope)?;
            }
            Step::ChangingSelection => {
                let values = self.effective();
                let count = self.active_fields(&values).len();
                let args = if self.schema().options().allow_numbers {
                    vec![format!("1-{count}")]
                } else {
                    Vec::new()
                };
                let scope = Scope::form().with_args(args);
                let pick = self.render(TemplateUsage::NavigationHelp, &scope)?;
                let scope = Scope::form().with_args([pick, commands]);
                self.emit(TemplateUsage::HelpNavigation, &scope)?;
            }
            Step::Completed | Step::Cancelled => return Err(FormError::Finished),
        }
        self.show_step()
    }

    fn command_help(&self) -> Result<String, FormError> {
        let keywords: Vec<&str> = Command::ALL.iter().map(|c| c.keyword()).collect();
        let scope = Scope::form().with_args([build_list(&keywords, ", ", ", or ")]);
        self.render(TemplateUsage::CommandHelp, &scope)
    }

    fn kind_help(&self, field: &'f FieldSpec) -> Result<String, FormError> {
        let values = self.effective();
        let renderer = Renderer::new(self.schema(), &values, self.ctx.random.as_ref());
        let options = self.schema().options_for(Some(field));
        let labels = renderer.field_choices(field)?;
        let list = build_list(
            &labels,
            &options.choice_separator,
            &options.choice_last_separator,
        );
        let (usage, args) = prompt::help_usage(field, options, &list);
        Ok(renderer.render_usage(usage, &Scope::field(field).with_args(args))?)
    }

    fn navigation_command_help(&self, current: usize) -> Result<String, FormError> {
        let values = self.effective();
        let names: Vec<String> = self
            .active_fields(&values)
            .into_iter()
            .filter(|&i| i != current)
            .map(|i| self.schema().fields()[i].description().to_string())
            .collect();
        if names.is_empty() {
            return Ok(String::new());
        }
        let scope = Scope::form().with_args([build_list(&names, ", ", ", or ")]);
        self.render(TemplateUsage::NavigationCommandHelp, &scope)
    }

    /// An active field named by the whole input.
    fn field_named(&self, input: &str, values: &FormValues) -> Option<usize> {
        self.schema()
            .fields()
            .iter()
            .position(|f| f.is_active(values) && f.terms().matches_text(input))
    }

    /// Whether a bare number answers `field` itself. Such input never names
    /// another field, even one with a digit in its name.
    fn is_numeric_entry(&self, field: &FieldSpec, input: &str) -> bool {
        match field.kind() {
            FieldKind::Integer | FieldKind::Float => input.trim().parse::<f64>().is_ok(),
            kind if kind.has_choices() => {
                if !self.schema().options_for(Some(field)).allow_numbers {
                    return false;
                }
                let listed = if kind == FieldKind::Bool {
                    2
                } else {
                    field.values().len()
                };
                let count = listed + usize::from(field.is_optional());
                position_number(input)
                    .is_some_and(|n| (1..=count).contains(&n))
            }
            _ => false,
        }
    }

    fn answer(&mut self, index: usize, input: &str) -> Result<(), FormError> {
        let field = self.field(index)?;
        if input.trim().is_empty() {
            return self.show_step();
        }
        let values = self.effective();
        let options = self.schema().options_for(Some(field));

        if options.allow_default && is_keep_current(input) {
            if let Some(current) = values.get(field.name()).cloned() {
                return self.commit(index, current, Heard::default());
            }
        }

        let names_value = field.values().iter().any(|v| v.terms().matches_text(input));
        if !names_value && !self.is_numeric_entry(field, input) {
            if let Some(target) = self.field_named(input, &values) {
                if target == index {
                    return self.show_step();
                }
                debug!(
                    form = self.schema().name(),
                    from = field.name(),
                    to = self.field(target)?.name(),
                    "jumping to field"
                );
                self.state.history.push(Position::Field(index));
                return self.enter(Step::AskingField(target));
            }
        }

        if field.is_optional() && self.form.is_no_preference(input) {
            return self.commit(index, Value::NoPreference, Heard::default());
        }

        match field.kind() {
            FieldKind::Enum | FieldKind::EnumList => self.answer_choice(index, field, input),
            FieldKind::Bool => {
                let numbered = options
                    .allow_numbers
                    .then(|| input.trim().parse::<usize>().ok())
                    .flatten();
                let answer = match numbered {
                    Some(1) => Some(Value::Bool(true)),
                    Some(2) => Some(Value::Bool(false)),
                    Some(3) if field.is_optional() => Some(Value::NoPreference),
                    _ => parse_bool(input).map(Value::Bool),
                };
                match answer {
                    Some(value) => self.commit(index, value, Heard::default()),
                    None => self.not_understood(field, input),
                }
            }
            FieldKind::Integer => match parse_integer(input) {
                #[allow(clippy::cast_precision_loss)]
                Some(parsed) if !field.limits().contains(parsed.value as f64) => {
                    self.out_of_range(field, parsed.value.to_string())
                }
                Some(parsed) => {
                    let heard = Heard::unmatched(parsed.unmatched);
                    self.commit(index, Value::Integer(parsed.value), heard)
                }
                None => self.not_understood(field, input),
            },
            FieldKind::Float => match parse_float(input) {
                Some(parsed) if !field.limits().contains(parsed.value) => {
                    self.out_of_range(field, parsed.value.to_string())
                }
                Some(parsed) => {
                    let heard = Heard::unmatched(parsed.unmatched);
                    self.commit(index, Value::Float(parsed.value), heard)
                }
                None => self.not_understood(field, input),
            },
            FieldKind::Text => match parse_text(input) {
                #[allow(clippy::cast_precision_loss)]
                Some(text) if !field.limits().contains(text.chars().count() as f64) => {
                    self.out_of_range(field, text)
                }
                Some(text) => self.commit(index, Value::Text(text), Heard::default()),
                None => self.not_understood(field, input),
            },
            FieldKind::DateTime => match parse_datetime(input, self.ctx.clock.now()) {
                Some(at) => self.commit(index, Value::DateTime(at), Heard::default()),
                None => self.not_understood(field, input),
            },
        }
    }

    fn answer_choice(
        &mut self,
        index: usize,
        field: &'f FieldSpec,
        input: &str,
    ) -> Result<(), FormError> {
        let many = field.kind() == FieldKind::EnumList;
        let options = self.schema().options_for(Some(field));
        let count = field.values().len();
        let mut choices: Vec<Choice<'_>> = field
            .values()
            .iter()
            .enumerate()
            .map(|(i, v)| Choice {
                label: i,
                terms: v.terms(),
                position: options.allow_numbers.then_some(i + 1),
            })
            .collect();
        if field.is_optional() {
            choices.push(Choice {
                label: count,
                terms: &self.form.no_preference,
                position: options.allow_numbers.then_some(count + 1),
            });
        }

        let classification =
            recognize(input, &choices, self.schema().matching(), many).classify(many);
        debug!(
            form = self.schema().name(),
            field = field.name(),
            ?classification,
            "recognized answer"
        );

        let names = |labels: &[usize]| -> Vec<String> {
            labels
                .iter()
                .filter_map(|&l| field.values().get(l))
                .map(|v| v.name().to_string())
                .collect()
        };
        let no_preference = |labels: &[usize]| labels.contains(&count);

        match classification {
            Classification::NotUnderstood => self.not_understood(field, input),
            Classification::Match {
                labels,
                approximate,
            } => {
                let heard = Heard {
                    approximate,
                    unmatched: Vec::new(),
                };
                self.commit_names(index, names(&labels), no_preference(&labels), heard)
            }
            Classification::Partial { labels, unmatched } => {
                let heard = Heard::unmatched(unmatched);
                self.commit_names(index, names(&labels), no_preference(&labels), heard)
            }
            Classification::Ambiguous {
                resolved,
                ambiguities,
                unmatched,
            } => {
                let mut settled = names(&resolved);
                let mut contested = Vec::new();
                for ambiguity in ambiguities {
                    let mut candidates = names(&ambiguity.labels);
                    match candidates.len() {
                        0 => {}
                        1 => settled.append(&mut candidates),
                        _ => contested.push(Contested {
                            text: ambiguity.text,
                            candidates,
                        }),
                    }
                }
                match ClarificationContext::new(settled.clone(), contested, unmatched.clone()) {
                    Some(context) => self.enter(Step::Clarifying {
                        field: index,
                        context,
                    }),
                    None => self.commit_names(index, settled, false, Heard::unmatched(unmatched)),
                }
            }
        }
    }

    fn clarify(
        &mut self,
        index: usize,
        context: ClarificationContext,
        input: &str,
    ) -> Result<(), FormError> {
        let field = self.field(index)?;
        let options = self.schema().options_for(Some(field));
        let candidates: Vec<&ValueSpec> = context
            .current()
            .candidates
            .iter()
            .filter_map(|n| field.value(n))
            .collect();
        let choices: Vec<Choice<'_>> = candidates
            .iter()
            .enumerate()
            .map(|(i, v)| Choice {
                label: i,
                terms: v.terms(),
                position: options.allow_numbers.then_some(i + 1),
            })
            .collect();

        let classification =
            recognize(input, &choices, self.schema().matching(), false).classify(false);
        debug!(
            form = self.schema().name(),
            field = field.name(),
            ?classification,
            "clarification answer"
        );
        let picked = match classification {
            Classification::Match { labels, .. } | Classification::Partial { labels, .. }
                if labels.len() == 1 =>
            {
                candidates.get(labels[0]).map(|v| v.name().to_string())
            }
            _ => None,
        };

        let Some(name) = picked else {
            return self.not_understood(field, input);
        };
        match context.resolve(name) {
            Resolution::More(next) => self.enter(Step::Clarifying {
                field: index,
                context: next,
            }),
            Resolution::Done {
                resolved,
                unmatched,
            } => self.commit_names(index, resolved, false, Heard::unmatched(unmatched)),
        }
    }

    /// Commits chosen value names for an enumerated field.
    fn commit_names(
        &mut self,
        index: usize,
        names: Vec<String>,
        no_preference: bool,
        heard: Heard,
    ) -> Result<(), FormError> {
        let field = self.field(index)?;
        if names.is_empty() {
            return if no_preference {
                self.commit(index, Value::NoPreference, heard)
            } else {
                self.show_step()
            };
        }
        if field.kind() == FieldKind::EnumList {
            let ordered: Vec<String> = field
                .values()
                .iter()
                .filter(|v| names.iter().any(|n| n == v.name()))
                .map(|v| v.name().to_string())
                .collect();
            #[allow(clippy::cast_precision_loss)]
            let within = field.limits().contains(ordered.len() as f64);
            if !within {
                let shown = self.value_labels(field, &ordered);
                let options = self.schema().options_for(Some(field));
                let shown = build_list(&shown, &options.separator, &options.last_separator);
                return self.out_of_range(field, shown);
            }
            self.commit(index, Value::Choices(ordered), heard)
        } else {
            self.commit(index, Value::Choice(names[0].clone()), heard)
        }
    }

    /// Stores an answer. A complete answer moves on; one with words left
    /// over stays on the field so the user can add to it.
    fn commit(&mut self, index: usize, value: Value, heard: Heard) -> Result<(), FormError> {
        let field = self.field(index)?;
        debug!(form = self.schema().name(), field = field.name(), ?value, "answer committed");
        let stay = field.kind().is_enumerated() && !heard.unmatched.is_empty();
        self.state.values.set(field.name(), value);
        self.feedback(field, &heard)?;
        if stay {
            self.enter(Step::AskingField(index))
        } else {
            self.state.history.push(Position::Field(index));
            self.advance()
        }
    }

    fn feedback(&mut self, field: &'f FieldSpec, heard: &Heard) -> Result<(), FormError> {
        let wanted = match self.schema().options_for(Some(field)).feedback {
            FeedbackPolicy::Always => true,
            FeedbackPolicy::Auto => heard.approximate || !heard.unmatched.is_empty(),
            FeedbackPolicy::Never => !heard.unmatched.is_empty(),
        };
        if !wanted {
            return Ok(());
        }
        let args: Vec<String> = if heard.unmatched.is_empty() {
            Vec::new()
        } else {
            vec![heard.unmatched.join(", ")]
        };
        self.emit(TemplateUsage::Feedback, &Scope::field(field).with_args(args))
    }

    fn not_understood(&mut self, field: &'f FieldSpec, input: &str) -> Result<(), FormError> {
        let scope = Scope::field(field).with_args([input.trim()]);
        self.emit(TemplateUsage::NotUnderstood, &scope)?;
        self.show_step()
    }

    fn out_of_range(&mut self, field: &'f FieldSpec, shown: String) -> Result<(), FormError> {
        let [min, max] = prompt::limit_args(field.limits());
        let scope = Scope::field(field).with_args([shown, min, max]);
        self.emit(TemplateUsage::OutOfRange, &scope)?;
        self.show_step()
    }

    fn confirm(&mut self, input: &str) -> Result<(), FormError> {
        match parse_bool(input) {
            Some(true) => {
                info!(form = self.schema().name(), "conversation completed");
                self.enter(Step::Completed)
            }
            Some(false) => self.enter(Step::ChangingSelection),
            None => {
                let values = self.effective();
                if let Some(target) = self.field_named(input, &values) {
                    self.state.history.push(Position::Confirm);
                    return self.enter(Step::AskingField(target));
                }
                let scope = Scope::form().with_args([input.trim()]);
                self.emit(TemplateUsage::NotUnderstood, &scope)?;
                self.show_step()
            }
        }
    }

    fn choose_field(&mut self, input: &str) -> Result<(), FormError> {
        let values = self.effective();
        let fields = self.schema().fields();
        let numbered = self.schema().options().allow_numbers;
        let choices: Vec<Choice<'_>> = self
            .active_fields(&values)
            .into_iter()
            .enumerate()
            .map(|(n, i)| Choice {
                label: i,
                terms: fields[i].terms(),
                position: numbered.then_some(n + 1),
            })
            .collect();

        match recognize(input, &choices, self.schema().matching(), false).classify(false) {
            Classification::Match { labels, .. } if labels.len() == 1 => {
                self.state.history.push(Position::Confirm);
                self.enter(Step::AskingField(labels[0]))
            }
            _ => {
                let scope = Scope::form().with_args([input.trim()]);
                self.emit(TemplateUsage::NotUnderstood, &scope)?;
                self.show_step()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldBuilder, FormBuilder};
    use crate::template::TemplateOptions;
    use chrono::NaiveDate;

    fn ctx() -> ServiceContext {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ServiceContext::deterministic(7, now)
    }

    fn pizza() -> Form {
        FormBuilder::new("Pizza")
            .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
            .field(FieldBuilder::list(
                "Topping",
                ["Cheese", "Pepperoni", "ExtraCheese"],
            ))
            .build()
            .unwrap()
    }

    fn run(form: &Form, ctx: &ServiceContext, inputs: &[&str]) -> StepOutcome {
        let mut outcome = form.start(ctx, FormValues::new()).unwrap();
        for input in inputs {
            outcome = form.step(ctx, outcome.state, input).unwrap();
        }
        outcome
    }

    fn choice(name: &str) -> Value {
        Value::Choice(name.into())
    }

    #[test]
    fn first_prompt_asks_for_the_first_field() {
        let ctx = ctx();
        let outcome = pizza().start(&ctx, FormValues::new()).unwrap();
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
        assert_eq!(
            outcome.output,
            "Please select a Size (1. Small or 2. Large)"
        );
        assert!(!outcome.done);
    }

    #[test]
    fn answers_advance_and_confirm() {
        let ctx = ctx();
        let form = pizza();
        let outcome = run(&form, &ctx, &["2", "cheese and pepperoni"]);
        assert_eq!(outcome.state.step(), &Step::Confirming);
        assert!(outcome.output.starts_with("Is this your selection?"));
        assert!(outcome.output.contains("Topping: Cheese and Pepperoni"));

        let done = form.step(&ctx, outcome.state, "y").unwrap();
        assert!(done.done);
        let result = done.result.unwrap();
        assert_eq!(result.get("Size"), Some(&choice("Large")));
        assert_eq!(
            result.get("Topping"),
            Some(&Value::Choices(vec!["Cheese".into(), "Pepperoni".into()]))
        );
    }

    #[test]
    fn back_with_empty_history_is_a_notice() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["back"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
        assert!(outcome.output.starts_with("There is no previous question"));
    }

    #[test]
    fn back_shows_the_previous_answer() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["small", "back"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
        assert!(
            outcome.output.contains("(current choice: Small)"),
            "{}",
            outcome.output
        );
    }

    #[test]
    fn keep_current_advances() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["small", "back", "c"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(1));
        assert_eq!(outcome.state.values().get("Size"), Some(&choice("Small")));
    }

    #[test]
    fn quit_cancels_without_result() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["quit"]);
        assert!(outcome.done);
        assert!(outcome.result.is_none());
        assert_eq!(outcome.output, "Form cancelled.");
        assert!(matches!(
            pizza().step(&ctx, outcome.state, "hi"),
            Err(FormError::Finished)
        ));
    }

    fn crusts() -> Form {
        FormBuilder::new("Pizza")
            .field(FieldBuilder::enumeration("Crust", ["ThinCrust", "ThickCrust"]))
            .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
            .build()
            .unwrap()
    }

    #[test]
    fn ambiguous_answer_asks_for_clarification() {
        let ctx = ctx();
        let form = crusts();
        let outcome = run(&form, &ctx, &["crust"]);
        let Step::Clarifying { field, context } = outcome.state.step() else {
            panic!("expected clarification, got {:?}", outcome.state.step());
        };
        assert_eq!(*field, 0);
        assert_eq!(context.current().candidates, vec!["ThinCrust", "ThickCrust"]);
        assert_eq!(
            outcome.output,
            "By \"crust\" Crust did you mean (1. Thin Crust or 2. Thick Crust)"
        );

        let resolved = form.step(&ctx, outcome.state, "2").unwrap();
        assert_eq!(
            resolved.state.values().get("Crust"),
            Some(&choice("ThickCrust"))
        );
        assert_eq!(resolved.state.step(), &Step::AskingField(1));
    }

    #[test]
    fn single_choice_clarifies_among_every_value_the_answer_named() {
        let ctx = ctx();
        let form = FormBuilder::new("Pizza")
            .field(FieldBuilder::enumeration(
                "Crust",
                ["Stuffed", "ThinCrust", "ThickCrust"],
            ))
            .build()
            .unwrap();
        let outcome = run(&form, &ctx, &["stuffed crust"]);
        let Step::Clarifying { context, .. } = outcome.state.step() else {
            panic!("expected clarification, got {:?}", outcome.state.step());
        };
        assert!(context.resolved().is_empty());
        assert_eq!(
            context.current().candidates,
            vec!["Stuffed", "ThinCrust", "ThickCrust"]
        );

        let picked = form.step(&ctx, outcome.state, "thick").unwrap();
        assert_eq!(
            picked.state.values().get("Crust"),
            Some(&choice("ThickCrust"))
        );
        assert_eq!(picked.state.step(), &Step::Confirming);
    }

    #[test]
    fn unclear_clarification_answer_asks_again() {
        let ctx = ctx();
        let outcome = run(&crusts(), &ctx, &["crust", "crust"]);
        assert!(matches!(outcome.state.step(), Step::Clarifying { .. }));
        assert!(outcome
            .output
            .ends_with("(1. Thin Crust or 2. Thick Crust)"));
    }

    #[test]
    fn canonical_name_beats_sub_phrase() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["large", "cheese"]);
        assert_eq!(
            outcome.state.values().get("Topping"),
            Some(&Value::Choices(vec!["Cheese".into()]))
        );
        assert_eq!(outcome.state.step(), &Step::Confirming);
    }

    #[test]
    fn command_abandons_clarification() {
        let ctx = ctx();
        let outcome = run(&crusts(), &ctx, &["crust", "status"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
        assert!(
            outcome
                .output
                .starts_with("Crust: Unspecified\nSize: Unspecified"),
            "{}",
            outcome.output
        );
    }

    #[test]
    fn partial_answer_commits_and_stays() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["large", "pepperoni anchovy"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(1));
        assert_eq!(
            outcome.state.values().get("Topping"),
            Some(&Value::Choices(vec!["Pepperoni".into()]))
        );
        assert!(
            outcome.output.contains("\"anchovy\" is not an option."),
            "{}",
            outcome.output
        );
    }

    #[test]
    fn not_understood_reprompts() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["xyzzy"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
        assert!(outcome.output.contains("xyzzy"));
        assert!(outcome
            .output
            .ends_with("Please select a Size (1. Small or 2. Large)"));
    }

    #[test]
    fn field_name_jumps_and_back_returns() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["topping"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(1));
        assert_eq!(outcome.state.history(), &[Position::Field(0)]);
        let outcome = run(&pizza(), &ctx, &["topping", "back"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
    }

    #[test]
    fn number_picks_a_choice_even_when_a_field_name_holds_it() {
        let ctx = ctx();
        let form = FormBuilder::new("Order")
            .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
            .field(FieldBuilder::text("Address2"))
            .build()
            .unwrap();

        let outcome = run(&form, &ctx, &["2"]);
        assert_eq!(outcome.state.values().get("Size"), Some(&choice("Large")));
        assert_eq!(outcome.state.history(), &[Position::Field(0)]);

        let jumped = run(&form, &ctx, &["address 2"]);
        assert_eq!(jumped.state.step(), &Step::AskingField(1));
        assert!(jumped.state.values().is_empty());
    }

    #[test]
    fn number_outside_the_choices_can_still_name_a_field() {
        let ctx = ctx();
        let form = FormBuilder::new("Order")
            .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
            .field(FieldBuilder::text("Line3"))
            .build()
            .unwrap();
        let outcome = run(&form, &ctx, &["3"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(1));
        assert!(outcome.state.values().is_empty());
    }

    #[test]
    fn reset_restores_baseline() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["small", "reset"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
        assert!(outcome.state.values().is_empty());
        assert!(outcome.state.history().is_empty());
    }

    #[test]
    fn declining_confirmation_lists_fields_to_change() {
        let ctx = ctx();
        let form = pizza();
        let outcome = run(&form, &ctx, &["small", "cheese and pepperoni", "no"]);
        assert_eq!(outcome.state.step(), &Step::ChangingSelection);
        assert!(
            outcome.output.contains("1. Size (Small)"),
            "{}",
            outcome.output
        );

        let outcome = form.step(&ctx, outcome.state, "1").unwrap();
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
        let outcome = form.step(&ctx, outcome.state, "large").unwrap();
        assert_eq!(outcome.state.step(), &Step::Confirming);
        assert!(outcome.output.contains("Size: Large"));
    }

    #[test]
    fn numeric_limits_are_enforced() {
        let ctx = ctx();
        let form = FormBuilder::new("Order")
            .field(FieldBuilder::integer("Quantity").min(1.0).max(10.0))
            .build()
            .unwrap();
        let outcome = run(&form, &ctx, &["12"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(0));
        assert!(outcome
            .output
            .starts_with("\"12\" is not allowed for Quantity; enter a value between 1 and 10."));
        let outcome = form.step(&ctx, outcome.state, "3 please").unwrap();
        assert_eq!(
            outcome.state.values().get("Quantity"),
            Some(&Value::Integer(3))
        );
    }

    #[test]
    fn optional_field_accepts_no_preference() {
        let ctx = ctx();
        let form = FormBuilder::new("Order")
            .field(FieldBuilder::float("Tip").optional())
            .build()
            .unwrap();
        let outcome = run(&form, &ctx, &["no preference"]);
        assert_eq!(outcome.state.values().get("Tip"), Some(&Value::NoPreference));
        assert_eq!(outcome.state.step(), &Step::Confirming);
    }

    #[test]
    fn datetime_uses_the_injected_clock() {
        let ctx = ctx();
        let form = FormBuilder::new("Booking")
            .field(FieldBuilder::datetime("When"))
            .build()
            .unwrap();
        let outcome = run(&form, &ctx, &["tomorrow at 6:30 pm"]);
        let expected = NaiveDate::from_ymd_opt(2024, 6, 16)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(
            outcome.state.values().get("When"),
            Some(&Value::DateTime(expected))
        );
    }

    #[test]
    fn conditional_field_is_skipped_and_suppressed() {
        let ctx = ctx();
        let form = FormBuilder::new("Order")
            .field(FieldBuilder::boolean("Delivery"))
            .field(
                FieldBuilder::text("Address")
                    .active_when(|v| v.get("Delivery") == Some(&Value::Bool(true))),
            )
            .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
            .build()
            .unwrap();
        let outcome = run(&form, &ctx, &["yes", "1 Main St"]);
        assert_eq!(outcome.state.step(), &Step::AskingField(2));

        let outcome = run(
            &form,
            &ctx,
            &["yes", "1 Main St", "delivery", "no", "small", "y"],
        );
        let result = outcome.result.unwrap();
        assert_eq!(result.get("Address"), None);
        assert_eq!(result.get("Delivery"), Some(&Value::Bool(false)));
    }

    #[test]
    fn help_lists_responses_and_reprompts() {
        let ctx = ctx();
        let outcome = run(&pizza(), &ctx, &["help"]);
        assert!(
            outcome
                .output
                .starts_with("* You are filling in the Size field."),
            "{}",
            outcome.output
        );
        assert!(outcome.output.contains("You can enter a number 1-2"));
        assert!(outcome
            .output
            .contains("Commands: back, help, quit, reset, or status."));
        assert!(outcome.output.contains("(Topping)"));
        assert!(outcome
            .output
            .ends_with("Please select a Size (1. Small or 2. Large)"));
    }

    #[test]
    fn feedback_always_echoes() {
        let ctx = ctx();
        let form = FormBuilder::new("Pizza")
            .options(TemplateOptions {
                feedback: FeedbackPolicy::Always,
                ..TemplateOptions::default()
            })
            .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
            .build()
            .unwrap();
        let outcome = run(&form, &ctx, &["large"]);
        assert!(
            outcome.output.starts_with("For Size I understood Large."),
            "{}",
            outcome.output
        );
    }

    #[test]
    fn stale_state_is_rejected() {
        let ctx = ctx();
        let mut state = pizza().start(&ctx, FormValues::new()).unwrap().state;
        state.step = Step::AskingField(9);
        assert!(matches!(
            pizza().step(&ctx, state, "x"),
            Err(FormError::UnknownField(9))
        ));
    }
}
