//! End-to-end conversations through the public API.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use formtalk::context::ServiceContext;
use formtalk::conversation::Conversation;
use formtalk::form::{Form, FormValues, Step, StepOutcome, Value};
use formtalk::schema::{FieldBuilder, FormBuilder, ValueBuilder};
use formtalk::template::{Pattern, Renderer, Scope};
use formtalk::terms::generate_terms;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn ctx() -> ServiceContext {
    ServiceContext::deterministic(7, now())
}

fn pizza() -> Form {
    FormBuilder::new("Pizza")
        .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
        .field(FieldBuilder::list("Topping", ["Cheese", "Pepperoni"]))
        .build()
        .unwrap()
}

fn drive(form: &Form, ctx: &ServiceContext, inputs: &[&str]) -> StepOutcome {
    let mut outcome = form.start(ctx, FormValues::new()).unwrap();
    for input in inputs {
        outcome = form.step(ctx, outcome.state, input).unwrap();
    }
    outcome
}

#[test]
fn pizza_order_completes_with_expected_answers() {
    let ctx = ctx();
    let outcome = drive(&pizza(), &ctx, &["2", "cheese and pepperoni", "y"]);

    assert!(outcome.done);
    assert_eq!(outcome.state.step(), &Step::Completed);
    let expected = FormValues::new()
        .with("Size", Value::Choice("Large".into()))
        .with(
            "Topping",
            Value::Choices(vec!["Cheese".into(), "Pepperoni".into()]),
        );
    assert_eq!(outcome.result, Some(expected));
}

#[test]
fn result_is_only_present_on_completion() {
    let ctx = ctx();
    let form = pizza();
    let mut outcome = form.start(&ctx, FormValues::new()).unwrap();
    for input in ["small", "cheese"] {
        outcome = form.step(&ctx, outcome.state, input).unwrap();
        assert!(!outcome.done);
        assert!(outcome.result.is_none());
    }
    let cancelled = form.step(&ctx, outcome.state, "quit").unwrap();
    assert!(cancelled.done);
    assert_eq!(cancelled.state.step(), &Step::Cancelled);
    assert!(cancelled.result.is_none());
}

#[test]
fn generated_terms_are_stable() {
    let first = generate_terms("ExtraLargeThinCrust", None);
    let second = generate_terms("ExtraLargeThinCrust", None);
    assert_eq!(first, second);
    assert!(first.contains(&"extra large".to_string()));
    assert!(first.contains(&"extra large thin crust".to_string()));
}

#[test]
fn each_value_is_recognized_by_its_own_description() {
    let ctx = ctx();
    let form = FormBuilder::new("Toppings")
        .field(FieldBuilder::enumeration(
            "Topping",
            [
                ValueBuilder::new("Cheese"),
                ValueBuilder::new("ExtraCheese"),
                ValueBuilder::new("GreenPeppers").describe("Green Peppers"),
                ValueBuilder::new("Pepperoni"),
            ],
        ))
        .build()
        .unwrap();

    for value in form.schema().fields()[0].values() {
        let outcome = drive(&form, &ctx, &[value.description()]);
        assert_eq!(
            outcome.state.values().get("Topping"),
            Some(&Value::Choice(value.name().into())),
            "description {:?}",
            value.description()
        );
        assert_eq!(outcome.state.step(), &Step::Confirming);
    }
}

#[test]
fn numbers_select_by_position_over_matching_text() {
    let ctx = ctx();
    let form = FormBuilder::new("Slices")
        .field(FieldBuilder::enumeration(
            "Portion",
            [
                ValueBuilder::new("Half").describe("2 slices"),
                ValueBuilder::new("Whole").describe("1 pie"),
            ],
        ))
        .field(FieldBuilder::text("Address2"))
        .field(FieldBuilder::text("Line1"))
        .build()
        .unwrap();

    let outcome = drive(&form, &ctx, &["1"]);
    assert_eq!(
        outcome.state.values().get("Portion"),
        Some(&Value::Choice("Half".into()))
    );
    assert_eq!(outcome.state.step(), &Step::AskingField(1));

    let outcome = drive(&form, &ctx, &["2"]);
    assert_eq!(
        outcome.state.values().get("Portion"),
        Some(&Value::Choice("Whole".into()))
    );
    assert_eq!(outcome.state.step(), &Step::AskingField(1));
}

#[test]
fn shared_term_asks_for_clarification() {
    let ctx = ctx();
    let form = FormBuilder::new("Crusts")
        .field(FieldBuilder::enumeration("Crust", ["ThinCrust", "ThickCrust"]))
        .build()
        .unwrap();

    let outcome = drive(&form, &ctx, &["crust"]);
    match outcome.state.step() {
        Step::Clarifying { field, context } => {
            assert_eq!(*field, 0);
            assert_eq!(
                context.current().candidates,
                vec!["ThinCrust".to_string(), "ThickCrust".to_string()]
            );
        }
        other => panic!("expected clarification, got {other:?}"),
    }

    let resolved = form.step(&ctx, outcome.state, "thick").unwrap();
    assert_eq!(
        resolved.state.values().get("Crust"),
        Some(&Value::Choice("ThickCrust".into()))
    );
}

#[test]
fn clarified_pick_joins_the_rest_of_a_list_answer() {
    let ctx = ctx();
    let form = FormBuilder::new("Pizza")
        .field(FieldBuilder::list(
            "Topping",
            ["ThinCrust", "ThickCrust", "Olive"],
        ))
        .build()
        .unwrap();

    let outcome = drive(&form, &ctx, &["olive and crust"]);
    match outcome.state.step() {
        Step::Clarifying { context, .. } => {
            assert_eq!(context.resolved(), ["Olive".to_string()]);
            assert_eq!(context.current().text, "crust");
        }
        other => panic!("expected clarification, got {other:?}"),
    }

    let resolved = form.step(&ctx, outcome.state, "thick").unwrap();
    assert_eq!(
        resolved.state.values().get("Topping"),
        Some(&Value::Choices(vec!["ThickCrust".into(), "Olive".into()]))
    );
    assert_eq!(resolved.state.step(), &Step::Confirming);
}

#[test]
fn partial_answer_keeps_what_matched_and_echoes_the_rest() {
    let ctx = ctx();
    let outcome = drive(&pizza(), &ctx, &["small", "cheese and anchovies"]);
    assert_eq!(
        outcome.state.values().get("Topping"),
        Some(&Value::Choices(vec!["Cheese".into()]))
    );
    assert!(outcome.output.contains("anchovies"), "{}", outcome.output);
    assert_eq!(outcome.state.step(), &Step::AskingField(1));
}

#[test]
fn back_shows_previous_answer_as_current_choice() {
    let ctx = ctx();
    let outcome = drive(&pizza(), &ctx, &["large", "back"]);
    assert_eq!(outcome.state.step(), &Step::AskingField(0));
    assert_eq!(
        outcome.state.values().get("Size"),
        Some(&Value::Choice("Large".into()))
    );
    assert!(outcome.output.contains("Large"), "{}", outcome.output);

    let kept = drive(&pizza(), &ctx, &["large", "back", "current"]);
    assert_eq!(kept.state.step(), &Step::AskingField(1));
    assert_eq!(
        kept.state.values().get("Size"),
        Some(&Value::Choice("Large".into()))
    );
}

#[test]
fn reset_returns_to_the_first_field() {
    let ctx = ctx();
    let outcome = drive(&pizza(), &ctx, &["large", "cheese", "reset"]);
    assert_eq!(outcome.state.step(), &Step::AskingField(0));
    assert!(outcome.state.values().is_empty());
}

#[test]
fn conditional_pattern_needs_every_element() {
    let ctx = ctx();
    let form = pizza();
    let pattern = Pattern::parse("{?Wanted {Size}}").unwrap();

    let with_size = FormValues::new().with("Size", Value::Choice("Large".into()));
    let renderer = Renderer::new(form.schema(), &with_size, ctx.random.as_ref());
    assert_eq!(renderer.render(&pattern, &Scope::form()).unwrap(), "Wanted Large");

    let empty = FormValues::new();
    let renderer = Renderer::new(form.schema(), &empty, ctx.random.as_ref());
    assert_eq!(renderer.render(&pattern, &Scope::form()).unwrap(), "");
}

#[test]
fn conversations_share_one_form() {
    let ctx = ctx();
    let form = Arc::new(pizza());
    let mut first = Conversation::new(&ctx, Arc::clone(&form));
    let mut second = Conversation::new(&ctx, Arc::clone(&form));
    first.start(&ctx, FormValues::new()).unwrap();
    second.start(&ctx, FormValues::new()).unwrap();

    first.respond(&ctx, "small").unwrap();
    second.respond(&ctx, "large").unwrap();
    second.respond(&ctx, "quit").unwrap();

    assert_eq!(
        first.state().unwrap().values().get("Size"),
        Some(&Value::Choice("Small".into()))
    );
    assert!(!first.is_done());
    assert!(second.is_done());
}

#[test]
fn conversations_run_on_separate_threads() {
    let form = Arc::new(pizza());
    let ctx = ctx();
    let results: Vec<Option<FormValues>> = std::thread::scope(|scope| {
        let handles: Vec<_> = [["1", "cheese", "yes"], ["2", "pepperoni", "yes"]]
            .into_iter()
            .map(|inputs| {
                let form = Arc::clone(&form);
                let ctx = &ctx;
                scope.spawn(move || {
                    let mut conversation = Conversation::new(ctx, form);
                    conversation.start(ctx, FormValues::new()).unwrap();
                    for input in inputs {
                        conversation.respond(ctx, input).unwrap();
                    }
                    conversation.result().cloned()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(
        results[0].as_ref().unwrap().get("Size"),
        Some(&Value::Choice("Small".into()))
    );
    assert_eq!(
        results[1].as_ref().unwrap().get("Topping"),
        Some(&Value::Choices(vec!["Pepperoni".into()]))
    );
}

#[test]
fn demo_form_builds() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/pizza.yaml");
    let form = Form::load(std::path::Path::new(path)).unwrap();
    assert_eq!(form.schema().name(), "Pizza");
    assert!(form.schema().field("DeliveryTime").is_some());
}
