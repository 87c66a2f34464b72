//! Benchmarks for layout rendering and template interpolation.
//!
//! Run with: cargo bench --bench render_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use sdui::engine::{interpolate, render, Scope};
use sdui::models::{Component, ComponentKind, Condition, Operator, Predicate, TextCatalog};

fn state() -> Value {
    json!({
        "otp": "482913",
        "timeLeft": 17,
        "cardData": {"holderName": "Ana Pérez", "last4": "4242"}
    })
}

fn texts() -> TextCatalog {
    TextCatalog::new()
        .with_screen_text("OtpScreen", "timerPrefix", "Expira en")
        .with_screen_text("OtpScreen", "timerSuffix", "segundo")
        .with_screen_text("OtpScreen", "timerSuffixPlural", "segundos")
}

/// A container of `rows` rows, each with a conditional text and a button.
fn layout(rows: usize) -> Component {
    let visible = Condition::Predicate(Predicate::new("timeLeft", Operator::GreaterThan, json!(0)));
    let children = (0..rows)
        .map(|i| {
            Component::container(vec![
                Component::text("{{cardData.holderName}} ({{cardData.last4}})")
                    .with_id(format!("holder-{}", i)),
                Component::text(
                    "{{texts.timerPrefix}} {{timeLeft}} \
                     {{timeLeft === 1 ? texts.timerSuffix : texts.timerSuffixPlural}}",
                )
                .with_condition(visible.clone()),
                Component::new(ComponentKind::Button)
                    .with_id(format!("go-{}", i))
                    .with_prop("title", json!("Continuar {{otp}}"))
                    .with_prop("disabled", json!({"field": "otp", "operator": "notExists"}))
                    .with_prop(
                        "onPress",
                        json!({"type": "navigate", "screen": "Next", "params": {"otp": "{{otp}}"}}),
                    ),
            ])
        })
        .collect();
    Component::container(children)
}

fn bench_render(c: &mut Criterion) {
    let state = state();
    let texts = texts();
    let scope = Scope::new(&state)
        .with_texts(&texts)
        .with_screen("OtpScreen");

    let mut group = c.benchmark_group("render");
    for rows in [1usize, 10, 100] {
        let tree = layout(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &tree, |b, tree| {
            b.iter(|| render(black_box(tree), black_box(&scope)))
        });
    }
    group.finish();
}

fn bench_interpolate(c: &mut Criterion) {
    let state = state();
    let texts = texts();
    let scope = Scope::new(&state)
        .with_texts(&texts)
        .with_screen("OtpScreen");

    let templates = [
        ("plain", "Código de vinculación"),
        ("path", "Código: {{otp}}"),
        ("texts", "{{texts.timerPrefix}} {{timeLeft}}"),
        (
            "expression",
            "{{timeLeft === 1 ? texts.timerSuffix : texts.timerSuffixPlural}}",
        ),
        ("missing", "Hola {{user.name}}"),
    ];

    let mut group = c.benchmark_group("interpolate");
    for (name, template) in templates {
        group.bench_with_input(BenchmarkId::from_parameter(name), template, |b, template| {
            b.iter(|| interpolate(black_box(template), black_box(&scope)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render, bench_interpolate);
criterion_main!(benches);
