//! Locator Operations Benchmarks
//!
//! Benchmarks for selector compilation, text normalization and mock element
//! matching.
//!
//! Run with: `cargo bench --bench locator_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shopwright::driver::mock::MockElement;
use shopwright::{text_matches, Locator, Selector};

fn storefront_selectors() -> Vec<(&'static str, Selector)> {
    vec![
        ("id", Selector::css("#empty_cart")),
        ("class_list", Selector::css(".status.alert-success")),
        ("data_qa", Selector::css("input[data-qa=\"login-email\"]")),
        ("text", Selector::text("Logged in as")),
        ("role", Selector::role("link", "Signup / Login")),
        ("attribute", Selector::attribute("data-qa", "account-created")),
        ("css_with_text", Selector::css_with_text("h2", "New User Signup!")),
    ]
}

fn bench_selector_to_js(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector_to_js");

    for (name, selector) in storefront_selectors() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &selector, |bench, sel| {
            bench.iter(|| black_box(black_box(sel).to_js_all()));
        });
    }

    group.finish();
}

fn bench_selector_display(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector_display");

    for (name, selector) in storefront_selectors() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &selector, |bench, sel| {
            bench.iter(|| black_box(black_box(sel).to_string()));
        });
    }

    group.finish();
}

fn bench_locator_narrowing(c: &mut Criterion) {
    let mut group = c.benchmark_group("locator_narrowing");

    for (name, index) in [("first", 0usize), ("nth_5", 5), ("nth_100", 100)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &index, |bench, &idx| {
            bench.iter(|| {
                let locator = Locator::new(".productinfo").nth(black_box(idx));
                black_box(locator);
            });
        });
    }

    group.finish();
}

fn bench_text_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_matching");

    let cases = [
        ("short", "  Logged in as   Playwright User ", "logged in as playwright user"),
        (
            "long_miss",
            "Address Details Your delivery address Mr. Playwright User Test Company Inc 123 Main Street Apt 4B",
            "Register / Login account to proceed on checkout.",
        ),
    ];

    for (name, haystack, needle) in cases {
        group.bench_function(name, |bench| {
            bench.iter(|| black_box(text_matches(black_box(haystack), black_box(needle))));
        });
    }

    group.finish();
}

fn bench_mock_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("mock_matching");

    let elements: Vec<MockElement> = (0..200)
        .map(|i| {
            MockElement::new("a")
                .attr("class", format!("nav-link item-{i}"))
                .attr("href", format!("/product_details/{i}"))
                .text(format!("View Product {i}"))
        })
        .collect();

    for (name, selector) in [
        ("css_attr", Selector::css("a[href=\"/product_details/150\"]")),
        ("role_name", Selector::role("link", "View Product 150")),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &selector, |bench, sel| {
            bench.iter(|| {
                let hits = elements.iter().filter(|el| el.matches(black_box(sel))).count();
                black_box(hits);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_selector_to_js,
    bench_selector_display,
    bench_locator_narrowing,
    bench_text_matching,
    bench_mock_matching,
);
criterion_main!(benches);
