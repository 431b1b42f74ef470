use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gopherman::model::{
    Body, Collection, Header, Item, Request, Response, Url, HEADER_TYPE_TEXT, MODE_RAW,
};
use gopherman::template::substitute;

fn recorded_item(i: usize) -> Item {
    let request = Request {
        method: "POST".to_string(),
        header: vec![Header {
            key: "Content-Type".to_string(),
            name: "Content-Type".to_string(),
            value: "application/json".to_string(),
            kind: HEADER_TYPE_TEXT.to_string(),
        }],
        body: Some(Body {
            mode: MODE_RAW.to_string(),
            raw: format!(r#"{{"id":{i}}}"#),
        }),
        url: Url::from_raw(&format!("http://api.internal:3000/api/items/{i}")),
    };
    Item::recorded(
        &format!("/api/items/{i}"),
        request,
        Some(Response::raw(br#"{"ok":true}"#, 201)),
    )
}

fn bench_substitute(c: &mut Criterion) {
    let mut variables = HashMap::new();
    variables.insert("host".to_string(), "api.internal".to_string());
    variables.insert("token".to_string(), "secret".to_string());

    c.bench_function("substitute", |b| {
        b.iter(|| {
            substitute(
                black_box("http://{{ .host }}:3000/api?token={{token}}"),
                black_box(&variables),
            )
        });
    });
}

fn bench_collection_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_json");

    for size in [10, 100, 1_000] {
        let collection = Collection::new("bench", (0..size).map(recorded_item).collect(), None);

        group.bench_with_input(BenchmarkId::new("encode", size), &collection, |b, c| {
            b.iter(|| black_box(c).to_json());
        });

        let Ok(encoded) = collection.to_json() else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, data| {
            b.iter(|| Collection::from_json(black_box(data)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_substitute, bench_collection_json);
criterion_main!(benches);
