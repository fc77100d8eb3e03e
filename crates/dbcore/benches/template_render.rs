use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dbcore::{
    Bindings, EqualityMode, IdentifierQuotes, LiteralSerializer, MatchKeys, Value,
    merge_statement, placeholder, placeholder_eq, render,
};

/// Template with `n` equality markers:
/// SELECT * FROM t WHERE col0 <eq k0> AND col1 <eq k1> ...
fn build_template(n: usize) -> (String, Bindings) {
    let mut template = String::from("SELECT * FROM t WHERE ");
    let mut bindings = Bindings::new();
    for i in 0..n {
        if i > 0 {
            template.push_str(" AND ");
        }
        template.push_str(&format!("col{i} {}", placeholder_eq(&format!("k{i}"))));
        bindings = bindings.bind(format!("k{i}"), format!("value {i}'s"));
    }
    (template, bindings)
}

fn bench_render_scalars(c: &mut Criterion) {
    let serializer = LiteralSerializer::new();
    let mut group = c.benchmark_group("template/render_scalars");

    for n in [1, 5, 10, 50, 100] {
        let input = build_template(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, (t, binds)| {
            b.iter(|| black_box(render(t, binds, &serializer)));
        });
    }

    group.finish();
}

fn bench_render_list(c: &mut Criterion) {
    let serializer = LiteralSerializer::new();
    let mut group = c.benchmark_group("template/render_list");

    for n in [5, 20, 100, 500] {
        let template = format!("SELECT * FROM t WHERE id IN ({}", placeholder("ids"));
        let bindings = Bindings::new().bind_list("ids", 0..n as i64);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bindings, |b, binds| {
            b.iter(|| black_box(render(&template, binds, &serializer)));
        });
    }

    group.finish();
}

fn bench_serialize_text(c: &mut Criterion) {
    let serializer = LiteralSerializer::new();
    let mut group = c.benchmark_group("literal/serialize_text");

    for len in [16, 256, 4096] {
        let value = Value::from("it's a \\ test ".repeat(len / 14 + 1));
        group.bench_with_input(BenchmarkId::from_parameter(len), &value, |b, v| {
            b.iter(|| black_box(serializer.serialize(v, EqualityMode::None)));
        });
    }

    group.finish();
}

fn bench_merge_statement(c: &mut Criterion) {
    let serializer = LiteralSerializer::new();
    let mut group = c.benchmark_group("upsert/merge_statement");

    for n in [2, 10, 50] {
        let columns: Vec<(String, Value)> = (0..n)
            .map(|i| (format!("col{i}"), Value::from(i as i64)))
            .collect();
        let keys = MatchKeys::from("col0");
        group.bench_with_input(BenchmarkId::from_parameter(n), &columns, |b, cols| {
            b.iter(|| {
                black_box(merge_statement(
                    "t",
                    cols,
                    &keys,
                    IdentifierQuotes::ANSI,
                    &serializer,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render_scalars,
    bench_render_list,
    bench_serialize_text,
    bench_merge_statement
);
criterion_main!(benches);
