use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Map, Value, json};
use toolx_database::Query;

fn conditions_with(fields: usize) -> Map<String, Value> {
    let mut map = Map::new();
    for index in 0..fields {
        map.insert(format!("field_{index}"), Value::String(format!("value_{index}")));
    }
    map
}

// ============================================================================
// Clause building
// ============================================================================

fn bench_build_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_select");

    for fields in [1_usize, 5, 10] {
        let conditions = conditions_with(fields);
        group.bench_with_input(
            BenchmarkId::from_parameter(fields),
            &conditions,
            |b, conditions| {
                b.iter(|| {
                    let query = Query::table("tab_bench")
                        .conditions(black_box(conditions))
                        .limit(20)
                        .page(3);
                    black_box(query.build_select().unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_mixed_clauses(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_clauses");

    let conditions = json!({
        "name": "disk",
        "status": ["open", "pending", "closed"],
        "owner": "alice",
        "s_time": "2024-01-01 00:00:00",
        "e_time": "2024-12-31 23:59:59",
    });

    group.bench_function("like_in_eq_range", |b| {
        b.iter(|| {
            let query = Query::table("tab_bench")
                .conditions(black_box(&conditions))
                .like(["name"])
                .r#in(["status"])
                .order("created_at DESC, id")
                .limit(50)
                .page(2);
            black_box(query.build_select().unwrap())
        });
    });

    group.bench_function("count", |b| {
        let query =
            Query::table("tab_bench").conditions(&conditions).like(["name"]).r#in(["status"]);
        b.iter(|| black_box(query.build_count().unwrap()));
    });

    group.finish();
}

// ============================================================================
// Mutations
// ============================================================================

fn bench_build_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_update");

    let conditions = json!({ "id": 42 });
    let assignments = json!({
        "status": "closed",
        "updated_by": "bot",
        "updated_at": "2024-06-01 12:00:00",
    });

    group.bench_function("three_assignments", |b| {
        let query = Query::table("tab_bench").conditions(&conditions);
        b.iter(|| black_box(query.build_update(black_box(&assignments)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_build_select, bench_mixed_clauses, bench_build_update);
criterion_main!(benches);
