use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlforge::{Column, DataType, MemoryRows, Postgres, QueryResult, Table, Value, Values, compile};

/// A table with `n` integer columns named `col0..`.
fn wide_table(n: usize) -> Table {
    Table::new(
        "t",
        (0..n).map(|i| Column::new(format!("col{i}"), DataType::integer()).into()),
    )
    .unwrap()
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/select");

    for n in [1, 5, 10, 50, 100] {
        let table = wide_table(n);
        let conditions: Vec<_> = (0..n)
            .map(|i| table.c(&format!("col{i}")).equals(i as i64))
            .collect();
        let stmt = table.select().where_(conditions).limit(10);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(compile(&Postgres, stmt)));
        });
    }

    group.finish();
}

fn bench_insert_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/insert_values");

    for rows in [1, 10, 100] {
        let table = wide_table(8);
        let list: Vec<Values> = (0..rows)
            .map(|r| (0..8).map(|i| (format!("col{i}"), (r * 8 + i) as i64)).collect())
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &list, |b, list| {
            b.iter(|| {
                let stmt = table.insert().values_list(list);
                black_box(compile(&Postgres, &stmt))
            });
        });
    }

    group.finish();
}

fn bench_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/materialize_maps");

    for rows in [10, 100, 1000] {
        let columns: Vec<String> = (0..8).map(|i| format!("col{i}")).collect();
        let data: Vec<Vec<Value>> = (0..rows)
            .map(|r| (0..8).map(|i| Value::Int(r * 8 + i)).collect())
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            b.iter(|| {
                let mut out: Vec<Values> = Vec::new();
                QueryResult::new(MemoryRows::new(columns.clone(), data.clone()))
                    .all(&mut out)
                    .unwrap();
                black_box(out)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select, bench_insert_values, bench_materialize);
criterion_main!(benches);
