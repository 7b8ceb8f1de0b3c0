use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use routekit::api::*;
use routekit::routing::split_path;
use serde_json::json;
use std::time::Duration;

fn benchmark_pattern_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_compilation");

    for pattern in [
        "/",
        "/users/(id)",
        "/test/(required)/(?optional)",
        "/archive(/year(/month(/day)))",
        "/files/(:catchall)",
    ]
    .iter()
    {
        group.bench_with_input(BenchmarkId::new("compile", pattern), pattern, |b, pattern| {
            b.iter(|| {
                let result = compile_pattern(black_box(pattern));
                black_box(result)
            });
        });
    }

    group.finish();
}

fn benchmark_route_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_lookup");
    group.measurement_time(Duration::from_secs(10));

    // Lookup cost grows with the number of routes ahead of the match
    for size in [10, 100, 1000].iter() {
        let mut table = RouteTable::new();
        for i in 0..*size {
            table
                .get(&format!("/resource{}/(id)/(?format)", i), "Resource@show")
                .unwrap();
        }
        let last = split_path(&format!("/resource{}/42/json", size - 1));

        group.bench_with_input(BenchmarkId::new("find_last", size), &last, |b, path| {
            b.iter(|| {
                let found = table.find(&HttpMethod::GET, HookType::Main, black_box(path));
                black_box(found.is_some())
            });
        });
    }

    let mut table = RouteTable::new();
    table.get("/users/(id)", "Users@show").unwrap();
    let miss = split_path("/posts/1/comments");
    group.bench_function("find_miss", |b| {
        b.iter(|| {
            let found = table.find(&HttpMethod::GET, HookType::Main, black_box(&miss));
            black_box(found.is_none())
        });
    });

    group.finish();
}

fn benchmark_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    let mut table = RouteTable::new();
    table
        .before("/api/(:catchall)", Handler::callable(|_| Ok(json!(null))))
        .unwrap();
    table.get("/api/users/(id)", "Users@show").unwrap();
    table
        .after("/api/(:catchall)", Handler::callable(|_| Ok(json!(null))))
        .unwrap();
    table.container_mut().singleton("Users", || {
        ActionController::new().action("show", |args| Ok(json!({ "id": args[0] })))
    });

    let environment = Environment::new()
        .with("SCRIPT_NAME", "/index.php")
        .with("REQUEST_URI", "/index.php/api/users/42?expand=profile")
        .with("REQUEST_METHOD", "GET");

    group.bench_function("run_with_hooks", |b| {
        b.iter(|| {
            let mut dispatcher = Dispatcher::new(&table);
            dispatcher.set_environment(environment.clone());
            black_box(dispatcher.run())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_pattern_compilation,
    benchmark_route_lookup,
    benchmark_dispatch
);
criterion_main!(benches);
