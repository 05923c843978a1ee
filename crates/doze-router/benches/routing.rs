//! Routing benchmarks.
//!
//! Run with: `cargo bench -p doze-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use doze_router::{ParamValue, Router, RouterOptions};
use http::Method;

fn build_router(num_routes: usize) -> Router<usize> {
    let mut router = Router::new();
    let per_kind = (num_routes / 3).max(1);

    for i in 0..per_kind {
        router
            .register(&format!("/api/v1/resource{i}"), None, Method::GET, i)
            .unwrap();
        router
            .register(
                &format!("/api/v1/resource{i}/{{id:i}}"),
                Some(format!("resource{i}").as_str()),
                Method::GET,
                i,
            )
            .unwrap();
        router
            .register(
                &format!("/api/v1/org/{{org:an}}/resource{i}/{{id}}"),
                None,
                Method::GET,
                i,
            )
            .unwrap();
    }

    router
}

fn bench_static_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v1/resource30")));
    });
}

fn bench_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("param_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v1/resource25/12345")));
    });
}

fn bench_nested_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("nested_param_match", |b| {
        b.iter(|| {
            black_box(router.match_route(&Method::GET, "/api/v1/org/acme42/resource10/abc-1"))
        });
    });
}

fn bench_backtracking(c: &mut Criterion) {
    let mut router = Router::with_options(RouterOptions {
        inner_wildcards: true,
        ..RouterOptions::default()
    });
    router.register("/f/*/b/c", None, Method::GET, 0).unwrap();
    router.register("/f/{a:i}/b/c/{b:i}", None, Method::GET, 1).unwrap();
    router.register("/f/{a:i}/b/c/{b}/d/{c:a}", None, Method::GET, 2).unwrap();

    c.bench_function("backtracking", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/f/1234/b/c/4321/d/ghjk")));
    });
}

fn bench_miss(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v1/nonexistent/path")));
    });
}

fn bench_build(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("build", |b| {
        b.iter(|| black_box(router.build("resource12", [("id", ParamValue::Int(12345))])));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for num_routes in [10, 50, 100, 500, 1000] {
        let router = build_router(num_routes);

        group.bench_with_input(
            BenchmarkId::new("static_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}", n / 6);
                b.iter(|| black_box(router.match_route(&Method::GET, &path)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("param_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}/12345", n / 6);
                b.iter(|| black_box(router.match_route(&Method::GET, &path)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_param_match,
    bench_nested_param_match,
    bench_backtracking,
    bench_miss,
    bench_build,
    bench_scaling
);
criterion_main!(benches);
