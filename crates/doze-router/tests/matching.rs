//! Table-driven matching tests over a dense, overlapping route set.

use doze_router::{MatchError, ParamValue, Router, RouterOptions};
use http::Method;

const ROUTES: &[&str] = &[
    "/foo",
    "/foo/bar",
    "/foo/bar/{a}",
    "/foo/bar/{a}/baz",
    "/oof",
    "/oof/rab",
    "/oof/rab/{a}",
    "/oof/rab/{a}/baz",
    "/f/{a}",
    "/f/{a}/b/c",
    "/f/{a:i}/b/c/{b:i}",
    "/f/{a:i}/b/c/{b}/d/{c:a}",
    "/foo/bar/{a}/baz/{b}/oof/{c}/rab/{d}",
    "/foo/bar/{a}/baz/{b}/oof/{c}/rab/{d}/zab",
    "/foo/bar/{a:i}/baz/{b:i}/oof/{c:i}/rab/{d:i}/zab/{e:i}",
    "/foo/bar/{a}/baz/{b}/oof/{c}/rab/{d}/zab/{e}",
];

fn dense_router() -> Router<&'static str> {
    let mut router = Router::new();
    for route in ROUTES {
        router.register(route, None, Method::GET, *route).unwrap();
    }
    router
}

#[test]
fn test_dense_route_table() {
    let router = dense_router();

    let cases: &[(&str, Option<&str>)] = &[
        ("/foo", Some("/foo")),
        ("/fo", None),
        ("/foo/bar", Some("/foo/bar")),
        ("/foo/ba", None),
        ("/foo/bar/asdf", Some("/foo/bar/{a}")),
        ("/foo/bar/1234", Some("/foo/bar/{a}")),
        ("/foo/bar/asdf/baz", Some("/foo/bar/{a}/baz")),
        ("/foo/bar/1234/baz", Some("/foo/bar/{a}/baz")),
        ("/foo/bar/asdf/ba", None),
        ("/f/asdf", Some("/f/{a}")),
        ("/f/1234", Some("/f/{a}")),
        ("/f/1234/b", None),
        ("/f/1234/b/c", Some("/f/{a}/b/c")),
        ("/f/asdf/b/c", Some("/f/{a}/b/c")),
        ("/f/1234/b/c/4321", Some("/f/{a:i}/b/c/{b:i}")),
        ("/f/asdf/b/c/4321", None),
        ("/f/asdf/b/c/4321/d/1234", None),
        ("/f/1234/b/c/4321/d/ghjk", Some("/f/{a:i}/b/c/{b}/d/{c:a}")),
        (
            "/foo/bar/A/baz/B/oof/C/rab/D",
            Some("/foo/bar/{a}/baz/{b}/oof/{c}/rab/{d}"),
        ),
        ("/foo/bar/A/baz/B/oof/C/rab", None),
        (
            "/foo/bar/A/baz/B/oof/C/rab/D/zab",
            Some("/foo/bar/{a}/baz/{b}/oof/{c}/rab/{d}/zab"),
        ),
        (
            "/foo/bar/A/baz/B/oof/C/rab/D/zab/E",
            Some("/foo/bar/{a}/baz/{b}/oof/{c}/rab/{d}/zab/{e}"),
        ),
        ("/foo/bar/A/baz/B/oof/C/rab/D/zab/E/F", None),
        (
            "/foo/bar/1/baz/2/oof/3/rab/4/zab/5",
            Some("/foo/bar/{a:i}/baz/{b:i}/oof/{c:i}/rab/{d:i}/zab/{e:i}"),
        ),
        (
            "/foo/bar/1/baz/2/oof/3/rab/4/zab/E",
            Some("/foo/bar/{a}/baz/{b}/oof/{c}/rab/{d}/zab/{e}"),
        ),
        ("/foo/bar/1/baz/2/oof/A/rab/B/zab/C/d", None),
    ];

    for (path, expected) in cases {
        let got = router.match_path(path).map(|m| m.route.path());
        assert_eq!(got, *expected, "matching {path}");
    }
}

#[test]
fn test_backtracking_recovers_params() {
    let router = dense_router();

    let m = router
        .match_route(&Method::GET, "/f/1234/b/c/4321/d/ghjk")
        .unwrap();
    assert_eq!(m.params.get_int("a"), Some(1234));
    assert_eq!(m.params.get_int("b"), Some(4321));
    assert_eq!(m.params.get_str("c"), Some("ghjk"));
    assert_eq!(m.params.len(), 3);
}

#[test]
fn test_not_found_and_method_not_allowed_are_distinct() {
    let router = dense_router();

    assert!(matches!(
        router.match_route(&Method::GET, "/nope"),
        Err(MatchError::NotFound { .. })
    ));
    match router.match_route(&Method::PUT, "/foo") {
        Err(MatchError::MethodNotAllowed { allowed, .. }) => {
            assert_eq!(allowed, vec![Method::GET]);
        }
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
}

#[test]
fn test_wildcards_span_slashes() {
    let mut router = Router::new();
    router.register("/static/*", None, Method::GET, "static").unwrap();
    router.register("/files/{dir}/*path", None, Method::GET, "files").unwrap();

    let m = router
        .match_route(&Method::GET, "/static/css/app/site.css")
        .unwrap();
    assert_eq!(m.params.get_str("*"), Some("css/app/site.css"));

    let m = router.match_route(&Method::GET, "/files/home/a/b").unwrap();
    assert_eq!(m.params.get_str("dir"), Some("home"));
    assert_eq!(m.params.get_str("path"), Some("a/b"));

    assert!(router.match_path("/static").is_none());
    assert!(router.match_path("/files/home").is_none());
}

#[test]
fn test_inner_wildcard_yields_to_fixed_suffix() {
    let mut router = Router::with_options(RouterOptions {
        inner_wildcards: true,
        ..RouterOptions::default()
    });
    router.register("/f/*/b/c", None, Method::GET, "inner").unwrap();

    let m = router.match_route(&Method::GET, "/f/x/b/c").unwrap();
    assert_eq!(*m.handler, "inner");
    assert_eq!(m.params.get_str("*"), Some("x"));

    let m = router.match_route(&Method::GET, "/f/x/y/b/c").unwrap();
    assert_eq!(m.params.get_str("*"), Some("x/y"));

    assert!(router.match_path("/f/x/b/d").is_none());
    assert!(router.match_path("/f/b/c").is_none());
}

#[test]
fn test_static_routes_match_byte_identical_paths_only() {
    let mut router = Router::new();
    for path in ["/", "/a", "/a/b", "/a/bc", "/ab"] {
        router.register(path, None, Method::GET, path).unwrap();
    }

    for path in ["/", "/a", "/a/b", "/a/bc", "/ab"] {
        assert_eq!(*router.match_route(&Method::GET, path).unwrap().handler, path);
        let with_slash = format!("{path}/");
        if path != "/" {
            assert_eq!(
                *router.match_route(&Method::GET, &with_slash).unwrap().handler,
                path
            );
        }
    }

    for path in ["", "/a//", "/A", "/a/b/c", "/abc", "a"] {
        assert!(router.match_path(path).is_none(), "{path} should not match");
    }
}

#[test]
fn test_integer_coercion_on_untyped_params() {
    let mut router = Router::new();
    router.register("/items/{key}", None, Method::GET, "item").unwrap();

    let m = router.match_route(&Method::GET, "/items/-15").unwrap();
    assert_eq!(m.params.get("key"), Some(&ParamValue::Int(-15)));

    let m = router.match_route(&Method::GET, "/items/x15").unwrap();
    assert_eq!(m.params.get("key"), Some(&ParamValue::Str("x15".to_string())));
}
