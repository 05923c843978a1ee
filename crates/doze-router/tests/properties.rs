//! Property tests for reverse routing and branch priority.

use doze_router::{BuildError, ParamValue, Router};
use http::Method;
use proptest::prelude::*;

const TEMPLATE: &str = "/people/{id:i}/details/{name:a}/tags/{tag:an}/{rest}";

fn people_router() -> Router<&'static str> {
    let mut router = Router::new();
    router
        .register(TEMPLATE, Some("people"), Method::GET, "people")
        .unwrap();
    router
        .register("/people/{id:i}", Some("person"), Method::GET, "person")
        .unwrap();
    router
}

fn priority_router() -> Router<&'static str> {
    let mut router = Router::new();
    // Registered lowest priority first so order cannot explain the outcome.
    router.register("/x/*rest", None, Method::GET, "wildcard").unwrap();
    router.register("/x/{v}", None, Method::GET, "any").unwrap();
    router.register("/x/{v:an}", None, Method::GET, "alnum").unwrap();
    router.register("/x/{v:a}", None, Method::GET, "alpha").unwrap();
    router.register("/x/{v:i}", None, Method::GET, "int").unwrap();
    router
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Building a path and matching it again recovers the same route and values,
    /// including values that need percent-encoding.
    #[test]
    fn prop_build_then_match_round_trips(
        id in 0_u32..1_000_000,
        name in "[a-zA-Z]{1,12}",
        tag in "[a-z0-9]{1,8}",
        rest in "[a-zA-Z0-9é ._~%&/?#+-]{1,10}",
    ) {
        let router = people_router();
        let path = router
            .build(
                "people",
                [
                    ("id", ParamValue::from(id)),
                    ("name", ParamValue::from(name.as_str())),
                    ("tag", ParamValue::from(tag.as_str())),
                    ("rest", ParamValue::from(rest.as_str())),
                ],
            )
            .unwrap();

        let m = router.match_route(&Method::GET, &path).unwrap();
        prop_assert_eq!(m.route.name(), Some("people"));
        prop_assert_eq!(m.params.get_int("id"), Some(i64::from(id)));
        prop_assert_eq!(m.params.get_str("name"), Some(name.as_str()));
        prop_assert_eq!(m.params.get("tag"), Some(&ParamValue::parse(&tag)));
        prop_assert_eq!(m.params.raw("tag"), Some(tag.as_str()));
        prop_assert_eq!(m.params.raw("rest"), Some(rest.as_str()));
    }

    /// A count mismatch never yields a path.
    #[test]
    fn prop_build_rejects_wrong_count(extra in prop::collection::vec("[a-z]{1,6}", 0..4)) {
        let router = people_router();
        let mut params: Vec<(String, ParamValue)> = vec![("id".to_string(), ParamValue::Int(1))];
        for (i, value) in extra.iter().enumerate() {
            params.push((format!("extra{i}"), ParamValue::from(value.as_str())));
        }
        prop_assume!(params.len() != 1);

        let err = router.build("person", params.clone()).unwrap_err();
        prop_assert_eq!(err, BuildError::ParamCount { given: params.len(), required: 1 });
    }

    /// Digits always take the integer branch.
    #[test]
    fn prop_digits_prefer_int(value in "[0-9]{1,9}") {
        let router = priority_router();
        let m = router.match_route(&Method::GET, &format!("/x/{value}")).unwrap();
        prop_assert_eq!(*m.handler, "int");
    }

    /// Letters always take the alphabetic branch.
    #[test]
    fn prop_letters_prefer_alpha(value in "[a-zA-Z]{1,9}") {
        let router = priority_router();
        let m = router.match_route(&Method::GET, &format!("/x/{value}")).unwrap();
        prop_assert_eq!(*m.handler, "alpha");
    }

    /// Mixed letters and digits take the alphanumeric branch.
    #[test]
    fn prop_mixed_prefers_alnum(letters in "[a-z]{1,4}", digits in "[0-9]{1,4}") {
        let router = priority_router();
        let m = router
            .match_route(&Method::GET, &format!("/x/{letters}{digits}"))
            .unwrap();
        prop_assert_eq!(*m.handler, "alnum");
    }

    /// Anything spanning a slash can only be the wildcard.
    #[test]
    fn prop_multi_segment_takes_wildcard(a in "[a-z0-9]{1,5}", b in "[a-z0-9]{1,5}") {
        let router = priority_router();
        let m = router.match_route(&Method::GET, &format!("/x/{a}/{b}")).unwrap();
        prop_assert_eq!(*m.handler, "wildcard");
        let expected = format!("{a}/{b}");
        prop_assert_eq!(m.params.get("rest"), Some(&ParamValue::parse(&expected)));
    }
}

#[test]
fn test_build_unknown_param_never_returns_partial_path() {
    let router = people_router();
    let err = router.build("person", [("uid", 1)]).unwrap_err();
    assert_eq!(err, BuildError::UnknownParam("uid".to_string()));
}

#[test]
fn test_untyped_branch_takes_punctuation() {
    let router = priority_router();
    let m = router.match_route(&Method::GET, "/x/a-b.c").unwrap();
    assert_eq!(*m.handler, "any");
}
