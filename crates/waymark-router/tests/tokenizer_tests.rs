//! Matchability tables for the path grammar
//!
//! Every grammar is tokenized, rendered back to its canonical pattern,
//! re-tokenized, and then matched against concrete paths that belong to it
//! (and a few that must not).

use rstest::rstest;
use waymark_router::*;

fn matcher(spec: &str) -> RouteMatcher {
    let tokens = tokenize(spec).unwrap();
    // canonical patterns re-tokenize to themselves
    let reparsed = tokenize(&tokens.pattern).unwrap();
    assert_eq!(reparsed.pattern, tokens.pattern, "pattern of `{}`", spec);
    RouteMatcher::new(&reparsed.tokens).unwrap()
}

#[rstest]
#[case("some/page", &["/some/page"])]
#[case("some/{:param}", &["/some", "/some/abc"])]
#[case("users/:id", &["/users/1", "/users/abc"])]
#[case("users/[id]", &["/users/1"])]
#[case("users/[[id]]", &["/users", "/users/1"])]
#[case("users/:id?", &["/users", "/users/1"])]
#[case("book-:id", &["/book-12"])]
#[case("api/:name-v:version", &["/api/lib-v2", "/api/my-lib-v10"])]
#[case("docs/{...path}", &["/docs", "/docs/a", "/docs/a/b/c"])]
#[case("docs/[...path]", &["/docs", "/docs/a/b"])]
#[case("docs/:path*", &["/docs", "/docs/a/b"])]
#[case("files/*path", &["/files/a", "/files/a/b"])]
#[case("pkg/:name{-v:version{-:pre}}", &["/pkg/x", "/pkg/x-v1", "/pkg/x-v1-beta"])]
#[case("report{.:ext}", &["/report", "/report.csv"])]
#[case("data.json", &["/data.json"])]
#[case("users{/:id}", &["/users", "/users/7"])]
#[case("", &["/"])]
#[case("[...path]", &["/", "/x", "/x/y"])]
#[case("[[lang]]", &["/", "/en"])]
#[case("a\\/b", &["/a/b"])]
fn test_grammar_matches(#[case] spec: &str, #[case] paths: &[&str]) {
    let m = matcher(spec);
    for path in paths {
        assert!(m.is_match(path), "`{}` should match `{}`", spec, path);
    }
}

#[rstest]
#[case("some/{:param}", "/some/abc/def")]
#[case("some/page", "/some/other")]
#[case("users/:id", "/users")]
#[case("users/:id", "/users/1/2")]
#[case("files/*path", "/files")]
#[case("data.json", "/dataxjson")]
#[case("book-:id", "/book-")]
#[case("", "/a")]
fn test_grammar_rejects(#[case] spec: &str, #[case] path: &str) {
    assert!(!matcher(spec).is_match(path), "`{}` should not match `{}`", spec, path);
}

#[rstest]
#[case("api/:name-v:version", "/api/lib-v2", &[("name", "lib"), ("version", "2")])]
#[case("pkg/:name{-v:version{-:pre}}", "/pkg/x-v1", &[("name", "x"), ("version", "1")])]
#[case("pkg/:name{-v:version{-:pre}}", "/pkg/x-v1-rc", &[("name", "x"), ("version", "1"), ("pre", "rc")])]
#[case("docs/[...path]", "/docs/a/b/c", &[("path", "a/b/c")])]
#[case("report{.:ext}", "/report.csv", &[("ext", "csv")])]
#[case("users/[[id]]", "/users", &[])]
fn test_grammar_params(#[case] spec: &str, #[case] path: &str, #[case] expected: &[(&str, &str)]) {
    let params = matcher(spec).captures(path).unwrap();
    let expected: RawParams = expected
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(params, expected);
}

#[rstest]
#[case("users/{:id")]
#[case("users/:id}")]
#[case("users/[id")]
#[case("users/[[id]")]
#[case("users/:")]
#[case("users/{...}")]
#[case("a/:id/b/:id")]
fn test_malformed_paths_fail_with_raw_path(#[case] spec: &str) {
    let err = tokenize(spec).unwrap_err();
    assert_eq!(err.path(), Some(spec));
}

#[test]
fn test_bracket_dialects_share_tokens() {
    let pairs = [
        ("users/[id]", "users/:id"),
        ("users/[[id]]", "users/{:id}"),
        ("users/[...id]", "users/{...id}"),
        ("users/:id?", "users/{:id}"),
    ];
    for (dialect, canonical) in pairs {
        let a = tokenize(dialect).unwrap();
        let b = tokenize(canonical).unwrap();
        assert_eq!(a.pattern, b.pattern, "{} vs {}", dialect, canonical);
        assert_eq!(a.params(), b.params());
    }
}

#[test]
fn test_params_carry_flags() {
    let tokens = tokenize("shop/[category]/[[page]]/[...rest]").unwrap();
    let params = tokens.params();
    assert_eq!(
        params
            .iter()
            .map(|p| (p.name.as_str(), p.is_optional, p.is_rest))
            .collect::<Vec<_>>(),
        vec![
            ("category", false, false),
            ("page", true, false),
            ("rest", true, true),
        ]
    );
}

#[test]
fn test_static_sorts_before_parametric_at_same_depth() {
    let mut specs = vec!["priority/:id", "priority/{...rest}", "priority/profile", "priority/{:opt}"];
    specs.sort_by(|a, b| specificity_cmp(&tokenize(a).unwrap().tokens, &tokenize(b).unwrap().tokens));
    assert_eq!(
        specs,
        vec!["priority/profile", "priority/:id", "priority/{:opt}", "priority/{...rest}"]
    );
}
