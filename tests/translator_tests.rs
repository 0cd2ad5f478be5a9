use std::cell::Cell;

use scim_filter::{translate, Filter, FilterError, Path, Strategy, Value};

fn path(text: &str) -> Path {
    text.parse().unwrap()
}

fn literal(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

fn wrap(negated: bool, expression: String) -> String {
    if negated {
        format!("(!{})", expression)
    } else {
        expression
    }
}

/// Builds LDAP-style query text and supports every operator.
struct Full;

impl Strategy<String> for Full {
    fn and(&self, lhs: &String, rhs: &String) -> Option<String> {
        Some(format!("(&{}{})", lhs, rhs))
    }

    fn or(&self, lhs: &String, rhs: &String) -> Option<String> {
        Some(format!("(|{}{})", lhs, rhs))
    }

    fn present(&self, path: &Path, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}=*)", path)))
    }

    fn equals(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}={})", path, literal(value))))
    }

    fn greater_than(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}>{})", path, literal(value))))
    }

    fn greater_or_equal(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}>={})", path, literal(value))))
    }

    fn less_than(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}<{})", path, literal(value))))
    }

    fn less_or_equal(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}<={})", path, literal(value))))
    }

    fn starts_with(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}={}*)", path, literal(value))))
    }

    fn ends_with(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}=*{})", path, literal(value))))
    }

    fn contains(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}=*{}*)", path, literal(value))))
    }
}

/// Supports nothing at all.
struct Nothing;

impl Strategy<String> for Nothing {}

/// Supports equality and the boolean combinators, nothing else.
struct OnlyEquals;

impl Strategy<String> for OnlyEquals {
    fn and(&self, lhs: &String, rhs: &String) -> Option<String> {
        Some(format!("(&{}{})", lhs, rhs))
    }

    fn or(&self, lhs: &String, rhs: &String) -> Option<String> {
        Some(format!("(|{}{})", lhs, rhs))
    }

    fn equals(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}={})", path, literal(value))))
    }
}

/// Builds every leaf but cannot combine anything with `and`.
struct NoAnd;

impl Strategy<String> for NoAnd {
    fn or(&self, lhs: &String, rhs: &String) -> Option<String> {
        Some(format!("(|{}{})", lhs, rhs))
    }

    fn equals(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}={})", path, literal(value))))
    }

    fn present(&self, path: &Path, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}=*)", path)))
    }
}

/// Builds every leaf and `and`, but cannot combine with `or`.
struct NoOr;

impl Strategy<String> for NoOr {
    fn and(&self, lhs: &String, rhs: &String) -> Option<String> {
        Some(format!("(&{}{})", lhs, rhs))
    }

    fn equals(&self, path: &Path, value: &Value, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}={})", path, literal(value))))
    }

    fn present(&self, path: &Path, negated: bool) -> Option<String> {
        Some(wrap(negated, format!("({}=*)", path)))
    }
}

/// Violates the determinism contract: builds equality only for the first
/// `budget` invocations, then claims it is unsupported.
struct Flaky {
    budget: Cell<usize>,
}

impl Strategy<String> for Flaky {
    fn equals(&self, path: &Path, value: &Value, _negated: bool) -> Option<String> {
        let remaining = self.budget.get();
        if remaining == 0 {
            return None;
        }
        self.budget.set(remaining - 1);
        Some(format!("({}={})", path, literal(value)))
    }
}

#[test]
fn test_no_filter_fetches_everything() {
    let queries: Vec<String> = translate(None, &Full).unwrap();
    assert!(queries.is_empty());
}

#[test]
fn test_unsupported_filter_fetches_everything() {
    let filter = Filter::and(
        Filter::eq(path("userName"), "bjensen"),
        Filter::pr(path("emails")),
    );
    let queries = translate(Some(&filter), &Nothing).unwrap();
    assert!(queries.is_empty());
}

#[test]
fn test_leaf_translation() {
    let filter = Filter::eq(path("userName"), "bjensen");
    assert_eq!(
        translate(Some(&filter), &Full).unwrap(),
        vec!["(userName=bjensen)".to_string()]
    );
}

#[test]
fn test_every_operator_translates() {
    let cases = [
        (Filter::pr(path("a")), "(a=*)"),
        (Filter::eq(path("a"), 1), "(a=1)"),
        (Filter::gt(path("a"), 1), "(a>1)"),
        (Filter::ge(path("a"), 1), "(a>=1)"),
        (Filter::lt(path("a"), 1), "(a<1)"),
        (Filter::le(path("a"), 1), "(a<=1)"),
        (Filter::sw(path("a"), "x"), "(a=x*)"),
        (Filter::ew(path("a"), "x"), "(a=*x)"),
        (Filter::co(path("a"), "x"), "(a=*x*)"),
    ];
    for (filter, expected) in cases {
        assert_eq!(
            translate(Some(&filter), &Full).unwrap(),
            vec![expected.to_string()],
            "{filter}"
        );
    }
}

#[test]
fn test_combinators_translate_natively() {
    let filter = Filter::and(
        Filter::eq(path("userName"), "bjensen"),
        Filter::pr(path("emails")),
    );
    assert_eq!(
        translate(Some(&filter), &Full).unwrap(),
        vec!["(&(userName=bjensen)(emails=*))".to_string()]
    );

    let filter = Filter::or(
        Filter::eq(path("userName"), "bjensen"),
        Filter::eq(path("userName"), "jsmith"),
    );
    assert_eq!(
        translate(Some(&filter), &Full).unwrap(),
        vec!["(|(userName=bjensen)(userName=jsmith))".to_string()]
    );
}

#[test]
fn test_negation_reaches_the_leaf() {
    let filter = Filter::not(Filter::eq(path("userName"), "bjensen"));
    assert_eq!(
        translate(Some(&filter), &Full).unwrap(),
        vec!["(!(userName=bjensen))".to_string()]
    );
}

#[test]
fn test_de_morgan_normalization() {
    // not(and(a, b)) becomes or(not a, not b)
    let filter = Filter::not(Filter::and(
        Filter::eq(path("a"), 1),
        Filter::eq(path("b"), 2),
    ));
    assert_eq!(
        translate(Some(&filter), &Full).unwrap(),
        vec!["(|(!(a=1))(!(b=2)))".to_string()]
    );

    // double negation cancels
    let filter = Filter::not(Filter::not(Filter::eq(path("a"), 1)));
    assert_eq!(
        translate(Some(&filter), &Full).unwrap(),
        vec!["(a=1)".to_string()]
    );
}

#[test]
fn test_and_degrades_over_an_unsupported_side() {
    let supported = Filter::eq(path("userName"), "bjensen");
    let unsupported = Filter::gt(path("age"), 21);

    let combined = translate(Some(&Filter::and(supported.clone(), unsupported)), &OnlyEquals);
    let alone = translate(Some(&supported), &OnlyEquals);
    assert_eq!(combined.unwrap(), alone.unwrap());
}

#[test]
fn test_and_keeps_the_cheaper_side_without_native_and() {
    let filter = Filter::and(
        Filter::eq(path("a"), 1),
        Filter::or(Filter::eq(path("b"), 2), Filter::eq(path("c"), 3)),
    );
    // the left side needs one query, the right side needs one combined
    // or-query; with no native and, the cheaper left side wins
    assert_eq!(
        translate(Some(&filter), &NoAnd).unwrap(),
        vec!["(a=1)".to_string()]
    );
}

#[test]
fn test_and_distributes_over_an_uncombinable_or() {
    let filter = Filter::and(
        Filter::or(Filter::eq(path("a"), 1), Filter::eq(path("b"), 2)),
        Filter::eq(path("c"), 3),
    );
    // no native or: and(or(a, b), c) fans out to two conjunctive queries
    assert_eq!(
        translate(Some(&filter), &NoOr).unwrap(),
        vec!["(&(a=1)(c=3))".to_string(), "(&(b=2)(c=3))".to_string()]
    );
}

#[test]
fn test_or_with_an_unsupported_side_fetches_everything() {
    let filter = Filter::or(
        Filter::eq(path("a"), 1),
        Filter::gt(path("b"), 2),
    );
    let queries = translate(Some(&filter), &OnlyEquals).unwrap();
    assert!(queries.is_empty(), "uniting with everything is everything");
}

#[test]
fn test_or_without_native_or_returns_both_queries() {
    let filter = Filter::or(
        Filter::eq(path("a"), 1),
        Filter::eq(path("b"), 2),
    );
    assert_eq!(
        translate(Some(&filter), &NoOr).unwrap(),
        vec!["(a=1)".to_string(), "(b=2)".to_string()]
    );
}

#[test]
fn test_duplicate_expressions_collapse() {
    let filter = Filter::or(
        Filter::eq(path("a"), 1),
        Filter::eq(path("a"), 1),
    );
    assert_eq!(
        translate(Some(&filter), &NoOr).unwrap(),
        vec!["(a=1)".to_string()]
    );
}

#[test]
fn test_complex_filters_are_never_native() {
    let filter = Filter::complex(path("emails"), Filter::eq(path("type"), "work"));
    assert!(translate(Some(&filter), &Full).unwrap().is_empty());

    // inside an and they degrade to the supported side
    let combined = Filter::and(filter, Filter::eq(path("userName"), "bjensen"));
    assert_eq!(
        translate(Some(&combined), &Full).unwrap(),
        vec!["(userName=bjensen)".to_string()]
    );
}

#[test]
fn test_translation_is_deterministic() {
    let filter = Filter::and(
        Filter::or(Filter::eq(path("a"), 1), Filter::eq(path("b"), 2)),
        Filter::pr(path("c")),
    );
    let first = translate(Some(&filter), &NoOr).unwrap();
    let second = translate(Some(&filter), &NoOr).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_inconsistent_strategy_is_fatal() {
    // the leaf is supported during simplification and vanishes at
    // translation time, which must surface as an error, never as a
    // silent fallback
    let strategy = Flaky {
        budget: Cell::new(1),
    };
    let filter = Filter::eq(path("a"), 1);
    let result = translate(Some(&filter), &strategy);
    assert!(matches!(
        result,
        Err(FilterError::InconsistentStrategy(_))
    ));
}

#[test]
fn test_excessive_nesting_is_rejected() {
    let mut filter = Filter::eq(path("a"), 1);
    for _ in 0..200 {
        filter = Filter::not(filter);
    }
    let result = translate(Some(&filter), &Full);
    assert!(matches!(result, Err(FilterError::DepthExceeded(_))));
}
