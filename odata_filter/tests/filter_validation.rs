use assert_matches::assert_matches;
use odata_filter::{
    classify, EntityModel, FilterExpressionTree, FilterValidator, ModelError, NameKind,
    ODataEntity, OccurrenceBound, RuleError, RuleSet, SyntaxError, TreeError, ValidationMode,
    ValidatorError, ViolationKind,
};
use std::io::Write;

struct User;

impl ODataEntity for User {
    fn entity_model() -> Result<EntityModel, ModelError> {
        EntityModel::builder("User")
            .namespace("ODataSampleModels")
            .structured("User", |t| {
                t.property("id", "Edm.Int32")
                    .property("email", "Edm.String")
                    .property("displayName", "Edm.String")
                    .property("enabled", "Edm.Boolean")
                    .property("type", "Edm.String")
                    .property("createDate", "Edm.DateTimeOffset")
                    .property("name", "Name")
                    .property("sponsor", "User")
                    .collection("phoneNumbers", "Edm.String")
                    .collection("socialLogins", "SocialLogin")
            })
            .structured("Name", |t| {
                t.property("givenName", "Edm.String")
                    .property("surname", "Edm.String")
                    .property("nickName", "Edm.String")
            })
            .structured("SocialLogin", |t| {
                t.property("name", "Edm.String").property("url", "Edm.String")
            })
            .build()
    }
}

fn contains_all(names: &[String], expected: &[&str]) -> bool {
    expected
        .iter()
        .all(|e| names.iter().any(|n| n.eq_ignore_ascii_case(e)))
}

/// Expression, expected operators, expected properties
const EXPRESSIONS: &[(&str, &[&str], &[&str])] = &[
    ("not(null)", &["not"], &[]),
    ("not(true)", &["not"], &[]),
    ("not(false)", &["not"], &[]),
    ("not(enabled)", &["not"], &["enabled"]),
    ("not(sponsor/enabled)", &["not"], &["sponsor/enabled"]),
    ("not(sponsor/sponsor/enabled)", &["not"], &["sponsor/sponsor/enabled"]),
    ("email eq null", &["eq"], &["email"]),
    ("email ne null", &["ne"], &["email"]),
    ("email eq 'john@mail.com'", &["eq"], &["email"]),
    ("email ne 'john''s@mail.com'", &["ne"], &["email"]),
    ("email eq displayName", &["eq"], &["email", "displayName"]),
    ("contains(email, '@mail')", &["contains"], &["email"]),
    ("not contains(email, '@mail')", &["not", "contains"], &["email"]),
    ("startsWith(email, 'john')", &["startsWith"], &["email"]),
    ("not startsWith(email, 'john')", &["not", "startsWith"], &["email"]),
    ("endsWith(email, '.com')", &["endsWith"], &["email"]),
    ("not endsWith(email, '.com')", &["not", "endsWith"], &["email"]),
    ("email in ('john@mail.com', 'mary@mail.com')", &["in"], &["email"]),
    ("not (email in ('john@mail.com', 'mary@mail.com'))", &["not", "in"], &["email"]),
    ("id eq 0", &["eq"], &["id"]),
    ("id gt 1.5", &["gt"], &["id"]),
    ("id lt 2000", &["lt"], &["id"]),
    ("id ge 1.5", &["ge"], &["id"]),
    ("id le 2000", &["le"], &["id"]),
    ("name eq null", &["eq"], &["name"]),
    ("name/givenName eq null", &["eq"], &["name/givenName"]),
    ("sponsor/name/givenName eq null", &["eq"], &["sponsor/name/givenName"]),
    ("name/surname ne sponsor/name/surname", &["ne"], &["name/surname", "sponsor/name/surname"]),
    ("name/givenName in ('John', 'Mary')", &["in"], &["name/givenName"]),
    ("name/givenName ne name/nickName", &["ne"], &["name/givenName", "name/nickName"]),
    ("type has 'Employee'", &["has"], &["type"]),
    ("createDate gt 2021-01-02T12:00:00Z", &["gt"], &["createDate"]),
    ("type eq 'Guest' and name/Surname eq 'Johnson'", &["eq", "and"], &["type", "name/surname"]),
    (
        "enabled eq false and type in ('Employee', 'Contractor')",
        &["eq", "and", "in"],
        &["enabled", "type"],
    ),
    (
        "((enabled eq true) and (type eq 'Employee')) or ((email ne null) and ((type eq 'Guest') or (endsWith(email, '@mail.com'))))",
        &["eq", "and", "or", "ne", "endsWith"],
        &["enabled", "type", "email"],
    ),
    ("phoneNumbers/any(p: p eq '123-456-7890')", &["any", "eq"], &["phoneNumbers"]),
    (
        "phoneNumbers/any(p: p eq '123-456-7890' or p eq '321-456-7890')",
        &["any", "eq", "or"],
        &["phoneNumbers"],
    ),
    ("socialLogins/any(s: s/name eq 'Facebook')", &["any", "eq"], &["socialLogins/name"]),
    (
        "socialLogins/any(s: s/name eq 'Facebook' or endsWith(s/url, 'google.com'))",
        &["any", "eq", "or", "endsWith"],
        &["socialLogins/name", "socialLogins/url"],
    ),
    ("sponsor/phoneNumbers/any(p: p eq '123-456-7890')", &["any", "eq"], &["sponsor/phoneNumbers"]),
    ("sponsor/socialLogins/any(s: s/name eq 'Facebook')", &["any", "eq"], &["sponsor/socialLogins/name"]),
    ("phoneNumbers/all(p: p eq '123-456-7890')", &["all", "eq"], &["phoneNumbers"]),
    ("socialLogins/all(s: s/name eq 'Facebook')", &["all", "eq"], &["socialLogins/name"]),
    ("sponsor/socialLogins/all(s: s/name eq 'Facebook')", &["all", "eq"], &["sponsor/socialLogins/name"]),
];

#[test]
fn expression_table_yields_expected_names() {
    for (expression, operators, properties) in EXPRESSIONS {
        let tree = FilterExpressionTree::for_entity::<User>(expression)
            .unwrap_or_else(|e| panic!("{}: {:?}", expression, e));

        assert_eq!(tree.expression(), *expression);
        assert!(
            contains_all(tree.operators(), operators),
            "{}: operators {:?}",
            expression,
            tree.operators()
        );
        assert!(
            contains_all(tree.properties(), properties),
            "{}: properties {:?}",
            expression,
            tree.properties()
        );
    }
}

#[test]
fn property_paths_use_declared_names() {
    let tree = FilterExpressionTree::for_entity::<User>("NAME/SURNAME eq 'x' and Type eq 'y'").unwrap();
    assert_eq!(tree.properties(), ["name/surname", "type"]);
}

#[test]
fn duplicates_are_retained() {
    let tree = FilterExpressionTree::for_entity::<User>("email eq 'a' or email eq 'b' or email eq 'c'").unwrap();
    assert_eq!(tree.operators(), ["or", "or", "eq", "eq", "eq"]);
    assert_eq!(tree.properties().len(), 3);
}

#[test]
fn any_without_lambda_counts_collection() {
    let tree = FilterExpressionTree::for_entity::<User>("phoneNumbers/any()").unwrap();
    assert_eq!(tree.operators(), ["any"]);
    assert_eq!(tree.properties(), ["phoneNumbers"]);
}

#[test]
fn invalid_filters_are_wrapped() {
    let cases = [
        "unknownProperty eq 1",
        "email eq",
        "email/length eq 1",
        "socialLogins/name eq 'x'",
        "email eq 'unterminated",
    ];
    for expression in cases {
        let error = FilterExpressionTree::for_entity::<User>(expression).unwrap_err();
        assert_matches!(error, TreeError::Parse { .. }, "{}", expression);
        assert_eq!(error.to_string(), "Cannot parse filter expression");
    }

    assert_matches!(
        FilterExpressionTree::for_entity::<User>("unknownProperty eq 1"),
        Err(TreeError::Parse { source: SyntaxError::UnknownProperty { .. }, .. })
    );
    assert_matches!(
        FilterExpressionTree::for_entity::<User>(""),
        Err(TreeError::EmptyExpression)
    );
}

#[test]
fn classifier_examples() {
    let eq = classify("eq").unwrap();
    assert_eq!((eq.kind, eq.min, eq.max), (NameKind::Operator, 0, 0));

    assert_eq!(classify("o:eq").unwrap().kind, NameKind::Operator);

    let bounded = classify("eq:1,2").unwrap();
    assert_eq!((bounded.kind, bounded.min, bounded.max), (NameKind::Operator, 1, 2));

    assert_eq!(classify("name/givenName").unwrap().kind, NameKind::Property);

    let property = classify("p:name:2").unwrap();
    assert_eq!(
        (property.name.as_str(), property.kind, property.min, property.max),
        ("name", NameKind::Property, 2, 2)
    );
}

#[test]
fn text_rules_match_documented_bounds() {
    let rules = RuleSet::deserialize("eq|and:2|o:ne:1,2|startsWith:1|type:,5|p:name/givenName:2,").unwrap();

    assert_eq!(rules.operator("ne"), Some(&OccurrenceBound::new(1, 2)));
    assert_eq!(rules.operator("startsWith"), Some(&OccurrenceBound::new(1, 1)));
    assert_eq!(rules.property("type"), Some(&OccurrenceBound::new(0, 5)));
    assert_eq!(rules.property("name/givenName"), Some(&OccurrenceBound::new(2, 0)));

    let reparsed = RuleSet::deserialize(&rules.to_json()).unwrap();
    assert_eq!(reparsed, rules);
}

#[test]
fn required_operators_are_enforced() {
    let validator = FilterValidator::for_entity::<User>("enabled eq true and enabled", "eq:1|and:2").unwrap();
    assert!(!validator.passed());
    assert_eq!(validator.violations().len(), 1);
    assert_eq!(
        validator.details(),
        "The operator 'and' occurs 1 time(s) but at least 2 required."
    );
}

const DEMO_FILTER: &str =
    "Type eq 'Employee' and startsWith(name/givenName, 'john') and name/givenName ne 'Johnson'";

#[test]
fn demo_rule_sets() {
    let cases: &[(&str, bool)] = &[
        (
            r#"{"Operators":{"eq":null,"and":null,"ne":null,"startsWith":null},"Properties":{"type":null,"name/givenName":null}}"#,
            true,
        ),
        (
            r#"{"Operators":{"eq":{"min":1},"and":null,"ne":null,"startsWith":null},"Properties":{"type":{"min":1},"name/givenName":{"min":1}}}"#,
            true,
        ),
        (
            r#"{"Operators":{"eq":null,"and":null,"ne":null,"endsWith":null},"Properties":{"type":null,"name/givenName":null}}"#,
            true,
        ),
        ("eq|and|ne|startsWith|type|name/givenName", true),
        ("eq|and|ne|startsWith|type:,5|name/givenName", true),
        ("eq|and:2|o:ne:1,2|startsWith:1|type:,5|p:name/givenName:2,", true),
        ("eq|and:3|o:ne:1,2|startsWith:1|type:,5|p:name/givenName:3,", false),
        ("eq:,1|and", true),
        ("and:,1", false),
    ];

    for (rules, expected) in cases {
        let validator = FilterValidator::for_entity::<User>(DEMO_FILTER, rules).unwrap();
        assert_eq!(validator.passed(), *expected, "{}: {}", rules, validator.details());
        assert_eq!(validator.details().is_empty(), *expected);
    }
}

#[test]
fn strict_mode_rejects_unlisted_names() {
    let model = User::entity_model().unwrap();
    let rules = r#"{"Operators":{"eq":null,"and":null,"ne":null,"endsWith":null},"Properties":{"type":null,"name/givenName":null}}"#;

    let validator = FilterValidator::with_mode(DEMO_FILTER, rules, &model, ValidationMode::Strict).unwrap();
    assert!(!validator.passed());
    assert_eq!(validator.violations().len(), 1);
    assert_eq!(validator.violations()[0].kind, ViolationKind::Unlisted);
    assert_eq!(validator.violations()[0].name, "startswith");
}

#[test]
fn validator_errors() {
    assert_matches!(
        FilterValidator::for_entity::<User>("email eq", "eq"),
        Err(ValidatorError::Tree(TreeError::Parse { .. }))
    );
    assert_matches!(
        FilterValidator::for_entity::<User>("email eq null", "o:eq:x"),
        Err(ValidatorError::Rules(RuleError::Text { .. }))
    );
    assert_matches!(
        FilterValidator::for_entity::<User>("email eq null", "{\"Operators\": 5}"),
        Err(ValidatorError::Rules(RuleError::Json { .. }))
    );
}

#[test]
fn model_from_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "entity": "User",
            "namespace": "Sample",
            "types": {{
                "User": {{ "email": "Edm.String", "sponsor": "User", "tags": ["Edm.String"] }}
            }}
        }}"#
    )
    .unwrap();

    let model = EntityModel::from_file(file.path()).unwrap();
    let validator = FilterValidator::new(
        "sponsor/email eq 'x' and tags/any(t: t eq 'vip')",
        "p:sponsor/email:1|p:tags:1",
        &model,
    )
    .unwrap();

    assert!(validator.passed(), "{}", validator.details());
    assert_eq!(
        validator.tree().format_schema(),
        "ODATA SCHEMA ELEMENTS:\n- Sample.User: EntityType\n- Default.Container: EntityContainer"
    );
}

#[test]
fn untyped_trees_keep_paths_as_written() {
    let tree = FilterExpressionTree::untyped("Orders/any(o: o/Total gt 100)").unwrap();
    assert_eq!(tree.properties(), ["Orders/Total"]);
}
