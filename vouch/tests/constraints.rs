//! Catalogue constraints, element constraints and cascading through derived beans.

mod support;

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use vouch::testing::{assert_no_violations, assert_that, violation_of};
use vouch::{ConstraintKind, ConstraintTarget, FixedClock, Observed, Validate, ValidationError, Validator};

#[derive(Debug, Clone, Validate)]
pub struct Profile {
    #[validate(not_null)]
    pub nickname: Option<String>,
    #[validate(null)]
    pub legacy_id: Option<u32>,
    #[validate(not_empty, size(min = 2, max = 8))]
    pub handle: String,
    #[validate(assert_true)]
    pub accepted_terms: bool,
    #[validate(assert_false)]
    pub banned: bool,
    #[validate(positive_or_zero)]
    pub followers: i64,
    #[validate(negative)]
    pub offset: f64,
    #[validate(negative_or_zero)]
    pub debt: i32,
    #[validate(min = 18, max = 130)]
    pub age: u8,
    #[validate(range(min = -10, max = 10))]
    pub rating: i16,
    #[validate(pattern(regexp = "[a-z]+-\\d{2}", case_insensitive))]
    pub code: String,
    #[validate(email)]
    pub email: String,
    #[validate(url)]
    pub homepage: Option<String>,
    #[validate(uuid)]
    pub external_id: String,
}

fn valid_profile() -> Profile {
    Profile {
        nickname: Some("ada".into()),
        legacy_id: None,
        handle: "ada".into(),
        accepted_terms: true,
        banned: false,
        followers: 0,
        offset: -0.5,
        debt: 0,
        age: 36,
        rating: -10,
        code: "ABC-42".into(),
        email: "ada@example.com".into(),
        homepage: Some("https://example.com/ada".into()),
        external_id: "67e55044-10b1-426f-9247-bb680e5fe0c8".into(),
    }
}

#[test]
fn valid_profile_has_no_violations() -> anyhow::Result<()> {
    assert_no_violations(&support::validator().validate(&valid_profile())?);
    Ok(())
}

#[test]
fn every_catalogue_constraint_reports_its_violation() -> anyhow::Result<()> {
    let invalid = Profile {
        nickname: None,
        legacy_id: Some(7),
        handle: "a".into(),
        accepted_terms: false,
        banned: true,
        followers: -1,
        offset: 0.0,
        debt: 1,
        age: 17,
        rating: 11,
        code: "abc_42".into(),
        email: "not an email".into(),
        homepage: Some("example dot com".into()),
        external_id: "1234".into(),
    };
    let violations = support::validator().validate(&invalid)?;
    assert_that(&violations).contains_only_violations([
        violation_of(ConstraintKind::NotNull).with_property("nickname").with_message("must not be null"),
        violation_of(ConstraintKind::Null).with_property("legacy_id").with_message("must be null"),
        violation_of(ConstraintKind::Size)
            .with_property("handle")
            .with_message("size must be between 2 and 8"),
        violation_of(ConstraintKind::AssertTrue).with_property("accepted_terms"),
        violation_of(ConstraintKind::AssertFalse).with_property("banned"),
        violation_of(ConstraintKind::PositiveOrZero).with_property("followers"),
        violation_of(ConstraintKind::Negative).with_property("offset"),
        violation_of(ConstraintKind::NegativeOrZero).with_property("debt"),
        violation_of(ConstraintKind::Min)
            .with_property("age")
            .with_message("must be greater than or equal to 18"),
        violation_of(ConstraintKind::Range)
            .with_property("rating")
            .with_message("must be between -10 and 10"),
        violation_of(ConstraintKind::Pattern)
            .with_property("code")
            .with_message("must match \"[a-z]+-\\d{2}\""),
        violation_of(ConstraintKind::Email).with_property("email"),
        violation_of(ConstraintKind::Url).with_property("homepage"),
        violation_of(ConstraintKind::Uuid).with_property("external_id"),
    ]);
    Ok(())
}

#[test]
fn empty_text_is_only_rejected_by_emptiness_checks() -> anyhow::Result<()> {
    let profile = Profile {
        handle: String::new(),
        email: String::new(),
        homepage: None,
        external_id: String::new(),
        ..valid_profile()
    };
    let violations = support::validator().validate(&profile)?;
    assert_that(&violations).contains_only_violations([
        violation_of(ConstraintKind::NotEmpty).with_property("handle"),
        violation_of(ConstraintKind::Size).with_property("handle"),
    ]);
    Ok(())
}

#[test]
fn nan_fails_numeric_constraints() -> anyhow::Result<()> {
    let profile = Profile {
        offset: f64::NAN,
        ..valid_profile()
    };
    let violations = support::validator().validate(&profile)?;
    assert_that(&violations).contains_only_violations([violation_of(ConstraintKind::Negative).with_property("offset")]);
    Ok(())
}

#[derive(Debug, Validate)]
pub struct Schedule {
    #[validate(past)]
    pub created: NaiveDate,
    #[validate(past_or_present)]
    pub updated: DateTime<Utc>,
    #[validate(future)]
    pub expires: Option<DateTime<Utc>>,
    #[validate(future_or_present)]
    pub review: NaiveDate,
}

#[test]
fn temporal_constraints_follow_the_clock() -> anyhow::Result<()> {
    let now = support::fixed_now();
    let today = now.date_naive();
    let validator = support::validator();

    let valid = Schedule {
        created: today - TimeDelta::days(1),
        updated: now,
        expires: Some(now + TimeDelta::seconds(1)),
        review: today,
    };
    assert_no_violations(&validator.validate(&valid)?);

    let invalid = Schedule {
        created: today,
        updated: now + TimeDelta::seconds(1),
        expires: Some(now),
        review: today - TimeDelta::days(1),
    };
    assert_that(&validator.validate(&invalid)?).contains_only_violations([
        violation_of(ConstraintKind::Past).with_property("created"),
        violation_of(ConstraintKind::PastOrPresent).with_property("updated"),
        violation_of(ConstraintKind::Future).with_property("expires"),
        violation_of(ConstraintKind::FutureOrPresent).with_property("review"),
    ]);
    Ok(())
}

#[test]
fn temporal_tolerance_accepts_near_misses() -> anyhow::Result<()> {
    support::init_logging();
    let now = support::fixed_now();
    let validator = Validator::builder()
        .clock(FixedClock::new(now))
        .temporal_tolerance(Duration::from_secs(5))
        .build();
    let schedule = Schedule {
        created: now.date_naive() - TimeDelta::days(1),
        updated: now + TimeDelta::seconds(3),
        expires: Some(now - TimeDelta::seconds(3)),
        review: now.date_naive(),
    };
    assert_no_violations(&validator.validate(&schedule)?);
    Ok(())
}

#[test]
fn oversized_tolerance_saturates_instead_of_overflowing() -> anyhow::Result<()> {
    support::init_logging();
    let now = support::fixed_now();
    let validator = Validator::builder()
        .clock(FixedClock::new(now))
        .temporal_tolerance(Duration::from_millis(u64::MAX))
        .build();
    let schedule = Schedule {
        created: now.date_naive() - TimeDelta::days(1),
        updated: now + TimeDelta::days(365),
        expires: Some(now - TimeDelta::days(365)),
        review: now.date_naive(),
    };
    assert_no_violations(&validator.validate(&schedule)?);
    Ok(())
}

#[derive(Debug, Validate)]
pub struct Address {
    #[validate(not_blank)]
    pub city: String,
    #[validate(size(max = 10))]
    pub postcode: Option<String>,
}

#[derive(Debug, Validate)]
pub struct Customer {
    #[validate(nested)]
    pub billing: Address,
    #[validate(nested)]
    pub shipping: Option<Address>,
    #[validate(nested, size(max = 2))]
    pub previous: Vec<Address>,
    #[validate(each(not_blank, size(max = 5)))]
    pub tags: Vec<String>,
    #[validate(each(positive))]
    pub scores: BTreeMap<String, i32>,
    #[validate(each(email))]
    pub aliases: HashSet<String>,
}

fn address(city: &str) -> Address {
    Address {
        city: city.into(),
        postcode: None,
    }
}

#[test]
fn cascaded_and_element_paths_are_rendered() -> anyhow::Result<()> {
    let customer = Customer {
        billing: address(""),
        shipping: Some(Address {
            city: "Paris".into(),
            postcode: Some("75001-75002-75003".into()),
        }),
        previous: vec![address("Oslo"), address(" "), address("Rome")],
        tags: vec!["vip".into(), "longer-than-five".into(), " ".into()],
        scores: BTreeMap::from([("alice".to_string(), 3), ("bob".to_string(), 0)]),
        aliases: HashSet::from(["broken".to_string()]),
    };
    let violations = support::validator().validate(&customer)?;
    assert_that(&violations).contains_only_violations([
        violation_of(ConstraintKind::NotBlank).with_property("billing.city"),
        violation_of(ConstraintKind::Size).with_property("shipping.postcode"),
        violation_of(ConstraintKind::Size).with_property("previous"),
        violation_of(ConstraintKind::NotBlank).with_property("previous[1].city"),
        violation_of(ConstraintKind::Size).with_property("tags[1]"),
        violation_of(ConstraintKind::NotBlank).with_property("tags[2]"),
        violation_of(ConstraintKind::Positive).with_property("scores[bob]"),
        violation_of(ConstraintKind::Email).with_property("aliases[]"),
    ]);
    Ok(())
}

#[test]
fn absent_nested_beans_are_skipped() -> anyhow::Result<()> {
    let customer = Customer {
        billing: address("Lyon"),
        shipping: None,
        previous: Vec::new(),
        tags: Vec::new(),
        scores: BTreeMap::new(),
        aliases: HashSet::new(),
    };
    assert_no_violations(&support::validator().validate(&customer)?);
    Ok(())
}

#[test]
fn fail_fast_stops_inside_nested_beans() -> anyhow::Result<()> {
    support::init_logging();
    let validator = Validator::builder().fail_fast(true).build();
    let customer = Customer {
        billing: address(""),
        shipping: Some(address("")),
        previous: vec![address("")],
        tags: vec![String::new()],
        scores: BTreeMap::new(),
        aliases: HashSet::new(),
    };
    let violations = validator.validate(&customer)?;
    assert_that(&violations).contains_only_violations([violation_of(ConstraintKind::NotBlank).with_property("billing.city")]);
    Ok(())
}

#[derive(Debug, Validate)]
pub struct Greeting {
    #[validate(size(min = 3, message = "'{validatedValue}' must have at least {min} characters"))]
    pub text: String,
    #[validate(max(value = 3, message = "{custom.too_many}"))]
    pub repeats: u32,
}

#[test]
fn messages_interpolate_attributes_and_value() -> anyhow::Result<()> {
    let greeting = Greeting {
        text: "hi".into(),
        repeats: 1,
    };
    let violations = support::validator().validate(&greeting)?;
    assert_that(&violations)
        .contains_only_violations([violation_of(ConstraintKind::Size).with_message("'hi' must have at least 3 characters")]);
    Ok(())
}

#[test]
fn catalog_overrides_apply_to_templates() -> anyhow::Result<()> {
    support::init_logging();
    let validator = Validator::builder()
        .message("custom.too_many", "at most {value} repeats")
        .message("vouch.constraints.Size.message", "length outside {min}..{max}")
        .build();
    let greeting = Greeting {
        text: "hi".into(),
        repeats: 9,
    };
    let violations = validator.validate(&greeting)?;
    assert_that(&violations).contains_only_violations([
        violation_of(ConstraintKind::Size).with_message("'hi' must have at least 3 characters"),
        violation_of(ConstraintKind::Max).with_message("at most 3 repeats"),
    ]);

    let handle_only = Profile {
        handle: "a".into(),
        ..valid_profile()
    };
    let violations = validator.validate(&handle_only)?;
    assert_that(&violations).contains_only_violations([
        violation_of(ConstraintKind::Size).with_message("length outside 2..8")
    ]);
    Ok(())
}

/// A type the macros know nothing about; it reports itself as opaque.
#[derive(Debug)]
pub struct Money(pub i64);

impl ConstraintTarget for Money {
    fn observe(&self) -> Observed<'_> {
        Observed::Opaque("Money")
    }
}

#[derive(Debug, Validate)]
pub struct Order {
    #[validate(not_null, positive)]
    pub total: Money,
}

#[test]
fn unsupported_value_kinds_are_engine_errors() {
    let err = support::validator()
        .validate(&Order { total: Money(10) })
        .expect_err("positive cannot judge an opaque value");
    match err {
        ValidationError::UnexpectedType { constraint, path, .. } => {
            assert_eq!(constraint, ConstraintKind::Positive);
            assert_eq!(path, "total");
        }
        other => panic!("unexpected error: {other}"),
    }
}
