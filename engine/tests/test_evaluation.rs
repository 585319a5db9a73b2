//! FILENAME: tests/test_evaluation.rs
//! Integration tests for formula evaluation against an inspection plan.

mod common;

use charformula_engine::parser::{PathResolver, SegmentKind};
use charformula_engine::{
    AttributeValue, Evaluator, FormulaInterpreter, Path, PathSegment, ValueLookup,
};
use chrono::{DateTime, TimeZone, Utc};
use common::{assert_close, ch, TestPlan};

// ============================================================================
// ARITHMETIC
// ============================================================================

#[test]
fn test_precedence_and_associativity() {
    let plan = TestPlan::new();
    assert_eq!(plan.evaluate_formula("1 + 2"), Ok(Some(3.0)));
    assert_eq!(plan.evaluate_formula("(1+2)*3"), Ok(Some(9.0)));
    assert_eq!(plan.evaluate_formula("1+2*3"), Ok(Some(7.0)));
    assert_eq!(plan.evaluate_formula("2 * (3 + 4) - 10 / 5"), Ok(Some(12.0)));
}

#[test]
fn test_negation_propagates_null() {
    let plan = TestPlan::new().with_value(ch("Y"), 4.0);
    assert_eq!(plan.evaluate_formula("-5"), Ok(Some(-5.0)));
    assert_eq!(plan.evaluate_formula("-{Y}"), Ok(Some(-4.0)));
    assert_eq!(plan.evaluate_formula("-{X}"), Ok(None));
    assert_eq!(plan.evaluate_formula("+{Y}"), Ok(Some(4.0)));
}

#[test]
fn test_constants() {
    let plan = TestPlan::new();
    assert_close(plan.evaluate_formula("PI"), std::f64::consts::PI);
    assert_close(plan.evaluate_formula("e"), std::f64::consts::E);
    assert_close(plan.evaluate_formula("sin(PI / 2)"), 1.0);
}

#[test]
fn test_division_by_zero_has_no_value() {
    let plan = TestPlan::new().with_value(ch("Zero"), 0.0);
    assert_eq!(plan.evaluate_formula("1 / {Zero}"), Ok(None));
    assert_eq!(plan.evaluate_formula("ifnull(1 / {Zero}; -1)"), Ok(Some(-1.0)));
}

// ============================================================================
// CALCULATED CHARACTERISTICS
// ============================================================================

fn chain_plan() -> TestPlan {
    TestPlan::new()
        .with_formula(ch("char1"), "1 + 2")
        .with_formula(ch("char2"), "{char1} + {Char3}")
        .with_value(ch("Char3"), 5.0)
}

#[test]
fn test_nested_characteristics() {
    let plan = chain_plan();
    assert_eq!(plan.evaluate(&ch("char1")), Ok(Some(3.0)));
    assert_eq!(plan.evaluate(&ch("char2")), Ok(Some(8.0)));
    assert_eq!(plan.evaluate(&ch("Char3")), Ok(Some(5.0)));
}

#[test]
fn test_deep_chain() {
    let plan = chain_plan()
        .with_formula(ch("char4"), "{char2} * 2")
        .with_formula(ch("char5"), "{char4} - {char1}");
    assert_eq!(plan.evaluate(&ch("char5")), Ok(Some(13.0)));
}

#[test]
fn test_missing_measurement_propagates() {
    let plan = TestPlan::new()
        .with_formula(ch("a"), "{missing} * 2")
        .with_formula(ch("b"), "{a} + 1");
    assert_eq!(plan.evaluate(&ch("b")), Ok(None));
}

#[test]
fn test_relative_reference_across_parts() {
    let owner = Path::characteristic(&["Engine", "Block"], "Bore");
    let depth = Path::characteristic(&["Engine", "Block"], "Depth");
    let plan = TestPlan::new()
        .with_value(depth, 0.25)
        .with_formula(owner.clone(), "{../Block/Depth} * 4");
    assert_eq!(plan.evaluate(&owner), Ok(Some(1.0)));
}

#[test]
fn test_quoted_segment_names() {
    let plan = TestPlan::new().with_value(ch("Bore 1 (max)"), 7.0);
    assert_eq!(plan.evaluate_formula("{\"Bore 1 (max)\"} + 1"), Ok(Some(8.0)));
}

#[test]
fn test_unparsable_nested_formula_degrades_to_null() {
    let plan = TestPlan::new()
        .with_formula(ch("bad"), "1 + )")
        .with_formula(ch("good"), "ifnull({bad}; 10) + 1");
    assert_eq!(plan.evaluate(&ch("good")), Ok(Some(11.0)));
    assert!(plan.evaluate(&ch("bad")).unwrap_err().is_syntax());
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

#[test]
fn test_attribute_reference() {
    let plan = TestPlan::new()
        .with_value(ch("Char1"), 100.0)
        .with_attribute(ch("Char1"), 17, AttributeValue::Float(2.5))
        .with_attribute(ch("Char1"), 18, AttributeValue::Text("mm".to_string()));

    assert_eq!(plan.evaluate_formula("{Char1(17)}"), Ok(Some(2.5)));
    assert_eq!(plan.evaluate_formula("{Char1(18)}"), Ok(None));
    assert_eq!(plan.evaluate_formula("{Char1} + {Char1(17)}"), Ok(Some(102.5)));
}

/// Attribute source that reports the timestamp it was asked for.
struct DatedAttributes;

impl ValueLookup for DatedAttributes {
    fn measurement_value(&self, _path: &Path) -> Option<f64> {
        None
    }

    fn attribute_value(
        &self,
        _path: &Path,
        _key: u16,
        timestamp: Option<DateTime<Utc>>,
    ) -> Option<AttributeValue> {
        timestamp.map(|t| AttributeValue::Integer(t.timestamp()))
    }
}

#[test]
fn test_attribute_timestamp_is_forwarded() {
    let plan = TestPlan::new();
    let interpreter = FormulaInterpreter::new();
    let compiled = plan.compile("{Char1(1)}", &ch("Owner"));
    let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let undated = Evaluator::new(&interpreter, &plan, &DatedAttributes);
    assert_eq!(undated.evaluate(&compiled), Ok(None));

    let dated = Evaluator::new(&interpreter, &plan, &DatedAttributes).at(when);
    assert_eq!(dated.evaluate(&compiled), Ok(Some(when.timestamp() as f64)));
}

// ============================================================================
// BUILT-IN FUNCTIONS
// ============================================================================

#[test]
fn test_math_functions() {
    let plan = TestPlan::new();
    assert_eq!(plan.evaluate_formula("abs(-3)"), Ok(Some(3.0)));
    assert_eq!(plan.evaluate_formula("sign(-0.5)"), Ok(Some(-1.0)));
    assert_eq!(plan.evaluate_formula("sqr(3)"), Ok(Some(9.0)));
    assert_eq!(plan.evaluate_formula("sqrt(16)"), Ok(Some(4.0)));
    assert_eq!(plan.evaluate_formula("floor(-1.5)"), Ok(Some(-2.0)));
    assert_eq!(plan.evaluate_formula("ceiling(1.2)"), Ok(Some(2.0)));
    assert_eq!(plan.evaluate_formula("truncate(-1.7)"), Ok(Some(-1.0)));
    assert_eq!(plan.evaluate_formula("exp(0)"), Ok(Some(1.0)));
    assert_eq!(plan.evaluate_formula("pow(2; 10)"), Ok(Some(1024.0)));
    assert_close(plan.evaluate_formula("log10(1000)"), 3.0);
    assert_close(plan.evaluate_formula("log(8, 2)"), 3.0);
    assert_close(plan.evaluate_formula("atan2(1; 1)"), std::f64::consts::FRAC_PI_4);
    assert_eq!(plan.evaluate_formula("sqrt({Missing})"), Ok(None));
}

#[test]
fn test_round() {
    let plan = TestPlan::new();
    assert_eq!(plan.evaluate_formula("round(2.5)"), Ok(Some(3.0)));
    assert_eq!(plan.evaluate_formula("round(-2.5)"), Ok(Some(-3.0)));
    assert_close(plan.evaluate_formula("round(3.14159; 2)"), 3.14);
    assert_eq!(plan.evaluate_formula("round(1234; -2)"), Ok(Some(1200.0)));
    assert_eq!(plan.evaluate_formula("round(2.4; {Missing})"), Ok(Some(2.0)));
}

#[test]
fn test_aggregations_skip_missing_values() {
    let plan = TestPlan::new();
    assert_eq!(plan.evaluate_formula("max(1; {Missing}; 3)"), Ok(Some(3.0)));
    assert_eq!(plan.evaluate_formula("min(4, 2, {Missing})"), Ok(Some(2.0)));
    assert_eq!(plan.evaluate_formula("mean(1; 2; 6)"), Ok(Some(3.0)));
    assert_eq!(plan.evaluate_formula("median(5; 1; 3)"), Ok(Some(3.0)));
    assert_eq!(plan.evaluate_formula("sum(1; 2; 3)"), Ok(Some(6.0)));
    assert_eq!(plan.evaluate_formula("mean({Missing}; {Other})"), Ok(None));
    assert_close(plan.evaluate_formula("stddev(2; 4; 4; 4; 5; 5; 7; 9)"), 2.138089935299395);
}

#[test]
fn test_count_is_never_null() {
    let plan = TestPlan::new();
    assert_eq!(plan.evaluate_formula("count({Missing}; 1; 2)"), Ok(Some(2.0)));
    assert_eq!(plan.evaluate_formula("count({Missing})"), Ok(Some(0.0)));
    assert_eq!(plan.evaluate_formula("count()"), Ok(Some(0.0)));
}

#[test]
fn test_ifnull_returns_first_value() {
    let plan = TestPlan::new().with_value(ch("B"), 2.0);
    assert_eq!(plan.evaluate_formula("ifnull({A}; {B}; 3)"), Ok(Some(2.0)));
    assert_eq!(plan.evaluate_formula("ifnull({A})"), Ok(None));
}

fn points_plan() -> TestPlan {
    TestPlan::new()
        .with_point(ch("P1"), 0.0, 0.0, 0.0)
        .with_point(ch("P2"), 3.0, 4.0, 12.0)
}

#[test]
fn test_point_distances() {
    let plan = points_plan();
    assert_close(plan.evaluate_formula("pt_dist({P1}; {P2})"), 13.0);
    assert_close(plan.evaluate_formula("pt_dist_xy({P1}; {P2})"), 5.0);
    assert_close(plan.evaluate_formula("pt_dist_xz({P1}; {P2})"), (9.0f64 + 144.0).sqrt());
    assert_close(plan.evaluate_formula("pt_dist_yz({P1}; {P2})"), (16.0f64 + 144.0).sqrt());
}

#[test]
fn test_true_position() {
    let plan = points_plan();
    assert_close(plan.evaluate_formula("position({P2})"), 10.0);
    assert_close(plan.evaluate_formula("position3d({P2})"), 26.0);
}

#[test]
fn test_point_with_missing_coordinate() {
    let flat = ch("Flat");
    let plan = points_plan()
        .with_entity(flat.clone())
        .with_value(flat.child(PathSegment::characteristic("x")), 3.0)
        .with_value(flat.child(PathSegment::characteristic("y")), 4.0);

    assert_eq!(plan.evaluate_formula("pt_dist({P1}; {Flat})"), Ok(None));
    assert_close(plan.evaluate_formula("pt_dist_xy({P1}; {Flat})"), 5.0);
    assert_eq!(plan.evaluate_formula("position(3)"), Ok(None));
}

#[test]
fn test_grade_functions() {
    let grade = ch("Grade");
    let plan = TestPlan::new()
        .with_entity(grade.clone())
        .with_value(grade.child(PathSegment::characteristic("G1")), 2.0)
        .with_value(grade.child(PathSegment::characteristic("G2")), 8.0)
        .with_formula(grade.child(PathSegment::characteristic("G3")), "{G1} + {G2}")
        .with_entity(grade.child(PathSegment::characteristic("Unmeasured")));

    assert_eq!(plan.evaluate_formula("grade_max({Grade})"), Ok(Some(10.0)));
    assert_eq!(plan.evaluate_formula("grade_min({Grade})"), Ok(Some(2.0)));
    assert_eq!(plan.evaluate_formula("grade_mean({Grade})"), Ok(Some(20.0 / 3.0)));
    assert_eq!(plan.evaluate_formula("grade_max({Empty})"), Ok(None));
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Resolves every reference to a characteristic directly below `/Flat`.
struct FlatResolver;

impl PathResolver for FlatResolver {
    fn resolve(&self, raw: &str) -> Option<Path> {
        Some(Path::from_segments([
            PathSegment::new(SegmentKind::Part, "Flat"),
            PathSegment::characteristic(raw.trim()),
        ]))
    }
}

#[test]
fn test_custom_path_resolver_factory() {
    let plan = TestPlan::new().with_value(Path::characteristic(&["Flat"], "Width"), 3.0);
    let interpreter = FormulaInterpreter::new()
        .with_path_resolver_factory(|_anchor: &Path| -> Box<dyn PathResolver> { Box::new(FlatResolver) });

    let compiled = interpreter
        .parse("{Width} * 2", &Path::characteristic(&["Deep", "Nested"], "Owner"))
        .unwrap();
    let evaluator = Evaluator::new(&interpreter, &plan, &plan);
    assert_eq!(evaluator.evaluate(&compiled), Ok(Some(6.0)));
}
