use serde_json::json;

use reckoner::request::{
    ArithmeticOp, CalculationRequest, Category, OptionKind, ValidationError,
};

#[test]
fn arithmetic_parse_is_case_insensitive() {
    for kind in ["addition", "ADDITION", "Addition"] {
        let request = CalculationRequest::from_payload(kind, &json!([1, 2])).unwrap();
        assert!(matches!(
            request,
            CalculationRequest::Arithmetic {
                op: ArithmeticOp::Addition,
                ..
            }
        ));
    }
}

#[test]
fn unrecognized_operation_is_rejected() {
    let err = CalculationRequest::from_payload("modulo", &json!([10, 2])).unwrap_err();
    assert_eq!(err, ValidationError::UnknownOperation("modulo".to_string()));
}

#[test]
fn arithmetic_inputs_must_be_a_list_of_numbers() {
    let err = CalculationRequest::from_payload("addition", &json!(5)).unwrap_err();
    assert_eq!(err, ValidationError::InvalidInputs);

    let err = CalculationRequest::from_payload("addition", &json!({"a": 1})).unwrap_err();
    assert_eq!(err, ValidationError::InvalidInputs);

    let err = CalculationRequest::from_payload("addition", &json!([1, "two"])).unwrap_err();
    assert_eq!(err, ValidationError::InvalidInputs);
}

#[test]
fn arithmetic_needs_at_least_two_inputs() {
    let err = CalculationRequest::from_payload("addition", &json!([1])).unwrap_err();
    assert_eq!(err, ValidationError::InsufficientOperands);
}

#[test]
fn division_by_zero_is_caught_at_validation() {
    let err = CalculationRequest::from_payload("division", &json!([10, 0])).unwrap_err();
    assert_eq!(err, ValidationError::DivisionByZero);

    // Zero numerator is fine; only divisor positions are checked.
    CalculationRequest::from_payload("division", &json!([0, 5])).unwrap();
    CalculationRequest::from_payload("division", &json!([100, 2])).unwrap();
}

#[test]
fn division_checks_every_divisor_position() {
    let err = CalculationRequest::from_payload("division", &json!([100, 2, 0, 5])).unwrap_err();
    assert_eq!(err, ValidationError::DivisionByZero);
}

#[test]
fn bond_payload_parses_with_default_frequency() {
    let request = CalculationRequest::from_payload(
        "bond",
        &json!({"face": 1000, "coupon": 0.05, "market": 0.04, "years": 10}),
    )
    .unwrap();

    match request {
        CalculationRequest::Bond(terms) => {
            assert_eq!(terms.face, 1000.0);
            assert_eq!(terms.coupon, 0.05);
            assert_eq!(terms.frequency, 2.0);
        }
        other => panic!("expected bond request, got {other:?}"),
    }
}

#[test]
fn bond_payload_missing_field_is_rejected() {
    let err = CalculationRequest::from_payload(
        "bond",
        &json!({"coupon": 0.05, "market": 0.04, "years": 10}),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::MissingField("face"));
}

#[test]
fn bond_non_numeric_field_is_rejected() {
    let err = CalculationRequest::from_payload(
        "bond",
        &json!({"face": "lots", "coupon": 0.05, "market": 0.04, "years": 10}),
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::MissingField("face"));
}

#[test]
fn category_tag_is_case_insensitive() {
    let payload = json!({
        "equity": 100, "debt": 100,
        "cost_of_equity": 0.10, "cost_of_debt": 0.0, "tax_rate": 0.0
    });
    let request = CalculationRequest::from_payload("WACC", &payload).unwrap();
    assert_eq!(request.category(), Category::Wacc);
}

#[test]
fn option_kind_parses_case_insensitively() {
    let payload = json!({
        "spot": 100, "strike": 95, "time": 0.5,
        "rate": 0.02, "volatility": 0.2, "kind": "CALL"
    });
    let request = CalculationRequest::from_payload("option", &payload).unwrap();
    match request {
        CalculationRequest::Option(terms) => assert_eq!(terms.kind, OptionKind::Call),
        other => panic!("expected option request, got {other:?}"),
    }
}

#[test]
fn option_unknown_kind_is_rejected() {
    let payload = json!({
        "spot": 100, "strike": 95, "time": 0.5,
        "rate": 0.02, "volatility": 0.2, "kind": "straddle"
    });
    let err = CalculationRequest::from_payload("option", &payload).unwrap_err();
    assert_eq!(
        err,
        ValidationError::UnknownOptionKind("straddle".to_string())
    );
}

#[test]
fn npv_payload_parses_flows() {
    let request =
        CalculationRequest::from_payload("npv", &json!({"rate": 0.08, "flows": [100, 200, 300]}))
            .unwrap();
    match request {
        CalculationRequest::Npv(terms) => {
            assert_eq!(terms.rate, 0.08);
            assert_eq!(terms.flows, vec![100.0, 200.0, 300.0]);
        }
        other => panic!("expected npv request, got {other:?}"),
    }
}

#[test]
fn npv_requires_at_least_one_flow() {
    let err = CalculationRequest::from_payload("npv", &json!({"rate": 0.08, "flows": []}))
        .unwrap_err();
    assert_eq!(err, ValidationError::InvalidInputs);
}

#[test]
fn request_round_trips_through_json() {
    let request = CalculationRequest::from_payload("subtraction", &json!([42, 7])).unwrap();
    let text = serde_json::to_string(&request).unwrap();
    let back: CalculationRequest = serde_json::from_str(&text).unwrap();
    assert_eq!(back, request);
}
