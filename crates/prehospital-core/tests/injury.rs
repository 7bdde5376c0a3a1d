use prehospital_core::error::CoreError;
use prehospital_core::models::injury::{
    BodyView, InjuryListField, InjuryMarker, InjuryType, validate_injuries,
};

fn marker(number: u32, x: f64, y: f64) -> InjuryMarker {
    InjuryMarker {
        number,
        injury_type: InjuryType::Contusion,
        view: BodyView::Front,
        x,
        y,
        notes: None,
    }
}

#[test]
fn coordinates_on_the_boundary_are_valid() {
    assert!(marker(1, 0.0, 100.0).validate().is_ok());
    assert!(marker(1, 100.0, 0.0).validate().is_ok());
}

#[test]
fn out_of_range_coordinates_are_rejected() {
    for (x, y) in [(-0.1, 5.0), (5.0, 100.5), (f64::NAN, 5.0), (5.0, f64::INFINITY)] {
        let err = marker(1, x, y).validate().unwrap_err();
        assert!(matches!(err, CoreError::CoordinateOutOfRange { number: 1, .. }));
    }
}

#[test]
fn zero_ordinal_is_rejected() {
    assert!(matches!(
        marker(0, 1.0, 1.0).validate(),
        Err(CoreError::InvalidInjuryNumber(0))
    ));
}

#[test]
fn long_notes_are_rejected() {
    let mut m = marker(4, 1.0, 1.0);
    m.notes = Some("x".repeat(501));
    assert!(matches!(
        m.validate(),
        Err(CoreError::InjuryNotesTooLong { number: 4, .. })
    ));
}

#[test]
fn list_over_the_limit_is_rejected() {
    let list: Vec<_> = (1..=4).map(|n| marker(n, 1.0, 1.0)).collect();
    assert!(validate_injuries(&list, 4).is_ok());
    assert!(matches!(
        validate_injuries(&list, 3),
        Err(CoreError::TooManyInjuries { count: 4, max: 3 })
    ));
}

#[test]
fn duplicate_ordinals_are_rejected() {
    let list = vec![marker(1, 1.0, 1.0), marker(2, 1.0, 1.0), marker(1, 2.0, 2.0)];
    assert!(matches!(
        validate_injuries(&list, 100),
        Err(CoreError::DuplicateInjuryNumber(1))
    ));
}

#[test]
fn field_accepts_encoded_string_or_array() {
    let encoded: InjuryListField = serde_json::from_str(
        r#""[{\"id\":1,\"type\":\"burn\",\"view\":\"back\",\"x\":10,\"y\":20.5,\"notes\":\"\"}]""#,
    )
    .unwrap();
    let decoded = encoded.decode().unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].injury_type, InjuryType::Burn);
    assert_eq!(decoded[0].view, BodyView::Back);
    assert_eq!(decoded[0].y, 20.5);
    assert_eq!(decoded[0].notes, None);

    let array: InjuryListField = serde_json::from_str(
        r#"[{"id":2,"type":"other","view":"front","x":1,"y":2}]"#,
    )
    .unwrap();
    assert_eq!(array.decode().unwrap()[0].number, 2);

    assert!(InjuryListField::Encoded(String::new()).decode().unwrap().is_empty());
    assert!(InjuryListField::Encoded("not json".into()).decode().is_err());
}

#[test]
fn enum_strings_parse() {
    for t in InjuryType::ALL {
        assert_eq!(t.as_str().parse::<InjuryType>().unwrap(), t);
    }
    assert!("bruise".parse::<InjuryType>().is_err());
    assert_eq!("back".parse::<BodyView>().unwrap(), BodyView::Back);
    assert!("side".parse::<BodyView>().is_err());
}
