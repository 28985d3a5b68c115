//! Parameterized tests for the unit and value normalization engine

use bacnet_mirror_rust::model::{
    ObjectEntry, ObjectId, ObjectType, PresentValue, StatusFlags,
};
use bacnet_mirror_rust::normalize::{
    decimal_places, display_value, DisplayValue, StateLabel,
};
use bacnet_mirror_rust::units::{infer_device_class, map_unit, default_class_units, DeviceClass, DisplayUnit};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn entry(object_type: ObjectType, present_value: PresentValue) -> ObjectEntry {
    ObjectEntry {
        object_identifier: ObjectId::new(object_type, 1),
        object_name: "point".to_string(),
        description: String::new(),
        present_value,
        status_flags: StatusFlags::default(),
        event_state: "normal".to_string(),
        reliability: None,
        out_of_service: false,
        units: None,
        resolution: None,
        cov_increment: None,
        state_text: None,
        vendor_name: None,
        model_name: None,
    }
}

#[rstest]
#[case("degreesCelsius", Some(DisplayUnit::Celsius))]
#[case("degreesFahrenheit", Some(DisplayUnit::Fahrenheit))]
#[case("percent", Some(DisplayUnit::Percentage))]
#[case("percentRelativeHumidity", Some(DisplayUnit::Percentage))]
#[case("kilowattHours", Some(DisplayUnit::KilowattHour))]
#[case("pascals", Some(DisplayUnit::Pascal))]
#[case("luxes", Some(DisplayUnit::Lux))]
#[case("partsPerMillion", Some(DisplayUnit::PartsPerMillion))]
#[case("ampereSeconds", None)]
#[case("currency1", None)]
#[case("noUnits", None)]
#[case("powerFactor", None)]
#[case("pH", None)]
#[case("", None)]
fn unit_mapping_is_total_and_deterministic(
    #[case] unit_in: &str,
    #[case] expected: Option<DisplayUnit>,
) {
    assert_eq!(map_unit(unit_in), expected);
    // Deterministic: a second call gives the same answer
    assert_eq!(map_unit(unit_in), expected);
}

#[rstest]
#[case("degreesCelsius", Some(DeviceClass::Temperature))]
#[case("degreesKelvin", Some(DeviceClass::Temperature))]
#[case("kilowattHours", Some(DeviceClass::Energy))]
#[case("amperes", Some(DeviceClass::Current))]
#[case("luxes", Some(DeviceClass::Illuminance))]
#[case("wattsPerSquareMeter", Some(DeviceClass::Irradiance))]
#[case("percentRelativeHumidity", Some(DeviceClass::Humidity))]
#[case("radians", None)]
#[case("bogus", None)]
fn device_class_inference(#[case] unit_in: &str, #[case] expected: Option<DeviceClass>) {
    assert_eq!(infer_device_class(unit_in, default_class_units()), expected);
}

#[rstest]
#[case(0.1, 1)]
#[case(0.01, 2)]
#[case(0.001, 3)]
#[case(0.25, 1)]
#[case(0.025, 2)]
fn decimal_places_cases(#[case] step: f64, #[case] expected: u32) {
    assert_eq!(decimal_places(step).unwrap(), expected);
}

#[test]
fn decimal_places_zero_is_invalid() {
    assert!(decimal_places(0.0).is_err());
}

#[test]
fn analog_display_value_rounds_and_tags_unit() {
    let mut e = entry(ObjectType::AnalogInput, PresentValue::Numeric(21.4567));
    e.units = Some("degreesCelsius".to_string());
    e.resolution = Some(0.01);
    assert_eq!(
        display_value(&e),
        DisplayValue::Numeric {
            value: 21.46,
            unit: Some(DisplayUnit::Celsius)
        }
    );
    assert_eq!(display_value(&e).to_string(), "21.46 °C");

    // Resolution >= 1 truncates; missing resolution defaults to one decimal
    e.resolution = Some(1.0);
    assert_eq!(
        display_value(&e),
        DisplayValue::Numeric {
            value: 21.0,
            unit: Some(DisplayUnit::Celsius)
        }
    );
    e.resolution = None;
    assert_eq!(
        display_value(&e),
        DisplayValue::Numeric {
            value: 21.5,
            unit: Some(DisplayUnit::Celsius)
        }
    );
}

#[test]
fn analog_display_value_without_unit_shows_raw_number() {
    let mut e = entry(ObjectType::AnalogValue, PresentValue::Numeric(3.14159));
    e.units = Some("ampereSquareMeters".to_string());
    assert_eq!(
        display_value(&e),
        DisplayValue::Numeric {
            value: 3.1,
            unit: None
        }
    );
}

#[test]
fn multi_state_display_value_uses_state_text() {
    let mut e = entry(ObjectType::MultiStateInput, PresentValue::MultiState(3));
    e.state_text = Some(
        ["Off", "Low", "Medium", "High"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    assert_eq!(
        display_value(&e),
        DisplayValue::State(StateLabel::Named("Medium".to_string()))
    );

    // Absent state text falls back to the raw integer
    e.state_text = None;
    assert_eq!(display_value(&e), DisplayValue::State(StateLabel::Raw(3)));
}

#[test]
fn binary_display_value() {
    let e = entry(ObjectType::BinaryInput, PresentValue::Binary(true));
    assert_eq!(display_value(&e), DisplayValue::Binary(true));
    assert_eq!(display_value(&e).to_string(), "active");
}

#[test]
fn unexplained_value_is_presented_raw() {
    let e = entry(
        ObjectType::AnalogInput,
        PresentValue::Unknown(serde_json::json!("stale")),
    );
    assert_eq!(
        display_value(&e),
        DisplayValue::Raw(serde_json::json!("stale"))
    );
}
