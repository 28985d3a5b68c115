//! Engineering-unit vocabulary
//!
//! Total, pure mapping from the protocol's engineering-unit identifiers to
//! the display-unit vocabulary, plus device-class inference from the mapped
//! unit. Identifiers without a display counterpart map to `None` and the
//! raw value is shown without a unit.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display units the mirror can present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayUnit {
    // Electric
    Ampere,
    Milliampere,
    Volt,
    Millivolt,
    VoltAmpere,
    VoltAmpereReactive,
    // Power & energy
    Watt,
    KiloWatt,
    BtuPerHour,
    WattHour,
    KilowattHour,
    MegawattHour,
    MegaJoule,
    // Temperature
    Celsius,
    Fahrenheit,
    Kelvin,
    // Pressure
    Pascal,
    Hectopascal,
    Kilopascal,
    Millibar,
    Psi,
    // Frequency
    Hertz,
    Kilohertz,
    Megahertz,
    // Length
    Millimeters,
    Centimeters,
    Meters,
    Kilometers,
    Inches,
    Feet,
    // Precipitation depth
    MillimetersOfWater,
    CentimetersOfWater,
    InchesOfWater,
    // Speed
    MetersPerSecond,
    KilometersPerHour,
    FeetPerSecond,
    MilesPerHour,
    // Volume
    Liters,
    Milliliters,
    CubicMeters,
    CubicFeet,
    Gallons,
    // Volume flow
    CubicMetersPerHour,
    CubicFeetPerMinute,
    LitersPerMinute,
    GallonsPerMinute,
    // Mass
    Grams,
    Milligrams,
    Kilograms,
    Pounds,
    // Time
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
    // Concentration
    MicrogramsPerCubicMeter,
    MilligramsPerCubicMeter,
    PartsPerMillion,
    PartsPerBillion,
    // Misc
    Percentage,
    Degree,
    Lux,
    Decibel,
    WeightedDecibelA,
    RevolutionsPerMinute,
    SquareMeters,
    WattsPerSquareMeter,
}

impl DisplayUnit {
    /// Human symbol for this unit
    pub fn symbol(&self) -> &'static str {
        match self {
            DisplayUnit::Ampere => "A",
            DisplayUnit::Milliampere => "mA",
            DisplayUnit::Volt => "V",
            DisplayUnit::Millivolt => "mV",
            DisplayUnit::VoltAmpere => "VA",
            DisplayUnit::VoltAmpereReactive => "var",
            DisplayUnit::Watt => "W",
            DisplayUnit::KiloWatt => "kW",
            DisplayUnit::BtuPerHour => "BTU/h",
            DisplayUnit::WattHour => "Wh",
            DisplayUnit::KilowattHour => "kWh",
            DisplayUnit::MegawattHour => "MWh",
            DisplayUnit::MegaJoule => "MJ",
            DisplayUnit::Celsius => "°C",
            DisplayUnit::Fahrenheit => "°F",
            DisplayUnit::Kelvin => "K",
            DisplayUnit::Pascal => "Pa",
            DisplayUnit::Hectopascal => "hPa",
            DisplayUnit::Kilopascal => "kPa",
            DisplayUnit::Millibar => "mbar",
            DisplayUnit::Psi => "psi",
            DisplayUnit::Hertz => "Hz",
            DisplayUnit::Kilohertz => "kHz",
            DisplayUnit::Megahertz => "MHz",
            DisplayUnit::Millimeters => "mm",
            DisplayUnit::Centimeters => "cm",
            DisplayUnit::Meters => "m",
            DisplayUnit::Kilometers => "km",
            DisplayUnit::Inches => "in",
            DisplayUnit::Feet => "ft",
            DisplayUnit::MillimetersOfWater => "mm",
            DisplayUnit::CentimetersOfWater => "cm",
            DisplayUnit::InchesOfWater => "in",
            DisplayUnit::MetersPerSecond => "m/s",
            DisplayUnit::KilometersPerHour => "km/h",
            DisplayUnit::FeetPerSecond => "ft/s",
            DisplayUnit::MilesPerHour => "mph",
            DisplayUnit::Liters => "L",
            DisplayUnit::Milliliters => "mL",
            DisplayUnit::CubicMeters => "m³",
            DisplayUnit::CubicFeet => "ft³",
            DisplayUnit::Gallons => "gal",
            DisplayUnit::CubicMetersPerHour => "m³/h",
            DisplayUnit::CubicFeetPerMinute => "ft³/min",
            DisplayUnit::LitersPerMinute => "L/min",
            DisplayUnit::GallonsPerMinute => "gal/min",
            DisplayUnit::Grams => "g",
            DisplayUnit::Milligrams => "mg",
            DisplayUnit::Kilograms => "kg",
            DisplayUnit::Pounds => "lb",
            DisplayUnit::Milliseconds => "ms",
            DisplayUnit::Seconds => "s",
            DisplayUnit::Minutes => "min",
            DisplayUnit::Hours => "h",
            DisplayUnit::Days => "d",
            DisplayUnit::Weeks => "w",
            DisplayUnit::Months => "m",
            DisplayUnit::Years => "y",
            DisplayUnit::MicrogramsPerCubicMeter => "µg/m³",
            DisplayUnit::MilligramsPerCubicMeter => "mg/m³",
            DisplayUnit::PartsPerMillion => "ppm",
            DisplayUnit::PartsPerBillion => "ppb",
            DisplayUnit::Percentage => "%",
            DisplayUnit::Degree => "°",
            DisplayUnit::Lux => "lx",
            DisplayUnit::Decibel => "dB",
            DisplayUnit::WeightedDecibelA => "dBA",
            DisplayUnit::RevolutionsPerMinute => "rpm",
            DisplayUnit::SquareMeters => "m²",
            DisplayUnit::WattsPerSquareMeter => "W/m²",
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Map a protocol engineering-unit identifier to a display unit.
///
/// Total over the protocol vocabulary: identifiers without a display
/// counterpart (ampereSeconds, currency1..10, pH, ...) return `None` and
/// never fail.
pub fn map_unit(unit_in: &str) -> Option<DisplayUnit> {
    match unit_in {
        "amperes" => Some(DisplayUnit::Ampere),
        "milliamperes" => Some(DisplayUnit::Milliampere),
        "volts" => Some(DisplayUnit::Volt),
        "millivolts" => Some(DisplayUnit::Millivolt),
        "kilovoltAmperes" => Some(DisplayUnit::VoltAmpere),
        "voltAmpereHoursReactive" => Some(DisplayUnit::VoltAmpereReactive),
        "watts" => Some(DisplayUnit::Watt),
        "kilowatts" => Some(DisplayUnit::KiloWatt),
        "btusPerHour" => Some(DisplayUnit::BtuPerHour),
        "wattHours" => Some(DisplayUnit::WattHour),
        "kilowattHours" => Some(DisplayUnit::KilowattHour),
        "megawattHours" => Some(DisplayUnit::MegawattHour),
        "megajoules" => Some(DisplayUnit::MegaJoule),
        "degreesCelsius" => Some(DisplayUnit::Celsius),
        "degreesFahrenheit" => Some(DisplayUnit::Fahrenheit),
        "degreesKelvin" => Some(DisplayUnit::Kelvin),
        "pascals" => Some(DisplayUnit::Pascal),
        "hectopascals" => Some(DisplayUnit::Hectopascal),
        "kilopascals" => Some(DisplayUnit::Kilopascal),
        "millibars" => Some(DisplayUnit::Millibar),
        "poundsForcePerSquareInch" => Some(DisplayUnit::Psi),
        "hertz" => Some(DisplayUnit::Hertz),
        "kilohertz" => Some(DisplayUnit::Kilohertz),
        "megahertz" => Some(DisplayUnit::Megahertz),
        "millimeters" => Some(DisplayUnit::Millimeters),
        "centimeters" => Some(DisplayUnit::Centimeters),
        "meters" => Some(DisplayUnit::Meters),
        "kilometers" => Some(DisplayUnit::Kilometers),
        "inches" => Some(DisplayUnit::Inches),
        "feet" => Some(DisplayUnit::Feet),
        "millimetersOfWater" => Some(DisplayUnit::MillimetersOfWater),
        "centimetersOfWater" => Some(DisplayUnit::CentimetersOfWater),
        "inchesOfWater" => Some(DisplayUnit::InchesOfWater),
        "metersPerSecond" => Some(DisplayUnit::MetersPerSecond),
        "kilometersPerHour" => Some(DisplayUnit::KilometersPerHour),
        "feetPerSecond" => Some(DisplayUnit::FeetPerSecond),
        "milesPerHour" => Some(DisplayUnit::MilesPerHour),
        "liters" => Some(DisplayUnit::Liters),
        "milliliters" => Some(DisplayUnit::Milliliters),
        "cubicMeters" => Some(DisplayUnit::CubicMeters),
        "cubicFeet" => Some(DisplayUnit::CubicFeet),
        "usGallons" => Some(DisplayUnit::Gallons),
        "cubicMetersPerHour" => Some(DisplayUnit::CubicMetersPerHour),
        "cubicFeetPerMinute" => Some(DisplayUnit::CubicFeetPerMinute),
        "litersPerMinute" => Some(DisplayUnit::LitersPerMinute),
        "usGallonsPerMinute" => Some(DisplayUnit::GallonsPerMinute),
        "grams" => Some(DisplayUnit::Grams),
        "milligrams" => Some(DisplayUnit::Milligrams),
        "kilograms" => Some(DisplayUnit::Kilograms),
        "poundsMass" => Some(DisplayUnit::Pounds),
        "milliseconds" => Some(DisplayUnit::Milliseconds),
        "seconds" => Some(DisplayUnit::Seconds),
        "minutes" => Some(DisplayUnit::Minutes),
        "hours" => Some(DisplayUnit::Hours),
        "days" => Some(DisplayUnit::Days),
        "weeks" => Some(DisplayUnit::Weeks),
        "months" => Some(DisplayUnit::Months),
        "years" => Some(DisplayUnit::Years),
        "microgramsPerCubicMeter" => Some(DisplayUnit::MicrogramsPerCubicMeter),
        "milligramsPerCubicMeter" => Some(DisplayUnit::MilligramsPerCubicMeter),
        "partsPerMillion" => Some(DisplayUnit::PartsPerMillion),
        "partsPerBillion" => Some(DisplayUnit::PartsPerBillion),
        "percent" => Some(DisplayUnit::Percentage),
        "percentRelativeHumidity" => Some(DisplayUnit::Percentage),
        "degreesAngular" => Some(DisplayUnit::Degree),
        "degreesPhase" => Some(DisplayUnit::Degree),
        "luxes" => Some(DisplayUnit::Lux),
        "decibels" => Some(DisplayUnit::Decibel),
        "decibelsA" => Some(DisplayUnit::WeightedDecibelA),
        "revolutionsPerMinute" => Some(DisplayUnit::RevolutionsPerMinute),
        "squareMeters" => Some(DisplayUnit::SquareMeters),
        "wattsPerSquareMeter" => Some(DisplayUnit::WattsPerSquareMeter),
        _ => None,
    }
}

/// Device classes the host can map objects onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Temperature,
    Humidity,
    Current,
    Voltage,
    ApparentPower,
    ReactivePower,
    Power,
    Energy,
    Frequency,
    Pressure,
    Illuminance,
    Distance,
    Speed,
    Volume,
    VolumeFlowRate,
    Weight,
    Duration,
    SoundPressure,
    Irradiance,
    PrecipitationDepth,
    Area,
    Concentration,
}

/// Ordered class → acceptable-units table. Lookup takes the first class
/// whose set contains the mapped unit, so more specific classes come first.
pub type ClassUnitTable = [(DeviceClass, &'static [DisplayUnit])];

static DEFAULT_CLASS_UNITS: Lazy<Vec<(DeviceClass, &'static [DisplayUnit])>> = Lazy::new(|| {
    use DisplayUnit::*;
    vec![
        (
            DeviceClass::Temperature,
            &[Celsius, Fahrenheit, Kelvin][..],
        ),
        (DeviceClass::Current, &[Ampere, Milliampere][..]),
        (DeviceClass::Voltage, &[Volt, Millivolt][..]),
        (DeviceClass::ApparentPower, &[VoltAmpere][..]),
        (DeviceClass::ReactivePower, &[VoltAmpereReactive][..]),
        (DeviceClass::Power, &[Watt, KiloWatt, BtuPerHour][..]),
        (
            DeviceClass::Energy,
            &[WattHour, KilowattHour, MegawattHour, MegaJoule][..],
        ),
        (DeviceClass::Frequency, &[Hertz, Kilohertz, Megahertz][..]),
        (
            DeviceClass::Pressure,
            &[Pascal, Hectopascal, Kilopascal, Millibar, Psi][..],
        ),
        (DeviceClass::Illuminance, &[Lux][..]),
        (
            DeviceClass::PrecipitationDepth,
            &[MillimetersOfWater, CentimetersOfWater, InchesOfWater][..],
        ),
        (
            DeviceClass::Distance,
            &[Millimeters, Centimeters, Meters, Kilometers, Inches, Feet][..],
        ),
        (
            DeviceClass::Speed,
            &[MetersPerSecond, KilometersPerHour, FeetPerSecond, MilesPerHour][..],
        ),
        (
            DeviceClass::Volume,
            &[Liters, Milliliters, CubicMeters, CubicFeet, Gallons][..],
        ),
        (
            DeviceClass::VolumeFlowRate,
            &[
                CubicMetersPerHour,
                CubicFeetPerMinute,
                LitersPerMinute,
                GallonsPerMinute,
            ][..],
        ),
        (
            DeviceClass::Weight,
            &[Grams, Milligrams, Kilograms, Pounds][..],
        ),
        (
            DeviceClass::Duration,
            &[Milliseconds, Seconds, Minutes, Hours, Days, Weeks][..],
        ),
        (
            DeviceClass::SoundPressure,
            &[Decibel, WeightedDecibelA][..],
        ),
        (DeviceClass::Irradiance, &[WattsPerSquareMeter][..]),
        (DeviceClass::Area, &[SquareMeters][..]),
        (
            DeviceClass::Concentration,
            &[
                MicrogramsPerCubicMeter,
                MilligramsPerCubicMeter,
                PartsPerMillion,
                PartsPerBillion,
            ][..],
        ),
        (DeviceClass::Humidity, &[Percentage][..]),
    ]
});

/// The standard class → units table
pub fn default_class_units() -> &'static ClassUnitTable {
    DEFAULT_CLASS_UNITS.as_slice()
}

/// Infer a device class from a protocol unit identifier.
///
/// Returns the first class whose unit set contains the mapped display unit,
/// or `None` when the unit does not map or matches no class.
pub fn infer_device_class(unit_in: &str, table: &ClassUnitTable) -> Option<DeviceClass> {
    let unit = map_unit(unit_in)?;
    table
        .iter()
        .find(|(_, units)| units.contains(&unit))
        .map(|(class, _)| *class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_units_resolve() {
        assert_eq!(map_unit("degreesCelsius"), Some(DisplayUnit::Celsius));
        assert_eq!(map_unit("kilowattHours"), Some(DisplayUnit::KilowattHour));
        assert_eq!(map_unit("percent"), Some(DisplayUnit::Percentage));
    }

    #[test]
    fn unmapped_units_fall_through_to_none() {
        assert_eq!(map_unit("ampereSeconds"), None);
        assert_eq!(map_unit("currency4"), None);
        assert_eq!(map_unit("pH"), None);
        assert_eq!(map_unit("noUnits"), None);
        assert_eq!(map_unit("not-a-bacnet-unit"), None);
    }

    #[test]
    fn device_class_inference() {
        let table = default_class_units();
        assert_eq!(
            infer_device_class("degreesFahrenheit", table),
            Some(DeviceClass::Temperature)
        );
        assert_eq!(
            infer_device_class("wattHours", table),
            Some(DeviceClass::Energy)
        );
        assert_eq!(
            infer_device_class("percentRelativeHumidity", table),
            Some(DeviceClass::Humidity)
        );
        assert_eq!(infer_device_class("powerFactor", table), None);
        assert_eq!(infer_device_class("unknown", table), None);
    }
}
