//! Medium unit value types.
//!
//! The device describes flow units as a (prefix, physical unit, time
//! base) triple, each transmitted as one byte. The enums here are plain
//! data; symbols and descriptions come from lookup tables so nothing is
//! runtime-mutable.

/// Decimal prefix of a medium unit. The wire value is the signed
/// base-10 exponent, with 127 meaning "undefined".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i8)]
pub enum UnitPrefix {
    Yocto = -24,
    Zepto = -21,
    Atto = -18,
    Femto = -15,
    Pico = -12,
    Nano = -9,
    Micro = -6,
    Milli = -3,
    Centi = -2,
    Deci = -1,
    One = 0,
    Deca = 1,
    Hecto = 2,
    Kilo = 3,
    Mega = 6,
    Giga = 9,
    Tera = 12,
    Peta = 15,
    Exa = 18,
    Zetta = 21,
    Yotta = 24,
    Undefined = 127,
}

impl UnitPrefix {
    /// The prefix symbol, e.g. `"m"` for milli.
    pub fn symbol(self) -> &'static str {
        match self {
            UnitPrefix::Yocto => "y",
            UnitPrefix::Zepto => "z",
            UnitPrefix::Atto => "a",
            UnitPrefix::Femto => "f",
            UnitPrefix::Pico => "p",
            UnitPrefix::Nano => "n",
            UnitPrefix::Micro => "\u{b5}",
            UnitPrefix::Milli => "m",
            UnitPrefix::Centi => "c",
            UnitPrefix::Deci => "d",
            UnitPrefix::One => "",
            UnitPrefix::Deca => "da",
            UnitPrefix::Hecto => "h",
            UnitPrefix::Kilo => "k",
            UnitPrefix::Mega => "M",
            UnitPrefix::Giga => "G",
            UnitPrefix::Tera => "T",
            UnitPrefix::Peta => "P",
            UnitPrefix::Exa => "E",
            UnitPrefix::Zetta => "Z",
            UnitPrefix::Yotta => "Y",
            UnitPrefix::Undefined => "",
        }
    }

    /// Human-readable prefix description, e.g. `"Milli (10^-3)"`.
    pub fn description(self) -> &'static str {
        match self {
            UnitPrefix::Yocto => "Yocto (10^-24)",
            UnitPrefix::Zepto => "Zepto (10^-21)",
            UnitPrefix::Atto => "Atto (10^-18)",
            UnitPrefix::Femto => "Femto (10^-15)",
            UnitPrefix::Pico => "Pico (10^-12)",
            UnitPrefix::Nano => "Nano (10^-9)",
            UnitPrefix::Micro => "Micro (10^-6)",
            UnitPrefix::Milli => "Milli (10^-3)",
            UnitPrefix::Centi => "Centi (10^-2)",
            UnitPrefix::Deci => "Deci (10^-1)",
            UnitPrefix::One => "1",
            UnitPrefix::Deca => "Deca (10^1)",
            UnitPrefix::Hecto => "Hecto (10^2)",
            UnitPrefix::Kilo => "Kilo (10^3)",
            UnitPrefix::Mega => "Mega (10^6)",
            UnitPrefix::Giga => "Giga (10^9)",
            UnitPrefix::Tera => "Tera (10^12)",
            UnitPrefix::Peta => "Peta (10^15)",
            UnitPrefix::Exa => "Exa (10^18)",
            UnitPrefix::Zetta => "Zetta (10^21)",
            UnitPrefix::Yotta => "Yotta (10^24)",
            UnitPrefix::Undefined => "Undefined",
        }
    }
}

impl From<UnitPrefix> for i8 {
    fn from(prefix: UnitPrefix) -> i8 {
        prefix as i8
    }
}

impl TryFrom<i8> for UnitPrefix {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, i8> {
        match value {
            -24 => Ok(UnitPrefix::Yocto),
            -21 => Ok(UnitPrefix::Zepto),
            -18 => Ok(UnitPrefix::Atto),
            -15 => Ok(UnitPrefix::Femto),
            -12 => Ok(UnitPrefix::Pico),
            -9 => Ok(UnitPrefix::Nano),
            -6 => Ok(UnitPrefix::Micro),
            -3 => Ok(UnitPrefix::Milli),
            -2 => Ok(UnitPrefix::Centi),
            -1 => Ok(UnitPrefix::Deci),
            0 => Ok(UnitPrefix::One),
            1 => Ok(UnitPrefix::Deca),
            2 => Ok(UnitPrefix::Hecto),
            3 => Ok(UnitPrefix::Kilo),
            6 => Ok(UnitPrefix::Mega),
            9 => Ok(UnitPrefix::Giga),
            12 => Ok(UnitPrefix::Tera),
            15 => Ok(UnitPrefix::Peta),
            18 => Ok(UnitPrefix::Exa),
            21 => Ok(UnitPrefix::Zetta),
            24 => Ok(UnitPrefix::Yotta),
            127 => Ok(UnitPrefix::Undefined),
            other => Err(other),
        }
    }
}

/// Physical medium unit with its byte value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FlowUnit {
    /// Norm liter (0 °C, 1013 hPa).
    NormLiter = 0,
    /// Standard liter (20 °C, 1013 hPa).
    StandardLiter = 1,
    /// Standard liter (15 °C, 1013 hPa).
    StandardLiter15C = 2,
    /// Standard liter (25 °C, 1013 hPa).
    StandardLiter25C = 3,
    /// Standard liter (70 °F, 1013 hPa).
    StandardLiter70F = 4,
    /// Liter (liquid).
    LiterLiquid = 8,
    Gram = 9,
    Pascal = 16,
    Bar = 17,
    MeterH2o = 18,
    InchH2o = 19,
    Percent = 250,
    Permil = 251,
    /// 8-bit signed integer ticks.
    Int8 = 252,
    /// 16-bit signed integer ticks.
    Int16 = 253,
    /// 32-bit signed integer ticks.
    Int32 = 254,
    Undefined = 255,
}

impl FlowUnit {
    /// The unit symbol, e.g. `"ln"` for norm liter.
    pub fn symbol(self) -> &'static str {
        match self {
            FlowUnit::NormLiter => "ln",
            FlowUnit::StandardLiter
            | FlowUnit::StandardLiter15C
            | FlowUnit::StandardLiter25C
            | FlowUnit::StandardLiter70F => "ls",
            FlowUnit::LiterLiquid => "l",
            FlowUnit::Gram => "g",
            FlowUnit::Pascal => "Pa",
            FlowUnit::Bar => "bar",
            FlowUnit::MeterH2o => "mH2O",
            FlowUnit::InchH2o => "iH2O",
            FlowUnit::Percent => "%",
            FlowUnit::Permil => "\u{2030}",
            FlowUnit::Int8 | FlowUnit::Int16 | FlowUnit::Int32 => "ticks",
            FlowUnit::Undefined => "",
        }
    }

    /// Human-readable unit description, e.g.
    /// `"Standard Liter (20°C, 1013hPa)"`.
    pub fn description(self) -> &'static str {
        match self {
            FlowUnit::NormLiter => "Norm Liter (0\u{b0}C, 1013hPa)",
            FlowUnit::StandardLiter => "Standard Liter (20\u{b0}C, 1013hPa)",
            FlowUnit::StandardLiter15C => "Standard Liter (15\u{b0}C, 1013hPa)",
            FlowUnit::StandardLiter25C => "Standard Liter (25\u{b0}C, 1013hPa)",
            FlowUnit::StandardLiter70F => "Standard Liter (70\u{b0}F, 1013hPa)",
            FlowUnit::LiterLiquid => "Liter (liqui)",
            FlowUnit::Gram => "Gram",
            FlowUnit::Pascal => "Pascal",
            FlowUnit::Bar => "Bar",
            FlowUnit::MeterH2o => "Meter H2O",
            FlowUnit::InchH2o => "Inch H2O",
            FlowUnit::Percent => "Percent",
            FlowUnit::Permil => "Permil",
            FlowUnit::Int8 => "8-Bit Signed Integer",
            FlowUnit::Int16 => "16-Bit Signed Integer",
            FlowUnit::Int32 => "32-Bit Signed Integer",
            FlowUnit::Undefined => "Undefined",
        }
    }
}

impl From<FlowUnit> for u8 {
    fn from(unit: FlowUnit) -> u8 {
        unit as u8
    }
}

impl TryFrom<u8> for FlowUnit {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(FlowUnit::NormLiter),
            1 => Ok(FlowUnit::StandardLiter),
            2 => Ok(FlowUnit::StandardLiter15C),
            3 => Ok(FlowUnit::StandardLiter25C),
            4 => Ok(FlowUnit::StandardLiter70F),
            8 => Ok(FlowUnit::LiterLiquid),
            9 => Ok(FlowUnit::Gram),
            16 => Ok(FlowUnit::Pascal),
            17 => Ok(FlowUnit::Bar),
            18 => Ok(FlowUnit::MeterH2o),
            19 => Ok(FlowUnit::InchH2o),
            250 => Ok(FlowUnit::Percent),
            251 => Ok(FlowUnit::Permil),
            252 => Ok(FlowUnit::Int8),
            253 => Ok(FlowUnit::Int16),
            254 => Ok(FlowUnit::Int32),
            255 => Ok(FlowUnit::Undefined),
            other => Err(other),
        }
    }
}

/// Time base of a medium unit with its byte value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TimeBase {
    None = 0,
    Microsecond = 1,
    Millisecond = 2,
    Second = 3,
    Minute = 4,
    Hour = 5,
    Day = 6,
    Undefined = 255,
}

impl TimeBase {
    /// The time base symbol, e.g. `"min"` for minute.
    pub fn symbol(self) -> &'static str {
        match self {
            TimeBase::None => "",
            TimeBase::Microsecond => "\u{b5}s",
            TimeBase::Millisecond => "ms",
            TimeBase::Second => "s",
            TimeBase::Minute => "min",
            TimeBase::Hour => "h",
            TimeBase::Day => "day",
            TimeBase::Undefined => "",
        }
    }

    /// Human-readable time base description, e.g. `"Minute"`.
    pub fn description(self) -> &'static str {
        match self {
            TimeBase::None => "No Time Base",
            TimeBase::Microsecond => "Microsecond",
            TimeBase::Millisecond => "Millisecond",
            TimeBase::Second => "Second",
            TimeBase::Minute => "Minute",
            TimeBase::Hour => "Hour",
            TimeBase::Day => "Day",
            TimeBase::Undefined => "Undefined",
        }
    }
}

impl From<TimeBase> for u8 {
    fn from(timebase: TimeBase) -> u8 {
        timebase as u8
    }
}

impl TryFrom<u8> for TimeBase {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(TimeBase::None),
            1 => Ok(TimeBase::Microsecond),
            2 => Ok(TimeBase::Millisecond),
            3 => Ok(TimeBase::Second),
            4 => Ok(TimeBase::Minute),
            5 => Ok(TimeBase::Hour),
            6 => Ok(TimeBase::Day),
            255 => Ok(TimeBase::Undefined),
            other => Err(other),
        }
    }
}

/// Medium unit specification: prefix, physical unit and time base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediumUnit {
    pub prefix: UnitPrefix,
    pub unit: FlowUnit,
    pub timebase: TimeBase,
}

impl MediumUnit {
    /// Create a new medium unit specification.
    pub fn new(prefix: UnitPrefix, unit: FlowUnit, timebase: TimeBase) -> Self {
        Self {
            prefix,
            unit,
            timebase,
        }
    }
}

impl std::fmt::Display for MediumUnit {
    /// Renders the short label, e.g. `mln/min`.
    ///
    /// `mls/min` and `ls/min` are rewritten to `sccm` and `slm` to match
    /// the unit printed on the device label, and the special
    /// standard-liter variants carry their reference temperature.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut label = format!("{}{}", self.prefix.symbol(), self.unit.symbol());
        if !self.timebase.symbol().is_empty() {
            label.push('/');
            label.push_str(self.timebase.symbol());
        }
        if label == "mls/min" {
            label = "sccm".to_string();
        } else if label == "ls/min" {
            label = "slm".to_string();
        }
        match self.unit {
            FlowUnit::StandardLiter15C => label.push_str(" (15\u{b0}C)"),
            FlowUnit::StandardLiter25C => label.push_str(" (25\u{b0}C)"),
            FlowUnit::StandardLiter70F => label.push_str(" (70\u{b0}F)"),
            _ => {}
        }
        f.write_str(&label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_label() {
        let unit = MediumUnit::new(UnitPrefix::Milli, FlowUnit::NormLiter, TimeBase::Minute);
        assert_eq!(unit.to_string(), "mln/min");
    }

    #[test]
    fn sccm_rewrite() {
        let unit = MediumUnit::new(UnitPrefix::Milli, FlowUnit::StandardLiter, TimeBase::Minute);
        assert_eq!(unit.to_string(), "sccm");
    }

    #[test]
    fn slm_rewrite() {
        let unit = MediumUnit::new(UnitPrefix::One, FlowUnit::StandardLiter, TimeBase::Minute);
        assert_eq!(unit.to_string(), "slm");
    }

    #[test]
    fn temperature_suffix() {
        let unit = MediumUnit::new(
            UnitPrefix::Milli,
            FlowUnit::StandardLiter25C,
            TimeBase::Minute,
        );
        // The sccm rewrite applies first, then the reference temperature.
        assert_eq!(unit.to_string(), "sccm (25\u{b0}C)");
    }

    #[test]
    fn no_timebase_label() {
        let unit = MediumUnit::new(UnitPrefix::One, FlowUnit::Bar, TimeBase::None);
        assert_eq!(unit.to_string(), "bar");
    }

    #[test]
    fn prefix_wire_roundtrip() {
        for value in [-24i8, -3, 0, 3, 24, 127] {
            let prefix = UnitPrefix::try_from(value).unwrap();
            assert_eq!(i8::from(prefix), value);
        }
        assert_eq!(UnitPrefix::try_from(-5), Err(-5));
    }

    #[test]
    fn flow_unit_wire_roundtrip() {
        for value in [0u8, 4, 8, 17, 250, 255] {
            let unit = FlowUnit::try_from(value).unwrap();
            assert_eq!(u8::from(unit), value);
        }
        assert_eq!(FlowUnit::try_from(42), Err(42));
    }

    #[test]
    fn descriptions() {
        assert_eq!(UnitPrefix::Milli.description(), "Milli (10^-3)");
        assert_eq!(UnitPrefix::One.description(), "1");
        assert_eq!(
            FlowUnit::StandardLiter25C.description(),
            "Standard Liter (25\u{b0}C, 1013hPa)"
        );
        assert_eq!(FlowUnit::Permil.description(), "Permil");
        assert_eq!(TimeBase::None.description(), "No Time Base");
        assert_eq!(TimeBase::Minute.description(), "Minute");
    }

    #[test]
    fn timebase_wire_roundtrip() {
        for value in [0u8, 3, 4, 6, 255] {
            let timebase = TimeBase::try_from(value).unwrap();
            assert_eq!(u8::from(timebase), value);
        }
        assert_eq!(TimeBase::try_from(7), Err(7));
    }
}
