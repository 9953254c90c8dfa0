//! Known unit symbols and prefixes.
use std::collections::HashMap;
use std::f64::consts::PI;

use lazy_static::lazy_static;

use crate::dimension::{BaseDimension::*, Dimension};

/// Which prefix table a unit accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixKind {
    None,
    /// `k`, `m`, `u`, ...
    Short,
    /// `kilo`, `milli`, `micro`, ...
    Long,
    /// Short SI prefixes plus `Ki`, `Mi`, ...
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    pub name: &'static str,
    pub dimension: Dimension,
    /// Multiplier to the SI base expression.
    pub factor: f64,
    /// Added to the magnitude before scaling; only temperatures carry one.
    pub offset: f64,
    pub prefixes: PrefixKind,
}

impl UnitDef {
    fn new(name: &'static str, dimension: Dimension, factor: f64, prefixes: PrefixKind) -> Self {
        Self {
            name,
            dimension,
            factor,
            offset: 0.0,
            prefixes,
        }
    }

    fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

const SHORT_PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("h", 1e2),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
    ("Z", 1e21),
    ("Y", 1e24),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("\u{b5}", 1e-6),
    ("\u{3bc}", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
];

const LONG_PREFIXES: &[(&str, f64)] = &[
    ("deca", 1e1),
    ("hecto", 1e2),
    ("kilo", 1e3),
    ("mega", 1e6),
    ("giga", 1e9),
    ("tera", 1e12),
    ("peta", 1e15),
    ("exa", 1e18),
    ("zetta", 1e21),
    ("yotta", 1e24),
    ("deci", 1e-1),
    ("centi", 1e-2),
    ("milli", 1e-3),
    ("micro", 1e-6),
    ("nano", 1e-9),
    ("pico", 1e-12),
    ("femto", 1e-15),
    ("atto", 1e-18),
    ("zepto", 1e-21),
    ("yocto", 1e-24),
];

const BINARY_PREFIXES: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
];

impl PrefixKind {
    /// Prefix table entries usable with this kind, longest names first.
    pub fn table(self) -> Vec<(&'static str, f64)> {
        let mut table: Vec<(&'static str, f64)> = match self {
            PrefixKind::None => Vec::new(),
            PrefixKind::Short => SHORT_PREFIXES.to_vec(),
            PrefixKind::Long => LONG_PREFIXES.to_vec(),
            PrefixKind::Binary => BINARY_PREFIXES
                .iter()
                .chain(SHORT_PREFIXES)
                .copied()
                .collect(),
        };
        table.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
        table
    }
}

fn dim(pairs: &[(crate::dimension::BaseDimension, i32)]) -> Dimension {
    Dimension::from_pairs(pairs)
}

fn build_units() -> Vec<UnitDef> {
    use PrefixKind::{Binary, Long, None as NoPrefix, Short};

    let length = Dimension::of(Length);
    let mass = Dimension::of(Mass);
    let time = Dimension::of(Time);
    let current = Dimension::of(Current);
    let temperature = Dimension::of(Temperature);
    let angle = Dimension::of(Angle);
    let force = dim(&[(Mass, 1), (Length, 1), (Time, -2)]);
    let energy = dim(&[(Mass, 1), (Length, 2), (Time, -2)]);
    let power = dim(&[(Mass, 1), (Length, 2), (Time, -3)]);
    let pressure = dim(&[(Mass, 1), (Length, -1), (Time, -2)]);
    let charge = dim(&[(Current, 1), (Time, 1)]);
    let potential = dim(&[(Mass, 1), (Length, 2), (Time, -3), (Current, -1)]);
    let resistance = dim(&[(Mass, 1), (Length, 2), (Time, -3), (Current, -2)]);
    let capacitance = dim(&[(Mass, -1), (Length, -2), (Time, 4), (Current, 2)]);
    let flux = dim(&[(Mass, 1), (Length, 2), (Time, -2), (Current, -1)]);
    let flux_density = dim(&[(Mass, 1), (Time, -2), (Current, -1)]);
    let inductance = dim(&[(Mass, 1), (Length, 2), (Time, -2), (Current, -2)]);
    let volume = length.pow(3);
    let frequency = time.pow(-1);

    const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
    const DALTON: f64 = 1.660_539_066_60e-27;
    const MMHG: f64 = 133.322_387_415;

    vec![
        // length
        UnitDef::new("m", length, 1.0, Short),
        UnitDef::new("meter", length, 1.0, Long),
        UnitDef::new("meters", length, 1.0, Long),
        UnitDef::new("metre", length, 1.0, Long),
        UnitDef::new("metres", length, 1.0, Long),
        UnitDef::new("in", length, 0.0254, NoPrefix),
        UnitDef::new("inch", length, 0.0254, NoPrefix),
        UnitDef::new("ft", length, 0.3048, NoPrefix),
        UnitDef::new("foot", length, 0.3048, NoPrefix),
        UnitDef::new("yd", length, 0.9144, NoPrefix),
        UnitDef::new("mi", length, 1609.344, NoPrefix),
        UnitDef::new("angstrom", length, 1e-10, NoPrefix),
        UnitDef::new("\u{c5}", length, 1e-10, NoPrefix),
        UnitDef::new("\u{212b}", length, 1e-10, NoPrefix),
        // mass
        UnitDef::new("g", mass, 1e-3, Short),
        UnitDef::new("gram", mass, 1e-3, Long),
        UnitDef::new("grams", mass, 1e-3, Long),
        UnitDef::new("t", mass, 1e3, NoPrefix),
        UnitDef::new("tonne", mass, 1e3, Long),
        UnitDef::new("lb", mass, 0.453_592_37, NoPrefix),
        UnitDef::new("u", mass, DALTON, NoPrefix),
        UnitDef::new("Da", mass, DALTON, Short),
        // time
        UnitDef::new("s", time, 1.0, Short),
        UnitDef::new("second", time, 1.0, Long),
        UnitDef::new("seconds", time, 1.0, Long),
        UnitDef::new("min", time, 60.0, NoPrefix),
        UnitDef::new("minute", time, 60.0, NoPrefix),
        UnitDef::new("minutes", time, 60.0, NoPrefix),
        UnitDef::new("h", time, 3600.0, NoPrefix),
        UnitDef::new("hour", time, 3600.0, NoPrefix),
        UnitDef::new("hours", time, 3600.0, NoPrefix),
        UnitDef::new("day", time, 86_400.0, NoPrefix),
        UnitDef::new("days", time, 86_400.0, NoPrefix),
        UnitDef::new("week", time, 604_800.0, NoPrefix),
        UnitDef::new("year", time, 31_557_600.0, NoPrefix),
        // electric current
        UnitDef::new("A", current, 1.0, Short),
        UnitDef::new("ampere", current, 1.0, Long),
        // temperature
        UnitDef::new("K", temperature, 1.0, Short),
        UnitDef::new("kelvin", temperature, 1.0, Long),
        UnitDef::new("degC", temperature, 1.0, NoPrefix).with_offset(273.15),
        UnitDef::new("\u{b0}C", temperature, 1.0, NoPrefix).with_offset(273.15),
        UnitDef::new("celsius", temperature, 1.0, NoPrefix).with_offset(273.15),
        UnitDef::new("degF", temperature, 5.0 / 9.0, NoPrefix).with_offset(459.67),
        UnitDef::new("\u{b0}F", temperature, 5.0 / 9.0, NoPrefix).with_offset(459.67),
        UnitDef::new("fahrenheit", temperature, 5.0 / 9.0, NoPrefix).with_offset(459.67),
        // amount, luminous intensity
        UnitDef::new("mol", Dimension::of(AmountOfSubstance), 1.0, Short),
        UnitDef::new("mole", Dimension::of(AmountOfSubstance), 1.0, Long),
        UnitDef::new("cd", Dimension::of(LuminousIntensity), 1.0, Short),
        UnitDef::new("candela", Dimension::of(LuminousIntensity), 1.0, Long),
        // angle
        UnitDef::new("rad", angle, 1.0, Short),
        UnitDef::new("radian", angle, 1.0, Long),
        UnitDef::new("radians", angle, 1.0, Long),
        UnitDef::new("deg", angle, PI / 180.0, Long),
        UnitDef::new("degree", angle, PI / 180.0, Long),
        UnitDef::new("degrees", angle, PI / 180.0, Long),
        UnitDef::new("\u{b0}", angle, PI / 180.0, NoPrefix),
        UnitDef::new("arcmin", angle, PI / 10_800.0, NoPrefix),
        UnitDef::new("arcsec", angle, PI / 648_000.0, NoPrefix),
        // derived
        UnitDef::new("Hz", frequency, 1.0, Short),
        UnitDef::new("hertz", frequency, 1.0, Long),
        UnitDef::new("N", force, 1.0, Short),
        UnitDef::new("newton", force, 1.0, Long),
        UnitDef::new("J", energy, 1.0, Short),
        UnitDef::new("joule", energy, 1.0, Long),
        UnitDef::new("eV", energy, ELEMENTARY_CHARGE, Short),
        UnitDef::new("electronvolt", energy, ELEMENTARY_CHARGE, Long),
        UnitDef::new("W", power, 1.0, Short),
        UnitDef::new("watt", power, 1.0, Long),
        UnitDef::new("Pa", pressure, 1.0, Short),
        UnitDef::new("pascal", pressure, 1.0, Long),
        UnitDef::new("bar", pressure, 1e5, Short),
        UnitDef::new("atm", pressure, 101_325.0, NoPrefix),
        UnitDef::new("torr", pressure, 101_325.0 / 760.0, NoPrefix),
        UnitDef::new("mmHg", pressure, MMHG, NoPrefix),
        UnitDef::new("psi", pressure, 6_894.757_293_168_36, NoPrefix),
        UnitDef::new("C", charge, 1.0, Short),
        UnitDef::new("coulomb", charge, 1.0, Long),
        UnitDef::new("V", potential, 1.0, Short),
        UnitDef::new("volt", potential, 1.0, Long),
        UnitDef::new("ohm", resistance, 1.0, Short),
        UnitDef::new("\u{3a9}", resistance, 1.0, Short),
        UnitDef::new("F", capacitance, 1.0, Short),
        UnitDef::new("farad", capacitance, 1.0, Long),
        UnitDef::new("Wb", flux, 1.0, Short),
        UnitDef::new("weber", flux, 1.0, Long),
        UnitDef::new("T", flux_density, 1.0, Short),
        UnitDef::new("tesla", flux_density, 1.0, Long),
        UnitDef::new("H", inductance, 1.0, Short),
        UnitDef::new("henry", inductance, 1.0, Long),
        UnitDef::new("S", resistance.pow(-1), 1.0, Short),
        UnitDef::new("siemens", resistance.pow(-1), 1.0, Long),
        UnitDef::new("L", volume, 1e-3, Short),
        UnitDef::new("l", volume, 1e-3, Short),
        UnitDef::new("liter", volume, 1e-3, Long),
        UnitDef::new("litre", volume, 1e-3, Long),
        // information
        UnitDef::new("b", Dimension::of(Bit), 1.0, Binary),
        UnitDef::new("bits", Dimension::of(Bit), 1.0, Binary),
        UnitDef::new("B", Dimension::of(Bit), 8.0, Binary),
        UnitDef::new("bytes", Dimension::of(Bit), 8.0, Binary),
    ]
}

lazy_static! {
    /// Every known unit keyed by its exact symbol.
    pub static ref UNITS: HashMap<&'static str, UnitDef> =
        build_units().into_iter().map(|u| (u.name, u)).collect();
}

/// A resolved symbol: the unit plus any prefix it was written with.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub prefix: &'static str,
    pub prefix_factor: f64,
    pub unit: &'static UnitDef,
}

impl Resolved {
    /// The symbol exactly as a reader would write it, e.g. `mm`.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.prefix, self.unit.name)
    }
}

/// Resolves a symbol, preferring an exact unit name over a prefixed reading (`min` is minutes,
/// not milli-inches).
pub fn resolve(symbol: &str) -> Option<Resolved> {
    if let Some(unit) = UNITS.get(symbol) {
        return Some(Resolved {
            prefix: "",
            prefix_factor: 1.0,
            unit,
        });
    }
    UNITS
        .values()
        .filter(|unit| unit.prefixes != PrefixKind::None && symbol.ends_with(unit.name))
        .filter_map(|unit| {
            let head = &symbol[..symbol.len() - unit.name.len()];
            unit.prefixes
                .table()
                .into_iter()
                .find(|(name, _)| *name == head)
                .map(|(prefix, prefix_factor)| Resolved {
                    prefix,
                    prefix_factor,
                    unit,
                })
        })
        .max_by_key(|r| r.unit.name.len())
}
