use std::ops::{Add, Neg, Sub};

/// Base dimensions, in the order SI unit strings list them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDimension {
    Mass,
    Length,
    Time,
    Current,
    Temperature,
    LuminousIntensity,
    AmountOfSubstance,
    Angle,
    Bit,
}

impl BaseDimension {
    pub const ALL: [BaseDimension; 9] = [
        BaseDimension::Mass,
        BaseDimension::Length,
        BaseDimension::Time,
        BaseDimension::Current,
        BaseDimension::Temperature,
        BaseDimension::LuminousIntensity,
        BaseDimension::AmountOfSubstance,
        BaseDimension::Angle,
        BaseDimension::Bit,
    ];

    /// Symbol of the SI unit for this dimension.
    pub fn si_symbol(self) -> &'static str {
        match self {
            BaseDimension::Mass => "kg",
            BaseDimension::Length => "m",
            BaseDimension::Time => "s",
            BaseDimension::Current => "A",
            BaseDimension::Temperature => "K",
            BaseDimension::LuminousIntensity => "cd",
            BaseDimension::AmountOfSubstance => "mol",
            BaseDimension::Angle => "rad",
            BaseDimension::Bit => "bits",
        }
    }
}

/// Largest exponent magnitude a unit expression may reach on any base dimension.
pub const MAX_EXPONENT: i32 = 64;

fn within_bounds(exponent: i32) -> Option<i32> {
    (-MAX_EXPONENT..=MAX_EXPONENT)
        .contains(&exponent)
        .then_some(exponent)
}

/// Integer exponent per base dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimension([i32; 9]);

impl Dimension {
    pub const NONE: Dimension = Dimension([0; 9]);

    pub const fn of(base: BaseDimension) -> Self {
        let mut exps = [0; 9];
        exps[base as usize] = 1;
        Dimension(exps)
    }

    /// Builds a dimension from `(base, exponent)` pairs.
    pub fn from_pairs(pairs: &[(BaseDimension, i32)]) -> Self {
        let mut exps = [0; 9];
        for (base, exp) in pairs {
            exps[*base as usize] += exp;
        }
        Dimension(exps)
    }

    pub fn exponent(&self, base: BaseDimension) -> i32 {
        self.0[base as usize]
    }

    pub fn pow(self, power: i32) -> Self {
        Dimension(self.0.map(|e| e * power))
    }

    /// [`Dimension::pow`] for client-supplied powers; `None` once any exponent leaves
    /// `±MAX_EXPONENT`.
    pub fn checked_pow(self, power: i32) -> Option<Self> {
        let mut exps = self.0;
        for e in exps.iter_mut() {
            *e = e.checked_mul(power).and_then(within_bounds)?;
        }
        Some(Dimension(exps))
    }

    /// Bounded like [`Dimension::checked_pow`].
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let mut exps = self.0;
        for (lhs, rhs) in exps.iter_mut().zip(rhs.0) {
            *lhs = lhs.checked_add(rhs).and_then(within_bounds)?;
        }
        Some(Dimension(exps))
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|e| *e == 0)
    }

    /// Non-zero `(base, exponent)` pairs in SI order.
    pub fn components(&self) -> impl Iterator<Item = (BaseDimension, i32)> + '_ {
        BaseDimension::ALL
            .into_iter()
            .map(|base| (base, self.exponent(base)))
            .filter(|(_, exp)| *exp != 0)
    }
}

impl Add for Dimension {
    type Output = Dimension;

    fn add(self, rhs: Self) -> Self::Output {
        let mut exps = self.0;
        for (lhs, rhs) in exps.iter_mut().zip(rhs.0) {
            *lhs += rhs;
        }
        Dimension(exps)
    }
}

impl Neg for Dimension {
    type Output = Dimension;

    fn neg(self) -> Self::Output {
        self.pow(-1)
    }
}

impl Sub for Dimension {
    type Output = Dimension;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}
