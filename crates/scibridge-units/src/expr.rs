//! Parsing of compound unit expressions such as `kg m^2 / s^2` or `mJ/(mol*K)`.
use itertools::Itertools;

use scibridge_error::FilterError;

use crate::dimension::{Dimension, MAX_EXPONENT};
use crate::registry::{self, Resolved};

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub resolved: Resolved,
    pub power: i32,
}

/// A product of prefixed units raised to integer powers.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitExpr {
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Symbol(String),
    Number(String),
    Times,
    Divide,
    Caret,
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, FilterError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' | '\u{b7}' => {
                chars.next();
                tokens.push(Token::Times);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Divide);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                let mut number = String::new();
                number.push(c);
                chars.next();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        number.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(number));
            }
            c if is_symbol_char(c) => {
                let mut symbol = String::new();
                while let Some(&d) = chars.peek() {
                    if is_symbol_char(d) {
                        symbol.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Symbol(symbol));
            }
            _ => return Err(FilterError::UnknownUnit(input.to_string())),
        }
    }
    Ok(tokens)
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '\u{b0}'
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn unknown(&self) -> FilterError {
        FilterError::UnknownUnit(self.source.to_string())
    }

    /// `power * by`, rejected once it leaves `±MAX_EXPONENT`.
    fn scaled(&self, power: i32, by: i32) -> Result<i32, FilterError> {
        power
            .checked_mul(by)
            .filter(|p| (-MAX_EXPONENT..=MAX_EXPONENT).contains(p))
            .ok_or_else(|| self.unknown())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// `product := factor ((('*' | '/')? factor))*`, where `/` inverts only the next factor.
    fn product(&mut self, sign: i32, out: &mut Vec<Term>) -> Result<(), FilterError> {
        let mut next_sign = sign;
        let mut seen_factor = false;
        loop {
            match self.peek() {
                None | Some(Token::Close) => break,
                Some(Token::Times) => {
                    self.next();
                }
                Some(Token::Divide) => {
                    self.next();
                    next_sign = -sign;
                }
                Some(_) => {
                    self.factor(next_sign, out)?;
                    next_sign = sign;
                    seen_factor = true;
                }
            }
        }
        if seen_factor { Ok(()) } else { Err(self.unknown()) }
    }

    fn factor(&mut self, sign: i32, out: &mut Vec<Term>) -> Result<(), FilterError> {
        match self.next() {
            Some(Token::Symbol(symbol)) => {
                let resolved = registry::resolve(&symbol)
                    .ok_or_else(|| FilterError::UnknownUnit(symbol.clone()))?;
                let power = self.exponent()?;
                out.push(Term {
                    resolved,
                    power: self.scaled(power, sign)?,
                });
                Ok(())
            }
            // `1/s`
            Some(Token::Number(n)) if n == "1" => Ok(()),
            Some(Token::Open) => {
                let mut inner = Vec::new();
                self.product(1, &mut inner)?;
                if self.next() != Some(Token::Close) {
                    return Err(self.unknown());
                }
                let power = self.exponent()?;
                let power = self.scaled(power, sign)?;
                for mut term in inner {
                    term.power = self.scaled(term.power, power)?;
                    out.push(term);
                }
                Ok(())
            }
            _ => Err(self.unknown()),
        }
    }

    fn exponent(&mut self) -> Result<i32, FilterError> {
        if self.peek() != Some(&Token::Caret) {
            return Ok(1);
        }
        self.next();
        let parenthesised = self.peek() == Some(&Token::Open);
        if parenthesised {
            self.next();
        }
        let Some(Token::Number(raw)) = self.next() else {
            return Err(self.unknown());
        };
        if parenthesised && self.next() != Some(Token::Close) {
            return Err(self.unknown());
        }
        let power = raw.parse::<i32>().map_err(|_| self.unknown())?;
        self.scaled(power, 1)
    }
}

impl UnitExpr {
    pub fn parse(input: &str) -> Result<Self, FilterError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FilterError::UnknownUnit(input.to_string()));
        }
        let mut parser = Parser {
            source: trimmed,
            tokens: tokenize(trimmed)?,
            pos: 0,
        };
        let mut terms = Vec::new();
        parser.product(1, &mut terms)?;
        if parser.pos < parser.tokens.len() {
            return Err(parser.unknown());
        }
        terms.retain(|t| t.power != 0);
        if terms.is_empty() {
            return Err(FilterError::UnknownUnit(input.to_string()));
        }
        Ok(Self { terms })
    }

    /// Fails when the combined exponents leave `±MAX_EXPONENT`, e.g. `(m^40)*(m^40)`.
    pub fn dimension(&self) -> Result<Dimension, FilterError> {
        self.terms.iter().try_fold(Dimension::NONE, |acc, t| {
            t.resolved
                .unit
                .dimension
                .checked_pow(t.power)
                .and_then(|d| acc.checked_add(d))
                .ok_or_else(|| FilterError::UnknownUnit(self.format()))
        })
    }

    /// A lone unit to the first power; only these honour temperature offsets.
    fn is_simple(&self) -> bool {
        matches!(self.terms.as_slice(), [t] if t.power == 1)
    }

    /// Magnitude in SI base units of `value` expressed in this unit.
    pub fn to_base(&self, value: f64) -> f64 {
        match self.terms.as_slice() {
            [t] if self.is_simple() => {
                (value + t.resolved.unit.offset) * t.resolved.unit.factor * t.resolved.prefix_factor
            }
            terms => terms.iter().fold(value, |acc, t| {
                acc * (t.resolved.unit.factor * t.resolved.prefix_factor).powi(t.power)
            }),
        }
    }

    /// Inverse of [`UnitExpr::to_base`].
    pub fn from_base(&self, value: f64) -> f64 {
        match self.terms.as_slice() {
            [t] if self.is_simple() => {
                value / t.resolved.unit.factor / t.resolved.prefix_factor - t.resolved.unit.offset
            }
            terms => terms.iter().fold(value, |acc, t| {
                acc / (t.resolved.unit.factor * t.resolved.prefix_factor).powi(t.power)
            }),
        }
    }

    /// Renders the expression as `num / den`, parenthesising multi-unit sides, e.g.
    /// `(kg m^2) / (s^3 A)`. A pure denominator keeps negative powers: `s^-1`.
    pub fn format(&self) -> String {
        format_parts(
            self.terms
                .iter()
                .map(|t| (t.resolved.symbol(), t.power))
                .collect(),
        )
    }
}

pub(crate) fn format_parts(parts: Vec<(String, i32)>) -> String {
    let (num, den): (Vec<_>, Vec<_>) = parts.into_iter().partition(|(_, p)| *p > 0);
    let render = |name: &str, power: i32| {
        if power == 1 {
            name.to_string()
        } else {
            format!("{name}^{power}")
        }
    };
    if num.is_empty() {
        return den.iter().map(|(n, p)| render(n, *p)).join(" ");
    }
    let mut out = num.iter().map(|(n, p)| render(n, *p)).join(" ");
    if num.len() > 1 && !den.is_empty() {
        out = format!("({out})");
    }
    if !den.is_empty() {
        let mut bottom = den.iter().map(|(n, p)| render(n, -p)).join(" ");
        if den.len() > 1 {
            bottom = format!("({bottom})");
        }
        out.push_str(" / ");
        out.push_str(&bottom);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(expr: &UnitExpr) -> Vec<(String, i32)> {
        expr.terms
            .iter()
            .map(|t| (t.resolved.symbol(), t.power))
            .collect()
    }

    #[test]
    fn parses_products_quotients_and_powers() {
        let expr = UnitExpr::parse("kg m^2 / s^2").unwrap();
        assert_eq!(
            symbols(&expr),
            vec![("kg".into(), 1), ("m".into(), 2), ("s".into(), -2)]
        );
    }

    #[test]
    fn division_binds_to_the_next_factor_only() {
        let expr = UnitExpr::parse("m/s*kg").unwrap();
        assert_eq!(
            symbols(&expr),
            vec![("m".into(), 1), ("s".into(), -1), ("kg".into(), 1)]
        );
    }

    #[test]
    fn parentheses_group_a_denominator() {
        let expr = UnitExpr::parse("J/(mol*K)").unwrap();
        assert_eq!(
            symbols(&expr),
            vec![("J".into(), 1), ("mol".into(), -1), ("K".into(), -1)]
        );
        let inverse = UnitExpr::parse("1/s").unwrap();
        assert_eq!(symbols(&inverse), vec![("s".into(), -1)]);
        let negative = UnitExpr::parse("s^(-2)").unwrap();
        assert_eq!(symbols(&negative), vec![("s".into(), -2)]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(UnitExpr::parse("").is_err());
        assert!(UnitExpr::parse("m^").is_err());
        assert!(UnitExpr::parse("(m").is_err());
        assert!(UnitExpr::parse("m $").is_err());
        assert!(matches!(
            UnitExpr::parse("parsec"),
            Err(FilterError::UnknownUnit(u)) if u == "parsec"
        ));
    }

    #[test]
    fn oversized_exponents_are_rejected() {
        for unit in [
            "N^2147483647",
            "m^-2147483648",
            "m^99999999999",
            "(m^8)^9",
            "((s^-4)^4)^(-5)",
        ] {
            assert!(
                matches!(UnitExpr::parse(unit), Err(FilterError::UnknownUnit(_))),
                "{unit} should be rejected"
            );
        }
        let wide = UnitExpr::parse("m^40 * m^40").unwrap();
        assert!(matches!(wide.dimension(), Err(FilterError::UnknownUnit(_))));
        let edge = UnitExpr::parse("(m^8)^8").unwrap();
        assert_eq!(symbols(&edge), vec![("m".into(), 64)]);
    }

    #[test]
    fn formats_like_the_store_renders_units() {
        assert_eq!(UnitExpr::parse("km/h").unwrap().format(), "km / h");
        assert_eq!(
            UnitExpr::parse("kg*m^2/(s^3*A)").unwrap().format(),
            "(kg m^2) / (s^3 A)"
        );
        assert_eq!(UnitExpr::parse("1/s").unwrap().format(), "s^-1");
    }

    #[test]
    fn temperature_offset_only_applies_to_simple_units() {
        let celsius = UnitExpr::parse("degC").unwrap();
        assert!((celsius.to_base(25.0) - 298.15).abs() < 1e-9);
        assert!((celsius.from_base(273.15)).abs() < 1e-9);
        let rate = UnitExpr::parse("degC/s").unwrap();
        assert_eq!(rate.to_base(2.0), 2.0);
    }
}
