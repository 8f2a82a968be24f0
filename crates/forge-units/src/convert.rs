//! Unit parsing and conversion.
//!
//! Unit strings are parsed into products of registered units with integer
//! exponents. The following spellings are accepted:
//!
//! - Exponents: `m^2`, `m**2`, `m2`, `s-1`
//! - Multiplication: `kg m`, `kg*m`, `kg·m`
//! - Division: `W/m^2`, `W m^-2`, `W per m^2`
//! - Dimensionless: `1`, `%`
//!
//! ```text
//! unit_expr  = term (('/' | 'per') term)*
//! term       = factor (('*' | '·' | ' ') factor)*
//! factor     = '1' | '(' unit_expr ')' exponent? | symbol exponent?
//! exponent   = ('^' | '**')? ('-' | '+')? [0-9]+
//! ```
//!
//! Two units convert when their dimensions match. Offset units (`degC`,
//! `degF`) apply their offset only when they stand alone; inside a compound
//! such as `degC/h` they scale like a temperature difference.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{HarmonizeError, HarmonizeResult};

/// Converts values between two unit strings.
pub trait UnitConverter: Send + Sync {
    /// Convert a single value from `from` to `to`.
    fn convert(&self, value: f64, from: &str, to: &str) -> HarmonizeResult<f64>;

    /// Convert a batch of values sharing one pair of units.
    fn convert_all(&self, values: &[f64], from: &str, to: &str) -> HarmonizeResult<Vec<f64>> {
        values.iter().map(|v| self.convert(*v, from, to)).collect()
    }

    /// Whether values in `from` can be expressed in `to`.
    fn is_compatible(&self, from: &str, to: &str) -> bool {
        self.convert(0.0, from, to).is_ok()
    }
}

impl<C: UnitConverter + ?Sized> UnitConverter for std::sync::Arc<C> {
    fn convert(&self, value: f64, from: &str, to: &str) -> HarmonizeResult<f64> {
        (**self).convert(value, from, to)
    }

    fn convert_all(&self, values: &[f64], from: &str, to: &str) -> HarmonizeResult<Vec<f64>> {
        (**self).convert_all(values, from, to)
    }
}

// ============================================================================
// Dimensions
// ============================================================================

/// Integer exponents of the base quantities a unit is built from.
///
/// Plane angle is tracked as its own dimension so that degrees never convert
/// to a bare ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub mass: i8,
    pub length: i8,
    pub time: i8,
    pub temperature: i8,
    pub angle: i8,
}

impl Dimension {
    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0, 0, 0);
    pub const MASS: Self = Self::new(1, 0, 0, 0, 0);
    pub const LENGTH: Self = Self::new(0, 1, 0, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0);
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1, 0);
    pub const ANGLE: Self = Self::new(0, 0, 0, 0, 1);
    pub const VOLUME: Self = Self::new(0, 3, 0, 0, 0);
    pub const VELOCITY: Self = Self::new(0, 1, -1, 0, 0);
    pub const FORCE: Self = Self::new(1, 1, -2, 0, 0);
    pub const PRESSURE: Self = Self::new(1, -1, -2, 0, 0);
    pub const ENERGY: Self = Self::new(1, 2, -2, 0, 0);
    pub const POWER: Self = Self::new(1, 2, -3, 0, 0);

    pub const fn new(mass: i8, length: i8, time: i8, temperature: i8, angle: i8) -> Self {
        Self {
            mass,
            length,
            time,
            temperature,
            angle,
        }
    }

    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }

    /// Raise every exponent to `exp`; `None` when an exponent leaves `i8`.
    pub fn checked_pow(&self, exp: i8) -> Option<Self> {
        Some(Self {
            mass: self.mass.checked_mul(exp)?,
            length: self.length.checked_mul(exp)?,
            time: self.time.checked_mul(exp)?,
            temperature: self.temperature.checked_mul(exp)?,
            angle: self.angle.checked_mul(exp)?,
        })
    }

    /// Dimension of the product of two quantities; `None` on exponent overflow.
    pub fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        Some(Self {
            mass: self.mass.checked_add(rhs.mass)?,
            length: self.length.checked_add(rhs.length)?,
            time: self.time.checked_add(rhs.time)?,
            temperature: self.temperature.checked_add(rhs.temperature)?,
            angle: self.angle.checked_add(rhs.angle)?,
        })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }

        let parts: Vec<String> = [
            ("mass", self.mass),
            ("length", self.length),
            ("time", self.time),
            ("temperature", self.temperature),
            ("angle", self.angle),
        ]
        .iter()
        .filter(|(_, exp)| *exp != 0)
        .map(|(name, exp)| {
            if *exp == 1 {
                format!("[{}]", name)
            } else {
                format!("[{}]^{}", name, exp)
            }
        })
        .collect();

        write!(f, "{}", parts.join(" "))
    }
}

// ============================================================================
// Registry
// ============================================================================

/// A registered unit: `si = (value + offset) * factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct UnitDef {
    dimension: Dimension,
    factor: f64,
    offset: f64,
    prefixable: bool,
}

impl UnitDef {
    const fn new(dimension: Dimension, factor: f64) -> Self {
        Self {
            dimension,
            factor,
            offset: 0.0,
            prefixable: false,
        }
    }

    const fn prefixed(dimension: Dimension, factor: f64) -> Self {
        Self {
            dimension,
            factor,
            offset: 0.0,
            prefixable: true,
        }
    }

    const fn with_offset(dimension: Dimension, factor: f64, offset: f64) -> Self {
        Self {
            dimension,
            factor,
            offset,
            prefixable: false,
        }
    }
}

const SI_PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
];

static UNIT_TABLE: LazyLock<UnitTable> = LazyLock::new(UnitTable::new);

struct UnitTable {
    units: HashMap<&'static str, UnitDef>,
    aliases: HashMap<&'static str, &'static str>,
}

impl UnitTable {
    fn new() -> Self {
        let mut table = Self {
            units: HashMap::new(),
            aliases: HashMap::new(),
        };
        table.register_base_units();
        table.register_derived_units();
        table.register_temperature_units();
        table.register_customary_units();
        table
    }

    fn lookup(&self, symbol: &str) -> Option<UnitDef> {
        if let Some(def) = self.resolve(symbol) {
            return Some(def);
        }

        for &(prefix, scale) in SI_PREFIXES {
            if let Some(base) = symbol.strip_prefix(prefix) {
                if let Some(def) = self.resolve(base).filter(|d| d.prefixable) {
                    return Some(UnitDef {
                        factor: def.factor * scale,
                        prefixable: false,
                        ..def
                    });
                }
            }
        }
        None
    }

    fn resolve(&self, symbol: &str) -> Option<UnitDef> {
        let canonical: &str = match self.aliases.get(symbol) {
            Some(canonical) => canonical,
            None => symbol,
        };
        self.units.get(canonical).copied()
    }

    fn alias(&mut self, canonical: &'static str, aliases: &[&'static str]) {
        for &alias in aliases {
            self.aliases.insert(alias, canonical);
        }
    }

    fn register_base_units(&mut self) {
        self.units.insert("kg", UnitDef::new(Dimension::MASS, 1.0));
        self.units.insert("g", UnitDef::prefixed(Dimension::MASS, 1e-3));
        self.units.insert("t", UnitDef::new(Dimension::MASS, 1e3));

        self.units.insert("m", UnitDef::prefixed(Dimension::LENGTH, 1.0));
        self.alias("m", &["metre", "meter", "metres", "meters"]);

        self.units.insert("s", UnitDef::prefixed(Dimension::TIME, 1.0));
        self.units.insert("min", UnitDef::new(Dimension::TIME, 60.0));
        self.units.insert("h", UnitDef::new(Dimension::TIME, 3600.0));
        self.units.insert("day", UnitDef::new(Dimension::TIME, 86400.0));
        self.alias("s", &["sec", "second", "seconds"]);
        self.alias("min", &["minute", "minutes"]);
        self.alias("h", &["hr", "hour", "hours"]);
        self.alias("day", &["days"]);

        self.units.insert("rad", UnitDef::new(Dimension::ANGLE, 1.0));
        self.units.insert("deg", UnitDef::new(Dimension::ANGLE, PI / 180.0));
        self.alias("rad", &["radian", "radians"]);
        self.alias("deg", &["°", "degree", "degrees"]);

        self.units.insert("%", UnitDef::new(Dimension::DIMENSIONLESS, 0.01));
        self.alias("%", &["percent"]);
    }

    fn register_derived_units(&mut self) {
        self.units.insert("N", UnitDef::prefixed(Dimension::FORCE, 1.0));
        self.units.insert("J", UnitDef::prefixed(Dimension::ENERGY, 1.0));
        self.units.insert("W", UnitDef::prefixed(Dimension::POWER, 1.0));
        self.units.insert("Pa", UnitDef::prefixed(Dimension::PRESSURE, 1.0));
        self.units.insert("bar", UnitDef::prefixed(Dimension::PRESSURE, 1e5));
        self.units.insert("atm", UnitDef::new(Dimension::PRESSURE, 101_325.0));
        self.units.insert("L", UnitDef::prefixed(Dimension::VOLUME, 1e-3));
        self.alias("L", &["l", "litre", "liter"]);
    }

    fn register_temperature_units(&mut self) {
        self.units.insert("K", UnitDef::new(Dimension::TEMPERATURE, 1.0));
        self.units
            .insert("degC", UnitDef::with_offset(Dimension::TEMPERATURE, 1.0, 273.15));
        self.units.insert(
            "degF",
            UnitDef::with_offset(Dimension::TEMPERATURE, 5.0 / 9.0, 459.67),
        );
        self.units.insert("degR", UnitDef::new(Dimension::TEMPERATURE, 5.0 / 9.0));

        self.alias("K", &["kelvin"]);
        self.alias("degC", &["°C", "celsius", "Celsius", "deg_C"]);
        self.alias("degF", &["°F", "fahrenheit", "Fahrenheit", "deg_F"]);
        self.alias("degR", &["°R", "rankine"]);
    }

    fn register_customary_units(&mut self) {
        self.units.insert("in", UnitDef::new(Dimension::LENGTH, 0.0254));
        self.units.insert("ft", UnitDef::new(Dimension::LENGTH, 0.3048));
        self.units.insert("yd", UnitDef::new(Dimension::LENGTH, 0.9144));
        self.units.insert("mi", UnitDef::new(Dimension::LENGTH, 1609.344));
        self.units.insert("nmi", UnitDef::new(Dimension::LENGTH, 1852.0));
        self.alias("in", &["inch", "inches"]);
        self.alias("ft", &["foot", "feet"]);
        self.alias("yd", &["yard", "yards"]);
        self.alias("mi", &["mile", "miles"]);

        self.units.insert("lb", UnitDef::new(Dimension::MASS, 0.453_592_37));
        self.alias("lb", &["lbs", "pound", "pounds"]);

        self.units
            .insert("knot", UnitDef::new(Dimension::VELOCITY, 1852.0 / 3600.0));
        self.units.insert("mph", UnitDef::new(Dimension::VELOCITY, 0.44704));
        self.alias("knot", &["knots", "kt", "kn"]);

        self.units.insert("inHg", UnitDef::new(Dimension::PRESSURE, 3386.389));
        self.units
            .insert("mmHg", UnitDef::new(Dimension::PRESSURE, 133.322_387_415));
        self.units
            .insert("psi", UnitDef::new(Dimension::PRESSURE, 6894.757_293_168));
    }
}

// ============================================================================
// Parser
// ============================================================================

/// A unit expression reduced to its dimension and SI scale.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ParsedUnit {
    dimension: Dimension,
    factor: f64,
    offset: f64,
}

impl ParsedUnit {
    fn parse(expression: &str) -> HarmonizeResult<Self> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(HarmonizeError::UnknownUnit {
                unit: String::new(),
                expression: expression.to_string(),
            });
        }

        let mut parser = UnitParser::new(trimmed);
        let terms = parser.parse_expression()?;
        if parser.peek().is_some() {
            return Err(parser.unexpected());
        }

        let mut dimension = Dimension::DIMENSIONLESS;
        let mut factor = 1.0;
        for (def, exp) in &terms {
            dimension = i8::try_from(*exp)
                .ok()
                .and_then(|exp| def.dimension.checked_pow(exp))
                .and_then(|power| dimension.checked_mul(&power))
                .ok_or_else(|| HarmonizeError::UnknownUnit {
                    unit: format!("exponent {}", exp),
                    expression: expression.to_string(),
                })?;
            factor *= def.factor.powi(*exp);
        }

        let offset = match terms.as_slice() {
            [(def, 1)] => def.offset,
            _ => 0.0,
        };

        Ok(Self {
            dimension,
            factor,
            offset,
        })
    }

    fn to_si(&self, value: f64) -> f64 {
        (value + self.offset) * self.factor
    }

    fn from_si(&self, value: f64) -> f64 {
        value / self.factor - self.offset
    }
}

type Terms = Vec<(UnitDef, i32)>;

struct UnitParser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> UnitParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn rest(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    fn unexpected(&self) -> HarmonizeError {
        HarmonizeError::UnknownUnit {
            unit: self.rest(),
            expression: self.input.to_string(),
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        let rest = self.rest();
        match rest.strip_prefix(keyword) {
            Some(after) => after.is_empty() || after.starts_with(char::is_whitespace),
            None => false,
        }
    }

    fn parse_expression(&mut self) -> HarmonizeResult<Terms> {
        self.skip_whitespace();
        let mut terms = self.parse_term()?;

        loop {
            self.skip_whitespace();
            if self.peek() == Some('/') {
                self.advance();
            } else if self.at_keyword("per") {
                self.pos += 3;
            } else {
                break;
            }
            self.skip_whitespace();
            let divisor = self.parse_term()?;
            terms.extend(divisor.into_iter().map(|(def, exp)| (def, -exp)));
        }

        Ok(terms)
    }

    fn parse_term(&mut self) -> HarmonizeResult<Terms> {
        let mut terms = self.parse_factor()?;

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') | Some('·') => {
                    self.advance();
                    self.skip_whitespace();
                }
                Some(c) if is_factor_start(c) && !self.at_keyword("per") => {}
                _ => break,
            }
            terms.extend(self.parse_factor()?);
        }

        Ok(terms)
    }

    fn parse_factor(&mut self) -> HarmonizeResult<Terms> {
        match self.peek() {
            Some('(') => {
                self.advance();
                let inner = self.parse_expression()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.unexpected());
                }
                self.advance();
                let exp = self.parse_exponent()?;
                inner
                    .into_iter()
                    .map(|(def, e)| {
                        e.checked_mul(exp)
                            .map(|e| (def, e))
                            .ok_or_else(|| HarmonizeError::UnknownUnit {
                                unit: format!("exponent {}*{}", e, exp),
                                expression: self.input.to_string(),
                            })
                    })
                    .collect()
            }
            Some('1') => {
                self.advance();
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(self.unexpected());
                }
                Ok(Vec::new())
            }
            _ => {
                let symbol = self.parse_symbol()?;
                let def = UNIT_TABLE.lookup(&symbol).ok_or_else(|| HarmonizeError::UnknownUnit {
                    unit: symbol.clone(),
                    expression: self.input.to_string(),
                })?;
                let exp = self.parse_exponent()?;
                Ok(vec![(def, exp)])
            }
        }
    }

    fn parse_symbol(&mut self) -> HarmonizeResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_symbol_char) {
            self.advance();
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_exponent(&mut self) -> HarmonizeResult<i32> {
        let before = self.pos;
        self.skip_whitespace();
        let marked = if self.peek() == Some('^') {
            self.advance();
            true
        } else if self.rest().starts_with("**") {
            self.pos += 2;
            true
        } else {
            self.pos = before;
            false
        };
        if marked {
            self.skip_whitespace();
        }

        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let digits: String = self.chars[start..self.pos].iter().collect();
        if digits.is_empty() {
            if marked {
                return Err(self.unexpected());
            }
            return Ok(1);
        }
        digits.parse::<i32>().map_err(|_| {
            self.pos = start;
            self.unexpected()
        })
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '°' || c == '%'
}

fn is_factor_start(c: char) -> bool {
    is_symbol_char(c) || c == '(' || c == '1'
}

// ============================================================================
// Converter
// ============================================================================

/// Converter backed by dimensional analysis over the built-in unit table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionalConverter;

impl DimensionalConverter {
    pub fn new() -> Self {
        Self
    }

    /// Physical dimension of a unit expression.
    pub fn dimension_of(&self, unit: &str) -> HarmonizeResult<Dimension> {
        Ok(ParsedUnit::parse(unit)?.dimension)
    }

    fn prepare(&self, from: &str, to: &str) -> HarmonizeResult<Option<(ParsedUnit, ParsedUnit)>> {
        let source = ParsedUnit::parse(from)?;
        let target = ParsedUnit::parse(to)?;

        if source.dimension != target.dimension {
            return Err(HarmonizeError::IncompatibleUnits {
                from: from.to_string(),
                to: to.to_string(),
                from_dimension: source.dimension.to_string(),
                to_dimension: target.dimension.to_string(),
            });
        }

        if source == target {
            return Ok(None);
        }
        Ok(Some((source, target)))
    }
}

impl UnitConverter for DimensionalConverter {
    fn convert(&self, value: f64, from: &str, to: &str) -> HarmonizeResult<f64> {
        Ok(match self.prepare(from, to)? {
            Some((source, target)) => target.from_si(source.to_si(value)),
            None => value,
        })
    }

    fn convert_all(&self, values: &[f64], from: &str, to: &str) -> HarmonizeResult<Vec<f64>> {
        Ok(match self.prepare(from, to)? {
            Some((source, target)) => values
                .iter()
                .map(|v| target.from_si(source.to_si(*v)))
                .collect(),
            None => values.to_vec(),
        })
    }
}
