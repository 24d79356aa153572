use anyhow::anyhow;
use serde_json::{Number, Value};

use super::{Format, FormatContext, FormatKind};
use crate::errors::FormatError;
use crate::value::to_text;

// Read a number out of loosely formatted input such as `$1,234.50`
fn parse(value: &Value) -> Result<Option<f64>, FormatError> {
    if let Value::Number(n) = value {
        return Ok(n.as_f64());
    }

    let digits: String = to_text(value)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if digits.is_empty() {
        return Ok(None);
    }

    digits
        .parse::<f64>()
        .map(Some)
        .map_err(|e| anyhow!("invalid number `{digits}`: {e}").into())
}

fn round(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

fn to_json(value: f64, precision: u32) -> Value {
    if precision == 0 && value.abs() < 1e15 {
        return Value::from(value as i64);
    }
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

fn sign_class(value: f64) -> &'static str {
    if value > 0.0 {
        "positive"
    } else if value < 0.0 {
        "negative"
    } else {
        "zero"
    }
}

/// Render the absolute value with thousands separators
pub(crate) fn grouped(value: f64, precision: usize) -> String {
    let fixed = format!("{:.*}", precision, value.abs());
    let (int, frac) = match fixed.split_once('.') {
        Some((int, frac)) => (int.to_string(), Some(frac.to_string())),
        None => (fixed, None),
    };

    let mut out = String::new();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    if let Some(frac) = frac {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// Rounds to a fixed precision, renders as a signed span in html
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatNumber {
    precision: u32,
}

impl FormatNumber {
    pub fn new(precision: u32) -> Self {
        FormatNumber { precision }
    }
}

impl Format for FormatNumber {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(parse(value)?
            .map(|n| to_json(round(n, self.precision), self.precision))
            .unwrap_or(Value::Null))
    }

    fn html(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        let Some(n) = parse(value)?.map(|n| round(n, self.precision)) else {
            return Ok(Value::from(""));
        };
        let sign = if n < 0.0 { "-" } else { "" };
        Ok(Value::from(format!(
            "<span class='number {}'>{sign}{}</span>",
            sign_class(n),
            grouped(n, self.precision as usize)
        )))
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Number
    }
}

/// Currency amounts with two decimals
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatMoney;

impl FormatMoney {
    fn amount(value: &Value) -> Result<f64, FormatError> {
        Ok(round(parse(value)?.unwrap_or(0.0), 2))
    }
}

impl Format for FormatMoney {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(Value::from(format!("{:.2}", Self::amount(value)?)))
    }

    fn html(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        let n = Self::amount(value)?;
        let amount = format!("${}", grouped(n, 2));
        let amount = if n < 0.0 { format!("({amount})") } else { amount };
        Ok(Value::from(format!(
            "<span class='money {}'>{amount}</span>",
            sign_class(n)
        )))
    }

    fn export(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        let n = Self::amount(value)?;
        let sign = if n < 0.0 { "-" } else { "" };
        Ok(Value::from(format!("{sign}${}", grouped(n, 2))))
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Money
    }
}

/// Percentages with two decimals
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatPercentage;

impl FormatPercentage {
    fn amount(value: &Value) -> Result<f64, FormatError> {
        Ok(round(round(parse(value)?.unwrap_or(0.0), 3), 2))
    }
}

impl Format for FormatPercentage {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(Value::from(format!("{:.2}", Self::amount(value)?)))
    }

    fn html(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        let n = Self::amount(value)?;
        let sign = if n < 0.0 { "-" } else { "" };
        Ok(Value::from(format!(
            "<span class='percentage'>{sign}{} %</span>",
            grouped(n, 2)
        )))
    }

    fn form(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(to_json(Self::amount(value)?, 2))
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Percentage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{apply, FormatMode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map};

    fn fmt(f: &dyn Format, value: Value, mode: FormatMode) -> Value {
        let map = Map::new();
        apply(f, &value, mode, &FormatContext::new(&map))
    }

    #[test]
    fn it_groups_thousands() {
        assert_eq!(grouped(1234567.891, 2), "1,234,567.89");
        assert_eq!(grouped(-12.0, 0), "12");
        assert_eq!(grouped(999.0, 1), "999.0");
    }

    #[test]
    fn it_formats_numbers() {
        let f = FormatNumber::new(1);
        assert_eq!(fmt(&f, json!("$1,234.56"), FormatMode::Raw), json!(1234.6));
        assert_eq!(fmt(&f, json!(""), FormatMode::Raw), Value::Null);
        assert_eq!(
            fmt(&f, json!(-1234.56), FormatMode::Html),
            json!("<span class='number negative'>-1,234.6</span>")
        );
        assert_eq!(fmt(&FormatNumber::new(0), json!("7.4"), FormatMode::Form), json!(7));
    }

    #[test]
    fn it_degrades_malformed_numbers() {
        assert_eq!(
            fmt(&FormatNumber::default(), json!("1-2"), FormatMode::Raw),
            Value::Null
        );
    }

    #[test]
    fn it_formats_money() {
        assert_eq!(fmt(&FormatMoney, json!("1234.5"), FormatMode::Raw), json!("1234.50"));
        assert_eq!(fmt(&FormatMoney, json!(null), FormatMode::Raw), json!("0.00"));
        assert_eq!(
            fmt(&FormatMoney, json!(-1234.5), FormatMode::Html),
            json!("<span class='money negative'>($1,234.50)</span>")
        );
        assert_eq!(
            fmt(&FormatMoney, json!(-1234.5), FormatMode::Export),
            json!("-$1,234.50")
        );
    }

    #[test]
    fn it_formats_percentages() {
        assert_eq!(
            fmt(&FormatPercentage, json!("12.3456"), FormatMode::Raw),
            json!("12.35")
        );
        assert_eq!(
            fmt(&FormatPercentage, json!("1200"), FormatMode::Html),
            json!("<span class='percentage'>1,200.00 %</span>")
        );
        assert_eq!(fmt(&FormatPercentage, json!("5.5"), FormatMode::Form), json!(5.5));
    }
}
