use crate::common::Value;
use crate::normalizer::OptionValueNormalizer;

/// Best-effort integer coercion for `skip` and `limit` values.
///
/// `Null` stays `Null`; integers pass through; floats truncate toward zero;
/// anything else is coerced from the leading optionally-signed digits of its
/// string form, defaulting to 0 when there are none. Range policy (e.g.
/// rejecting negative skips) belongs to the execution layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerNormalizer;

impl OptionValueNormalizer for IntegerNormalizer {
    fn normalize(&self, value: Value) -> Value {
        match value {
            Value::Null => Value::Null,
            Value::I32(v) => Value::I64(v as i64),
            Value::I64(_) => value,
            Value::F64(v) => Value::I64(v as i64),
            Value::String(s) => Value::I64(leading_integer(&s)),
            other => Value::I64(leading_integer(&other.to_string())),
        }
    }
}

fn leading_integer(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (sign, digits_part) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = digits_part
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<i64>().map(|v| sign * v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_stays_null() {
        assert_eq!(IntegerNormalizer.normalize(Value::Null), Value::Null);
    }

    #[test]
    fn test_integers_pass_through() {
        assert_eq!(IntegerNormalizer.normalize(Value::I32(5)), Value::I64(5));
        assert_eq!(IntegerNormalizer.normalize(Value::I64(-3)), Value::I64(-3));
    }

    #[test]
    fn test_floats_truncate() {
        assert_eq!(IntegerNormalizer.normalize(Value::F64(5.9)), Value::I64(5));
        assert_eq!(IntegerNormalizer.normalize(Value::F64(-2.7)), Value::I64(-2));
    }

    #[test]
    fn test_strings_parse_leading_digits() {
        assert_eq!(
            IntegerNormalizer.normalize(Value::from("10")),
            Value::I64(10)
        );
        assert_eq!(
            IntegerNormalizer.normalize(Value::from("25abc")),
            Value::I64(25)
        );
        assert_eq!(
            IntegerNormalizer.normalize(Value::from("-7")),
            Value::I64(-7)
        );
        assert_eq!(
            IntegerNormalizer.normalize(Value::from("+12")),
            Value::I64(12)
        );
    }

    #[test]
    fn test_garbage_strings_coerce_to_zero() {
        assert_eq!(IntegerNormalizer.normalize(Value::from("abc")), Value::I64(0));
        assert_eq!(IntegerNormalizer.normalize(Value::from("")), Value::I64(0));
    }

    #[test]
    fn test_other_shapes_coerce_via_string_form() {
        assert_eq!(
            IntegerNormalizer.normalize(Value::Bool(true)),
            Value::I64(0)
        );
    }
}
