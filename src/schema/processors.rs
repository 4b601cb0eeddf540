use crate::schema::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named value transform.
///
/// The transform set is closed so schemas stay plain serializable data: each
/// variant is a pure `Value -> Value` step that may fail. Faults are caught by
/// the extraction engine and null the affected element only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Processor {
    Trim,
    Lowercase,
    Uppercase,
    SqueezeWhitespace,
    StripCurrency,
    ParseInt,
    ParseFloat,
}

/// A processor rejected its input
#[derive(Debug, Error)]
#[error("{processor:?} failed on {input:?}: {message}")]
pub struct ProcessorFault {
    pub processor: Processor,
    pub input: Value,
    pub message: String,
}

impl Processor {
    /// Applies this transform to a value
    pub fn apply(&self, value: Value) -> Result<Value, ProcessorFault> {
        match self {
            Processor::Trim => self.map_text(value, |s| s.trim().to_string()),
            Processor::Lowercase => self.map_text(value, |s| s.to_lowercase()),
            Processor::Uppercase => self.map_text(value, |s| s.to_uppercase()),
            Processor::SqueezeWhitespace => self.map_text(value, |s| {
                s.split_whitespace().collect::<Vec<_>>().join(" ")
            }),
            Processor::StripCurrency => self.map_text(value, |s| {
                s.chars()
                    .filter(|c| !matches!(c, '$' | '€' | '£' | ','))
                    .collect::<String>()
                    .trim()
                    .to_string()
            }),
            Processor::ParseInt => match value {
                Value::Int(n) => Ok(Value::Int(n)),
                Value::Text(s) => match s.trim().parse::<i64>() {
                    Ok(n) => Ok(Value::Int(n)),
                    Err(e) => Err(self.fault(Value::Text(s), e.to_string())),
                },
                other => Err(self.fault(other, "expected text or integer".to_string())),
            },
            Processor::ParseFloat => match value {
                Value::Int(n) => Ok(Value::Float(n as f64)),
                Value::Float(f) => Ok(Value::Float(f)),
                Value::Text(s) => match s.trim().parse::<f64>() {
                    Ok(f) => Ok(Value::Float(f)),
                    Err(e) => Err(self.fault(Value::Text(s), e.to_string())),
                },
                other => Err(self.fault(other, "expected text or a number".to_string())),
            },
        }
    }

    fn map_text(
        &self,
        value: Value,
        f: impl FnOnce(&str) -> String,
    ) -> Result<Value, ProcessorFault> {
        match value {
            Value::Text(s) => Ok(Value::Text(f(&s))),
            other => Err(self.fault(other, "expected text".to_string())),
        }
    }

    fn fault(&self, input: Value, message: String) -> ProcessorFault {
        ProcessorFault {
            processor: *self,
            input,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_trim() {
        let out = Processor::Trim.apply(text("  hi  ")).unwrap();
        assert_eq!(out, text("hi"));
    }

    #[test]
    fn test_case_transforms() {
        assert_eq!(Processor::Lowercase.apply(text("AbC")).unwrap(), text("abc"));
        assert_eq!(Processor::Uppercase.apply(text("AbC")).unwrap(), text("ABC"));
    }

    #[test]
    fn test_squeeze_whitespace() {
        let out = Processor::SqueezeWhitespace
            .apply(text("a\n  b\t c"))
            .unwrap();
        assert_eq!(out, text("a b c"));
    }

    #[test]
    fn test_strip_currency() {
        let out = Processor::StripCurrency.apply(text("$1,299.99")).unwrap();
        assert_eq!(out, text("1299.99"));

        let out = Processor::StripCurrency.apply(text("€ 45")).unwrap();
        assert_eq!(out, text("45"));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(Processor::ParseInt.apply(text(" 42 ")).unwrap(), Value::Int(42));
        assert_eq!(Processor::ParseInt.apply(Value::Int(7)).unwrap(), Value::Int(7));
        assert!(Processor::ParseInt.apply(text("4.5")).is_err());
        assert!(Processor::ParseInt.apply(text("abc")).is_err());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(
            Processor::ParseFloat.apply(text("1299.99")).unwrap(),
            Value::Float(1299.99)
        );
        assert_eq!(
            Processor::ParseFloat.apply(Value::Int(3)).unwrap(),
            Value::Float(3.0)
        );
        assert!(Processor::ParseFloat.apply(text("n/a")).is_err());
    }

    #[test]
    fn test_price_pipeline() {
        // strip-currency then parse-float, the common e-commerce chain
        let mut value = text("$1,299.99");
        for p in [Processor::StripCurrency, Processor::ParseFloat] {
            value = p.apply(value).unwrap();
        }
        assert_eq!(value, Value::Float(1299.99));
    }

    #[test]
    fn test_fault_on_wrong_input_type() {
        let err = Processor::Trim.apply(Value::Int(1)).unwrap_err();
        assert_eq!(err.processor, Processor::Trim);
    }

    #[test]
    fn test_serde_names_are_kebab_case() {
        let json = serde_json::to_string(&Processor::StripCurrency).unwrap();
        assert_eq!(json, r#""strip-currency""#);

        let p: Processor = serde_json::from_str(r#""squeeze-whitespace""#).unwrap();
        assert_eq!(p, Processor::SqueezeWhitespace);
    }
}
