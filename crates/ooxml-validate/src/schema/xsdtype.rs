//! XSD attribute value types and their facet validation.

use regex::Regex;

#[derive(Clone, Debug)]
pub enum XsdType {
    String {
        pattern: Option<Regex>,
        min_len: Option<usize>,
        max_len: Option<usize>,
        enum_values: Option<Vec<String>>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Decimal {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    List(Box<XsdType>),
    Union(Vec<XsdType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeViolation {
    ValueOutOfRange { bound_description: String },
    InvalidBoolean,
    PatternMismatch,
    InvalidListItem { position: usize },
    NoUnionAlternativeMatched,
}

impl XsdType {
    pub fn string(min_len: Option<usize>, max_len: Option<usize>) -> Self {
        XsdType::String { pattern: None, min_len, max_len, enum_values: None }
    }

    pub fn validate(&self, value: &str) -> Result<(), TypeViolation> {
        match self {
            XsdType::String { pattern, min_len, max_len, enum_values } => {
                if let Some(re) = pattern {
                    // Full-string match: a regex `^...$` anchored pattern.
                    if !re.is_match(value) {
                        return Err(TypeViolation::PatternMismatch);
                    }
                }
                let len = value.chars().count();
                if let Some(min) = min_len {
                    if len < *min {
                        return Err(TypeViolation::ValueOutOfRange {
                            bound_description: format!("length >= {min}"),
                        });
                    }
                }
                if let Some(max) = max_len {
                    if len > *max {
                        return Err(TypeViolation::ValueOutOfRange {
                            bound_description: format!("length <= {max}"),
                        });
                    }
                }
                if let Some(values) = enum_values {
                    if !values.iter().any(|v| v == value) {
                        return Err(TypeViolation::ValueOutOfRange {
                            bound_description: format!("one of {values:?}"),
                        });
                    }
                }
                Ok(())
            }
            XsdType::Integer { min, max } => {
                let n: i64 = value.parse().map_err(|_| TypeViolation::ValueOutOfRange {
                    bound_description: "a valid integer".to_string(),
                })?;
                check_bounds(n as f64, min.map(|v| v as f64), max.map(|v| v as f64))
            }
            XsdType::Decimal { min, max } => {
                let n: f64 = value.parse().map_err(|_| TypeViolation::ValueOutOfRange {
                    bound_description: "a valid decimal".to_string(),
                })?;
                if n.is_nan() || n.is_infinite() {
                    return Err(TypeViolation::ValueOutOfRange {
                        bound_description: "finite number (NaN/INF forbidden)".to_string(),
                    });
                }
                check_bounds(n, *min, *max)
            }
            XsdType::Boolean => match value {
                "true" | "false" | "1" | "0" => Ok(()),
                _ => Err(TypeViolation::InvalidBoolean),
            },
            XsdType::List(item_type) => {
                for (i, token) in value.split_whitespace().enumerate() {
                    if item_type.validate(token).is_err() {
                        return Err(TypeViolation::InvalidListItem { position: i });
                    }
                }
                Ok(())
            }
            XsdType::Union(alternatives) => {
                // First-listed alternative wins when more than one would validate.
                if alternatives.iter().any(|alt| alt.validate(value).is_ok()) {
                    Ok(())
                } else {
                    Err(TypeViolation::NoUnionAlternativeMatched)
                }
            }
        }
    }
}

fn check_bounds(n: f64, min: Option<f64>, max: Option<f64>) -> Result<(), TypeViolation> {
    if let Some(min) = min {
        if n < min {
            return Err(TypeViolation::ValueOutOfRange {
                bound_description: format!(">= {min}"),
            });
        }
    }
    if let Some(max) = max {
        if n > max {
            return Err(TypeViolation::ValueOutOfRange {
                bound_description: format!("<= {max}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_bound_exactly_equal_is_valid() {
        let t = XsdType::Integer { min: Some(0), max: Some(100) };
        assert!(t.validate("100").is_ok());
        assert!(t.validate("0").is_ok());
        assert!(t.validate("101").is_err());
    }

    #[test]
    fn string_one_char_over_max_len_is_out_of_range() {
        let t = XsdType::string(None, Some(3));
        assert!(t.validate("abc").is_ok());
        assert!(t.validate("abcd").is_err());
    }

    #[test]
    fn boolean_accepts_only_four_literal_forms() {
        let t = XsdType::Boolean;
        for ok in ["true", "false", "1", "0"] {
            assert!(t.validate(ok).is_ok());
        }
        assert_eq!(t.validate("True"), Err(TypeViolation::InvalidBoolean));
        assert_eq!(t.validate("yes"), Err(TypeViolation::InvalidBoolean));
    }

    #[test]
    fn decimal_rejects_nan_and_infinite_literals() {
        let t = XsdType::Decimal { min: None, max: None };
        assert!(t.validate("NaN").is_err());
        assert!(t.validate("inf").is_err());
        assert!(t.validate("3.14").is_ok());
    }

    #[test]
    fn list_reports_position_of_first_invalid_item() {
        let t = XsdType::List(Box::new(XsdType::Integer { min: Some(0), max: Some(10) }));
        assert_eq!(t.validate("1 2 99 4"), Err(TypeViolation::InvalidListItem { position: 2 }));
    }

    #[test]
    fn union_picks_first_listed_alternative() {
        let t = XsdType::Union(vec![
            XsdType::Integer { min: Some(0), max: Some(10) },
            XsdType::string(None, None),
        ]);
        assert!(t.validate("5").is_ok());
        assert!(t.validate("hello").is_ok());
    }

    #[test]
    fn pattern_is_full_string_match() {
        let t = XsdType::String {
            pattern: Some(Regex::new(r"^[A-Z][a-z]*$").unwrap()),
            min_len: None,
            max_len: None,
            enum_values: None,
        };
        assert!(t.validate("Slide").is_ok());
        assert!(t.validate("xSlide").is_err());
    }
}
