use crate::CoreError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Require a strictly positive, finite value.
pub fn ensure_positive(v: f64, what: &'static str) -> Result<f64, CoreError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::InvalidArg { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ensure_finite_names_the_quantity() {
        let err = ensure_finite(f64::NAN, "liquid flow").unwrap_err();
        assert!(err.to_string().contains("liquid flow"));
        assert!(ensure_finite(f64::INFINITY, "kLa").is_err());
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(0.0, "volume").is_err());
        assert!(ensure_positive(-1.0, "volume").is_err());
        assert!(matches!(
            ensure_positive(f64::NAN, "volume"),
            Err(CoreError::NonFinite { .. })
        ));
        assert_eq!(ensure_positive(2.5, "volume").unwrap(), 2.5);
    }

    proptest! {
        #[test]
        fn positive_values_pass_through(v in 1e-12..1e12f64) {
            prop_assert_eq!(ensure_positive(v, "v").unwrap(), v);
        }

        #[test]
        fn non_positive_values_fail(v in -1e12..=0.0f64) {
            let is_invalid_arg = matches!(ensure_positive(v, "v"), Err(CoreError::InvalidArg { what: "v" }));
            prop_assert!(is_invalid_arg);
        }
    }
}
