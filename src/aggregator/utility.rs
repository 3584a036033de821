use crate::aggregator::types::{Grade, GradeError};

/// Computes the arithmetic mean of a slice of values. Returns `None` for empty
/// input so callers can tell "no data" apart from an average of zero.
///
/// Finite input always gives a finite mean, even when the plain sum would
/// overflow.
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        Some(values.iter().map(|v| v / n).sum())
    }
}

/// Converts every grade in a list, failing on the first unparseable entry.
pub(crate) fn to_numbers(grades: &[Grade]) -> Result<Vec<f64>, GradeError> {
    grades.iter().map(Grade::to_f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_empty_is_absent() {
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn test_average_values() {
        assert_eq!(average(&[2.0, 4.0, 6.0]), Some(4.0));
        assert_eq!(average(&[0.0]), Some(0.0));
        assert_eq!(average(&[7.5]), Some(7.5));
    }

    #[test]
    fn test_average_large_values_do_not_overflow() {
        assert_eq!(average(&[1e308, 1e308]), Some(1e308));
        assert_eq!(average(&[-1e308, -1e308]), Some(-1e308));
    }

    #[test]
    fn test_to_numbers_stops_on_bad_grade() {
        let grades = vec![Grade::from(1.0), Grade::from("2"), Grade::from("two")];
        assert_eq!(
            to_numbers(&grades),
            Err(GradeError::NotNumeric("two".to_string()))
        );
        assert_eq!(to_numbers(&grades[..2]), Ok(vec![1.0, 2.0]));
    }
}
