//! Utilities related to displaying numbers in tables and on the dashboard.

use std::fmt;

use num_format::Locale;
use num_format::ToFormattedString;

/// Utility struct for displays percentages. The first item in the struct is the
/// numerator and the second item in the struct is the denominator.
///
/// ```
/// use bamalyzer::utils::display::PercentageFormat;
///
/// assert_eq!(PercentageFormat(950, 1000).to_string(), "95.00%");
/// assert_eq!(PercentageFormat(1, 0).to_string(), "N/A");
/// ```
pub struct PercentageFormat(pub u64, pub u64);

impl fmt::Display for PercentageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 == 0 {
            f.write_str("N/A")
        } else {
            let (a, b) = (self.0 as f64, self.1 as f64);
            write!(f, "{:.2}%", a / b * 100.0)
        }
    }
}

/// Displays a count with thousands separators.
///
/// ```
/// use bamalyzer::utils::display::CountFormat;
///
/// assert_eq!(CountFormat(248956422).to_string(), "248,956,422");
/// ```
pub struct CountFormat(pub u64);

impl fmt::Display for CountFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_formatted_string(&Locale::en))
    }
}

/// Displays a coverage ratio, or `N/A` when it is undefined.
pub struct CoverageFormat(pub Option<f64>);

impl fmt::Display for CoverageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(coverage) => write!(f, "{:.6}", coverage),
            None => f.write_str("N/A"),
        }
    }
}
