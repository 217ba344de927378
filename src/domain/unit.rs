use serde::Deserialize;

const KG_PER_POUND: f64 = 0.453_592_37;
const POUNDS_PER_KG: f64 = 2.2046;

/// Unit the host speaks for weight; the platform always stores kilograms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassUnit {
    #[default]
    Kg,
    Pound,
}

impl MassUnit {
    /// Host value to kilograms
    pub fn to_kilograms(self, value: f64) -> f64 {
        match self {
            Self::Kg => value,
            Self::Pound => value * KG_PER_POUND,
        }
    }

    /// Stored kilograms to the host unit, rounded to a whole number
    pub fn from_kilograms(self, kilograms: i64) -> i64 {
        match self {
            Self::Kg => kilograms,
            Self::Pound => (kilograms as f64 * POUNDS_PER_KG).round() as i64,
        }
    }
}
