use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    Germany,
    Czechia,
    Israel,
    Spain,
    Portugal,
    Romania,
    Bulgaria,
    France,
}

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Germany => "Germany",
            Self::Czechia => "Czechia",
            Self::Israel => "Israel",
            Self::Spain => "Spain",
            Self::Portugal => "Portugal",
            Self::Romania => "Romania",
            Self::Bulgaria => "Bulgaria",
            Self::France => "France",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "germany" => Some(Self::Germany),
            "czechia" => Some(Self::Czechia),
            "israel" => Some(Self::Israel),
            "spain" => Some(Self::Spain),
            "portugal" => Some(Self::Portugal),
            "romania" => Some(Self::Romania),
            "bulgaria" => Some(Self::Bulgaria),
            "france" => Some(Self::France),
            _ => None,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    Salaried,
    Freelancer,
    Contractor,
    SelfEmployed,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salaried => "Salaried Employee",
            Self::Freelancer => "Freelancer",
            Self::Contractor => "Contractor",
            Self::SelfEmployed => "Self-Employed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "salaried" | "salaried employee" => Some(Self::Salaried),
            "freelancer" => Some(Self::Freelancer),
            "contractor" => Some(Self::Contractor),
            "self-employed" | "self_employed" => Some(Self::SelfEmployed),
            _ => None,
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO 4217 codes of the currencies regimes are expressed in.
///
/// EUR is the calculation currency: gross salaries, results and converted
/// thresholds are all in euros.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    EUR,
    CZK,
    ILS,
    USD,
    GBP,
    BGN,
    RON,
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::EUR,
        Currency::CZK,
        Currency::ILS,
        Currency::USD,
        Currency::GBP,
        Currency::BGN,
        Currency::RON,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EUR => "EUR",
            Self::CZK => "CZK",
            Self::ILS => "ILS",
            Self::USD => "USD",
            Self::GBP => "GBP",
            Self::BGN => "BGN",
            Self::RON => "RON",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for Currency {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn currency_parse_is_case_insensitive() {
        assert_eq!(Currency::parse("czk"), Some(Currency::CZK));
        assert_eq!(Currency::parse(" EUR "), Some(Currency::EUR));
        assert_eq!(Currency::parse("XYZ"), None);
    }

    #[test]
    fn currency_round_trips_through_as_str() {
        for currency in Currency::ALL {
            assert_eq!(Currency::parse(currency.as_str()), Some(currency));
        }
    }

    #[test]
    fn employment_type_accepts_short_and_long_names() {
        assert_eq!(EmploymentType::parse("salaried"), Some(EmploymentType::Salaried));
        assert_eq!(
            EmploymentType::parse("Salaried Employee"),
            Some(EmploymentType::Salaried)
        );
        assert_eq!(EmploymentType::parse("self_employed"), Some(EmploymentType::SelfEmployed));
    }

    #[test]
    fn country_displays_its_name() {
        assert_eq!(Country::Czechia.to_string(), "Czechia");
        assert_eq!(Country::parse("FRANCE"), Some(Country::France));
    }
}
