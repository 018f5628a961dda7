use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

pub mod loan;
pub mod offer;

pub use loan::LoanDecision;
pub use offer::OfferRecommendation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *[Self::Male, Self::Female, Self::Other]
            .choose(rng)
            .unwrap_or(&Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a whole-dollar amount with thousands separators, e.g. `$72,000`.
pub fn format_usd(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    let offset = digits.len() % 3;
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && index % 3 == offset % 3 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::format_usd;

    #[test]
    fn format_usd_groups_thousands() {
        assert_eq!(format_usd(0), "$0");
        assert_eq!(format_usd(950), "$950");
        assert_eq!(format_usd(1_000), "$1,000");
        assert_eq!(format_usd(72_000), "$72,000");
        assert_eq!(format_usd(1_250_000), "$1,250,000");
    }
}
