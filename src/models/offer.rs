use crate::models::{format_usd, Gender};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

pub const PRODUCT_CATALOG: [&str; 5] = [
    "Home Loan",
    "Personal Loan",
    "Credit Card",
    "Savings Account",
    "Travel Card",
];

/// Offer handed out when no rule in [`OFFER_RULES`] matches.
pub const DEFAULT_OFFER: &str = "Standard Credit Card Offer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendCategory {
    Travel,
    Shopping,
    Dining,
    Groceries,
}

impl SpendCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Travel => "Travel",
            Self::Shopping => "Shopping",
            Self::Dining => "Dining",
            Self::Groceries => "Groceries",
        }
    }

    fn spend_range(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            Self::Travel => 5_000..=20_000,
            Self::Shopping => 3_000..=15_000,
            Self::Dining => 2_000..=10_000,
            Self::Groceries => 4_000..=12_000,
        }
    }
}

impl fmt::Display for SpendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpendPattern {
    pub category: SpendCategory,
    pub annual_spend: u32,
}

#[derive(Debug, Clone)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub age: u32,
    pub gender: Gender,
    pub income: u32,
    pub existing_products: Vec<&'static str>,
    pub spend: SpendPattern,
}

impl CustomerProfile {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let product_count = rng.gen_range(1..=3);
        let existing_products: Vec<&'static str> = PRODUCT_CATALOG
            .choose_multiple(rng, product_count)
            .copied()
            .collect();

        let category = *[
            SpendCategory::Travel,
            SpendCategory::Shopping,
            SpendCategory::Dining,
            SpendCategory::Groceries,
        ]
        .choose(rng)
        .unwrap_or(&SpendCategory::Groceries);

        Self {
            customer_id: format!("CUST{}", rng.gen_range(1000..=9999)),
            age: rng.gen_range(25..=60),
            gender: Gender::sample(rng),
            income: rng.gen_range(40_000..=150_000),
            existing_products,
            spend: SpendPattern {
                category,
                annual_spend: rng.gen_range(category.spend_range()),
            },
        }
    }

    pub fn holds(&self, product: &str) -> bool {
        self.existing_products.contains(&product)
    }
}

impl fmt::Display for CustomerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Customer ID: {}", self.customer_id)?;
        writeln!(
            f,
            "Demographics: Age {}, Gender {}, Income {}",
            self.age,
            self.gender,
            format_usd(self.income)
        )?;
        writeln!(f, "Existing Products: {}", self.existing_products.join(", "))?;
        write!(
            f,
            "Spend Pattern: {} ({} annual)",
            self.spend.category,
            format_usd(self.spend.annual_spend)
        )
    }
}

/// One row of the recommendation model: an offer name and the predicate that
/// qualifies a profile for it. Rules are evaluated in table order and are not
/// mutually exclusive.
pub struct OfferRule {
    pub name: &'static str,
    pub matches: fn(&CustomerProfile) -> bool,
}

fn travel_credit_card(profile: &CustomerProfile) -> bool {
    profile.spend.category == SpendCategory::Travel && profile.spend.annual_spend > 8_000
}

fn dining_cashback_card(profile: &CustomerProfile) -> bool {
    profile.spend.category == SpendCategory::Dining && profile.spend.annual_spend > 5_000
}

fn personal_loan_top_up(profile: &CustomerProfile) -> bool {
    profile.holds("Personal Loan") && profile.income > 60_000
}

fn high_yield_savings(profile: &CustomerProfile) -> bool {
    profile.holds("Savings Account") && profile.income > 80_000
}

fn shopping_rewards_card(profile: &CustomerProfile) -> bool {
    profile.spend.category == SpendCategory::Shopping && profile.spend.annual_spend > 7_000
}

pub const OFFER_RULES: [OfferRule; 5] = [
    OfferRule {
        name: "Travel Credit Card",
        matches: travel_credit_card,
    },
    OfferRule {
        name: "Dining Cashback Card",
        matches: dining_cashback_card,
    },
    OfferRule {
        name: "Personal Loan Top-up",
        matches: personal_loan_top_up,
    },
    OfferRule {
        name: "High-Yield Savings Account",
        matches: high_yield_savings,
    },
    OfferRule {
        name: "Shopping Rewards Card",
        matches: shopping_rewards_card,
    },
];

/// Names of every rule the profile qualifies for, in table order; never empty
/// thanks to the default-offer fallback.
pub fn recommend(profile: &CustomerProfile) -> Vec<&'static str> {
    let matched: Vec<&'static str> = OFFER_RULES
        .iter()
        .filter(|rule| (rule.matches)(profile))
        .map(|rule| rule.name)
        .collect();

    if matched.is_empty() {
        vec![DEFAULT_OFFER]
    } else {
        matched
    }
}

/// One synthetic recommendation-model output: the sampled profile together
/// with the offers it qualified for. Single-slot "latest" in the session.
#[derive(Debug, Clone)]
pub struct OfferRecommendation {
    pub profile: CustomerProfile,
    pub offers: Vec<&'static str>,
}

impl OfferRecommendation {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let profile = CustomerProfile::generate(rng);
        let offers = recommend(&profile);
        Self { profile, offers }
    }

    /// Transcript entry recorded when the generator runs.
    pub fn summary(&self) -> String {
        format!("Offer recommendation record:\n{self}")
    }
}

impl fmt::Display for OfferRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.profile)?;
        write!(f, "Recommended Offers: {}", self.offers.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn profile(
        income: u32,
        products: Vec<&'static str>,
        category: SpendCategory,
        annual_spend: u32,
    ) -> CustomerProfile {
        CustomerProfile {
            customer_id: "CUST0001".to_string(),
            age: 40,
            gender: Gender::Other,
            income,
            existing_products: products,
            spend: SpendPattern {
                category,
                annual_spend,
            },
        }
    }

    #[test]
    fn heavy_travel_spend_earns_the_travel_card() {
        let profile = profile(50_000, vec!["Credit Card"], SpendCategory::Travel, 9_000);
        assert_eq!(recommend(&profile), vec!["Travel Credit Card"]);
    }

    #[test]
    fn multiple_rules_can_match_one_profile() {
        let profile = profile(
            90_000,
            vec!["Personal Loan", "Savings Account"],
            SpendCategory::Dining,
            6_000,
        );
        assert_eq!(
            recommend(&profile),
            vec![
                "Dining Cashback Card",
                "Personal Loan Top-up",
                "High-Yield Savings Account",
            ]
        );
    }

    #[test]
    fn no_match_falls_back_to_the_default_offer_exactly() {
        let profile = profile(45_000, vec!["Home Loan"], SpendCategory::Groceries, 5_000);
        assert_eq!(recommend(&profile), vec![DEFAULT_OFFER]);
    }

    #[test]
    fn spend_thresholds_are_strict() {
        let at_threshold = profile(50_000, vec!["Home Loan"], SpendCategory::Travel, 8_000);
        assert_eq!(recommend(&at_threshold), vec![DEFAULT_OFFER]);

        let above_threshold = profile(50_000, vec!["Home Loan"], SpendCategory::Travel, 8_001);
        assert_eq!(recommend(&above_threshold), vec!["Travel Credit Card"]);
    }

    #[test]
    fn recommendations_are_never_empty_and_never_repeat() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let record = OfferRecommendation::generate(&mut rng);
            assert!(!record.offers.is_empty());

            let mut seen = record.offers.clone();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), record.offers.len());
        }
    }

    #[test]
    fn generated_profiles_stay_inside_sampling_ranges() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let record = OfferRecommendation::generate(&mut rng);
            let profile = &record.profile;

            assert!(profile.customer_id.starts_with("CUST"));
            assert!((25..=60).contains(&profile.age));
            assert!((40_000..=150_000).contains(&profile.income));
            assert!((1..=3).contains(&profile.existing_products.len()));
            assert!(profile
                .existing_products
                .iter()
                .all(|product| PRODUCT_CATALOG.contains(product)));
            assert!(profile
                .spend
                .category
                .spend_range()
                .contains(&profile.spend.annual_spend));
        }
    }

    #[test]
    fn summary_serializes_profile_and_offers() {
        let profile = profile(90_000, vec!["Savings Account"], SpendCategory::Travel, 12_000);
        let record = OfferRecommendation {
            offers: recommend(&profile),
            profile,
        };
        let summary = record.summary();

        assert!(summary.starts_with("Offer recommendation record:"));
        assert!(summary.contains("CUST0001"));
        assert!(summary.contains("Savings Account"));
        assert!(summary.contains("Travel ($12,000 annual)"));
        assert!(summary.contains("Travel Credit Card"));
        assert!(summary.contains("High-Yield Savings Account"));
    }
}
