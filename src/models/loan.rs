use crate::models::{format_usd, Gender};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// Past-payment histories the synthetic model can report. The decision rule
/// keys off the "Defaulted" substring, so that wording is load-bearing.
pub const PAST_ISSUE_CATEGORIES: [&str; 4] = [
    "No significant issues",
    "1 late payment in last year",
    "Multiple late payments in last 2 years",
    "Defaulted on a loan 3 years ago",
];

pub const CREDIT_SCORE_RANGE: std::ops::RangeInclusive<u32> = 550..=820;
pub const APPROVAL_SCORE_FLOOR: u32 = 670;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFactor {
    Low,
    Medium,
    High,
}

impl RiskFactor {
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *[Self::Low, Self::Medium, Self::High]
            .choose(rng)
            .unwrap_or(&Self::Medium)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synthetic loan-model output. Only the latest record is kept by the
/// session; each generator invocation overwrites it.
#[derive(Debug, Clone)]
pub struct LoanDecision {
    pub applicant_id: String,
    pub age: u32,
    pub gender: Gender,
    pub income: u32,
    pub credit_score: u32,
    pub past_issues: &'static str,
    pub risk: RiskFactor,
    pub decision: Decision,
}

impl LoanDecision {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let credit_score = rng.gen_range(CREDIT_SCORE_RANGE);
        let past_issues = PAST_ISSUE_CATEGORIES
            .choose(rng)
            .copied()
            .unwrap_or(PAST_ISSUE_CATEGORIES[0]);
        let risk = RiskFactor::sample(rng);

        Self {
            applicant_id: format!("APP{}", rng.gen_range(1000..=9999)),
            age: rng.gen_range(22..=60),
            gender: Gender::sample(rng),
            income: rng.gen_range(30_000..=120_000),
            credit_score,
            past_issues,
            risk,
            decision: decide(credit_score, risk, past_issues),
        }
    }

    /// Transcript entry recorded when the generator runs.
    pub fn summary(&self) -> String {
        format!("Loan decision record:\n{self}")
    }
}

impl fmt::Display for LoanDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Applicant ID: {}", self.applicant_id)?;
        writeln!(
            f,
            "Demographics: Age {}, Gender {}, Income {}",
            self.age,
            self.gender,
            format_usd(self.income)
        )?;
        writeln!(f, "Credit Score: {}", self.credit_score)?;
        writeln!(f, "Past Payment Issues: {}", self.past_issues)?;
        writeln!(f, "Risk Factor: {}", self.risk)?;
        write!(f, "Decision: {}", self.decision)
    }
}

/// The whole "model": approve iff the score clears the floor, risk is not
/// High, and the payment history never defaulted.
pub fn decide(credit_score: u32, risk: RiskFactor, past_issues: &str) -> Decision {
    if credit_score > APPROVAL_SCORE_FLOOR
        && risk != RiskFactor::High
        && !past_issues.contains("Defaulted")
    {
        Decision::Approved
    } else {
        Decision::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn clean_history_low_risk_high_score_is_approved() {
        assert_eq!(
            decide(700, RiskFactor::Low, "No significant issues"),
            Decision::Approved
        );
    }

    #[test]
    fn high_risk_rejects_regardless_of_score() {
        assert_eq!(
            decide(700, RiskFactor::High, "No significant issues"),
            Decision::Rejected
        );
        assert_eq!(
            decide(820, RiskFactor::High, "No significant issues"),
            Decision::Rejected
        );
    }

    #[test]
    fn score_at_or_below_floor_rejects() {
        assert_eq!(
            decide(670, RiskFactor::Low, "No significant issues"),
            Decision::Rejected
        );
        assert_eq!(
            decide(550, RiskFactor::Low, "No significant issues"),
            Decision::Rejected
        );
    }

    #[test]
    fn defaulted_history_rejects_even_with_clean_numbers() {
        assert_eq!(
            decide(800, RiskFactor::Low, "Defaulted on a loan 3 years ago"),
            Decision::Rejected
        );
    }

    #[test]
    fn late_payments_without_default_do_not_reject_on_their_own() {
        assert_eq!(
            decide(700, RiskFactor::Medium, "Multiple late payments in last 2 years"),
            Decision::Approved
        );
    }

    #[test]
    fn generated_records_stay_inside_sampling_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let record = LoanDecision::generate(&mut rng);
            assert!(CREDIT_SCORE_RANGE.contains(&record.credit_score));
            assert!((22..=60).contains(&record.age));
            assert!((30_000..=120_000).contains(&record.income));
            assert!(record.applicant_id.starts_with("APP"));
            assert!(PAST_ISSUE_CATEGORIES.contains(&record.past_issues));
            assert_eq!(
                record.decision,
                decide(record.credit_score, record.risk, record.past_issues)
            );
        }
    }

    #[test]
    fn summary_serializes_every_field() {
        let mut rng = StdRng::seed_from_u64(11);
        let record = LoanDecision::generate(&mut rng);
        let summary = record.summary();

        assert!(summary.starts_with("Loan decision record:"));
        assert!(summary.contains(&record.applicant_id));
        assert!(summary.contains(&record.credit_score.to_string()));
        assert!(summary.contains(record.past_issues));
        assert!(summary.contains(record.risk.as_str()));
        assert!(summary.contains(record.decision.as_str()));
    }
}
