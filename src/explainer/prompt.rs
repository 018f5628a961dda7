use crate::models::{LoanDecision, OfferRecommendation};

/// System prompt for one-shot explanation requests. The conversational loop
/// carries its own system prompt inside the session bootstrap.
pub const EXPLAINER_SYSTEM_PROMPT: &str = "You are an expert AI assistant that explains ML \
     model decisions to business users in clear, concise language.";

/// Serializes every field of the loan record plus the fixed instruction.
pub fn loan_explanation(decision: &LoanDecision) -> String {
    format!(
        "{decision}\n\n\
         As an AI assistant, explain in plain language why this loan was approved or rejected. \
         Highlight the most influential factors and suggest what could improve the outcome if \
         rejected."
    )
}

/// Serializes the customer profile and offer list plus the fixed instruction.
pub fn offer_explanation(recommendation: &OfferRecommendation) -> String {
    format!(
        "{recommendation}\n\n\
         Explain in plain language why these offers were recommended, referencing the \
         customer's products and spend patterns."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::offer::{recommend, CustomerProfile, SpendCategory, SpendPattern};
    use crate::models::Gender;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn loan_prompt_embeds_every_field_and_the_instruction() {
        let mut rng = StdRng::seed_from_u64(29);
        let decision = LoanDecision::generate(&mut rng);

        let prompt = loan_explanation(&decision);

        assert!(prompt.contains(&decision.applicant_id));
        assert!(prompt.contains(&decision.age.to_string()));
        assert!(prompt.contains(decision.gender.as_str()));
        assert!(prompt.contains(&decision.credit_score.to_string()));
        assert!(prompt.contains(decision.past_issues));
        assert!(prompt.contains(decision.risk.as_str()));
        assert!(prompt.contains(decision.decision.as_str()));
        assert!(prompt.contains("explain in plain language"));
    }

    #[test]
    fn offer_prompt_embeds_profile_offers_and_the_instruction() {
        let profile = CustomerProfile {
            customer_id: "CUST4242".to_string(),
            age: 37,
            gender: Gender::Female,
            income: 95_000,
            existing_products: vec!["Savings Account", "Credit Card"],
            spend: SpendPattern {
                category: SpendCategory::Dining,
                annual_spend: 7_500,
            },
        };
        let recommendation = OfferRecommendation {
            offers: recommend(&profile),
            profile,
        };

        let prompt = offer_explanation(&recommendation);

        assert!(prompt.contains("CUST4242"));
        assert!(prompt.contains("Savings Account, Credit Card"));
        assert!(prompt.contains("Dining ($7,500 annual)"));
        assert!(prompt.contains("Dining Cashback Card"));
        assert!(prompt.contains("High-Yield Savings Account"));
        assert!(prompt.contains("why these offers were recommended"));
    }
}
