use crate::{
    agents::ConversationHistory,
    capabilities::{ComplianceChecker, DesignReview, PolicyReview},
    config::GenerationConfig,
    errors::Result,
};
use tracing::info;

/// Design review agent. One compliance tool, one report per turn.
pub struct DesignAgent {
    checker: ComplianceChecker,
}

impl DesignAgent {
    pub fn new(checker: ComplianceChecker) -> Self {
        Self { checker }
    }

    pub async fn handle_turn(
        &self,
        config: &GenerationConfig,
        history: &mut ConversationHistory,
        review: &DesignReview,
    ) -> Result<String> {
        info!(target: "design_agent", content_type = %review.content_type, "running design review");

        let request = review.render_request();
        let report = self.checker.review_design(review, config).await?;

        history.push_user(&request);
        history.push_assistant(&report);

        Ok(report)
    }
}

/// Policy review agent, same shape as the design agent over the policy
/// checker variant.
pub struct PolicyAgent {
    checker: ComplianceChecker,
}

impl PolicyAgent {
    pub fn new(checker: ComplianceChecker) -> Self {
        Self { checker }
    }

    pub async fn handle_turn(
        &self,
        config: &GenerationConfig,
        history: &mut ConversationHistory,
        review: &PolicyReview,
    ) -> Result<String> {
        info!(target: "policy_agent", platform = %review.platform, "running policy review");

        let request = review.render_request();
        let report = self.checker.review_policy(review, config).await?;

        history.push_user(&request);
        history.push_assistant(&report);

        Ok(report)
    }
}
