//! The session controller: plan generation and follow-up questions.
//!
//! State is only written after every external call of an operation has
//! succeeded, so a failure leaves the session exactly as it was.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::agent::{self, DIETARY_EXPERT, FITNESS_EXPERT, PLAN_ASSISTANT};
use crate::app_state::SessionState;
use crate::error::SessionError;
use crate::llm_interaction::TextGenerator;
use crate::plan::Plan;
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Answered,
    /// Blank question; nothing was sent.
    Ignored,
}

#[derive(Clone)]
pub struct SessionController {
    generator: Arc<dyn TextGenerator>,
}

impl SessionController {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Runs the dietary then the fitness agent on the profile prompt and
    /// stores both plans together, clearing the Q&A history.
    pub async fn generate_plans(
        &self,
        state: &mut SessionState,
        profile: &Profile,
    ) -> Result<(), SessionError> {
        let user_profile = profile.prompt();

        let meal_plan = self
            .generator
            .generate(&DIETARY_EXPERT, &user_profile)
            .await
            .map_err(|e| {
                error!(agent = DIETARY_EXPERT.name, error = %e, "Plan generation failed");
                SessionError::PlanGeneration(e)
            })?;

        let routine = self
            .generator
            .generate(&FITNESS_EXPERT, &user_profile)
            .await
            .map_err(|e| {
                error!(agent = FITNESS_EXPERT.name, error = %e, "Plan generation failed");
                SessionError::PlanGeneration(e)
            })?;

        state.store_plans(Plan::dietary(meal_plan), Plan::fitness(routine));
        info!("Dietary and fitness plans generated");
        Ok(())
    }

    /// Answers a question against the stored plans and appends the pair.
    pub async fn answer_question(
        &self,
        state: &mut SessionState,
        question: &str,
    ) -> Result<AnswerOutcome, SessionError> {
        let Some(plans) = state.plans() else {
            warn!("Question received before plans were generated");
            return Err(SessionError::PlansNotReady);
        };

        let question = question.trim();
        if question.is_empty() {
            return Ok(AnswerOutcome::Ignored);
        }

        let context = agent::question_context(&plans.dietary.body, &plans.fitness.body, question);
        let answer = self
            .generator
            .generate(&PLAN_ASSISTANT, &context)
            .await
            .map_err(|e| {
                error!(error = %e, "Answer generation failed");
                SessionError::Answer(e)
            })?;

        state.push_answer(question.to_string(), answer)?;
        info!(history = state.qa_pairs().len(), "Question answered");
        Ok(AnswerOutcome::Answered)
    }
}
