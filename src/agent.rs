//! Fixed agent configurations and the prompts they receive.
//!
//! The three agents share one model; they differ only in the system
//! instruction sent with each call.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: &'static str,
    pub role: Option<&'static str>,
    pub instructions: &'static [&'static str],
}

pub const DIETARY_EXPERT: AgentProfile = AgentProfile {
    name: "Dietary Expert",
    role: Some("Provides personalized dietary recommendations"),
    instructions: &[
        "Consider the user's input, including dietary restrictions and preferences.",
        "Suggest a detailed meal plan for the day, including breakfast, lunch, dinner, and snacks.",
        "Provide a brief explanation of why the plan is suited to the user's goals.",
        "Focus on clarity, coherence, and quality of the recommendations.",
    ],
};

pub const FITNESS_EXPERT: AgentProfile = AgentProfile {
    name: "Fitness Expert",
    role: Some("Provides personalized fitness recommendations"),
    instructions: &[
        "Provide exercises tailored to the user's goals.",
        "Include warm-up, main workout, and cool-down exercises.",
        "Explain the benefits of each recommended exercise.",
        "Ensure the plan is actionable and detailed.",
    ],
};

/// Follow-up questions go to the bare model.
pub const PLAN_ASSISTANT: AgentProfile = AgentProfile {
    name: "Plan Assistant",
    role: None,
    instructions: &[],
};

impl AgentProfile {
    /// Returns `None` when the agent has neither a role nor instructions, in
    /// which case no system instruction is sent at all.
    pub fn system_instruction(&self) -> Option<String> {
        let mut sections = Vec::new();

        if let Some(role) = self.role {
            sections.push(format!("<your_role>\n{}\n</your_role>", role));
        }

        if !self.instructions.is_empty() {
            let bullets = self
                .instructions
                .iter()
                .map(|line| format!("- {}", line))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("<instructions>\n{}\n</instructions>", bullets));
        }

        if sections.is_empty() {
            None
        } else {
            Some(sections.join("\n\n"))
        }
    }
}

/// Context for a follow-up question: both plan bodies, then the question.
pub fn question_context(meal_plan: &str, routine: &str, question: &str) -> String {
    format!(
        "Dietary Plan: {}\nFitness Plan: {}\nUser Question: {}",
        meal_plan, routine, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_agents_differ_only_in_text() {
        assert_eq!(DIETARY_EXPERT.instructions.len(), 4);
        assert_eq!(FITNESS_EXPERT.instructions.len(), 4);
        assert_ne!(
            DIETARY_EXPERT.system_instruction(),
            FITNESS_EXPERT.system_instruction()
        );
    }

    #[test]
    fn test_system_instruction_layout() {
        let text = DIETARY_EXPERT.system_instruction().unwrap();
        assert!(text.starts_with(
            "<your_role>\nProvides personalized dietary recommendations\n</your_role>\n\n<instructions>\n- Consider"
        ));
        assert!(text.ends_with("- Focus on clarity, coherence, and quality of the recommendations.\n</instructions>"));
    }

    #[test]
    fn test_plain_agent_sends_no_system_instruction() {
        assert_eq!(PLAN_ASSISTANT.system_instruction(), None);
    }

    #[test]
    fn test_question_context_is_verbatim() {
        let context = question_context("Oats for breakfast", "Squats x10", "Can I swap oats for eggs?");
        assert_eq!(
            context,
            "Dietary Plan: Oats for breakfast\nFitness Plan: Squats x10\nUser Question: Can I swap oats for eggs?"
        );
    }
}
