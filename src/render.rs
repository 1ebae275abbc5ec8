//! View models for the page template.
//!
//! The page is rebuilt from session state on every request; nothing here is
//! cached between renders.

use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;

use crate::app_state::SessionState;
use crate::constants::PAGE_TITLE;
use crate::plan::Plan;
use crate::profile::{
    ActivityLevel, DietaryPreference, FitnessGoal, ProfileForm, Sex, AGE_RANGE, HEIGHT_CM_RANGE,
    WEIGHT_KG_RANGE,
};

/// Renders model output as HTML. Raw HTML in the text is escaped, not passed
/// through.
pub fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH).map(
        |event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        },
    );
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[derive(Debug, Serialize)]
pub struct NumberField {
    pub value: String,
    pub min: String,
    pub max: String,
    pub step: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SelectField {
    pub value: &'static str,
    pub options: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub age: NumberField,
    pub height: NumberField,
    pub weight: NumberField,
    pub sex: SelectField,
    pub activity_level: SelectField,
    pub dietary_preference: SelectField,
    pub fitness_goal: SelectField,
}

impl From<&ProfileForm> for FormView {
    fn from(form: &ProfileForm) -> Self {
        Self {
            age: NumberField {
                value: form.age.clone(),
                min: AGE_RANGE.start().to_string(),
                max: AGE_RANGE.end().to_string(),
                step: "1",
            },
            height: NumberField {
                value: form.height.clone(),
                min: format!("{:.1}", HEIGHT_CM_RANGE.start()),
                max: format!("{:.1}", HEIGHT_CM_RANGE.end()),
                step: "0.1",
            },
            weight: NumberField {
                value: form.weight.clone(),
                min: format!("{:.1}", WEIGHT_KG_RANGE.start()),
                max: format!("{:.1}", WEIGHT_KG_RANGE.end()),
                step: "0.1",
            },
            sex: SelectField {
                value: form.sex.label(),
                options: Sex::ALL.iter().map(|v| v.label()).collect(),
            },
            activity_level: SelectField {
                value: form.activity_level.label(),
                options: ActivityLevel::ALL.iter().map(|v| v.label()).collect(),
            },
            dietary_preference: SelectField {
                value: form.dietary_preference.label(),
                options: DietaryPreference::ALL.iter().map(|v| v.label()).collect(),
            },
            fitness_goal: SelectField {
                value: form.fitness_goal.label(),
                options: FitnessGoal::ALL.iter().map(|v| v.label()).collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanView {
    pub title: &'static str,
    pub rationale_label: &'static str,
    pub rationale: &'static str,
    pub body_label: &'static str,
    pub body_html: String,
    pub notes_label: &'static str,
    pub notes: Vec<String>,
}

impl From<&Plan> for PlanView {
    fn from(plan: &Plan) -> Self {
        Self {
            title: plan.title,
            rationale_label: plan.rationale_label,
            rationale: plan.rationale,
            body_label: plan.body_label,
            body_html: markdown_to_html(&plan.body),
            notes_label: plan.notes_label,
            notes: plan.note_items().into_iter().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QaView {
    pub question: String,
    pub answer_html: String,
}

/// Everything `index.html` needs.
#[derive(Debug, Serialize)]
pub struct PageView {
    pub title: &'static str,
    /// Set when configuration or model setup failed; hides the whole UI.
    pub blocked: Option<String>,
    pub error: Option<String>,
    pub form: Option<FormView>,
    pub plans_generated: bool,
    pub dietary_plan: Option<PlanView>,
    pub fitness_plan: Option<PlanView>,
    pub qa_pairs: Vec<QaView>,
}

impl PageView {
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            title: PAGE_TITLE,
            blocked: Some(reason.into()),
            error: None,
            form: None,
            plans_generated: false,
            dietary_plan: None,
            fitness_plan: None,
            qa_pairs: Vec::new(),
        }
    }

    pub fn for_session(state: &SessionState) -> Self {
        let plans = state.plans();
        Self {
            title: PAGE_TITLE,
            blocked: None,
            error: None,
            form: Some(FormView::from(&state.form)),
            plans_generated: state.plans_generated(),
            dietary_plan: plans.map(|p| PlanView::from(&p.dietary)),
            fitness_plan: plans.map(|p| PlanView::from(&p.fitness)),
            qa_pairs: state
                .qa_pairs()
                .iter()
                .map(|qa| QaView {
                    question: qa.question.clone(),
                    answer_html: markdown_to_html(&qa.answer),
                })
                .collect(),
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_renders_lists_and_emphasis() {
        let html = markdown_to_html("**Breakfast**\n\n- oats\n- berries");
        assert!(html.contains("<strong>Breakfast</strong>"));
        assert!(html.contains("<li>oats</li>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = markdown_to_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_empty_session_view_has_form_only() {
        let view = PageView::for_session(&SessionState::new());
        assert!(view.form.is_some());
        assert!(!view.plans_generated);
        assert!(view.dietary_plan.is_none());
        assert!(view.qa_pairs.is_empty());
    }

    #[test]
    fn test_view_lists_history_in_order() {
        let mut state = SessionState::new();
        state.store_plans(Plan::dietary("d".to_string()), Plan::fitness("f".to_string()));
        state.push_answer("one".to_string(), "1".to_string()).unwrap();
        state.push_answer("two".to_string(), "2".to_string()).unwrap();

        let view = PageView::for_session(&state);
        assert!(view.plans_generated);
        let questions: Vec<_> = view.qa_pairs.iter().map(|qa| qa.question.as_str()).collect();
        assert_eq!(questions, vec!["one", "two"]);
        assert_eq!(view.fitness_plan.unwrap().notes.len(), 4);
    }

    #[test]
    fn test_form_view_carries_bounds() {
        let view = FormView::from(&ProfileForm::default());
        assert_eq!(view.age.min, "10");
        assert_eq!(view.age.max, "100");
        assert_eq!(view.height.max, "250.0");
        assert_eq!(view.weight.min, "20.0");
        assert_eq!(view.dietary_preference.options.len(), 5);
    }

    #[test]
    fn test_blocked_view_hides_ui() {
        let view = PageView::blocked("no key");
        assert_eq!(view.blocked.as_deref(), Some("no key"));
        assert!(view.form.is_none());
    }
}
