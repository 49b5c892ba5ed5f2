//! Local pre-submit validation.
//!
//! # Invariants
//! - Validation never touches the network; failures block the submit.
//! - Titles are compared after whitespace normalization.

use crate::external::TemplateSubmission;
use crate::model::course::CourseTree;
use crate::model::form::BuilderForm;
use crate::model::ids::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Reason a builder session cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingTitle,
    MissingStandard,
    EmptyTree,
    BlankModuleTitle(NodeId),
    BlankLessonTitle(NodeId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "title is required"),
            Self::MissingStandard => write!(f, "a standard must be selected"),
            Self::EmptyTree => write!(f, "add at least one module"),
            Self::BlankModuleTitle(id) => write!(f, "module {id} needs a title"),
            Self::BlankLessonTitle(id) => write!(f, "lesson {id} needs a title"),
        }
    }
}

impl Error for ValidationError {}

/// Trims and collapses internal whitespace runs to single spaces.
pub fn normalize_title(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

/// Collects every problem with the current form and tree, in display order.
pub fn validation_errors(form: &BuilderForm, tree: &CourseTree) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if normalize_title(&form.title).is_empty() {
        errors.push(ValidationError::MissingTitle);
    }
    if form.standard_id.is_none() {
        errors.push(ValidationError::MissingStandard);
    }
    if tree.is_empty() {
        errors.push(ValidationError::EmptyTree);
    }
    for module in &tree.modules {
        if normalize_title(&module.title).is_empty() {
            errors.push(ValidationError::BlankModuleTitle(module.id.clone()));
        }
        for lesson in &module.lessons {
            if normalize_title(&lesson.title).is_empty() {
                errors.push(ValidationError::BlankLessonTitle(lesson.id.clone()));
            }
        }
    }
    errors
}

/// Builds the submit payload, or returns the first validation error.
pub fn build_submission(
    form: &BuilderForm,
    tree: &CourseTree,
) -> Result<TemplateSubmission, ValidationError> {
    if let Some(first) = validation_errors(form, tree).into_iter().next() {
        return Err(first);
    }
    let standard_id = form.standard_id.ok_or(ValidationError::MissingStandard)?;

    let mut modules = tree.modules.clone();
    for module in &mut modules {
        module.title = normalize_title(&module.title);
        for lesson in &mut module.lessons {
            lesson.title = normalize_title(&lesson.title);
        }
    }

    Ok(TemplateSubmission {
        title: normalize_title(&form.title),
        description: form.description.trim().to_string(),
        standard_id,
        is_public: form.is_public,
        modules,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_submission, normalize_title, validation_errors, ValidationError};
    use crate::model::course::CourseTree;
    use crate::model::form::BuilderForm;
    use crate::model::ids::SequentialIdGenerator;

    #[test]
    fn normalize_title_collapses_whitespace() {
        assert_eq!(normalize_title("  Level 3 \n\t Data  "), "Level 3 Data");
        assert_eq!(normalize_title(" \n "), "");
    }

    #[test]
    fn empty_session_reports_all_top_level_problems() {
        let errors = validation_errors(&BuilderForm::default(), &CourseTree::new());
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingTitle,
                ValidationError::MissingStandard,
                ValidationError::EmptyTree,
            ]
        );
    }

    #[test]
    fn blank_module_title_blocks_submission() {
        let ids = SequentialIdGenerator::new("n");
        let mut tree = CourseTree::new();
        let module = tree.add_module(&ids, 1);
        tree.update_module(
            &module.id,
            crate::model::course::ModulePatch {
                title: Some("   ".to_string()),
                description: None,
            },
            2,
        );
        let form = BuilderForm {
            title: "Course".to_string(),
            standard_id: Some(7),
            ..BuilderForm::default()
        };

        let err = build_submission(&form, &tree).unwrap_err();
        assert_eq!(err, ValidationError::BlankModuleTitle(module.id));
    }

    #[test]
    fn submission_carries_normalized_metadata() {
        let ids = SequentialIdGenerator::new("n");
        let mut tree = CourseTree::new();
        tree.add_module(&ids, 1);
        let form = BuilderForm {
            title: "  Data   Technician ".to_string(),
            description: " Level 3 ".to_string(),
            standard_id: Some(7),
            is_public: true,
            ..BuilderForm::default()
        };

        let submission = build_submission(&form, &tree).unwrap();
        assert_eq!(submission.title, "Data Technician");
        assert_eq!(submission.description, "Level 3");
        assert_eq!(submission.standard_id, 7);
        assert!(submission.is_public);
        assert_eq!(submission.modules.len(), 1);
    }
}
