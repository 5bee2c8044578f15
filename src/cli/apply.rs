//! Apply subcommand.
//!
//! Without edit flags the template's own task list is applied. `--remove`,
//! `--add-catalog` and `--add-task` customize a copy of that list first; removal
//! indices refer to the list as shown by `drafts`.

use crate::engine::Customization;
use crate::error::EngineResult;
use crate::store::TaskTemplateStore;
use crate::types::{Audience, NewHireId, TaskTemplateId, TemplateId};
use chrono::NaiveDate;
use clap::{ArgGroup, Args};

/// Arguments for the apply subcommand
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("audience")
        .required(true)
        .args(["hire", "department", "all"])
))]
pub struct ApplyArgs {
    /// Template ID
    pub template: TemplateId,

    /// Apply to a single new hire
    #[arg(long)]
    pub hire: Option<NewHireId>,

    /// Apply to every new hire in a department
    #[arg(long)]
    pub department: Option<String>,

    /// Apply to every new hire
    #[arg(long)]
    pub all: bool,

    /// Due date for tasks without one, YYYY-MM-DD
    #[arg(long)]
    pub due_date: Option<NaiveDate>,

    /// Drop the draft at this index (repeatable)
    #[arg(long = "remove", value_name = "IDX")]
    pub remove: Vec<usize>,

    /// Add a catalog entry (repeatable)
    #[arg(long = "add-catalog", value_name = "ID")]
    pub add_catalog: Vec<TaskTemplateId>,

    /// Add an ad-hoc task with this title (repeatable)
    #[arg(long = "add-task", value_name = "TITLE")]
    pub add_task: Vec<String>,
}

impl ApplyArgs {
    pub fn audience(&self) -> Audience {
        if let Some(id) = self.hire {
            Audience::NewHire(id)
        } else if let Some(ref department) = self.department {
            Audience::Department(department.clone())
        } else {
            Audience::All
        }
    }

    pub fn has_edits(&self) -> bool {
        !self.remove.is_empty() || !self.add_catalog.is_empty() || !self.add_task.is_empty()
    }

    /// Apply the edit flags to a customization: removals, then catalog additions,
    /// then ad-hoc additions.
    pub fn customize<S: TaskTemplateStore + ?Sized>(
        &self,
        customization: &mut Customization,
        store: &S,
    ) -> EngineResult<()> {
        let mut indices = self.remove.clone();
        indices.sort_unstable();
        indices.dedup();
        // Highest first so earlier indices stay valid
        for index in indices.into_iter().rev() {
            customization.remove(index)?;
        }

        for &id in &self.add_catalog {
            customization.add_from_catalog(store, id)?;
        }

        for title in &self.add_task {
            customization.add_blank().title = title.clone();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use crate::error::EngineError;
    use crate::types::{NewTaskTemplate, TaskDraft, TaskTemplate};
    use clap::Parser;

    struct NoCatalog;

    impl TaskTemplateStore for NoCatalog {
        fn find_task_template(&self, _id: TaskTemplateId) -> EngineResult<Option<TaskTemplate>> {
            Ok(None)
        }

        fn create_task_template(&self, _input: NewTaskTemplate) -> EngineResult<TaskTemplate> {
            Err(EngineError::internal("read-only catalog"))
        }

        fn create_task_templates(
            &self,
            _inputs: Vec<NewTaskTemplate>,
        ) -> EngineResult<Vec<TaskTemplate>> {
            Err(EngineError::internal("read-only catalog"))
        }
    }

    fn parse(args: &[&str]) -> ApplyArgs {
        let mut argv = vec!["onboarding", "apply"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Apply(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn titled(title: &str, id: TaskTemplateId) -> TaskDraft {
        let mut draft = TaskDraft::blank(1);
        draft.title = title.to_string();
        draft.task_template_id = Some(id);
        draft
    }

    #[test]
    fn audience_from_flags() {
        assert_eq!(parse(&["1", "--hire", "42"]).audience(), Audience::NewHire(42));
        assert_eq!(
            parse(&["1", "--department", "Engineering"]).audience(),
            Audience::Department("Engineering".into())
        );
        assert_eq!(parse(&["1", "--all"]).audience(), Audience::All);
    }

    #[test]
    fn audience_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["onboarding", "apply", "1"]).is_err());
        assert!(Cli::try_parse_from(["onboarding", "apply", "1", "--hire", "2", "--all"]).is_err());
    }

    #[test]
    fn customize_removes_by_original_index() {
        let args = parse(&["1", "--all", "--remove", "0", "--remove", "2", "--add-task", "Meet the Team"]);
        assert!(args.has_edits());

        let mut customization = Customization::new(vec![
            titled("Laptop Setup", 1),
            titled("IT Access", 2),
            titled("Welcome Call", 3),
        ]);
        args.customize(&mut customization, &NoCatalog).unwrap();

        let titles: Vec<&str> = customization.drafts().iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["IT Access", "Meet the Team"]);
        assert!(customization.drafts()[1].is_ad_hoc());
    }

    #[test]
    fn customize_surfaces_bad_index() {
        let args = parse(&["1", "--all", "--remove", "5"]);
        let mut customization = Customization::new(vec![titled("Laptop Setup", 1)]);
        let err = args.customize(&mut customization, &NoCatalog).unwrap_err();
        assert!(matches!(err, EngineError::InvalidField { field: "index", .. }));
    }

    #[test]
    fn customize_surfaces_unknown_catalog_entry() {
        let args = parse(&["1", "--all", "--add-catalog", "99"]);
        let mut customization = Customization::new(Vec::new());
        let err = args.customize(&mut customization, &NoCatalog).unwrap_err();
        assert!(matches!(err, EngineError::TaskTemplateNotFound(99)));
    }
}
