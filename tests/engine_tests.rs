//! Integration tests for the onboarding engine.
//!
//! Templates are resolved, customized and applied against an in-memory database;
//! progress is recalculated from the resulting tasks.

use chrono::NaiveDate;
use onboarding_engine::config::OnboardingConfig;
use onboarding_engine::db::Database;
use onboarding_engine::engine::{ApplyRequest, OnboardingEngine};
use onboarding_engine::error::{EngineError, ErrorCode};
use onboarding_engine::types::{
    Audience, NewHireInput, NewHireStatus, NewTaskTemplate, NewTemplate, TaskDraft, TaskStatus,
    TaskTemplateId, TemplateId,
};

/// Helper to create an engine over a fresh in-memory database.
fn setup_engine() -> OnboardingEngine<Database> {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    OnboardingEngine::new(db, OnboardingConfig::default())
}

fn catalog_entry(engine: &OnboardingEngine<Database>, title: &str, priority: i32) -> TaskTemplateId {
    engine
        .store()
        .create_task_template(NewTaskTemplate {
            title: title.to_string(),
            priority: Some(priority),
            ..Default::default()
        })
        .expect("Failed to create task template")
        .id
}

/// "Engineering Checklist": Laptop Setup (2), IT Access (1), Welcome Call (1).
fn engineering_checklist(engine: &OnboardingEngine<Database>) -> (TemplateId, Vec<TaskTemplateId>) {
    let ids = vec![
        catalog_entry(engine, "Laptop Setup", 2),
        catalog_entry(engine, "IT Access", 1),
        catalog_entry(engine, "Welcome Call", 1),
    ];
    let template = engine
        .store()
        .create_template(
            NewTemplate {
                name: "Engineering Checklist".to_string(),
                department: Some("Engineering".to_string()),
                ..Default::default()
            },
            &ids,
        )
        .expect("Failed to create template");
    (template.id, ids)
}

fn hire(engine: &OnboardingEngine<Database>, candidate_id: i64, department: &str) -> i64 {
    engine
        .store()
        .create_new_hire(NewHireInput {
            candidate_id,
            job_id: 100,
            department: Some(department.to_string()),
            ..Default::default()
        })
        .expect("Failed to create new hire")
        .id
}

mod customize_tests {
    use super::*;

    #[test]
    fn drafts_follow_sequence_order() {
        let engine = setup_engine();
        let (template_id, ids) = engineering_checklist(&engine);

        let customization = engine.resolve_and_customize(template_id).unwrap();
        let drafts = customization.drafts();

        let titles: Vec<&str> = drafts.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Laptop Setup", "IT Access", "Welcome Call"]);
        let refs: Vec<_> = drafts.iter().map(|d| d.task_template_id).collect();
        assert_eq!(refs, ids.iter().copied().map(Some).collect::<Vec<_>>());
        assert_eq!(drafts[0].priority, 2);
        assert!(drafts.iter().all(|d| d.due_date.is_none() && d.assigned_to.is_none()));
    }

    #[test]
    fn unknown_template() {
        let engine = setup_engine();
        assert!(matches!(
            engine.resolve_and_customize(31),
            Err(EngineError::TemplateNotFound(31))
        ));
    }

    #[test]
    fn adding_a_referenced_catalog_entry_is_rejected() {
        let engine = setup_engine();
        let (template_id, ids) = engineering_checklist(&engine);

        let mut customization = engine.resolve_and_customize(template_id).unwrap();
        let err = customization.add_from_catalog(engine.store(), ids[1]).unwrap_err();

        assert!(matches!(
            err,
            EngineError::DuplicateReference { task_template_id } if task_template_id == ids[1]
        ));
        assert_eq!(customization.len(), 3);
    }

    #[test]
    fn configured_defaults_apply_to_blank_drafts() {
        let db = Database::open_in_memory().unwrap();
        let engine = OnboardingEngine::new(
            db,
            OnboardingConfig {
                default_priority: 2,
                default_category: Some("general".to_string()),
                default_due_days: None,
            },
        );
        let (template_id, _) = engineering_checklist(&engine);

        let mut customization = engine.resolve_and_customize(template_id).unwrap();
        let draft = customization.add_blank();

        assert_eq!(draft.priority, 2);
        assert_eq!(draft.category.as_deref(), Some("general"));
        assert!(draft.is_ad_hoc());
    }
}

mod apply_tests {
    use super::*;

    #[test]
    fn engineering_checklist_scenario() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let new_hire = hire(&engine, 42, "Engineering");

        let result = engine
            .apply_template(ApplyRequest::new(template_id, Audience::NewHire(new_hire)))
            .unwrap();
        assert_eq!(result.success_count, 1);
        assert_eq!(result.fail_count, 0);
        assert_eq!(result.tasks_created, 3);

        let tasks = engine.store().list_tasks_for_new_hire(new_hire).unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Laptop Setup", "IT Access", "Welcome Call"]);
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert!(tasks.iter().all(|t| t.task_template_id.is_some()));

        let progress = engine.recalculate_new_hire(new_hire).unwrap();
        assert_eq!(progress.progress, 0);
        assert_eq!(progress.status, NewHireStatus::NotStarted);

        let (task, progress) = engine
            .set_task_status(tasks[0].id, TaskStatus::Completed, Some("manager"))
            .unwrap();
        assert_eq!(task.completed_by.as_deref(), Some("manager"));
        assert_eq!(progress.progress, 33);
        assert_eq!(progress.status, NewHireStatus::InProgress);

        let stored = engine.store().get_new_hire(new_hire).unwrap().unwrap();
        assert_eq!(stored.progress, 33);
        assert_eq!(stored.status, NewHireStatus::InProgress);
    }

    #[test]
    fn duplicate_catalog_references_are_rejected_before_writes() {
        let engine = setup_engine();
        let (template_id, ids) = engineering_checklist(&engine);
        let new_hire = hire(&engine, 1, "Engineering");

        let mut drafts = engine.resolve_and_customize(template_id).unwrap().into_drafts();
        drafts.push(drafts[0].clone());

        let err = engine
            .apply_template(
                ApplyRequest::new(template_id, Audience::NewHire(new_hire)).with_tasks(drafts),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::DuplicateReference { task_template_id } if task_template_id == ids[0]
        ));
        assert!(engine.store().list_tasks_for_new_hire(new_hire).unwrap().is_empty());
    }

    #[test]
    fn one_ad_hoc_draft_creates_exactly_one_task_template() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let new_hire = hire(&engine, 1, "Engineering");
        let before = engine.store().list_task_templates(None).unwrap().len();

        let mut customization = engine.resolve_and_customize(template_id).unwrap();
        customization.add_blank().title = "Meet the Team".to_string();

        engine
            .apply_template(
                ApplyRequest::new(template_id, Audience::NewHire(new_hire))
                    .with_tasks(customization.into_drafts()),
            )
            .unwrap();

        let catalog = engine.store().list_task_templates(None).unwrap();
        assert_eq!(catalog.len(), before + 1);
        let created = catalog.iter().find(|t| t.title == "Meet the Team").unwrap();

        let tasks = engine.store().list_tasks_for_new_hire(new_hire).unwrap();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[3].task_template_id, Some(created.id));

        // The template itself is unchanged
        assert_eq!(engine.store().get_template_entries(template_id).unwrap().len(), 3);
    }

    #[test]
    fn unknown_catalog_reference_fails_before_any_write() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let hires: Vec<i64> = (1..=3).map(|c| hire(&engine, c, "Engineering")).collect();
        let before = engine.store().list_task_templates(None).unwrap().len();

        let mut customization = engine.resolve_and_customize(template_id).unwrap();
        customization.add_blank().title = "Meet the Team".to_string();
        let mut drafts = customization.into_drafts();
        let mut missing = TaskDraft::blank(1);
        missing.title = "Badge Photo".to_string();
        missing.task_template_id = Some(999);
        drafts.insert(1, missing);

        let err = engine
            .apply_template(ApplyRequest::new(template_id, Audience::All).with_tasks(drafts))
            .unwrap_err();

        assert!(matches!(err, EngineError::TaskTemplateNotFound(999)));
        assert_eq!(engine.store().list_task_templates(None).unwrap().len(), before);
        for id in hires {
            assert!(engine.store().list_tasks_for_new_hire(id).unwrap().is_empty());
        }
    }

    #[test]
    fn customized_list_replaces_template_tasks() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let new_hire = hire(&engine, 1, "Engineering");

        let mut customization = engine.resolve_and_customize(template_id).unwrap();
        customization.remove(2).unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 11, 9).unwrap();
        if let Some(draft) = customization.draft_mut(0) {
            draft.due_date = Some(due);
            draft.assigned_to = Some("it-desk".to_string());
        }

        let batch_due = NaiveDate::from_ymd_opt(2026, 11, 30).unwrap();
        engine
            .apply_template(
                ApplyRequest::new(template_id, Audience::NewHire(new_hire))
                    .with_due_date(batch_due)
                    .with_tasks(customization.into_drafts()),
            )
            .unwrap();

        let tasks = engine.store().list_tasks_for_new_hire(new_hire).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].due_date, Some(due));
        assert_eq!(tasks[0].assigned_to.as_deref(), Some("it-desk"));
        assert_eq!(tasks[1].due_date, Some(batch_due));
    }

    #[test]
    fn empty_customized_list_is_rejected() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let new_hire = hire(&engine, 1, "Engineering");

        let err = engine
            .apply_template(
                ApplyRequest::new(template_id, Audience::NewHire(new_hire))
                    .with_tasks(Vec::<TaskDraft>::new()),
            )
            .unwrap_err();

        assert!(matches!(err, EngineError::EmptyTaskSet));
    }

    #[test]
    fn start_date_offset_is_used_without_other_due_dates() {
        let db = Database::open_in_memory().unwrap();
        let engine = OnboardingEngine::new(
            db,
            OnboardingConfig {
                default_due_days: Some(14),
                ..Default::default()
            },
        );
        let (template_id, _) = engineering_checklist(&engine);
        let new_hire = engine
            .store()
            .create_new_hire(NewHireInput {
                candidate_id: 1,
                job_id: 1,
                start_date: NaiveDate::from_ymd_opt(2026, 11, 2),
                ..Default::default()
            })
            .unwrap()
            .id;

        engine
            .apply_template(ApplyRequest::new(template_id, Audience::NewHire(new_hire)))
            .unwrap();

        let tasks = engine.store().list_tasks_for_new_hire(new_hire).unwrap();
        assert!(
            tasks
                .iter()
                .all(|t| t.due_date == NaiveDate::from_ymd_opt(2026, 11, 16))
        );
    }

    #[test]
    fn reapplying_creates_a_second_batch() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let new_hire = hire(&engine, 1, "Engineering");

        for _ in 0..2 {
            engine
                .apply_template(ApplyRequest::new(template_id, Audience::NewHire(new_hire)))
                .unwrap();
        }

        assert_eq!(engine.store().list_tasks_for_new_hire(new_hire).unwrap().len(), 6);
    }

    #[test]
    fn department_audience_applies_to_members_only() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let e1 = hire(&engine, 1, "Engineering");
        let sales = hire(&engine, 2, "Sales");
        let e2 = hire(&engine, 3, "Engineering");

        let result = engine
            .apply_template(ApplyRequest::new(
                template_id,
                Audience::Department("Engineering".to_string()),
            ))
            .unwrap();

        assert_eq!(result.success_count, 2);
        assert_eq!(result.tasks_created, 6);
        assert_eq!(result.to_string(), "Success: 2, Failed: 0");
        assert_eq!(engine.store().list_tasks_for_new_hire(e1).unwrap().len(), 3);
        assert_eq!(engine.store().list_tasks_for_new_hire(e2).unwrap().len(), 3);
        assert!(engine.store().list_tasks_for_new_hire(sales).unwrap().is_empty());
    }

    #[test]
    fn empty_department_has_no_recipients() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        hire(&engine, 1, "Engineering");

        let err = engine
            .apply_template(ApplyRequest::new(
                template_id,
                Audience::Department("Legal".to_string()),
            ))
            .unwrap_err();

        assert!(matches!(err, EngineError::NoRecipients(_)));
    }

    #[test]
    fn unknown_new_hire_is_not_found() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let before = engine.store().list_task_templates(None).unwrap().len();

        let mut customization = engine.resolve_and_customize(template_id).unwrap();
        customization.add_blank().title = "Meet the Team".to_string();

        let err = engine
            .apply_template(
                ApplyRequest::new(template_id, Audience::NewHire(404))
                    .with_tasks(customization.into_drafts()),
            )
            .unwrap_err();

        assert!(matches!(err, EngineError::NewHireNotFound(404)));
        // Nothing was committed to the catalog
        assert_eq!(engine.store().list_task_templates(None).unwrap().len(), before);
    }

    #[test]
    fn unknown_template_is_not_found() {
        let engine = setup_engine();
        let new_hire = hire(&engine, 1, "Engineering");

        let err = engine
            .apply_template(ApplyRequest::new(77, Audience::NewHire(new_hire)))
            .unwrap_err();

        assert!(matches!(err, EngineError::TemplateNotFound(77)));
    }

    #[test]
    fn one_failing_recipient_does_not_stop_the_batch() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let hires: Vec<i64> = (1..=5).map(|c| hire(&engine, c, "Engineering")).collect();
        let failing = hires[2];

        // Fail the second insert for one recipient, after the first has gone through
        engine
            .store()
            .with_conn(|conn| {
                conn.execute_batch(&format!(
                    "CREATE TRIGGER fail_one_recipient BEFORE INSERT ON onboarding_tasks
                     WHEN NEW.new_hire_id = {} AND NEW.title = 'IT Access'
                     BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
                    failing
                ))?;
                Ok(())
            })
            .unwrap();

        let result = engine
            .apply_template(ApplyRequest::new(template_id, Audience::All))
            .unwrap();

        assert_eq!(result.success_count, 4);
        assert_eq!(result.fail_count, 1);
        assert_eq!(result.tasks_created, 12);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].new_hire_id, failing);
        assert_eq!(result.failures[0].code, ErrorCode::RecipientApplicationFailed);

        for &id in &hires {
            let count = engine.store().list_tasks_for_new_hire(id).unwrap().len();
            if id == failing {
                assert_eq!(count, 0, "failed recipient kept a partial task set");
            } else {
                assert_eq!(count, 3);
            }
        }
    }
}

mod progress_tests {
    use super::*;

    #[test]
    fn no_tasks_is_not_started() {
        let engine = setup_engine();
        let new_hire = hire(&engine, 1, "Engineering");

        let progress = engine.recalculate_new_hire(new_hire).unwrap();

        assert_eq!(progress.progress, 0);
        assert_eq!(progress.status, NewHireStatus::NotStarted);
        assert_eq!(progress.total, 0);
    }

    #[test]
    fn progress_tracks_completed_share() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let extra = catalog_entry(&engine, "Buddy Lunch", 1);
        engine.store().add_task_to_template(template_id, extra).unwrap();
        let new_hire = hire(&engine, 1, "Engineering");
        engine
            .apply_template(ApplyRequest::new(template_id, Audience::NewHire(new_hire)))
            .unwrap();
        let tasks = engine.store().list_tasks_for_new_hire(new_hire).unwrap();
        assert_eq!(tasks.len(), 4);

        let progress = engine.recalculate_new_hire(new_hire).unwrap();
        assert_eq!((progress.progress, progress.status), (0, NewHireStatus::NotStarted));

        engine.set_task_status(tasks[0].id, TaskStatus::Completed, None).unwrap();
        let (_, progress) = engine
            .set_task_status(tasks[1].id, TaskStatus::Completed, None)
            .unwrap();
        assert_eq!((progress.progress, progress.status), (50, NewHireStatus::InProgress));

        engine.set_task_status(tasks[2].id, TaskStatus::Completed, None).unwrap();
        let (_, progress) = engine
            .set_task_status(tasks[3].id, TaskStatus::Completed, None)
            .unwrap();
        assert_eq!((progress.progress, progress.status), (100, NewHireStatus::Completed));

        // Reopening a task drops back to in-progress
        let (_, progress) = engine
            .set_task_status(tasks[3].id, TaskStatus::InProgress, None)
            .unwrap();
        assert_eq!((progress.progress, progress.status), (75, NewHireStatus::InProgress));
    }

    #[test]
    fn recalculation_is_idempotent() {
        let engine = setup_engine();
        let (template_id, _) = engineering_checklist(&engine);
        let new_hire = hire(&engine, 1, "Engineering");
        engine
            .apply_template(ApplyRequest::new(template_id, Audience::NewHire(new_hire)))
            .unwrap();
        let tasks = engine.store().list_tasks_for_new_hire(new_hire).unwrap();
        engine.set_task_status(tasks[1].id, TaskStatus::Completed, None).unwrap();

        let first = engine.recalculate_new_hire(new_hire).unwrap();
        let second = engine.recalculate_new_hire(new_hire).unwrap();
        let stored = engine.store().get_new_hire(new_hire).unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(stored.progress, second.progress);
        assert_eq!(stored.status, second.status);
    }

    #[test]
    fn unknown_new_hire() {
        let engine = setup_engine();
        assert!(matches!(
            engine.recalculate_new_hire(8),
            Err(EngineError::NewHireNotFound(8))
        ));
    }
}
