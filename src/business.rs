//! Business-process engine.
//!
//! Pure, stateless transformations over [`BusinessProcess`] values — no
//! storage access here. The per-stage state machine is
//!
//! ```text
//! pending → in_progress → {completed, rejected}
//! ```
//!
//! with completed/rejected terminal. Stages advance strictly left to
//! right, one active at a time, when driven through
//! [`advance_to_next_stage`].

use crate::model::{BusinessProcess, BusinessStage, StageStatus};
use crate::util::new_id;
use chrono::Utc;

/// Builds the standard three-stage land-plot approval process. Every stage
/// starts out `pending` with a fresh ID; the stage set is fixed here, though
/// a real system would derive it from region and plot status.
pub fn new_default_process(name: &str) -> BusinessProcess {
    let now = Utc::now();
    let stages = vec![
        BusinessStage {
            id: new_id(),
            name: "Приём и регистрация обращения".to_string(),
            description: "Уполномоченный орган регистрирует поступившее заявление".to_string(),
            status: StageStatus::Pending,
            updated_at: now,
        },
        BusinessStage {
            id: new_id(),
            name: "Рассмотрение и согласование".to_string(),
            description: "Специалисты анализируют документы и принимают решение".to_string(),
            status: StageStatus::Pending,
            updated_at: now,
        },
        BusinessStage {
            id: new_id(),
            name: "Подготовка итоговых документов".to_string(),
            description: "Формируются документы для постановки на кадастровый учёт и регистрации прав"
                .to_string(),
            status: StageStatus::Pending,
            updated_at: now,
        },
    ];

    BusinessProcess {
        id: new_id(),
        name: name.to_string(),
        stages,
        created_at: now,
    }
}

/// Moves the first pending stage into `in_progress`.
///
/// Scans stages in order: a stage already `in_progress` short-circuits as
/// an idempotent no-op (returns `true` without touching anything); the
/// first `pending` stage flips to `in_progress` with a fresh `updated_at`
/// (`true`); when every stage is terminal there is nothing to advance
/// (`false`).
pub fn advance_to_next_stage(mut process: BusinessProcess) -> (BusinessProcess, bool) {
    for stage in process.stages.iter_mut() {
        match stage.status {
            StageStatus::InProgress => return (process, true),
            StageStatus::Pending => {
                stage.status = StageStatus::InProgress;
                stage.updated_at = Utc::now();
                return (process, true);
            }
            StageStatus::Completed | StageStatus::Rejected => {}
        }
    }
    (process, false)
}

/// Marks the stage with `stage_id` as `completed` (or `rejected` on
/// failure) and stamps `updated_at`. The second value reports whether the
/// stage was found; on a miss the process is returned untouched.
pub fn complete_stage(
    mut process: BusinessProcess,
    stage_id: &str,
    success: bool,
) -> (BusinessProcess, bool) {
    for stage in process.stages.iter_mut() {
        if stage.id == stage_id {
            stage.status = if success {
                StageStatus::Completed
            } else {
                StageStatus::Rejected
            };
            stage.updated_at = Utc::now();
            return (process, true);
        }
    }
    (process, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_process_has_three_pending_stages() {
        let process = new_default_process("Выдел участка");

        assert!(!process.id.is_empty());
        assert_eq!(process.name, "Выдел участка");
        assert_eq!(process.stages.len(), 3);
        assert!(process
            .stages
            .iter()
            .all(|stage| stage.status == StageStatus::Pending));

        // Stage IDs are fresh and distinct.
        assert_ne!(process.stages[0].id, process.stages[1].id);
        assert_ne!(process.stages[1].id, process.stages[2].id);
    }

    #[test]
    fn advance_starts_the_first_pending_stage() {
        let process = new_default_process("p");

        let (process, advanced) = advance_to_next_stage(process);
        assert!(advanced);
        assert_eq!(process.stages[0].status, StageStatus::InProgress);
        assert_eq!(process.stages[1].status, StageStatus::Pending);
    }

    #[test]
    fn advance_is_idempotent_while_a_stage_runs() {
        let (process, _) = advance_to_next_stage(new_default_process("p"));
        let before = process.clone();

        let (process, advanced) = advance_to_next_stage(process);
        assert!(advanced);
        assert_eq!(process, before);

        let (process, advanced) = advance_to_next_stage(process);
        assert!(advanced);
        assert_eq!(process, before);
    }

    #[test]
    fn advance_walks_stages_left_to_right() {
        let (process, _) = advance_to_next_stage(new_default_process("p"));
        let first_id = process.stages[0].id.clone();

        let (process, found) = complete_stage(process, &first_id, true);
        assert!(found);
        assert_eq!(process.stages[0].status, StageStatus::Completed);

        let (process, advanced) = advance_to_next_stage(process);
        assert!(advanced);
        assert_eq!(process.stages[1].status, StageStatus::InProgress);
    }

    #[test]
    fn advance_reports_nothing_left_once_all_stages_are_terminal() {
        let mut process = new_default_process("p");
        for stage in process.stages.iter_mut() {
            stage.status = StageStatus::Completed;
        }
        process.stages[1].status = StageStatus::Rejected;

        let (_, advanced) = advance_to_next_stage(process);
        assert!(!advanced);
    }

    #[test]
    fn complete_rejects_on_failure() {
        let (process, _) = advance_to_next_stage(new_default_process("p"));
        let first_id = process.stages[0].id.clone();

        let (process, found) = complete_stage(process, &first_id, false);
        assert!(found);
        assert_eq!(process.stages[0].status, StageStatus::Rejected);
    }

    #[test]
    fn complete_reports_unknown_stage_without_mutation() {
        let process = new_default_process("p");
        let before = process.clone();

        let (process, found) = complete_stage(process, "no-such-stage", true);
        assert!(!found);
        assert_eq!(process, before);
    }
}
