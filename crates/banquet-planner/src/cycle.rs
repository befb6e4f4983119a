//! The sense → deliberate → plan → act → reconsider cycle run once per
//! `user_request`. One [`SessionCycle`] owns the full, serial lifetime of a
//! single planning pass — beliefs, desires, intentions and the task queue
//! never need external synchronization because exactly one of these runs
//! per session at a time (the single-writer rule in the concurrency model).

use crate::planner::Planner;
use crate::wire::{BudgetTaskParams, SearchTaskParams};
use banquet_types::{
    price, BeliefState, Category, CorrectionStrategy, Criteria, Desire, ErrorRecord, Intention, IntentionStatus, Message,
    MessageBody, MessageKind, SessionState, Task, TaskStatus, TaskType,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// A task is retried through at most this many correction generations
/// before the Planner gives up and leaves it permanently `error`. The
/// specification's strategy catalogue always has a `general_retry`
/// fallback, so without a cap a pathological criteria set could retry
/// forever; this bounds every session to a finite number of corrections.
const MAX_RETRIES: u32 = 3;

/// Literal timeout message the Planner feeds to its own error handler, kept
/// in the original's language per the external-interfaces contract.
const TIMEOUT_MESSAGE: &str = "Timeout esperando respuesta";

pub(crate) struct SessionCycle<'p> {
    planner: &'p Planner,
    session_id: Uuid,
    user_id: String,
    is_correction: bool,
    requested_categories: Vec<Category>,
    beliefs: BeliefState,
    desires: Vec<Desire>,
    intentions: Vec<Intention>,
    queue: VecDeque<Task>,
    tasks: HashMap<Uuid, Task>,
}

impl<'p> SessionCycle<'p> {
    /// Step 1-3 of the BDI cycle: update beliefs with the incoming
    /// criteria, generate the standard desire set, and commit the
    /// top-level desire to a single `budget_distribution` task. Per-
    /// category desires are recorded but yield no tasks yet — those are
    /// synthesized once the budget task completes.
    pub(crate) fn new(planner: &'p Planner, session_id: Uuid, user_id: String, criteria: Criteria, is_correction: bool) -> Self {
        let requested_categories = criteria.requested_categories();

        let mut beliefs = BeliefState::new();
        beliefs.criteria = Some(criteria.clone());
        beliefs.state = SessionState::InProgress;

        if criteria.total_budget > 0 {
            let seed = planner.retrieval().recommend(&criteria.style);
            beliefs.assigned_budget = seed
                .into_iter()
                .map(|(category, fraction)| (category, (fraction * criteria.total_budget as f64).round() as u64))
                .collect();
        }

        let mut desires = Vec::new();
        let mut intentions = Vec::new();
        let mut queue = VecDeque::new();
        let mut tasks = HashMap::new();

        let top_desire = Desire::new("complete_event_planning", Desire::PRIORITY_COMPLETE_EVENT_PLANNING, json!({}));
        let mut top_intention = Intention::new(top_desire.id);

        let budget_params = BudgetTaskParams {
            user_id: user_id.clone(),
            total_budget: criteria.total_budget,
            criteria: criteria.clone(),
        };
        let budget_task = Task::new(
            session_id,
            TaskType::BudgetDistribution,
            serde_json::to_value(&budget_params).expect("BudgetTaskParams always serializes"),
        );
        top_intention.tasks.push(budget_task.id);
        tasks.insert(budget_task.id, budget_task.clone());
        queue.push_back(budget_task);
        desires.push(top_desire);
        intentions.push(top_intention);

        for category in &requested_categories {
            let priority = match category {
                Category::Venue => Desire::PRIORITY_FIND_VENUE,
                Category::Catering => Desire::PRIORITY_FIND_CATERING,
                Category::Decor => Desire::PRIORITY_FIND_DECOR,
            };
            desires.push(Desire::new(format!("find_{category}"), priority, json!({})));
        }

        let _ = planner.session_memory().update_beliefs(session_id, beliefs.clone());

        Self {
            planner,
            session_id,
            user_id,
            is_correction,
            requested_categories,
            beliefs,
            desires,
            intentions,
            queue,
            tasks,
        }
    }

    /// Step 4-6: drain the queue one task at a time, senseing each reply
    /// before acting on the next, then emit the `final_response`.
    pub(crate) async fn run(mut self) -> Message {
        while let Some(mut task) = self.queue.pop_front() {
            task.status = TaskStatus::InFlight;
            self.tasks.insert(task.id, task.clone());

            let request = self.build_task_message(&task);
            let reply = self.planner.bus().send_and_wait(request, self.planner.task_timeout()).await;

            match reply {
                Some(Message { kind: MessageKind::AgentResponse, body: MessageBody::AgentResponse { result, .. }, .. }) => {
                    task.status = TaskStatus::Completed;
                    task.result = Some(result.clone());
                    self.tasks.insert(task.id, task.clone());
                    self.beliefs.task_progress.completed += 1;
                    self.sense_reply(task, result);
                }
                Some(Message { kind: MessageKind::Error, body: MessageBody::Error { error, .. }, .. }) => {
                    self.handle_task_error(task, error);
                }
                None => {
                    self.handle_task_error(task, TIMEOUT_MESSAGE.to_string());
                }
                Some(_) => {
                    self.handle_task_error(task, "worker returned an unrecognized reply".to_string());
                }
            }

            self.beliefs.task_progress.total = self.tasks.len() as u32;
            self.beliefs.task_progress.pending = self.queue.len() as u32;
            let _ = self.planner.session_memory().update_beliefs(self.session_id, self.beliefs.clone());
        }

        self.finalize()
    }

    fn build_task_message(&self, task: &Task) -> Message {
        Message {
            from: "Planner".to_string(),
            to: task.task_type.as_str().to_string(),
            kind: MessageKind::Task,
            session_id: self.session_id,
            body: MessageBody::Task {
                task_id: task.id,
                parameters: task.parameters.clone(),
                graph_data: Some(self.planner.bus().get_shared_data()),
            },
        }
    }

    fn enqueue(&mut self, task: Task, front: bool) {
        self.tasks.insert(task.id, task.clone());
        if front {
            self.queue.push_front(task);
        } else {
            self.queue.push_back(task);
        }
    }

    /// Step 5: apply a successful reply to beliefs. A `budget_distribution`
    /// response synthesizes the per-category search tasks (first dropping
    /// any pre-existing ones, so replaying this step stays idempotent). A
    /// search response with no candidates is *not* sensed as success — the
    /// specification treats an empty result as a worker failure.
    fn sense_reply(&mut self, task: Task, result: Value) {
        match &task.task_type {
            TaskType::BudgetDistribution => match serde_json::from_value::<std::collections::BTreeMap<Category, u64>>(result) {
                Ok(distribution) => {
                    self.beliefs.assigned_budget = distribution;
                    self.queue.retain(|t| t.task_type.category().is_none());
                    for category in self.requested_categories.clone() {
                        self.enqueue(self.build_search_task(category), false);
                    }
                }
                Err(e) => self.handle_task_error(task, format!("malformed budget distribution: {e}")),
            },
            TaskType::VenueSearch | TaskType::CateringSearch | TaskType::DecorSearch => {
                let category = task.task_type.category().expect("search task types always have a category");
                match result.as_array().and_then(|candidates| candidates.first()).cloned() {
                    Some(top) => self.beliefs.set_result(category, top),
                    None => self.handle_task_error(task, "no results found".to_string()),
                }
            }
            TaskType::Correction(_) => {
                tracing::warn!(task_id = %task.id, "completed a bare correction task with no mapped belief slot");
            }
        }
    }

    fn build_search_task(&self, category: Category) -> Task {
        let criteria = self.beliefs.criteria.as_ref().expect("criteria is set before any task is queued");
        let budget = *self.beliefs.assigned_budget.get(&category).unwrap_or(&0);
        let params = SearchTaskParams {
            criteria: criteria_for_category(criteria, category, budget),
            seed_urls: Vec::new(),
        };
        Task::new(
            self.session_id,
            search_task_type(category),
            serde_json::to_value(&params).expect("SearchTaskParams always serializes"),
        )
    }

    /// Step on any task error: record it, consult the strategy catalogue,
    /// and either insert correction tasks at the front of the queue (the
    /// common case) or — for errors classified critical — first suspend
    /// every intention sharing the failed task type and open a `fix_<category>`
    /// desire/intention pair before enqueuing the corrections.
    fn handle_task_error(&mut self, mut failed_task: Task, error: String) {
        failed_task.error = Some(error.clone());
        self.beliefs.task_progress.failed += 1;
        self.beliefs.record_error(ErrorRecord {
            task_type: failed_task.task_type.as_str().to_string(),
            error: error.clone(),
            timestamp: Utc::now(),
            retry_count: failed_task.retry_count,
        });
        self.beliefs.state = SessionState::ErrorRecovery;

        if failed_task.retry_count >= MAX_RETRIES {
            failed_task.status = TaskStatus::Error;
            self.tasks.insert(failed_task.id, failed_task);
            self.beliefs.state = SessionState::InProgress;
            return;
        }

        let strategies = self.planner.retrieval().suggest_error_correction(failed_task.task_type.as_str(), &error);
        self.beliefs.correction_strategies = strategies.clone();

        if is_critical(&failed_task.task_type, &error) {
            for intention in &mut self.intentions {
                if intention.status == IntentionStatus::Active && intention.tasks.contains(&failed_task.id) {
                    intention.suspend();
                }
            }

            let desire_type = match failed_task.task_type.category() {
                Some(category) => format!("fix_{category}"),
                None => "fix_budget_distribution".to_string(),
            };
            let fix_desire = Desire::new(desire_type, 0.95, json!({"task_type": failed_task.task_type.as_str()}));
            let mut fix_intention = Intention::new(fix_desire.id);
            for strategy in &strategies {
                let corrected = self.corrected_task(&failed_task, strategy);
                fix_intention.tasks.push(corrected.id);
                self.enqueue(corrected, true);
            }
            self.desires.push(fix_desire);
            self.intentions.push(fix_intention);
        } else {
            for strategy in &strategies {
                let corrected = self.corrected_task(&failed_task, strategy);
                self.enqueue(corrected, true);
            }
        }

        failed_task.status = TaskStatus::RetryPending;
        self.tasks.insert(failed_task.id, failed_task);
        self.beliefs.state = SessionState::InProgress;
    }

    fn corrected_task(&self, failed_task: &Task, strategy: &CorrectionStrategy) -> Task {
        let parameters = apply_correction(&failed_task.task_type, &failed_task.parameters, strategy);
        let mut task = Task::new(self.session_id, failed_task.task_type.clone(), parameters);
        task.retry_count = failed_task.retry_count + 1;
        task
    }

    /// Step 6: once the queue drains, settle on whatever beliefs exist.
    /// `used_budget` is only meaningful once every requested category
    /// settled; otherwise the session still terminates (the Planner never
    /// times a session out itself) with a `final_response` carrying
    /// whichever categories did resolve.
    fn finalize(mut self) -> Message {
        if self.beliefs.all_categories_complete(&self.requested_categories) {
            self.beliefs.used_budget = self
                .requested_categories
                .iter()
                .filter_map(|c| self.beliefs.results.get(c))
                .map(|record| price::normalize(record.get("price").unwrap_or(record)).max_or(0.0))
                .sum();
        }
        self.beliefs.state = SessionState::Completed;
        self.beliefs.last_updated = Utc::now();
        let _ = self.planner.session_memory().update_beliefs(self.session_id, self.beliefs.clone());

        tracing::debug!(
            session_id = %self.session_id,
            desires = self.desires.len(),
            intentions = self.intentions.len(),
            "session cycle complete"
        );

        Message {
            from: "Planner".to_string(),
            to: "user".to_string(),
            kind: MessageKind::FinalResponse,
            session_id: self.session_id,
            body: MessageBody::FinalResponse {
                summary: json!({
                    "completed": self.beliefs.completed,
                    "conflicts": self.beliefs.conflicts,
                    "used_budget": self.beliefs.used_budget,
                    "state": self.beliefs.state,
                    "last_updated": self.beliefs.last_updated,
                }),
                results: json!({
                    "venue": self.beliefs.results.get(&Category::Venue),
                    "catering": self.beliefs.results.get(&Category::Catering),
                    "decor": self.beliefs.results.get(&Category::Decor),
                }),
                session_id: self.session_id,
                is_correction: self.is_correction,
            },
        }
    }
}

fn search_task_type(category: Category) -> TaskType {
    match category {
        Category::Venue => TaskType::VenueSearch,
        Category::Catering => TaskType::CateringSearch,
        Category::Decor => TaskType::DecorSearch,
    }
}

/// A task error is critical — and triggers full intention reconsideration
/// rather than a local correction-task insertion — when it came from the
/// budget task itself, or the failure was a timeout or connection error.
fn is_critical(task_type: &TaskType, error: &str) -> bool {
    let lower = error.to_lowercase();
    matches!(task_type, TaskType::BudgetDistribution) || lower.contains("timeout") || lower.contains("connection")
}

/// Build a per-category task's criteria: the category's own requirements
/// plus a concrete budget, with the other two categories' subrecords
/// dropped (a worker never looks at them).
fn criteria_for_category(criteria: &Criteria, category: Category, budget: u64) -> Criteria {
    Criteria {
        total_budget: budget,
        guest_count: criteria.guest_count,
        style: criteria.style.clone(),
        venue: if category == Category::Venue { criteria.venue.clone() } else { None },
        catering: if category == Category::Catering { criteria.catering.clone() } else { None },
        decor: if category == Category::Decor { criteria.decor.clone() } else { None },
    }
}

/// Clone the failed task's parameters and fold in the strategy's
/// parameters, per the error-handling design: a `budget_increase` widens
/// the category's budget, a `relax_factor` loosens mandatory numeric
/// thresholds, an `adjustment_factor` scales the total budget down for a
/// retried distribution. Strategy parameters with no recognized effect
/// (`use_alternatives`, `expand_search`, ...) are carried on the task for
/// observability but don't change the search itself — the specification
/// leaves their exact effect to each worker's own configuration.
fn apply_correction(task_type: &TaskType, parameters: &Value, strategy: &CorrectionStrategy) -> Value {
    let mut value = parameters.clone();

    match task_type {
        TaskType::BudgetDistribution => {
            if let Some(factor) = strategy.parameters.get("adjustment_factor").and_then(Value::as_f64) {
                if let Some(budget) = value.get("total_budget").and_then(Value::as_u64) {
                    let adjusted = ((budget as f64 * factor).round().max(0.0)) as u64;
                    value["total_budget"] = json!(adjusted);
                    if let Some(criteria) = value.get_mut("criteria") {
                        criteria["total_budget"] = json!(adjusted);
                    }
                }
            }
        }
        _ => {
            if let Some(factor) = strategy.parameters.get("budget_increase").and_then(Value::as_f64) {
                if let Some(budget) = value.pointer("/criteria/total_budget").and_then(Value::as_u64) {
                    let adjusted = ((budget as f64 * (1.0 + factor)).round()) as u64;
                    if let Some(criteria) = value.get_mut("criteria") {
                        criteria["total_budget"] = json!(adjusted);
                    }
                }
            }
            if let Some(relax_factor) = strategy.parameters.get("relax_factor").and_then(Value::as_f64) {
                if let Some(category) = task_type.category() {
                    if let Some(criteria) = value.get_mut("criteria") {
                        relax_category_criteria(criteria, category, relax_factor);
                    }
                }
            }
        }
    }

    value
}

/// Loosen a category's mandatory numeric thresholds in place: widen a
/// minimum (capacity-like fields) or a maximum (price-like fields) by
/// `relax_factor`.
fn relax_category_criteria(criteria_json: &mut Value, category: Category, relax_factor: f64) {
    let key = category.to_string();
    let Some(cat_obj) = criteria_json.get_mut(&key).and_then(Value::as_object_mut) else {
        return;
    };
    let relax_factor = relax_factor.max(0.01);
    for (field, val) in cat_obj.iter_mut() {
        let Some(n) = val.as_f64() else { continue };
        let relaxed = match field.as_str() {
            "capacity" | "min_capacity" => n * relax_factor,
            "price" | "max_price" | "budget" => n / relax_factor,
            _ => continue,
        };
        *val = json!(relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn is_critical_flags_budget_distribution_regardless_of_message() {
        assert!(is_critical(&TaskType::BudgetDistribution, "anything"));
        assert!(!is_critical(&TaskType::VenueSearch, "no results found"));
        assert!(is_critical(&TaskType::VenueSearch, "connection reset by peer"));
    }

    #[test]
    fn budget_increase_widens_the_category_budget() {
        let params = json!({"criteria": {"total_budget": 10_000, "guest_count": 100, "style": "luxury"}, "seed_urls": []});
        let strategy = CorrectionStrategy {
            strategy_type: "venue_budget_increase".to_string(),
            description: "bump it".to_string(),
            parameters: [("budget_increase".to_string(), json!(0.2))].into_iter().collect(),
        };
        let corrected = apply_correction(&TaskType::VenueSearch, &params, &strategy);
        assert_eq!(corrected["criteria"]["total_budget"], json!(12_000));
    }

    #[test]
    fn relax_factor_loosens_mandatory_capacity_and_price() {
        let params = json!({
            "criteria": {
                "total_budget": 10_000, "guest_count": 100, "style": "luxury",
                "venue": {"mandatory": ["capacity", "price"], "capacity": 100, "price": 5000},
            },
            "seed_urls": [],
        });
        let strategy = CorrectionStrategy {
            strategy_type: "venue_relax_constraints".to_string(),
            description: "loosen it".to_string(),
            parameters: [("relax_factor".to_string(), json!(0.8))].into_iter().collect(),
        };
        let corrected = apply_correction(&TaskType::VenueSearch, &params, &strategy);
        assert_eq!(corrected["criteria"]["venue"]["capacity"], json!(80.0));
        assert_eq!(corrected["criteria"]["venue"]["price"], json!(6250.0));
    }
}
