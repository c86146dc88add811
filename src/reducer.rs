//! Dashboard action reducer.
//!
//! `reduce` is the only way the dashboard state changes. It is pure and
//! total: every action maps to exactly one transition, actions that name an
//! id the state does not hold leave the state as it was, and unknown action
//! tags are ignored.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::state::DashboardState;
use crate::types::{
    BmcRecord, CommitteeInfo, DashboardTab, EntityId, GanttChart, Idea, IdeaUpdates,
    Meeting, MeetingPopup, MeetingUpdates, NewMeeting,
};

/// A dashboard state transition. Serialized as `{"type": ..., "payload": ...}`.
///
/// The derived impls are reached through the `Serialize`/`Deserialize`
/// impls below, which map unrecognised tags to `Unknown` whatever payload
/// they carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    remote = "Self",
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum Action {
    // Field replace
    SetActiveTab(DashboardTab),
    SetIdeas(Vec<Idea>),
    SetBmcs(Vec<BmcRecord>),
    SetSelectedIdea(Option<EntityId>),
    SetSelectedMeeting(Option<EntityId>),
    SetShowMeetingPopup(bool),
    SetShowIdeaDetails(bool),
    SetLoading(bool),
    SetCommitteeInfo(Option<CommitteeInfo>),
    SetMeetingPopupData(Option<MeetingPopup>),
    SetGanttData(Option<GanttChart>),
    SetSuccessMessage(String),
    SetErrors(Vec<String>),

    UpdateIdea {
        idea_id: EntityId,
        updates: IdeaUpdates,
    },
    AddMeeting {
        idea_id: EntityId,
        meeting: NewMeeting,
    },
    UpdateMeeting {
        idea_id: EntityId,
        meeting_id: EntityId,
        meeting_data: MeetingUpdates,
    },
    /// Overwrite `approval_status` on every phase of the current plan.
    UpdateGanttStatus(String),
    UpdatePhaseEvaluation {
        phase_id: EntityId,
        #[serde(default)]
        evaluation_score: Option<f64>,
        #[serde(default)]
        evaluation_comments: Option<String>,
    },
    ClearMessages,

    /// Any tag this build does not know.
    #[serde(other)]
    Unknown,
}

/// Wire tags this build understands.
const KNOWN_TAGS: [&str; 19] = [
    "SET_ACTIVE_TAB",
    "SET_IDEAS",
    "SET_BMCS",
    "SET_SELECTED_IDEA",
    "SET_SELECTED_MEETING",
    "SET_SHOW_MEETING_POPUP",
    "SET_SHOW_IDEA_DETAILS",
    "SET_LOADING",
    "SET_COMMITTEE_INFO",
    "SET_MEETING_POPUP_DATA",
    "SET_GANTT_DATA",
    "SET_SUCCESS_MESSAGE",
    "SET_ERRORS",
    "UPDATE_IDEA",
    "ADD_MEETING",
    "UPDATE_MEETING",
    "UPDATE_GANTT_STATUS",
    "UPDATE_PHASE_EVALUATION",
    "CLEAR_MESSAGES",
];

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Action::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let Some(tag) = value.get("type").and_then(Value::as_str) else {
            return Err(D::Error::missing_field("type"));
        };
        if !KNOWN_TAGS.contains(&tag) {
            log::debug!("Ignoring unknown action {}", tag);
            return Ok(Action::Unknown);
        }
        Action::deserialize(value).map_err(D::Error::custom)
    }
}

impl Action {
    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetActiveTab(_) => "SET_ACTIVE_TAB",
            Action::SetIdeas(_) => "SET_IDEAS",
            Action::SetBmcs(_) => "SET_BMCS",
            Action::SetSelectedIdea(_) => "SET_SELECTED_IDEA",
            Action::SetSelectedMeeting(_) => "SET_SELECTED_MEETING",
            Action::SetShowMeetingPopup(_) => "SET_SHOW_MEETING_POPUP",
            Action::SetShowIdeaDetails(_) => "SET_SHOW_IDEA_DETAILS",
            Action::SetLoading(_) => "SET_LOADING",
            Action::SetCommitteeInfo(_) => "SET_COMMITTEE_INFO",
            Action::SetMeetingPopupData(_) => "SET_MEETING_POPUP_DATA",
            Action::SetGanttData(_) => "SET_GANTT_DATA",
            Action::SetSuccessMessage(_) => "SET_SUCCESS_MESSAGE",
            Action::SetErrors(_) => "SET_ERRORS",
            Action::UpdateIdea { .. } => "UPDATE_IDEA",
            Action::AddMeeting { .. } => "ADD_MEETING",
            Action::UpdateMeeting { .. } => "UPDATE_MEETING",
            Action::UpdateGanttStatus(_) => "UPDATE_GANTT_STATUS",
            Action::UpdatePhaseEvaluation { .. } => "UPDATE_PHASE_EVALUATION",
            Action::ClearMessages => "CLEAR_MESSAGES",
            Action::Unknown => "UNKNOWN",
        }
    }
}

/// Apply `action` to `state`, returning the next state.
pub fn reduce(state: &DashboardState, action: Action) -> DashboardState {
    let mut next = state.clone();
    match action {
        Action::SetActiveTab(tab) => next.active_tab = tab,
        Action::SetIdeas(ideas) => next.ideas = ideas,
        Action::SetBmcs(bmcs) => next.bmcs = bmcs,
        Action::SetSelectedIdea(id) => next.selected_idea = id,
        Action::SetSelectedMeeting(id) => next.selected_meeting = id,
        Action::SetShowMeetingPopup(show) => next.show_meeting_popup = show,
        Action::SetShowIdeaDetails(show) => next.show_idea_details = show,
        Action::SetLoading(loading) => next.loading = loading,
        Action::SetCommitteeInfo(info) => next.committee_info = info,
        Action::SetMeetingPopupData(popup) => next.meeting_popup = popup,
        Action::SetGanttData(chart) => next.gantt = chart,
        Action::SetSuccessMessage(message) => next.success_message = message,
        Action::SetErrors(errors) => next.errors = errors,

        Action::UpdateIdea { idea_id, updates } => {
            if let Some(idea) = next.ideas.iter_mut().find(|i| i.idea_id == idea_id) {
                updates.apply_to(idea);
            }
        }

        Action::AddMeeting { idea_id, meeting } => {
            if let Some(idea) = next.ideas.iter_mut().find(|i| i.idea_id == idea_id) {
                let meetings = idea.meetings.get_or_insert_with(Vec::new);
                // Re-delivered creation responses merge instead of duplicating the id.
                match meetings.iter_mut().find(|m| m.meeting_id == meeting.id) {
                    Some(existing) => MeetingUpdates::from(meeting).apply_to(existing),
                    None => meetings.push(Meeting::from(meeting)),
                }
            }
        }

        Action::UpdateMeeting {
            idea_id,
            meeting_id,
            meeting_data,
        } => {
            let meeting = next
                .ideas
                .iter_mut()
                .find(|i| i.idea_id == idea_id)
                .and_then(|idea| idea.meetings.as_mut())
                .and_then(|meetings| meetings.iter_mut().find(|m| m.meeting_id == meeting_id));
            if let Some(meeting) = meeting {
                meeting_data.apply_to(meeting);
            }
        }

        Action::UpdateGanttStatus(status) => {
            if let Some(chart) = next.gantt.as_mut() {
                for phase in chart.phases.iter_mut() {
                    phase.approval_status = Some(status.clone());
                }
            }
        }

        Action::UpdatePhaseEvaluation {
            phase_id,
            evaluation_score,
            evaluation_comments,
        } => {
            let phase = next
                .gantt
                .as_mut()
                .and_then(|chart| chart.phases.iter_mut().find(|p| p.id == phase_id));
            if let Some(phase) = phase {
                phase.evaluation_score = evaluation_score;
                phase.evaluation_comments = evaluation_comments;
            }
        }

        Action::ClearMessages => {
            next.success_message.clear();
            next.errors.clear();
        }

        Action::Unknown => {}
    }
    next
}

/// Fold `actions` over `initial` in order.
pub fn replay<I>(initial: &DashboardState, actions: I) -> DashboardState
where
    I: IntoIterator<Item = Action>,
{
    actions
        .into_iter()
        .fold(initial.clone(), |state, action| reduce(&state, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_ideas;
    use crate::types::{GanttPhase, IdeaStatus};
    use serde_json::json;

    fn idea(id: i64, title: &str) -> Idea {
        serde_json::from_value(json!({
            "idea_id": id,
            "title": title,
            "description": format!("{} description", title),
            "category": "operations",
            "status": "pending"
        }))
        .unwrap()
    }

    fn new_meeting(id: i64, date: &str) -> NewMeeting {
        serde_json::from_value(json!({
            "id": id,
            "date": date,
            "time": "10:00",
            "link": "https://meet.example.com/abc",
            "requested_by": "chair"
        }))
        .unwrap()
    }

    fn phase(id: i64, status: &str) -> GanttPhase {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("Phase {}", id),
            "approval_status": status
        }))
        .unwrap()
    }

    fn state_with_ideas() -> DashboardState {
        DashboardState {
            ideas: vec![idea(1, "Shared tooling"), idea(2, "Onboarding revamp")],
            ..DashboardState::default()
        }
    }

    fn state_with_gantt() -> DashboardState {
        DashboardState {
            gantt: Some(GanttChart {
                idea_id: Some(EntityId::from(1)),
                phases: vec![phase(10, "pending"), phase(11, "rejected"), phase(12, "approved")],
            }),
            ..DashboardState::default()
        }
    }

    #[test]
    fn test_reduce_is_deterministic() {
        let state = state_with_ideas();
        let actions = vec![
            Action::SetActiveTab(DashboardTab::Meetings),
            Action::UpdateIdea {
                idea_id: EntityId::from(2),
                updates: IdeaUpdates::status("approved"),
            },
            Action::AddMeeting {
                idea_id: EntityId::from(1),
                meeting: new_meeting(40, "2026-03-02"),
            },
            Action::SetErrors(vec!["x".to_string()]),
            Action::ClearMessages,
            Action::Unknown,
        ];

        for action in actions {
            let first = reduce(&state, action.clone());
            let second = reduce(&state, action);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_field_replace() {
        let state = DashboardState::default();
        let next = reduce(&state, Action::SetActiveTab(DashboardTab::Evaluation));
        assert_eq!(next.active_tab, DashboardTab::Evaluation);

        let next = reduce(&next, Action::SetIdeas(sample_ideas()));
        assert_eq!(next.ideas.len(), 2);
        assert_eq!(next.active_tab, DashboardTab::Evaluation);

        let next = reduce(&next, Action::SetShowMeetingPopup(true));
        assert!(next.show_meeting_popup);
        assert!(!state.show_meeting_popup);
    }

    #[test]
    fn test_update_idea_patches_only_given_fields() {
        let state = state_with_ideas();
        let next = reduce(
            &state,
            Action::UpdateIdea {
                idea_id: EntityId::from(1),
                updates: IdeaUpdates::status("approved"),
            },
        );

        assert_eq!(next.ideas[0].status, IdeaStatus::Approved);
        assert_eq!(next.ideas[0].title, "Shared tooling");
        assert_eq!(next.ideas[0].description, "Shared tooling description");
        assert_eq!(next.ideas[1], state.ideas[1]);
    }

    #[test]
    fn test_update_idea_patches_submitted_at() {
        let state = replay(
            &state_with_ideas(),
            [serde_json::from_value::<Action>(json!({
                "type": "UPDATE_IDEA",
                "payload": { "idea_id": 1, "updates": { "submitted_at": "2026-01-01" } }
            }))
            .unwrap()],
        );
        let action: Action = serde_json::from_value(json!({
            "type": "UPDATE_IDEA",
            "payload": { "idea_id": 1, "updates": { "submitted_at": "2026-02-02" } }
        }))
        .unwrap();
        let next = reduce(&state, action);

        let patched = next.idea(&EntityId::from(1)).unwrap();
        assert_eq!(patched.submitted_at.as_deref(), Some("2026-02-02"));
        assert!(!patched.extra.contains_key("submitted_at"));
        assert_eq!(next.ideas[1], state.ideas[1]);
    }

    #[test]
    fn test_update_idea_unknown_id_is_noop() {
        let state = state_with_ideas();
        let next = reduce(
            &state,
            Action::UpdateIdea {
                idea_id: EntityId::from(99),
                updates: IdeaUpdates::status("rejected"),
            },
        );
        assert_eq!(next.ideas, state.ideas);
    }

    #[test]
    fn test_add_meeting_initializes_collection() {
        let state = state_with_ideas();
        assert!(state.ideas[0].meetings.is_none());

        let next = reduce(
            &state,
            Action::AddMeeting {
                idea_id: EntityId::from(1),
                meeting: new_meeting(40, "2026-03-02"),
            },
        );

        let meetings = next.ideas[0].meetings.as_ref().unwrap();
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].meeting_id, EntityId::from(40));
        assert_eq!(meetings[0].date.as_deref(), Some("2026-03-02"));
        assert!(next.ideas[1].meetings.is_none());
    }

    #[test]
    fn test_add_meeting_appends_in_order_and_keeps_ids_unique() {
        let state = replay(
            &state_with_ideas(),
            vec![
                Action::AddMeeting {
                    idea_id: EntityId::from(1),
                    meeting: new_meeting(40, "2026-03-02"),
                },
                Action::AddMeeting {
                    idea_id: EntityId::from(1),
                    meeting: new_meeting(41, "2026-03-09"),
                },
                Action::AddMeeting {
                    idea_id: EntityId::from(1),
                    meeting: new_meeting(40, "2026-03-03"),
                },
            ],
        );

        let meetings = state.ideas[0].meetings.as_ref().unwrap();
        let ids: Vec<_> = meetings.iter().map(|m| m.meeting_id.clone()).collect();
        assert_eq!(ids, vec![EntityId::from(40), EntityId::from(41)]);
        assert_eq!(meetings[0].date.as_deref(), Some("2026-03-03"));
    }

    #[test]
    fn test_update_meeting_merges_matching_meeting_only() {
        let state = replay(
            &state_with_ideas(),
            vec![
                Action::AddMeeting {
                    idea_id: EntityId::from(1),
                    meeting: new_meeting(40, "2026-03-02"),
                },
                Action::AddMeeting {
                    idea_id: EntityId::from(1),
                    meeting: new_meeting(41, "2026-03-09"),
                },
            ],
        );

        let next = reduce(
            &state,
            Action::UpdateMeeting {
                idea_id: EntityId::from(1),
                meeting_id: EntityId::from(41),
                meeting_data: MeetingUpdates {
                    notes: Some("Bring the budget sheet".to_string()),
                    ..MeetingUpdates::default()
                },
            },
        );

        let meetings = next.ideas[0].meetings.as_ref().unwrap();
        assert_eq!(meetings[0], state.ideas[0].meetings.as_ref().unwrap()[0]);
        assert_eq!(meetings[1].notes.as_deref(), Some("Bring the budget sheet"));
        assert_eq!(meetings[1].date.as_deref(), Some("2026-03-09"));
        assert_eq!(next.ideas[1], state.ideas[1]);
    }

    #[test]
    fn test_update_meeting_without_meetings_is_noop() {
        let state = state_with_ideas();
        let next = reduce(
            &state,
            Action::UpdateMeeting {
                idea_id: EntityId::from(2),
                meeting_id: EntityId::from(1),
                meeting_data: MeetingUpdates::default(),
            },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_gantt_bulk_status_overwrites_every_phase() {
        let next = reduce(
            &state_with_gantt(),
            Action::UpdateGanttStatus("approved".to_string()),
        );
        let phases = &next.gantt.unwrap().phases;
        assert_eq!(phases.len(), 3);
        assert!(phases
            .iter()
            .all(|p| p.approval_status.as_deref() == Some("approved")));
    }

    #[test]
    fn test_gantt_bulk_status_without_dataset_is_noop() {
        let state = DashboardState::default();
        let next = reduce(&state, Action::UpdateGanttStatus("approved".to_string()));
        assert!(next.gantt.is_none());
    }

    #[test]
    fn test_phase_evaluation_touches_one_phase() {
        let state = state_with_gantt();
        let next = reduce(
            &state,
            Action::UpdatePhaseEvaluation {
                phase_id: EntityId::from(11),
                evaluation_score: Some(4.5),
                evaluation_comments: Some("Solid plan".to_string()),
            },
        );

        let before = &state.gantt.as_ref().unwrap().phases;
        let after = &next.gantt.as_ref().unwrap().phases;
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert_eq!(after[1].evaluation_score, Some(4.5));
        assert_eq!(after[1].evaluation_comments.as_deref(), Some("Solid plan"));
        assert_eq!(after[1].approval_status.as_deref(), Some("rejected"));
    }

    #[test]
    fn test_evaluation_and_bulk_status_do_not_conflict() {
        let next = replay(
            &state_with_gantt(),
            vec![
                Action::UpdatePhaseEvaluation {
                    phase_id: EntityId::from(10),
                    evaluation_score: Some(3.0),
                    evaluation_comments: None,
                },
                Action::UpdateGanttStatus("approved".to_string()),
            ],
        );
        let first = &next.gantt.as_ref().unwrap().phases[0];
        assert_eq!(first.evaluation_score, Some(3.0));
        assert_eq!(first.approval_status.as_deref(), Some("approved"));
    }

    #[test]
    fn test_clear_messages_leaves_other_fields() {
        let mut state = state_with_ideas();
        state.success_message = "Meeting scheduled".to_string();
        state.errors = vec!["Date is required".to_string()];
        state.active_tab = DashboardTab::Committee;
        state.show_meeting_popup = true;

        let next = reduce(&state, Action::ClearMessages);
        assert!(next.success_message.is_empty());
        assert!(next.errors.is_empty());
        assert_eq!(next.active_tab, DashboardTab::Committee);
        assert!(next.show_meeting_popup);
        assert_eq!(next.ideas, state.ideas);
    }

    #[test]
    fn test_unknown_tag_deserializes_and_is_ignored() {
        let action: Action = serde_json::from_value(json!({ "type": "SET_THEME" })).unwrap();
        assert_eq!(action, Action::Unknown);

        let state = state_with_ideas();
        assert_eq!(reduce(&state, action), state);
    }

    #[test]
    fn test_unknown_tag_with_payload_is_ignored() {
        let action: Action = serde_json::from_value(json!({
            "type": "SET_THEME",
            "payload": { "dark": true }
        }))
        .unwrap();
        assert_eq!(action, Action::Unknown);

        let log = json!([
            { "type": "SET_SUCCESS_MESSAGE", "payload": "Saved" },
            { "type": "PIN_IDEA", "payload": { "idea_id": 1 } },
            { "type": "CLEAR_MESSAGES" }
        ]);
        let actions: Vec<Action> = serde_json::from_value(log).unwrap();
        assert_eq!(actions[1], Action::Unknown);
        let state = replay(&state_with_ideas(), actions);
        assert_eq!(state.success_message, "");
        assert_eq!(state.ideas, state_with_ideas().ideas);
    }

    #[test]
    fn test_known_tag_with_bad_payload_is_an_error() {
        let result = serde_json::from_value::<Action>(json!({
            "type": "SET_LOADING",
            "payload": "not a bool"
        }));
        assert!(result.is_err());
        assert!(serde_json::from_value::<Action>(json!({ "payload": 1 })).is_err());
    }

    #[test]
    fn test_serialized_tag_matches_kind() {
        let actions = vec![
            Action::SetLoading(true),
            Action::UpdateGanttStatus("approved".to_string()),
            Action::ClearMessages,
        ];
        for action in actions {
            let value = serde_json::to_value(&action).unwrap();
            assert_eq!(value["type"], json!(action.kind()));
            assert!(KNOWN_TAGS.contains(&action.kind()));
            assert_eq!(serde_json::from_value::<Action>(value).unwrap(), action);
        }
    }

    #[test]
    fn test_action_wire_format() {
        let action: Action = serde_json::from_value(json!({
            "type": "UPDATE_IDEA",
            "payload": { "idea_id": "IDEA-002", "updates": { "status": "on_hold" } }
        }))
        .unwrap();

        match &action {
            Action::UpdateIdea { idea_id, updates } => {
                assert_eq!(idea_id, &EntityId::from("IDEA-002"));
                assert_eq!(updates.status, Some(IdeaStatus::OnHold));
                assert!(updates.title.is_none());
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(action.kind(), "UPDATE_IDEA");
    }
}
