use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend identifier.
///
/// The review backend hands out numeric keys for most rows but string codes
/// (`"IDEA-001"`) for seeded and legacy ideas. Both shapes are accepted on
/// the wire and compared by value, so `1` and `"1"` are distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Num(i64),
    Text(String),
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Num(n) => write!(f, "{}", n),
            EntityId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Num(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

// =============================================================================
// Ideas and meetings
// =============================================================================

/// Lifecycle status of an idea.
///
/// The backend owns the vocabulary; anything outside the known set is kept
/// verbatim in `Other` so a round trip never loses a status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IdeaStatus {
    #[default]
    Pending,
    InReview,
    Approved,
    Rejected,
    OnHold,
    Other(String),
}

impl IdeaStatus {
    pub fn as_str(&self) -> &str {
        match self {
            IdeaStatus::Pending => "pending",
            IdeaStatus::InReview => "in_review",
            IdeaStatus::Approved => "approved",
            IdeaStatus::Rejected => "rejected",
            IdeaStatus::OnHold => "on_hold",
            IdeaStatus::Other(s) => s,
        }
    }
}

impl From<String> for IdeaStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => IdeaStatus::Pending,
            "in_review" => IdeaStatus::InReview,
            "approved" => IdeaStatus::Approved,
            "rejected" => IdeaStatus::Rejected,
            "on_hold" => IdeaStatus::OnHold,
            _ => IdeaStatus::Other(value),
        }
    }
}

impl From<&str> for IdeaStatus {
    fn from(value: &str) -> Self {
        IdeaStatus::from(value.to_string())
    }
}

impl From<IdeaStatus> for String {
    fn from(value: IdeaStatus) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted proposal tracked through committee review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub idea_id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: IdeaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    /// Absent until the first meeting is scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meetings: Option<Vec<Meeting>>,
    /// Backend fields the dashboard does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial update for an idea. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IdeaStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Idea keys with a typed field; never stored in `Idea::extra`.
const IDEA_FIELDS: [&str; 8] = [
    "idea_id",
    "title",
    "description",
    "category",
    "status",
    "submitted_by",
    "submitted_at",
    "meetings",
];

const MEETING_FIELDS: [&str; 7] = [
    "meeting_id",
    "id",
    "date",
    "time",
    "link",
    "notes",
    "requested_by",
];

/// Copy unmodelled keys from an update into `target`. Keys that name a
/// typed field (including identity and the meeting list) are dropped.
fn merge_extra(target: &mut Map<String, Value>, extra: &Map<String, Value>, modelled: &[&str]) {
    for (key, value) in extra {
        if modelled.contains(&key.as_str()) {
            log::debug!("Ignoring update to non-patchable field {}", key);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

impl IdeaUpdates {
    pub fn status(status: impl Into<IdeaStatus>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Apply to `idea`, leaving fields absent from the update untouched.
    pub fn apply_to(&self, idea: &mut Idea) {
        if let Some(title) = &self.title {
            idea.title = title.clone();
        }
        if let Some(description) = &self.description {
            idea.description = description.clone();
        }
        if let Some(category) = &self.category {
            idea.category = category.clone();
        }
        if let Some(status) = &self.status {
            idea.status = status.clone();
        }
        if let Some(submitted_by) = &self.submitted_by {
            idea.submitted_by = Some(submitted_by.clone());
        }
        if let Some(submitted_at) = &self.submitted_at {
            idea.submitted_at = Some(submitted_at.clone());
        }
        merge_extra(&mut idea.extra, &self.extra, &IDEA_FIELDS);
    }
}

/// A committee meeting scheduled for one idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub meeting_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Meeting as returned by the create-meeting call. `id` becomes the
/// permanent local `meeting_id` once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<NewMeeting> for Meeting {
    fn from(m: NewMeeting) -> Self {
        Meeting {
            meeting_id: m.id,
            date: m.date,
            time: m.time,
            link: m.link,
            notes: m.notes,
            requested_by: m.requested_by,
            extra: m.extra,
        }
    }
}

/// Shallow merge payload for a meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MeetingUpdates {
    pub fn apply_to(&self, meeting: &mut Meeting) {
        if let Some(date) = &self.date {
            meeting.date = Some(date.clone());
        }
        if let Some(time) = &self.time {
            meeting.time = Some(time.clone());
        }
        if let Some(link) = &self.link {
            meeting.link = Some(link.clone());
        }
        if let Some(notes) = &self.notes {
            meeting.notes = Some(notes.clone());
        }
        if let Some(requested_by) = &self.requested_by {
            meeting.requested_by = Some(requested_by.clone());
        }
        merge_extra(&mut meeting.extra, &self.extra, &MEETING_FIELDS);
    }
}

impl From<NewMeeting> for MeetingUpdates {
    fn from(m: NewMeeting) -> Self {
        MeetingUpdates {
            date: m.date,
            time: m.time,
            link: m.link,
            notes: m.notes,
            requested_by: m.requested_by,
            extra: m.extra,
        }
    }
}

/// Data backing the meeting scheduling popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingPopup {
    pub idea_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting: Option<Meeting>,
}

// =============================================================================
// Business model canvas, Gantt, committee
// =============================================================================

/// Business Model Canvas record for one idea. Canvas blocks are opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmcRecord {
    pub idea_id: EntityId,
    #[serde(flatten)]
    pub blocks: Map<String, Value>,
}

/// A scheduled execution-plan segment with its own approval and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttPhase {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_comments: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Execution plan of one idea.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GanttChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_id: Option<EntityId>,
    #[serde(default)]
    pub phases: Vec<GanttPhase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitteeMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The reviewing committee of the current session. Always replaced whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitteeInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub members: Vec<CommitteeMember>,
}

/// Summary derived from an idea-list response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitteeSummary {
    pub committee_id: Option<EntityId>,
    pub idea_count: usize,
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: EntityId,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Remote payloads
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaListResponse {
    #[serde(default)]
    pub ideas: Vec<Idea>,
    #[serde(default)]
    pub committee_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationListResponse {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub count: u32,
}

/// Acknowledgement body returned by mutation endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default = "default_ack_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_ack_success() -> bool {
    true
}

// =============================================================================
// UI selection
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    #[default]
    Overview,
    Ideas,
    Meetings,
    Evaluation,
    Committee,
}

impl DashboardTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "overview",
            DashboardTab::Ideas => "ideas",
            DashboardTab::Meetings => "meetings",
            DashboardTab::Evaluation => "evaluation",
            DashboardTab::Committee => "committee",
        }
    }
}
