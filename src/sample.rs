//! Built-in ideas shown when the idea list cannot be loaded, so the
//! dashboard stays populated instead of going blank.

use serde_json::json;

use crate::types::Idea;

pub const SAMPLE_IDEA_IDS: [&str; 2] = ["IDEA-001", "IDEA-002"];

pub fn sample_ideas() -> Vec<Idea> {
    let raw = json!([
        {
            "idea_id": "IDEA-001",
            "title": "Smart Campus Energy Monitoring",
            "description": "Sensor network and dashboard to track building energy use and flag waste in real time.",
            "category": "Sustainability",
            "status": "pending",
            "submitted_by": "Operations Team",
            "submitted_at": "2026-01-12"
        },
        {
            "idea_id": "IDEA-002",
            "title": "Community Learning Hub",
            "description": "Shared space and booking platform for peer-led workshops open to staff and residents.",
            "category": "Education",
            "status": "approved",
            "submitted_by": "Outreach Office",
            "submitted_at": "2026-01-20",
            "meetings": [
                {
                    "meeting_id": 201,
                    "date": "2026-02-03",
                    "time": "14:00",
                    "link": "https://meet.example.com/learning-hub",
                    "notes": "Initial committee review",
                    "requested_by": "Committee Chair"
                }
            ]
        }
    ]);

    match serde_json::from_value(raw) {
        Ok(ideas) => ideas,
        Err(e) => {
            log::error!("Sample ideas failed to parse: {}", e);
            Vec::new()
        }
    }
}
