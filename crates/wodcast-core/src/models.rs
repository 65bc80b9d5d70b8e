//! Wire data model for the workout server
//!
//! Everything here is a value object: the server replaces state wholesale on
//! every update, so nothing is ever patched field-by-field. A workout with
//! the same id but a different status is a new value, not a mutation of an
//! old one.

use serde::{Deserialize, Serialize};

/// Processing status of a workout's video on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutStatus {
    /// Queued, download not started
    Pending,
    /// Server is fetching/transcoding the video
    Downloading,
    /// Video available for playback
    Ready,
    /// Server could not produce a video
    Failed,
}

impl WorkoutStatus {
    /// Viewer-facing label shown while the video cannot play
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutStatus::Pending => "Waiting for download",
            WorkoutStatus::Downloading => "Downloading...",
            WorkoutStatus::Ready => "Ready",
            WorkoutStatus::Failed => "Download failed",
        }
    }
}

/// The currently selected workout, as the server reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWorkout {
    pub id: i64,
    pub name: String,
    pub status: WorkoutStatus,
    /// Server-relative path to the video, present once downloaded
    #[serde(default)]
    pub video_url: Option<String>,
}

impl CurrentWorkout {
    /// Whether the video can actually be handed to a renderer
    pub fn is_playable(&self) -> bool {
        self.status == WorkoutStatus::Ready
            && self.video_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Full server-side cursor state, fetched once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct ServerState {
    #[serde(default)]
    pub current_group_id: Option<i64>,
    pub current_index: i64,
    #[serde(default)]
    pub current_workout: Option<CurrentWorkout>,
    /// Code a controller device enters to pair with this queue
    pub pairing_code: String,
}

/// A workout group from the catalog (read-only)
#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutGroup {
    pub id: i64,
    pub name: String,
    pub workouts: Vec<GroupWorkout>,
}

/// A group member with its ordering position
#[derive(Debug, Clone, Deserialize)]
pub struct GroupWorkout {
    pub id: i64,
    pub name: String,
    pub status: WorkoutStatus,
    pub position: i32,
}

/// Direction of a cursor move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigateDirection {
    Prev,
    Next,
}

/// Body of `POST api/state/navigate`
#[derive(Debug, Clone, Serialize)]
pub struct NavigateRequest {
    pub direction: NavigateDirection,
}

/// Body of `POST api/state/set-group`
#[derive(Debug, Clone, Serialize)]
pub struct SetGroupRequest {
    pub group_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_state() {
        let json = r#"{
            "current_group_id": 2,
            "current_index": 1,
            "current_workout": {
                "id": 7,
                "name": "Rowing intervals",
                "status": "ready",
                "video_url": "/videos/7.mp4"
            },
            "pairing_code": "483920"
        }"#;

        let state: ServerState = serde_json::from_str(json).unwrap();
        assert_eq!(state.current_group_id, Some(2));
        assert_eq!(state.current_index, 1);
        assert_eq!(state.pairing_code, "483920");

        let workout = state.current_workout.unwrap();
        assert_eq!(workout.id, 7);
        assert_eq!(workout.status, WorkoutStatus::Ready);
        assert!(workout.is_playable());
    }

    #[test]
    fn test_parse_server_state_without_workout() {
        let json = r#"{
            "current_group_id": null,
            "current_index": 0,
            "current_workout": null,
            "pairing_code": "000111"
        }"#;

        let state: ServerState = serde_json::from_str(json).unwrap();
        assert!(state.current_group_id.is_none());
        assert!(state.current_workout.is_none());
    }

    #[test]
    fn test_workout_without_video_is_not_playable() {
        let json = r#"{"id": 3, "name": "Core blast", "status": "downloading"}"#;
        let workout: CurrentWorkout = serde_json::from_str(json).unwrap();
        assert_eq!(workout.status, WorkoutStatus::Downloading);
        assert!(workout.video_url.is_none());
        assert!(!workout.is_playable());
    }

    #[test]
    fn test_ready_workout_with_empty_url_is_not_playable() {
        let workout = CurrentWorkout {
            id: 4,
            name: "Mobility".to_string(),
            status: WorkoutStatus::Ready,
            video_url: Some(String::new()),
        };
        assert!(!workout.is_playable());
    }

    #[test]
    fn test_navigate_request_serialization() {
        let body = NavigateRequest {
            direction: NavigateDirection::Next,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"direction":"next"}"#);

        let body = NavigateRequest {
            direction: NavigateDirection::Prev,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"direction":"prev"}"#);
    }

    #[test]
    fn test_parse_group_catalog() {
        let json = r#"[{
            "id": 1,
            "name": "Morning circuit",
            "workouts": [
                {"id": 7, "name": "Rowing intervals", "status": "ready", "position": 0},
                {"id": 8, "name": "Core blast", "status": "pending", "position": 1}
            ]
        }]"#;

        let groups: Vec<WorkoutGroup> = serde_json::from_str(json).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].workouts.len(), 2);
        assert_eq!(groups[0].workouts[1].status, WorkoutStatus::Pending);
    }
}
