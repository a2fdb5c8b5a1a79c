use serde::{Deserialize, Serialize};

/// Backend-owned user record returned alongside a session token on exchange,
/// or by the authenticated who-am-I call.
///
/// Always a snapshot: the backend owns this record and the client never
/// treats it as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}
