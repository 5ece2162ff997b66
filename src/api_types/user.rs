use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Account metadata from `GET /api/user/self`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSelf {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub group: String,
    /// Pay-as-you-go balance, in quota units.
    #[serde(default)]
    pub quota: i64,
    /// Subscription balance, in quota units.
    #[serde(default)]
    pub subscription_quota: i64,
    #[serde(default)]
    pub request_count: i64,
}

impl UserSelf {
    /// Name to greet the user with: display name, else username.
    pub fn greeting_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

/// One entry of the `GET /api/user/self/groups` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupInfo {
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_ratio")]
    pub ratio: f64,
}

fn default_ratio() -> f64 {
    1.0
}

/// A selectable group, ready for a picker widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupOption {
    pub value: String,
    pub label: String,
    pub ratio: f64,
}

/// Flatten the backend's group map into picker options.
///
/// The user's own group is moved to the front so it becomes the default
/// selection; the rest keep name order. An empty map yields a single
/// catch-all option so the picker is never empty.
pub fn group_options(
    groups: &HashMap<String, GroupInfo>,
    user_group: Option<&str>,
) -> Vec<GroupOption> {
    if groups.is_empty() {
        return vec![GroupOption {
            value: String::new(),
            label: "user group".to_string(),
            ratio: 1.0,
        }];
    }

    let mut options: Vec<GroupOption> = groups
        .iter()
        .map(|(name, info)| GroupOption {
            value: name.clone(),
            label: info.desc.clone(),
            ratio: info.ratio,
        })
        .collect();
    options.sort_by(|a, b| a.value.cmp(&b.value));

    if let Some(own) = user_group
        && let Some(position) = options.iter().position(|o| o.value == own)
    {
        let selected = options.remove(position);
        options.insert(0, selected);
    }
    options
}
