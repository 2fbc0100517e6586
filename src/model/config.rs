use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GroupConfig {
    pub name: String,

    #[serde(default)]
    pub permissions: Vec<String>,
}
