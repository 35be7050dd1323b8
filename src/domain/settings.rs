use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DrawerPosition {
    Left,
    #[default]
    Right,
}

impl DrawerPosition {
    pub fn flipped(self) -> Self {
        match self { DrawerPosition::Left => DrawerPosition::Right, DrawerPosition::Right => DrawerPosition::Left }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub drawer_position: DrawerPosition,
}
