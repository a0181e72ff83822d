use serde::{Deserialize, Serialize};

/// One key or a list of alternatives bound to the same direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keys {
    One(String),
    Many(Vec<String>),
}

impl Keys {
    /// True if any bound key is held.
    pub fn any_held(&self, mut held: impl FnMut(&str) -> bool) -> bool {
        match self {
            Keys::One(key) => held(key),
            Keys::Many(keys) => keys.iter().any(|k| held(k)),
        }
    }

    /// The first bound key, if any.
    pub fn primary(&self) -> Option<&str> {
        match self {
            Keys::One(key) => Some(key),
            Keys::Many(keys) => keys.first().map(String::as_str),
        }
    }
}

impl From<&str> for Keys {
    fn from(key: &str) -> Self {
        Keys::One(key.to_owned())
    }
}

impl From<&[&str]> for Keys {
    fn from(keys: &[&str]) -> Self {
        Keys::Many(keys.iter().map(|k| (*k).to_owned()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionBindings {
    pub up: Keys,
    pub down: Keys,
    pub left: Keys,
    pub right: Keys,
}

/// Key bindings document, e.g.
/// `{"directionBindings": {"up": ["w", "ArrowUp"], "down": "s", ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyBindings {
    pub direction_bindings: DirectionBindings,
}

impl Default for KeyBindings {
    /// WASD plus arrow keys.
    fn default() -> Self {
        Self {
            direction_bindings: DirectionBindings {
                up: Keys::from(&["w", "ArrowUp"][..]),
                down: Keys::from(&["s", "ArrowDown"][..]),
                left: Keys::from(&["a", "ArrowLeft"][..]),
                right: Keys::from(&["d", "ArrowRight"][..]),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_accept_string_or_array() {
        let json = r#"{
            "directionBindings": {
                "up": ["w", "ArrowUp"],
                "down": "s",
                "left": ["a"],
                "right": "d"
            }
        }"#;
        let kb: KeyBindings = serde_json::from_str(json).unwrap();
        assert_eq!(kb.direction_bindings.down, Keys::One("s".into()));
        assert_eq!(
            kb.direction_bindings.up,
            Keys::Many(vec!["w".into(), "ArrowUp".into()])
        );
    }

    #[test]
    fn any_held_checks_every_alternative() {
        let keys = Keys::from(&["w", "ArrowUp"][..]);
        assert!(keys.any_held(|k| k == "ArrowUp"));
        assert!(!keys.any_held(|k| k == "s"));
        assert!(!Keys::Many(Vec::new()).any_held(|_| true));
    }

    #[test]
    fn default_bindings_cover_wasd() {
        let kb = KeyBindings::default();
        assert!(kb.direction_bindings.left.any_held(|k| k == "a"));
        assert!(kb.direction_bindings.right.any_held(|k| k == "ArrowRight"));
    }

    #[test]
    fn primary_is_first_binding() {
        assert_eq!(Keys::from("s").primary(), Some("s"));
        assert_eq!(KeyBindings::default().direction_bindings.up.primary(), Some("w"));
        assert_eq!(Keys::Many(Vec::new()).primary(), None);
    }
}
