//! Rally actions as a closed sum type.
//!
//! Fields that only make sense for one result value (receive quality, set
//! call) live inside that result's variant, so a "quality on an error" or
//! "call on a missed set" cannot be built. The flat persisted shape
//! (`{ id, actorId, at, kind, result, quality?, tag?, originTag? }`) is
//! converted through [`ActionWire`], which rejects such records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Receive/dig quality grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quality {
    A,
    B,
    C,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::A, Quality::B, Quality::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::A => "A",
            Quality::B => "B",
            Quality::C => "C",
        }
    }
}

/// Set-call type: the approach an attacker was set for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetCallType {
    Left,
    Right,
    Back,
    Pipe,
    AQuick,
    BQuick,
    CQuick,
    DQuick,
    ASemi,
    BSemi,
    CSemi,
    DSemi,
    Time,
    BackAttack,
    Wide,
    Short,
    Combo,
    Other,
}

impl SetCallType {
    pub const ALL: [SetCallType; 18] = [
        SetCallType::Left,
        SetCallType::Right,
        SetCallType::Back,
        SetCallType::Pipe,
        SetCallType::AQuick,
        SetCallType::BQuick,
        SetCallType::CQuick,
        SetCallType::DQuick,
        SetCallType::ASemi,
        SetCallType::BSemi,
        SetCallType::CSemi,
        SetCallType::DSemi,
        SetCallType::Time,
        SetCallType::BackAttack,
        SetCallType::Wide,
        SetCallType::Short,
        SetCallType::Combo,
        SetCallType::Other,
    ];

    /// Scoreboard label.
    pub fn label(&self) -> &'static str {
        match self {
            SetCallType::Left => "レフト",
            SetCallType::Right => "ライト",
            SetCallType::Back => "バック",
            SetCallType::Pipe => "パイプ",
            SetCallType::AQuick => "Aクイ",
            SetCallType::BQuick => "Bクイ",
            SetCallType::CQuick => "Cクイ",
            SetCallType::DQuick => "Dクイ",
            SetCallType::ASemi => "Aセミ",
            SetCallType::BSemi => "Bセミ",
            SetCallType::CSemi => "Cセミ",
            SetCallType::DSemi => "Dセミ",
            SetCallType::Time => "時間差",
            SetCallType::BackAttack => "バックアタック",
            SetCallType::Wide => "ワイド",
            SetCallType::Short => "ショート",
            SetCallType::Combo => "コンビ",
            SetCallType::Other => "その他",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackResult {
    Kill,
    Effective,
    Continue,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServeResult {
    Ace,
    Effective,
    In,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockResult {
    Point,
    Effective,
    Touch,
    Error,
}

/// Result of a receive or dig. Quality is only recordable on a good touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchResult {
    Ok { quality: Option<Quality> },
    Error,
}

/// Result of a set. The call is only recordable on a good set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetResult {
    Ok { call: Option<SetCallType> },
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Serve,
    Block,
    Receive,
    Dig,
    Set,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Attack,
        ActionKind::Serve,
        ActionKind::Block,
        ActionKind::Receive,
        ActionKind::Dig,
        ActionKind::Set,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Attack => "attack",
            ActionKind::Serve => "serve",
            ActionKind::Block => "block",
            ActionKind::Receive => "receive",
            ActionKind::Dig => "dig",
            ActionKind::Set => "set",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One recorded skill execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `origin_tag` is stamped by the match log when the attack is appended.
    Attack { result: AttackResult, origin_tag: Option<SetCallType> },
    Serve(ServeResult),
    Block(BlockResult),
    Receive(TouchResult),
    Dig(TouchResult),
    Set(SetResult),
}

impl Action {
    pub fn attack(result: AttackResult) -> Self {
        Action::Attack { result, origin_tag: None }
    }

    pub fn receive_ok(quality: Option<Quality>) -> Self {
        Action::Receive(TouchResult::Ok { quality })
    }

    pub fn dig_ok(quality: Option<Quality>) -> Self {
        Action::Dig(TouchResult::Ok { quality })
    }

    pub fn set_ok(call: Option<SetCallType>) -> Self {
        Action::Set(SetResult::Ok { call })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Attack { .. } => ActionKind::Attack,
            Action::Serve(_) => ActionKind::Serve,
            Action::Block(_) => ActionKind::Block,
            Action::Receive(_) => ActionKind::Receive,
            Action::Dig(_) => ActionKind::Dig,
            Action::Set(_) => ActionKind::Set,
        }
    }

    /// Result as written in the persisted form.
    pub fn result_str(&self) -> &'static str {
        match self {
            Action::Attack { result, .. } => match result {
                AttackResult::Kill => "kill",
                AttackResult::Effective => "effective",
                AttackResult::Continue => "continue",
                AttackResult::Error => "error",
            },
            Action::Serve(result) => match result {
                ServeResult::Ace => "ace",
                ServeResult::Effective => "effective",
                ServeResult::In => "in",
                ServeResult::Error => "error",
            },
            Action::Block(result) => match result {
                BlockResult::Point => "point",
                BlockResult::Effective => "effective",
                BlockResult::Touch => "touch",
                BlockResult::Error => "error",
            },
            Action::Receive(touch) | Action::Dig(touch) => match touch {
                TouchResult::Ok { .. } => "ok",
                TouchResult::Error => "error",
            },
            Action::Set(set) => match set {
                SetResult::Ok { .. } => "ok",
                SetResult::Error => "error",
            },
        }
    }

    pub fn quality(&self) -> Option<Quality> {
        match self {
            Action::Receive(TouchResult::Ok { quality }) | Action::Dig(TouchResult::Ok { quality }) => {
                *quality
            }
            _ => None,
        }
    }

    pub fn set_call(&self) -> Option<SetCallType> {
        match self {
            Action::Set(SetResult::Ok { call }) => *call,
            _ => None,
        }
    }

    pub fn origin_tag(&self) -> Option<SetCallType> {
        match self {
            Action::Attack { origin_tag, .. } => *origin_tag,
            _ => None,
        }
    }

    /// Build an action from persisted kind/result strings plus the optional
    /// gated fields, rejecting combinations the sum type cannot hold.
    pub fn from_parts(
        kind: ActionKind,
        result: &str,
        quality: Option<Quality>,
        tag: Option<SetCallType>,
        origin_tag: Option<SetCallType>,
    ) -> Result<Self, CoreError> {
        let invalid = |what: &str| {
            CoreError::Validation(format!("{} action cannot carry {} (result: {})", kind, what, result))
        };

        if tag.is_some() && kind != ActionKind::Set {
            return Err(invalid("a set-call tag"));
        }
        if origin_tag.is_some() && kind != ActionKind::Attack {
            return Err(invalid("an origin tag"));
        }
        if quality.is_some() && !matches!(kind, ActionKind::Receive | ActionKind::Dig) {
            return Err(invalid("a quality"));
        }

        let unknown = || CoreError::Validation(format!("Unknown {} result: {}", kind, result));

        let action = match kind {
            ActionKind::Attack => {
                let result = match result {
                    "kill" => AttackResult::Kill,
                    "effective" => AttackResult::Effective,
                    "continue" => AttackResult::Continue,
                    "error" => AttackResult::Error,
                    _ => return Err(unknown()),
                };
                Action::Attack { result, origin_tag }
            }
            ActionKind::Serve => Action::Serve(match result {
                "ace" => ServeResult::Ace,
                "effective" => ServeResult::Effective,
                "in" => ServeResult::In,
                "error" => ServeResult::Error,
                _ => return Err(unknown()),
            }),
            ActionKind::Block => Action::Block(match result {
                "point" => BlockResult::Point,
                "effective" => BlockResult::Effective,
                "touch" => BlockResult::Touch,
                "error" => BlockResult::Error,
                _ => return Err(unknown()),
            }),
            ActionKind::Receive | ActionKind::Dig => {
                let touch = match result {
                    "ok" => TouchResult::Ok { quality },
                    "error" if quality.is_some() => return Err(invalid("a quality")),
                    "error" => TouchResult::Error,
                    _ => return Err(unknown()),
                };
                if kind == ActionKind::Receive {
                    Action::Receive(touch)
                } else {
                    Action::Dig(touch)
                }
            }
            ActionKind::Set => Action::Set(match result {
                "ok" => SetResult::Ok { call: tag },
                "error" if tag.is_some() => return Err(invalid("a set-call tag")),
                "error" => SetResult::Error,
                _ => return Err(unknown()),
            }),
        };
        Ok(action)
    }
}

/// An appended action: immutable once it sits in a rally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActionWire", into = "ActionWire")]
pub struct ActionRecord {
    pub id: String,
    pub actor_id: String,
    /// Unix milliseconds, strictly increasing within a match.
    pub at: i64,
    pub action: Action,
}

impl ActionRecord {
    pub fn new(actor_id: impl Into<String>, at: i64, action: Action) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), actor_id: actor_id.into(), at, action }
    }
}

/// Flat persisted form of an [`ActionRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionWire {
    id: String,
    actor_id: String,
    at: i64,
    kind: ActionKind,
    result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quality: Option<Quality>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "toss")]
    tag: Option<SetCallType>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "fromToss")]
    origin_tag: Option<SetCallType>,
}

impl TryFrom<ActionWire> for ActionRecord {
    type Error = CoreError;

    fn try_from(wire: ActionWire) -> Result<Self, Self::Error> {
        let action =
            Action::from_parts(wire.kind, &wire.result, wire.quality, wire.tag, wire.origin_tag)?;
        Ok(ActionRecord { id: wire.id, actor_id: wire.actor_id, at: wire.at, action })
    }
}

impl From<ActionRecord> for ActionWire {
    fn from(record: ActionRecord) -> Self {
        let action = record.action;
        ActionWire {
            id: record.id,
            actor_id: record.actor_id,
            at: record.at,
            kind: action.kind(),
            result: action.result_str().to_string(),
            quality: action.quality(),
            tag: action.set_call(),
            origin_tag: action.origin_tag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;
    use serde_json::json;

    fn record(action: Action) -> ActionRecord {
        ActionRecord { id: "a1".to_string(), actor_id: "p1".to_string(), at: 1000, action }
    }

    #[test]
    fn test_persisted_attack_shape() {
        let attack = record(Action::Attack {
            result: AttackResult::Kill,
            origin_tag: Some(SetCallType::AQuick),
        });
        assert_json_snapshot!(attack, @r###"
        {
          "id": "a1",
          "actorId": "p1",
          "at": 1000,
          "kind": "attack",
          "result": "kill",
          "originTag": "aQuick"
        }
        "###);
    }

    #[test]
    fn test_gated_fields_survive_persistence() {
        let samples = [
            Action::receive_ok(Some(Quality::B)),
            Action::dig_ok(None),
            Action::Dig(TouchResult::Error),
            Action::set_ok(Some(SetCallType::BackAttack)),
            Action::Set(SetResult::Error),
            Action::Serve(ServeResult::In),
            Action::Block(BlockResult::Touch),
        ];
        for action in samples {
            let original = record(action);
            let text = serde_json::to_string(&original).unwrap();
            let parsed: ActionRecord = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed, original, "{}", text);
        }
    }

    #[test]
    fn test_legacy_field_names_are_read() {
        let set: ActionRecord = serde_json::from_value(json!({
            "id": "s1", "actorId": "p2", "at": 5, "kind": "set", "result": "ok", "toss": "pipe"
        }))
        .unwrap();
        assert_eq!(set.action.set_call(), Some(SetCallType::Pipe));

        let attack: ActionRecord = serde_json::from_value(json!({
            "id": "k1", "actorId": "p3", "at": 6, "kind": "attack", "attackType": "spike",
            "result": "continue", "fromToss": "left"
        }))
        .unwrap();
        assert_eq!(attack.action.origin_tag(), Some(SetCallType::Left));
    }

    #[test]
    fn test_quality_on_error_is_rejected() {
        let result: Result<ActionRecord, _> = serde_json::from_value(json!({
            "id": "r1", "actorId": "p1", "at": 1, "kind": "receive", "result": "error", "quality": "A"
        }));
        assert!(result.is_err());

        let err = Action::from_parts(ActionKind::Dig, "error", Some(Quality::C), None, None);
        assert!(matches!(err, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_misplaced_tags_are_rejected() {
        assert!(Action::from_parts(ActionKind::Set, "error", None, Some(SetCallType::Time), None).is_err());
        assert!(Action::from_parts(ActionKind::Serve, "ace", None, Some(SetCallType::Time), None).is_err());
        assert!(Action::from_parts(ActionKind::Set, "ok", None, None, Some(SetCallType::Wide)).is_err());
        assert!(Action::from_parts(ActionKind::Attack, "ok", None, None, None).is_err());
        assert!(Action::from_parts(ActionKind::Block, "kill", None, None, None).is_err());
    }

    #[test]
    fn test_set_call_keys_and_labels() {
        assert_eq!(serde_json::to_string(&SetCallType::BackAttack).unwrap(), "\"backAttack\"");
        assert_eq!(serde_json::to_string(&SetCallType::DSemi).unwrap(), "\"dSemi\"");
        assert_eq!(SetCallType::Time.label(), "時間差");
        let labels: std::collections::HashSet<_> =
            SetCallType::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels.len(), SetCallType::ALL.len());
    }
}
