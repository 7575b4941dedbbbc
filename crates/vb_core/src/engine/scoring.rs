//! Per-action performance contribution in `[0.0, 1.0]`.

use crate::models::{
    Action, AttackResult, BlockResult, Quality, ServeResult, SetResult, TouchResult,
};

pub fn score_attack(result: AttackResult) -> f64 {
    match result {
        AttackResult::Kill => 1.0,
        AttackResult::Effective => 0.7,
        AttackResult::Continue => 0.3,
        AttackResult::Error => 0.0,
    }
}

pub fn score_serve(result: ServeResult) -> f64 {
    match result {
        ServeResult::Ace => 1.0,
        ServeResult::Effective => 0.7,
        ServeResult::In => 0.3,
        ServeResult::Error => 0.0,
    }
}

pub fn score_block(result: BlockResult) -> f64 {
    match result {
        BlockResult::Point => 1.0,
        BlockResult::Effective => 0.7,
        BlockResult::Touch => 0.3,
        BlockResult::Error => 0.0,
    }
}

/// Receives and digs are graded by quality; an ungraded good touch scores 0.
pub fn score_touch(touch: TouchResult) -> f64 {
    match touch {
        TouchResult::Error => 0.0,
        TouchResult::Ok { quality } => match quality {
            Some(Quality::A) => 1.0,
            Some(Quality::B) => 0.67,
            Some(Quality::C) => 0.33,
            None => 0.0,
        },
    }
}

/// Contribution of one action, or `None` for kinds without a scoring table (sets).
pub fn performance_score(action: &Action) -> Option<f64> {
    match action {
        Action::Attack { result, .. } => Some(score_attack(*result)),
        Action::Serve(result) => Some(score_serve(*result)),
        Action::Block(result) => Some(score_block(*result)),
        Action::Receive(touch) | Action::Dig(touch) => Some(score_touch(*touch)),
        Action::Set(_) => None,
    }
}

/// 1.0 for a good set, 0.0 for a missed one. Used only by set-quality splits.
pub fn set_success(result: SetResult) -> f64 {
    match result {
        SetResult::Ok { .. } => 1.0,
        SetResult::Error => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SetCallType;

    #[test]
    fn test_scoring_tables() {
        assert_eq!(performance_score(&Action::attack(AttackResult::Kill)), Some(1.0));
        assert_eq!(performance_score(&Action::attack(AttackResult::Continue)), Some(0.3));
        assert_eq!(performance_score(&Action::Serve(ServeResult::Effective)), Some(0.7));
        assert_eq!(performance_score(&Action::Serve(ServeResult::Error)), Some(0.0));
        assert_eq!(performance_score(&Action::Block(BlockResult::Touch)), Some(0.3));
        assert_eq!(performance_score(&Action::receive_ok(Some(Quality::B))), Some(0.67));
        assert_eq!(performance_score(&Action::dig_ok(Some(Quality::C))), Some(0.33));
        assert_eq!(performance_score(&Action::dig_ok(None)), Some(0.0));
        assert_eq!(performance_score(&Action::Receive(TouchResult::Error)), Some(0.0));
        assert_eq!(performance_score(&Action::set_ok(Some(SetCallType::Left))), None);
    }

    #[test]
    fn test_origin_tag_does_not_change_attack_score() {
        let tagged = Action::Attack { result: AttackResult::Effective, origin_tag: Some(SetCallType::Pipe) };
        assert_eq!(performance_score(&tagged), performance_score(&Action::attack(AttackResult::Effective)));
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let all = [
            Action::attack(AttackResult::Kill),
            Action::attack(AttackResult::Effective),
            Action::attack(AttackResult::Continue),
            Action::attack(AttackResult::Error),
            Action::Serve(ServeResult::Ace),
            Action::Serve(ServeResult::In),
            Action::Block(BlockResult::Point),
            Action::Block(BlockResult::Effective),
            Action::receive_ok(Some(Quality::A)),
            Action::dig_ok(Some(Quality::B)),
        ];
        for action in all {
            let value = performance_score(&action).unwrap();
            assert!((0.0..=1.0).contains(&value), "{:?} -> {}", action, value);
        }
        assert_eq!(set_success(SetResult::Error), 0.0);
    }
}
