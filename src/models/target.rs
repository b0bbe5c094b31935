use serde::Serialize;

use crate::models::{common::Vector2, traits::IAgent};

/// 目標の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetStatus {
    Active,
    Destroyed,
}

/// 地上の固定目標
///
/// `is_targeted` は割り当てのロックです。生存UAVのうち高々1機だけが
/// ロック中の目標を保持できます（ロックの取得・解放は `Uav` 側で一括して行う）。
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: usize,
    pub position: Vector2,
    pub status: TargetStatus,
    pub is_targeted: bool,
}

impl Target {
    pub fn new(id: usize, position: Vector2) -> Self {
        Self {
            id,
            position,
            status: TargetStatus::Active,
            is_targeted: false,
        }
    }

    /// 割り当て可能（アクティブかつ未ロック）かどうか
    pub fn is_available(&self) -> bool {
        self.status == TargetStatus::Active && !self.is_targeted
    }

    /// 撃破する。既に撃破済みなら false
    pub fn destroy(&mut self) -> bool {
        if self.status != TargetStatus::Active {
            return false;
        }
        self.status = TargetStatus::Destroyed;
        true
    }
}

impl IAgent for Target {
    fn get_id(&self) -> usize {
        self.id
    }

    fn is_active(&self) -> bool {
        self.status == TargetStatus::Active
    }

    fn get_position(&self) -> Vector2 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroy_only_once() {
        let mut target = Target::new(0, Vector2::new(10.0, 10.0));
        assert!(target.is_available());
        assert!(target.destroy());
        assert!(!target.destroy());
        assert!(!target.is_available());
        assert!(!target.is_active());
    }

    #[test]
    fn test_locked_target_is_not_available() {
        let mut target = Target::new(3, Vector2::ZERO);
        target.is_targeted = true;
        assert!(target.is_active());
        assert!(!target.is_available());
    }
}
