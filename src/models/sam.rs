use crate::models::{common::Vector2, traits::IAgent};
use crate::random::RandomSource;

/// 地対空ミサイル陣地
///
/// 射程と射撃確率は生成時に固定され、ティック間で保持する状態はありません。
#[derive(Debug, Clone, PartialEq)]
pub struct Sam {
    pub id: usize,
    pub position: Vector2,
    /// 探知（交戦）範囲
    pub detection_range: f64,
    /// ティックごとの射撃確率
    pub fire_probability: f64,
}

impl Sam {
    pub fn new(id: usize, position: Vector2, detection_range: f64, fire_probability: f64) -> Self {
        Self {
            id,
            position,
            detection_range,
            fire_probability,
        }
    }

    /// 交戦範囲内かどうか（境界を含む）
    pub fn in_range(&self, point: Vector2) -> bool {
        self.position.distance(&point) <= self.detection_range
    }

    /// 探知範囲の内側にいるかどうか（境界を含まない）
    ///
    /// 指揮機の脅威状態判定に使用します。
    pub fn covers(&self, point: Vector2) -> bool {
        self.position.distance(&point) < self.detection_range
    }

    /// 回避操舵で使う危険半径
    pub fn danger_radius(&self, margin: f64) -> f64 {
        self.detection_range + margin
    }

    /// 対象に射撃するかを判定する
    ///
    /// 範囲外の対象には乱数を消費しません。
    pub fn try_fire<R: RandomSource + ?Sized>(&self, unit: &dyn IAgent, rng: &mut R) -> bool {
        unit.is_active() && self.in_range(unit.get_position()) && rng.chance(self.fire_probability)
    }
}
