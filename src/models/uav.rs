use serde::Serialize;
use tracing::debug;

use crate::models::{
    common::{MissionMode, Vector2, constants},
    events::{Effect, MessageLevel, TickOutput, UAV_LOSS_TINT},
    target::Target,
    traits::{IAgent, IMovable},
};
use crate::scenario::UavConfig;

/// UAVの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UavStatus {
    /// 編隊飛行（待機）
    Formation,
    /// 任務中（目標を保持）
    OnMission,
    /// 編隊へ復帰中
    Returning,
    /// 任務完了（全面攻撃モードで目標撃破後）
    MissionComplete,
    /// 撃墜
    Destroyed,
}

impl UavStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UavStatus::Formation => "編隊飛行",
            UavStatus::OnMission => "任務中",
            UavStatus::Returning => "編隊復帰中",
            UavStatus::MissionComplete => "任務完了",
            UavStatus::Destroyed => "撃墜",
        }
    }
}

/// 編隊位置の基準となる指揮機の姿勢
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationAnchor {
    pub position: Vector2,
    pub heading: f64,
}

impl FormationAnchor {
    pub fn of(unit: &dyn IMovable) -> Self {
        Self {
            position: unit.get_position(),
            heading: unit.get_heading(),
        }
    }
}

/// 無人攻撃機
///
/// 加速度モデルは持たず、一定速度で目的地へ直進します（向きは即座に変わる）。
/// 目標の保持は `assigned_target` のIDで表し、ロック（`Target::is_targeted`）の
/// 取得と解放はこの構造体のメソッドだけが行います。
#[derive(Debug, Clone, PartialEq)]
pub struct Uav {
    pub id: usize,
    pub position: Vector2,
    pub velocity: Vector2,
    pub speed: f64,
    /// 表示色（描画側で使用）
    pub color: [u8; 3],
    pub status: UavStatus,
    pub assigned_target: Option<usize>,
}

impl Uav {
    pub fn new(id: usize, position: Vector2, speed: f64) -> Self {
        Self {
            id,
            position,
            velocity: Vector2::ZERO,
            speed,
            color: constants::UAV_COLORS[id % constants::UAV_COLORS.len()],
            status: UavStatus::Formation,
            assigned_target: None,
        }
    }

    /// 目標を割り当て、目標側のロックも同時に取得する
    ///
    /// 撃墜済みのUAV、非アクティブまたはロック済みの目標には何もしません。
    pub fn assign_target(&mut self, target: &mut Target, out: &mut TickOutput) -> bool {
        if self.status == UavStatus::Destroyed || !target.is_available() {
            return false;
        }
        target.is_targeted = true;
        self.assigned_target = Some(target.id);
        self.status = UavStatus::OnMission;
        out.message(
            MessageLevel::Info,
            format!("UAV #{}, 目標 #{} 攻撃命令受信!", self.id, target.id),
        );
        true
    }

    /// 保持中の目標のロックを解放し、割り当てを外す
    fn release_target(&mut self, targets: &mut [Target]) {
        if let Some(target_id) = self.assigned_target.take() {
            if let Some(target) = targets.get_mut(target_id) {
                target.is_targeted = false;
            }
        }
    }

    /// 編隊へ復帰する（撃墜済み・編隊飛行中は何もしない）
    pub fn return_to_formation(&mut self, targets: &mut [Target], out: &mut TickOutput) {
        if matches!(self.status, UavStatus::Destroyed | UavStatus::Formation) {
            return;
        }
        self.release_target(targets);
        self.status = UavStatus::Returning;
        out.message(MessageLevel::Warn, format!("UAV #{} 編隊復帰開始.", self.id));
    }

    /// 撃墜される
    pub fn destroy(&mut self, targets: &mut [Target], out: &mut TickOutput) {
        if self.status == UavStatus::Destroyed {
            return;
        }
        self.release_target(targets);
        self.status = UavStatus::Destroyed;
        out.message(
            MessageLevel::Error,
            format!("UAV #{}, 敵SAMにより撃墜!", self.id),
        );
        out.effect(Effect::Destruction {
            position: self.position,
            tint: Some(UAV_LOSS_TINT),
        });
    }

    /// 保持中の目標を攻撃する
    ///
    /// 撃破後の遷移は作戦モードで決まります（MUM-T: 編隊復帰、全面攻撃: 任務完了）。
    pub fn attack(&mut self, targets: &mut [Target], mode: MissionMode, out: &mut TickOutput) {
        if self.status != UavStatus::OnMission {
            return;
        }
        let Some(target_id) = self.assigned_target else {
            return;
        };
        let Some(target) = targets.get_mut(target_id) else {
            return;
        };
        if !target.destroy() {
            return;
        }
        debug!(uav = self.id, target = target_id, "目標撃破");

        out.message(
            MessageLevel::Success,
            format!("UAV #{}, 目標 #{} 撃破成功!", self.id, target_id),
        );
        out.effect(Effect::Destruction {
            position: target.position,
            tint: None,
        });

        if mode.has_command_unit() {
            self.return_to_formation(targets, out);
        } else {
            self.release_target(targets);
            self.status = UavStatus::MissionComplete;
        }
    }

    /// 指揮機を基準とした編隊位置
    ///
    /// IDの偶奇で左右、ID/2 で列を決め、指揮機の進行方向に合わせて回転します。
    pub fn formation_slot(&self, anchor: &FormationAnchor, config: &UavConfig) -> Vector2 {
        let side = if self.id % 2 == 0 { -1.0 } else { 1.0 };
        let rank = (self.id / 2 + 1) as f64;
        let slot = Vector2::new(
            -config.slot_spacing_back * rank,
            config.slot_spacing_side * rank * side,
        );
        slot.rotate(anchor.heading) + anchor.position
    }

    /// 目的地の決定（編隊復帰の完了判定を含む）
    fn resolve_destination(
        &mut self,
        anchor: Option<&FormationAnchor>,
        targets: &[Target],
        config: &UavConfig,
    ) -> Option<Vector2> {
        match self.status {
            UavStatus::Formation | UavStatus::Returning => {
                let anchor = anchor?;
                let slot = self.formation_slot(anchor, config);
                if self.status == UavStatus::Returning
                    && self.position.distance(&slot) < config.rejoin_radius
                {
                    self.status = UavStatus::Formation;
                }
                Some(slot)
            }
            UavStatus::OnMission => self
                .assigned_target
                .and_then(|id| targets.get(id))
                .map(|t| t.position),
            UavStatus::MissionComplete | UavStatus::Destroyed => None,
        }
    }

    /// 1ティック分の更新
    pub fn update(
        &mut self,
        anchor: Option<&FormationAnchor>,
        targets: &mut [Target],
        mode: MissionMode,
        config: &UavConfig,
        out: &mut TickOutput,
    ) {
        if let Some(destination) = self.resolve_destination(anchor, targets, config) {
            let offset = destination - self.position;
            if offset.magnitude() > self.speed {
                let step = offset.set_magnitude(self.speed);
                self.position += step;
                self.velocity = step;
            }
        }

        if self.status == UavStatus::OnMission {
            let in_reach = self
                .assigned_target
                .and_then(|id| targets.get(id))
                .is_some_and(|t| self.position.distance(&t.position) < config.attack_radius);
            if in_reach {
                self.attack(targets, mode, out);
            }
        }
    }
}

impl IAgent for Uav {
    fn get_id(&self) -> usize {
        self.id
    }

    fn is_active(&self) -> bool {
        self.status != UavStatus::Destroyed
    }

    fn get_position(&self) -> Vector2 {
        self.position
    }
}

impl IMovable for Uav {
    fn get_velocity(&self) -> Vector2 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::target::TargetStatus;

    fn setup() -> (Uav, Vec<Target>, TickOutput) {
        let uav = Uav::new(0, Vector2::ZERO, 2.8);
        let targets = vec![
            Target::new(0, Vector2::new(100.0, 0.0)),
            Target::new(1, Vector2::new(0.0, 100.0)),
        ];
        (uav, targets, TickOutput::new(0))
    }

    #[test]
    fn test_assign_locks_target() {
        let (mut uav, mut targets, mut out) = setup();
        assert!(uav.assign_target(&mut targets[0], &mut out));
        assert_eq!(uav.status, UavStatus::OnMission);
        assert_eq!(uav.assigned_target, Some(0));
        assert!(targets[0].is_targeted);
        assert_eq!(out.messages[0].level, MessageLevel::Info);

        // ロック済み目標は別機に割り当てられない
        let mut other = Uav::new(1, Vector2::ZERO, 2.8);
        assert!(!other.assign_target(&mut targets[0], &mut out));
        assert_eq!(other.status, UavStatus::Formation);
    }

    #[test]
    fn test_destroyed_uav_ignores_commands() {
        let (mut uav, mut targets, mut out) = setup();
        uav.destroy(&mut targets, &mut out);
        assert_eq!(out.destruction_count(), 1);
        assert!(!uav.assign_target(&mut targets[0], &mut out));
        uav.return_to_formation(&mut targets, &mut out);
        uav.destroy(&mut targets, &mut out);
        assert_eq!(uav.status, UavStatus::Destroyed);
        assert_eq!(out.destruction_count(), 1);
        assert!(!targets[0].is_targeted);
    }

    #[test]
    fn test_destroy_releases_lock() {
        let (mut uav, mut targets, mut out) = setup();
        uav.assign_target(&mut targets[1], &mut out);
        uav.destroy(&mut targets, &mut out);
        assert!(!targets[1].is_targeted);
        assert_eq!(uav.assigned_target, None);
    }

    #[test]
    fn test_return_to_formation_is_idempotent() {
        let (mut uav, mut targets, mut out) = setup();
        uav.assign_target(&mut targets[0], &mut out);
        uav.return_to_formation(&mut targets, &mut out);
        let once = (uav.clone(), targets.clone());
        uav.return_to_formation(&mut targets, &mut out);
        assert_eq!((uav, targets), once);
        assert_eq!(once.0.status, UavStatus::Returning);
        assert!(!once.1[0].is_targeted);
    }

    #[test]
    fn test_formation_slot_layout() {
        let config = UavConfig::default();
        let anchor = FormationAnchor {
            position: Vector2::new(100.0, 100.0),
            heading: 0.0,
        };
        let left = Uav::new(0, Vector2::ZERO, 2.8).formation_slot(&anchor, &config);
        let right = Uav::new(1, Vector2::ZERO, 2.8).formation_slot(&anchor, &config);
        let second_rank = Uav::new(2, Vector2::ZERO, 2.8).formation_slot(&anchor, &config);
        assert_eq!(left, Vector2::new(50.0, 60.0));
        assert_eq!(right, Vector2::new(50.0, 140.0));
        assert_eq!(second_rank, Vector2::new(0.0, 20.0));
    }

    #[test]
    fn test_moves_at_constant_speed_and_attacks() {
        let (mut uav, mut targets, mut out) = setup();
        let config = UavConfig::default();
        uav.assign_target(&mut targets[0], &mut out);
        uav.update(None, &mut targets, MissionMode::AllOut, &config, &mut out);
        assert!((uav.position.x - 2.8).abs() < 1e-12);
        assert!((uav.velocity.magnitude() - 2.8).abs() < 1e-12);

        for _ in 0..40 {
            uav.update(None, &mut targets, MissionMode::AllOut, &config, &mut out);
        }
        assert_eq!(targets[0].status, TargetStatus::Destroyed);
        assert_eq!(uav.status, UavStatus::MissionComplete);
        assert_eq!(uav.assigned_target, None);
        assert_eq!(out.destruction_count(), 1);
    }

    #[test]
    fn test_attack_in_mumt_returns_to_formation() {
        let (mut uav, mut targets, mut out) = setup();
        uav.position = Vector2::new(95.0, 0.0);
        uav.assign_target(&mut targets[0], &mut out);
        uav.attack(&mut targets, MissionMode::Mumt, &mut out);
        assert_eq!(uav.status, UavStatus::Returning);
        assert_eq!(targets[0].status, TargetStatus::Destroyed);
        assert!(!targets[0].is_targeted);
    }

    #[test]
    fn test_formation_without_anchor_holds_position() {
        let (mut uav, mut targets, mut out) = setup();
        uav.update(None, &mut targets, MissionMode::AllOut, &UavConfig::default(), &mut out);
        assert_eq!(uav.position, Vector2::ZERO);
    }

    #[test]
    fn test_returning_rejoins_near_slot() {
        let (mut uav, mut targets, mut out) = setup();
        let config = UavConfig::default();
        let anchor = FormationAnchor {
            position: Vector2::new(50.0, 40.0),
            heading: 0.0,
        };
        // スロットは (0, 0)
        uav.assign_target(&mut targets[0], &mut out);
        uav.return_to_formation(&mut targets, &mut out);
        uav.update(Some(&anchor), &mut targets, MissionMode::Mumt, &config, &mut out);
        assert_eq!(uav.status, UavStatus::Formation);
    }
}
