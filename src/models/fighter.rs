use serde::Serialize;
use tracing::trace;

use crate::assignment;
use crate::models::{
    common::Vector2,
    events::TickOutput,
    sam::Sam,
    steering::{self, NoiseField, SteeringLimits, Threat, WanderParams},
    target::Target,
    traits::{IAgent, IMovable},
    uav::Uav,
};
use crate::random::RandomSource;
use crate::scenario::FighterConfig;

/// 指揮機の状態（毎ティック SAM との位置関係から再計算）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FighterStatus {
    Safe,
    Threatened,
}

impl FighterStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FighterStatus::Safe => "安全",
            FighterStatus::Threatened => "危険",
        }
    }
}

/// 有人戦闘機（指揮機）
///
/// 連続的な操舵（放浪・脅威回避・編隊重心追従）で飛行しながら、
/// クールダウン付きの戦術判断でUAVに目標を割り当てます。
/// SAMの射撃を受けても撃墜されることはありません。
#[derive(Debug, Clone, PartialEq)]
pub struct Fighter {
    pub position: Vector2,
    pub velocity: Vector2,
    /// 操舵力の累積（積分後に毎ティック0へ戻す）
    pub acceleration: Vector2,
    pub max_speed: f64,
    pub max_force: f64,
    pub status: FighterStatus,
    /// 次の戦術判断までの残りティック
    pub decision_cooldown: u32,
    pub noise_phase: f64,
    noise: NoiseField,
    wander_params: WanderParams,
}

impl Fighter {
    /// ランダムな向き（最大速度）と位相原点で生成
    pub fn spawn<R: RandomSource + ?Sized>(position: Vector2, config: &FighterConfig, rng: &mut R) -> Self {
        let heading = rng.range(0.0, std::f64::consts::TAU);
        let phase = rng.range(0.0, 1000.0);
        let noise = NoiseField::new(rng);
        Self::new(
            position,
            Vector2::from_angle(heading, config.max_speed),
            phase,
            noise,
            config,
        )
    }

    pub fn new(
        position: Vector2,
        velocity: Vector2,
        noise_phase: f64,
        noise: NoiseField,
        config: &FighterConfig,
    ) -> Self {
        Self {
            position,
            velocity: velocity.limit(config.max_speed),
            acceleration: Vector2::ZERO,
            max_speed: config.max_speed,
            max_force: config.max_force,
            status: FighterStatus::Safe,
            decision_cooldown: 0,
            noise_phase,
            noise,
            wander_params: WanderParams::default(),
        }
    }

    fn limits(&self) -> SteeringLimits {
        SteeringLimits {
            max_speed: self.max_speed,
            max_force: self.max_force,
        }
    }

    pub fn apply_force(&mut self, force: Vector2) {
        self.acceleration += force;
    }

    /// 1ティック分の更新
    ///
    /// 操舵力の合成 → 積分 → 戦術判断 → 脅威状態の再計算 の順に実行します。
    pub fn update(
        &mut self,
        uavs: &mut [Uav],
        targets: &mut [Target],
        sams: &[Sam],
        config: &FighterConfig,
        out: &mut TickOutput,
    ) {
        let limits = self.limits();

        let (wander_force, next_phase) = steering::wander(
            self.position,
            self.velocity,
            &self.noise,
            self.noise_phase,
            &self.wander_params,
            limits,
        );
        self.noise_phase = next_phase;

        let threats: Vec<Threat> = sams
            .iter()
            .map(|sam| Threat {
                position: sam.position,
                danger_radius: sam.danger_radius(config.danger_margin),
            })
            .collect();
        let avoid_force = steering::avoid_threats(self.position, self.velocity, &threats, limits);

        let squad: Vec<Vector2> = uavs
            .iter()
            .filter(|u| u.is_active())
            .map(|u| u.position)
            .collect();
        let follow_force = steering::follow_centroid(self.position, self.velocity, &squad, limits);

        self.apply_force(wander_force * config.wander_weight);
        self.apply_force(avoid_force * config.avoid_weight);
        self.apply_force(follow_force * config.follow_weight);

        self.velocity = (self.velocity + self.acceleration).limit(self.max_speed);
        self.position += self.velocity;
        self.acceleration = Vector2::ZERO;

        self.think(uavs, targets, config.decision_cooldown_ticks, out);
        self.check_status(sams);

        trace!(
            x = self.position.x,
            y = self.position.y,
            speed = self.velocity.magnitude(),
            "指揮機更新"
        );
    }

    /// 戦術判断（クールダウン付き）
    ///
    /// クールダウン中は何もしません。割り当てに成功したときだけクールダウンを再設定し、
    /// 候補がいなければ0のまま次ティックで再評価します。
    pub fn think(
        &mut self,
        uavs: &mut [Uav],
        targets: &mut [Target],
        cooldown_ticks: u32,
        out: &mut TickOutput,
    ) -> bool {
        self.decision_cooldown = self.decision_cooldown.saturating_sub(1);
        if self.decision_cooldown > 0 {
            return false;
        }

        if assignment::command_gated(self.position, uavs, targets, out) {
            self.decision_cooldown = cooldown_ticks;
            return true;
        }
        false
    }

    /// いずれかのSAMの探知範囲内なら Threatened
    pub fn check_status(&mut self, sams: &[Sam]) {
        self.status = if sams.iter().any(|sam| sam.covers(self.position)) {
            FighterStatus::Threatened
        } else {
            FighterStatus::Safe
        };
    }
}

impl IAgent for Fighter {
    fn get_id(&self) -> usize {
        0
    }

    fn is_active(&self) -> bool {
        true
    }

    fn get_position(&self) -> Vector2 {
        self.position
    }
}

impl IMovable for Fighter {
    fn get_velocity(&self) -> Vector2 {
        self.velocity
    }
}
