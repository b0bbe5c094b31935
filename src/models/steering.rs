//! # Steering モジュール
//!
//! 自律飛行のための操舵力（steering force）を計算する純粋関数群です。
//! いずれの関数も「望ましい速度 − 現在速度」を最大操舵力で制限した補正ベクトルを返します。
//!
//! - `seek`: 目標点へ向かう
//! - `wander`: 滑らかなノイズで揺らぐ前方の点へ向かう（自然な巡航）
//! - `avoid_threats`: 危険半径内の脅威から離れる（最大操舵力の2倍まで）
//! - `follow_centroid`: 生存機の重心へ向かう

use crate::models::common::{Vector2, constants, math_utils};
use crate::random::RandomSource;

/// ゼロ除算を避けるための距離下限
const MIN_THREAT_DISTANCE: f64 = 1e-3;

/// 回避操舵の最大操舵力倍率
pub const EVASION_FORCE_FACTOR: f64 = 2.0;

const NOISE_LATTICE_SIZE: usize = 256;

/// 操舵の上限値
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringLimits {
    pub max_speed: f64,
    pub max_force: f64,
}

/// 放浪操舵のパラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WanderParams {
    /// 前方の円の半径
    pub radius: f64,
    /// 円の中心までの前方距離
    pub lookahead: f64,
    /// 1回の呼び出しで進めるノイズ位相
    pub phase_step: f64,
}

impl Default for WanderParams {
    fn default() -> Self {
        Self {
            radius: constants::WANDER_RADIUS,
            lookahead: constants::WANDER_LOOKAHEAD,
            phase_step: constants::WANDER_PHASE_STEP,
        }
    }
}

/// 回避対象の脅威（位置と危険半径）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threat {
    pub position: Vector2,
    pub danger_radius: f64,
}

/// 1次元の滑らかなノイズ
///
/// 整数格子上の乱数値を5次フェードで補間します。出力は [0, 1]。
/// 位相を少しずつ進めれば、隣接する値は強く相関します。
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    lattice: Vec<f64>,
}

impl NoiseField {
    pub fn new<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        let lattice = (0..NOISE_LATTICE_SIZE).map(|_| rng.next_f64()).collect();
        Self { lattice }
    }

    /// 全格子点が同じ値のノイズ（テスト用）
    pub fn flat(value: f64) -> Self {
        Self {
            lattice: vec![value; NOISE_LATTICE_SIZE],
        }
    }

    pub fn sample(&self, phase: f64) -> f64 {
        let base = phase.floor();
        let frac = phase - base;
        let i = (base.rem_euclid(NOISE_LATTICE_SIZE as f64)) as usize % NOISE_LATTICE_SIZE;
        let j = (i + 1) % NOISE_LATTICE_SIZE;
        math_utils::lerp(self.lattice[i], self.lattice[j], math_utils::fade(frac))
    }
}

/// 目標点へ向かう操舵力
///
/// 出力の大きさは常に `max_force` 以下。現在位置と目標点が一致する場合はゼロ。
pub fn seek(position: Vector2, velocity: Vector2, target: Vector2, limits: SteeringLimits) -> Vector2 {
    let offset = target - position;
    if offset.is_zero() {
        return Vector2::ZERO;
    }
    let desired = offset.set_magnitude(limits.max_speed);
    (desired - velocity).limit(limits.max_force)
}

/// 放浪操舵
///
/// 現在の進行方向の前方 `lookahead` を中心とする半径 `radius` の円周上の点を、
/// ノイズから得た角度で選んで `seek` します。戻り値は操舵力と進めた位相。
pub fn wander(
    position: Vector2,
    velocity: Vector2,
    noise: &NoiseField,
    phase: f64,
    params: &WanderParams,
    limits: SteeringLimits,
) -> (Vector2, f64) {
    let tau = std::f64::consts::TAU;
    let angle = noise.sample(phase) * tau * 2.0 - tau;

    let circle_center = position + velocity.set_magnitude(params.lookahead);
    let theta = angle + velocity.heading();
    let wander_point = circle_center + Vector2::from_angle(theta, params.radius);

    (
        seek(position, velocity, wander_point, limits),
        phase + params.phase_step,
    )
}

/// 脅威回避の操舵力
///
/// 危険半径内の各脅威から離れる向きに、距離の逆数の大きさで反発を合算します。
/// 出力の大きさは `max_force` の2倍以下。
pub fn avoid_threats(
    position: Vector2,
    velocity: Vector2,
    threats: &[Threat],
    limits: SteeringLimits,
) -> Vector2 {
    let mut avoidance = Vector2::ZERO;
    let mut in_danger = false;

    for threat in threats {
        let distance = position.distance(&threat.position);
        if distance < threat.danger_radius {
            in_danger = true;
            let away = position - threat.position;
            avoidance += away.set_magnitude(1.0 / distance.max(MIN_THREAT_DISTANCE));
        }
    }

    if !in_danger {
        return Vector2::ZERO;
    }

    let desired = avoidance.set_magnitude(limits.max_speed);
    (desired - velocity).limit(limits.max_force * EVASION_FORCE_FACTOR)
}

/// 重心追従の操舵力（対象がいなければゼロ）
pub fn follow_centroid(
    position: Vector2,
    velocity: Vector2,
    unit_positions: &[Vector2],
    limits: SteeringLimits,
) -> Vector2 {
    if unit_positions.is_empty() {
        return Vector2::ZERO;
    }
    let sum = unit_positions
        .iter()
        .fold(Vector2::ZERO, |acc, p| acc + *p);
    let centroid = sum / unit_positions.len() as f64;
    seek(position, velocity, centroid, limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const LIMITS: SteeringLimits = SteeringLimits {
        max_speed: 3.0,
        max_force: 0.1,
    };

    #[test]
    fn test_seek_zero_when_on_target() {
        let p = Vector2::new(5.0, 5.0);
        assert_eq!(seek(p, Vector2::new(1.0, 0.0), p, LIMITS), Vector2::ZERO);
    }

    #[test]
    fn test_seek_points_toward_target() {
        let force = seek(Vector2::ZERO, Vector2::ZERO, Vector2::new(100.0, 0.0), LIMITS);
        assert!((force.x - 0.1).abs() < 1e-12);
        assert!(force.y.abs() < 1e-12);
    }

    #[test]
    fn test_avoid_threats_pushes_away() {
        let threats = [Threat {
            position: Vector2::new(10.0, 0.0),
            danger_radius: 150.0,
        }];
        let force = avoid_threats(Vector2::ZERO, Vector2::ZERO, &threats, LIMITS);
        assert!(force.x < 0.0);
        assert!((force.magnitude() - 0.2).abs() < 1e-12);

        let far = [Threat {
            position: Vector2::new(500.0, 0.0),
            danger_radius: 150.0,
        }];
        assert_eq!(avoid_threats(Vector2::ZERO, Vector2::ZERO, &far, LIMITS), Vector2::ZERO);
    }

    #[test]
    fn test_avoid_threats_coincident_threat_is_finite() {
        let threats = [Threat {
            position: Vector2::ZERO,
            danger_radius: 150.0,
        }];
        let force = avoid_threats(Vector2::ZERO, Vector2::new(1.0, 0.0), &threats, LIMITS);
        assert!(force.x.is_finite() && force.y.is_finite());
    }

    #[test]
    fn test_follow_centroid_empty_is_zero() {
        assert_eq!(follow_centroid(Vector2::ZERO, Vector2::ZERO, &[], LIMITS), Vector2::ZERO);
        let force = follow_centroid(
            Vector2::ZERO,
            Vector2::ZERO,
            &[Vector2::new(0.0, 10.0), Vector2::new(0.0, 30.0)],
            LIMITS,
        );
        assert!(force.y > 0.0);
    }

    #[test]
    fn test_wander_advances_phase_smoothly() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let noise = NoiseField::new(&mut rng);
        let params = WanderParams::default();
        let mut phase = 3.5;
        let mut previous = noise.sample(phase);
        for _ in 0..500 {
            let (force, next) = wander(Vector2::ZERO, Vector2::new(3.0, 0.0), &noise, phase, &params, LIMITS);
            assert!(force.magnitude() <= LIMITS.max_force + 1e-12);
            assert!((next - phase - params.phase_step).abs() < 1e-12);
            phase = next;
            let sample = noise.sample(phase);
            // 0.01 刻みでは隣接サンプルの差は小さい
            assert!((sample - previous).abs() < 0.05);
            previous = sample;
        }
    }

    #[test]
    fn test_noise_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let noise = NoiseField::new(&mut rng);
        for k in 0..2000 {
            let v = noise.sample(k as f64 * 0.37);
            assert!((0.0..=1.0).contains(&v));
        }
        assert_eq!(NoiseField::flat(0.25).sample(12.3), 0.25);
    }

    fn vec2() -> impl Strategy<Value = Vector2> {
        (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| Vector2::new(x, y))
    }

    proptest! {
        #[test]
        fn prop_seek_bounded(p in vec2(), v in vec2(), t in vec2(), max_force in 0.01f64..5.0) {
            let limits = SteeringLimits { max_speed: 3.0, max_force };
            prop_assert!(seek(p, v, t, limits).magnitude() <= max_force + 1e-9);
        }

        #[test]
        fn prop_follow_centroid_bounded(p in vec2(), v in vec2(), units in prop::collection::vec(vec2(), 0..8), max_force in 0.01f64..5.0) {
            let limits = SteeringLimits { max_speed: 3.0, max_force };
            prop_assert!(follow_centroid(p, v, &units, limits).magnitude() <= max_force + 1e-9);
        }

        #[test]
        fn prop_avoid_bounded(p in vec2(), v in vec2(), threats in prop::collection::vec((vec2(), 0.0f64..400.0), 0..6), max_force in 0.01f64..5.0) {
            let limits = SteeringLimits { max_speed: 3.0, max_force };
            let threats: Vec<Threat> = threats
                .into_iter()
                .map(|(position, danger_radius)| Threat { position, danger_radius })
                .collect();
            let force = avoid_threats(p, v, &threats, limits);
            prop_assert!(force.magnitude() <= max_force * EVASION_FORCE_FACTOR + 1e-9);
        }
    }
}
