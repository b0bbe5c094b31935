//! # Threat モジュール
//!
//! SAMによる脅威判定（探知 → 射撃判定 → 撃墜）を行います。
//!
//! 各SAMについて、指揮機（いれば）→ 生存UAV（ID順）の順に評価し、
//! 交戦範囲内の対象ごとに独立したベルヌーイ試行を1回行います。
//! 命中時は射撃ビームの演出イベントを出し、対象がUAVなら撃墜します。
//! 指揮機は射撃を受けても撃墜されません（演出イベントのみ）。

use tracing::debug;

use crate::models::{
    events::{Effect, TickOutput},
    fighter::Fighter,
    sam::Sam,
    target::Target,
    traits::IAgent,
    uav::Uav,
};
use crate::random::RandomSource;

/// 1ティック分の脅威判定
///
/// 戻り値はこのティックで撃墜されたUAVの数。
pub fn resolve_threats<R: RandomSource + ?Sized>(
    sams: &[Sam],
    fighter: Option<&Fighter>,
    uavs: &mut [Uav],
    targets: &mut [Target],
    rng: &mut R,
    out: &mut TickOutput,
) -> usize {
    let mut losses = 0;

    for sam in sams {
        if let Some(fighter) = fighter {
            if sam.try_fire(fighter, rng) {
                debug!(sam = sam.id, "指揮機への射撃（被害なし）");
                out.effect(Effect::FireBeam {
                    from: sam.position,
                    to: fighter.get_position(),
                });
            }
        }

        for uav in uavs.iter_mut() {
            if !uav.is_active() {
                continue;
            }
            if sam.try_fire(&*uav, rng) {
                debug!(sam = sam.id, uav = uav.get_id(), "UAVへの射撃命中");
                out.effect(Effect::FireBeam {
                    from: sam.position,
                    to: uav.get_position(),
                });
                uav.destroy(targets, out);
                losses += 1;
            }
        }
    }

    losses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        common::Vector2, fighter::FighterStatus, steering::NoiseField, uav::UavStatus,
    };
    use crate::random::ScriptedRandom;
    use crate::scenario::FighterConfig;

    #[test]
    fn test_forced_fire_destroys_uav_in_range() {
        let sams = vec![Sam::new(0, Vector2::ZERO, 120.0, 1.0)];
        let mut uavs = vec![Uav::new(0, Vector2::new(50.0, 0.0), 2.8)];
        let mut targets = vec![Target::new(0, Vector2::new(300.0, 0.0))];
        let mut out = TickOutput::new(1);
        let mut rng = ScriptedRandom::constant(0.5);
        uavs[0].assign_target(&mut targets[0], &mut out);

        let losses = resolve_threats(&sams, None, &mut uavs, &mut targets, &mut rng, &mut out);
        assert_eq!(losses, 1);
        assert_eq!(uavs[0].status, UavStatus::Destroyed);
        assert_eq!(out.fire_beam_count(), 1);
        assert_eq!(out.destruction_count(), 1);
        assert!(!targets[0].is_targeted);
    }

    #[test]
    fn test_destroyed_uav_is_not_engaged_again() {
        let sams = vec![
            Sam::new(0, Vector2::ZERO, 120.0, 1.0),
            Sam::new(1, Vector2::new(10.0, 0.0), 120.0, 1.0),
        ];
        let mut uavs = vec![Uav::new(0, Vector2::new(50.0, 0.0), 2.8)];
        let mut targets: Vec<Target> = Vec::new();
        let mut out = TickOutput::new(1);
        let mut rng = ScriptedRandom::constant(0.0);
        resolve_threats(&sams, None, &mut uavs, &mut targets, &mut rng, &mut out);
        assert_eq!(out.fire_beam_count(), 1);
        assert_eq!(out.destruction_count(), 1);
    }

    #[test]
    fn test_fighter_only_gets_fire_beam() {
        let sams = vec![Sam::new(0, Vector2::ZERO, 120.0, 1.0)];
        let fighter = Fighter::new(
            Vector2::new(30.0, 0.0),
            Vector2::new(3.0, 0.0),
            0.0,
            NoiseField::flat(0.5),
            &FighterConfig::default(),
        );
        let mut uavs = vec![Uav::new(0, Vector2::new(500.0, 0.0), 2.8)];
        let mut targets: Vec<Target> = Vec::new();
        let mut out = TickOutput::new(1);
        let mut rng = ScriptedRandom::constant(0.0);
        let losses = resolve_threats(&sams, Some(&fighter), &mut uavs, &mut targets, &mut rng, &mut out);
        assert_eq!(losses, 0);
        assert_eq!(out.fire_beam_count(), 1);
        assert_eq!(out.destruction_count(), 0);
        assert_eq!(fighter.status, FighterStatus::Safe);
        assert_eq!(uavs[0].status, UavStatus::Formation);
    }

    #[test]
    fn test_zero_probability_never_fires() {
        let sams = vec![Sam::new(0, Vector2::ZERO, 120.0, 0.0)];
        let mut uavs = vec![Uav::new(0, Vector2::new(1.0, 0.0), 2.8)];
        let mut targets: Vec<Target> = Vec::new();
        let mut out = TickOutput::new(1);
        let mut rng = ScriptedRandom::constant(0.0);
        assert_eq!(resolve_threats(&sams, None, &mut uavs, &mut targets, &mut rng, &mut out), 0);
        assert!(out.effects.is_empty());
    }
}
