//! # Assignment モジュール
//!
//! UAVへの目標割り当て戦略を提供します。1回の実行で使われる戦略は作戦モードで1つに決まり、
//! 併用されることはありません。
//!
//! - **全機貪欲割り当て** (`greedy_all`): 全面攻撃モードの開始時に1回だけ実行。
//!   UAVをID順に走査し、各機に最も近い未ロックのアクティブ目標を割り当てます。
//!   走査順で競合目標の取り合いが決まる先着順の貪欲法で、全体最適ではありません。
//! - **指揮機による逐次割り当て** (`command_gated`): MUM-Tモードで指揮機が毎ティック呼び出し、
//!   クールダウンの管理は指揮機側（`Fighter::think`）が行います。
//!
//! ロックの取得・解放は `Uav::assign_target` 等に集約されているため、
//! どちらの戦略を使っても1つの目標を複数の生存UAVが同時に保持することはありません。

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    common::{MissionMode, Vector2},
    events::TickOutput,
    target::Target,
    uav::{Uav, UavStatus},
};

/// 割り当て戦略の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStrategy {
    /// 中央集権的な全機貪欲割り当て
    GreedyAll,
    /// 指揮機によるクールダウン付き割り当て
    CommandGated,
}

impl AssignmentStrategy {
    pub fn for_mode(mode: MissionMode) -> Self {
        match mode {
            MissionMode::AllOut => AssignmentStrategy::GreedyAll,
            MissionMode::Mumt => AssignmentStrategy::CommandGated,
        }
    }
}

/// 基準点に最も近い要素のインデックス（同距離なら先勝ち）
fn nearest<'a, T: 'a>(
    from: Vector2,
    candidates: impl Iterator<Item = (usize, &'a T)>,
    position: impl Fn(&T) -> Vector2,
) -> Option<usize> {
    let mut best = None;
    let mut best_distance = f64::INFINITY;
    for (index, candidate) in candidates {
        let distance = from.distance(&position(candidate));
        if distance < best_distance {
            best_distance = distance;
            best = Some(index);
        }
    }
    best
}

/// 全機貪欲割り当て
///
/// 戻り値は割り当てた件数。
pub fn greedy_all(uavs: &mut [Uav], targets: &mut [Target], out: &mut TickOutput) -> usize {
    let mut assigned = 0;
    for uav in uavs.iter_mut() {
        if uav.status == UavStatus::Destroyed {
            continue;
        }
        let choice = nearest(
            uav.position,
            targets.iter().enumerate().filter(|(_, t)| t.is_available()),
            |t| t.position,
        );
        if let Some(index) = choice {
            if uav.assign_target(&mut targets[index], out) {
                assigned += 1;
            }
        }
    }
    debug!(assigned, "全機貪欲割り当て完了");
    assigned
}

/// 指揮機による1件の割り当て
///
/// 指揮機に最も近い未ロックのアクティブ目標を選び、その目標に最も近い編隊飛行中のUAVを選びます
/// （2回の独立した最近傍探索で、組み合わせの最適化はしない）。
/// どちらかの候補がいなければ何もせず false を返します。
pub fn command_gated(
    commander_position: Vector2,
    uavs: &mut [Uav],
    targets: &mut [Target],
    out: &mut TickOutput,
) -> bool {
    if !uavs.iter().any(|u| u.status == UavStatus::Formation) {
        return false;
    }

    let Some(target_index) = nearest(
        commander_position,
        targets.iter().enumerate().filter(|(_, t)| t.is_available()),
        |t| t.position,
    ) else {
        return false;
    };

    let target_position = targets[target_index].position;
    let Some(uav_index) = nearest(
        target_position,
        uavs.iter().enumerate().filter(|(_, u)| u.status == UavStatus::Formation),
        |u| u.position,
    ) else {
        return false;
    };

    uavs[uav_index].assign_target(&mut targets[target_index], out)
}
