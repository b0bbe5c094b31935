//! # Simulation モジュール
//!
//! UAV群・目標・SAM・指揮機からなる戦闘シミュレーションの中核エンジンを提供します。
//!
//! エンジンは全エンティティを保持する `World` を所有し、外部から `tick()` が呼ばれるたびに
//! 1ステップ進めます。1ティックの処理は中断されず、以下の固定順序で実行されます。
//!
//! 1. **指揮機処理**: 操舵力の合成と積分、クールダウン付き戦術判断、脅威状態の再計算
//! 2. **UAV処理**: ID順に目的地決定・等速移動・攻撃判定
//! 3. **脅威判定**: SAMごとに指揮機 → 生存UAV の順で射撃判定
//! 4. **終了判定**: アクティブな目標が0になったら Ended へ遷移
//!
//! 指揮機の判断で割り当てられたUAVが同じティックの脅威判定で撃墜されることもあります。
//!
//! ## 状態遷移
//!
//! `Idle --start--> Running --(目標全滅)--> Ended`、`reset()` はどの状態からでも Idle に戻します。
//!
//! ## 使用例
//!
//! ```rust
//! use mumtsim::models::MissionMode;
//! use mumtsim::scenario::ScenarioConfig;
//! use mumtsim::simulation::SimulationEngine;
//!
//! let mut engine = SimulationEngine::new(ScenarioConfig::default());
//! engine.start(MissionMode::AllOut).unwrap();
//! let output = engine.tick();
//! assert_eq!(output.tick, 1);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::assignment::{self, AssignmentStrategy};
use crate::journal::Journal;
use crate::models::{
    FormationAnchor, MissionMode, Sam, Target, TargetStatus, TickOutput, Uav, UavStatus, Vector2,
    constants,
    events::MessageLevel,
    fighter::{Fighter, FighterStatus},
    traits::IAgent,
};
use crate::random::RandomSource;
use crate::scenario::{ForceCounts, ScenarioConfig};
use crate::threat;

/// エンジンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Idle,
    Running,
    Ended,
}

/// エンジン操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("状態 {from:?} では {action} を実行できません")]
    InvalidTransition {
        from: EngineState,
        action: &'static str,
    },
}

/// シミュレーション世界（全エンティティの集約）
///
/// エンティティは撃破されても削除されず、状態だけが変わります（IDは連番のまま）。
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub uavs: Vec<Uav>,
    pub targets: Vec<Target>,
    pub sams: Vec<Sam>,
    pub fighter: Option<Fighter>,
    pub tick: u64,
    pub running: bool,
}

impl World {
    /// 明示的なエンティティ群から世界を組み立てる
    pub fn from_parts(uavs: Vec<Uav>, targets: Vec<Target>, sams: Vec<Sam>) -> Self {
        Self {
            uavs,
            targets,
            sams,
            fighter: None,
            tick: 0,
            running: false,
        }
    }

    /// 設定に従ってエンティティを配置する
    ///
    /// UAVは左下から横一列、目標は戦域上部、SAMは中央付近にランダム配置します。
    pub fn spawn<R: RandomSource + ?Sized>(
        counts: &ForceCounts,
        config: &ScenarioConfig,
        rng: &mut R,
    ) -> Self {
        let width = config.arena.width;
        let height = config.arena.height;
        let margin = constants::SPAWN_MARGIN;
        let base_y = height - margin;

        let uavs = (0..counts.num_uavs)
            .map(|i| {
                let x = margin + (i + 1) as f64 * constants::UAV_SPAWN_SPACING;
                Uav::new(i, Vector2::new(x, base_y), config.uav.speed)
            })
            .collect();

        let targets = (0..counts.num_targets)
            .map(|i| {
                let x = rng.range(margin, width - margin);
                let y = rng.range(margin, height * 0.7);
                Target::new(i, Vector2::new(x, y))
            })
            .collect();

        let sams = (0..counts.num_sams)
            .map(|i| {
                let x = rng.range(width * 0.2, width * 0.8);
                let y = rng.range(height * 0.3, height * 0.8);
                Sam::new(
                    i,
                    Vector2::new(x, y),
                    config.sam.range,
                    config.sam.fire_probability,
                )
            })
            .collect();

        Self::from_parts(uavs, targets, sams)
    }

    pub fn active_target_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_active()).count()
    }

    pub fn destroyed_target_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.status == TargetStatus::Destroyed)
            .count()
    }

    pub fn surviving_uav_count(&self) -> usize {
        self.uavs.iter().filter(|u| u.is_active()).count()
    }
}

/// UAV状況表の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UavRow {
    pub id: usize,
    pub target: Option<usize>,
    pub status: UavStatus,
}

/// 表示用の状況サマリ（読み取り専用の射影）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub tick: u64,
    pub state: EngineState,
    pub mode: Option<MissionMode>,
    pub targets_destroyed: usize,
    pub targets_total: usize,
    pub uavs_surviving: usize,
    pub uavs_total: usize,
    pub fighter_status: Option<FighterStatus>,
    pub uavs: Vec<UavRow>,
}

impl StatusReport {
    /// 状況表をコンソールに出力
    pub fn print_table(&self) {
        println!("=== 作戦状況 (T-{:04}) ===", self.tick);
        println!(
            "作戦モード: {}",
            self.mode.map(|m| m.label()).unwrap_or("待機中")
        );
        println!("状態: {:?}", self.state);
        println!("目標撃破: {} / {}", self.targets_destroyed, self.targets_total);
        println!("UAV生存: {} / {}", self.uavs_surviving, self.uavs_total);
        println!(
            "指揮機: {}",
            self.fighter_status.map(|s| s.label()).unwrap_or("N/A")
        );
        println!("{:>6} {:>8}  状態", "UAV", "目標");
        for row in &self.uavs {
            let target = row
                .target
                .map(|t| format!("#{}", t))
                .unwrap_or_else(|| "--".to_string());
            println!("{:>6} {:>8}  {}", format!("#{}", row.id), target, row.status.label());
        }
    }
}

/// シミュレーションエンジン
///
/// 乱数源 `R` は差し替え可能です（既定はシード付き ChaCha8）。
#[derive(Debug, Clone)]
pub struct SimulationEngine<R: RandomSource = ChaCha8Rng> {
    pub world: World,
    pub state: EngineState,
    pub mode: Option<MissionMode>,
    pub config: ScenarioConfig,
    pub verbose_level: u8,
    rng: R,
}

impl SimulationEngine<ChaCha8Rng> {
    /// シナリオのシード値で乱数源を作り、初期化済みのエンジンを返す
    pub fn new(config: ScenarioConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.sim.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> SimulationEngine<R> {
    pub fn with_rng(config: ScenarioConfig, rng: R) -> Self {
        let mut engine = Self::with_world(config, World::from_parts(Vec::new(), Vec::new(), Vec::new()), rng);
        let counts = engine.config.forces;
        engine.initialize(counts);
        engine
    }

    /// 用意済みの世界からエンジンを作る（Idle 状態）
    pub fn with_world(config: ScenarioConfig, world: World, rng: R) -> Self {
        Self {
            world,
            state: EngineState::Idle,
            mode: None,
            config,
            verbose_level: 0,
            rng,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// 全エンティティを生成し直して Idle に戻す
    pub fn initialize(&mut self, counts: ForceCounts) -> TickOutput {
        self.config.forces = counts;
        self.world = World::spawn(&counts, &self.config, &mut self.rng);
        self.state = EngineState::Idle;
        self.mode = None;

        info!(
            uavs = counts.num_uavs,
            targets = counts.num_targets,
            sams = counts.num_sams,
            "シミュレーションを初期化"
        );

        let mut out = TickOutput::new(0);
        out.message(
            MessageLevel::Info,
            "シミュレーション初期化完了. 作戦モードを選択してください.".to_string(),
        );
        out
    }

    /// 作戦開始（Idle → Running）
    ///
    /// 全面攻撃モードでは全機貪欲割り当てを1回だけ実行し、MUM-Tモードでは指揮機を生成します。
    pub fn start(&mut self, mode: MissionMode) -> Result<TickOutput, SimulationError> {
        if self.state != EngineState::Idle {
            return Err(SimulationError::InvalidTransition {
                from: self.state,
                action: "start",
            });
        }

        let mut out = TickOutput::new(self.world.tick);
        self.mode = Some(mode);
        self.state = EngineState::Running;
        self.world.running = true;

        out.message(
            MessageLevel::Start,
            format!("{} 作戦を開始します!", mode.label()),
        );

        match AssignmentStrategy::for_mode(mode) {
            AssignmentStrategy::GreedyAll => {
                self.world.fighter = None;
                let World { uavs, targets, .. } = &mut self.world;
                assignment::greedy_all(uavs, targets, &mut out);
            }
            AssignmentStrategy::CommandGated => {
                let margin = constants::SPAWN_MARGIN;
                let position = Vector2::new(margin, self.config.arena.height - margin);
                self.world.fighter = Some(Fighter::spawn(position, &self.config.fighter, &mut self.rng));
            }
        }

        Ok(out)
    }

    /// 1ティック進める（Running 以外では何もしない）
    pub fn tick(&mut self) -> TickOutput {
        if self.state != EngineState::Running {
            return TickOutput::new(self.world.tick);
        }
        let Some(mode) = self.mode else {
            return TickOutput::new(self.world.tick);
        };

        self.world.tick += 1;
        let mut out = TickOutput::new(self.world.tick);

        let World {
            uavs,
            targets,
            sams,
            fighter,
            ..
        } = &mut self.world;

        if let Some(fighter) = fighter.as_mut() {
            fighter.update(uavs, targets, sams, &self.config.fighter, &mut out);
        }

        let anchor = fighter.as_ref().map(|f| FormationAnchor::of(f));
        for uav in uavs.iter_mut() {
            uav.update(anchor.as_ref(), targets, mode, &self.config.uav, &mut out);
        }

        let losses = threat::resolve_threats(sams, fighter.as_ref(), uavs, targets, &mut self.rng, &mut out);
        if losses > 0 {
            debug!(tick = self.world.tick, losses, "UAV損失");
        }

        if self.world.active_target_count() == 0 {
            self.state = EngineState::Ended;
            self.world.running = false;
            out.message(MessageLevel::End, "全目標撃破. 任務完了!".to_string());
        }

        trace!(
            tick = self.world.tick,
            effects = out.effects.len(),
            messages = out.messages.len(),
            "ティック完了"
        );

        out
    }

    /// どの状態からでも Idle に戻す（現在の生成数で再配置）
    pub fn reset(&mut self) -> TickOutput {
        let counts = self.config.forces;
        self.initialize(counts)
    }

    /// 状況サマリ
    pub fn status(&self) -> StatusReport {
        StatusReport {
            tick: self.world.tick,
            state: self.state,
            mode: self.mode,
            targets_destroyed: self.world.destroyed_target_count(),
            targets_total: self.world.targets.len(),
            uavs_surviving: self.world.surviving_uav_count(),
            uavs_total: self.world.uavs.len(),
            fighter_status: self.world.fighter.as_ref().map(|f| f.status),
            uavs: self
                .world
                .uavs
                .iter()
                .map(|u| UavRow {
                    id: u.id,
                    target: u.assigned_target,
                    status: u.status,
                })
                .collect(),
        }
    }

    /// 終了または打ち切りまでティックを回す
    ///
    /// 戻り値は実行したティック数。
    pub fn run(&mut self, max_ticks: u64, journal: &mut Journal) -> Result<u64, SimulationError> {
        if self.state != EngineState::Running {
            return Err(SimulationError::InvalidTransition {
                from: self.state,
                action: "run",
            });
        }

        info!("=== シミュレーション実行開始 ===");

        let mut executed = 0;
        while self.state == EngineState::Running && executed < max_ticks {
            let output = self.tick();
            journal.extend(&output.messages);
            executed += 1;

            if self.verbose_level > 0 && self.world.tick % 500 == 0 {
                info!(
                    "進行状況: T-{:04} 目標撃破 {}/{} UAV生存 {}/{}",
                    self.world.tick,
                    self.world.destroyed_target_count(),
                    self.world.targets.len(),
                    self.world.surviving_uav_count(),
                    self.world.uavs.len()
                );
            }
        }

        info!("=== シミュレーション完了 ===");
        info!("総ティック数: {}", self.world.tick);
        info!("終了状態: {:?}", self.state);

        Ok(executed)
    }
}
