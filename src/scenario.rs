//! # Scenario モジュール
//!
//! シナリオ（YAML）の読み込みと検証を行います。
//! すべての項目は省略可能で、省略時は元スケッチと同じ既定値が使われます。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::common::{MissionMode, constants};

/// シナリオメタデータ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: "default".to_string(),
            description: "UAV群によるSAM防空網下での目標攻撃".to_string(),
        }
    }
}

/// シミュレーション設定
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// 打ち切りティック数（CLI実行時のみ使用）
    pub max_ticks: u64,
    pub mode: MissionMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_ticks: 20_000,
            mode: MissionMode::Mumt,
        }
    }
}

/// 戦域（描画面）の大きさ
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

/// 各エンティティの生成数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForceCounts {
    pub num_uavs: usize,
    pub num_targets: usize,
    pub num_sams: usize,
}

impl Default for ForceCounts {
    fn default() -> Self {
        Self {
            num_uavs: 5,
            num_targets: 8,
            num_sams: 3,
        }
    }
}

/// UAVの運動・編隊パラメータ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UavConfig {
    /// 1ティックあたりの移動量
    pub speed: f64,
    /// 攻撃判定距離
    pub attack_radius: f64,
    /// 編隊復帰完了と見なす距離
    pub rejoin_radius: f64,
    pub slot_spacing_back: f64,
    pub slot_spacing_side: f64,
}

impl Default for UavConfig {
    fn default() -> Self {
        Self {
            speed: constants::UAV_SPEED,
            attack_radius: constants::UAV_ATTACK_RADIUS,
            rejoin_radius: constants::UAV_REJOIN_RADIUS,
            slot_spacing_back: constants::SLOT_SPACING_BACK,
            slot_spacing_side: constants::SLOT_SPACING_SIDE,
        }
    }
}

/// 指揮機（有人戦闘機）の操舵・意思決定パラメータ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FighterConfig {
    pub max_speed: f64,
    pub max_force: f64,
    pub decision_cooldown_ticks: u32,
    pub wander_weight: f64,
    pub avoid_weight: f64,
    pub follow_weight: f64,
    pub danger_margin: f64,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            max_speed: constants::FIGHTER_SPEED,
            max_force: constants::FIGHTER_MAX_FORCE,
            decision_cooldown_ticks: constants::DECISION_COOLDOWN_TICKS,
            wander_weight: constants::WANDER_WEIGHT,
            avoid_weight: constants::AVOID_WEIGHT,
            follow_weight: constants::FOLLOW_WEIGHT,
            danger_margin: constants::DANGER_MARGIN,
        }
    }
}

/// SAMのパラメータ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SamConfig {
    pub range: f64,
    /// ティックごとの射撃確率
    pub fire_probability: f64,
}

impl Default for SamConfig {
    fn default() -> Self {
        Self {
            range: constants::SAM_RANGE,
            fire_probability: constants::SAM_FIRE_PROBABILITY,
        }
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    pub arena: ArenaConfig,
    pub forces: ForceCounts,
    pub uav: UavConfig,
    pub fighter: FighterConfig,
    pub sam: SamConfig,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::Io(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::Parse(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// YAML文字列から読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents)
            .map_err(|e| ScenarioError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.sim.max_ticks == 0 {
            return Err(ScenarioError::Validation("max_ticks must be positive".to_string()));
        }

        if self.arena.width <= 0.0 || self.arena.height <= 0.0 {
            return Err(ScenarioError::Validation(format!(
                "arena must be positive: {}x{}",
                self.arena.width, self.arena.height
            )));
        }

        if self.uav.speed <= 0.0 {
            return Err(ScenarioError::Validation("uav.speed must be positive".to_string()));
        }
        if self.uav.attack_radius < 0.0 || self.uav.rejoin_radius < 0.0 {
            return Err(ScenarioError::Validation("uav radii must not be negative".to_string()));
        }

        if self.fighter.max_speed <= 0.0 || self.fighter.max_force <= 0.0 {
            return Err(ScenarioError::Validation(
                "fighter.max_speed and fighter.max_force must be positive".to_string(),
            ));
        }
        if self.fighter.danger_margin < 0.0 {
            return Err(ScenarioError::Validation("fighter.danger_margin must not be negative".to_string()));
        }

        if self.sam.range < 0.0 {
            return Err(ScenarioError::Validation("sam.range must not be negative".to_string()));
        }
        if !(0.0..=1.0).contains(&self.sam.fire_probability) {
            return Err(ScenarioError::Validation(format!(
                "sam.fire_probability must be within [0, 1]: {}",
                self.sam.fire_probability
            )));
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("作戦モード: {}", self.sim.mode.label());
        println!("最大ティック: {}", self.sim.max_ticks);
        println!("シード値: {}", self.sim.seed);
        println!("戦域: {:.0} x {:.0}", self.arena.width, self.arena.height);
        println!();

        println!("=== 戦力 ===");
        println!("UAV: {}機 (速度 {:.1})", self.forces.num_uavs, self.uav.speed);
        println!("目標: {}個", self.forces.num_targets);
        println!(
            "SAM: {}基 (射程 {:.0}, 射撃確率 {:.3})",
            self.forces.num_sams, self.sam.range, self.sam.fire_probability
        );
        if self.sim.mode.has_command_unit() {
            println!(
                "指揮機: 最大速度 {:.1}, 決定間隔 {}ティック",
                self.fighter.max_speed, self.fighter.decision_cooldown_ticks
            );
        }
    }
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] serde_yaml::Error),
    #[error("設定検証エラー: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_is_valid() {
        let config = ScenarioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.forces.num_uavs, 5);
        assert_eq!(config.sam.range, 120.0);
        assert_eq!(config.fighter.decision_cooldown_ticks, 90);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
sim:
  seed: 7
  mode: all-out
forces:
  num_uavs: 2
sam:
  fire_probability: 1.0
"#;
        let config = ScenarioConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.sim.seed, 7);
        assert_eq!(config.sim.mode, MissionMode::AllOut);
        assert_eq!(config.forces.num_uavs, 2);
        assert_eq!(config.forces.num_targets, 8);
        assert_eq!(config.sam.fire_probability, 1.0);
        assert_eq!(config.sam.range, 120.0);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ScenarioConfig::default();
        config.sam.fire_probability = 1.5;
        assert!(matches!(config.validate(), Err(ScenarioError::Validation(_))));

        let mut config = ScenarioConfig::default();
        config.arena.width = 0.0;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.fighter.max_force = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let yaml = "sim:\n  mode: none\n";
        assert!(matches!(
            ScenarioConfig::from_yaml_str(yaml),
            Err(ScenarioError::Parse(_, _))
        ));
    }

    #[test]
    fn test_bundled_scenarios_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        let mumt = ScenarioConfig::from_file(dir.join("mumt_default.yaml")).unwrap();
        assert_eq!(mumt.sim.mode, MissionMode::Mumt);
        assert_eq!(mumt, ScenarioConfig {
            meta: mumt.meta.clone(),
            ..ScenarioConfig::default()
        });

        let all_out = ScenarioConfig::from_file(dir.join("all_out_saturation.yaml")).unwrap();
        assert_eq!(all_out.sim.mode, MissionMode::AllOut);
        assert_eq!(all_out.forces.num_uavs, 10);
        assert_eq!(all_out.uav, UavConfig::default());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ScenarioConfig::from_file("no/such/scenario.yaml"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }
}
