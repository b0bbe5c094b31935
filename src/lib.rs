//! # mumtsim
//!
//! 有人・無人機協調（MUM-T）による目標攻撃を扱う、ティック駆動のマルチエージェント戦闘シミュレーションです。
//! UAV群が固定目標を攻撃し、SAMが射程内のUAVを確率的に撃墜します。
//! 指揮機（有人戦闘機）がいる場合は、連続的な操舵とクールダウン付きの戦術判断でUAV群を指揮します。

pub mod assignment;
pub mod journal;
pub mod logging;
pub mod models;
pub mod random;
pub mod scenario;
pub mod simulation;
pub mod threat;
