use serde::Serialize;
use tracing::{error, info, warn};

use crate::models::common::Vector2;

/// 描画側に渡す一過性の演出イベント
///
/// コアは「何が起きたか」だけを通知し、アニメーションの寿命管理は描画側が持ちます。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    /// 爆発（撃破位置と任意の色味）
    Destruction {
        position: Vector2,
        tint: Option<[u8; 3]>,
    },
    /// SAMから対象への射撃ビーム
    FireBeam { from: Vector2, to: Vector2 },
}

/// UAV撃墜時の爆発色
pub const UAV_LOSS_TINT: [u8; 3] = [255, 165, 0];

/// 戦術メッセージのレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warn,
    Error,
    Success,
    Start,
    End,
}

/// 戦術イベントのメッセージ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TacticalMessage {
    pub tick: u64,
    pub level: MessageLevel,
    pub text: String,
}

/// 1ティック分の出力
///
/// 毎ティック新しく作られ、コアの状態には蓄積されません。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    pub tick: u64,
    pub effects: Vec<Effect>,
    pub messages: Vec<TacticalMessage>,
}

impl TickOutput {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            effects: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// メッセージを記録し、同時に tracing にも出力する
    pub fn message(&mut self, level: MessageLevel, text: String) {
        match level {
            MessageLevel::Warn => warn!(tick = self.tick, "{}", text),
            MessageLevel::Error => error!(tick = self.tick, "{}", text),
            _ => info!(tick = self.tick, "{}", text),
        }
        self.messages.push(TacticalMessage {
            tick: self.tick,
            level,
            text,
        });
    }

    pub fn destruction_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e, Effect::Destruction { .. }))
            .count()
    }

    pub fn fire_beam_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e, Effect::FireBeam { .. }))
            .count()
    }
}
