// 基本的なデータ型と数学ユーティリティ
pub mod common;

// エージェントの基本インターフェース（trait）定義
pub mod traits;

// 描画・ログ側へ渡すイベント
pub mod events;

// 操舵プリミティブ
pub mod steering;

// 各エージェントモデルの実装
pub mod target;
pub mod sam;
pub mod uav;
pub mod fighter;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use events::{Effect, MessageLevel, TacticalMessage, TickOutput};
pub use target::{Target, TargetStatus};
pub use sam::Sam;
pub use uav::{FormationAnchor, Uav, UavStatus};
pub use fighter::{Fighter, FighterStatus};
