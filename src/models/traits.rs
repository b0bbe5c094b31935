use crate::models::common::Vector2;

/// 全てのシミュレーションエージェントが実装する基本インターフェース
pub trait IAgent {
    /// エージェントIDの取得
    fn get_id(&self) -> usize;

    /// エージェントが生存（アクティブ）しているかどうか
    fn is_active(&self) -> bool;

    /// 現在位置の取得
    fn get_position(&self) -> Vector2;
}

/// 移動可能なエージェントのインターフェース
pub trait IMovable: IAgent {
    /// 現在速度の取得
    fn get_velocity(&self) -> Vector2;

    /// 進行方向（ラジアン）
    fn get_heading(&self) -> f64 {
        self.get_velocity().heading()
    }
}
