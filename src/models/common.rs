use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// 2次元ベクトルを表す構造体（位置・速度・操舵力で共用）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 指定角度（ラジアン）と大きさからベクトルを生成
    pub fn from_angle(angle_rad: f64, magnitude: f64) -> Self {
        Self::new(magnitude * angle_rad.cos(), magnitude * angle_rad.sin())
    }

    /// ベクトルの大きさ
    pub fn magnitude(&self) -> f64 {
        (self.x.powi(2) + self.y.powi(2)).sqrt()
    }

    /// 2点間の距離
    pub fn distance(&self, other: &Vector2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// 単位ベクトル化（ゼロベクトルはそのまま）
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self::new(self.x / mag, self.y / mag)
        } else {
            *self
        }
    }

    /// 大きさを上限でクリップ
    pub fn limit(&self, max: f64) -> Self {
        let mag = self.magnitude();
        if mag > max {
            let factor = max / mag;
            Self::new(self.x * factor, self.y * factor)
        } else {
            *self
        }
    }

    /// 向きを保ったまま大きさを設定（ゼロベクトルはゼロのまま）
    pub fn set_magnitude(&self, magnitude: f64) -> Self {
        self.normalize() * magnitude
    }

    /// XY平面での進行方向（ラジアン）
    pub fn heading(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// 原点まわりに回転
    pub fn rotate(&self, angle_rad: f64) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;

    fn div(self, scalar: f64) -> Self::Output {
        Self::new(self.x / scalar, self.y / scalar)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// 作戦モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionMode {
    /// 全機一斉攻撃（中央集権的な貪欲割り当て）
    AllOut,
    /// 有人機指揮（MUM-T: 指揮機によるクールダウン付き逐次割り当て）
    Mumt,
}

impl MissionMode {
    /// 指揮機を伴うモードかどうか
    pub fn has_command_unit(&self) -> bool {
        matches!(self, MissionMode::Mumt)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MissionMode::AllOut => "AI全面攻撃",
            MissionMode::Mumt => "AI指揮官 (MUM-T)",
        }
    }
}

impl std::str::FromStr for MissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all-out" | "allout" => Ok(MissionMode::AllOut),
            "mumt" => Ok(MissionMode::Mumt),
            _ => Err(format!("無効な作戦モード: {}. 利用可能: all-out, mumt", s)),
        }
    }
}

/// シミュレーション定数（元スケッチの値）
pub mod constants {
    pub const UAV_SPEED: f64 = 2.8;
    pub const UAV_ATTACK_RADIUS: f64 = 10.0;
    pub const UAV_REJOIN_RADIUS: f64 = 20.0;
    pub const SLOT_SPACING_BACK: f64 = 50.0;
    pub const SLOT_SPACING_SIDE: f64 = 40.0;

    pub const FIGHTER_SPEED: f64 = 3.0;
    pub const FIGHTER_MAX_FORCE: f64 = 0.1;
    pub const DECISION_COOLDOWN_TICKS: u32 = 90;
    pub const WANDER_WEIGHT: f64 = 0.3;
    pub const AVOID_WEIGHT: f64 = 1.0;
    pub const FOLLOW_WEIGHT: f64 = 0.5;
    /// 回避開始の余裕距離（探知範囲に加算）
    pub const DANGER_MARGIN: f64 = 30.0;

    pub const WANDER_RADIUS: f64 = 50.0;
    pub const WANDER_LOOKAHEAD: f64 = 100.0;
    pub const WANDER_PHASE_STEP: f64 = 0.01;

    pub const SAM_RANGE: f64 = 120.0;
    pub const SAM_FIRE_PROBABILITY: f64 = 0.005;

    /// 配置の基準点（画面左下からのオフセット）
    pub const SPAWN_MARGIN: f64 = 50.0;
    pub const UAV_SPAWN_SPACING: f64 = 30.0;

    /// UAVの表示色パレット（描画側で使用）
    pub const UAV_COLORS: [[u8; 3]; 10] = [
        [100, 180, 255],
        [150, 255, 100],
        [255, 100, 255],
        [100, 255, 255],
        [255, 255, 100],
        [180, 100, 255],
        [100, 255, 180],
        [255, 180, 100],
        [200, 100, 100],
        [100, 200, 100],
    ];
}

/// 数学ユーティリティ関数
pub mod math_utils {
    /// 度をラジアンに変換
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * std::f64::consts::PI / 180.0
    }

    /// 5次のフェード関数（0..1 → 0..1、両端で1次・2次微分が0）
    pub fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }
}
