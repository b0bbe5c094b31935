//! # Random モジュール
//!
//! シミュレーションで使用する乱数源の抽象化を提供します。
//!
//! 配置・初期速度・ノイズ格子・SAM射撃判定はすべてこの乱数源を経由するため、
//! 同じシード（または同じ乱数列）を与えれば同じ結果が得られます。

use rand::{Rng, RngCore};

/// 注入可能な乱数源
pub trait RandomSource {
    /// [0, 1) の一様乱数
    fn next_f64(&mut self) -> f64;

    /// 確率 `p` で true を返すベルヌーイ試行
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// [lo, hi) の一様乱数（範囲が空の場合は lo）
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_f64() * (hi - lo)
    }
}

impl<R: RngCore> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.r#gen::<f64>()
    }
}

/// 決められた値を順番に返す乱数源（テスト用）
///
/// 値を使い切った後は末尾の値を返し続けます。
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// 常に同じ値を返す乱数源
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        let value = match self.values.get(self.cursor) {
            Some(v) => *v,
            None => self.values.last().copied().unwrap_or(0.0),
        };
        if self.cursor < self.values.len() {
            self.cursor += 1;
        }
        value
    }
}
