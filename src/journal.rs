//! # Journal モジュール
//!
//! 戦術メッセージの直近履歴（件数上限付き、新しい順）を保持します。
//! 表示側のイベントログに相当し、シミュレーションの状態には含まれません。

use std::collections::VecDeque;

use crate::models::events::{MessageLevel, TacticalMessage};

/// 既定の保持件数
pub const DEFAULT_CAPACITY: usize = 30;

#[derive(Debug, Clone)]
pub struct Journal {
    entries: VecDeque<TacticalMessage>,
    capacity: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Journal {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// メッセージを先頭に追加し、上限を超えた古いものを捨てる
    pub fn record(&mut self, message: TacticalMessage) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(message);
        self.entries.truncate(self.capacity);
    }

    pub fn extend<'a>(&mut self, messages: impl IntoIterator<Item = &'a TacticalMessage>) {
        for message in messages {
            self.record(message.clone());
        }
    }

    /// 新しい順に走査
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TacticalMessage> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 表示用の1行（例: `[T-0042] [WARN] UAV #1 編隊復帰開始.`）
    pub fn format_entry(message: &TacticalMessage) -> String {
        let tag = match message.level {
            MessageLevel::Info => "INFO",
            MessageLevel::Warn => "WARN",
            MessageLevel::Error => "ERROR",
            MessageLevel::Success => "SUCCESS",
            MessageLevel::Start => "START",
            MessageLevel::End => "END",
        };
        format!("[T-{:04}] [{}] {}", message.tick, tag, message.text)
    }
}
