//! 轮询退避与上限

use std::time::Duration;

use crate::config::PollingSection;

/// 一次 run 的轮询约束
#[derive(Clone, Debug, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    /// 自 run 创建起的绝对时限
    pub deadline: Duration,
    pub max_polls: usize,
    pub max_consecutive_errors: usize,
    pub max_tool_rounds: usize,
}

impl PollPolicy {
    pub fn from_config(cfg: &PollingSection) -> Self {
        let initial_interval = Duration::from_millis(cfg.initial_interval_ms);
        Self {
            initial_interval,
            max_interval: Duration::from_millis(cfg.max_interval_ms.max(cfg.initial_interval_ms)),
            multiplier: if cfg.multiplier.is_finite() && cfg.multiplier >= 1.0 {
                cfg.multiplier
            } else {
                1.0
            },
            // 至少容纳一次轮询
            deadline: Duration::from_secs(cfg.deadline_secs).max(initial_interval),
            max_polls: cfg.max_polls.max(1),
            max_consecutive_errors: cfg.max_consecutive_errors.max(1),
            max_tool_rounds: cfg.max_tool_rounds.max(1),
        }
    }

    pub fn with_intervals(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_interval = initial;
        self.max_interval = max.max(initial);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_max_polls(mut self, max_polls: usize) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds.max(1);
        self
    }

    pub fn with_max_consecutive_errors(mut self, n: usize) -> Self {
        self.max_consecutive_errors = n.max(1);
        self
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&PollingSection::default())
    }
}

/// 指数退避：initial × multiplier^n，封顶 max；提交工具输出后 reset
#[derive(Debug)]
pub struct PollBackoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    current: Duration,
}

impl PollBackoff {
    pub fn new(policy: &PollPolicy) -> Self {
        Self {
            initial: policy.initial_interval,
            max: policy.max_interval,
            multiplier: policy.multiplier,
            current: policy.initial_interval,
        }
    }

    /// 返回本次等待时长并推进
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.mul_f64(self.multiplier).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sequence_caps_at_three_seconds() {
        let mut b = PollBackoff::new(&PollPolicy::default());
        let delays: Vec<u128> = (0..5).map(|_| b.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![1000, 1500, 2250, 3000, 3000]);
        b.reset();
        assert_eq!(b.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_deadline_allows_one_interval() {
        let cfg = PollingSection {
            deadline_secs: 0,
            ..PollingSection::default()
        };
        let policy = PollPolicy::from_config(&cfg);
        assert_eq!(policy.deadline, Duration::from_secs(1));
        assert!(policy.deadline >= policy.initial_interval);
    }

    #[test]
    fn test_invalid_multiplier_is_fixed_interval() {
        let cfg = PollingSection {
            multiplier: 0.2,
            ..PollingSection::default()
        };
        let mut b = PollBackoff::new(&PollPolicy::from_config(&cfg));
        assert_eq!(b.next_delay(), b.next_delay());
    }
}
