//! 仿真时间类型
//!
//! 流模型里数据量可以无限细分，时间用浮点秒表示。

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// 仿真时间（秒）。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    pub fn from_secs(s: f64) -> SimTime {
        SimTime(s)
    }
    pub fn from_millis(ms: f64) -> SimTime {
        SimTime(ms / 1_000.0)
    }
    pub fn as_secs(self) -> f64 {
        self.0
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;

    fn add(self, dt: f64) -> SimTime {
        SimTime(self.0 + dt)
    }
}

impl AddAssign<f64> for SimTime {
    fn add_assign(&mut self, dt: f64) {
        self.0 += dt;
    }
}
