//! 냉온수 배관 사이징과 펌프 양정 계산 모듈을 모아둔다.

pub mod pipe_sizing;
pub mod pump_head;

pub use pipe_sizing::*;
pub use pump_head::*;
