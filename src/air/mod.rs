//! 공조 덕트·VAV 터미널 관련 계산 모듈을 모아둔다.

pub mod duct_sizing;
pub mod vav_box;

pub use duct_sizing::*;
pub use vav_box::*;
