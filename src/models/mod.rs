pub mod post;

pub use post::*;

// Message texts sent to KakaoTalk
pub const MESSAGE_PREFIX: &str = "[OTR 오디션]";
pub const TEST_MESSAGE: &str = "[OTR 오디션] 테스트 메시지";
pub const TRUNCATION_MARKER: &str = "\n(이하 생략)";
pub const BUTTON_TITLE: &str = "보기";

pub const DEFAULT_KEYWORD: &str = "뮤지컬";
