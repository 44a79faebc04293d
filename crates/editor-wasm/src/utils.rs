//! ユーティリティモジュール
//!
//! console_log マクロと、logクレートの出力先

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    pub fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn error(s: &str);
}

/// コンソールにログ出力するマクロ
macro_rules! console_log {
    ($($t:tt)*) => (crate::utils::log(&format_args!($($t)*).to_string()))
}
pub(crate) use console_log;

/// editor-core / editor-renderer の `log` 出力をブラウザコンソールへ転送
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl ::log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &::log::Metadata) -> bool {
        metadata.level() <= ::log::max_level()
    }

    fn log(&self, record: &::log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record.level(), record.target(), &record.args().to_string());
        match record.level() {
            ::log::Level::Error => error(&line),
            ::log::Level::Warn => warn(&line),
            _ => log(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(level: ::log::Level, target: &str, message: &str) -> String {
    format!("[{} {}] {}", level, target, message)
}

/// ロガーを登録（2回目以降は何もしない）
pub fn init_logger(level: ::log::LevelFilter) {
    if ::log::set_logger(&LOGGER).is_ok() {
        ::log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_record() {
        assert_eq!(
            format_record(::log::Level::Info, "editor_core::assets", "Asset system ready"),
            "[INFO editor_core::assets] Asset system ready"
        );
    }
}
